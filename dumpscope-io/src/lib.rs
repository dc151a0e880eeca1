//! dumpscope I/O - Archive walking and report assembly
//!
//! This crate reads the envelope of a mongodump archive from a byte stream:
//!
//! - A peekable reader adapter for terminator detection
//! - The length-prefixed document stream reader
//! - The archive walker state machine
//! - High-level `read_report` / `write_report` entry points

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod peek;
pub mod report;
pub mod stream;
pub mod walker;

// Re-export commonly used types
pub use dumpscope_codec::{ExtJsonMode, SpecialKeyDecoder};
pub use dumpscope_format::{Document, DumpError, Limits, Phase, Result, Value};
pub use peek::PeekReader;
pub use report::Report;
pub use stream::read_document;
pub use walker::{ArchiveWalker, MetadataWarning, WalkState, METADATA_FIELD};

use dumpscope_format::{decode_document, encode_document};
use std::io::{Read, Write};

/// High-level inspection options
#[derive(Debug, Clone, Default)]
pub struct InspectOptions {
    /// Security limits
    pub limits: Limits,
    /// Check that the report survives a wire round trip
    pub verify_roundtrip: bool,
}

/// Walk an archive and return its report.
///
/// Metadata warnings go to `diagnostics`; fatal errors are returned tagged
/// with the phase they occurred in.
pub fn read_report<R: Read, W: Write>(
    input: R,
    diagnostics: &mut W,
    opts: &InspectOptions,
) -> Result<Report> {
    let mut walker = ArchiveWalker::new(input, opts.limits.clone());
    let report = walker.walk(diagnostics)?;

    if opts.verify_roundtrip {
        let decoder = SpecialKeyDecoder::new().with_max_depth(opts.limits.max_nesting_depth);
        verify_report_roundtrip(&report, &decoder, &opts.limits)?;
    }
    Ok(report)
}

/// Render a report as modern extended JSON to `output`
pub fn write_report<W: Write>(
    report: &Report,
    mut output: W,
    mode: ExtJsonMode,
    pretty: bool,
) -> Result<()> {
    let text = dumpscope_codec::to_ext_json_string(&report.to_document(), mode, pretty)?;
    output.write_all(text.as_bytes())?;
    output.write_all(b"\n")?;
    output.flush()?;
    Ok(())
}

/// Check every container of `report` the way the walker decoded it.
///
/// The header, each collection document and each expanded `metadata`
/// document are top-level containers to the walker, so each one is checked
/// on its own. Expanded `metadata` values are set aside as `null` while their
/// collection document is checked.
pub fn verify_report_roundtrip(
    report: &Report,
    decoder: &SpecialKeyDecoder,
    limits: &Limits,
) -> Result<()> {
    verify_roundtrip(&report.header, decoder, limits)?;
    for collection in &report.collection_metadata {
        let mut shell = collection.clone();
        let mut expanded = Vec::new();
        for (key, value) in shell.iter_mut() {
            if key == METADATA_FIELD && matches!(value, Value::Document(_)) {
                if let Value::Document(doc) = std::mem::replace(value, Value::Null) {
                    expanded.push(doc);
                }
            }
        }
        verify_roundtrip(&shell, decoder, limits)?;
        for doc in &expanded {
            verify_roundtrip(doc, decoder, limits)?;
        }
    }
    Ok(())
}

/// Check that `doc` encodes, decodes and special-key decodes back to itself.
///
/// Trees are compared by their encoded bytes so NaN payloads compare equal.
pub fn verify_roundtrip(doc: &Document, decoder: &SpecialKeyDecoder, limits: &Limits) -> Result<()> {
    let bytes = encode_document(doc)?;
    let reread = decode_document(&bytes, limits)?;
    let again = decoder.decode_document(&reread)?;
    if encode_document(&again)? != bytes {
        return Err(DumpError::Corrupt(
            "document changed across a wire round trip".to_string(),
        ));
    }
    tracing::debug!(bytes = bytes.len(), "round trip verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_roundtrip_accepts_decoded_tree() {
        let decoder = SpecialKeyDecoder::new();
        let doc = Document::new()
            .with("n", Value::Int64(3))
            .with("f", f64::NAN)
            .with("nested", Document::new().with("s", "x"));
        verify_roundtrip(&doc, &decoder, &Limits::default()).unwrap();
    }

    #[test]
    fn test_verify_roundtrip_flags_undecoded_wrapper() {
        // wrapper-shaped input is decoded on the second pass, so it changes
        let wrapped = Document::new().with("w", Document::new().with("$numberLong", "5"));
        assert!(matches!(
            verify_roundtrip(&wrapped, &SpecialKeyDecoder::new(), &Limits::default()),
            Err(DumpError::Corrupt(_))
        ));
    }

    #[test]
    fn test_write_report_relaxed() {
        let report = Report {
            header: Document::new().with("version", "0.1"),
            collection_metadata: Vec::new(),
        };
        let mut out = Vec::new();
        write_report(&report, &mut out, ExtJsonMode::Relaxed, false).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\"header\":{\"version\":\"0.1\"},\"collectionMetadata\":[]}\n"
        );
    }

    #[test]
    fn test_report_roundtrip_keeps_wrapper_shaped_containers() {
        let report = Report {
            header: Document::new().with("$numberLong", "5"),
            collection_metadata: vec![Document::new()
                .with("db", "d")
                .with("metadata", Document::new().with("$numberLong", "5"))
                .with("metadata", Document::new().with("$oid", "not hex"))],
        };
        verify_report_roundtrip(&report, &SpecialKeyDecoder::new(), &Limits::default()).unwrap();
    }

    #[test]
    fn test_report_roundtrip_still_flags_nested_wrappers() {
        let report = Report {
            header: Document::new(),
            collection_metadata: vec![Document::new().with(
                "metadata",
                Document::new().with("w", Document::new().with("$numberLong", "5")),
            )],
        };
        assert!(matches!(
            verify_report_roundtrip(&report, &SpecialKeyDecoder::new(), &Limits::default()),
            Err(DumpError::Corrupt(_))
        ));
    }
}
