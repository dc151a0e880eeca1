//! Archive walker
//!
//! Walks the envelope of a mongodump archive:
//!
//! ```text
//! magic (u32 LE) | header document | metadata document* | FF FF FF FF | ...
//! ```
//!
//! Everything after the terminator (the document data blocks) is left
//! unread.

use std::io::{Read, Write};

use dumpscope_codec::{parse_legacy_ext_json, SpecialKeyDecoder};
use dumpscope_format::constants::{ARCHIVE_MAGIC, TERMINATOR};
use dumpscope_format::{Document, DumpError, Limits, Phase, Result, Value};

use crate::peek::PeekReader;
use crate::report::Report;
use crate::stream::{read_document, read_exact_or_truncated};

/// Name of the field holding string-encoded collection metadata
pub const METADATA_FIELD: &str = "metadata";

/// Position of an [`ArchiveWalker`] in the archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    /// Nothing read yet
    ExpectMagic,
    /// Magic number accepted
    ExpectHeader,
    /// Header read; reading metadata until the terminator
    ReadingMetadata,
    /// Terminator seen; the report is ready
    Done,
    /// A step failed; the stream must not be used further
    Failed,
}

/// A `metadata` field that was left as it was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataWarning {
    /// Position of the collection in the metadata section
    pub index: usize,
    /// The diagnostic that was emitted
    pub message: String,
}

/// Step-wise reader for the archive envelope
pub struct ArchiveWalker<R: Read> {
    reader: PeekReader<R>,
    decoder: SpecialKeyDecoder,
    limits: Limits,
    state: WalkState,
    header: Document,
    collections: Vec<Document>,
    warnings: Vec<MetadataWarning>,
}

impl<R: Read> ArchiveWalker<R> {
    /// Create a walker over `input`
    pub fn new(input: R, limits: Limits) -> Self {
        let decoder = SpecialKeyDecoder::new().with_max_depth(limits.max_nesting_depth);
        Self {
            reader: PeekReader::new(input),
            decoder,
            limits,
            state: WalkState::ExpectMagic,
            header: Document::new(),
            collections: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Replace the special-key decoder
    pub fn with_decoder(mut self, decoder: SpecialKeyDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    /// Current state
    pub fn state(&self) -> WalkState {
        self.state
    }

    /// Metadata warnings emitted so far
    pub fn warnings(&self) -> &[MetadataWarning] {
        &self.warnings
    }

    /// Decoded header, once read; empty after [`Self::walk`] returns
    pub fn header(&self) -> Option<&Document> {
        match self.state {
            WalkState::ReadingMetadata | WalkState::Done => Some(&self.header),
            _ => None,
        }
    }

    /// Metadata documents read so far
    pub fn collections(&self) -> &[Document] {
        &self.collections
    }

    /// Run the walk to completion and return the report.
    ///
    /// Metadata warnings are written to `diagnostics`, one per line. The
    /// header and collections are moved into the report, so [`Self::header`]
    /// and [`Self::collections`] are empty afterwards.
    pub fn walk<W: Write>(&mut self, diagnostics: &mut W) -> Result<Report> {
        while self.step(diagnostics)? != WalkState::Done {}
        Ok(Report {
            header: std::mem::take(&mut self.header),
            collection_metadata: std::mem::take(&mut self.collections),
        })
    }

    /// Perform one transition and return the new state.
    ///
    /// Errors are tagged with the phase they occurred in and leave the
    /// walker [`WalkState::Failed`].
    pub fn step<W: Write>(&mut self, diagnostics: &mut W) -> Result<WalkState> {
        let (phase, outcome) = match self.state {
            WalkState::ExpectMagic => (Phase::MagicCheck, self.check_magic()),
            WalkState::ExpectHeader => (Phase::HeaderRead, self.read_header()),
            WalkState::ReadingMetadata => (Phase::MetadataRead, self.read_metadata(diagnostics)),
            WalkState::Done => return Ok(WalkState::Done),
            WalkState::Failed => {
                return Err(DumpError::Corrupt(
                    "archive walk already failed".to_string(),
                ))
            }
        };
        match outcome {
            Ok(next) => {
                self.state = next;
                Ok(next)
            }
            Err(err) => {
                self.state = WalkState::Failed;
                Err(err.in_phase(phase))
            }
        }
    }

    fn check_magic(&mut self) -> Result<WalkState> {
        let mut magic = [0u8; 4];
        read_exact_or_truncated(&mut self.reader, &mut magic, "archive magic number")?;
        let found = u32::from_le_bytes(magic);
        if found != ARCHIVE_MAGIC {
            return Err(DumpError::FormatMismatch { found });
        }
        Ok(WalkState::ExpectHeader)
    }

    fn read_header(&mut self) -> Result<WalkState> {
        let (raw, _) = read_document(&mut self.reader, &self.limits)?;
        self.header = self.decoder.decode_document(&raw)?;
        Ok(WalkState::ReadingMetadata)
    }

    fn read_metadata<W: Write>(&mut self, diagnostics: &mut W) -> Result<WalkState> {
        if self.reader.peek(TERMINATOR.len())? == TERMINATOR {
            tracing::debug!(collections = self.collections.len(), "reached metadata terminator");
            return Ok(WalkState::Done);
        }

        let (raw, _) = read_document(&mut self.reader, &self.limits)?;
        let mut doc = self.decoder.decode_document(&raw)?;
        let index = self.collections.len();
        for (key, value) in doc.iter_mut() {
            if key == METADATA_FIELD {
                self.expand_metadata(value, index, diagnostics);
            }
        }
        self.collections.push(doc);
        Ok(WalkState::ReadingMetadata)
    }

    /// Replace a string-encoded metadata value with the document it holds.
    ///
    /// Anything that cannot be expanded is reported and left untouched.
    fn expand_metadata<W: Write>(
        &mut self,
        value: &mut Value,
        index: usize,
        diagnostics: &mut W,
    ) {
        let outcome = match &*value {
            Value::String(text) => {
                parse_legacy_ext_json(text, &self.decoder).map_err(|err| err.to_string())
            }
            other => Err(format!(
                "expected a string, found {}",
                other.element_type().name()
            )),
        };

        match outcome {
            Ok(parsed) => *value = Value::Document(parsed),
            Err(reason) => {
                let warning = DumpError::MetadataParse(reason).to_string();
                tracing::warn!(collection = index, "{warning}");
                if let Err(err) = writeln!(diagnostics, "{warning}") {
                    tracing::error!(error = %err, "failed to write metadata warning");
                }
                self.warnings.push(MetadataWarning {
                    index,
                    message: warning,
                });
            }
        }
    }
}
