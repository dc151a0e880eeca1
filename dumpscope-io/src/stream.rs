//! Document stream reader

use std::io::{self, Read};

use dumpscope_format::constants::PREFIX_LEN;
use dumpscope_format::{decode_document, Document, DumpError, Limits, Result};

/// Read one length-prefixed document from `reader`.
///
/// On success exactly `length` bytes have been consumed and that count is
/// returned with the document. After an error the stream position is
/// unspecified.
pub fn read_document<R: Read>(reader: &mut R, limits: &Limits) -> Result<(Document, usize)> {
    let mut prefix = [0u8; PREFIX_LEN];
    read_exact_or_truncated(reader, &mut prefix, "document length prefix")?;

    let declared = i32::from_le_bytes(prefix);
    let length = limits.check_document_length(declared)?;

    let mut bytes = vec![0u8; length];
    bytes[..PREFIX_LEN].copy_from_slice(&prefix);
    read_exact_or_truncated(reader, &mut bytes[PREFIX_LEN..], "document body")?;

    let doc = decode_document(&bytes, limits)?;
    tracing::debug!(length, fields = doc.len(), "read document");
    Ok((doc, length))
}

pub(crate) fn read_exact_or_truncated<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    context: &'static str,
) -> Result<()> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Err(DumpError::Truncated(context)),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dumpscope_format::{encode_document, Value};
    use std::io::Cursor;

    #[test]
    fn test_reads_exactly_one_document() {
        let first = Document::new().with("a", 1i32);
        let second = Document::new().with("b", "two");
        let mut bytes = encode_document(&first).unwrap();
        let first_len = bytes.len();
        bytes.extend(encode_document(&second).unwrap());

        let mut cursor = Cursor::new(bytes);
        let (doc, consumed) = read_document(&mut cursor, &Limits::default()).unwrap();
        assert_eq!(doc, first);
        assert_eq!(consumed, first_len);
        assert_eq!(cursor.position() as usize, first_len);

        let (doc, _) = read_document(&mut cursor, &Limits::default()).unwrap();
        assert_eq!(doc.get("b"), Some(&Value::from("two")));
    }

    #[test]
    fn test_empty_document() {
        let mut cursor = Cursor::new(vec![5, 0, 0, 0, 0]);
        let (doc, consumed) = read_document(&mut cursor, &Limits::default()).unwrap();
        assert!(doc.is_empty());
        assert_eq!(consumed, 5);
    }

    #[test]
    fn test_short_prefix_is_truncated() {
        let mut cursor = Cursor::new(vec![5, 0]);
        assert!(matches!(
            read_document(&mut cursor, &Limits::default()),
            Err(DumpError::Truncated("document length prefix"))
        ));
    }

    #[test]
    fn test_short_body_is_truncated() {
        let mut bytes = encode_document(&Document::new().with("k", "value")).unwrap();
        bytes.truncate(bytes.len() - 3);
        assert!(matches!(
            read_document(&mut Cursor::new(bytes), &Limits::default()),
            Err(DumpError::Truncated("document body"))
        ));
    }

    #[test]
    fn test_length_out_of_bounds() {
        for declared in [4i32, -1, 0x7FFF_FFFF] {
            let mut bytes = declared.to_le_bytes().to_vec();
            bytes.extend([0u8; 16]);
            assert!(matches!(
                read_document(&mut Cursor::new(bytes), &Limits::default()),
                Err(DumpError::MalformedLength(n)) if n == declared
            ));
        }
    }

    #[test]
    fn test_configured_size_limit() {
        let bytes = encode_document(&Document::new().with("k", "x".repeat(64))).unwrap();
        let limits = Limits {
            max_document_size: 32,
            ..Limits::default()
        };
        assert!(matches!(
            read_document(&mut Cursor::new(bytes), &limits),
            Err(DumpError::MalformedLength(_))
        ));
    }

    #[test]
    fn test_unknown_type_tag() {
        // {"k": <tag 0x42>}
        let bytes = vec![8, 0, 0, 0, 0x42, b'k', 0, 0];
        assert!(matches!(
            read_document(&mut Cursor::new(bytes), &Limits::default()),
            Err(DumpError::UnknownType { tag: 0x42, ref key }) if key == "k"
        ));
    }
}
