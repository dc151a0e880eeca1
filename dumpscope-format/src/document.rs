//! BSON document wire codec
//!
//! A document is `[i32 LE length][elements...][0x00]`, where the length
//! counts its own four bytes and the trailing NUL. Each element is a type
//! tag, a NUL-terminated key and a type-specific payload.

use crate::constants::*;
use crate::decimal::Decimal128;
use crate::error::{DumpError, Result};
use crate::limits::Limits;
use crate::types::ElementType;
use crate::value::{
    Binary, CodeWithScope, DateTime, DbPointer, Document, ObjectId, Regex, Timestamp, Value,
};

/// Decode one complete document.
///
/// `bytes` must hold exactly one document: its length prefix has to match
/// `bytes.len()`.
pub fn decode_document(bytes: &[u8], limits: &Limits) -> Result<Document> {
    let mut decoder = DocumentDecoder {
        data: bytes,
        x: 0,
        depth: 0,
        limits,
    };
    let doc = decoder.read_document()?;
    if decoder.x != bytes.len() {
        return Err(DumpError::Corrupt(format!(
            "{} trailing bytes after document",
            bytes.len() - decoder.x
        )));
    }
    Ok(doc)
}

/// Encode a document to its wire form
pub fn encode_document(doc: &Document) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_document(&mut buf, doc.iter())?;
    Ok(buf)
}

struct DocumentDecoder<'a> {
    data: &'a [u8],
    x: usize,
    depth: usize,
    limits: &'a Limits,
}

impl<'a> DocumentDecoder<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .x
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| DumpError::Corrupt("element extends past end of document".to_string()))?;
        let slice = &self.data[self.x..end];
        self.x = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn i32_le(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    fn u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn i64_le(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.array()?))
    }

    fn f64_le(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.array()?))
    }

    fn read_document(&mut self) -> Result<Document> {
        self.depth += 1;
        self.limits.check_depth(self.depth)?;

        let start = self.x;
        let len = self.limits.check_document_length(self.i32_le()?)?;
        let end = start + len;
        if end > self.data.len() {
            return Err(DumpError::Corrupt(format!(
                "document length {len} exceeds the {} bytes available",
                self.data.len() - start
            )));
        }
        let terminator = end - 1;

        let mut doc = Document::new();
        while self.x < terminator {
            let tag = self.u8()?;
            if tag == 0 {
                return Err(DumpError::Corrupt(
                    "document terminator before end of document".to_string(),
                ));
            }
            let key = self.read_cstring()?;
            let ty = ElementType::from_u8(tag).ok_or_else(|| DumpError::UnknownType {
                tag,
                key: key.clone(),
            })?;
            let value = self.read_element_value(ty)?;
            doc.push(key, value);
        }

        if self.x != terminator {
            return Err(DumpError::Corrupt(
                "element overruns document boundary".to_string(),
            ));
        }
        if self.data[terminator] != 0 {
            return Err(DumpError::Corrupt("missing document terminator".to_string()));
        }
        self.x = end;
        self.depth -= 1;
        Ok(doc)
    }

    fn read_cstring(&mut self) -> Result<String> {
        let rest = &self.data[self.x..];
        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| DumpError::Corrupt("unterminated key or cstring".to_string()))?;
        let s = std::str::from_utf8(&rest[..nul])
            .map_err(|_| DumpError::Corrupt("invalid UTF-8 in cstring".to_string()))?
            .to_string();
        self.x += nul + 1;
        Ok(s)
    }

    fn read_string(&mut self) -> Result<String> {
        let len = self.i32_le()?;
        if len < 1 {
            return Err(DumpError::Corrupt(format!("invalid string length {len}")));
        }
        let bytes = self.take(len as usize)?;
        let (body, nul) = bytes.split_at(bytes.len() - 1);
        if nul != [0] {
            return Err(DumpError::Corrupt("string is not NUL-terminated".to_string()));
        }
        String::from_utf8(body.to_vec())
            .map_err(|_| DumpError::Corrupt("invalid UTF-8 in string".to_string()))
    }

    fn read_element_value(&mut self, ty: ElementType) -> Result<Value> {
        let value = match ty {
            ElementType::Double => Value::Double(self.f64_le()?),
            ElementType::String => Value::String(self.read_string()?),
            ElementType::Document => Value::Document(self.read_document()?),
            ElementType::Array => Value::Array(self.read_array()?),
            ElementType::Binary => Value::Binary(self.read_binary()?),
            ElementType::Undefined => Value::Undefined,
            ElementType::ObjectId => Value::ObjectId(ObjectId::from_bytes(self.array()?)),
            ElementType::Boolean => match self.u8()? {
                0 => Value::Boolean(false),
                1 => Value::Boolean(true),
                other => {
                    return Err(DumpError::Corrupt(format!("invalid boolean byte 0x{other:02x}")))
                }
            },
            ElementType::DateTime => Value::DateTime(DateTime::from_millis(self.i64_le()?)),
            ElementType::Null => Value::Null,
            ElementType::Regex => Value::Regex(Regex {
                pattern: self.read_cstring()?,
                options: self.read_cstring()?,
            }),
            ElementType::DbPointer => Value::DbPointer(DbPointer {
                namespace: self.read_string()?,
                id: ObjectId::from_bytes(self.array()?),
            }),
            ElementType::JavaScriptCode => Value::JavaScriptCode(self.read_string()?),
            ElementType::Symbol => Value::Symbol(self.read_string()?),
            ElementType::JavaScriptCodeWithScope => self.read_code_with_scope()?,
            ElementType::Int32 => Value::Int32(self.i32_le()?),
            ElementType::Timestamp => {
                let increment = self.u32_le()?;
                let time = self.u32_le()?;
                Value::Timestamp(Timestamp { time, increment })
            }
            ElementType::Int64 => Value::Int64(self.i64_le()?),
            ElementType::Decimal128 => Value::Decimal128(Decimal128::from_bytes(self.array()?)),
            ElementType::MaxKey => Value::MaxKey,
            ElementType::MinKey => Value::MinKey,
        };
        Ok(value)
    }

    fn read_array(&mut self) -> Result<Vec<Value>> {
        // Index keys are positional; wire order is kept
        Ok(self.read_document()?.into_iter().map(|(_, v)| v).collect())
    }

    fn read_binary(&mut self) -> Result<Binary> {
        let len = self.i32_le()?;
        if len < 0 {
            return Err(DumpError::Corrupt(format!("invalid binary length {len}")));
        }
        let subtype = self.u8()?;
        let mut payload = self.take(len as usize)?;
        if subtype == BINARY_SUBTYPE_BINARY_OLD {
            if payload.len() < 4 {
                return Err(DumpError::Corrupt("old binary payload too short".to_string()));
            }
            let (inner, rest) = payload.split_at(4);
            let inner_len = i32::from_le_bytes([inner[0], inner[1], inner[2], inner[3]]);
            if inner_len < 0 || inner_len as usize != rest.len() {
                return Err(DumpError::Corrupt(format!(
                    "old binary inner length {inner_len} does not match payload"
                )));
            }
            payload = rest;
        }
        Ok(Binary {
            subtype,
            bytes: payload.to_vec(),
        })
    }

    fn read_code_with_scope(&mut self) -> Result<Value> {
        let start = self.x;
        let total = self.i32_le()?;
        let code = self.read_string()?;
        let scope = self.read_document()?;
        if i64::from(total) != (self.x - start) as i64 {
            return Err(DumpError::Corrupt(format!(
                "code with scope length {total} does not match contents"
            )));
        }
        Ok(Value::JavaScriptCodeWithScope(CodeWithScope { code, scope }))
    }
}

fn write_document<'a>(buf: &mut Vec<u8>, entries: impl Iterator<Item = (&'a str, &'a Value)>) -> Result<()> {
    let start = buf.len();
    buf.extend_from_slice(&[0u8; PREFIX_LEN]);
    for (key, value) in entries {
        buf.push(value.element_type() as u8);
        write_cstring(buf, key)?;
        write_value(buf, value)?;
    }
    buf.push(0);
    patch_length(buf, start)
}

fn patch_length(buf: &mut [u8], start: usize) -> Result<()> {
    let len = i32::try_from(buf.len() - start)
        .map_err(|_| DumpError::Corrupt("document too large to encode".to_string()))?;
    buf[start..start + PREFIX_LEN].copy_from_slice(&len.to_le_bytes());
    Ok(())
}

fn write_cstring(buf: &mut Vec<u8>, s: &str) -> Result<()> {
    if s.as_bytes().contains(&0) {
        return Err(DumpError::Corrupt(format!("cstring {s:?} contains NUL")));
    }
    buf.extend_from_slice(s.as_bytes());
    buf.push(0);
    Ok(())
}

fn write_string(buf: &mut Vec<u8>, s: &str) -> Result<()> {
    let len = i32::try_from(s.len() + 1)
        .map_err(|_| DumpError::Corrupt("string too large to encode".to_string()))?;
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
    buf.push(0);
    Ok(())
}

fn write_value(buf: &mut Vec<u8>, value: &Value) -> Result<()> {
    match value {
        Value::Null | Value::Undefined | Value::MinKey | Value::MaxKey => {}
        Value::Boolean(b) => buf.push(u8::from(*b)),
        Value::Int32(n) => buf.extend_from_slice(&n.to_le_bytes()),
        Value::Int64(n) => buf.extend_from_slice(&n.to_le_bytes()),
        Value::Double(f) => buf.extend_from_slice(&f.to_le_bytes()),
        Value::Decimal128(d) => buf.extend_from_slice(&d.bytes()),
        Value::String(s) | Value::JavaScriptCode(s) | Value::Symbol(s) => write_string(buf, s)?,
        Value::Binary(bin) => {
            let old = bin.subtype == BINARY_SUBTYPE_BINARY_OLD;
            let payload_len = bin.bytes.len() + if old { 4 } else { 0 };
            let len = i32::try_from(payload_len)
                .map_err(|_| DumpError::Corrupt("binary too large to encode".to_string()))?;
            buf.extend_from_slice(&len.to_le_bytes());
            buf.push(bin.subtype);
            if old {
                buf.extend_from_slice(&(len - 4).to_le_bytes());
            }
            buf.extend_from_slice(&bin.bytes);
        }
        Value::ObjectId(id) => buf.extend_from_slice(&id.bytes()),
        Value::DateTime(dt) => buf.extend_from_slice(&dt.timestamp_millis().to_le_bytes()),
        Value::Timestamp(ts) => {
            buf.extend_from_slice(&ts.increment.to_le_bytes());
            buf.extend_from_slice(&ts.time.to_le_bytes());
        }
        Value::Regex(re) => {
            write_cstring(buf, &re.pattern)?;
            write_cstring(buf, &re.options)?;
        }
        Value::DbPointer(ptr) => {
            write_string(buf, &ptr.namespace)?;
            buf.extend_from_slice(&ptr.id.bytes());
        }
        Value::JavaScriptCodeWithScope(cws) => {
            let start = buf.len();
            buf.extend_from_slice(&[0u8; PREFIX_LEN]);
            write_string(buf, &cws.code)?;
            write_document(buf, cws.scope.iter())?;
            patch_length(buf, start)?;
        }
        Value::Document(doc) => write_document(buf, doc.iter())?,
        Value::Array(items) => {
            let keys: Vec<String> = (0..items.len()).map(|i| i.to_string()).collect();
            write_document(buf, keys.iter().map(String::as_str).zip(items.iter()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::new()
            .with("version", "0.1")
            .with("n", 42i32)
            .with("big", -7i64)
            .with("ratio", 0.25f64)
            .with("ok", true)
            .with("nothing", Value::Null)
            .with("nested", Document::new().with("x", 1i32))
            .with("list", vec![Value::from("a"), Value::Int32(2)])
    }

    #[test]
    fn test_encode_matches_hand_built_bytes() {
        let doc = Document::new().with("a", 1i32);
        let bytes = encode_document(&doc).unwrap();
        assert_eq!(
            bytes,
            vec![0x0C, 0, 0, 0, 0x10, b'a', 0, 1, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_empty_document() {
        let bytes = [5u8, 0, 0, 0, 0];
        let doc = decode_document(&bytes, &Limits::default()).unwrap();
        assert!(doc.is_empty());
        assert_eq!(encode_document(&doc).unwrap(), bytes);
    }

    #[test]
    fn test_decode_preserves_order_and_duplicates() {
        let doc = Document::new()
            .with("z", 1i32)
            .with("a", 2i32)
            .with("z", 3i32);
        let decoded = decode_document(&encode_document(&doc).unwrap(), &Limits::default()).unwrap();
        let keys: Vec<&str> = decoded.keys().collect();
        assert_eq!(keys, vec!["z", "a", "z"]);
        assert_eq!(decoded, doc);
    }

    #[test]
    fn test_roundtrip_all_element_types() {
        let id = ObjectId::parse_hex("0123456789abcdef01234567").unwrap();
        let doc = sample()
            .with("dec", Value::Decimal128("1.5".parse().unwrap()))
            .with("bin", Value::Binary(Binary { subtype: 0x04, bytes: vec![1, 2, 3] }))
            .with("old", Value::Binary(Binary { subtype: 0x02, bytes: vec![9, 8] }))
            .with("undef", Value::Undefined)
            .with("id", Value::ObjectId(id))
            .with("when", Value::DateTime(DateTime::from_millis(-1_500)))
            .with("re", Value::Regex(Regex { pattern: "^a".into(), options: "i".into() }))
            .with("ptr", Value::DbPointer(DbPointer { namespace: "db.c".into(), id }))
            .with("code", Value::JavaScriptCode("f()".into()))
            .with("sym", Value::Symbol("s".into()))
            .with(
                "cws",
                Value::JavaScriptCodeWithScope(CodeWithScope {
                    code: "x + 1".into(),
                    scope: Document::new().with("x", 1i32),
                }),
            )
            .with("ts", Value::Timestamp(Timestamp { time: 7, increment: 9 }))
            .with("min", Value::MinKey)
            .with("max", Value::MaxKey);

        let bytes = encode_document(&doc).unwrap();
        let decoded = decode_document(&bytes, &Limits::default()).unwrap();
        assert_eq!(decoded, doc);
    }

    #[test]
    fn test_timestamp_wire_order() {
        let doc = Document::new().with("ts", Value::Timestamp(Timestamp { time: 1, increment: 2 }));
        let bytes = encode_document(&doc).unwrap();
        // tag + "ts\0" after the length prefix, then increment, then time
        assert_eq!(&bytes[8..16], &[2, 0, 0, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn test_unknown_type_names_key() {
        let mut bytes = encode_document(&Document::new().with("k", 1i32)).unwrap();
        bytes[4] = 0x42;
        match decode_document(&bytes, &Limits::default()) {
            Err(DumpError::UnknownType { tag, key }) => {
                assert_eq!(tag, 0x42);
                assert_eq!(key, "k");
            }
            other => panic!("expected UnknownType, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_bad_length_prefix() {
        let bytes = [4u8, 0, 0, 0];
        assert!(matches!(
            decode_document(&bytes, &Limits::default()),
            Err(DumpError::MalformedLength(4))
        ));
    }

    #[test]
    fn test_rejects_overrunning_element() {
        // String claims 100 bytes inside a 16-byte document
        let mut bytes = encode_document(&Document::new().with("s", "abc")).unwrap();
        bytes[7..11].copy_from_slice(&100i32.to_le_bytes());
        assert!(matches!(
            decode_document(&bytes, &Limits::default()),
            Err(DumpError::Corrupt(_))
        ));
    }

    #[test]
    fn test_rejects_missing_terminator() {
        let mut bytes = encode_document(&Document::new().with("a", 1i32)).unwrap();
        let last = bytes.len() - 1;
        bytes[last] = 7;
        assert!(matches!(
            decode_document(&bytes, &Limits::default()),
            Err(DumpError::Corrupt(_))
        ));
    }

    #[test]
    fn test_rejects_invalid_boolean() {
        let mut bytes = encode_document(&Document::new().with("b", true)).unwrap();
        bytes[7] = 2;
        assert!(matches!(
            decode_document(&bytes, &Limits::default()),
            Err(DumpError::Corrupt(msg)) if msg.contains("boolean")
        ));
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        let mut bytes = encode_document(&Document::new()).unwrap();
        bytes.push(0);
        assert!(matches!(
            decode_document(&bytes, &Limits::default()),
            Err(DumpError::Corrupt(_))
        ));
    }

    #[test]
    fn test_nesting_depth_limit() {
        let mut doc = Document::new().with("leaf", 1i32);
        for _ in 0..5 {
            doc = Document::new().with("d", doc);
        }
        let bytes = encode_document(&doc).unwrap();

        let tight = Limits {
            max_nesting_depth: 3,
            ..Limits::default()
        };
        assert!(matches!(
            decode_document(&bytes, &tight),
            Err(DumpError::DepthExceeded(3))
        ));
        assert!(decode_document(&bytes, &Limits::default()).is_ok());
    }

    #[test]
    fn test_encode_rejects_nul_in_key() {
        let doc = Document::new().with("a\0b", 1i32);
        assert!(encode_document(&doc).is_err());
    }
}
