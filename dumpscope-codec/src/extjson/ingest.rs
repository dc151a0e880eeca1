//! Loose JSON ingestion

use dumpscope_format::{Document, DumpError, Result, Value};

use super::special::SpecialKeyDecoder;

/// Convert parsed JSON into the value model without special-key handling.
///
/// Integers become int32 when they fit, int64 when they fit that, and
/// doubles otherwise. Object key order is preserved.
pub fn json_to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                match i32::try_from(i) {
                    Ok(small) => Value::Int32(small),
                    Err(_) => Value::Int64(i),
                }
            } else {
                Value::Double(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => Value::Array(items.iter().map(json_to_value).collect()),
        serde_json::Value::Object(map) => Value::Document(
            map.iter()
                .map(|(key, value)| (key.as_str(), json_to_value(value)))
                .collect(),
        ),
    }
}

/// Parse legacy extended JSON text into a decoded document.
///
/// The text must hold a single JSON object.
pub fn parse_legacy_ext_json(text: &str, decoder: &SpecialKeyDecoder) -> Result<Document> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    match json_to_value(&json) {
        Value::Document(doc) => decoder.decode_document(&doc),
        other => Err(DumpError::Corrupt(format!(
            "expected a JSON object, found {}",
            other.element_type().name()
        ))),
    }
}
