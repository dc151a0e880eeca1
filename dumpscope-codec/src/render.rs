//! Modern extended JSON output
//!
//! Relaxed mode keeps numbers and in-range dates human readable; canonical
//! mode wraps every non-JSON-native type so the exact type survives a
//! re-parse.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{Datelike, TimeZone, Utc};
use dumpscope_format::{Document, Result, Value};
use serde_json::{json, Map};

/// Output flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtJsonMode {
    /// Native JSON numbers and ISO-8601 dates where lossless
    #[default]
    Relaxed,
    /// Type-preserving wrappers for every number and date
    Canonical,
}

/// Render a value tree
pub fn to_ext_json(value: &Value, mode: ExtJsonMode) -> serde_json::Value {
    let canonical = mode == ExtJsonMode::Canonical;
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => json!(b),
        Value::String(s) => json!(s),
        Value::Int32(n) if canonical => json!({ "$numberInt": n.to_string() }),
        Value::Int32(n) => json!(n),
        Value::Int64(n) if canonical => json!({ "$numberLong": n.to_string() }),
        Value::Int64(n) => json!(n),
        Value::Double(f) => render_double(*f, canonical),
        Value::Decimal128(d) => json!({ "$numberDecimal": d.to_string() }),
        Value::Binary(bin) => json!({
            "$binary": {
                "base64": STANDARD.encode(&bin.bytes),
                "subType": format!("{:02x}", bin.subtype),
            }
        }),
        Value::ObjectId(id) => json!({ "$oid": id.to_hex() }),
        Value::DateTime(dt) => render_date(dt.timestamp_millis(), canonical),
        Value::Timestamp(ts) => json!({ "$timestamp": { "t": ts.time, "i": ts.increment } }),
        Value::Regex(re) => {
            let mut options: Vec<char> = re.options.chars().collect();
            options.sort_unstable();
            json!({
                "$regularExpression": {
                    "pattern": re.pattern,
                    "options": options.into_iter().collect::<String>(),
                }
            })
        }
        Value::JavaScriptCode(code) => json!({ "$code": code }),
        Value::JavaScriptCodeWithScope(cws) => json!({
            "$code": cws.code,
            "$scope": document_to_ext_json(&cws.scope, mode),
        }),
        Value::Symbol(s) => json!({ "$symbol": s }),
        Value::DbPointer(ptr) => json!({
            "$dbPointer": { "$ref": ptr.namespace, "$id": { "$oid": ptr.id.to_hex() } }
        }),
        Value::Undefined => json!({ "$undefined": true }),
        Value::MinKey => json!({ "$minKey": 1 }),
        Value::MaxKey => json!({ "$maxKey": 1 }),
        Value::Document(doc) => document_to_ext_json(doc, mode),
        Value::Array(items) => serde_json::Value::Array(
            items.iter().map(|item| to_ext_json(item, mode)).collect(),
        ),
    }
}

/// Render a document as a JSON object.
///
/// JSON objects cannot repeat keys; a later duplicate replaces the earlier
/// value in the earlier position.
pub fn document_to_ext_json(doc: &Document, mode: ExtJsonMode) -> serde_json::Value {
    let mut map = Map::with_capacity(doc.len());
    for (key, value) in doc.iter() {
        map.insert(key.to_string(), to_ext_json(value, mode));
    }
    serde_json::Value::Object(map)
}

/// Render a document to text
pub fn to_ext_json_string(doc: &Document, mode: ExtJsonMode, pretty: bool) -> Result<String> {
    let value = document_to_ext_json(doc, mode);
    let text = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    Ok(text)
}

fn render_double(f: f64, canonical: bool) -> serde_json::Value {
    let literal = if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        (if f > 0.0 { "Infinity" } else { "-Infinity" }).to_string()
    } else if canonical || (f == 0.0 && f.is_sign_negative()) {
        format!("{f:?}")
    } else {
        return json!(f);
    };
    json!({ "$numberDouble": literal })
}

fn render_date(millis: i64, canonical: bool) -> serde_json::Value {
    if !canonical {
        if let Some(dt) = Utc.timestamp_millis_opt(millis).single() {
            if (1970..=9999).contains(&dt.year()) {
                let mut iso = dt.format("%Y-%m-%dT%H:%M:%S").to_string();
                let frac = millis.rem_euclid(1_000);
                if frac != 0 {
                    let digits = format!("{frac:03}");
                    iso.push('.');
                    iso.push_str(digits.trim_end_matches('0'));
                }
                iso.push('Z');
                return json!({ "$date": iso });
            }
        }
    }
    json!({ "$date": { "$numberLong": millis.to_string() } })
}
