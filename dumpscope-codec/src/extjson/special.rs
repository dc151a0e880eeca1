//! Special-key recognition
//!
//! A document is a wrapper when its distinct key count and key names match
//! one of the forms below. Forms are tried in table order and the first
//! match wins. Documents that match nothing are decoded entry by entry.
//!
//! | keys | becomes |
//! |------|---------|
//! | `$date` | UTC datetime |
//! | `$code` | JavaScript code |
//! | `$oid` | object id |
//! | `$numberLong` / `$numberInt` | int64 / int32 |
//! | `$timestamp` | cluster timestamp |
//! | `$numberDecimal` | decimal128 |
//! | `$undefined` / `$maxKey` / `$minKey` | sentinels |
//! | `$code` + `$scope` | code with scope |
//! | `$regex` + `$options` | regular expression |
//! | `$binary` + `$type` | binary |

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use dumpscope_format::constants::DEFAULT_MAX_NESTING_DEPTH;
use dumpscope_format::{
    Binary, CodeWithScope, DateTime, Decimal128, Document, DumpError, ObjectId, Regex, Result,
    Timestamp, Value,
};

use super::date::{split_epoch_millis, DateParser, LegacyDateParser};
use super::ingest::json_to_value;
use super::numeric::parse_int_literal;

type SingleHandler = fn(&SpecialKeyDecoder, &Value) -> Result<Value>;
type PairHandler = fn(&SpecialKeyDecoder, &Value, &Value, usize) -> Result<Value>;

const SINGLE_FORMS: &[(&str, SingleHandler)] = &[
    ("$date", SpecialKeyDecoder::date),
    ("$code", SpecialKeyDecoder::code),
    ("$oid", SpecialKeyDecoder::oid),
    ("$numberLong", SpecialKeyDecoder::number_long),
    ("$numberInt", SpecialKeyDecoder::number_int),
    ("$timestamp", SpecialKeyDecoder::timestamp),
    ("$numberDecimal", SpecialKeyDecoder::number_decimal),
    ("$undefined", SpecialKeyDecoder::undefined),
    ("$maxKey", SpecialKeyDecoder::max_key),
    ("$minKey", SpecialKeyDecoder::min_key),
];

/// Two-key forms, keyed by the field that triggers them. Once the lead key
/// is present the partner is required.
const PAIR_FORMS: &[(&str, &str, PairHandler)] = &[
    ("$code", "$scope", SpecialKeyDecoder::code_with_scope),
    ("$regex", "$options", SpecialKeyDecoder::regex),
    ("$binary", "$type", SpecialKeyDecoder::binary),
];

const REGEX_OPTIONS: &[char] = &['g', 'i', 'm', 's'];

/// Replaces legacy extended JSON wrappers with typed values.
///
/// The decoder is a pure transform; it never mutates its input. Decoding
/// its own output yields the same tree, since typed values are never
/// wrapper documents.
pub struct SpecialKeyDecoder {
    date_parser: Box<dyn DateParser>,
    max_depth: usize,
}

impl Default for SpecialKeyDecoder {
    fn default() -> Self {
        Self {
            date_parser: Box::new(LegacyDateParser),
            max_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl fmt::Debug for SpecialKeyDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecialKeyDecoder")
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

impl SpecialKeyDecoder {
    /// Decoder with the legacy date parser and default depth limit
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `parser` for string `$date` payloads
    pub fn with_date_parser(mut self, parser: impl DateParser + 'static) -> Self {
        self.date_parser = Box::new(parser);
        self
    }

    /// Limit nesting of documents and arrays
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Configured nesting limit
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Decode any value, recognising wrappers at every level
    pub fn decode(&self, value: &Value) -> Result<Value> {
        self.decode_value(value, 0)
    }

    /// Decode the values of a top-level document.
    ///
    /// The document itself is treated as a container and is never replaced
    /// by a typed value, even if its shape matches a wrapper.
    pub fn decode_document(&self, doc: &Document) -> Result<Document> {
        self.decode_entries(doc, 1)
    }

    /// Ingest loose JSON and decode it
    pub fn decode_json(&self, json: &serde_json::Value) -> Result<Value> {
        self.decode(&json_to_value(json))
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(DumpError::DepthExceeded(self.max_depth));
        }
        Ok(())
    }

    fn decode_value(&self, value: &Value, depth: usize) -> Result<Value> {
        match value {
            Value::Document(doc) => match self.recognize(doc, depth)? {
                Some(typed) => Ok(typed),
                None => Ok(Value::Document(self.decode_entries(doc, depth + 1)?)),
            },
            Value::Array(items) => {
                self.check_depth(depth + 1)?;
                let items = items
                    .iter()
                    .map(|item| self.decode_value(item, depth + 1))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::Array(items))
            }
            other => Ok(other.clone()),
        }
    }

    fn decode_entries(&self, doc: &Document, depth: usize) -> Result<Document> {
        self.check_depth(depth)?;
        let mut out = Document::with_capacity(doc.len());
        for (key, value) in doc.iter() {
            out.push(key, self.decode_value(value, depth)?);
        }
        Ok(out)
    }

    /// Match `doc` against the wrapper forms.
    ///
    /// Keys are counted once each; when a key repeats, its last value is
    /// the one used.
    fn recognize(&self, doc: &Document, depth: usize) -> Result<Option<Value>> {
        match doc.distinct_len_up_to(3) {
            1 => {
                for &(key, handler) in SINGLE_FORMS {
                    if let Some(payload) = last(doc, key) {
                        tracing::trace!(key, "decoding special key");
                        return handler(self, payload).map(Some);
                    }
                }
                Ok(None)
            }
            2 => {
                for &(lead, partner, handler) in PAIR_FORMS {
                    let Some(first) = last(doc, lead) else {
                        continue;
                    };
                    let Some(second) = last(doc, partner) else {
                        return Err(DumpError::SpecialKeyShape {
                            key: lead,
                            reason: format!("expected {partner} field with {lead} field"),
                        });
                    };
                    tracing::trace!(key = lead, "decoding special key pair");
                    return handler(self, first, second, depth).map(Some);
                }
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn date(&self, payload: &Value) -> Result<Value> {
        let millis = match payload {
            Value::String(s) => return self.date_parser.parse_date(s).map(Value::DateTime),
            Value::DateTime(dt) => return Ok(Value::DateTime(*dt)),
            Value::Document(inner) => match last(inner, "$numberLong") {
                Some(literal) => number_long_literal(literal)?,
                None => {
                    return Err(DumpError::SpecialKeyShape {
                        key: "$date",
                        reason: "expected $numberLong field in $date".to_string(),
                    })
                }
            },
            Value::Double(f) => *f as i64,
            Value::Int32(n) => i64::from(*n),
            Value::Int64(n) => *n,
            other => return Err(shape("$date", "invalid type for $date field", other)),
        };
        let (secs, nanos) = split_epoch_millis(millis);
        Ok(Value::DateTime(DateTime::from_parts(secs, nanos)))
    }

    fn code(&self, payload: &Value) -> Result<Value> {
        Ok(Value::JavaScriptCode(expect_str("$code", payload)?.to_string()))
    }

    fn oid(&self, payload: &Value) -> Result<Value> {
        ObjectId::parse_hex(expect_str("$oid", payload)?).map(Value::ObjectId)
    }

    fn number_long(&self, payload: &Value) -> Result<Value> {
        number_long_literal(payload).map(Value::Int64)
    }

    fn number_int(&self, payload: &Value) -> Result<Value> {
        let literal = expect_str("$numberInt", payload)?;
        let n = parse_int_literal(literal, 32).map_err(|reason| DumpError::Encoding {
            key: "$numberInt",
            reason,
        })?;
        // parse_int_literal bounds the result to 32 bits
        Ok(Value::Int32(n as i32))
    }

    fn timestamp(&self, payload: &Value) -> Result<Value> {
        let Value::Document(fields) = payload else {
            return Err(shape(
                "$timestamp",
                "expected $timestamp key to have internal document",
                payload,
            ));
        };
        let time = timestamp_field(fields, "t")?;
        let increment = timestamp_field(fields, "i")?;
        Ok(Value::Timestamp(Timestamp { time, increment }))
    }

    fn number_decimal(&self, payload: &Value) -> Result<Value> {
        Decimal128::from_str_exact(expect_str("$numberDecimal", payload)?).map(Value::Decimal128)
    }

    fn undefined(&self, _payload: &Value) -> Result<Value> {
        Ok(Value::Undefined)
    }

    fn max_key(&self, _payload: &Value) -> Result<Value> {
        Ok(Value::MaxKey)
    }

    fn min_key(&self, _payload: &Value) -> Result<Value> {
        Ok(Value::MinKey)
    }

    fn code_with_scope(&self, code: &Value, scope: &Value, depth: usize) -> Result<Value> {
        let code = expect_str("$code", code)?.to_string();
        let Value::Document(scope) = scope else {
            return Err(shape("$scope", "expected $scope field to contain a document", scope));
        };
        let scope = self.decode_entries(scope, depth + 1)?;
        Ok(Value::JavaScriptCodeWithScope(CodeWithScope { code, scope }))
    }

    fn regex(&self, pattern: &Value, options: &Value, _depth: usize) -> Result<Value> {
        let pattern = expect_str("$regex", pattern)?.to_string();
        let options = expect_str("$options", options)?;
        if let Some(bad) = options.chars().find(|c| !REGEX_OPTIONS.contains(c)) {
            return Err(DumpError::InvalidRegexOption(bad));
        }
        Ok(Value::Regex(Regex {
            pattern,
            options: options.to_string(),
        }))
    }

    fn binary(&self, data: &Value, subtype: &Value, _depth: usize) -> Result<Value> {
        let bytes = STANDARD
            .decode(expect_str("$binary", data)?)
            .map_err(|err| DumpError::Encoding {
                key: "$binary",
                reason: err.to_string(),
            })?;
        let kind = hex::decode(expect_str("$type", subtype)?).map_err(|err| DumpError::Encoding {
            key: "$type",
            reason: err.to_string(),
        })?;
        let [subtype] = kind.as_slice() else {
            return Err(DumpError::Encoding {
                key: "$type",
                reason: format!(
                    "expected single byte (as hexadecimal string), got {} bytes",
                    kind.len()
                ),
            });
        };
        Ok(Value::Binary(Binary {
            subtype: *subtype,
            bytes,
        }))
    }
}

/// Value of the last entry named `key`
fn last<'a>(doc: &'a Document, key: &str) -> Option<&'a Value> {
    doc.iter().filter(|(k, _)| *k == key).map(|(_, v)| v).last()
}

fn shape(key: &'static str, reason: &str, found: &Value) -> DumpError {
    DumpError::SpecialKeyShape {
        key,
        reason: format!("{reason}, found {}", found.element_type().name()),
    }
}

fn expect_str<'a>(key: &'static str, value: &'a Value) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| shape(key, "expected a string value", value))
}

fn number_long_literal(payload: &Value) -> Result<i64> {
    let literal = expect_str("$numberLong", payload)?;
    parse_int_literal(literal, 64).map_err(|reason| DumpError::Encoding {
        key: "$numberLong",
        reason,
    })
}

/// Coerce a `$timestamp` component to an unsigned 32-bit value.
///
/// Doubles must be integral to coerce.
fn timestamp_field(fields: &Document, name: &'static str) -> Result<u32> {
    let Some(value) = last(fields, name) else {
        return Err(DumpError::SpecialKeyShape {
            key: "$timestamp",
            reason: format!("expected $timestamp to have '{name}' field"),
        });
    };
    let coerced = match value {
        Value::Int32(n) => u32::try_from(*n).ok(),
        Value::Int64(n) => u32::try_from(*n).ok(),
        Value::Double(f) if f.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(f) => {
            Some(*f as u32)
        }
        _ => None,
    };
    coerced.ok_or_else(|| DumpError::SpecialKeyShape {
        key: "$timestamp",
        reason: format!("expected $timestamp '{name}' field to be an unsigned 32-bit number"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(json: serde_json::Value) -> Result<Value> {
        SpecialKeyDecoder::new().decode_json(&json)
    }

    fn wrapper(key: &str, value: impl Into<Value>) -> Value {
        Value::Document(Document::new().with(key, value))
    }

    #[test]
    fn test_date_forms() {
        let decoder = SpecialKeyDecoder::new();
        let cases = vec![
            (json!({"$date": "1970-01-01T00:00:01.5Z"}), 1_500),
            (json!({"$date": {"$numberLong": "-1500"}}), -1_500),
            (json!({"$date": 1500}), 1_500),
            (json!({"$date": 5_000_000_000i64}), 5_000_000_000),
            (json!({"$date": 1500.9}), 1_500),
            (json!({"$date": -1}), -1),
        ];
        for (input, millis) in cases {
            let decoded = decoder.decode_json(&input).unwrap();
            assert_eq!(
                decoded,
                Value::DateTime(DateTime::from_millis(millis)),
                "input {input}"
            );
        }

        let typed = Value::DateTime(DateTime::from_millis(42));
        assert_eq!(decoder.decode(&wrapper("$date", typed.clone())).unwrap(), typed);
    }

    #[test]
    fn test_date_rejects_bad_payloads() {
        assert!(matches!(
            decode(json!({"$date": {"millis": 1}})),
            Err(DumpError::SpecialKeyShape { key: "$date", .. })
        ));
        assert!(matches!(
            decode(json!({"$date": true})),
            Err(DumpError::SpecialKeyShape { key: "$date", .. })
        ));
        assert!(matches!(
            decode(json!({"$date": "not a date"})),
            Err(DumpError::Encoding { key: "$date", .. })
        ));
    }

    #[test]
    fn test_custom_date_parser() {
        struct Fixed;
        impl DateParser for Fixed {
            fn parse_date(&self, _s: &str) -> Result<DateTime> {
                Ok(DateTime::from_millis(7))
            }
        }

        let decoder = SpecialKeyDecoder::new().with_date_parser(Fixed);
        let decoded = decoder.decode_json(&json!({"$date": "whenever"})).unwrap();
        assert_eq!(decoded, Value::DateTime(DateTime::from_millis(7)));
    }

    #[test]
    fn test_scalar_wrappers() {
        assert_eq!(
            decode(json!({"$code": "return 1"})).unwrap(),
            Value::JavaScriptCode("return 1".into())
        );
        assert_eq!(
            decode(json!({"$oid": "5f1b2c3d4e5f60718293a4b5"})).unwrap(),
            Value::ObjectId(ObjectId::parse_hex("5f1b2c3d4e5f60718293a4b5").unwrap())
        );
        assert_eq!(decode(json!({"$numberLong": "0x10"})).unwrap(), Value::Int64(16));
        assert_eq!(decode(json!({"$numberLong": "010"})).unwrap(), Value::Int64(8));
        assert_eq!(decode(json!({"$numberInt": "-7"})).unwrap(), Value::Int32(-7));
        assert_eq!(
            decode(json!({"$numberDecimal": "1.50"})).unwrap(),
            Value::Decimal128(Decimal128::from_str_exact("1.50").unwrap())
        );
        assert_eq!(decode(json!({"$undefined": true})).unwrap(), Value::Undefined);
        assert_eq!(decode(json!({"$maxKey": 1})).unwrap(), Value::MaxKey);
        assert_eq!(decode(json!({"$minKey": "ignored"})).unwrap(), Value::MinKey);
    }

    #[test]
    fn test_scalar_wrapper_errors() {
        assert!(matches!(
            decode(json!({"$oid": "xyz"})),
            Err(DumpError::Encoding { key: "$oid", .. })
        ));
        assert!(matches!(
            decode(json!({"$oid": 5})),
            Err(DumpError::SpecialKeyShape { key: "$oid", .. })
        ));
        assert!(matches!(
            decode(json!({"$numberInt": "2147483648"})),
            Err(DumpError::Encoding { key: "$numberInt", .. })
        ));
        assert!(matches!(
            decode(json!({"$numberLong": 5})),
            Err(DumpError::SpecialKeyShape { key: "$numberLong", .. })
        ));
        assert!(matches!(
            decode(json!({"$numberDecimal": "1.2.3"})),
            Err(DumpError::Encoding { key: "$numberDecimal", .. })
        ));
        assert!(matches!(
            decode(json!({"$code": ["x"]})),
            Err(DumpError::SpecialKeyShape { key: "$code", .. })
        ));
    }

    #[test]
    fn test_timestamp() {
        assert_eq!(
            decode(json!({"$timestamp": {"t": 1700000000u32, "i": 3}})).unwrap(),
            Value::Timestamp(Timestamp {
                time: 1_700_000_000,
                increment: 3
            })
        );
        assert_eq!(
            decode(json!({"$timestamp": {"t": 4294967295u32, "i": 1.0}})).unwrap(),
            Value::Timestamp(Timestamp {
                time: u32::MAX,
                increment: 1
            })
        );

        for bad in [
            json!({"$timestamp": {"t": 1}}),
            json!({"$timestamp": {"i": 1}}),
            json!({"$timestamp": {"t": -1, "i": 1}}),
            json!({"$timestamp": {"t": "1", "i": 1}}),
            json!({"$timestamp": {"t": 1.5, "i": 1}}),
            json!({"$timestamp": 5}),
        ] {
            assert!(
                matches!(decode(bad.clone()), Err(DumpError::SpecialKeyShape { key: "$timestamp", .. })),
                "input {bad}"
            );
        }
    }

    #[test]
    fn test_regex_options() {
        assert_eq!(
            decode(json!({"$regex": "^a", "$options": "gim"})).unwrap(),
            Value::Regex(Regex {
                pattern: "^a".into(),
                options: "gim".into()
            })
        );
        assert_eq!(
            decode(json!({"$options": "", "$regex": "b"})).unwrap(),
            Value::Regex(Regex {
                pattern: "b".into(),
                options: String::new()
            })
        );

        let err = decode(json!({"$regex": "a", "$options": "x"})).unwrap_err();
        assert!(matches!(err, DumpError::InvalidRegexOption('x')));
        assert!(err.to_string().contains("'x'"));
    }

    #[test]
    fn test_binary() {
        assert_eq!(
            decode(json!({"$binary": "AQID", "$type": "00"})).unwrap(),
            Value::Binary(Binary {
                subtype: 0x00,
                bytes: vec![1, 2, 3]
            })
        );
        assert_eq!(
            decode(json!({"$type": "80", "$binary": ""})).unwrap(),
            Value::Binary(Binary {
                subtype: 0x80,
                bytes: Vec::new()
            })
        );

        for bad_type in ["0", "000", "0000", "", "zz"] {
            assert!(
                matches!(
                    decode(json!({"$binary": "AQID", "$type": bad_type})),
                    Err(DumpError::Encoding { key: "$type", .. })
                ),
                "type {bad_type:?}"
            );
        }
        assert!(matches!(
            decode(json!({"$binary": "!!!", "$type": "00"})),
            Err(DumpError::Encoding { key: "$binary", .. })
        ));
    }

    #[test]
    fn test_code_with_scope_decodes_scope() {
        let decoded = decode(json!({
            "$scope": {"n": {"$numberLong": "5"}, "s": "x"},
            "$code": "return n"
        }))
        .unwrap();

        let Value::JavaScriptCodeWithScope(cws) = decoded else {
            panic!("expected code with scope, got {decoded:?}");
        };
        assert_eq!(cws.code, "return n");
        assert_eq!(cws.scope.get("n"), Some(&Value::Int64(5)));
        assert_eq!(cws.scope.get("s"), Some(&Value::from("x")));

        // a scope shaped like a wrapper stays a document
        let decoded = decode(json!({"$code": "f", "$scope": {"$oid": "5f1b2c3d4e5f60718293a4b5"}})).unwrap();
        let Value::JavaScriptCodeWithScope(cws) = decoded else {
            panic!("expected code with scope");
        };
        assert!(matches!(cws.scope.get("$oid"), Some(Value::String(_))));
    }

    #[test]
    fn test_pair_forms_require_partner() {
        for (input, key) in [
            (json!({"$code": "f", "other": 1}), "$code"),
            (json!({"$regex": "a", "other": 1}), "$regex"),
            (json!({"$binary": "AQID", "other": 1}), "$binary"),
        ] {
            let err = decode(input).unwrap_err();
            assert!(
                matches!(err, DumpError::SpecialKeyShape { key: k, .. } if k == key),
                "{err}"
            );
        }
        assert!(matches!(
            decode(json!({"$code": "f", "$scope": 1})),
            Err(DumpError::SpecialKeyShape { key: "$scope", .. })
        ));
    }

    #[test]
    fn test_unmatched_shapes_recurse() {
        let decoded = decode(json!({
            "plain": {"$numberLong": "9"},
            "$options": "i",
            "list": [{"$oid": "5f1b2c3d4e5f60718293a4b5"}, 1, "s"],
            "three": {"$regex": "a", "$options": "i", "x": {"$numberInt": "1"}}
        }))
        .unwrap();

        let doc = decoded.as_document().unwrap();
        assert_eq!(doc.get("plain"), Some(&Value::Int64(9)));
        assert_eq!(doc.get("$options"), Some(&Value::from("i")));

        let list = doc.get("list").and_then(Value::as_array).unwrap();
        assert!(matches!(list[0], Value::ObjectId(_)));
        assert_eq!(list[1], Value::Int32(1));

        let three = doc.get_document("three").unwrap();
        assert_eq!(three.get("x"), Some(&Value::Int32(1)));
        assert_eq!(three.get("$regex"), Some(&Value::from("a")));

        // single unknown $ key is ordinary
        assert_eq!(
            decode(json!({"$foo": {"$numberInt": "2"}})).unwrap(),
            wrapper("$foo", Value::Int32(2))
        );
    }

    #[test]
    fn test_duplicate_keys_use_last_value() {
        let doc = Document::new()
            .with("$numberLong", "1")
            .with("$numberLong", "2");
        assert_eq!(
            SpecialKeyDecoder::new().decode(&Value::Document(doc)).unwrap(),
            Value::Int64(2)
        );

        let doc = Document::new()
            .with("$regex", "a")
            .with("$options", "q")
            .with("$options", "i");
        assert!(matches!(
            SpecialKeyDecoder::new().decode(&Value::Document(doc)).unwrap(),
            Value::Regex(Regex { ref options, .. }) if options == "i"
        ));
    }

    #[test]
    fn test_decode_document_keeps_top_level() {
        let doc = Document::new().with("$numberLong", "3");
        let decoded = SpecialKeyDecoder::new().decode_document(&doc).unwrap();
        assert_eq!(decoded, doc);
    }

    #[test]
    fn test_decoder_is_idempotent_on_output() {
        let decoder = SpecialKeyDecoder::new();
        let once = decoder
            .decode_json(&json!({
                "d": {"$date": "2020-01-01T00:00:00Z"},
                "n": {"$numberLong": "12"},
                "r": {"$regex": "x", "$options": "m"},
                "b": {"$binary": "AA==", "$type": "05"},
                "c": {"$code": "f", "$scope": {"k": {"$minKey": 1}}},
                "nested": [{"t": {"$timestamp": {"t": 1, "i": 2}}}]
            }))
            .unwrap();
        let twice = decoder.decode(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_depth_limit() {
        let mut value = Value::Int32(1);
        for _ in 0..10 {
            value = Value::Document(Document::new().with("k", value));
        }
        assert!(SpecialKeyDecoder::new().with_max_depth(20).decode(&value).is_ok());
        assert!(matches!(
            SpecialKeyDecoder::new().with_max_depth(5).decode(&value),
            Err(DumpError::DepthExceeded(5))
        ));

        let mut list = Value::Null;
        for _ in 0..10 {
            list = Value::Array(vec![list]);
        }
        assert!(matches!(
            SpecialKeyDecoder::new().with_max_depth(5).decode(&list),
            Err(DumpError::DepthExceeded(5))
        ));
    }

    #[test]
    fn test_wide_document_is_not_a_wrapper() {
        let mut wide: Document = (0..200_000).map(|i| (format!("k{i}"), Value::Null)).collect();
        wide.push("$numberLong", "1");
        let doc = Document::new().with("wide", wide.clone());

        let decoded = SpecialKeyDecoder::new().decode_document(&doc).unwrap();
        assert_eq!(decoded.get("wide"), Some(&Value::Document(wide)));
    }
}
