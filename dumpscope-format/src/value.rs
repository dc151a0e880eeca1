//! Typed value model
//!
//! [`Value`] is the closed set of kinds a decoded archive can contain. The
//! same type represents documents read off the wire and documents produced
//! by special-key recognition, so a decoded tree can be fed back through the
//! decoder without being re-interpreted.

use std::collections::HashSet;
use std::fmt;

use crate::constants::OBJECT_ID_LEN;
use crate::decimal::Decimal128;
use crate::error::{DumpError, Result};
use crate::types::ElementType;

/// 12-byte object identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    /// Wrap raw identifier bytes
    pub const fn from_bytes(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a 24-character hexadecimal identifier
    pub fn parse_hex(s: &str) -> Result<Self> {
        if s.len() != OBJECT_ID_LEN * 2 {
            return Err(DumpError::Encoding {
                key: "$oid",
                reason: format!(
                    "expected {} hex characters, got {} in {s:?}",
                    OBJECT_ID_LEN * 2,
                    s.len()
                ),
            });
        }
        let mut bytes = [0u8; OBJECT_ID_LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|err| DumpError::Encoding {
            key: "$oid",
            reason: format!("{err} in {s:?}"),
        })?;
        Ok(Self(bytes))
    }

    /// Raw identifier bytes
    pub fn bytes(&self) -> [u8; OBJECT_ID_LEN] {
        self.0
    }

    /// Lowercase hexadecimal form
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// UTC datetime with millisecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime {
    millis: i64,
}

impl DateTime {
    /// Build from signed milliseconds since the Unix epoch
    pub const fn from_millis(millis: i64) -> Self {
        Self { millis }
    }

    /// Build from a seconds/nanoseconds pair.
    ///
    /// `nanos` may be negative; it is added to `secs` rather than
    /// normalised, so `(-1, -500_000_000)` is -1.5 seconds.
    pub fn from_parts(secs: i64, nanos: i64) -> Self {
        let millis = secs
            .saturating_mul(1_000)
            .saturating_add(nanos / 1_000_000);
        Self { millis }
    }

    /// Signed milliseconds since the Unix epoch
    pub const fn timestamp_millis(&self) -> i64 {
        self.millis
    }
}

/// Cluster (replication) timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    /// Seconds since the Unix epoch
    pub time: u32,
    /// Ordinal within the second
    pub increment: u32,
}

/// Binary payload with its subtype byte
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Binary {
    /// Subtype tag
    pub subtype: u8,
    /// Payload bytes
    pub bytes: Vec<u8>,
}

/// Regular expression literal
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Regex {
    /// Pattern source
    pub pattern: String,
    /// Option flags
    pub options: String,
}

/// JavaScript code paired with a captured scope
#[derive(Debug, Clone, PartialEq)]
pub struct CodeWithScope {
    /// Code source
    pub code: String,
    /// Variables captured by the code
    pub scope: Document,
}

/// Deprecated namespace + identifier reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DbPointer {
    /// Referenced namespace
    pub namespace: String,
    /// Referenced identifier
    pub id: ObjectId,
}

/// Decoded value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null
    Null,
    /// Boolean
    Boolean(bool),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// 64-bit float
    Double(f64),
    /// 128-bit decimal
    Decimal128(Decimal128),
    /// UTF-8 string
    String(String),
    /// Binary payload
    Binary(Binary),
    /// Object identifier
    ObjectId(ObjectId),
    /// UTC datetime
    DateTime(DateTime),
    /// Cluster timestamp
    Timestamp(Timestamp),
    /// Regular expression
    Regex(Regex),
    /// JavaScript code without scope
    JavaScriptCode(String),
    /// JavaScript code with scope
    JavaScriptCodeWithScope(CodeWithScope),
    /// Deprecated symbol
    Symbol(String),
    /// Deprecated DB pointer
    DbPointer(DbPointer),
    /// Deprecated undefined sentinel
    Undefined,
    /// Min-key sentinel
    MinKey,
    /// Max-key sentinel
    MaxKey,
    /// Ordered keyed document
    Document(Document),
    /// Ordered list
    Array(Vec<Value>),
}

impl Value {
    /// Wire element type this value encodes as
    pub fn element_type(&self) -> ElementType {
        match self {
            Value::Null => ElementType::Null,
            Value::Boolean(_) => ElementType::Boolean,
            Value::Int32(_) => ElementType::Int32,
            Value::Int64(_) => ElementType::Int64,
            Value::Double(_) => ElementType::Double,
            Value::Decimal128(_) => ElementType::Decimal128,
            Value::String(_) => ElementType::String,
            Value::Binary(_) => ElementType::Binary,
            Value::ObjectId(_) => ElementType::ObjectId,
            Value::DateTime(_) => ElementType::DateTime,
            Value::Timestamp(_) => ElementType::Timestamp,
            Value::Regex(_) => ElementType::Regex,
            Value::JavaScriptCode(_) => ElementType::JavaScriptCode,
            Value::JavaScriptCodeWithScope(_) => ElementType::JavaScriptCodeWithScope,
            Value::Symbol(_) => ElementType::Symbol,
            Value::DbPointer(_) => ElementType::DbPointer,
            Value::Undefined => ElementType::Undefined,
            Value::MinKey => ElementType::MinKey,
            Value::MaxKey => ElementType::MaxKey,
            Value::Document(_) => ElementType::Document,
            Value::Array(_) => ElementType::Array,
        }
    }

    /// Borrow as a string slice if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow as a document if this is a document
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// Borrow as a list if this is an array
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Document> for Value {
    fn from(v: Document) -> Self {
        Value::Document(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

/// Ordered sequence of key/value pairs.
///
/// Keys are not required to be unique and order mirrors wire order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    entries: Vec<(String, Value)>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty document with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Append an entry, keeping any existing entry with the same key
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Builder-style [`Document::push`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(key, value);
        self
    }

    /// Number of entries, counting duplicate keys separately
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the document has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct keys
    pub fn distinct_len(&self) -> usize {
        self.entries
            .iter()
            .map(|(key, _)| key.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Number of distinct keys, counting no further than `limit`.
    ///
    /// Runs in `O(len * limit)`, so shape checks on wide documents stay linear.
    pub fn distinct_len_up_to(&self, limit: usize) -> usize {
        let mut seen: Vec<&str> = Vec::with_capacity(limit);
        for (key, _) in &self.entries {
            if seen.len() >= limit {
                break;
            }
            if !seen.contains(&key.as_str()) {
                seen.push(key);
            }
        }
        seen.len()
    }

    /// Whether any entry has this key
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Value of the first entry with this key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Mutable value of the first entry with this key
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Value of the first entry with this key, as a string
    pub fn get_str(&self, key: &str) -> Result<&str> {
        match self.get(key) {
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(DumpError::Corrupt(format!(
                "field '{key}' is {}, not a string",
                other.element_type().name()
            ))),
            None => Err(DumpError::Corrupt(format!("no such field '{key}'"))),
        }
    }

    /// Value of the first entry with this key, as an int32 or int64
    pub fn get_i64(&self, key: &str) -> Result<i64> {
        match self.get(key) {
            Some(Value::Int32(n)) => Ok(i64::from(*n)),
            Some(Value::Int64(n)) => Ok(*n),
            Some(_) => Err(DumpError::Corrupt(format!(
                "field '{key}' is not an integer type"
            ))),
            None => Err(DumpError::Corrupt(format!("no such field '{key}'"))),
        }
    }

    /// Value of the first entry with this key, as a document
    pub fn get_document(&self, key: &str) -> Result<&Document> {
        match self.get(key) {
            Some(Value::Document(doc)) => Ok(doc),
            Some(_) => Err(DumpError::Corrupt(format!(
                "field '{key}' is not a document"
            ))),
            None => Err(DumpError::Corrupt(format!("no such field '{key}'"))),
        }
    }

    /// Remove the first entry with this key and return its value
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Iterate over entries in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate mutably over values in order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Value)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over keys in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
