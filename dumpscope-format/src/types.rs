//! Element type enumeration

use crate::constants::*;

/// Element type tags of the document wire format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ElementType {
    /// 64-bit IEEE 754 float
    Double = TAG_DOUBLE,
    /// UTF-8 string
    String = TAG_STRING,
    /// Embedded document
    Document = TAG_DOCUMENT,
    /// Array (document with index keys)
    Array = TAG_ARRAY,
    /// Binary payload with subtype
    Binary = TAG_BINARY,
    /// Deprecated undefined
    Undefined = TAG_UNDEFINED,
    /// 12-byte object identifier
    ObjectId = TAG_OBJECT_ID,
    /// Boolean
    Boolean = TAG_BOOLEAN,
    /// UTC datetime in epoch milliseconds
    DateTime = TAG_DATETIME,
    /// Null
    Null = TAG_NULL,
    /// Regular expression (pattern + options)
    Regex = TAG_REGEX,
    /// Deprecated DB pointer
    DbPointer = TAG_DB_POINTER,
    /// JavaScript code
    JavaScriptCode = TAG_JAVASCRIPT,
    /// Deprecated symbol
    Symbol = TAG_SYMBOL,
    /// JavaScript code with scope
    JavaScriptCodeWithScope = TAG_JAVASCRIPT_WITH_SCOPE,
    /// 32-bit signed integer
    Int32 = TAG_INT32,
    /// Cluster timestamp
    Timestamp = TAG_TIMESTAMP,
    /// 64-bit signed integer
    Int64 = TAG_INT64,
    /// 128-bit decimal
    Decimal128 = TAG_DECIMAL128,
    /// Max-key sentinel
    MaxKey = TAG_MAX_KEY,
    /// Min-key sentinel
    MinKey = TAG_MIN_KEY,
}

impl ElementType {
    /// Convert from u8, returning `None` for tags outside the closed set
    pub fn from_u8(val: u8) -> Option<Self> {
        let ty = match val {
            TAG_DOUBLE => ElementType::Double,
            TAG_STRING => ElementType::String,
            TAG_DOCUMENT => ElementType::Document,
            TAG_ARRAY => ElementType::Array,
            TAG_BINARY => ElementType::Binary,
            TAG_UNDEFINED => ElementType::Undefined,
            TAG_OBJECT_ID => ElementType::ObjectId,
            TAG_BOOLEAN => ElementType::Boolean,
            TAG_DATETIME => ElementType::DateTime,
            TAG_NULL => ElementType::Null,
            TAG_REGEX => ElementType::Regex,
            TAG_DB_POINTER => ElementType::DbPointer,
            TAG_JAVASCRIPT => ElementType::JavaScriptCode,
            TAG_SYMBOL => ElementType::Symbol,
            TAG_JAVASCRIPT_WITH_SCOPE => ElementType::JavaScriptCodeWithScope,
            TAG_INT32 => ElementType::Int32,
            TAG_TIMESTAMP => ElementType::Timestamp,
            TAG_INT64 => ElementType::Int64,
            TAG_DECIMAL128 => ElementType::Decimal128,
            TAG_MAX_KEY => ElementType::MaxKey,
            TAG_MIN_KEY => ElementType::MinKey,
            _ => return None,
        };
        Some(ty)
    }

    /// Human-readable name used in diagnostics
    pub fn name(self) -> &'static str {
        match self {
            ElementType::Double => "double",
            ElementType::String => "string",
            ElementType::Document => "document",
            ElementType::Array => "array",
            ElementType::Binary => "binary",
            ElementType::Undefined => "undefined",
            ElementType::ObjectId => "objectId",
            ElementType::Boolean => "bool",
            ElementType::DateTime => "date",
            ElementType::Null => "null",
            ElementType::Regex => "regex",
            ElementType::DbPointer => "dbPointer",
            ElementType::JavaScriptCode => "javascript",
            ElementType::Symbol => "symbol",
            ElementType::JavaScriptCodeWithScope => "javascriptWithScope",
            ElementType::Int32 => "int",
            ElementType::Timestamp => "timestamp",
            ElementType::Int64 => "long",
            ElementType::Decimal128 => "decimal",
            ElementType::MaxKey => "maxKey",
            ElementType::MinKey => "minKey",
        }
    }
}
