//! Constants and magic numbers for the mongodump archive format

/// Archive magic number, stored little-endian in the first four bytes.
pub const ARCHIVE_MAGIC: u32 = 0x8199_E26D;

/// Marker that ends the collection metadata section.
pub const TERMINATOR: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

/// Width of a document length prefix, the magic number and the terminator.
pub const PREFIX_LEN: usize = 4;

/// Smallest valid document: length prefix plus the trailing NUL.
pub const MIN_DOCUMENT_SIZE: usize = 5;

/// Largest document the format admits (16 MiB user limit + 16 KiB headroom).
pub const MAX_DOCUMENT_SIZE: usize = 16 * 1024 * 1024 + 16 * 1024;

/// Default maximum nesting depth for documents and arrays.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 100;

/// Length of an object identifier in bytes.
pub const OBJECT_ID_LEN: usize = 12;

/// Length of a Decimal128 value in bytes.
pub const DECIMAL128_LEN: usize = 16;

/// Element type tag for a 64-bit float.
pub const TAG_DOUBLE: u8 = 0x01;
/// Element type tag for a UTF-8 string.
pub const TAG_STRING: u8 = 0x02;
/// Element type tag for an embedded document.
pub const TAG_DOCUMENT: u8 = 0x03;
/// Element type tag for an array.
pub const TAG_ARRAY: u8 = 0x04;
/// Element type tag for binary data.
pub const TAG_BINARY: u8 = 0x05;
/// Element type tag for the deprecated undefined value.
pub const TAG_UNDEFINED: u8 = 0x06;
/// Element type tag for an object identifier.
pub const TAG_OBJECT_ID: u8 = 0x07;
/// Element type tag for a boolean.
pub const TAG_BOOLEAN: u8 = 0x08;
/// Element type tag for a UTC datetime in epoch milliseconds.
pub const TAG_DATETIME: u8 = 0x09;
/// Element type tag for null.
pub const TAG_NULL: u8 = 0x0A;
/// Element type tag for a regular expression.
pub const TAG_REGEX: u8 = 0x0B;
/// Element type tag for the deprecated DB pointer.
pub const TAG_DB_POINTER: u8 = 0x0C;
/// Element type tag for JavaScript code.
pub const TAG_JAVASCRIPT: u8 = 0x0D;
/// Element type tag for the deprecated symbol.
pub const TAG_SYMBOL: u8 = 0x0E;
/// Element type tag for JavaScript code with a scope document.
pub const TAG_JAVASCRIPT_WITH_SCOPE: u8 = 0x0F;
/// Element type tag for a 32-bit integer.
pub const TAG_INT32: u8 = 0x10;
/// Element type tag for a cluster timestamp.
pub const TAG_TIMESTAMP: u8 = 0x11;
/// Element type tag for a 64-bit integer.
pub const TAG_INT64: u8 = 0x12;
/// Element type tag for a Decimal128.
pub const TAG_DECIMAL128: u8 = 0x13;
/// Element type tag for the max-key sentinel.
pub const TAG_MAX_KEY: u8 = 0x7F;
/// Element type tag for the min-key sentinel.
pub const TAG_MIN_KEY: u8 = 0xFF;

/// Binary subtype whose payload carries a redundant inner length.
pub const BINARY_SUBTYPE_BINARY_OLD: u8 = 0x02;
