//! dumpscope Codec - Extended JSON decoding and rendering
//!
//! This crate converts between the typed value model and extended JSON:
//!
//! - Legacy extended JSON special-key recognition (`$date`, `$oid`, ...)
//! - Loose JSON ingestion that keeps key order
//! - Modern (v2) extended JSON rendering in relaxed or canonical mode

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod extjson;
pub mod render;

// Re-export commonly used types
pub use dumpscope_format::{Document, DumpError, Limits, Result, Value};
pub use extjson::{
    json_to_value, parse_int_literal, parse_legacy_ext_json, split_epoch_millis, DateParser,
    LegacyDateParser, SpecialKeyDecoder,
};
pub use render::{document_to_ext_json, to_ext_json, to_ext_json_string, ExtJsonMode};
