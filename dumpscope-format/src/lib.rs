//! dumpscope Format - Core primitives for mongodump archive inspection
//!
//! This crate provides the wire-level building blocks with no stream I/O
//! dependencies. It includes:
//!
//! - Archive magic number, terminator and element type constants
//! - Error types
//! - Security limits
//! - The typed value model (documents, arrays and BSON scalar kinds)
//! - Decimal128 parsing and formatting
//! - The BSON document wire codec

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod constants;
pub mod decimal;
pub mod document;
pub mod error;
pub mod limits;
pub mod types;
pub mod value;

// Re-export commonly used types
pub use decimal::Decimal128;
pub use document::{decode_document, encode_document};
pub use error::{DumpError, Phase, Result};
pub use limits::Limits;
pub use types::ElementType;
pub use value::{
    Binary, CodeWithScope, DateTime, DbPointer, Document, ObjectId, Regex, Timestamp, Value,
};
