//! Legacy extended JSON
//!
//! Legacy extended JSON encodes non-JSON types as wrapper documents keyed by
//! a reserved `$` name. [`SpecialKeyDecoder`] replaces those wrappers with
//! typed values anywhere in a tree; [`parse_legacy_ext_json`] is the entry
//! point for JSON text.

mod date;
mod ingest;
mod numeric;
mod special;

pub use date::{split_epoch_millis, DateParser, LegacyDateParser};
pub use ingest::{json_to_value, parse_legacy_ext_json};
pub use numeric::parse_int_literal;
pub use special::SpecialKeyDecoder;
