//! Error types for dumpscope

use std::fmt;

use thiserror::Error;

use crate::constants::ARCHIVE_MAGIC;

/// Stage of the archive walk an error surfaced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Reading and checking the archive magic number.
    MagicCheck,
    /// Reading the archive header document.
    HeaderRead,
    /// Reading the collection metadata documents.
    MetadataRead,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::MagicCheck => f.write_str("magic check"),
            Phase::HeaderRead => f.write_str("header read"),
            Phase::MetadataRead => f.write_str("metadata read"),
        }
    }
}

/// dumpscope error types
#[derive(Debug, Error)]
pub enum DumpError {
    /// Input does not start with the archive magic number.
    #[error(
        "unexpected magic number {found:#010x}; this does not appear to be a mongodump archive (expected {:#010x})",
        ARCHIVE_MAGIC
    )]
    FormatMismatch {
        /// Magic number that was read instead.
        found: u32,
    },
    /// Input ended before a complete item could be read.
    #[error("unexpected end of input while reading {0}")]
    Truncated(&'static str),
    /// A document length prefix lies outside the valid range.
    #[error("malformed document length {0}")]
    MalformedLength(i32),
    /// Encountered an element type tag outside the closed set.
    #[error("unknown element type 0x{tag:02x} for key {key:?}")]
    UnknownType {
        /// Offending type tag.
        tag: u8,
        /// Key of the element carrying the tag.
        key: String,
    },
    /// Document bytes are structurally invalid.
    #[error("corrupt document: {0}")]
    Corrupt(String),
    /// A special-key wrapper is missing a co-field or has a mistyped one.
    #[error("invalid {key} wrapper: {reason}")]
    SpecialKeyShape {
        /// Special key whose wrapper was malformed.
        key: &'static str,
        /// What was wrong with it.
        reason: String,
    },
    /// A special-key payload literal could not be decoded.
    #[error("cannot decode {key} payload: {reason}")]
    Encoding {
        /// Special key whose payload failed to decode.
        key: &'static str,
        /// What was wrong with it.
        reason: String,
    },
    /// A `$options` string contains a character outside `g`, `i`, `m`, `s`.
    #[error("invalid regular expression option '{0}'")]
    InvalidRegexOption(char),
    /// Documents or arrays are nested deeper than the configured limit.
    #[error("nesting depth exceeds limit of {0}")]
    DepthExceeded(usize),
    /// An embedded metadata string could not be used. Reported as a warning.
    #[error("failed to parse collection metadata string: {0}")]
    MetadataParse(String),
    /// I/O operation failed while reading or writing data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Another error, tagged with the walk phase it occurred in.
    #[error("{phase} failed: {source}")]
    Phase {
        /// Phase the error occurred in.
        phase: Phase,
        /// Underlying cause.
        #[source]
        source: Box<DumpError>,
    },
}

impl DumpError {
    /// Tag this error with the walk phase it occurred in.
    pub fn in_phase(self, phase: Phase) -> Self {
        DumpError::Phase {
            phase,
            source: Box::new(self),
        }
    }

    /// The phase this error was tagged with, if any.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            DumpError::Phase { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// The underlying cause with any phase tags removed.
    pub fn root(&self) -> &DumpError {
        match self {
            DumpError::Phase { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, DumpError>;
