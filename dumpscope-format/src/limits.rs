//! Security limits and configuration

use crate::constants::{DEFAULT_MAX_NESTING_DEPTH, MAX_DOCUMENT_SIZE, MIN_DOCUMENT_SIZE};
use crate::error::{DumpError, Result};

/// Security limits applied while decoding untrusted archives
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum document length in bytes (hard: 16 MiB + 16 KiB)
    pub max_document_size: usize,
    /// Maximum nesting depth of documents and arrays (default: 100)
    pub max_nesting_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_document_size: MAX_DOCUMENT_SIZE,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl Limits {
    /// Validate a raw length prefix and return it as a byte count.
    ///
    /// The upper bound is the smaller of the configured limit and the
    /// format's hard cap.
    pub fn check_document_length(&self, len: i32) -> Result<usize> {
        let max = self.max_document_size.min(MAX_DOCUMENT_SIZE);
        match usize::try_from(len) {
            Ok(n) if (MIN_DOCUMENT_SIZE..=max).contains(&n) => Ok(n),
            _ => Err(DumpError::MalformedLength(len)),
        }
    }

    /// Fail once `depth` goes past the configured nesting limit.
    pub fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_nesting_depth {
            return Err(DumpError::DepthExceeded(self.max_nesting_depth));
        }
        Ok(())
    }
}
