//! Read adapter with non-consuming lookahead

use std::io::{self, Read};

use dumpscope_format::{DumpError, Result};

/// Wraps a forward-only reader and lets callers look at upcoming bytes
/// without consuming them.
///
/// Peeked bytes are held in a small buffer and handed out again by the next
/// [`Read::read`] calls, so a peek never disturbs what a later read sees.
/// The buffer only ever holds as many bytes as the largest peek requested.
#[derive(Debug)]
pub struct PeekReader<R> {
    inner: R,
    lookahead: Vec<u8>,
}

impl<R: Read> PeekReader<R> {
    /// Wrap `inner`
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            lookahead: Vec::new(),
        }
    }

    /// Return the next `n` bytes without consuming them.
    ///
    /// Fails with [`DumpError::Truncated`] if the stream ends first.
    pub fn peek(&mut self, n: usize) -> Result<&[u8]> {
        while self.lookahead.len() < n {
            let have = self.lookahead.len();
            self.lookahead.resize(n, 0);
            match self.inner.read(&mut self.lookahead[have..]) {
                Ok(0) => {
                    self.lookahead.truncate(have);
                    return Err(DumpError::Truncated("lookahead"));
                }
                Ok(read) => self.lookahead.truncate(have + read),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {
                    self.lookahead.truncate(have);
                }
                Err(err) => {
                    self.lookahead.truncate(have);
                    return Err(err.into());
                }
            }
        }
        Ok(&self.lookahead[..n])
    }

    /// Bytes peeked but not yet consumed
    pub fn buffered(&self) -> &[u8] {
        &self.lookahead
    }

    /// Borrow the wrapped reader
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Unwrap, discarding any buffered lookahead
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for PeekReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.lookahead.is_empty() {
            return self.inner.read(buf);
        }
        let n = buf.len().min(self.lookahead.len());
        buf[..n].copy_from_slice(&self.lookahead[..n]);
        self.lookahead.drain(..n);
        Ok(n)
    }
}
