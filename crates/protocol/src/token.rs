//! Zero-terminated control tokens and the reader that shares one cursor
//! between tokens and raw file bodies.
//!
//! A token is any run of non-zero bytes followed by exactly one zero byte.
//! File bodies travel on the same stream and may contain zero bytes, so the
//! receiver reads a body by length and hands any bytes it read past the body
//! back to [`TokenReader::unread`]. The next [`TokenReader::read_token`] call
//! consumes those pushed-back bytes before touching the underlying source.

use std::borrow::Cow;
use std::fmt;
use std::io::{self, BufRead, ErrorKind, Read, Write};

use logging::trace_proto;
use memchr::memchr;
use thiserror::Error;

use crate::constants::{DELIMITER, MAX_TOKEN_LEN};

/// Token encoding and decoding failures.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum TokenError {
    /// Content handed to [`write_token`] contained the delimiter byte.
    #[error("token content contains a zero byte at offset {position}")]
    EmbeddedDelimiter {
        /// Offset of the first zero byte.
        position: usize,
    },
    /// The peer sent more than [`MAX_TOKEN_LEN`] bytes without a delimiter.
    #[error("token exceeds {limit} bytes without a delimiter")]
    TooLong {
        /// Limit that was exceeded.
        limit: usize,
    },
}

impl From<TokenError> for io::Error {
    fn from(error: TokenError) -> Self {
        let kind = match error {
            TokenError::EmbeddedDelimiter { .. } => ErrorKind::InvalidInput,
            TokenError::TooLong { .. } => ErrorKind::InvalidData,
        };
        Self::new(kind, error)
    }
}

/// Writes `content` followed by one delimiter byte.
///
/// Content containing a zero byte is rejected before anything is written.
/// The sink is not flushed.
pub fn write_token<W: Write + ?Sized>(sink: &mut W, content: &[u8]) -> io::Result<()> {
    if let Some(position) = memchr(DELIMITER, content) {
        return Err(TokenError::EmbeddedDelimiter { position }.into());
    }
    trace_proto!("write token {:?}", String::from_utf8_lossy(content));
    sink.write_all(content)?;
    sink.write_all(&[DELIMITER])
}

/// How a token read came to an end.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Terminator {
    /// A delimiter byte was consumed.
    Delimiter,
    /// The source ended first.
    EndOfStream,
}

/// One decoded control token.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    bytes: Vec<u8>,
    terminator: Terminator,
}

impl Token {
    /// Content without the delimiter.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the token, returning its content.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// How the read ended.
    #[must_use]
    pub const fn terminator(&self) -> Terminator {
        self.terminator
    }

    /// Returns `true` when the token carries no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns `true` when the source ended before a delimiter was seen.
    #[must_use]
    pub fn hit_end_of_stream(&self) -> bool {
        self.terminator == Terminator::EndOfStream
    }

    /// Content decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    /// Returns `true` when the content equals `expected`.
    #[must_use]
    pub fn is(&self, expected: &str) -> bool {
        self.bytes == expected.as_bytes()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Buffered source with a pushback area in front of it.
///
/// [`Read`] and [`TokenReader::read_token`] both drain the pushback area
/// before reading from the wrapped source, so bytes handed back with
/// [`TokenReader::unread`] are seen again in their original order.
pub struct TokenReader<R> {
    inner: R,
    pushback: Vec<u8>,
    pos: usize,
}

impl<R: BufRead> TokenReader<R> {
    /// Wraps a buffered source.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pushback: Vec::new(),
            pos: 0,
        }
    }

    /// Reads the next token.
    ///
    /// Returns the bytes up to (not including) the next delimiter. When the
    /// source ends first, the bytes read so far are returned with
    /// [`Terminator::EndOfStream`]; at a clean end of stream that is an empty
    /// token.
    pub fn read_token(&mut self) -> io::Result<Token> {
        let mut bytes = Vec::new();

        let pending = &self.pushback[self.pos..];
        if !pending.is_empty() {
            if let Some(index) = memchr(DELIMITER, pending) {
                bytes.extend_from_slice(&pending[..index]);
                self.pos += index + 1;
                self.compact();
                return Ok(self.finish(bytes, Terminator::Delimiter));
            }
            bytes.extend_from_slice(pending);
            self.pushback.clear();
            self.pos = 0;
        }

        let budget = (MAX_TOKEN_LEN + 1).saturating_sub(bytes.len()) as u64;
        let read = (&mut self.inner).take(budget).read_until(DELIMITER, &mut bytes)?;
        if read > 0 && bytes.last() == Some(&DELIMITER) {
            bytes.pop();
            return Ok(self.finish(bytes, Terminator::Delimiter));
        }
        if bytes.len() > MAX_TOKEN_LEN {
            return Err(TokenError::TooLong {
                limit: MAX_TOKEN_LEN,
            }
            .into());
        }
        Ok(self.finish(bytes, Terminator::EndOfStream))
    }

    fn finish(&self, bytes: Vec<u8>, terminator: Terminator) -> Token {
        trace_proto!(
            "read token {:?} ({:?})",
            String::from_utf8_lossy(&bytes),
            terminator
        );
        Token { bytes, terminator }
    }
}

impl<R> TokenReader<R> {
    /// Places `bytes` in front of everything not yet read.
    pub fn unread(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let mut seeded = Vec::with_capacity(bytes.len() + self.pushback.len() - self.pos);
        seeded.extend_from_slice(bytes);
        seeded.extend_from_slice(&self.pushback[self.pos..]);
        self.pushback = seeded;
        self.pos = 0;
    }

    /// Number of pushed-back bytes not yet consumed.
    #[must_use]
    pub fn pushed_back(&self) -> usize {
        self.pushback.len() - self.pos
    }

    /// Borrows the wrapped source.
    #[must_use]
    pub const fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutably borrows the wrapped source, bypassing the pushback area.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Returns the wrapped source, discarding pushed-back bytes.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn compact(&mut self) {
        if self.pos == self.pushback.len() {
            self.pushback.clear();
            self.pos = 0;
        }
    }
}

impl<R: Read> Read for TokenReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let pending = &self.pushback[self.pos..];
        if pending.is_empty() {
            return self.inner.read(buf);
        }
        let count = pending.len().min(buf.len());
        buf[..count].copy_from_slice(&pending[..count]);
        self.pos += count;
        self.compact();
        Ok(count)
    }
}

impl<R> fmt::Debug for TokenReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenReader")
            .field("pushed_back", &self.pushed_back())
            .finish_non_exhaustive()
    }
}
