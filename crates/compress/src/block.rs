//! Self-delimited compressed block framing.
//!
//! Every frame on the wire is an 8-byte header followed by a zlib payload:
//!
//! ```text
//! +--------------------+----------------------+---------------------+
//! | compressed_len u32 | uncompressed_len u32 | payload (compressed)|
//! |     big-endian     |      big-endian      |  compressed_len B   |
//! +--------------------+----------------------+---------------------+
//! ```
//!
//! [`BlockEncoder`] buffers at most `block_size` bytes before emitting a frame so
//! an arbitrarily large logical write never needs more memory than one block.
//! [`BlockDecoder`] reverses the process and presents the decompressed frames
//! as a flat byte stream.

use std::io::{self, BufRead, ErrorKind, Read, Write};
use std::num::NonZeroUsize;

use thiserror::Error;
use tracing::trace;

use crate::zlib::{BlockCompressor, BlockDecompressor, CompressionLevel};

/// Number of bytes in a frame header.
pub const HEADER_LEN: usize = 8;

/// Block size used when the caller does not configure one.
pub const DEFAULT_BLOCK_SIZE: usize = 16 * 1024;

/// Largest payload, compressed or not, a decoder accepts for a single frame.
pub const MAX_FRAME_LEN: u32 = 256 * 1024 * 1024;

/// Largest block size an encoder uses.
///
/// Kept 1 MiB under [`MAX_FRAME_LEN`] so a block that deflate cannot shrink
/// still fits in one frame once stored-block overhead is added.
pub const MAX_BLOCK_SIZE: usize = MAX_FRAME_LEN as usize - 1024 * 1024;

/// Decoded frame header.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FrameHeader {
    compressed_len: u32,
    uncompressed_len: u32,
}

impl FrameHeader {
    /// Creates a header describing a payload of `compressed_len` bytes that
    /// inflates to `uncompressed_len` bytes.
    #[must_use]
    pub const fn new(compressed_len: u32, uncompressed_len: u32) -> Self {
        Self {
            compressed_len,
            uncompressed_len,
        }
    }

    /// Encodes the header in wire order.
    #[must_use]
    pub fn encode(self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[..4].copy_from_slice(&self.compressed_len.to_be_bytes());
        bytes[4..].copy_from_slice(&self.uncompressed_len.to_be_bytes());
        bytes
    }

    /// Decodes a header from its wire representation.
    #[must_use]
    pub fn decode(bytes: [u8; HEADER_LEN]) -> Self {
        let [a, b, c, d, e, f, g, h] = bytes;
        Self {
            compressed_len: u32::from_be_bytes([a, b, c, d]),
            uncompressed_len: u32::from_be_bytes([e, f, g, h]),
        }
    }

    /// Length of the compressed payload following the header.
    #[must_use]
    pub const fn compressed_len(self) -> u32 {
        self.compressed_len
    }

    /// Length of the payload once decompressed.
    #[must_use]
    pub const fn uncompressed_len(self) -> u32 {
        self.uncompressed_len
    }
}

/// Framing failures detected while decoding.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The source ended part-way through a header.
    #[error("frame header truncated: expected {HEADER_LEN} bytes, got {actual}")]
    TruncatedHeader {
        /// Header bytes read before the source ended.
        actual: usize,
    },
    /// The source ended part-way through a payload.
    #[error("frame payload truncated: expected {expected} bytes, got {actual}")]
    TruncatedPayload {
        /// Payload length announced by the header.
        expected: usize,
        /// Payload bytes read before the source ended.
        actual: usize,
    },
    /// A header announced a payload beyond [`MAX_FRAME_LEN`].
    #[error("frame length {len} exceeds maximum {MAX_FRAME_LEN}")]
    Oversized {
        /// Offending length.
        len: u32,
    },
    /// The payload did not decompress to the announced length.
    #[error("frame payload could not be decompressed: {source}")]
    Corrupt {
        /// Underlying zlib failure.
        #[source]
        source: io::Error,
    },
}

impl FrameError {
    /// Extracts a [`FrameError`] carried inside an [`io::Error`] produced by [`BlockDecoder`].
    #[must_use]
    pub fn from_io(error: &io::Error) -> Option<&Self> {
        error.get_ref().and_then(|inner| inner.downcast_ref::<Self>())
    }
}

impl From<FrameError> for io::Error {
    fn from(error: FrameError) -> Self {
        Self::new(ErrorKind::InvalidData, error)
    }
}

/// Sink that compresses written bytes into bounded frames.
///
/// Bytes accumulate until the buffer would exceed the block size, at which
/// point exactly one full block is compressed and emitted. [`Write::flush`]
/// emits whatever is buffered; flushing an empty buffer emits nothing.
pub struct BlockEncoder<W: Write> {
    inner: W,
    block_size: usize,
    input: Vec<u8>,
    output: Vec<u8>,
    compressor: BlockCompressor,
    frames: u64,
}

impl<W: Write> BlockEncoder<W> {
    /// Wraps `inner`, emitting frames of at most `block_size` uncompressed bytes.
    ///
    /// Sizes above [`MAX_BLOCK_SIZE`] are clamped to it.
    pub fn new(inner: W, block_size: NonZeroUsize, level: CompressionLevel) -> Self {
        let block_size = block_size.get().min(MAX_BLOCK_SIZE);
        let capacity = block_size.min(DEFAULT_BLOCK_SIZE);
        Self {
            inner,
            block_size,
            input: Vec::with_capacity(capacity),
            output: Vec::with_capacity(capacity + 64),
            compressor: BlockCompressor::new(level),
            frames: 0,
        }
    }

    /// Returns the configured block size.
    #[must_use]
    pub const fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of bytes waiting for the next frame.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.input.len()
    }

    /// Number of frames emitted so far.
    #[must_use]
    pub const fn frames_written(&self) -> u64 {
        self.frames
    }

    /// Borrows the underlying sink.
    #[must_use]
    pub const fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Mutably borrows the underlying sink.
    ///
    /// Writing to the sink directly interleaves raw bytes with frames and
    /// corrupts the stream for the peer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Emits any buffered bytes and returns the underlying sink.
    pub fn finish(mut self) -> io::Result<W> {
        self.flush()?;
        Ok(self.inner)
    }

    /// Emits any buffered bytes, then drops the underlying sink.
    pub fn close(self) -> io::Result<()> {
        drop(self.finish()?);
        Ok(())
    }

    fn emit_frame(&mut self) -> io::Result<()> {
        if self.input.is_empty() {
            return Ok(());
        }

        self.compressor
            .compress_into(&self.input, &mut self.output)?;
        let header = FrameHeader::new(frame_len(self.output.len())?, frame_len(self.input.len())?);
        self.inner.write_all(&header.encode())?;
        self.inner.write_all(&self.output)?;
        self.inner.flush()?;

        trace!(
            target: "xfer::io",
            uncompressed = header.uncompressed_len(),
            compressed = header.compressed_len(),
            "emitted frame"
        );
        self.frames += 1;
        self.input.clear();
        Ok(())
    }
}

impl<W: Write> Write for BlockEncoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut remaining = buf;
        while self.input.len() + remaining.len() > self.block_size {
            let (head, tail) = remaining.split_at(self.block_size - self.input.len());
            self.input.extend_from_slice(head);
            self.emit_frame()?;
            remaining = tail;
        }
        self.input.extend_from_slice(remaining);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit_frame()?;
        self.inner.flush()
    }
}

impl<W: Write> std::fmt::Debug for BlockEncoder<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockEncoder")
            .field("block_size", &self.block_size)
            .field("buffered", &self.input.len())
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

/// Source that decodes frames produced by [`BlockEncoder`].
pub struct BlockDecoder<R: Read> {
    inner: R,
    payload: Vec<u8>,
    cache: Vec<u8>,
    pos: usize,
    decompressor: BlockDecompressor,
    frames: u64,
}

impl<R: Read> BlockDecoder<R> {
    /// Wraps `inner`, decoding frames on demand.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            payload: Vec::new(),
            cache: Vec::new(),
            pos: 0,
            decompressor: BlockDecompressor::new(),
            frames: 0,
        }
    }

    /// Number of frames decoded so far.
    #[must_use]
    pub const fn frames_read(&self) -> u64 {
        self.frames
    }

    /// Decompressed bytes not yet handed to a reader.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.cache.len() - self.pos
    }

    /// Borrows the underlying source.
    #[must_use]
    pub const fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Consumes the decoder, discarding any cached bytes.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Loads the next non-empty frame; returns `false` on a clean end of stream.
    fn fill_cache(&mut self) -> io::Result<bool> {
        loop {
            let mut header = [0u8; HEADER_LEN];
            let got = read_full(&mut self.inner, &mut header)?;
            if got == 0 {
                return Ok(false);
            }
            if got < HEADER_LEN {
                return Err(FrameError::TruncatedHeader { actual: got }.into());
            }

            let header = FrameHeader::decode(header);
            for len in [header.compressed_len(), header.uncompressed_len()] {
                if len > MAX_FRAME_LEN {
                    return Err(FrameError::Oversized { len }.into());
                }
            }

            let expected = header.compressed_len() as usize;
            self.payload.resize(expected, 0);
            let got = read_full(&mut self.inner, &mut self.payload)?;
            if got < expected {
                return Err(FrameError::TruncatedPayload {
                    expected,
                    actual: got,
                }
                .into());
            }

            self.decompressor
                .decompress_into(
                    &self.payload,
                    header.uncompressed_len() as usize,
                    &mut self.cache,
                )
                .map_err(|source| FrameError::Corrupt { source })?;
            self.pos = 0;
            self.frames += 1;

            if !self.cache.is_empty() {
                return Ok(true);
            }
        }
    }
}

impl<R: Read> Read for BlockDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.pos >= self.cache.len() && !self.fill_cache()? {
            return Ok(0);
        }

        let available = &self.cache[self.pos..];
        let count = available.len().min(buf.len());
        buf[..count].copy_from_slice(&available[..count]);
        self.pos += count;
        Ok(count)
    }
}

impl<R: Read> BufRead for BlockDecoder<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.pos >= self.cache.len() && !self.fill_cache()? {
            return Ok(&[]);
        }
        Ok(&self.cache[self.pos..])
    }

    fn consume(&mut self, amount: usize) {
        self.pos = (self.pos + amount).min(self.cache.len());
    }
}

impl<R: Read> std::fmt::Debug for BlockDecoder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockDecoder")
            .field("buffered", &self.buffered())
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

fn frame_len(len: usize) -> io::Result<u32> {
    u32::try_from(len)
        .ok()
        .filter(|value| *value <= MAX_FRAME_LEN)
        .ok_or_else(|| {
            io::Error::new(
                ErrorKind::InvalidInput,
                format!("block of {len} bytes exceeds the frame limit"),
            )
        })
}

/// Reads until `buf` is full or the source ends, returning the number of bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(error) if error.kind() == ErrorKind::Interrupted => {}
            Err(error) => return Err(error),
        }
    }
    Ok(filled)
}
