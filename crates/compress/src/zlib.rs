//! # Overview
//!
//! Zlib primitives shared by the block codec. [`CompressionLevel`] captures the
//! levels the command line can request, while [`BlockCompressor`] and
//! [`BlockDecompressor`] wrap reusable `flate2` state so every frame is an
//! independent zlib stream without re-allocating the underlying tables.
//!
//! # Examples
//!
//! ```
//! use compress::zlib::{BlockCompressor, BlockDecompressor, CompressionLevel};
//!
//! let data = b"highly compressible payload ".repeat(16);
//! let mut compressed = Vec::new();
//! BlockCompressor::new(CompressionLevel::Best)
//!     .compress_into(&data, &mut compressed)
//!     .unwrap();
//!
//! let mut restored = Vec::new();
//! BlockDecompressor::new()
//!     .decompress_into(&compressed, data.len(), &mut restored)
//!     .unwrap();
//! assert_eq!(restored, data);
//! ```

use std::{
    fmt,
    io::{self, ErrorKind},
    num::NonZeroU8,
};

use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};

/// Compression levels recognised by the zlib encoder.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CompressionLevel {
    /// Favour speed over compression ratio.
    Fast,
    /// Use zlib's default balance between speed and ratio.
    #[default]
    Default,
    /// Favour the best possible compression ratio.
    Best,
    /// Use an explicit zlib compression level in the range `1..=9`.
    Precise(NonZeroU8),
}

impl CompressionLevel {
    /// Creates a [`CompressionLevel::Precise`] value from an explicit numeric level.
    ///
    /// The supplied `level` must fall within the inclusive range `1..=9`.
    pub fn from_numeric(level: u32) -> Result<Self, CompressionLevelError> {
        match u8::try_from(level).ok().and_then(NonZeroU8::new) {
            Some(precise) if level <= 9 => Ok(Self::Precise(precise)),
            _ => Err(CompressionLevelError::new(level)),
        }
    }

    /// Maps a user supplied level onto the three buckets the wire peers use.
    ///
    /// `0` and `1` select level 1, `2..=5` select level 5 and everything else,
    /// including out-of-range values, selects level 9.
    #[must_use]
    pub fn from_bucket(level: i64) -> Self {
        let bucket: u8 = match level {
            0 | 1 => 1,
            2..=5 => 5,
            _ => 9,
        };
        NonZeroU8::new(bucket).map_or(Self::Best, Self::Precise)
    }

    /// Constructs a [`CompressionLevel::Precise`] variant from the provided zlib level.
    #[must_use]
    pub const fn precise(level: NonZeroU8) -> Self {
        Self::Precise(level)
    }
}

impl From<CompressionLevel> for Compression {
    fn from(level: CompressionLevel) -> Self {
        match level {
            CompressionLevel::Fast => Compression::fast(),
            CompressionLevel::Default => Compression::default(),
            CompressionLevel::Best => Compression::best(),
            CompressionLevel::Precise(value) => Compression::new(u32::from(value.get())),
        }
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fast => f.write_str("fast"),
            Self::Default => f.write_str("default"),
            Self::Best => f.write_str("best"),
            Self::Precise(level) => write!(f, "{level}"),
        }
    }
}

/// Error returned when a requested compression level falls outside the
/// permissible zlib range.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CompressionLevelError {
    level: u32,
}

impl CompressionLevelError {
    const fn new(level: u32) -> Self {
        Self { level }
    }

    /// Returns the invalid compression level that triggered the error.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }
}

impl fmt::Display for CompressionLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "compression level {} is outside the supported range 1-9",
            self.level
        )
    }
}

impl std::error::Error for CompressionLevelError {}

/// Reusable zlib compressor producing one complete stream per call.
pub struct BlockCompressor {
    inner: Compress,
}

impl BlockCompressor {
    /// Creates a compressor emitting zlib-wrapped deflate streams.
    #[must_use]
    pub fn new(level: CompressionLevel) -> Self {
        Self {
            inner: Compress::new(level.into(), true),
        }
    }

    /// Compresses `input` as a finished zlib stream, replacing the contents of `output`.
    pub fn compress_into(&mut self, input: &[u8], output: &mut Vec<u8>) -> io::Result<()> {
        self.inner.reset();
        output.clear();

        loop {
            let consumed = self.inner.total_in() as usize;
            output.reserve(input.len() / 2 + 64);
            let status = self
                .inner
                .compress_vec(&input[consumed..], output, FlushCompress::Finish)
                .map_err(io::Error::other)?;
            if status == Status::StreamEnd {
                return Ok(());
            }
        }
    }
}

impl fmt::Debug for BlockCompressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockCompressor").finish_non_exhaustive()
    }
}

/// Reusable zlib decompressor restoring one complete stream per call.
pub struct BlockDecompressor {
    inner: Decompress,
}

impl Default for BlockDecompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockDecompressor {
    /// Creates a decompressor expecting zlib-wrapped deflate streams.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Decompress::new(true),
        }
    }

    /// Decompresses `input` into `output`, which must end up exactly `expected_len` bytes long.
    ///
    /// Any zlib failure, a stream that stops short, or a stream that produces
    /// more or fewer bytes than announced is reported as
    /// [`ErrorKind::InvalidData`].
    pub fn decompress_into(
        &mut self,
        input: &[u8],
        expected_len: usize,
        output: &mut Vec<u8>,
    ) -> io::Result<()> {
        self.inner.reset(true);
        output.clear();
        output.reserve(expected_len);

        loop {
            let consumed = self.inner.total_in() as usize;
            let produced_before = self.inner.total_out();
            let status = self
                .inner
                .decompress_vec(&input[consumed..], output, FlushDecompress::Finish)
                .map_err(|error| io::Error::new(ErrorKind::InvalidData, error))?;

            if status == Status::StreamEnd {
                break;
            }
            if output.len() > expected_len {
                break;
            }

            let stalled = self.inner.total_out() == produced_before
                && self.inner.total_in() as usize == consumed;
            if stalled && output.len() < output.capacity() {
                return Err(io::Error::new(
                    ErrorKind::InvalidData,
                    "zlib stream ended before its trailer",
                ));
            }
            output.reserve(64);
        }

        if output.len() != expected_len {
            return Err(io::Error::new(
                ErrorKind::InvalidData,
                format!(
                    "zlib stream produced {} bytes, expected {expected_len}",
                    output.len()
                ),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for BlockDecompressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockDecompressor").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(data: &[u8], level: CompressionLevel) -> Vec<u8> {
        let mut compressed = Vec::new();
        BlockCompressor::new(level)
            .compress_into(data, &mut compressed)
            .expect("compress");
        let mut restored = Vec::new();
        BlockDecompressor::new()
            .decompress_into(&compressed, data.len(), &mut restored)
            .expect("decompress");
        restored
    }

    #[test]
    fn compressor_is_reusable_across_blocks() {
        let mut compressor = BlockCompressor::new(CompressionLevel::Default);
        let mut decompressor = BlockDecompressor::new();
        let mut compressed = Vec::new();
        let mut restored = Vec::new();

        for block in [&b"first block"[..], b"second, longer block of data", b"x"] {
            compressor
                .compress_into(block, &mut compressed)
                .expect("compress");
            decompressor
                .decompress_into(&compressed, block.len(), &mut restored)
                .expect("decompress");
            assert_eq!(restored, block);
        }
    }

    #[test]
    fn incompressible_data_survives() {
        let data: Vec<u8> = (0..20_000u32)
            .map(|i| (i.wrapping_mul(2_654_435_761) >> 13) as u8)
            .collect();
        assert_eq!(round_trip(&data, CompressionLevel::Best), data);
    }

    #[test]
    fn decompress_rejects_length_mismatch() {
        let mut compressed = Vec::new();
        BlockCompressor::new(CompressionLevel::Fast)
            .compress_into(b"twelve bytes", &mut compressed)
            .expect("compress");
        let mut restored = Vec::new();
        let error = BlockDecompressor::new()
            .decompress_into(&compressed, 4, &mut restored)
            .expect_err("short expectation rejected");
        assert_eq!(error.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn decompress_rejects_garbage() {
        let mut restored = Vec::new();
        let error = BlockDecompressor::new()
            .decompress_into(b"definitely not zlib", 10, &mut restored)
            .expect_err("garbage rejected");
        assert_eq!(error.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn decompress_rejects_truncated_stream() {
        let data = b"some payload that compresses".repeat(4);
        let mut compressed = Vec::new();
        BlockCompressor::new(CompressionLevel::Default)
            .compress_into(&data, &mut compressed)
            .expect("compress");
        compressed.truncate(compressed.len() / 2);
        let mut restored = Vec::new();
        let result = BlockDecompressor::new().decompress_into(&compressed, data.len(), &mut restored);
        assert!(result.is_err());
    }

    #[test]
    fn bucket_mapping_matches_peer_levels() {
        let five = CompressionLevel::from_numeric(5).expect("valid");
        let nine = CompressionLevel::from_numeric(9).expect("valid");
        let one = CompressionLevel::from_numeric(1).expect("valid");
        assert_eq!(CompressionLevel::from_bucket(0), one);
        assert_eq!(CompressionLevel::from_bucket(1), one);
        assert_eq!(CompressionLevel::from_bucket(3), five);
        assert_eq!(CompressionLevel::from_bucket(5), five);
        assert_eq!(CompressionLevel::from_bucket(7), nine);
        assert_eq!(CompressionLevel::from_bucket(42), nine);
        assert_eq!(CompressionLevel::from_bucket(-3), nine);
    }

    #[test]
    fn numeric_level_constructor_rejects_out_of_range() {
        assert_eq!(
            CompressionLevel::from_numeric(10)
                .expect_err("level above 9 rejected")
                .level(),
            10
        );
        assert!(CompressionLevel::from_numeric(0).is_err());
        assert!(CompressionLevel::from_numeric(300).is_err());
    }

    #[test]
    fn precise_level_converts_to_requested_value() {
        let level = NonZeroU8::new(7).expect("non-zero");
        let compression = Compression::from(CompressionLevel::precise(level));
        assert_eq!(compression.level(), 7);
    }
}
