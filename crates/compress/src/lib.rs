#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `compress` implements the optional compression layer of the xfer wire
//! protocol. When both peers enable compression every byte written to the
//! socket, tokens and file bodies alike, travels inside self-delimited zlib
//! frames so the receiver can decode the stream incrementally without knowing
//! the sender's block size.
//!
//! # Design
//!
//! - [`zlib`] wraps reusable `flate2` state. Each frame is a complete, finished
//!   zlib stream so a frame never depends on the dictionary of its predecessor.
//! - [`block`] layers the framing on top: [`BlockEncoder`] implements
//!   [`std::io::Write`] and [`BlockDecoder`] implements [`std::io::Read`], so
//!   the transfer engine can swap a plain socket for a compressed one without
//!   changing how it reads or writes.
//!
//! # Invariants
//!
//! - A frame never carries more than the encoder's block size of uncompressed
//!   data, and an empty buffer never produces a frame. Block sizes are capped
//!   at [`MAX_BLOCK_SIZE`].
//! - Flushing the encoder emits the pending frame and flushes the underlying
//!   sink, which keeps request/response exchanges from deadlocking.
//! - The decoder rejects headers announcing more than [`block::MAX_FRAME_LEN`]
//!   bytes before allocating anything for them.
//!
//! # Errors
//!
//! All failures surface as [`std::io::Error`]. Framing problems use
//! [`std::io::ErrorKind::InvalidData`] and carry a [`FrameError`] that callers
//! can recover with [`FrameError::from_io`].
//!
//! # Examples
//!
//! ```
//! use std::io::{Read, Write};
//! use std::num::NonZeroUsize;
//!
//! use compress::{BlockDecoder, BlockEncoder, CompressionLevel};
//!
//! # fn main() -> std::io::Result<()> {
//! let block = NonZeroUsize::new(16 * 1024).unwrap();
//! let mut encoder = BlockEncoder::new(Vec::new(), block, CompressionLevel::Default);
//! encoder.write_all(b"file contents")?;
//! let wire = encoder.finish()?;
//!
//! let mut decoded = Vec::new();
//! BlockDecoder::new(wire.as_slice()).read_to_end(&mut decoded)?;
//! assert_eq!(decoded, b"file contents");
//! # Ok(())
//! # }
//! ```
//!
//! # See also
//!
//! - `transfer::wire` for the reader/writer pair that selects plain or
//!   compressed transport per session.

pub mod block;
pub mod zlib;

pub use block::{
    BlockDecoder, BlockEncoder, DEFAULT_BLOCK_SIZE, FrameError, FrameHeader, MAX_BLOCK_SIZE,
};
pub use zlib::{CompressionLevel, CompressionLevelError};
