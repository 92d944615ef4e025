#![deny(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_docs)]

//! Wire grammar shared by the xfer sender and receiver.
//!
//! # Overview
//!
//! Everything that crosses the connection is either a control token or a raw
//! file body. A token is a run of non-zero bytes terminated by one zero byte;
//! a body is exactly as many bytes as the preceding size token announced and
//! may contain zero bytes. The two share one byte stream, so this crate
//! provides:
//!
//! - [`write_token`] and [`TokenReader`], the token codec with a pushback area
//!   for bytes read past a body,
//! - [`split_chunk`] and [`BodyBoundary`], which find the body end using only
//!   the announced length,
//! - [`TransferItem`] and [`ExistenceDisposition`], the typed forms of the
//!   per-item announcement and the receiver's answer,
//! - the fixed tokens in [`constants`].
//!
//! # Invariants
//!
//! - A written token never contains the delimiter; [`write_token`] rejects such
//!   content before writing anything.
//! - Bytes passed to [`TokenReader::unread`] are returned before any byte of
//!   the wrapped source, in their original order.
//!
//! # Examples
//!
//! A body containing zero bytes followed by a digest token:
//!
//! ```
//! use std::io::{Cursor, Read};
//! use protocol::{BodyBoundary, TokenReader, write_token};
//!
//! let mut wire = b"a\0b".to_vec();
//! write_token(&mut wire, b"5d41402abc4b2a76b9719d911017c592").unwrap();
//!
//! let mut reader = TokenReader::new(Cursor::new(wire));
//! let mut boundary = BodyBoundary::new(3);
//! let mut chunk = [0u8; 16];
//! let n = reader.read(&mut chunk).unwrap();
//! let split = boundary.advance(n);
//! assert_eq!(&chunk[..split.body], b"a\0b");
//! reader.unread(&chunk[split.body..n]);
//!
//! let digest = reader.read_token().unwrap();
//! assert!(digest.is("5d41402abc4b2a76b9719d911017c592"));
//! ```

mod body;
pub mod constants;
mod disposition;
mod item;
mod number;
mod token;

pub use body::{BodyBoundary, BodySplit, split_chunk};
pub use constants::{
    COPY_SUFFIX, DEFAULT_PORT, DELIMITER, DIRECTORY_SIZE, FINISHED, FORCE_OVERWRITE,
    MAX_TOKEN_LEN, NEUTRAL_MODE, VERSION,
};
pub use disposition::ExistenceDisposition;
pub use item::{ItemKind, PATH_SEPARATOR, TransferItem};
pub use number::{parse_checked, parse_lenient};
pub use token::{Terminator, Token, TokenError, TokenReader, write_token};
