#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `checksums` provides the strong digest that both xfer peers compute over a
//! file body and exchange after the body has been streamed. The digest is MD5,
//! rendered as lowercase hexadecimal with leading zeros removed, which is the
//! representation `xfer3.4` peers put on the wire.
//!
//! # Design
//!
//! - [`Md5`] is a thin streaming wrapper around the RustCrypto `md-5` crate.
//! - [`FileDigest`] is the rendered, comparable form of a finished digest.
//!   Received digests are kept verbatim so a peer that renders differently is
//!   reported as a mismatch rather than silently normalised.
//!
//! # Examples
//!
//! ```
//! use checksums::{FileDigest, Md5};
//!
//! let mut hasher = Md5::new();
//! hasher.update(b"a");
//! let digest = hasher.finish();
//! assert_eq!(digest.as_str(), "cc175b9c0f1b6a831c399e269772661");
//! assert_eq!(digest, FileDigest::from_wire("cc175b9c0f1b6a831c399e269772661"));
//! ```

mod file_digest;
mod hasher;

pub use file_digest::{FileDigest, digest_reader};
pub use hasher::{DIGEST_LEN, Md5};
