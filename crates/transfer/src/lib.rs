#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Sender and receiver state machines of the xfer protocol.
//!
//! # Overview
//!
//! A session runs over one connection and has four phases:
//!
//! 1. **Handshake.** The receiver sends its version token; the sender aborts
//!    with [`TransferError::VersionMismatch`] unless it matches exactly.
//! 2. **Mode.** The sender sends `forceOverwrite` when it was told to
//!    overwrite, otherwise `x`. The receiver switches to overwriting for the
//!    rest of that session only.
//! 3. **Items.** For each item the sender announces path, modification time
//!    and size; the receiver answers with an [`ExistenceDisposition`]. An
//!    accepted file is followed by exactly `size` body bytes and a digest
//!    exchange. Directories have neither.
//! 4. **Termination.** The sender sends `FINIS.`.
//!
//! [`SenderContext`] and [`ReceiverContext`] implement the two roles over a
//! [`Channel`], which layers the token codec over an optionally compressed
//! byte stream. [`RootItems`] turns a sender root into the items to announce.
//!
//! # Invariants
//!
//! - No request is written before the previous reply has been read.
//! - The receiver locates the end of a body only from the announced size;
//!   zero bytes inside a body are never treated as delimiters.
//! - [`SessionConfig`] is never mutated by a session. The forced overwrite
//!   mode lives in the [`ReceiverContext`] of the session that received it.
//!
//! # Errors
//!
//! Fatal conditions end the session with a [`TransferError`]. Destination
//! create failures, malformed numbers, digest mismatches and modification
//! time drift are logged as warnings and the session continues.
//!
//! # Examples
//!
//! Wiring a channel to an in-memory peer:
//!
//! ```
//! use std::io::Cursor;
//! use transfer::{Channel, SessionConfig};
//!
//! let config = SessionConfig::default();
//! let mut channel = Channel::new(Cursor::new(b"xfer3.4\0".to_vec()), Vec::new(), &config);
//! assert!(channel.receive().unwrap().is("xfer3.4"));
//! ```

mod config;
mod error;
mod items;
pub mod mtime;
mod progress;
mod receiver;
mod sender;
mod stats;
mod wire;

pub use config::{
    ConflictPolicy, DEFAULT_MODIFY_WINDOW, DEFAULT_PROGRESS_TICKS, SessionConfig,
    SessionConfigBuilder,
};
pub use error::{TransferError, TransferResult};
pub use items::{Expansion, RootItems, SourceItem};
pub use progress::{ProgressBar, TICK_SYMBOL};
pub use protocol::ExistenceDisposition;
pub use receiver::{ReceiverContext, copy_path};
pub use sender::SenderContext;
pub use stats::{ReceiveSummary, SendSummary, format_bytes, format_rate};
pub use wire::{Channel, WireReader, WireWriter};
