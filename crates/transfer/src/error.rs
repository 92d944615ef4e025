//! Errors that end a transfer session.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal session failure.
///
/// Recoverable conditions (a destination that cannot be created, a malformed
/// number, a digest or modification-time mismatch) are logged and never
/// surface as a `TransferError`.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The receiver announced a different protocol version.
    #[error("receiver version {remote:?} does not match local version {local:?}")]
    VersionMismatch {
        /// Version token this side speaks.
        local: String,
        /// Version token the peer sent.
        remote: String,
    },
    /// A directory item names an existing non-directory.
    #[error("output directory {} is an existing file", path.display())]
    DirectoryCollision {
        /// Destination path.
        path: PathBuf,
    },
    /// A file item names an existing directory.
    #[error("output file {} is an existing directory", path.display())]
    FileCollision {
        /// Destination path.
        path: PathBuf,
    },
    /// A source file ended before its announced size was sent.
    #[error("{} ended after {sent} of {expected} announced bytes", path.display())]
    SourceTruncated {
        /// Source path.
        path: PathBuf,
        /// Bytes announced to the receiver.
        expected: u64,
        /// Bytes actually sent.
        sent: u64,
    },
    /// The peer went away where a reply was required.
    #[error("connection closed while waiting for {expected}")]
    ConnectionClosed {
        /// What was being waited for.
        expected: &'static str,
    },
    /// The peer replied with a token that is not valid at this point.
    #[error("unexpected {context} token {token:?}")]
    UnexpectedToken {
        /// What was being waited for.
        context: &'static str,
        /// The token received.
        token: String,
    },
    /// Socket, file or codec failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl TransferError {
    /// Returns `true` for failures of the connection or local filesystem as
    /// opposed to protocol violations.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io(_) | Self::ConnectionClosed { .. })
    }
}

/// Result alias used throughout the crate.
pub type TransferResult<T> = Result<T, TransferError>;
