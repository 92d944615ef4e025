use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;
use transfer::TransferError;

/// Failures of the listener or of a sending connection.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The receiver's target exists and is not a directory.
    #[error("target directory {} is an existing file", path.display())]
    InvalidTarget {
        /// Configured target.
        path: PathBuf,
    },
    /// The listening socket could not be set up.
    #[error("failed to bind listener {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: SocketAddr,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// `accept` failed outside of a requested shutdown.
    #[error("failed to accept connection on {addr}: {source}")]
    Accept {
        /// Listening address.
        addr: SocketAddr,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The sender could not reach the receiver.
    #[error("failed to connect to {host}:{port}: {source}")]
    Connect {
        /// Receiver host.
        host: String,
        /// Receiver port.
        port: u16,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The transfer itself failed.
    #[error(transparent)]
    Transfer(#[from] TransferError),
    /// Other local I/O failure, such as spawning the listener thread.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl SessionError {
    /// Returns `true` when the failure is a lost or unreachable connection.
    #[must_use]
    pub const fn is_connection_failure(&self) -> bool {
        match self {
            Self::Connect { .. } | Self::Accept { .. } | Self::Io(_) => true,
            Self::Transfer(error) => error.is_io(),
            Self::InvalidTarget { .. } | Self::Bind { .. } => false,
        }
    }
}
