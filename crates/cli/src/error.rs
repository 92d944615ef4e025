use std::io;

use session::SessionError;
use thiserror::Error;

/// Failures that end an `xfer` invocation.
#[derive(Debug, Error)]
pub enum CliError {
    /// Paths were given but none of them could be resolved.
    #[error("none of the given paths can be sent")]
    NoUsableRoots,
    /// The listener or the sending connection failed.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// The listener thread panicked.
    #[error("receiver thread terminated abnormally")]
    ReceiverPanicked,
    /// Help, version or progress output could not be written.
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
}

impl CliError {
    /// Process exit status for this failure.
    ///
    /// Lost or unreachable connections exit with `2`; everything else
    /// with `1`.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Session(error) if error.is_connection_failure() => 2,
            _ => 1,
        }
    }
}
