//! crates/logging/src/subscriber.rs
//! Installation of the process-wide tracing subscriber.

use thiserror::Error;
use time::macros::format_description;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt};

use crate::LogLevel;

/// Environment variable whose filter directives override the configured level.
pub const LOG_ENV: &str = "XFER_LOG";

/// Error raised when the global subscriber cannot be installed.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// A global subscriber was already installed.
    #[error("failed to install log subscriber: {0}")]
    Install(#[from] TryInitError),
}

/// Builds the filter for `level`, letting [`LOG_ENV`] take precedence.
///
/// An unset or unparsable environment value falls back to `level`.
#[must_use]
pub fn build_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level.directive()))
}

/// Installs the stderr subscriber used by the `xfer` binary.
///
/// Each line carries a UTC `HH:MM:SS` timestamp, the level and the emitting
/// thread's name (`Rcv` for the receiver listener).
pub fn init(level: LogLevel) -> Result<(), LoggingError> {
    let timer = UtcTime::new(format_description!("[hour]:[minute]:[second]"));

    tracing_subscriber::registry()
        .with(build_filter(level))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_names(true)
                .with_target(false)
                .with_timer(timer),
        )
        .try_init()?;
    Ok(())
}
