//! crates/logging/src/levels.rs
//! Verbosity levels accepted on the command line.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::level_filters::LevelFilter;

/// Threshold below which diagnostics are suppressed.
///
/// Both the level names of earlier xfer releases (`SEVERE`, `WARNING`,
/// `INFO`, `CONFIG`, `FINE`, `FINER`, `FINEST`, `OFF`, `ALL`) and the usual
/// tracing names (`error` through `trace`) are accepted, case-insensitively.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum LogLevel {
    /// Nothing is logged.
    Off,
    /// Fatal conditions only.
    Error,
    /// Recoverable anomalies such as digest or timestamp mismatches.
    Warn,
    /// Per-item progress and aggregate throughput.
    #[default]
    Info,
    /// Protocol decisions and timings.
    Debug,
    /// Individual wire tokens and frames.
    Trace,
}

/// Error returned when a level name is not recognised.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("unknown log level '{0}' (expected one of SEVERE, WARNING, INFO, CONFIG, FINE, FINER, FINEST)")]
pub struct LogLevelError(String);

impl LogLevel {
    /// Parses a level name.
    pub fn parse(name: &str) -> Result<Self, LogLevelError> {
        let level = match name.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Self::Off,
            "severe" | "error" => Self::Error,
            "warning" | "warn" => Self::Warn,
            "info" | "config" => Self::Info,
            "fine" | "finer" | "debug" => Self::Debug,
            "finest" | "all" | "trace" => Self::Trace,
            _ => return Err(LogLevelError(name.to_owned())),
        };
        Ok(level)
    }

    /// Filter directive understood by `tracing_subscriber::EnvFilter`.
    #[must_use]
    pub const fn directive(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// Equivalent tracing level filter.
    #[must_use]
    pub const fn level_filter(self) -> LevelFilter {
        match self {
            Self::Off => LevelFilter::OFF,
            Self::Error => LevelFilter::ERROR,
            Self::Warn => LevelFilter::WARN,
            Self::Info => LevelFilter::INFO,
            Self::Debug => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }
}

impl FromStr for LogLevel {
    type Err = LogLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.directive())
    }
}
