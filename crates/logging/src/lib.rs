#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` centralises how the xfer workspace emits diagnostics. Every crate
//! logs through [`tracing`] using one target per subsystem so a single
//! `XFER_LOG` directive such as `xfer::receiver=trace` can isolate one side
//! of the protocol.
//!
//! # Design
//!
//! - [`target`] names the subsystem targets. The `trace_*!` macros exported
//!   from this crate wrap the common debug-level events for each target.
//! - [`LogLevel`] parses the level names accepted by `--log-level`.
//! - [`init`] installs the process-wide `tracing_subscriber` stack used by the
//!   binary. Libraries never install a subscriber themselves.
//!
//! # Examples
//!
//! ```
//! use logging::{LogLevel, trace_send};
//!
//! let level: LogLevel = "FINE".parse().unwrap();
//! assert_eq!(level, LogLevel::Debug);
//! trace_send!("announcing {} items", 3);
//! ```

mod levels;
mod subscriber;
mod tracing_macros;

pub use levels::{LogLevel, LogLevelError};
pub use subscriber::{LOG_ENV, LoggingError, build_filter, init};

#[doc(hidden)]
pub use tracing;

/// Tracing targets used across the workspace.
pub mod target {
    /// Sender role of the transfer protocol.
    pub const SENDER: &str = "xfer::sender";
    /// Receiver role of the transfer protocol.
    pub const RECEIVER: &str = "xfer::receiver";
    /// Listener and connection lifecycle.
    pub const CONNECT: &str = "xfer::connect";
    /// Wire tokens and frames.
    pub const PROTOCOL: &str = "xfer::protocol";
    /// Throughput and session summaries.
    pub const STATS: &str = "xfer::stats";
    /// Source tree enumeration.
    pub const FLIST: &str = "xfer::flist";
}
