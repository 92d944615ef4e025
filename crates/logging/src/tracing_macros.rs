//! crates/logging/src/tracing_macros.rs
//! Convenience macros for xfer-specific tracing.
//!
//! These macros provide ergonomic wrappers around standard tracing macros
//! with the targets of the xfer subsystems. Warnings and errors are emitted
//! with the plain `tracing` macros and the constants in [`crate::target`].

/// Emit a sender-side protocol trace.
///
/// # Example
/// ```ignore
/// trace_send!("announced {} ({} bytes)", path, size);
/// ```
#[macro_export]
macro_rules! trace_send {
    ($($arg:tt)*) => {
        $crate::tracing::debug!(target: "xfer::sender", $($arg)*);
    };
}

/// Emit a receiver-side protocol trace.
///
/// # Example
/// ```ignore
/// trace_recv!("disposition for {}: {}", path, disposition);
/// ```
#[macro_export]
macro_rules! trace_recv {
    ($($arg:tt)*) => {
        $crate::tracing::debug!(target: "xfer::receiver", $($arg)*);
    };
}

/// Emit a connection lifecycle trace.
///
/// # Example
/// ```ignore
/// trace_connect!("connect from {}", peer);
/// ```
#[macro_export]
macro_rules! trace_connect {
    ($($arg:tt)*) => {
        $crate::tracing::debug!(target: "xfer::connect", $($arg)*);
    };
}

/// Emit a wire-level token trace.
///
/// # Example
/// ```ignore
/// trace_proto!("read token {:?}", token);
/// ```
#[macro_export]
macro_rules! trace_proto {
    ($($arg:tt)*) => {
        $crate::tracing::trace!(target: "xfer::protocol", $($arg)*);
    };
}

/// Emit a statistics trace.
///
/// # Example
/// ```ignore
/// trace_stats!("transferred {} bytes", bytes);
/// ```
#[macro_export]
macro_rules! trace_stats {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: "xfer::stats", $($arg)*);
    };
}

/// Emit a file list trace.
///
/// # Example
/// ```ignore
/// trace_flist!("found {} entries in {:?}", count, dir);
/// ```
#[macro_export]
macro_rules! trace_flist {
    ($($arg:tt)*) => {
        $crate::tracing::debug!(target: "xfer::flist", $($arg)*);
    };
}
