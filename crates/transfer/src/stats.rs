//! Session summaries and throughput formatting.

use std::time::Duration;

const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

/// Renders a byte count with two decimals in the largest binary unit that
/// keeps the value at or above one, e.g. `"39.06 KiB"`.
#[must_use]
pub fn format_bytes(bytes: f64) -> String {
    if bytes < 1024.0 {
        return format!("{bytes:4.2} bytes");
    }
    let mut value = bytes;
    let mut unit = UNITS[0];
    for candidate in UNITS {
        value /= 1024.0;
        unit = candidate;
        if value < 1024.0 {
            break;
        }
    }
    format!("{value:4.2} {unit}")
}

/// Renders `bytes` transferred over `elapsed` as a per-second rate.
///
/// Durations shorter than one millisecond count as one millisecond.
#[must_use]
pub fn format_rate(bytes: u64, elapsed: Duration) -> String {
    let millis = elapsed.as_secs_f64() * 1000.0;
    let per_second = bytes as f64 * 1000.0 / millis.max(1.0);
    format!("{}/s", format_bytes(per_second))
}

/// Outcome of one sending session.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SendSummary {
    /// Items announced to the receiver.
    pub items: u64,
    /// File bodies streamed.
    pub files: u64,
    /// Directories announced.
    pub directories: u64,
    /// Items skipped locally or refused by the receiver.
    pub skipped: u64,
    /// Body bytes sent.
    pub bytes: u64,
    /// Files whose digests disagreed.
    pub digest_mismatches: u64,
    /// Wall-clock duration of the session.
    pub elapsed: Duration,
}

/// Outcome of one receiving session.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ReceiveSummary {
    /// Items announced by the sender.
    pub items: u64,
    /// File bodies written.
    pub files: u64,
    /// Directory items handled.
    pub directories: u64,
    /// Items refused.
    pub skipped: u64,
    /// Body bytes written.
    pub bytes: u64,
    /// Files whose digests disagreed.
    pub digest_mismatches: u64,
    /// Wall-clock duration of the session.
    pub elapsed: Duration,
}
