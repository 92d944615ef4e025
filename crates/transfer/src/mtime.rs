//! Modification times as epoch milliseconds.

use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use filetime::FileTime;

/// Converts a timestamp to milliseconds since the Unix epoch.
///
/// Times before the epoch yield negative values.
#[must_use]
pub fn to_epoch_millis(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_millis()).unwrap_or(i64::MAX),
        Err(before) => i64::try_from(before.duration().as_millis()).map_or(i64::MIN, |ms| -ms),
    }
}

/// Modification time of `path` in epoch milliseconds.
pub fn read_millis(path: &Path) -> io::Result<i64> {
    Ok(to_epoch_millis(path.metadata()?.modified()?))
}

/// Sets the modification time of `path`, leaving the access time alone.
pub fn apply_millis(path: &Path, millis: i64) -> io::Result<()> {
    let seconds = millis.div_euclid(1000);
    let nanos = (millis.rem_euclid(1000) * 1_000_000) as u32;
    filetime::set_file_mtime(path, FileTime::from_unix_time(seconds, nanos))
}

/// Absolute difference between two epoch-millisecond stamps.
#[must_use]
pub fn drift(expected: i64, actual: i64) -> Duration {
    Duration::from_millis(expected.abs_diff(actual))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_conversion_handles_both_sides() {
        assert_eq!(to_epoch_millis(UNIX_EPOCH + Duration::from_millis(1_500)), 1_500);
        assert_eq!(to_epoch_millis(UNIX_EPOCH - Duration::from_millis(2_250)), -2_250);
    }

    #[test]
    fn applied_time_reads_back() {
        let temp = tempfile::NamedTempFile::new().expect("temp file");
        apply_millis(temp.path(), 1_600_000_000_123).expect("apply");
        let read = read_millis(temp.path()).expect("read");
        assert!(drift(1_600_000_000_123, read) < Duration::from_secs(1));
    }

    #[test]
    fn drift_is_symmetric() {
        assert_eq!(drift(10, 1_510), Duration::from_millis(1_500));
        assert_eq!(drift(1_510, 10), Duration::from_millis(1_500));
    }
}
