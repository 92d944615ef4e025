//! Tests for command-line option parsing.
//!
//! Covers defaults, value validation, the overwrite/copy override and the
//! mapping onto the shared session configuration.

use std::ffi::OsString;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use cli::parse_args;
use compress::{CompressionLevel, MAX_BLOCK_SIZE};
use logging::LogLevel;
use transfer::ConflictPolicy;

// ==================== Conflict policy ====================

#[test]
fn test_overwrite_flag_selects_overwrite() {
    let parsed = parse_args(["xfer", "-o"]).expect("parse");
    assert_eq!(parsed.conflict_policy, ConflictPolicy::Overwrite);
    assert_eq!(
        parsed.session_config().conflict_policy(),
        ConflictPolicy::Overwrite
    );
}

#[test]
fn test_copy_after_overwrite_wins() {
    let parsed = parse_args(["xfer", "-o", "-O"]).expect("parse");
    assert_eq!(parsed.conflict_policy, ConflictPolicy::Copy);
}

#[test]
fn test_overwrite_after_copy_wins() {
    let parsed = parse_args(["xfer", "--copy", "--overwrite"]).expect("parse");
    assert_eq!(parsed.conflict_policy, ConflictPolicy::Overwrite);
}

// ==================== Values ====================

#[test]
fn test_zero_block_size_is_rejected() {
    let err = parse_args(["xfer", "-B", "0"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
}

#[test]
fn test_block_size_beyond_frame_limit_is_rejected() {
    let too_big = (MAX_BLOCK_SIZE + 1).to_string();
    let err = parse_args(["xfer", "-B", too_big.as_str()]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);

    let err = parse_args(["xfer", "--block-size", "268435456"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
}

#[test]
fn test_largest_block_size_is_accepted() {
    let largest = MAX_BLOCK_SIZE.to_string();
    let parsed = parse_args(["xfer", "-B", largest.as_str()]).expect("parse");
    assert_eq!(parsed.block_size, NonZeroUsize::new(MAX_BLOCK_SIZE));
}

#[test]
fn test_block_size_reaches_config() {
    let parsed = parse_args(["xfer", "--block-size", "4096"]).expect("parse");
    assert_eq!(parsed.block_size, NonZeroUsize::new(4096));
    assert_eq!(parsed.session_config().block_size().get(), 4096);
}

#[test]
fn test_default_block_size_is_16_kib() {
    let parsed = parse_args(["xfer"]).expect("parse");
    assert_eq!(parsed.session_config().block_size().get(), 16 * 1024);
}

#[test]
fn test_non_numeric_port_is_rejected() {
    let err = parse_args(["xfer", "-p", "http"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
}

#[test]
fn test_host_and_port() {
    let parsed = parse_args(["xfer", "-h", "backup.local", "-p", "7000", "a"]).expect("parse");
    assert_eq!(parsed.host, "backup.local");
    assert_eq!(parsed.port, 7000);
    assert!(!parsed.is_receiver());
}

#[test]
fn test_target_directory() {
    let parsed = parse_args(["xfer", "--target", "/srv/incoming"]).expect("parse");
    assert_eq!(parsed.target, PathBuf::from("/srv/incoming"));
    assert!(parsed.is_receiver());
}

#[test]
fn test_compress_level_buckets() {
    let cases = [
        ("0", 1),
        ("1", 1),
        ("2", 5),
        ("5", 5),
        ("6", 9),
        ("9", 9),
        ("42", 9),
        ("-3", 9),
    ];
    for (argument, bucket) in cases {
        let parsed = parse_args(["xfer", "-z", "-Z", argument]).expect("parse");
        assert_eq!(
            parsed.compress_level,
            Some(CompressionLevel::from_bucket(bucket)),
            "level {argument}"
        );
    }
}

#[test]
fn test_log_level_accepts_legacy_names() {
    let parsed = parse_args(["xfer", "-l", "FINEST"]).expect("parse");
    assert_eq!(parsed.log_level, LogLevel::Trace);
    let parsed = parse_args(["xfer", "--log-level", "warning"]).expect("parse");
    assert_eq!(parsed.log_level, LogLevel::Warn);
}

#[test]
fn test_unknown_log_level_is_rejected() {
    let err = parse_args(["xfer", "-l", "LOUD"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
}

#[test]
fn test_modify_window_in_milliseconds() {
    let parsed = parse_args(["xfer", "--modify-window", "2500"]).expect("parse");
    assert_eq!(parsed.modify_window, Duration::from_millis(2500));
    assert_eq!(
        parsed.session_config().modify_window(),
        Duration::from_millis(2500)
    );
}

// ==================== Progress ====================

#[test]
fn test_progress_without_value_uses_forty_ticks() {
    let parsed = parse_args(["xfer", "-b", "file"]).expect("parse");
    assert_eq!(parsed.progress_ticks, Some(40));
    assert_eq!(parsed.paths, vec![OsString::from("file")]);
}

#[test]
fn test_progress_with_explicit_ticks() {
    let parsed = parse_args(["xfer", "--progress=20", "file"]).expect("parse");
    assert_eq!(parsed.progress_ticks, Some(20));
    assert_eq!(parsed.session_config().progress_ticks(), Some(20));
}

#[test]
fn test_progress_is_off_by_default() {
    let parsed = parse_args(["xfer", "file"]).expect("parse");
    assert_eq!(parsed.session_config().progress_ticks(), None);
}

// ==================== Paths ====================

#[test]
fn test_paths_keep_their_order() {
    let parsed = parse_args(["xfer", "c", "a", "b"]).expect("parse");
    assert_eq!(
        parsed.paths,
        vec![OsString::from("c"), OsString::from("a"), OsString::from("b")]
    );
}

#[test]
fn test_unknown_option_is_rejected() {
    let err = parse_args(["xfer", "--delete"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
}

#[test]
fn test_cygwin_translation() {
    assert_eq!(
        cli::cygwin_to_windows("/cygdrive/c/Users/me/file.txt").as_deref(),
        Some("c:\\Users\\me\\file.txt")
    );
    assert_eq!(cli::cygwin_to_windows("/tmp/file.txt"), None);
}
