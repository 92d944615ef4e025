//! Decimal numeric tokens.

/// Parses a decimal token as `i64`, returning `0` for anything malformed.
///
/// Surrounding ASCII whitespace is ignored. A malformed value never aborts
/// the exchange; callers log it and continue with zero.
#[must_use]
pub fn parse_lenient(bytes: &[u8]) -> i64 {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|text| text.trim().parse().ok())
        .unwrap_or(0)
}

/// Like [`parse_lenient`], but reports whether the value was well formed.
#[must_use]
pub fn parse_checked(bytes: &[u8]) -> Option<i64> {
    std::str::from_utf8(bytes).ok()?.trim().parse().ok()
}
