//! Locating the end of a raw body on a stream it shares with tokens.
//!
//! The receiver reads a body in chunks that may run past the announced size.
//! [`split_chunk`] decides which prefix of a chunk is body and which suffix
//! belongs to the tokens that follow.

/// Result of splitting one chunk at the body boundary.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BodySplit {
    /// Leading bytes of the chunk that belong to the body.
    pub body: usize,
    /// Trailing bytes that follow the body and must be re-read as tokens.
    pub overrun: usize,
}

impl BodySplit {
    /// Returns `true` when the chunk ends exactly at or past the body end.
    #[must_use]
    pub const fn completes_body(&self, consumed_before: u64, declared: u64) -> bool {
        consumed_before + self.body as u64 >= declared
    }
}

/// Splits a chunk of `chunk_len` bytes read after `consumed_before` body bytes
/// of a body declared as `declared` bytes long.
///
/// `overrun = consumed_before + chunk_len - declared`; a non-positive overrun
/// means the whole chunk is body.
#[must_use]
pub fn split_chunk(consumed_before: u64, chunk_len: usize, declared: u64) -> BodySplit {
    let remaining = declared.saturating_sub(consumed_before);
    let body = usize::try_from(remaining).map_or(chunk_len, |remaining| remaining.min(chunk_len));
    BodySplit {
        body,
        overrun: chunk_len - body,
    }
}

/// Running position inside one body.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BodyBoundary {
    declared: u64,
    consumed: u64,
}

impl BodyBoundary {
    /// Starts tracking a body of `declared` bytes.
    #[must_use]
    pub const fn new(declared: u64) -> Self {
        Self {
            declared,
            consumed: 0,
        }
    }

    /// Accounts for one chunk and returns how it splits.
    pub fn advance(&mut self, chunk_len: usize) -> BodySplit {
        let split = split_chunk(self.consumed, chunk_len, self.declared);
        self.consumed += split.body as u64;
        split
    }

    /// Body bytes still expected.
    #[must_use]
    pub const fn remaining(&self) -> u64 {
        self.declared - self.consumed
    }

    /// Body bytes accounted so far.
    #[must_use]
    pub const fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Returns `true` once every declared byte has been accounted.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.consumed >= self.declared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_inside_body_has_no_overrun() {
        assert_eq!(
            split_chunk(0, 16384, 40000),
            BodySplit {
                body: 16384,
                overrun: 0
            }
        );
    }

    #[test]
    fn chunk_crossing_boundary_is_split() {
        let split = split_chunk(32768, 16384, 40000);
        assert_eq!(split.body, 40000 - 32768);
        assert_eq!(split.overrun, 16384 - (40000 - 32768));
        assert!(split.completes_body(32768, 40000));
    }

    #[test]
    fn chunk_ending_exactly_on_boundary() {
        let split = split_chunk(100, 50, 150);
        assert_eq!(split, BodySplit { body: 50, overrun: 0 });
        assert!(split.completes_body(100, 150));
    }

    #[test]
    fn boundary_tracks_consumption() {
        let mut boundary = BodyBoundary::new(10);
        assert_eq!(boundary.advance(4).overrun, 0);
        assert_eq!(boundary.remaining(), 6);
        let split = boundary.advance(9);
        assert_eq!(split, BodySplit { body: 6, overrun: 3 });
        assert!(boundary.is_complete());
        assert_eq!(boundary.consumed(), 10);
    }

    #[test]
    fn empty_body_is_complete_immediately() {
        let mut boundary = BodyBoundary::new(0);
        assert!(boundary.is_complete());
        assert_eq!(boundary.advance(5), BodySplit { body: 0, overrun: 5 });
    }
}
