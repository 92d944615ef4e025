//! Receiver answer to an announced item.

use std::fmt;

/// Whether the receiver will accept the body of the item just announced.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ExistenceDisposition {
    /// The destination is new (or a copy will be created); send the body.
    NotExists,
    /// The destination exists and will be replaced; send the body.
    WillOverwrite,
    /// The destination is kept; no body follows.
    WontOverwrite,
}

impl ExistenceDisposition {
    /// Wire spelling of the answer.
    #[must_use]
    pub const fn as_token(self) -> &'static str {
        match self {
            Self::NotExists => "existsNot",
            Self::WillOverwrite => "existsWillOverwrite",
            Self::WontOverwrite => "existsWontOverwrite",
        }
    }

    /// Parses a wire answer; unknown spellings return `None`.
    #[must_use]
    pub fn from_token(bytes: &[u8]) -> Option<Self> {
        [Self::NotExists, Self::WillOverwrite, Self::WontOverwrite]
            .into_iter()
            .find(|candidate| candidate.as_token().as_bytes() == bytes)
    }

    /// Returns `true` when the sender should stream the body.
    #[must_use]
    pub const fn accepts_body(self) -> bool {
        !matches!(self, Self::WontOverwrite)
    }
}

impl fmt::Display for ExistenceDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}
