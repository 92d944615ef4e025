use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Error returned when part of a source tree cannot be enumerated.
///
/// Only failures on the traversal root abort [`crate::WalkBuilder::build`].
/// Failures below the root are yielded by the iterator and traversal carries
/// on with the next sibling.
#[derive(Debug)]
pub struct WalkError {
    kind: WalkErrorKind,
}

impl WalkError {
    /// A failure on the traversal root itself.
    #[must_use]
    pub fn root(path: PathBuf, source: io::Error) -> Self {
        Self {
            kind: WalkErrorKind::Root { path, source },
        }
    }

    pub(crate) fn list(path: PathBuf, source: io::Error) -> Self {
        Self {
            kind: WalkErrorKind::List { path, source },
        }
    }

    pub(crate) fn stat(path: PathBuf, source: io::Error) -> Self {
        Self {
            kind: WalkErrorKind::Stat { path, source },
        }
    }

    /// Returns the specific failure.
    #[must_use]
    pub fn kind(&self) -> &WalkErrorKind {
        &self.kind
    }

    /// Returns the filesystem path associated with the error.
    ///
    /// ```
    /// use walk::WalkBuilder;
    ///
    /// let error = WalkBuilder::new("./no_such_source_root").build().unwrap_err();
    /// assert!(error.path().ends_with("no_such_source_root"));
    /// ```
    #[must_use]
    pub fn path(&self) -> &Path {
        match &self.kind {
            WalkErrorKind::Root { path, .. }
            | WalkErrorKind::List { path, .. }
            | WalkErrorKind::Stat { path, .. } => path,
        }
    }

    /// Returns `true` when the error prevented traversal from starting.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        matches!(self.kind, WalkErrorKind::Root { .. })
    }
}

impl fmt::Display for WalkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            WalkErrorKind::Root { path, source } => {
                write!(f, "cannot access source root '{}': {source}", path.display())
            }
            WalkErrorKind::List { path, source } => {
                write!(f, "cannot list directory '{}': {source}", path.display())
            }
            WalkErrorKind::Stat { path, source } => {
                write!(f, "cannot stat '{}': {source}", path.display())
            }
        }
    }
}

impl Error for WalkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            WalkErrorKind::Root { source, .. }
            | WalkErrorKind::List { source, .. }
            | WalkErrorKind::Stat { source, .. } => Some(source),
        }
    }
}

/// Classification of traversal failures.
#[derive(Debug)]
pub enum WalkErrorKind {
    /// The traversal root could not be inspected or made absolute.
    Root {
        /// Root path as supplied by the caller.
        path: PathBuf,
        /// Underlying error emitted by the operating system.
        source: io::Error,
    },
    /// A directory's entries could not be read; its subtree is skipped.
    List {
        /// Directory whose contents could not be read.
        path: PathBuf,
        /// Underlying error emitted by the operating system.
        source: io::Error,
    },
    /// An entry vanished or could not be inspected after it was listed.
    Stat {
        /// Path whose metadata could not be retrieved.
        path: PathBuf,
        /// Underlying error emitted by the operating system.
        source: io::Error,
    },
}
