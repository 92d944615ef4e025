use crate::error::WalkError;
use crate::walker::Walker;
use std::path::PathBuf;

/// Configures a traversal rooted at one source path.
#[derive(Clone, Debug)]
pub struct WalkBuilder {
    root: PathBuf,
    follow_symlinks: bool,
    include_root: bool,
}

impl WalkBuilder {
    /// Creates a builder for `root`.
    ///
    /// Defaults: symlinks are followed and the root itself is the first entry.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            follow_symlinks: true,
            include_root: true,
        }
    }

    /// Configures whether symlinks are resolved.
    ///
    /// When enabled, a symlink is reported with its target's metadata and a
    /// symlink to a directory is descended into under the link's own relative
    /// path. Canonical directory paths are tracked so a link cycle is entered
    /// only once.
    #[must_use]
    pub const fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Controls whether the root entry is yielded before its descendants.
    #[must_use]
    pub const fn include_root(mut self, include: bool) -> Self {
        self.include_root = include;
        self
    }

    /// Inspects the root and returns the iterator.
    pub fn build(self) -> Result<Walker, WalkError> {
        Walker::new(self.root, self.follow_symlinks, self.include_root)
    }
}
