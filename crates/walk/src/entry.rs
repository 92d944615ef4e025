use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Broad classification of an enumerated entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntryKind {
    /// Regular file (or a followed symlink to one).
    File,
    /// Directory (or a followed symlink to one).
    Directory,
    /// Symlink that was not followed or whose target is missing.
    Symlink,
    /// Sockets, FIFOs, devices and anything else.
    Other,
}

impl EntryKind {
    fn of(file_type: fs::FileType) -> Self {
        if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::File
        } else if file_type.is_symlink() {
            Self::Symlink
        } else {
            Self::Other
        }
    }
}

/// One step of a traversal.
#[derive(Debug)]
pub struct WalkEntry {
    pub(crate) full_path: PathBuf,
    pub(crate) relative_path: PathBuf,
    pub(crate) metadata: fs::Metadata,
    pub(crate) depth: usize,
}

impl WalkEntry {
    /// Absolute path of the entry.
    #[must_use]
    pub fn full_path(&self) -> &Path {
        &self.full_path
    }

    /// Path relative to the traversal root; empty for the root itself.
    #[must_use]
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// Metadata of the entry, resolved through symlinks when the walker follows them.
    #[must_use]
    pub fn metadata(&self) -> &fs::Metadata {
        &self.metadata
    }

    /// Classification derived from [`Self::metadata`].
    #[must_use]
    pub fn kind(&self) -> EntryKind {
        EntryKind::of(self.metadata.file_type())
    }

    /// Length in bytes reported by the filesystem.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.metadata.len()
    }

    /// Returns `true` when the filesystem reports a zero length.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metadata.len() == 0
    }

    /// Last modification time, if the platform exposes one.
    #[must_use]
    pub fn modified(&self) -> Option<SystemTime> {
        self.metadata.modified().ok()
    }

    /// Final component of the relative path; `None` for the root.
    #[must_use]
    pub fn file_name(&self) -> Option<&OsStr> {
        self.relative_path.file_name()
    }

    /// Depth below the root (the root is `0`).
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Whether this entry is the traversal root.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.depth == 0
    }
}
