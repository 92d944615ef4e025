use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;

use crate::constants::DIRECTORY_SIZE;

/// Separator between components of a wire path.
pub const PATH_SEPARATOR: u8 = b'/';

/// Kind of an announced item.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ItemKind {
    /// Regular file followed by a body and a digest exchange.
    File,
    /// Directory; no body and no digest.
    Directory,
}

/// One unit of transfer as announced by the sender.
///
/// `relative_path` holds the exact bytes of the path token: components of the
/// local file names separated by `/`, starting with the name of the transfer
/// root. Names are never re-encoded, so distinct local names stay distinct on
/// the wire. `mod_time` is in milliseconds since the Unix epoch.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransferItem {
    relative_path: Vec<u8>,
    kind: ItemKind,
    size: u64,
    mod_time: i64,
}

impl TransferItem {
    /// A regular file of `size` bytes.
    #[must_use]
    pub fn file(relative_path: impl Into<Vec<u8>>, size: u64, mod_time: i64) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind: ItemKind::File,
            size,
            mod_time,
        }
    }

    /// A directory.
    #[must_use]
    pub fn directory(relative_path: impl Into<Vec<u8>>, mod_time: i64) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind: ItemKind::Directory,
            size: 0,
            mod_time,
        }
    }

    /// Rebuilds an item from its three wire fields.
    ///
    /// A size of `-1` announces a directory. Any other negative size is
    /// treated as an empty file.
    #[must_use]
    pub fn from_wire(relative_path: impl Into<Vec<u8>>, mod_time: i64, size: i64) -> Self {
        if size == DIRECTORY_SIZE {
            Self::directory(relative_path, mod_time)
        } else {
            Self::file(relative_path, u64::try_from(size).unwrap_or(0), mod_time)
        }
    }

    /// Path bytes exactly as they travel in the path token.
    #[must_use]
    pub fn relative_path(&self) -> &[u8] {
        &self.relative_path
    }

    /// Path for diagnostics, with invalid UTF-8 replaced.
    #[must_use]
    pub fn display_path(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.relative_path)
    }

    /// Native relative path built from the wire components.
    ///
    /// On Unix every byte sequence maps onto a file name. Elsewhere the
    /// components must be UTF-8; `None` is returned otherwise.
    #[must_use]
    pub fn local_path(&self) -> Option<PathBuf> {
        let mut path = PathBuf::new();
        for component in self
            .relative_path
            .split(|&byte| byte == PATH_SEPARATOR)
            .filter(|component| !component.is_empty())
        {
            path.push(native_name(component)?);
        }
        Some(path)
    }

    /// File or directory.
    #[must_use]
    pub const fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Returns `true` for directory items.
    #[must_use]
    pub const fn is_directory(&self) -> bool {
        matches!(self.kind, ItemKind::Directory)
    }

    /// Body length in bytes; `0` for directories.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Modification time in epoch milliseconds.
    #[must_use]
    pub const fn mod_time(&self) -> i64 {
        self.mod_time
    }

    /// Size as announced on the wire (`-1` for directories).
    #[must_use]
    pub fn wire_size(&self) -> i64 {
        match self.kind {
            ItemKind::Directory => DIRECTORY_SIZE,
            ItemKind::File => i64::try_from(self.size).unwrap_or(i64::MAX),
        }
    }

    /// Returns `true` when the path is empty, absolute or climbs out of the
    /// receiver's target directory.
    #[must_use]
    pub fn escapes_target(&self) -> bool {
        let path = self.relative_path.as_slice();
        path.is_empty()
            || path.starts_with(b"/")
            || path.starts_with(b"\\")
            || path.get(1) == Some(&b':')
            || path
                .split(|&byte| byte == b'/' || byte == b'\\')
                .any(|component| component == b"..")
    }
}

#[cfg(unix)]
fn native_name(component: &[u8]) -> Option<&std::ffi::OsStr> {
    use std::os::unix::ffi::OsStrExt;
    Some(std::ffi::OsStr::from_bytes(component))
}

#[cfg(not(unix))]
fn native_name(component: &[u8]) -> Option<&std::ffi::OsStr> {
    std::str::from_utf8(component).ok().map(std::ffi::OsStr::new)
}

impl fmt::Display for TransferItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ItemKind::Directory => write!(f, "{}/", self.display_path()),
            ItemKind::File => write!(f, "{} ({} bytes)", self.display_path(), self.size),
        }
    }
}
