//! Expansion of sender roots into announced items.

use std::borrow::Cow;
use std::ffi::OsStr;
use std::io;
use std::path::{Component, Path, PathBuf};

use logging::trace_flist;
use protocol::{PATH_SEPARATOR, TransferItem};
use walk::{EntryKind, WalkBuilder, WalkEntry, WalkError, Walker};

use crate::mtime::to_epoch_millis;

/// An item together with the local file it is read from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceItem {
    source: PathBuf,
    item: TransferItem,
}

impl SourceItem {
    /// Pairs an announced item with its local source.
    pub fn new(source: impl Into<PathBuf>, item: TransferItem) -> Self {
        Self {
            source: source.into(),
            item,
        }
    }

    /// Local path the body is read from.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Item as announced on the wire.
    #[must_use]
    pub const fn item(&self) -> &TransferItem {
        &self.item
    }
}

/// One step of a root expansion.
#[derive(Debug)]
pub enum Expansion {
    /// An item to send.
    Item(SourceItem),
    /// An entry that is neither a file nor a directory.
    Unsupported(PathBuf),
    /// An entry whose name cannot be carried in a path token.
    Unencodable(PathBuf),
}

/// Items of one sender root in transfer order.
///
/// A directory root yields its own entry first and then every descendant in
/// path order; any other root yields a single item. Relative paths start with
/// the root's final component. A root without a final component (`/`) has
/// no name to announce, so its own entry is skipped and its children land
/// directly in the receiver's target directory.
#[derive(Debug)]
pub struct RootItems {
    prefix: Vec<u8>,
    walker: Walker,
}

impl RootItems {
    /// Starts expanding `root`.
    pub fn new(root: &Path) -> Result<Self, WalkError> {
        let prefix = match root_name(root) {
            Some(name) => name_bytes(name)
                .ok_or_else(|| {
                    WalkError::root(
                        root.to_path_buf(),
                        io::Error::new(
                            io::ErrorKind::InvalidData,
                            "root name cannot be carried in a path token",
                        ),
                    )
                })?
                .into_owned(),
            None => Vec::new(),
        };
        Self::with_prefix(root, prefix)
    }

    fn with_prefix(root: &Path, prefix: Vec<u8>) -> Result<Self, WalkError> {
        let walker = WalkBuilder::new(root).build()?;
        Ok(Self { prefix, walker })
    }

    fn convert(&self, entry: &WalkEntry) -> Expansion {
        let Some(relative) = wire_path(&self.prefix, entry.relative_path()) else {
            return Expansion::Unencodable(entry.full_path().to_path_buf());
        };
        let mod_time = entry.modified().map_or(0, to_epoch_millis);
        let item = match entry.kind() {
            EntryKind::Directory => TransferItem::directory(relative, mod_time),
            EntryKind::File => TransferItem::file(relative, entry.len(), mod_time),
            EntryKind::Symlink | EntryKind::Other => {
                return Expansion::Unsupported(entry.full_path().to_path_buf());
            }
        };
        Expansion::Item(SourceItem::new(entry.full_path(), item))
    }
}

impl Iterator for RootItems {
    type Item = Result<Expansion, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(error) => return Some(Err(error)),
            };
            // An empty path token ends the item loop on the receiver.
            if self.prefix.is_empty() && entry.is_root() {
                trace_flist!("root {} has no name, sending its contents", entry.full_path().display());
                continue;
            }
            return Some(Ok(self.convert(&entry)));
        }
    }
}

fn root_name(root: &Path) -> Option<&OsStr> {
    root.components().rev().find_map(|component| match component {
        Component::Normal(name) => Some(name),
        _ => None,
    })
}

/// Raw bytes of one file name as carried on the wire.
#[cfg(unix)]
fn name_bytes(name: &OsStr) -> Option<Cow<'_, [u8]>> {
    use std::os::unix::ffi::OsStrExt;
    Some(Cow::Borrowed(name.as_bytes()))
}

#[cfg(not(unix))]
fn name_bytes(name: &OsStr) -> Option<Cow<'_, [u8]>> {
    name.to_str().map(|name| Cow::Borrowed(name.as_bytes()))
}

fn wire_path(prefix: &[u8], relative: &Path) -> Option<Vec<u8>> {
    let mut path = prefix.to_vec();
    for component in relative.components() {
        if let Component::Normal(name) = component {
            if !path.is_empty() {
                path.push(PATH_SEPARATOR);
            }
            path.extend_from_slice(&name_bytes(name)?);
        }
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn items(root: &Path) -> Vec<TransferItem> {
        RootItems::new(root)
            .expect("expand")
            .map(|step| match step.expect("step") {
                Expansion::Item(item) => item.item().clone(),
                Expansion::Unsupported(path) | Expansion::Unencodable(path) => {
                    panic!("unexpected {}", path.display())
                }
            })
            .collect()
    }

    #[test]
    fn directory_root_leads_with_itself() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("photos");
        fs::create_dir_all(root.join("2024")).expect("dirs");
        fs::write(root.join("2024/a.jpg"), b"jpeg").expect("write");
        fs::write(root.join("index.txt"), b"").expect("write");

        let listed = items(&root);
        let paths: Vec<&[u8]> = listed.iter().map(TransferItem::relative_path).collect();
        assert_eq!(
            paths,
            [
                b"photos".as_slice(),
                b"photos/2024",
                b"photos/2024/a.jpg",
                b"photos/index.txt"
            ]
        );
        assert!(listed[0].is_directory());
        assert_eq!(listed[2].size(), 4);
        assert_eq!(listed[3].size(), 0);
    }

    #[test]
    fn file_root_is_a_single_item() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = temp.path().join("notes.md");
        fs::write(&file, b"# notes").expect("write");

        let listed = items(&file);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].relative_path(), b"notes.md");
        assert_eq!(listed[0].size(), 7);
        assert!(listed[0].mod_time() > 0);
    }

    #[test]
    fn root_name_ignores_trailing_dot_components() {
        assert_eq!(root_name(Path::new("/srv/data/.")), Some(OsStr::new("data")));
        assert_eq!(root_name(Path::new("/")), None);
        assert_eq!(
            wire_path(b"", Path::new("etc/hosts")).as_deref(),
            Some(b"etc/hosts".as_slice())
        );
    }

    #[test]
    fn nameless_root_sends_only_its_contents() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::create_dir(temp.path().join("etc")).expect("dir");
        fs::write(temp.path().join("etc/hosts"), b"127.0.0.1").expect("write");
        fs::write(temp.path().join("motd"), b"hi").expect("write");

        let listed: Vec<TransferItem> = RootItems::with_prefix(temp.path(), Vec::new())
            .expect("expand")
            .map(|step| match step.expect("step") {
                Expansion::Item(item) => item.item().clone(),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        let paths: Vec<&[u8]> = listed.iter().map(TransferItem::relative_path).collect();
        assert_eq!(paths, [b"etc".as_slice(), b"etc/hosts", b"motd"]);
        assert!(paths.iter().all(|path| !path.is_empty()));
    }

    #[cfg(unix)]
    #[test]
    fn filesystem_root_never_announces_an_empty_path() {
        let mut items = RootItems::new(Path::new("/")).expect("expand /");
        if let Some(Ok(Expansion::Item(first))) = items.next() {
            assert!(!first.item().relative_path().is_empty());
            assert!(!first.item().relative_path().starts_with(b"/"));
        }
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_names_keep_distinct_wire_paths() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("r");
        fs::create_dir(&root).expect("dir");
        let first = root.join(OsString::from_vec(b"a\xfe".to_vec()));
        let second = root.join(OsString::from_vec(b"a\xff".to_vec()));
        if fs::write(&first, b"1").is_err() || fs::write(&second, b"2").is_err() {
            // The filesystem only accepts UTF-8 names.
            return;
        }

        let listed = items(&root);
        let paths: Vec<&[u8]> = listed.iter().map(TransferItem::relative_path).collect();
        assert_eq!(paths, [b"r".as_slice(), b"r/a\xfe", b"r/a\xff"]);
        assert_eq!(
            listed[2].local_path().expect("local path"),
            Path::new("r").join(OsString::from_vec(b"a\xff".to_vec()))
        );
    }
}
