use crate::entry::WalkEntry;
use crate::error::WalkError;
use logging::trace_flist;
use std::collections::HashSet;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Depth-first iterator over a source tree.
///
/// A directory is yielded before its children and the children of every
/// directory are visited in byte order of their names, so the sequence of
/// relative paths is sorted in [`Path`] order.
#[derive(Debug)]
pub struct Walker {
    follow_symlinks: bool,
    root_entry: Option<WalkEntry>,
    stack: Vec<DirectoryState>,
    visited: HashSet<PathBuf>,
    pending: Option<WalkError>,
}

impl Walker {
    pub(crate) fn new(
        root: PathBuf,
        follow_symlinks: bool,
        include_root: bool,
    ) -> Result<Self, WalkError> {
        let root = absolutize(root)?;
        trace_flist!("building file list from {:?}", root);

        let metadata =
            stat(&root, follow_symlinks).map_err(|error| WalkError::root(root.clone(), error))?;

        let mut walker = Self {
            follow_symlinks,
            root_entry: None,
            stack: Vec::new(),
            visited: HashSet::new(),
            pending: None,
        };

        if metadata.is_dir() {
            let canonical =
                fs::canonicalize(&root).map_err(|error| WalkError::root(root.clone(), error))?;
            walker.visited.insert(canonical);
            let state = DirectoryState::read(root.clone(), PathBuf::new(), 0)
                .map_err(|error| WalkError::root(root.clone(), error))?;
            walker.stack.push(state);
        }

        if include_root {
            walker.root_entry = Some(WalkEntry {
                full_path: root,
                relative_path: PathBuf::new(),
                metadata,
                depth: 0,
            });
        }

        Ok(walker)
    }

    fn push_directory(
        &mut self,
        fs_path: PathBuf,
        relative_prefix: PathBuf,
        depth: usize,
    ) -> Result<(), WalkError> {
        let canonical = fs::canonicalize(&fs_path)
            .map_err(|error| WalkError::stat(fs_path.clone(), error))?;
        if !self.visited.insert(canonical) {
            trace_flist!("skipping already visited directory: {:?}", fs_path);
            return Ok(());
        }

        match DirectoryState::read(fs_path.clone(), relative_prefix, depth) {
            Ok(state) => self.stack.push(state),
            Err(error) => return Err(WalkError::list(fs_path, error)),
        }
        Ok(())
    }
}

impl Iterator for Walker {
    type Item = Result<WalkEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.root_entry.take() {
            return Some(Ok(root));
        }
        if let Some(error) = self.pending.take() {
            return Some(Err(error));
        }

        loop {
            let state = self.stack.last_mut()?;
            let Some(name) = state.next_name() else {
                self.stack.pop();
                continue;
            };

            let full_path = state.fs_path.join(&name);
            let relative_path = state.relative_prefix.join(&name);
            let depth = state.depth + 1;

            let metadata = match stat(&full_path, self.follow_symlinks) {
                Ok(metadata) => metadata,
                Err(error) => return Some(Err(WalkError::stat(full_path, error))),
            };

            if metadata.is_dir() {
                if let Err(error) =
                    self.push_directory(full_path.clone(), relative_path.clone(), depth)
                {
                    self.pending = Some(error);
                }
            }

            return Some(Ok(WalkEntry {
                full_path,
                relative_path,
                metadata,
                depth,
            }));
        }
    }
}

#[derive(Clone, Debug)]
struct DirectoryState {
    fs_path: PathBuf,
    relative_prefix: PathBuf,
    entries: Vec<OsString>,
    index: usize,
    depth: usize,
}

impl DirectoryState {
    fn read(fs_path: PathBuf, relative_prefix: PathBuf, depth: usize) -> io::Result<Self> {
        let mut entries = fs::read_dir(&fs_path)?
            .map(|entry| entry.map(|entry| entry.file_name()))
            .collect::<io::Result<Vec<_>>>()?;
        entries.sort();

        trace_flist!("found {} entries in {:?}", entries.len(), fs_path);

        Ok(Self {
            fs_path,
            relative_prefix,
            entries,
            index: 0,
            depth,
        })
    }

    fn next_name(&mut self) -> Option<OsString> {
        let name = self.entries.get(self.index).cloned();
        if name.is_some() {
            self.index += 1;
        }
        name
    }
}

/// Metadata of `path`, resolved through a symlink when `follow` is set.
///
/// A dangling symlink reports the link itself.
fn stat(path: &Path, follow: bool) -> io::Result<fs::Metadata> {
    let metadata = fs::symlink_metadata(path)?;
    if follow && metadata.file_type().is_symlink() {
        return Ok(fs::metadata(path).unwrap_or(metadata));
    }
    Ok(metadata)
}

fn absolutize(path: PathBuf) -> Result<PathBuf, WalkError> {
    if path.is_absolute() {
        Ok(path)
    } else {
        let cwd = env::current_dir().map_err(|error| WalkError::root(path.clone(), error))?;
        Ok(cwd.join(path))
    }
}
