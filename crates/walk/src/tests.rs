use super::*;
use std::fs;
use std::path::{Path, PathBuf};

fn relative_paths(walker: Walker) -> Vec<PathBuf> {
    walker
        .map(|entry| entry.expect("walker entry").relative_path().to_path_buf())
        .collect()
}

#[test]
fn missing_root_fails_to_build() {
    let error = WalkBuilder::new("/nonexistent/path/for/walker")
        .build()
        .expect_err("missing root should fail");
    assert!(error.is_root());
    assert!(matches!(error.kind(), WalkErrorKind::Root { .. }));
    assert_eq!(error.path(), Path::new("/nonexistent/path/for/walker"));
}

#[test]
fn single_file_root_yields_one_entry() {
    let temp = tempfile::tempdir().expect("tempdir");
    let file = temp.path().join("file.txt");
    fs::write(&file, b"contents").expect("write");

    let mut walker = WalkBuilder::new(&file).build().expect("build walker");
    let entry = walker.next().expect("entry").expect("entry ok");
    assert!(entry.is_root());
    assert_eq!(entry.kind(), EntryKind::File);
    assert_eq!(entry.len(), 8);
    assert!(entry.relative_path().as_os_str().is_empty());
    assert_eq!(entry.full_path(), file);
    assert!(walker.next().is_none());
}

#[test]
fn empty_directory_root_yields_only_itself() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path().join("empty");
    fs::create_dir(&root).expect("create root");

    let entries: Vec<WalkEntry> = WalkBuilder::new(&root)
        .build()
        .expect("build walker")
        .collect::<Result<_, _>>()
        .expect("entries");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind(), EntryKind::Directory);
    assert!(entries[0].file_name().is_none());
}

#[test]
fn directories_precede_their_contents_in_path_order() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path().join("root");
    fs::create_dir_all(root.join("a/deeper")).expect("dirs");
    fs::create_dir(root.join("b")).expect("dir b");
    fs::write(root.join("a/inner.txt"), b"data").expect("write inner");
    fs::write(root.join("a/deeper/z.bin"), b"\0").expect("write deep");
    fs::write(root.join("a-sibling"), b"data").expect("write sibling");
    fs::write(root.join("c.txt"), b"data").expect("write file");

    let paths = relative_paths(WalkBuilder::new(&root).include_root(false).build().expect("walker"));
    assert_eq!(
        paths,
        vec![
            PathBuf::from("a"),
            PathBuf::from("a/deeper"),
            PathBuf::from("a/deeper/z.bin"),
            PathBuf::from("a/inner.txt"),
            PathBuf::from("a-sibling"),
            PathBuf::from("b"),
            PathBuf::from("c.txt"),
        ]
    );

    let mut sorted = paths.clone();
    sorted.sort();
    assert_eq!(paths, sorted, "walk order equals Path ordering");
}

#[test]
fn depth_and_file_name_track_position() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path().join("root");
    fs::create_dir_all(root.join("nested")).expect("create nested");
    fs::write(root.join("nested/file.txt"), b"data").expect("write nested file");

    let entries: Vec<WalkEntry> = WalkBuilder::new(&root)
        .build()
        .expect("walker")
        .collect::<Result<_, _>>()
        .expect("entries");
    let depths: Vec<usize> = entries.iter().map(WalkEntry::depth).collect();
    assert_eq!(depths, vec![0, 1, 2]);
    assert_eq!(
        entries[2].file_name(),
        Some(std::ffi::OsStr::new("file.txt"))
    );
    assert_eq!(entries[2].full_path(), root.join("nested/file.txt"));
}

#[cfg(unix)]
#[test]
fn symlinks_resolve_to_their_targets_by_default() {
    use std::os::unix::fs::symlink;

    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path().join("root");
    let target = temp.path().join("target");
    fs::create_dir(&root).expect("create root");
    fs::create_dir(&target).expect("create target");
    fs::write(target.join("inner.txt"), b"data").expect("write inner");
    symlink(&target, root.join("link")).expect("create symlink");

    let entries: Vec<WalkEntry> = WalkBuilder::new(&root)
        .include_root(false)
        .build()
        .expect("walker")
        .collect::<Result<_, _>>()
        .expect("entries");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].relative_path(), Path::new("link"));
    assert_eq!(entries[0].kind(), EntryKind::Directory);
    assert_eq!(entries[1].relative_path(), Path::new("link/inner.txt"));
    assert_eq!(entries[1].kind(), EntryKind::File);
}

#[cfg(unix)]
#[test]
fn symlinks_are_reported_verbatim_when_not_followed() {
    use std::os::unix::fs::symlink;

    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path().join("root");
    let target = temp.path().join("target");
    fs::create_dir(&root).expect("create root");
    fs::create_dir(&target).expect("create target");
    fs::write(target.join("inner.txt"), b"data").expect("write inner");
    symlink(&target, root.join("link")).expect("create symlink");

    let walker = WalkBuilder::new(&root)
        .follow_symlinks(false)
        .include_root(false)
        .build()
        .expect("walker");
    let kinds: Vec<EntryKind> = walker.map(|entry| entry.expect("entry").kind()).collect();
    assert_eq!(kinds, vec![EntryKind::Symlink]);
}

#[cfg(unix)]
#[test]
fn dangling_symlink_is_reported_as_link() {
    use std::os::unix::fs::symlink;

    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path().join("root");
    fs::create_dir(&root).expect("create root");
    symlink(temp.path().join("nowhere"), root.join("dangling")).expect("symlink");

    let mut walker = WalkBuilder::new(&root).include_root(false).build().expect("walker");
    let entry = walker.next().expect("entry").expect("entry ok");
    assert_eq!(entry.kind(), EntryKind::Symlink);
    assert!(walker.next().is_none());
}

#[cfg(unix)]
#[test]
fn symlink_cycles_are_entered_once() {
    use std::os::unix::fs::symlink;

    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path().join("root");
    fs::create_dir(&root).expect("create root");
    symlink(&root, root.join("self")).expect("symlink");

    let paths = relative_paths(WalkBuilder::new(&root).include_root(false).build().expect("walker"));
    assert_eq!(paths, vec![PathBuf::from("self")]);
}
