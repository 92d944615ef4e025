//! Resolution of positional paths into sender roots.

use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use logging::{target, trace_flist};
use tracing::warn;

use crate::cygwin::cygwin_to_windows;

/// Canonicalizes `paths`, translating cygwin paths first when `cygwin` is set.
///
/// Empty arguments are ignored. Paths that cannot be canonicalized are
/// reported and left out.
pub(crate) fn resolve_roots(paths: &[OsString], cygwin: bool) -> Vec<PathBuf> {
    let mut roots = Vec::with_capacity(paths.len());
    for raw in paths {
        let path = if cygwin { translate(raw) } else { raw.clone() };
        if path.is_empty() {
            continue;
        }
        match fs::canonicalize(&path) {
            Ok(root) => {
                trace_flist!("root {} resolved to {}", path.to_string_lossy(), root.display());
                roots.push(root);
            }
            Err(error) => warn!(
                target: target::SENDER,
                "could not create canonical name of {}: {error}",
                path.to_string_lossy()
            ),
        }
    }
    roots
}

fn translate(raw: &OsString) -> OsString {
    match raw.to_str().and_then(cygwin_to_windows) {
        Some(windows) => {
            trace_flist!("converted root to {windows}");
            OsString::from(windows)
        }
        None => {
            warn!(
                target: target::SENDER,
                "{} is not a cygwin path",
                raw.to_string_lossy()
            );
            raw.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_paths_are_canonicalized() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = temp.path().join("a.txt");
        fs::write(&file, b"a").expect("write");
        let dotted = temp.path().join(".").join("a.txt");

        let roots = resolve_roots(&[dotted.into_os_string()], false);
        assert_eq!(roots, vec![fs::canonicalize(&file).expect("canonical")]);
    }

    #[test]
    fn missing_and_empty_paths_are_skipped() {
        let temp = tempfile::tempdir().expect("tempdir");
        let present = temp.path().join("here");
        fs::create_dir(&present).expect("dir");

        let roots = resolve_roots(
            &[
                OsString::new(),
                temp.path().join("absent").into_os_string(),
                present.clone().into_os_string(),
            ],
            false,
        );
        assert_eq!(roots, vec![fs::canonicalize(&present).expect("canonical")]);
    }

    #[test]
    fn non_cygwin_paths_are_kept_when_translating() {
        let temp = tempfile::tempdir().expect("tempdir");
        let roots = resolve_roots(&[temp.path().as_os_str().to_owned()], true);
        assert_eq!(roots, vec![fs::canonicalize(temp.path()).expect("canonical")]);
    }
}
