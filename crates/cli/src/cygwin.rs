//! Cygwin path translation.

const CYGDRIVE: &str = "/cygdrive/";

/// Translates `/cygdrive/c/dir/file` into `c:\dir\file`.
///
/// Returns `None` when `path` does not start with `/cygdrive/`.
#[must_use]
pub fn cygwin_to_windows(path: &str) -> Option<String> {
    let rest = path.strip_prefix(CYGDRIVE)?;
    let translated = match rest.split_once('/') {
        Some((drive, tail)) => format!("{drive}:\\{}", tail.replace('/', "\\")),
        None => rest.to_owned(),
    };
    Some(translated)
}
