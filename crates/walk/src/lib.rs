#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `walk` enumerates a sender's source roots. For a directory root it yields
//! the root itself, then every descendant depth-first, a directory always
//! ahead of its contents and siblings in byte order of their names. The
//! resulting relative paths are therefore sorted in [`std::path::Path`] order,
//! which is the order the sender announces items in.
//!
//! # Design
//!
//! [`WalkBuilder`] configures the traversal and [`Walker`] implements
//! [`Iterator`]. Each directory is read completely and sorted when it is
//! entered, so memory use is proportional to the widest directory on the
//! current path rather than to the whole tree.
//!
//! # Errors
//!
//! [`WalkBuilder::build`] fails when the root cannot be inspected. Problems
//! below the root, such as an unreadable subdirectory or an entry that
//! vanished after being listed, are yielded as [`WalkError`] items and the
//! walk continues with the next entry.
//!
//! # Examples
//!
//! ```
//! use std::path::PathBuf;
//! use walk::WalkBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let temp = tempfile::tempdir()?;
//! let root = temp.path().join("photos");
//! std::fs::create_dir_all(root.join("2024"))?;
//! std::fs::write(root.join("2024/beach.jpg"), b"jpeg")?;
//!
//! let paths: Vec<PathBuf> = WalkBuilder::new(&root)
//!     .build()?
//!     .map(|entry| entry.map(|entry| entry.relative_path().to_path_buf()))
//!     .collect::<Result<_, _>>()?;
//! assert_eq!(paths, [PathBuf::new(), "2024".into(), "2024/beach.jpg".into()]);
//! # Ok(())
//! # }
//! ```

mod builder;
mod entry;
mod error;
mod walker;

pub use builder::WalkBuilder;
pub use entry::{EntryKind, WalkEntry};
pub use error::{WalkError, WalkErrorKind};
pub use walker::Walker;

#[cfg(test)]
mod tests;
