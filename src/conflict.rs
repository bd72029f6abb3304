//! Destination conflict handling.
//!
//! Before a file is moved into a category folder the proposed destination is
//! checked. A free destination is used as is. An occupied one is compared with
//! the source: identical bytes mean the file is already there, anything else
//! (including a comparison that could not be carried out) gets a numbered
//! name such as `report(1).pdf`.

use crate::fs_ops::FileSystem;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Outcome of checking a destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Move the source to this path.
    MoveTo(PathBuf),
    /// The destination already holds identical content; leave the source.
    Duplicate,
}

impl Resolution {
    /// The final path, or `None` for a duplicate.
    pub fn into_path(self) -> Option<PathBuf> {
        match self {
            Resolution::MoveTo(path) => Some(path),
            Resolution::Duplicate => None,
        }
    }
}

/// Decides where a file may land without overwriting anything.
pub struct ConflictResolver<'a, F: FileSystem> {
    fs: &'a F,
}

impl<'a, F: FileSystem> ConflictResolver<'a, F> {
    pub fn new(fs: &'a F) -> Self {
        Self { fs }
    }

    /// Resolves `destination` for a move of `source`.
    ///
    /// Returns `None` when `destination` already holds a byte-identical copy of
    /// `source`, otherwise the path to move to.
    pub fn resolve_conflict(&self, destination: &Path, source: &Path) -> Option<PathBuf> {
        self.resolve(destination, source).into_path()
    }

    /// Same as [`resolve_conflict`](Self::resolve_conflict) with a named outcome.
    pub fn resolve(&self, destination: &Path, source: &Path) -> Resolution {
        if !self.fs.exists(destination) {
            return Resolution::MoveTo(destination.to_path_buf());
        }

        match self.fs.same_contents(source, destination) {
            Ok(true) => return Resolution::Duplicate,
            Ok(false) => {}
            Err(e) => {
                // Unknown counts as different.
                warn!(
                    source = %source.display(),
                    destination = %destination.display(),
                    error = %e,
                    "could not compare contents, keeping both files"
                );
            }
        }

        Resolution::MoveTo(self.next_free_name(destination))
    }

    /// First `name(n).ext` next to `destination` that is not taken, n >= 1.
    fn next_free_name(&self, destination: &Path) -> PathBuf {
        (1u64..)
            .map(|n| numbered_path(destination, n))
            .find(|candidate| !self.fs.exists(candidate))
            .unwrap_or_else(|| destination.to_path_buf())
    }
}

/// Inserts `(n)` between a file's stem and its extension.
///
/// ```
/// use homesort::conflict::numbered_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(numbered_path(Path::new("/d/report.pdf"), 2), PathBuf::from("/d/report(2).pdf"));
/// assert_eq!(numbered_path(Path::new("/d/README"), 1), PathBuf::from("/d/README(1)"));
/// ```
pub fn numbered_path(path: &Path, n: u64) -> PathBuf {
    let mut name = OsString::new();
    if let Some(stem) = path.file_stem() {
        name.push(stem);
    }
    name.push(format!("({})", n));
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}
