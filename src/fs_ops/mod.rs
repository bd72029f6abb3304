//! Filesystem capabilities used by the organizer.
//!
//! Classification and conflict handling only touch the disk through the
//! [`FileSystem`] trait, so they run the same against [`RealFs`] and the
//! in-memory [`MemoryFs`].

mod memory;
mod real;

pub use memory::MemoryFs;
pub use real::RealFs;

use std::io;
use std::path::{Path, PathBuf};

/// What a directory entry is, without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Symlinks, sockets and the like. Never moved or descended into.
    Other,
}

/// A single entry returned by [`FileSystem::list_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// The narrow set of filesystem operations the organizer needs.
pub trait FileSystem {
    /// Whether anything occupies `path` (a dangling symlink counts).
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Creates `path` and any missing parents. Existing directories are fine.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Lists the direct children of `path`, sorted by path.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntryInfo>>;

    /// Byte-for-byte comparison of two files.
    fn same_contents(&self, a: &Path, b: &Path) -> io::Result<bool>;

    /// Moves a file. Fails if `to` is already occupied.
    fn move_file(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Removes `path` if it is an empty directory.
    ///
    /// Returns `Ok(false)` when the directory still has entries.
    fn remove_dir_if_empty(&self, path: &Path) -> io::Result<bool>;
}
