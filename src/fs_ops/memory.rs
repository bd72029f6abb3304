//! In-memory [`FileSystem`] with failure injection.

use super::{DirEntryInfo, EntryKind, FileSystem};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
enum Node {
    Dir,
    File(Vec<u8>),
}

/// A filesystem tree held in memory.
///
/// Paths are used as given; no normalization is performed, so callers should
/// stick to absolute paths built with `join`.
///
/// ```
/// use homesort::fs_ops::{FileSystem, MemoryFs};
/// use std::path::Path;
///
/// let fs = MemoryFs::new();
/// fs.add_file("/home/u/Downloads/a.txt", b"hi");
/// assert!(fs.is_dir(Path::new("/home/u/Downloads")));
/// assert_eq!(fs.read(Path::new("/home/u/Downloads/a.txt")), Some(b"hi".to_vec()));
/// ```
#[derive(Debug, Default)]
pub struct MemoryFs {
    nodes: RefCell<BTreeMap<PathBuf, Node>>,
    unreadable: RefCell<HashSet<PathBuf>>,
    failing_moves: RefCell<HashSet<PathBuf>>,
    locked_dirs: RefCell<HashSet<PathBuf>>,
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} not found", path.display()),
    )
}

fn permission_denied(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("permission denied: {}", path.display()),
    )
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directory and all of its ancestors.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut nodes = self.nodes.borrow_mut();
        for ancestor in path.as_ref().ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            nodes.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
        }
    }

    /// Adds (or replaces) a file, creating its parent directories.
    pub fn add_file(&self, path: impl AsRef<Path>, contents: &[u8]) {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.nodes
            .borrow_mut()
            .insert(path.to_path_buf(), Node::File(contents.to_vec()));
    }

    /// Contents of a file, if `path` is one.
    pub fn read(&self, path: &Path) -> Option<Vec<u8>> {
        match self.nodes.borrow().get(path) {
            Some(Node::File(data)) => Some(data.clone()),
            _ => None,
        }
    }

    /// Makes every read of `path` fail.
    pub fn make_unreadable(&self, path: impl AsRef<Path>) {
        self.unreadable
            .borrow_mut()
            .insert(path.as_ref().to_path_buf());
    }

    /// Makes every move whose source is `path` fail.
    pub fn fail_moves_from(&self, path: impl AsRef<Path>) {
        self.failing_moves
            .borrow_mut()
            .insert(path.as_ref().to_path_buf());
    }

    /// Makes listing and removing the directory `path` fail.
    pub fn lock_dir(&self, path: impl AsRef<Path>) {
        self.locked_dirs
            .borrow_mut()
            .insert(path.as_ref().to_path_buf());
    }

    fn children(&self, path: &Path) -> Vec<(PathBuf, Node)> {
        self.nodes
            .borrow()
            .iter()
            .filter(|(child, _)| child.parent() == Some(path))
            .map(|(child, node)| (child.clone(), node.clone()))
            .collect()
    }

    fn contents(&self, path: &Path) -> io::Result<Vec<u8>> {
        if self.unreadable.borrow().contains(path) {
            return Err(permission_denied(path));
        }
        self.read(path).ok_or_else(|| not_found(path))
    }
}

impl FileSystem for MemoryFs {
    fn exists(&self, path: &Path) -> bool {
        self.nodes.borrow().contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.nodes.borrow().get(path), Some(Node::Dir))
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        if matches!(self.nodes.borrow().get(path), Some(Node::File(_))) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} is a file", path.display()),
            ));
        }
        self.add_dir(path);
        Ok(())
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntryInfo>> {
        if self.locked_dirs.borrow().contains(path) {
            return Err(permission_denied(path));
        }
        if !self.is_dir(path) {
            return Err(not_found(path));
        }
        Ok(self
            .children(path)
            .into_iter()
            .map(|(path, node)| DirEntryInfo {
                path,
                kind: match node {
                    Node::Dir => EntryKind::Directory,
                    Node::File(_) => EntryKind::File,
                },
            })
            .collect())
    }

    fn same_contents(&self, a: &Path, b: &Path) -> io::Result<bool> {
        Ok(self.contents(a)? == self.contents(b)?)
    }

    fn move_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        if self.failing_moves.borrow().contains(from) {
            return Err(permission_denied(from));
        }
        if self.exists(to) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("destination {} already exists", to.display()),
            ));
        }
        match to.parent() {
            Some(parent) if self.is_dir(parent) => {}
            _ => return Err(not_found(to)),
        }

        let mut nodes = self.nodes.borrow_mut();
        match nodes.remove(from) {
            Some(Node::File(data)) => {
                nodes.insert(to.to_path_buf(), Node::File(data));
                Ok(())
            }
            Some(node) => {
                nodes.insert(from.to_path_buf(), node);
                Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} is not a file", from.display()),
                ))
            }
            None => Err(not_found(from)),
        }
    }

    fn remove_dir_if_empty(&self, path: &Path) -> io::Result<bool> {
        if self.locked_dirs.borrow().contains(path) {
            return Err(permission_denied(path));
        }
        if !self.is_dir(path) {
            return Err(not_found(path));
        }
        if !self.children(path).is_empty() {
            return Ok(false);
        }
        self.nodes.borrow_mut().remove(path);
        Ok(true)
    }
}
