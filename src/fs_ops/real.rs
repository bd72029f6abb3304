//! [`FileSystem`] backed by `std::fs`.

use super::{DirEntryInfo, EntryKind, FileSystem};
use std::fs::{self, File, Metadata, OpenOptions};
use std::io::{self, BufReader, Read};
use std::path::Path;
use tracing::debug;

const COMPARE_CHUNK: usize = 64 * 1024;

/// The real disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl RealFs {
    /// Copies `from` to `to`, checks the size, then deletes `from`.
    fn copy_then_delete(from: &Path, to: &Path) -> io::Result<()> {
        Self::relocate_by_copy(from, to, |p| fs::remove_file(p))
    }

    /// Copy-based move with a pluggable source deletion.
    ///
    /// `to` is created exclusively, so an existing file is never replaced. Once
    /// created it is removed again on any later failure, including a failure to
    /// delete the source, which leaves the file only at `from`.
    fn relocate_by_copy<D>(from: &Path, to: &Path, delete_source: D) -> io::Result<()>
    where
        D: FnOnce(&Path) -> io::Result<()>,
    {
        let mut source = File::open(from)?;
        let metadata = source.metadata()?;
        let dest = OpenOptions::new().write(true).create_new(true).open(to)?;

        let result = Self::fill_copy(&mut source, dest, &metadata, to)
            .and_then(|()| delete_source(from));
        if result.is_err() {
            let _ = fs::remove_file(to);
        }
        result
    }

    fn fill_copy(
        source: &mut File,
        mut dest: File,
        metadata: &Metadata,
        to: &Path,
    ) -> io::Result<()> {
        io::copy(source, &mut dest)?;
        dest.sync_all()?;
        drop(dest);

        let dest_size = fs::metadata(to)?.len();
        if dest_size != metadata.len() {
            return Err(io::Error::other(format!(
                "copy verification failed: source {} bytes, destination {} bytes",
                metadata.len(),
                dest_size
            )));
        }
        fs::set_permissions(to, metadata.permissions())
    }

    /// Rename guarded by an existence check, for filesystems without hard links.
    fn rename_if_free(&self, from: &Path, to: &Path) -> io::Result<()> {
        if self.exists(to) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("destination {} already exists", to.display()),
            ));
        }
        match fs::rename(from, to) {
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                Self::copy_then_delete(from, to)
            }
            other => other,
        }
    }
}

/// Classifies a directory entry; one whose type cannot be read is left alone.
fn entry_kind(file_type: io::Result<fs::FileType>, path: &Path) -> EntryKind {
    match file_type {
        Ok(t) if t.is_dir() => EntryKind::Directory,
        Ok(t) if t.is_file() => EntryKind::File,
        Ok(_) => EntryKind::Other,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "cannot read entry type, leaving it");
            EntryKind::Other
        }
    }
}

impl FileSystem for RealFs {
    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let path = entry.path();
            let kind = entry_kind(entry.file_type(), &path);
            entries.push(DirEntryInfo { path, kind });
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn same_contents(&self, a: &Path, b: &Path) -> io::Result<bool> {
        let file_a = File::open(a)?;
        let file_b = File::open(b)?;

        if file_a.metadata()?.len() != file_b.metadata()?.len() {
            return Ok(false);
        }

        let mut reader_a = BufReader::new(file_a);
        let mut reader_b = BufReader::new(file_b);
        let mut buf_a = vec![0u8; COMPARE_CHUNK];
        let mut buf_b = vec![0u8; COMPARE_CHUNK];

        loop {
            let read = reader_a.read(&mut buf_a)?;
            if read == 0 {
                // Sizes matched, so b must be exhausted too.
                let mut probe = [0u8; 1];
                return Ok(reader_b.read(&mut probe)? == 0);
            }
            reader_b.read_exact(&mut buf_b[..read])?;
            if buf_a[..read] != buf_b[..read] {
                return Ok(false);
            }
        }
    }

    fn move_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        // link fails on an existing destination, unlike rename
        match fs::hard_link(from, to) {
            Ok(()) => {
                if let Err(e) = fs::remove_file(from) {
                    let _ = fs::remove_file(to);
                    return Err(e);
                }
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(e),
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                debug!(from = %from.display(), to = %to.display(), "link crosses devices, copying");
                Self::copy_then_delete(from, to)
            }
            Err(e) => {
                debug!(from = %from.display(), error = %e, "hard link refused, renaming");
                self.rename_if_free(from, to)
            }
        }
    }

    fn remove_dir_if_empty(&self, path: &Path) -> io::Result<bool> {
        match fs::remove_dir(path) {
            Ok(()) => Ok(true),
            Err(e) => {
                if fs::read_dir(path)?.next().is_some() {
                    Ok(false)
                } else {
                    Err(e)
                }
            }
        }
    }
}
