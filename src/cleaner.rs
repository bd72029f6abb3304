//! Bottom-up cleanup of a single target directory.
//!
//! Every subdirectory is processed before its parent: its files are moved
//! to their category folders and it is deleted if that left it empty, so the
//! parent sees the result when its own turn comes.

use crate::conflict::{ConflictResolver, Resolution};
use crate::events::{OrganizeEvent, RunStats, SkipReason};
use crate::file_category::CategoryMapper;
use crate::file_organizer::{OrganizeError, OrganizeResult};
use crate::fs_ops::{DirEntryInfo, EntryKind, FileSystem};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Directories that are never deleted, even when empty.
#[derive(Debug, Clone, Default)]
pub struct ProtectedPaths {
    paths: HashSet<PathBuf>,
}

impl ProtectedPaths {
    pub fn new<I: IntoIterator<Item = PathBuf>>(paths: I) -> Self {
        Self {
            paths: paths.into_iter().collect(),
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }
}

/// Moves misplaced files out of a directory tree and prunes empty folders.
pub struct DirectoryCleaner<'a, F: FileSystem> {
    fs: &'a F,
    home: &'a Path,
    mapper: &'a CategoryMapper,
    protected: &'a ProtectedPaths,
}

impl<'a, F: FileSystem> DirectoryCleaner<'a, F> {
    pub fn new(
        fs: &'a F,
        home: &'a Path,
        mapper: &'a CategoryMapper,
        protected: &'a ProtectedPaths,
    ) -> Self {
        Self {
            fs,
            home,
            mapper,
            protected,
        }
    }

    /// Cleans `target`, updating `stats` and reporting each step to `on_event`.
    ///
    /// Per-file and per-subdirectory failures are reported as
    /// [`OrganizeEvent::Failed`] and do not stop the traversal. Only failing to
    /// list `target` itself is returned as an error.
    pub fn clean<E>(
        &self,
        target: &Path,
        stats: &mut RunStats,
        on_event: &mut E,
    ) -> OrganizeResult<()>
    where
        E: FnMut(OrganizeEvent),
    {
        let entries = self
            .fs
            .list_dir(target)
            .map_err(|e| OrganizeError::ReadDirectory {
                path: target.to_path_buf(),
                source: e,
            })?;

        let mut visit = Visit { stats, on_event };
        self.process_dir(target, entries, &mut visit);
        Ok(())
    }

    fn process_dir<E>(&self, dir: &Path, entries: Vec<DirEntryInfo>, visit: &mut Visit<'_, E>)
    where
        E: FnMut(OrganizeEvent),
    {
        let (subdirs, files): (Vec<_>, Vec<_>) = entries
            .into_iter()
            .filter(|entry| entry.kind != EntryKind::Other)
            .partition(|entry| entry.kind == EntryKind::Directory);

        for subdir in subdirs {
            match self.fs.list_dir(&subdir.path) {
                Ok(children) => self.process_dir(&subdir.path, children, visit),
                Err(e) => {
                    warn!(dir = %subdir.path.display(), error = %e, "cannot read directory");
                    visit.emit(OrganizeEvent::Failed {
                        path: subdir.path,
                        message: format!("cannot read directory: {}", e),
                    });
                }
            }
        }

        for file in files {
            self.process_file(&file.path, visit);
        }

        if !self.protected.contains(dir) {
            self.remove_if_empty(dir, visit);
        }
    }

    fn process_file<E>(&self, path: &Path, visit: &mut Visit<'_, E>)
    where
        E: FnMut(OrganizeEvent),
    {
        let category = self.mapper.resolve_path(path);
        let category_root = self.home.join(category);

        if path.starts_with(&category_root) {
            debug!(file = %path.display(), category, "already in place");
            visit.emit(OrganizeEvent::Skipped {
                path: path.to_path_buf(),
                reason: SkipReason::AlreadyInPlace {
                    category: category.to_string(),
                },
            });
            return;
        }

        let Some(file_name) = path.file_name() else {
            return;
        };
        let destination = category_root.join(file_name);

        match ConflictResolver::new(self.fs).resolve(&destination, path) {
            Resolution::Duplicate => {
                debug!(file = %path.display(), existing = %destination.display(), "identical copy exists");
                visit.emit(OrganizeEvent::Skipped {
                    path: path.to_path_buf(),
                    reason: SkipReason::IdenticalDuplicate {
                        existing: destination,
                    },
                });
            }
            Resolution::MoveTo(final_path) => match self.fs.move_file(path, &final_path) {
                Ok(()) => {
                    info!(from = %path.display(), to = %final_path.display(), "moved");
                    visit.emit(OrganizeEvent::Moved {
                        from: path.to_path_buf(),
                        to: final_path,
                        category: category.to_string(),
                    });
                }
                Err(e) => {
                    warn!(from = %path.display(), to = %final_path.display(), error = %e, "move failed");
                    visit.emit(OrganizeEvent::Failed {
                        path: path.to_path_buf(),
                        message: format!("cannot move to {}: {}", final_path.display(), e),
                    });
                }
            },
        }
    }

    fn remove_if_empty<E>(&self, dir: &Path, visit: &mut Visit<'_, E>)
    where
        E: FnMut(OrganizeEvent),
    {
        match self.fs.remove_dir_if_empty(dir) {
            Ok(true) => {
                info!(dir = %dir.display(), "removed empty folder");
                visit.emit(OrganizeEvent::FolderRemoved {
                    path: dir.to_path_buf(),
                });
            }
            Ok(false) => {}
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "cannot remove folder");
                visit.emit(OrganizeEvent::Failed {
                    path: dir.to_path_buf(),
                    message: format!("cannot remove folder: {}", e),
                });
            }
        }
    }
}

/// Counters and listener for one traversal; keeps both in step.
struct Visit<'s, E> {
    stats: &'s mut RunStats,
    on_event: &'s mut E,
}

impl<E: FnMut(OrganizeEvent)> Visit<'_, E> {
    fn emit(&mut self, event: OrganizeEvent) {
        self.stats.record(&event);
        (self.on_event)(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_ops::MemoryFs;

    const HOME: &str = "/home/user";

    fn protected_for(mapper: &CategoryMapper, targets: &[&str]) -> ProtectedPaths {
        let home = PathBuf::from(HOME);
        let mut paths: Vec<PathBuf> = mapper.names().map(|name| home.join(name)).collect();
        paths.extend(targets.iter().map(PathBuf::from));
        paths.push(home);
        ProtectedPaths::new(paths)
    }

    fn setup() -> (MemoryFs, CategoryMapper) {
        let fs = MemoryFs::new();
        let mapper = CategoryMapper::default();
        for name in mapper.names() {
            fs.add_dir(Path::new(HOME).join(name));
        }
        (fs, mapper)
    }

    fn clean(fs: &MemoryFs, mapper: &CategoryMapper, target: &str) -> (RunStats, Vec<OrganizeEvent>) {
        let protected = protected_for(mapper, &[target]);
        let cleaner = DirectoryCleaner::new(fs, Path::new(HOME), mapper, &protected);
        let mut stats = RunStats::new();
        let mut events = Vec::new();
        cleaner
            .clean(Path::new(target), &mut stats, &mut |e| events.push(e))
            .expect("clean should succeed");
        (stats, events)
    }

    #[test]
    fn test_nested_folder_emptied_and_removed() {
        let (fs, mapper) = setup();
        fs.add_file("/home/user/Desktop/a/b/song.mp3", b"mp3");

        let (stats, events) = clean(&fs, &mapper, "/home/user/Desktop");

        assert_eq!(stats.moved, 1);
        assert_eq!(stats.folders_removed, 2);
        assert!(fs.exists(Path::new("/home/user/Music/song.mp3")));
        assert!(!fs.exists(Path::new("/home/user/Desktop/a")));
        assert!(fs.is_dir(Path::new("/home/user/Desktop")));

        // deepest folder goes first
        let removed: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                OrganizeEvent::FolderRemoved { path } => Some(path.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            removed,
            vec![
                PathBuf::from("/home/user/Desktop/a/b"),
                PathBuf::from("/home/user/Desktop/a")
            ]
        );
    }

    #[test]
    fn test_file_under_category_subfolder_is_skipped() {
        let (fs, mapper) = setup();
        fs.add_file("/home/user/Documents/work/2024/plan.pdf", b"pdf");

        let (stats, _) = clean(&fs, &mapper, "/home/user/Documents");

        assert_eq!(stats.moved, 0);
        assert_eq!(stats.skipped, 1);
        assert!(fs.exists(Path::new("/home/user/Documents/work/2024/plan.pdf")));
    }

    #[test]
    fn test_misplaced_file_in_category_root_moves() {
        let (fs, mapper) = setup();
        fs.add_file("/home/user/Documents/holiday.jpg", b"jpg");

        let (stats, _) = clean(&fs, &mapper, "/home/user/Documents");

        assert_eq!(stats.moved, 1);
        assert!(fs.exists(Path::new("/home/user/Pictures/holiday.jpg")));
        assert!(fs.is_dir(Path::new("/home/user/Documents")));
        assert_eq!(stats.folders_removed, 0);
    }

    #[test]
    fn test_failed_move_does_not_block_siblings() {
        let (fs, mapper) = setup();
        fs.add_file("/home/user/Downloads/a.txt", b"a");
        fs.add_file("/home/user/Downloads/b.txt", b"b");
        fs.fail_moves_from("/home/user/Downloads/a.txt");

        let (stats, events) = clean(&fs, &mapper, "/home/user/Downloads");

        assert_eq!(stats.failed, 1);
        assert_eq!(stats.moved, 1);
        assert!(fs.exists(Path::new("/home/user/Downloads/a.txt")));
        assert!(fs.exists(Path::new("/home/user/Documents/b.txt")));
        assert!(events.iter().any(|e| matches!(
            e,
            OrganizeEvent::Failed { path, .. } if path == Path::new("/home/user/Downloads/a.txt")
        )));
    }

    #[test]
    fn test_unreadable_subdir_is_reported_and_skipped() {
        let (fs, mapper) = setup();
        fs.add_file("/home/user/Downloads/locked/x.txt", b"x");
        fs.add_file("/home/user/Downloads/y.txt", b"y");
        fs.lock_dir("/home/user/Downloads/locked");

        let (stats, _) = clean(&fs, &mapper, "/home/user/Downloads");

        assert_eq!(stats.moved, 1);
        assert_eq!(stats.failed, 1);
        assert!(fs.exists(Path::new("/home/user/Downloads/locked/x.txt")));
    }

    #[test]
    fn test_unreadable_target_is_an_error() {
        let (fs, mapper) = setup();
        fs.add_dir("/home/user/Desktop");
        fs.lock_dir("/home/user/Desktop");
        let protected = protected_for(&mapper, &["/home/user/Desktop"]);
        let cleaner = DirectoryCleaner::new(&fs, Path::new(HOME), &mapper, &protected);

        let result = cleaner.clean(Path::new("/home/user/Desktop"), &mut RunStats::new(), &mut |_| {});
        assert!(matches!(result, Err(OrganizeError::ReadDirectory { .. })));
    }

    #[test]
    fn test_non_empty_folder_is_kept_silently() {
        let (fs, mapper) = setup();
        fs.add_file("/home/user/Pictures/album/keep.png", b"png");
        fs.add_file("/home/user/Pictures/album/notes.txt", b"txt");

        let (stats, _) = clean(&fs, &mapper, "/home/user/Pictures");

        assert_eq!(stats.moved, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.folders_removed, 0);
        assert_eq!(stats.failed, 0);
        assert!(fs.is_dir(Path::new("/home/user/Pictures/album")));
    }
}
