//! Run orchestration: category folders, target directories, counters.
//!
//! A [`FileOrganizer`] is built from explicit [`OrganizerSettings`] (home
//! directory, category mapping, target list) and a [`FileSystem`]. Running it
//! creates the category folders under the home directory and then cleans each
//! existing target in order, accumulating one [`RunStats`].

use crate::cleaner::{DirectoryCleaner, ProtectedPaths};
use crate::events::{OrganizeEvent, RunStats};
use crate::file_category::CategoryMapper;
use crate::fs_ops::{FileSystem, RealFs};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Home subdirectories scanned by default, in order.
pub const DEFAULT_TARGETS: [&str; 6] = [
    "Desktop",
    "Downloads",
    "Documents",
    "Pictures",
    "Music",
    "Videos",
];

/// Errors that stop a run.
///
/// Problems with single files or nested folders are not errors; they are
/// reported as [`OrganizeEvent::Failed`] and counted in [`RunStats::failed`].
#[derive(Error, Debug)]
pub enum OrganizeError {
    /// The home directory could not be determined.
    #[error("Cannot determine the home directory")]
    HomeNotFound,

    /// The home directory does not exist or is not a directory.
    #[error("Home directory {} is not accessible", .path.display())]
    HomeInaccessible { path: PathBuf },

    /// A category folder could not be created.
    #[error("Failed to create directory {}: {source}", .path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A target directory exists but cannot be listed.
    #[error("Failed to read directory {}: {source}", .path.display())]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for organization runs.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Everything a run needs to know, passed in at construction.
#[derive(Debug, Clone)]
pub struct OrganizerSettings {
    /// Directory holding the category folders.
    pub home: PathBuf,
    /// Directories to clean, in order.
    pub targets: Vec<PathBuf>,
    pub categories: CategoryMapper,
}

impl OrganizerSettings {
    /// Settings scanning [`DEFAULT_TARGETS`] under `home`.
    pub fn for_home(home: impl Into<PathBuf>, categories: CategoryMapper) -> Self {
        let home = home.into();
        let targets = DEFAULT_TARGETS.iter().map(|name| home.join(name)).collect();
        Self {
            home,
            targets,
            categories,
        }
    }

    /// Settings for the current user's home directory.
    pub fn for_current_user(categories: CategoryMapper) -> OrganizeResult<Self> {
        let home = dirs::home_dir().ok_or(OrganizeError::HomeNotFound)?;
        Ok(Self::for_home(home, categories))
    }

    /// Replaces the target list.
    pub fn with_targets<I, P>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.targets = targets.into_iter().map(Into::into).collect();
        self
    }

    /// Path of a category folder.
    pub fn category_root(&self, category: &str) -> PathBuf {
        self.home.join(category)
    }
}

/// Organizes the configured target directories into category folders.
pub struct FileOrganizer<F: FileSystem = RealFs> {
    settings: OrganizerSettings,
    fs: F,
    protected: ProtectedPaths,
}

impl FileOrganizer<RealFs> {
    /// An organizer working on the real filesystem.
    pub fn new(settings: OrganizerSettings) -> Self {
        Self::with_fs(settings, RealFs)
    }
}

impl<F: FileSystem> FileOrganizer<F> {
    /// An organizer working on the given filesystem.
    ///
    /// The home directory, every category folder and every target directory
    /// are protected from deletion.
    pub fn with_fs(settings: OrganizerSettings, fs: F) -> Self {
        let protected = ProtectedPaths::new(
            std::iter::once(settings.home.clone())
                .chain(
                    settings
                        .categories
                        .names()
                        .map(|name| settings.category_root(name)),
                )
                .chain(settings.targets.iter().cloned()),
        );

        Self {
            settings,
            fs,
            protected,
        }
    }

    pub fn settings(&self) -> &OrganizerSettings {
        &self.settings
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// Creates every missing category folder under the home directory.
    pub fn ensure_category_dirs(&self) -> OrganizeResult<()> {
        if !self.fs.is_dir(&self.settings.home) {
            return Err(OrganizeError::HomeInaccessible {
                path: self.settings.home.clone(),
            });
        }

        for name in self.settings.categories.names() {
            let root = self.settings.category_root(name);
            self.fs
                .create_dir_all(&root)
                .map_err(|e| OrganizeError::DirectoryCreationFailed {
                    path: root.clone(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Runs the organizer without reporting events.
    pub fn run(&self) -> OrganizeResult<RunStats> {
        self.run_with_events(|_| {})
    }

    /// Runs the organizer, passing every event to `on_event`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use homesort::{CategoryMapper, FileOrganizer, OrganizerSettings};
    ///
    /// let settings = OrganizerSettings::for_home("/home/me", CategoryMapper::default());
    /// let stats = FileOrganizer::new(settings)
    ///     .run_with_events(|event| println!("{:?}", event))
    ///     .expect("run failed");
    /// println!("{} moved", stats.moved);
    /// ```
    pub fn run_with_events<E>(&self, mut on_event: E) -> OrganizeResult<RunStats>
    where
        E: FnMut(OrganizeEvent),
    {
        self.ensure_category_dirs()?;

        let cleaner = DirectoryCleaner::new(
            &self.fs,
            &self.settings.home,
            &self.settings.categories,
            &self.protected,
        );
        let mut stats = RunStats::new();

        for target in &self.settings.targets {
            if !self.fs.is_dir(target) {
                debug!(target = %target.display(), "target missing, skipped");
                on_event(OrganizeEvent::TargetMissing {
                    path: target.clone(),
                });
                continue;
            }

            info!(target = %target.display(), "cleaning");
            on_event(OrganizeEvent::TargetStarted {
                path: target.clone(),
            });
            cleaner.clean(target, &mut stats, &mut on_event)?;
        }

        info!(
            moved = stats.moved,
            skipped = stats.skipped,
            folders_removed = stats.folders_removed,
            failed = stats.failed,
            "run finished"
        );
        Ok(stats)
    }

    /// Whether `path` is one of the directories never deleted.
    pub fn is_protected(&self, path: &Path) -> bool {
        self.protected.contains(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_ops::MemoryFs;

    fn organizer(fs: MemoryFs) -> FileOrganizer<MemoryFs> {
        let settings = OrganizerSettings::for_home("/home/user", CategoryMapper::default());
        FileOrganizer::with_fs(settings, fs)
    }

    #[test]
    fn test_for_home_default_targets() {
        let settings = OrganizerSettings::for_home("/home/user", CategoryMapper::default());
        assert_eq!(settings.targets.len(), 6);
        assert_eq!(settings.targets[0], PathBuf::from("/home/user/Desktop"));
        assert_eq!(settings.targets[5], PathBuf::from("/home/user/Videos"));
    }

    #[test]
    fn test_run_creates_category_dirs() {
        let fs = MemoryFs::new();
        fs.add_dir("/home/user");
        let organizer = organizer(fs);

        let stats = organizer.run().expect("run should succeed");

        assert_eq!(stats, RunStats::default());
        for name in ["Pictures", "Documents", "Music", "Videos", "Archives", "Scripts", "Others"] {
            assert!(organizer.fs().is_dir(&Path::new("/home/user").join(name)));
        }
    }

    #[test]
    fn test_missing_home_is_fatal() {
        let organizer = organizer(MemoryFs::new());
        assert!(matches!(
            organizer.run(),
            Err(OrganizeError::HomeInaccessible { .. })
        ));
    }

    #[test]
    fn test_missing_targets_are_skipped() {
        let fs = MemoryFs::new();
        fs.add_file("/home/user/Downloads/a.zip", b"zip");
        let organizer = organizer(fs);

        let mut missing = 0;
        let stats = organizer
            .run_with_events(|event| {
                if matches!(event, OrganizeEvent::TargetMissing { .. }) {
                    missing += 1;
                }
            })
            .expect("run should succeed");

        // Desktop is absent; the category roots were created before scanning.
        assert_eq!(missing, 1);
        assert_eq!(stats.moved, 1);
        assert!(organizer.fs().exists(Path::new("/home/user/Archives/a.zip")));
    }

    #[test]
    fn test_custom_targets() {
        let fs = MemoryFs::new();
        fs.add_file("/home/user/Inbox/a.png", b"a");
        fs.add_file("/home/user/Desktop/b.png", b"b");
        let settings = OrganizerSettings::for_home("/home/user", CategoryMapper::default())
            .with_targets(["/home/user/Inbox"]);
        let organizer = FileOrganizer::with_fs(settings, fs);

        let stats = organizer.run().expect("run should succeed");

        assert_eq!(stats.moved, 1);
        assert_eq!(organizer.settings().targets.len(), 1);
        assert!(organizer.is_protected(Path::new("/home/user/Inbox")));
        assert!(organizer.fs().exists(Path::new("/home/user/Desktop/b.png")));
    }

    #[test]
    fn test_protected_paths() {
        let organizer = organizer(MemoryFs::new());
        assert!(organizer.is_protected(Path::new("/home/user")));
        assert!(organizer.is_protected(Path::new("/home/user/Scripts")));
        assert!(organizer.is_protected(Path::new("/home/user/Downloads")));
        assert!(!organizer.is_protected(Path::new("/home/user/Downloads/tmp")));
    }

    #[test]
    fn test_counters_accumulate_across_targets() {
        let fs = MemoryFs::new();
        fs.add_file("/home/user/Desktop/a.png", b"a");
        fs.add_file("/home/user/Downloads/b.png", b"b");
        fs.add_file("/home/user/Pictures/c.png", b"c");
        let organizer = organizer(fs);

        let stats = organizer.run().expect("run should succeed");

        assert_eq!(stats.moved, 2);
        // a.png and b.png are seen again under Pictures, plus c.png
        assert_eq!(stats.skipped, 3);
    }
}
