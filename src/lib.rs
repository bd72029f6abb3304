//! homesort - put misplaced files in your home folders back where they belong
//!
//! This library classifies files by extension into category folders under a
//! home directory (Pictures, Documents, Music, ...), moves misplaced files there
//! without overwriting anything, and removes the folders the moves leave empty.
//! Filesystem access goes through the [`fs_ops::FileSystem`] trait so the whole
//! pipeline also runs against the in-memory [`fs_ops::MemoryFs`].

pub mod cleaner;
pub mod cli;
pub mod config;
pub mod conflict;
pub mod events;
pub mod file_category;
pub mod file_organizer;
pub mod fs_ops;
pub mod output;

pub use cleaner::{DirectoryCleaner, ProtectedPaths};
pub use config::{CategoryConfig, ConfigError};
pub use conflict::ConflictResolver;
pub use events::{OrganizeEvent, RunStats, SkipReason};
pub use file_category::{Category, CategoryMapper};
pub use file_organizer::{FileOrganizer, OrganizeError, OrganizerSettings};

pub use cli::{Cli, run_cli};

use tracing_subscriber::EnvFilter;

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise only warnings are shown, or every
/// decision with `verbose`. Calling it twice is harmless.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
