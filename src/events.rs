//! Status events and run counters.
//!
//! The organizer reports every decision it takes as an [`OrganizeEvent`]
//! through a caller-supplied callback, so any front end can render them.

use serde::Serialize;
use std::path::PathBuf;

/// Why a file was left where it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// The file already sits under its category folder.
    AlreadyInPlace { category: String },
    /// A byte-identical file already exists at the destination.
    IdenticalDuplicate { existing: PathBuf },
}

/// Everything the organizer reports while running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OrganizeEvent {
    /// A target directory is about to be cleaned.
    TargetStarted { path: PathBuf },
    /// A target directory does not exist and was skipped.
    TargetMissing { path: PathBuf },
    Moved {
        from: PathBuf,
        to: PathBuf,
        category: String,
    },
    Skipped { path: PathBuf, reason: SkipReason },
    FolderRemoved { path: PathBuf },
    /// A recoverable error; the run continues.
    Failed { path: PathBuf, message: String },
}

/// Counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub moved: usize,
    pub skipped: usize,
    pub folders_removed: usize,
    pub failed: usize,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts an event that carries an outcome. Informational events are ignored.
    pub fn record(&mut self, event: &OrganizeEvent) {
        match event {
            OrganizeEvent::Moved { .. } => self.moved += 1,
            OrganizeEvent::Skipped { .. } => self.skipped += 1,
            OrganizeEvent::FolderRemoved { .. } => self.folders_removed += 1,
            OrganizeEvent::Failed { .. } => self.failed += 1,
            OrganizeEvent::TargetStarted { .. } | OrganizeEvent::TargetMissing { .. } => {}
        }
    }

    /// Whether every file and folder was handled without error.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}
