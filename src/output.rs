//! Output formatting and styling module.
//!
//! Turns [`OrganizeEvent`]s and the final [`RunStats`] into console lines.
//! Everything user-facing goes through [`OutputFormatter`], so the styling
//! can change in one place.

use crate::events::{OrganizeEvent, RunStats, SkipReason};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a spinner shown while a target directory is cleaned.
    ///
    /// Lines printed while it runs should go through
    /// [`ProgressBar::suspend`] so they do not tear the spinner.
    pub fn create_spinner(message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("Invalid spinner template"),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Prints the console line for an event.
    ///
    /// `home` is stripped from paths to keep lines short.
    pub fn event(event: &OrganizeEvent, home: &Path) {
        match event {
            OrganizeEvent::TargetStarted { path } => {
                Self::header(&format!("Cleaning {}", path.display()));
            }
            OrganizeEvent::TargetMissing { path } => {
                println!("{}", format!("Skipping {} (not found)", path.display()).dimmed());
            }
            OrganizeEvent::Moved { from, to, category } => {
                println!(
                    "{} {} → {} {}",
                    "✓".green(),
                    short(from, home),
                    short(to, home),
                    format!("[{}]", category).cyan()
                );
            }
            OrganizeEvent::Skipped { path, reason } => {
                let why = match reason {
                    SkipReason::AlreadyInPlace { category } => {
                        format!("already in {}", category)
                    }
                    SkipReason::IdenticalDuplicate { existing } => {
                        format!("identical copy at {}", short(existing, home))
                    }
                };
                println!("{} {} ({})", "•".dimmed(), short(path, home), why.dimmed());
            }
            OrganizeEvent::FolderRemoved { path } => {
                println!("{} Deleted empty folder {}", "✓".green(), short(path, home));
            }
            OrganizeEvent::Failed { path, message } => {
                Self::error(&format!("{}: {}", short(path, home), message));
            }
        }
    }

    /// Prints a summary table with the run counters.
    pub fn summary_table(stats: &RunStats) {
        Self::header("SUMMARY");

        let rows = [
            ("Moved", stats.moved, "file"),
            ("Skipped", stats.skipped, "file"),
            ("Folders removed", stats.folders_removed, "folder"),
            ("Failed", stats.failed, "item"),
        ];
        let width = rows.iter().map(|(label, _, _)| label.len()).max().unwrap_or(0);

        println!("{}", "-".repeat(width + 14));
        for (label, count, noun) in rows {
            let noun = if count == 1 {
                noun.to_string()
            } else {
                format!("{}s", noun)
            };
            let count = if label == "Failed" && count > 0 {
                count.to_string().red().bold()
            } else {
                count.to_string().green()
            };
            println!("{:<width$} | {} {}", label.bold(), count, noun, width = width);
        }
        println!("{}", "-".repeat(width + 14));
    }
}

fn short(path: &Path, home: &Path) -> String {
    match path.strip_prefix(home) {
        Ok(rel) if !rel.as_os_str().is_empty() => format!("~/{}", rel.display()),
        _ => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_strips_home() {
        let home = Path::new("/home/user");
        assert_eq!(short(Path::new("/home/user/Pictures/a.png"), home), "~/Pictures/a.png");
        assert_eq!(short(Path::new("/tmp/a.png"), home), "/tmp/a.png");
        assert_eq!(short(home, home), "/home/user");
    }
}
