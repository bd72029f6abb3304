//! Command-line interface module for homesort.
//!
//! Running without arguments organizes the current user's home folders with
//! the category mapping found on disk (or the built-in one). The flags only
//! override where things come from and how the result is shown.

use crate::config::CategoryConfig;
use crate::events::{OrganizeEvent, RunStats};
use crate::file_organizer::{FileOrganizer, OrganizeResult, OrganizerSettings};
use crate::output::OutputFormatter;
use clap::Parser;
use indicatif::ProgressBar;
use std::path::PathBuf;
use tracing::warn;

/// Sort misplaced files in your home folders into category directories.
#[derive(Parser, Debug, Default)]
#[command(name = "homesort", version, about)]
pub struct Cli {
    /// Category mapping file (JSON object of category -> extensions)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Organize this directory instead of the current user's home
    #[arg(long, value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Print the final counters as JSON instead of the console report
    #[arg(long)]
    pub json: bool,

    /// Log every decision (same as RUST_LOG=info)
    #[arg(short, long)]
    pub verbose: bool,
}

/// Runs a full organization pass as described by `cli`.
///
/// A configuration problem never aborts the run: the built-in mapping is used
/// instead and a warning is shown.
///
/// # Examples
///
/// ```no_run
/// use homesort::cli::{Cli, run_cli};
///
/// match run_cli(&Cli::default()) {
///     Ok(stats) => println!("{} files moved", stats.moved),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(cli: &Cli) -> OrganizeResult<RunStats> {
    let config = load_config(cli);

    let mapper = config.mapper();
    let settings = match &cli.home {
        Some(home) => OrganizerSettings::for_home(home.clone(), mapper),
        None => OrganizerSettings::for_current_user(mapper)?,
    };
    let home = settings.home.clone();

    if !cli.json {
        match &config.source {
            Some(path) => OutputFormatter::info(&format!("Using categories from {}", path.display())),
            None => OutputFormatter::info("Using built-in categories"),
        }
    }

    let organizer = FileOrganizer::new(settings);

    let stats = if cli.json {
        organizer.run()?
    } else {
        let mut spinner: Option<ProgressBar> = None;
        let result = organizer.run_with_events(|event| {
            if let OrganizeEvent::TargetStarted { path } = &event {
                if let Some(pb) = spinner.take() {
                    pb.finish_and_clear();
                }
                OutputFormatter::event(&event, &home);
                spinner = Some(OutputFormatter::create_spinner(&format!(
                    "Scanning {}",
                    path.display()
                )));
                return;
            }
            match &spinner {
                Some(pb) => pb.suspend(|| OutputFormatter::event(&event, &home)),
                None => OutputFormatter::event(&event, &home),
            }
        });
        if let Some(pb) = spinner.take() {
            pb.finish_and_clear();
        }
        result?
    };

    if cli.json {
        match serde_json::to_string_pretty(&stats) {
            Ok(json) => println!("{}", json),
            Err(e) => OutputFormatter::error(&format!("Cannot serialize summary: {}", e)),
        }
    } else {
        OutputFormatter::summary_table(&stats);
        if stats.is_clean() {
            OutputFormatter::success("Done.");
        } else {
            OutputFormatter::warning("Some items could not be organized. Please review errors above.");
        }
    }

    Ok(stats)
}

/// Loads the category mapping, reporting a rejected one exactly once.
///
/// The console gets the warning; in JSON mode stdout stays machine-readable and
/// the warning goes to the log instead.
fn load_config(cli: &Cli) -> CategoryConfig {
    CategoryConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        if cli.json {
            warn!(error = %e, "configuration rejected, using built-in categories");
        } else {
            OutputFormatter::warning(&format!("{}; using built-in categories", e));
        }
        CategoryConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};
    use tempfile::{NamedTempFile, TempDir};

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Runs `f` and returns everything logged at warn level or above.
    fn captured_warnings(f: impl FnOnce()) -> String {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    fn cli_with_broken_config(json: bool) -> (Cli, TempDir, NamedTempFile) {
        let home = TempDir::new().expect("Failed to create temp directory");
        let mut config = NamedTempFile::new().unwrap();
        write!(config, "[1, 2, 3]").unwrap();
        let cli = Cli {
            config: Some(config.path().to_path_buf()),
            home: Some(home.path().to_path_buf()),
            json,
            verbose: false,
        };
        (cli, home, config)
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_is_a_full_run() {
        let cli = Cli::try_parse_from(["homesort"]).unwrap();
        assert!(cli.config.is_none());
        assert!(cli.home.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn test_parse_overrides() {
        let cli = Cli::try_parse_from([
            "homesort",
            "--config",
            "/tmp/folders.json",
            "--home",
            "/tmp/home",
            "--json",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/folders.json")));
        assert_eq!(cli.home, Some(PathBuf::from("/tmp/home")));
        assert!(cli.json);
        assert!(cli.verbose);
    }

    #[test]
    fn test_rejected_config_is_not_logged_on_console_runs() {
        let (cli, _home, _config) = cli_with_broken_config(false);

        let logs = captured_warnings(|| {
            let stats = run_cli(&cli).expect("run should succeed");
            assert!(stats.is_clean());
        });

        assert!(logs.is_empty(), "unexpected log output: {}", logs);
    }

    #[test]
    fn test_rejected_config_is_logged_once_on_json_runs() {
        let (cli, _home, _config) = cli_with_broken_config(true);

        let logs = captured_warnings(|| {
            run_cli(&cli).expect("run should succeed");
        });

        assert_eq!(logs.matches("configuration rejected").count(), 1);
    }
}
