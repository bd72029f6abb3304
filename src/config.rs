//! Category mapping configuration.
//!
//! The mapping is a JSON object from category name to a list of extensions.
//! Key order matters: when two categories list the same extension the first
//! one wins, and the first category with an empty list is the catch-all.
//!
//! ```json
//! {
//!     "Pictures": [".jpg", ".jpeg", ".png", ".gif"],
//!     "Documents": [".pdf", ".txt"],
//!     "Others": []
//! }
//! ```
//!
//! Extensions are case-insensitive and the leading dot is optional.

use crate::file_category::{Category, CategoryMapper, default_categories};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// File name looked up beside the executable and in the config directory.
pub const CONFIG_FILE_NAME: &str = "folders.json";

/// Errors that can occur while loading a category mapping.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// The file is not valid JSON or not an object of string lists.
    #[error("Invalid configuration in {}: {reason}", .path.display())]
    ConfigInvalid { path: PathBuf, reason: String },

    /// A category name cannot be used as a folder name.
    #[error("Invalid category name '{0}': must be a single folder name")]
    InvalidCategoryName(String),

    /// The mapping declares no categories at all.
    #[error("Configuration declares no categories")]
    Empty,

    /// IO error while reading configuration.
    #[error("IO error reading configuration {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A loaded category mapping and where it came from.
#[derive(Debug, Clone)]
pub struct CategoryConfig {
    pub categories: Vec<Category>,
    /// The file the mapping was read from, `None` for the built-in default.
    pub source: Option<PathBuf>,
}

impl CategoryConfig {
    /// Load the mapping, with fallback to the built-in default.
    ///
    /// Looks in this order:
    /// 1. `config_path`, if provided
    /// 2. [`CONFIG_FILE_NAME`] beside the running executable
    /// 3. `<config dir>/homesort/folders.json`
    /// 4. The built-in default
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen file cannot be read or is invalid, or if
    /// `config_path` is given and does not exist.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        for candidate in Self::search_paths() {
            if candidate.is_file() {
                return Self::load_from_file(&candidate);
            }
        }

        debug!("no configuration file found, using built-in categories");
        Ok(Self::default())
    }

    /// Candidate configuration files, most specific first.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(exe) = std::env::current_exe()
            && let Some(dir) = exe.parent()
        {
            paths.push(dir.join(CONFIG_FILE_NAME));
        }
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("homesort").join(CONFIG_FILE_NAME));
        }
        paths
    }

    /// Load the mapping from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let categories = parse_categories(&content, path)?;

        debug!(path = %path.display(), categories = categories.len(), "loaded configuration");
        Ok(Self {
            categories,
            source: Some(path.to_path_buf()),
        })
    }

    /// Parse a mapping from JSON text.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let categories = parse_categories(content, Path::new("<inline>"))?;
        Ok(Self {
            categories,
            source: None,
        })
    }

    /// Build the resolver for this mapping.
    pub fn mapper(&self) -> CategoryMapper {
        CategoryMapper::new(self.categories.clone())
    }
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            source: None,
        }
    }
}

fn parse_categories(content: &str, origin: &Path) -> Result<Vec<Category>, ConfigError> {
    let invalid = |reason: String| ConfigError::ConfigInvalid {
        path: origin.to_path_buf(),
        reason,
    };

    let map: Map<String, Value> = serde_json::from_str(content).map_err(|e| invalid(e.to_string()))?;

    if map.is_empty() {
        return Err(ConfigError::Empty);
    }

    map.into_iter()
        .map(|(name, extensions)| {
            validate_name(&name)?;
            let extensions: Vec<String> = serde_json::from_value(extensions)
                .map_err(|e| invalid(format!("category '{}': {}", name, e)))?;
            Ok(Category::new(name, extensions))
        })
        .collect()
}

/// A category name becomes `home/<name>`, so it must be one normal component.
fn validate_name(name: &str) -> Result<(), ConfigError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Ok(()),
        _ => Err(ConfigError::InvalidCategoryName(name.to_string())),
    }
}
