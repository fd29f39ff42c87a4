//! Locating and loading the configuration file.
//!
//! Kept apart from `config.rs` so the configuration types stay free of
//! filesystem and directory lookups.

use crate::config::{Config, ConfigError};
use std::path::{Path, PathBuf};

impl Config {
    pub const FILENAME: &'static str = "config.json";

    /// Load `path`, falling back to defaults when it is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load_from_file(path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load the user's config from the directory context
    pub fn load_for_user(dir_context: &DirectoryContext) -> Self {
        Self::load_or_default(&dir_context.config_path())
    }

    /// Write the config into the directory context, creating it if needed
    pub fn save_for_user(&self, dir_context: &DirectoryContext) -> Result<PathBuf, ConfigError> {
        std::fs::create_dir_all(&dir_context.config_dir)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", dir_context.config_dir.display(), e)))?;
        let path = dir_context.config_path();
        self.save_to_file(&path)?;
        Ok(path)
    }
}

/// Directories the application reads from and writes to.
///
/// Passed explicitly so tests can point everything at a temp directory.
#[derive(Debug, Clone)]
pub struct DirectoryContext {
    /// e.g. ~/.config/ember on Linux
    pub config_dir: PathBuf,

    /// Where the log file goes unless overridden
    pub log_dir: PathBuf,
}

impl DirectoryContext {
    /// Create a DirectoryContext from the system directories.
    /// This should only be called from main()
    pub fn from_system() -> std::io::Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Could not determine config directory",
                )
            })?
            .join("ember");

        Ok(Self {
            config_dir,
            log_dir: std::env::temp_dir(),
        })
    }

    /// Create a DirectoryContext for testing with a temp directory
    pub fn for_testing(temp_dir: &Path) -> Self {
        Self {
            config_dir: temp_dir.join("config"),
            log_dir: temp_dir.join("logs"),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(Config::FILENAME)
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_dir.join("ember.log")
    }
}
