//! Configuration file management.
//!
//! Handles locating, reading and validating `.vault2vault.toml`. Every field
//! is optional; command-line flags override whatever is set here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::constants;
use crate::core::fs::{BackupCollision, BackupPolicy};
use crate::error::{ConfigError, Result};

/// Settings read from a configuration file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub backup: BackupConfig,
    pub walk: WalkConfig,
    pub run: RunConfig,
}

/// `[backup]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackupConfig {
    /// Write a backup before modifying a file
    pub enabled: bool,
    /// Appended to the file name
    pub suffix: String,
    pub collision: BackupCollision,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            suffix: constants::BACKUP_SUFFIX.to_string(),
            collision: BackupCollision::default(),
        }
    }
}

impl BackupConfig {
    pub fn policy(&self) -> BackupPolicy {
        BackupPolicy {
            suffix: self.suffix.clone(),
            collision: self.collision,
        }
    }
}

/// `[walk]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WalkConfig {
    pub follow_symlinks: bool,
    /// Directory names never descended into
    pub skip_dirs: Vec<String>,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: true,
            skip_dirs: Vec::new(),
        }
    }
}

/// `[run]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub jobs: usize,
    pub fail_fast: bool,
    pub ignore_undecryptable: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            jobs: 1,
            fail_fast: false,
            ignore_undecryptable: false,
        }
    }
}

impl Config {
    /// Load configuration, falling back to defaults when no file is found.
    ///
    /// Lookup order: `explicit`, then `.vault2vault.toml` in the working
    /// directory, then `vault2vault/config.toml` in the user config dir.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if `explicit` does not exist,
    /// `ConfigError::Parse` if the TOML is malformed, or
    /// `ConfigError::InvalidValue` if validation fails.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        match locate(explicit, &cwd, dirs::config_dir())? {
            Some(path) => Self::from_path(&path),
            None => {
                debug!("no config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Read and validate a specific configuration file.
    pub fn from_path(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");

        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config = Self::parse(&contents)?;

        debug!(
            backup = config.backup.enabled,
            jobs = config.run.jobs,
            "config loaded"
        );
        Ok(config)
    }

    /// Parse and validate configuration text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration contents
    ///
    /// Checks:
    /// - `jobs` is at least 1
    /// - the backup suffix is non-empty and a plain file name fragment
    /// - skipped directory names contain no path separators
    pub fn validate(&self) -> Result<()> {
        if self.run.jobs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "run.jobs",
                reason: "must be at least 1".to_string(),
            }
            .into());
        }

        validate_suffix(&self.backup.suffix)?;

        for dir in &self.walk.skip_dirs {
            if dir.is_empty() || dir.contains(['/', '\\']) {
                return Err(ConfigError::InvalidValue {
                    field: "walk.skip_dirs",
                    reason: format!("'{}' is not a directory name", dir),
                }
                .into());
            }
        }

        Ok(())
    }
}

/// Check that a backup suffix can be appended to a file name.
pub fn validate_suffix(suffix: &str) -> Result<()> {
    if suffix.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "backup.suffix",
            reason: "must not be empty".to_string(),
        }
        .into());
    }
    if suffix.contains(['/', '\\']) {
        return Err(ConfigError::InvalidValue {
            field: "backup.suffix",
            reason: format!("'{}' contains a path separator", suffix),
        }
        .into());
    }
    Ok(())
}

fn locate(
    explicit: Option<&Path>,
    cwd: &Path,
    config_dir: Option<PathBuf>,
) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()).into());
        }
        return Ok(Some(path.to_path_buf()));
    }

    let local = cwd.join(constants::CONFIG_FILE);
    if local.is_file() {
        return Ok(Some(local));
    }

    let global = config_dir
        .map(|dir| dir.join(constants::CONFIG_DIR).join(constants::GLOBAL_CONFIG_FILE))
        .filter(|path| path.is_file());
    Ok(global)
}
