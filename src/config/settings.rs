use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::core::lock::LockOptions;
use crate::error::{Result, SwitchError, ErrorContext};

/// Main npmrc-switch configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwitchConfig {
    #[serde(default)]
    pub paths: PathSettings,
    #[serde(default)]
    pub lock: LockSettings,
    #[serde(default)]
    pub ui: UiSettings,
}

/// Where the active configuration and the snapshots live
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathSettings {
    /// Active configuration file (defaults to ~/.npmrc)
    pub npmrc: Option<PathBuf>,
    /// Snapshot directory (defaults to ~/.npmrc-switch)
    pub directory: Option<PathBuf>,
}

/// Polling behaviour of the lock token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockSettings {
    pub poll_interval_ms: u64,
    /// Attempts before the "still waiting" notice
    pub warn_after: u32,
    /// Attempts before giving up
    pub max_attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    pub colored: bool,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 200,
            warn_after: 10,
            max_attempts: 20,
        }
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self { colored: true }
    }
}

impl SwitchConfig {
    /// Load configuration from file or fall back to defaults
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        if config_path.exists() {
            let content = fs::read_to_string(config_path)
                .with_io_context(|| format!("reading config file {}", config_path.display()))?;

            toml::from_str(&content)
                .map_err(|e| SwitchError::Config {
                    message: format!("Invalid TOML: {}", e),
                    path: Some(config_path.to_path_buf()),
                })
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, config_path: P) -> Result<()> {
        let config_path = config_path.as_ref();

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_io_context(|| format!("creating config directory {}", parent.display()))?;
        }

        fs::write(config_path, self.to_toml()?)
            .with_io_context(|| format!("writing config file {}", config_path.display()))?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| SwitchError::Config {
                message: format!("Failed to serialize config: {}", e),
                path: None,
            })
    }

    /// Apply command line overrides on top of the file values
    pub fn with_overrides(mut self, npmrc: Option<PathBuf>, directory: Option<PathBuf>) -> Self {
        if npmrc.is_some() {
            self.paths.npmrc = npmrc;
        }
        if directory.is_some() {
            self.paths.directory = directory;
        }
        self
    }

    /// Active configuration path (either configured or ~/.npmrc)
    pub fn npmrc_path(&self) -> Result<PathBuf> {
        match &self.paths.npmrc {
            Some(path) => Ok(path.clone()),
            None => Ok(home_dir()?.join(".npmrc")),
        }
    }

    /// Snapshot directory (either configured or ~/.npmrc-switch)
    pub fn directory_path(&self) -> Result<PathBuf> {
        match &self.paths.directory {
            Some(path) => Ok(path.clone()),
            None => Ok(home_dir()?.join(".npmrc-switch")),
        }
    }

    /// Lock options for the current process
    pub fn lock_options(&self) -> LockOptions {
        LockOptions {
            poll_interval: Duration::from_millis(self.lock.poll_interval_ms),
            warn_after: self.lock.warn_after,
            max_attempts: self.lock.max_attempts,
            ..LockOptions::default()
        }
    }

    /// Default settings file path (~/.npmrc-switch.toml)
    pub fn default_path() -> Result<PathBuf> {
        Ok(home_dir()?.join(".npmrc-switch.toml"))
    }
}

fn home_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| SwitchError::Config {
            message: "HOME environment variable not set".to_string(),
            path: None,
        })?;
    Ok(PathBuf::from(home))
}
