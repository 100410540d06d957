//! On-disk locations of everything the tool reads and writes.

use std::path::{Path, PathBuf};

use super::ConfigError;
use super::defaults;

/// Resolved file locations, all inside one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    dir: PathBuf,
}

impl AppPaths {
    /// Uses `dir` as the application directory.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Uses the explicit directory if given, else
    /// `<user-config-dir>/ip-changed`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoConfigDir`] when no override is given and
    /// the platform has no user configuration directory.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(dir) = explicit {
            return Ok(Self::new(dir));
        }

        dirs::config_dir()
            .map(|base| Self::new(base.join(defaults::APP_DIR_NAME)))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// The application directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The last-known-IP file.
    #[must_use]
    pub fn state_file(&self) -> PathBuf {
        self.dir.join(defaults::STATE_FILE_NAME)
    }

    /// The notification configuration file.
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.dir.join(defaults::CONFIG_FILE_NAME)
    }

    /// Where the scheduled job appends its stdout.
    #[must_use]
    pub fn stdout_log(&self) -> PathBuf {
        self.dir.join(defaults::STDOUT_LOG_NAME)
    }

    /// Where the scheduled job appends its stderr.
    #[must_use]
    pub fn stderr_log(&self) -> PathBuf {
        self.dir.join(defaults::STDERR_LOG_NAME)
    }
}
