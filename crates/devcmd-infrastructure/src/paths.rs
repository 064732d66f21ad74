//! Unified path management for devcmd files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/devcmd/            # Config directory
//! ├── config.toml              # Application configuration
//! ├── settings.toml            # Persisted panel settings
//! └── logs/                    # Application logs
//!     └── devcmd.log.YYYY-MM-DD
//! ```

use std::path::PathBuf;

use devcmd_core::error::{DevcmdError, Result};

const APP_DIR_NAME: &str = "devcmd";

/// Resolves every file location from one base directory.
#[derive(Debug, Clone)]
pub struct DevcmdPaths {
    base_dir: Option<PathBuf>,
}

impl DevcmdPaths {
    /// Creates a path resolver.
    ///
    /// # Arguments
    ///
    /// * `base_dir` - Overrides the platform config directory (used by tests)
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    /// Returns the devcmd configuration directory.
    pub fn config_dir(&self) -> Result<PathBuf> {
        match &self.base_dir {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or_else(|| DevcmdError::config("Cannot find config directory")),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    pub fn settings_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("settings.toml"))
    }

    pub fn log_dir(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_follow_base_dir() {
        let paths = DevcmdPaths::new(Some(PathBuf::from("/tmp/devcmd-test")));
        assert_eq!(
            paths.settings_file().unwrap(),
            PathBuf::from("/tmp/devcmd-test/settings.toml")
        );
        assert_eq!(
            paths.log_dir().unwrap(),
            PathBuf::from("/tmp/devcmd-test/logs")
        );
    }
}
