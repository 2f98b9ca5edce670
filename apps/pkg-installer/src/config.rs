//! Installer configuration.
//!
//! Every field has a default, so a config file only needs the keys it wants
//! to override:
//!
//! ```yaml
//! elevators: [sudo]
//! archive_suffixes: [".pkg.tar.zst"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

/// Tools and conventions the installer relies on
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallerConfig {
    /// Prints package metadata (`<tool> -Qip <path>`)
    pub query_tool: String,
    /// Performs the installation
    pub package_manager: String,
    /// Arguments passed to the package manager before the archive path
    pub install_args: Vec<String>,
    /// Elevation helpers, tried in order until one is found
    pub elevators: Vec<String>,
    /// Elevation helpers that prompt on the controlling terminal; the TUI
    /// steps aside while one of these runs
    pub terminal_elevators: Vec<String>,
    /// File name endings recognized as package archives
    pub archive_suffixes: Vec<String>,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            query_tool: "pacman".to_string(),
            package_manager: "pacman".to_string(),
            install_args: vec![
                "-U".to_string(),
                "--needed".to_string(),
                "--noconfirm".to_string(),
            ],
            elevators: vec!["pkexec".to_string(), "sudo".to_string()],
            terminal_elevators: vec!["sudo".to_string()],
            archive_suffixes: vec![
                ".pkg.tar.zst".to_string(),
                ".pkg.tar.xz".to_string(),
                ".pkg.tar.gz".to_string(),
                ".pkg.tar.bz2".to_string(),
                ".pkg.tar".to_string(),
            ],
        }
    }
}

impl InstallerConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the per-user config file is
    /// read when present, otherwise defaults apply.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                debug!("no config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        // An empty document deserializes to unit, not an empty map.
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.query_tool.is_empty(), "query_tool must not be empty");
        anyhow::ensure!(
            !self.package_manager.is_empty(),
            "package_manager must not be empty"
        );
        anyhow::ensure!(
            !self.archive_suffixes.is_empty(),
            "archive_suffixes must list at least one suffix"
        );
        Ok(())
    }
}

/// `<config dir>/pkg-installer/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "pkg-installer")
        .map(|dirs| dirs.config_dir().join("config.yaml"))
}
