//! Error types surfaced to the user.

use std::path::PathBuf;

use thiserror::Error;

/// Why a package could not be selected or is no longer usable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("No package selected")]
    NoSelection,
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Not a package archive: {} (expected {expected})", path.display())]
    UnsupportedType { path: PathBuf, expected: String },
    #[error("Cannot change the selection while an installation is running")]
    Busy,
}

/// Why an installation could not be started
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstallError {
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("Installation was not confirmed")]
    NotConfirmed,
    #[error("An installation is already running")]
    Busy,
    #[error("Failed to start installer thread: {0}")]
    Thread(String),
}

/// Fatal environment problems detected at startup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreflightError {
    #[error("unsupported operating system '{0}': this installer only runs on Linux")]
    UnsupportedOs(String),
    #[error("{tool} is not available: {reason}")]
    PackageManagerMissing { tool: String, reason: String },
}
