//! The selected package archive.

use std::path::{self, Path, PathBuf};

use crate::installer::error::SelectionError;

/// A package archive on disk.
///
/// Only constructed for paths that pointed at a regular file with a
/// recognized archive suffix at selection time. The file may vanish later,
/// so callers about to act on it should go through [`PackageRef::ensure_present`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRef {
    path: PathBuf,
}

impl PackageRef {
    pub fn new(path: impl Into<PathBuf>, suffixes: &[String]) -> Result<Self, SelectionError> {
        let path = path.into();
        let path = path::absolute(&path).unwrap_or(path);

        if !path.is_file() {
            return Err(SelectionError::NotFound(path));
        }
        if !has_archive_suffix(&path, suffixes) {
            return Err(SelectionError::UnsupportedType {
                path,
                expected: suffixes.join(", "),
            });
        }

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn directory(&self) -> Option<&Path> {
        self.path.parent()
    }

    pub fn ensure_present(&self) -> Result<(), SelectionError> {
        if self.path.is_file() {
            Ok(())
        } else {
            Err(SelectionError::NotFound(self.path.clone()))
        }
    }
}

/// Check whether the file name ends with one of `suffixes`
pub fn has_archive_suffix(path: &Path, suffixes: &[String]) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let name = name.to_string_lossy();
    suffixes
        .iter()
        .any(|suffix| name.len() > suffix.len() && name.ends_with(suffix.as_str()))
}
