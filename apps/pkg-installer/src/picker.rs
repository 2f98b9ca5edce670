//! In-app file picker for package archives.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::installer::package::has_archive_suffix;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntryKind {
    Directory,
    Package,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// Browses one directory at a time, listing sub-directories and package
/// archives only
#[derive(Debug, Clone)]
pub struct FilePicker {
    pub dir: PathBuf,
    pub entries: Vec<PickerEntry>,
    pub selected: usize,
    pub show_hidden: bool,
    /// Set when the directory could not be read
    pub error: Option<String>,
    suffixes: Vec<String>,
}

impl FilePicker {
    pub fn open(dir: impl Into<PathBuf>, suffixes: Vec<String>) -> Self {
        let mut picker = Self {
            dir: dir.into(),
            entries: Vec::new(),
            selected: 0,
            show_hidden: false,
            error: None,
            suffixes,
        };
        picker.refresh();
        picker
    }

    /// Re-read the current directory
    pub fn refresh(&mut self) {
        match list_dir(&self.dir, &self.suffixes, self.show_hidden) {
            Ok(entries) => {
                self.entries = entries;
                self.error = None;
            }
            Err(e) => {
                debug!(dir = %self.dir.display(), error = %e, "cannot list directory");
                self.entries.clear();
                self.error = Some(e.to_string());
            }
        }
        self.selected = self.selected.min(self.entries.len().saturating_sub(1));
    }

    pub fn current(&self) -> Option<&PickerEntry> {
        self.entries.get(self.selected)
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.entries.len() {
            self.selected += 1;
        }
    }

    /// Descend into the highlighted directory, or return the highlighted
    /// package's path
    pub fn activate(&mut self) -> Option<PathBuf> {
        let entry = self.current()?.clone();
        match entry.kind {
            EntryKind::Directory => {
                self.change_dir(entry.path);
                None
            }
            EntryKind::Package => Some(entry.path),
        }
    }

    /// Go to the parent directory, keeping the one we left highlighted
    pub fn parent(&mut self) {
        let Some(parent) = self.dir.parent().map(Path::to_path_buf) else {
            return;
        };
        let left = self.dir.clone();
        self.change_dir(parent);
        if let Some(index) = self.entries.iter().position(|e| e.path == left) {
            self.selected = index;
        }
    }

    pub fn toggle_hidden(&mut self) {
        self.show_hidden = !self.show_hidden;
        self.refresh();
    }

    fn change_dir(&mut self, dir: PathBuf) {
        self.dir = dir;
        self.selected = 0;
        self.refresh();
    }
}

/// Directories first, then packages, each sorted by name
fn list_dir(dir: &Path, suffixes: &[String], show_hidden: bool) -> std::io::Result<Vec<PickerEntry>> {
    let mut entries = Vec::new();

    for entry in fs::read_dir(dir)? {
        let Ok(entry) = entry else { continue };
        let name = entry.file_name().to_string_lossy().into_owned();
        if !show_hidden && name.starts_with('.') {
            continue;
        }

        let path = entry.path();
        // Follows symlinks, so a linked directory is browsable.
        let kind = if path.is_dir() {
            EntryKind::Directory
        } else if path.is_file() && has_archive_suffix(&path, suffixes) {
            EntryKind::Package
        } else {
            continue;
        };

        entries.push(PickerEntry { name, path, kind });
    }

    entries.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));
    Ok(entries)
}
