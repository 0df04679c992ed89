//! Current file selection state.
//!
//! The selection is replaced wholesale on every picker or drop event, never
//! merged. Mutation happens only through selection/drop handlers; the rest of
//! the pipeline reads the file set through [`Selection::file_paths`].

use crate::paths;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A user-selected input file.
///
/// `name` is always present. `path` is best-effort: a browser-style file
/// picker only exposes the file name, in which case the name doubles as the
/// path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFile {
    pub name: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl SelectedFile {
    /// Builds an entry from an absolute path, as delivered by a drop event.
    pub fn from_path(path: &str) -> Self {
        Self {
            name: paths::display_name(path).to_string(),
            path: path.to_string(),
            size: None,
        }
    }

    /// Builds an entry from a picker that only exposes name and size.
    pub fn from_picker(name: &str, size: Option<u64>) -> Self {
        Self {
            name: name.to_string(),
            path: name.to_string(),
            size,
        }
    }
}

/// Event emitted by the file selection / drag-drop collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    Hover,
    Drop(Vec<String>),
    Cancel,
}

/// The current set of selected files.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    files: Vec<SelectedFile>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a selection directly from a list of paths (CLI entry point).
    pub fn from_paths(paths: &[String]) -> Self {
        let mut selection = Self::new();
        selection.replace(paths.iter().map(|p| SelectedFile::from_path(p)).collect());
        selection
    }

    /// Replaces the whole selection. The previous set is discarded.
    pub fn replace(&mut self, files: Vec<SelectedFile>) {
        debug!("Selection replaced with {} file(s)", files.len());
        self.files = files;
    }

    /// Applies a drag-drop event. Only `Drop` mutates the selection.
    pub fn apply_event(&mut self, event: FileEvent) {
        if let FileEvent::Drop(paths) = event {
            if paths.is_empty() {
                return;
            }
            self.replace(paths.iter().map(|p| SelectedFile::from_path(p)).collect());
        }
    }

    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn file_paths(&self) -> Vec<String> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
