//! Notebook directory layout.
//!
//! # Responsibility
//! - Resolve every file a notebook owns from one directory plus config.
//! - Format archive file names from a timestamp.
//!
//! # Invariants
//! - All paths are relative to the notebook directory; nothing escapes it.

use crate::config::NotebookConfig;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Default template file name.
pub const DEFAULT_TEMPLATE_FILE_NAME: &str = "template.md";
/// Default working document file name.
pub const DEFAULT_DOCUMENT_FILE_NAME: &str = "today.md";
/// Default archive name pattern (chrono strftime, minute resolution).
pub const DEFAULT_ARCHIVE_FORMAT: &str = "archive-%Y-%m-%d-%H%M.md";
/// Optional per-notebook configuration file.
pub const CONFIG_FILE_NAME: &str = "autonotes.toml";
/// Lock file guarding notebook mutations.
pub const LOCK_FILE_NAME: &str = ".autonotes.lock";
/// Directory holding logs and service state.
pub const STATE_DIR_NAME: &str = ".autonotes";

/// Resolved file locations for one notebook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookLayout {
    directory: PathBuf,
    template_file: String,
    document_file: String,
    archive_format: String,
}

impl NotebookLayout {
    /// Layout with the default file names.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            template_file: DEFAULT_TEMPLATE_FILE_NAME.to_string(),
            document_file: DEFAULT_DOCUMENT_FILE_NAME.to_string(),
            archive_format: DEFAULT_ARCHIVE_FORMAT.to_string(),
        }
    }

    /// Layout with file names taken from a loaded config.
    pub fn with_config(directory: impl Into<PathBuf>, config: &NotebookConfig) -> Self {
        Self {
            directory: directory.into(),
            template_file: config.template_file.clone(),
            document_file: config.document_file.clone(),
            archive_format: config.archive_format.clone(),
        }
    }

    pub fn directory(&self) -> &Path {
        self.directory.as_path()
    }

    pub fn template_path(&self) -> PathBuf {
        self.directory.join(&self.template_file)
    }

    pub fn document_path(&self) -> PathBuf {
        self.directory.join(&self.document_file)
    }

    pub fn config_path(&self) -> PathBuf {
        self.directory.join(CONFIG_FILE_NAME)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.directory.join(LOCK_FILE_NAME)
    }

    pub fn state_dir(&self) -> PathBuf {
        self.directory.join(STATE_DIR_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.state_dir().join("logs")
    }

    pub fn service_pid_path(&self) -> PathBuf {
        self.state_dir().join("service.pid")
    }

    /// Archive file name for the given local time.
    pub fn archive_file_name(&self, now: NaiveDateTime) -> String {
        now.format(&self.archive_format).to_string()
    }

    pub fn archive_path(&self, now: NaiveDateTime) -> PathBuf {
        self.directory.join(self.archive_file_name(now))
    }
}

#[cfg(test)]
mod tests {
    use super::NotebookLayout;
    use chrono::NaiveDate;

    #[test]
    fn formats_archive_name_with_minute_resolution() {
        let layout = NotebookLayout::new("/notes");
        let now = NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|date| date.and_hms_opt(7, 5, 42))
            .expect("valid timestamp");

        assert_eq!(layout.archive_file_name(now), "archive-2024-03-09-0705.md");
    }

    #[test]
    fn resolves_default_file_names() {
        let layout = NotebookLayout::new("/notes");
        assert!(layout.template_path().ends_with("template.md"));
        assert!(layout.document_path().ends_with("today.md"));
        assert!(layout.lock_path().ends_with(".autonotes.lock"));
    }
}
