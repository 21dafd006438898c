//! Per-notebook configuration.
//!
//! # Responsibility
//! - Load optional `autonotes.toml` from a notebook directory.
//! - Supply defaults for every key so an absent file is a valid config.
//!
//! # Invariants
//! - A loaded config has passed `validate()`.
//! - File names are bare names; they never point outside the notebook.

use crate::hooks::parse_hook_event;
use crate::model::notebook::{
    DEFAULT_ARCHIVE_FORMAT, DEFAULT_DOCUMENT_FILE_NAME, DEFAULT_TEMPLATE_FILE_NAME,
};
use chrono::format::{Item, StrftimeItems};
use log::{info, warn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Section names whose unchecked items survive a rotation by default.
pub const DEFAULT_CARRY_SECTIONS: &[&str] = &["todo", "notes", "next"];

/// Notebook configuration with defaults for every field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotebookConfig {
    pub template_file: String,
    pub document_file: String,
    /// chrono strftime pattern for archive file names.
    pub archive_format: String,
    /// Whitelist of sections carried across rotations.
    pub carry_sections: Vec<String>,
    /// Local hour (0-23) at which the service rotates.
    pub rotate_hour: u32,
    /// Event name -> shell commands.
    pub hooks: BTreeMap<String, Vec<String>>,
    /// Commit message prefix (without `:`) -> target section.
    pub commit_log: BTreeMap<String, String>,
}

impl Default for NotebookConfig {
    fn default() -> Self {
        Self {
            template_file: DEFAULT_TEMPLATE_FILE_NAME.to_string(),
            document_file: DEFAULT_DOCUMENT_FILE_NAME.to_string(),
            archive_format: DEFAULT_ARCHIVE_FORMAT.to_string(),
            carry_sections: DEFAULT_CARRY_SECTIONS
                .iter()
                .map(|name| name.to_string())
                .collect(),
            rotate_hour: 0,
            hooks: BTreeMap::new(),
            commit_log: BTreeMap::new(),
        }
    }
}

impl NotebookConfig {
    /// Parses and validates config text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads config from `path`, falling back to defaults when it is absent.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => {
                warn!(
                    "event=config_load module=config status=error path={} error={}",
                    path.display(),
                    err
                );
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    message: err.to_string(),
                });
            }
        };

        let config = Self::from_toml_str(&text)?;
        info!(
            "event=config_load module=config status=ok path={} carry_sections={} hooks={}",
            path.display(),
            config.carry_sections.len(),
            config.hooks.len()
        );
        Ok(config)
    }

    /// Checks declaration-level invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_file_name("template_file", &self.template_file)?;
        validate_file_name("document_file", &self.document_file)?;
        if self.template_file == self.document_file {
            return Err(ConfigError::Invalid {
                key: "document_file",
                message: "must differ from template_file".to_string(),
            });
        }

        validate_file_name("archive_format", &self.archive_format)?;
        if StrftimeItems::new(&self.archive_format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::Invalid {
                key: "archive_format",
                message: format!("invalid strftime pattern `{}`", self.archive_format),
            });
        }

        if self.rotate_hour > 23 {
            return Err(ConfigError::Invalid {
                key: "rotate_hour",
                message: format!("expected 0-23, got {}", self.rotate_hour),
            });
        }

        for event in self.hooks.keys() {
            parse_hook_event(event).map_err(|err| ConfigError::Invalid {
                key: "hooks",
                message: err.to_string(),
            })?;
        }

        for (prefix, section) in &self.commit_log {
            if prefix.trim().is_empty() || section.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    key: "commit_log",
                    message: "prefixes and sections must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }
}

fn validate_file_name(key: &'static str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid {
            key,
            message: "must not be empty".to_string(),
        });
    }
    if trimmed.contains(['/', '\\']) || trimmed == "." || trimmed == ".." {
        return Err(ConfigError::Invalid {
            key,
            message: format!("must be a bare file name, got `{value}`"),
        });
    }
    Ok(())
}

/// Configuration load and validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Read { path: PathBuf, message: String },
    Parse(String),
    Invalid { key: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, message } => {
                write!(f, "failed to read config `{}`: {message}", path.display())
            }
            Self::Parse(message) => write!(f, "invalid config: {message}"),
            Self::Invalid { key, message } => write!(f, "invalid config `{key}`: {message}"),
        }
    }
}

impl Error for ConfigError {}
