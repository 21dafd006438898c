//! Notebook repository contract and filesystem implementation.
//!
//! # Responsibility
//! - Read the template and the current document.
//! - Overwrite the document and create timestamped archives.
//! - Create missing notebook files on `init`.
//!
//! # Invariants
//! - Missing template/document surface as `NotInitialized`, never as empty text.
//! - Archive creation fails with `ArchiveCollision` instead of overwriting.
//! - File creation fails with `FileAlreadyExists` instead of truncating.

use super::lock::NotebookLock;
use crate::config::NotebookConfig;
use crate::model::notebook::NotebookLayout;
use chrono::NaiveDateTime;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

pub type RepoResult<T> = Result<T, RepoError>;

/// Filesystem-level notebook errors.
#[derive(Debug)]
pub enum RepoError {
    /// Target path is not a directory.
    InvalidDirectory(PathBuf),
    /// A required notebook file is missing.
    NotInitialized(PathBuf),
    /// Refused to create a file that already exists.
    FileAlreadyExists(PathBuf),
    /// An archive with the same timestamped name already exists.
    ArchiveCollision(PathBuf),
    /// Another operation holds the notebook lock; `holder` is its pid when
    /// the lock file records one.
    Locked {
        path: PathBuf,
        holder: Option<i32>,
    },
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl RepoError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDirectory(path) => write!(f, "{} is not a directory", path.display()),
            Self::NotInitialized(path) => write!(
                f,
                "{} is missing; run `autonotes init` first",
                path.display()
            ),
            Self::FileAlreadyExists(path) => write!(f, "{} already exists", path.display()),
            Self::ArchiveCollision(path) => write!(
                f,
                "archive {} already exists; rotations are limited to one per minute",
                path.display()
            ),
            Self::Locked {
                path,
                holder: Some(pid),
            } => write!(
                f,
                "notebook is locked by process {pid}; if it is no longer running, remove {}",
                path.display()
            ),
            Self::Locked { path, holder: None } => write!(
                f,
                "notebook is locked by another operation; if none is running, remove {}",
                path.display()
            ),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// File access contract for one notebook.
pub trait NotebookRepository {
    /// Guard type returned by `lock`; the lock is held until it drops.
    type Guard;

    fn layout(&self) -> &NotebookLayout;
    fn lock(&self) -> RepoResult<Self::Guard>;
    fn is_initialized(&self) -> bool;
    fn read_template(&self) -> RepoResult<String>;
    fn read_document(&self) -> RepoResult<String>;
    fn write_document(&self, text: &str) -> RepoResult<()>;
    /// Writes `text` to a new archive named after `now`.
    fn create_archive(&self, now: NaiveDateTime, text: &str) -> RepoResult<PathBuf>;
    fn create_template(&self) -> RepoResult<PathBuf>;
    fn create_document(&self) -> RepoResult<PathBuf>;
}

/// Notebook repository backed by one local directory.
#[derive(Debug, Clone)]
pub struct FsNotebookRepository {
    layout: NotebookLayout,
}

impl FsNotebookRepository {
    /// Opens the notebook at `directory` using `config` file names.
    ///
    /// # Errors
    /// - `InvalidDirectory` when `directory` is not an existing directory.
    pub fn open(directory: impl Into<PathBuf>, config: &NotebookConfig) -> RepoResult<Self> {
        let directory = directory.into();
        if !directory.is_dir() {
            return Err(RepoError::InvalidDirectory(directory));
        }
        Ok(Self {
            layout: NotebookLayout::with_config(directory, config),
        })
    }

    fn read_required(&self, path: &Path) -> RepoResult<String> {
        std::fs::read_to_string(path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                RepoError::NotInitialized(path.to_path_buf())
            } else {
                RepoError::io(path, err)
            }
        })
    }
}

impl NotebookRepository for FsNotebookRepository {
    type Guard = NotebookLock;

    fn layout(&self) -> &NotebookLayout {
        &self.layout
    }

    fn lock(&self) -> RepoResult<NotebookLock> {
        NotebookLock::acquire(&self.layout.lock_path())
    }

    fn is_initialized(&self) -> bool {
        self.layout.template_path().is_file() && self.layout.document_path().is_file()
    }

    fn read_template(&self) -> RepoResult<String> {
        self.read_required(&self.layout.template_path())
    }

    fn read_document(&self) -> RepoResult<String> {
        self.read_required(&self.layout.document_path())
    }

    fn write_document(&self, text: &str) -> RepoResult<()> {
        let path = self.layout.document_path();
        if !path.is_file() {
            return Err(RepoError::NotInitialized(path));
        }
        std::fs::write(&path, text).map_err(|err| {
            error!(
                "event=document_write module=repo status=error path={} error={}",
                path.display(),
                err
            );
            RepoError::io(&path, err)
        })
    }

    fn create_archive(&self, now: NaiveDateTime, text: &str) -> RepoResult<PathBuf> {
        let path = self.layout.archive_path(now);
        write_new_file(&path, text).map_err(|err| match err {
            RepoError::FileAlreadyExists(path) => RepoError::ArchiveCollision(path),
            other => other,
        })?;
        info!(
            "event=archive_create module=repo status=ok path={} bytes={}",
            path.display(),
            text.len()
        );
        Ok(path)
    }

    fn create_template(&self) -> RepoResult<PathBuf> {
        let path = self.layout.template_path();
        write_new_file(&path, "")?;
        Ok(path)
    }

    fn create_document(&self) -> RepoResult<PathBuf> {
        let path = self.layout.document_path();
        write_new_file(&path, "")?;
        Ok(path)
    }
}

/// Writes a file that must not exist yet (`O_EXCL`).
fn write_new_file(path: &Path, text: &str) -> RepoResult<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|err| {
            if err.kind() == std::io::ErrorKind::AlreadyExists {
                RepoError::FileAlreadyExists(path.to_path_buf())
            } else {
                RepoError::io(path, err)
            }
        })?;
    file.write_all(text.as_bytes())
        .map_err(|err| RepoError::io(path, err))?;
    file.flush().map_err(|err| RepoError::io(path, err))?;
    Ok(())
}
