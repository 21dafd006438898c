//! Notebook use-case services.
//!
//! # Responsibility
//! - Orchestrate repository reads/writes around the template engine.
//! - Map engine and filesystem failures to one distinguishable error kind.
//!
//! # Invariants
//! - Every mutation runs under the notebook lock.
//! - A failed operation leaves the document untouched.

pub mod notebook_service;

use crate::config::ConfigError;
use crate::repo::notebook_repo::RepoError;
use crate::template::TemplateError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Stable classification callers use for retry/log policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotInitialized,
    InvalidDirectory,
    SectionNotFound,
    AnchorNotFound,
    FileAlreadyExists,
    ArchiveCollision,
    Locked,
    InvalidTemplate,
    Config,
    Io,
}

/// Service error for notebook use-cases.
#[derive(Debug)]
pub enum ServiceError {
    Template(TemplateError),
    Repo(RepoError),
    Config(ConfigError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Template(TemplateError::SectionNotFound(_)) => ErrorKind::SectionNotFound,
            Self::Template(TemplateError::AnchorNotFound { .. }) => ErrorKind::AnchorNotFound,
            Self::Template(_) => ErrorKind::InvalidTemplate,
            Self::Repo(RepoError::InvalidDirectory(_)) => ErrorKind::InvalidDirectory,
            Self::Repo(RepoError::NotInitialized(_)) => ErrorKind::NotInitialized,
            Self::Repo(RepoError::FileAlreadyExists(_)) => ErrorKind::FileAlreadyExists,
            Self::Repo(RepoError::ArchiveCollision(_)) => ErrorKind::ArchiveCollision,
            Self::Repo(RepoError::Locked { .. }) => ErrorKind::Locked,
            Self::Repo(RepoError::Io { .. }) => ErrorKind::Io,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// True for conditions reported as warnings rather than failures.
    pub fn is_warning(&self) -> bool {
        self.kind() == ErrorKind::FileAlreadyExists
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Template(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Template(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<TemplateError> for ServiceError {
    fn from(value: TemplateError) -> Self {
        Self::Template(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ConfigError> for ServiceError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}
