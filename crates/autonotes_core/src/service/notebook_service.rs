//! Notebook use-case service.
//!
//! # Responsibility
//! - Rotate: archive the document and rebuild it from the template.
//! - Append single items to named sections.
//! - Create missing notebook files.
//!
//! # Invariants
//! - Rotation computes the next document before writing anything, so an
//!   anchor failure never leaves an archive behind.
//! - The archive is written before the document is overwritten.
//! - Service APIs never bypass the repository lock.

use super::{ServiceError, ServiceResult};
use crate::checkbox::Checkbox;
use crate::config::NotebookConfig;
use crate::model::notebook::NotebookLayout;
use crate::model::section::{MatchedSection, Sections};
use crate::repo::notebook_repo::{FsNotebookRepository, NotebookRepository, RepoError};
use crate::template::matcher::match_sections;
use crate::template::parser::parse_template;
use crate::template::rotation::{append_item, next_document};
use chrono::{Local, NaiveDateTime};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Request model for appending one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddItemRequest {
    pub section: String,
    pub text: String,
    pub checkbox: Option<Checkbox>,
}

impl AddItemRequest {
    pub fn new(section: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            text: text.into(),
            checkbox: None,
        }
    }

    pub fn with_checkbox(mut self, checkbox: Option<Checkbox>) -> Self {
        self.checkbox = checkbox;
        self
    }
}

/// Result of a completed rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationReport {
    pub archive: PathBuf,
    pub document: String,
}

/// Result of `init`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    AlreadyInitialized,
    Created {
        created: Vec<PathBuf>,
        existing: Vec<PathBuf>,
    },
}

/// Capability handed to hooks that need to write into the notebook.
pub trait ItemSink {
    fn add_item(&self, request: &AddItemRequest) -> ServiceResult<()>;
}

/// Use-case service for one notebook.
pub struct NotebookService<R: NotebookRepository> {
    repo: R,
    config: NotebookConfig,
}

impl NotebookService<FsNotebookRepository> {
    /// Opens the notebook at `directory`, loading its optional config file.
    pub fn open(directory: impl AsRef<Path>) -> ServiceResult<Self> {
        let directory = directory.as_ref();
        if !directory.is_dir() {
            return Err(RepoError::InvalidDirectory(directory.to_path_buf()).into());
        }
        let config = NotebookConfig::load(&NotebookLayout::new(directory).config_path())?;
        let repo = FsNotebookRepository::open(directory, &config)?;
        Ok(Self::new(repo, config))
    }
}

impl<R: NotebookRepository> NotebookService<R> {
    pub fn new(repo: R, config: NotebookConfig) -> Self {
        Self { repo, config }
    }

    pub fn config(&self) -> &NotebookConfig {
        &self.config
    }

    pub fn layout(&self) -> &NotebookLayout {
        self.repo.layout()
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn is_initialized(&self) -> bool {
        self.repo.is_initialized()
    }

    /// Creates whichever of template/document is missing.
    pub fn init(&self) -> ServiceResult<InitOutcome> {
        if self.repo.is_initialized() {
            return Ok(InitOutcome::AlreadyInitialized);
        }
        let _guard = self.repo.lock()?;

        let mut created = Vec::new();
        let mut existing = Vec::new();
        for result in [self.repo.create_template(), self.repo.create_document()] {
            match result {
                Ok(path) => created.push(path),
                Err(RepoError::FileAlreadyExists(path)) => existing.push(path),
                Err(err) => return Err(err.into()),
            }
        }

        info!(
            "event=notebook_init module=service status=ok dir={} created={} existing={}",
            self.layout().directory().display(),
            created.len(),
            existing.len()
        );
        Ok(InitOutcome::Created { created, existing })
    }

    /// Creates an empty template; `FileAlreadyExists` when present.
    pub fn create_template(&self) -> ServiceResult<PathBuf> {
        let _guard = self.repo.lock()?;
        Ok(self.repo.create_template()?)
    }

    /// Creates an empty document; `FileAlreadyExists` when present.
    pub fn create_document(&self) -> ServiceResult<PathBuf> {
        let _guard = self.repo.lock()?;
        Ok(self.repo.create_document()?)
    }

    /// Current content of every template section in the document.
    pub fn sections(&self) -> ServiceResult<Sections<MatchedSection>> {
        let template = self.repo.read_template()?;
        let document = self.repo.read_document()?;
        let boundaries = parse_template(&template)?;
        Ok(match_sections(&document, &boundaries)?)
    }

    /// Rotates using the current local time for the archive name.
    pub fn rotate(&self) -> ServiceResult<RotationReport> {
        self.rotate_at(Local::now().naive_local())
    }

    /// Archives the document and replaces it with a fresh one.
    ///
    /// # Errors
    /// - `NotInitialized` when template or document is missing.
    /// - `AnchorNotFound` when the document drifted from the template.
    /// - `ArchiveCollision` when an archive for the same minute exists.
    pub fn rotate_at(&self, now: NaiveDateTime) -> ServiceResult<RotationReport> {
        let started_at = Instant::now();
        info!(
            "event=rotate module=service status=start dir={}",
            self.layout().directory().display()
        );

        let result = self.rotate_locked(now);
        match &result {
            Ok(report) => info!(
                "event=rotate module=service status=ok duration_ms={} archive={}",
                started_at.elapsed().as_millis(),
                report.archive.display()
            ),
            Err(err) => error!(
                "event=rotate module=service status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn rotate_locked(&self, now: NaiveDateTime) -> ServiceResult<RotationReport> {
        let _guard = self.repo.lock()?;
        let template = self.repo.read_template()?;
        let current = self.repo.read_document()?;

        let document = next_document(&template, &current, &self.config.carry_sections)?;
        let archive = self.repo.create_archive(now, &current)?;
        if let Err(err) = self.repo.write_document(&document) {
            warn!(
                "event=rotate module=service status=partial archive={} error={}",
                archive.display(),
                err
            );
            return Err(err.into());
        }

        Ok(RotationReport { archive, document })
    }

    /// Appends one item to a named section of the document.
    ///
    /// # Errors
    /// - `SectionNotFound` when the template has no such section.
    /// - `AnchorNotFound` when the document drifted from the template.
    pub fn add_item(&self, request: &AddItemRequest) -> ServiceResult<()> {
        let _guard = self.repo.lock()?;
        let template = self.repo.read_template()?;
        let current = self.repo.read_document()?;

        let document = append_item(
            &template,
            &current,
            &request.section,
            &request.text,
            request.checkbox,
        )
        .map_err(|err| {
            error!(
                "event=add_item module=service status=error section={} error={}",
                request.section, err
            );
            ServiceError::from(err)
        })?;
        self.repo.write_document(&document)?;

        info!(
            "event=add_item module=service status=ok section={} checkbox={}",
            request.section,
            request.checkbox.is_some()
        );
        Ok(())
    }
}

impl<R: NotebookRepository> ItemSink for NotebookService<R> {
    fn add_item(&self, request: &AddItemRequest) -> ServiceResult<()> {
        NotebookService::add_item(self, request)
    }
}
