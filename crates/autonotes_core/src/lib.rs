//! Core domain logic for autonotes.
//! Template sections, rotation and item append live here; the CLI and the
//! background service only orchestrate these APIs.

pub mod checkbox;
pub mod config;
pub mod hooks;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod template;

pub use checkbox::{is_checkbox_line, is_checked, Checkbox};
pub use config::{ConfigError, NotebookConfig, DEFAULT_CARRY_SECTIONS};
pub use hooks::{
    parse_hook_event, HookContext, HookError, HookEvent, HookPayload, HookRegistry, HookReport,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::notebook::NotebookLayout;
pub use model::section::{MatchedSection, SectionBoundary, Sections};
pub use repo::notebook_repo::{FsNotebookRepository, NotebookRepository, RepoError, RepoResult};
pub use service::notebook_service::{
    AddItemRequest, InitOutcome, ItemSink, NotebookService, RotationReport,
};
pub use service::{ErrorKind, ServiceError, ServiceResult};
pub use template::matcher::{
    locate_section, locate_section_from, locate_sections, match_sections,
};
pub use template::parser::{parse_template, remove_template_tags};
pub use template::rewriter::{replace_section, rewrite_sections};
pub use template::{AnchorSide, TemplateError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
