//! Domain model for notebooks and template sections.
//!
//! # Responsibility
//! - Define the boundary records produced by template parsing.
//! - Describe where a notebook keeps its template, document and archives.
//!
//! # Invariants
//! - Section collections preserve template order.
//! - Section content is never persisted on its own; it is recomputed from
//!   the document text on every read.

pub mod notebook;
pub mod section;
