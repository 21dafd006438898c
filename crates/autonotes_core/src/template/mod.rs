//! Template section engine.
//!
//! # Responsibility
//! - Decompose template text into named section boundaries.
//! - Relocate those boundaries inside a live document and rewrite spans.
//! - Build the next document for a rotation and append single items.
//!
//! # Invariants
//! - Anchor lookups always run against the current text; offsets are never
//!   cached across mutations.
//! - Sections are located in template order, each from the end of the
//!   previous one; `after` is searched from the end of the located `before`.
//! - The template's last section extends to the last occurrence of its
//!   `after` anchor.
//! - Empty `before` anchors at the start of text, empty `after` at the end.

pub mod matcher;
pub mod parser;
pub mod rewriter;
pub mod rotation;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Which anchor of a boundary failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorSide {
    Before,
    After,
}

impl AnchorSide {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

/// Template parse and section lookup errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// Two markers with no text between them; neither can be relocated.
    AdjacentMarkers { first: String, second: String },
    /// The same section name appears on two markers.
    DuplicateSection(String),
    /// A boundary anchor is missing from the target text.
    AnchorNotFound {
        section: String,
        side: AnchorSide,
        anchor: String,
    },
    /// The requested section name is not defined by the template.
    SectionNotFound(String),
}

impl Display for TemplateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AdjacentMarkers { first, second } => write!(
                f,
                "template markers `{first}` and `{second}` are adjacent; put text between them"
            ),
            Self::DuplicateSection(name) => {
                write!(f, "template defines section `{name}` more than once")
            }
            Self::AnchorNotFound {
                section,
                side,
                anchor,
            } => write!(
                f,
                "section `{section}`: {} anchor {anchor:?} not found in document",
                side.as_str()
            ),
            Self::SectionNotFound(name) => write!(f, "section not found in template: `{name}`"),
        }
    }
}

impl Error for TemplateError {}

pub type TemplateResult<T> = Result<T, TemplateError>;
