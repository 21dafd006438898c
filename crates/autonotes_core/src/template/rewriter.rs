//! Section rewriter.

use super::matcher::{locate_section, locate_sections};
use super::TemplateResult;
use crate::model::section::{SectionBoundary, Sections};

/// Replaces the content of one section, keeping all text outside it.
///
/// Anchors are located in `text` as given, so this can be chained across
/// several sections of the same evolving document.
pub fn replace_section(
    text: &str,
    boundary: &SectionBoundary,
    content: &str,
) -> TemplateResult<String> {
    let span = locate_section(text, boundary)?;
    let mut rewritten = String::with_capacity(text.len() - span.len() + content.len());
    rewritten.push_str(&text[..span.start]);
    rewritten.push_str(content);
    rewritten.push_str(&text[span.end..]);
    Ok(rewritten)
}

/// Replaces the content of every section named in `contents` in one pass.
///
/// Spans are located with `locate_sections`, in template order, and
/// sections absent from `contents` keep their text.
pub fn rewrite_sections(
    text: &str,
    boundaries: &Sections<SectionBoundary>,
    contents: &Sections<String>,
) -> TemplateResult<String> {
    let spans = locate_sections(text, boundaries)?;
    let mut rewritten = String::with_capacity(text.len());
    let mut copied = 0;
    for (name, span) in spans.iter() {
        let Some(content) = contents.get(name) else {
            continue;
        };
        rewritten.push_str(&text[copied..span.start]);
        rewritten.push_str(content);
        copied = span.end;
    }
    rewritten.push_str(&text[copied..]);
    Ok(rewritten)
}
