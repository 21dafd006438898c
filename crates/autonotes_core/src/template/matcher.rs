//! Section matcher.
//!
//! Maps template boundaries onto a live document and extracts the text
//! currently occupying each section.

use super::{AnchorSide, TemplateError, TemplateResult};
use crate::model::section::{MatchedSection, SectionBoundary, Sections};
use std::ops::Range;

/// Locates the content span of one section anywhere in `text`.
pub fn locate_section(text: &str, boundary: &SectionBoundary) -> TemplateResult<Range<usize>> {
    locate_section_from(text, boundary, 0)
}

/// Locates the content span of one section at or past byte offset `from`.
///
/// `before` resolves to its first occurrence at or past `from`. `after`
/// resolves past the end of `before`: to its first occurrence, or to its
/// last one when the boundary ends the template, so a trailing section
/// keeps every line up to the template's closing text.
pub fn locate_section_from(
    text: &str,
    boundary: &SectionBoundary,
    from: usize,
) -> TemplateResult<Range<usize>> {
    let rest = text
        .get(from..)
        .ok_or_else(|| anchor_not_found(boundary, AnchorSide::Before))?;
    let start = if boundary.before.is_empty() {
        from
    } else {
        let offset = rest
            .find(boundary.before.as_str())
            .ok_or_else(|| anchor_not_found(boundary, AnchorSide::Before))?;
        from + offset + boundary.before.len()
    };

    let end = if boundary.after.is_empty() {
        text.len()
    } else {
        let tail = &text[start..];
        let offset = if boundary.ends_template {
            tail.rfind(boundary.after.as_str())
        } else {
            tail.find(boundary.after.as_str())
        };
        offset
            .map(|offset| start + offset)
            .ok_or_else(|| anchor_not_found(boundary, AnchorSide::After))?
    };

    Ok(start..end)
}

/// Locates every section in template order.
///
/// Each section is searched from the end of the previous one, so an anchor
/// that also occurs earlier in the document never pulls a later section
/// back over an earlier one.
pub fn locate_sections(
    text: &str,
    boundaries: &Sections<SectionBoundary>,
) -> TemplateResult<Sections<Range<usize>>> {
    let mut spans = Sections::new();
    let mut cursor = 0;
    for boundary in boundaries.values() {
        let span = locate_section_from(text, boundary, cursor)?;
        cursor = span.end;
        // Names are unique in `boundaries`, so this push cannot collide.
        let _ = spans.try_push(boundary.name.clone(), span);
    }
    Ok(spans)
}

/// Extracts the live content of every section, in template order.
///
/// # Errors
/// - `AnchorNotFound` for the first section whose anchors have drifted out of
///   the document. Nothing is returned for the other sections in that case.
pub fn match_sections(
    text: &str,
    boundaries: &Sections<SectionBoundary>,
) -> TemplateResult<Sections<MatchedSection>> {
    let spans = locate_sections(text, boundaries)?;
    let mut matched = Sections::new();
    for (boundary, span) in boundaries.values().zip(spans.values()) {
        let section = MatchedSection {
            boundary: boundary.clone(),
            content: text[span.clone()].to_string(),
        };
        let _ = matched.try_push(boundary.name.clone(), section);
    }
    Ok(matched)
}

fn anchor_not_found(boundary: &SectionBoundary, side: AnchorSide) -> TemplateError {
    let anchor = match side {
        AnchorSide::Before => boundary.before.clone(),
        AnchorSide::After => boundary.after.clone(),
    };
    TemplateError::AnchorNotFound {
        section: boundary.name.clone(),
        side,
        anchor,
    }
}

#[cfg(test)]
mod tests {
    use super::{locate_section, locate_sections, match_sections};
    use crate::model::section::SectionBoundary;
    use crate::template::parser::{parse_template, remove_template_tags};
    use crate::template::{AnchorSide, TemplateError};

    #[test]
    fn extracts_section_contents() {
        let template = "TODO:\n{{ todo }}\nNOTES:\n{{ notes }}\n";
        let document = "TODO:\n- [ ] a\n- [x] b\nNOTES:\nsome text\n";
        let boundaries = parse_template(template).expect("parse");

        let matched = match_sections(document, &boundaries).expect("match");
        assert_eq!(matched.get("todo").expect("todo").content, "- [ ] a\n- [x] b");
        assert_eq!(matched.get("notes").expect("notes").content, "some text");
    }

    #[test]
    fn fresh_document_matches_with_empty_sections() {
        let template = "# Day\n\nTODO:\n{{ todo }}\n\nNOTES:\n{{ notes }}\n\nNEXT:\n{{ next }}\n";
        let boundaries = parse_template(template).expect("parse");
        let fresh = remove_template_tags(template);

        let matched = match_sections(&fresh, &boundaries).expect("match");
        assert_eq!(matched.len(), 3);
        assert!(matched.values().all(|section| section.content.is_empty()));
    }

    #[test]
    fn empty_anchors_resolve_to_text_edges() {
        let boundary = SectionBoundary::new("tail", "---\n", "", "{{ tail }}");
        let span = locate_section("head\n---\nrest of file", &boundary).expect("locate");
        assert_eq!(span, 9..21);

        let boundary = SectionBoundary::new("head", "", "\n---", "{{ head }}");
        let span = locate_section("intro\n---\n", &boundary).expect("locate");
        assert_eq!(span, 0..5);
    }

    #[test]
    fn after_anchor_is_searched_past_before() {
        let boundary = SectionBoundary::new("x", "B", "A", "{{ x }}");
        let span = locate_section("AB123A", &boundary).expect("locate");
        assert_eq!(span, 2..5);
    }

    #[test]
    fn reports_missing_anchors() {
        let boundaries = parse_template("TODO:\n{{ todo }}\nNOTES:\n").expect("parse");

        let err = match_sections("nothing here", &boundaries).expect_err("missing before");
        assert!(matches!(
            err,
            TemplateError::AnchorNotFound {
                side: AnchorSide::Before,
                ..
            }
        ));

        let err = match_sections("TODO:\nitems", &boundaries).expect_err("missing after");
        assert_eq!(
            err,
            TemplateError::AnchorNotFound {
                section: "todo".to_string(),
                side: AnchorSide::After,
                anchor: "\nNOTES:\n".to_string(),
            }
        );
    }

    #[test]
    fn last_section_keeps_every_line() {
        let template = "TODO:\n{{ todo }}\nNOTES:\n{{ notes }}\n";
        let document = "TODO:\n- [ ] a\nNOTES:\nline1\nline2\n\nline4\n";
        let boundaries = parse_template(template).expect("parse");

        let matched = match_sections(document, &boundaries).expect("match");
        assert_eq!(
            matched.get("notes").expect("notes").content,
            "line1\nline2\n\nline4"
        );
    }

    #[test]
    fn later_sections_are_searched_after_earlier_ones() {
        let template = "X\n{{ a }}\n{{ b }}\n";
        let document = "X\nA\nB1\nB2\n";
        let boundaries = parse_template(template).expect("parse");

        let spans = locate_sections(document, &boundaries).expect("locate");
        assert_eq!(spans.get("a"), Some(&(2..3)));
        assert_eq!(spans.get("b"), Some(&(4..9)));

        let matched = match_sections(document, &boundaries).expect("match");
        assert_eq!(matched.get("a").expect("a").content, "A");
        assert_eq!(matched.get("b").expect("b").content, "B1\nB2");
    }
}
