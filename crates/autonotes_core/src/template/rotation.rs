//! Text-level rotation and append pipelines.
//!
//! # Responsibility
//! - Build the next document from template + current document.
//! - Append one item to a named section of a document.
//!
//! # Invariants
//! - Pure functions over strings; filesystem effects live in the service.
//! - Any anchor failure aborts the whole pipeline; no partial result escapes.

use super::matcher::match_sections;
use super::parser::{parse_template, remove_template_tags};
use super::rewriter::rewrite_sections;
use super::{TemplateError, TemplateResult};
use crate::checkbox::{retain_unfinished, Checkbox};
use crate::model::section::Sections;

/// Builds the document that replaces `document` after a rotation.
///
/// Sections listed in `carry_sections` keep their unchecked lines; every
/// other section comes back empty.
pub fn next_document(
    template: &str,
    document: &str,
    carry_sections: &[String],
) -> TemplateResult<String> {
    let boundaries = parse_template(template)?;
    let matched = match_sections(document, &boundaries)?;
    let fresh = remove_template_tags(template);

    let mut carried = Sections::new();
    for section in matched.values() {
        if carry_sections.iter().any(|name| name == section.name()) {
            let _ = carried.try_push(section.name(), retain_unfinished(&section.content));
        }
    }

    rewrite_sections(&fresh, &boundaries, &carried)
}

/// Appends `item` to the end of `section` inside `document`.
///
/// The item goes on a new line after the existing content, optionally
/// rendered as a checkbox list line.
pub fn append_item(
    template: &str,
    document: &str,
    section: &str,
    item: &str,
    checkbox: Option<Checkbox>,
) -> TemplateResult<String> {
    let boundaries = parse_template(template)?;
    let matched = match_sections(document, &boundaries)?;
    let target = matched
        .get(section)
        .ok_or_else(|| TemplateError::SectionNotFound(section.to_string()))?;

    let line = match checkbox {
        Some(checkbox) => checkbox.decorate(item),
        None => item.to_string(),
    };
    let mut contents = Sections::new();
    let _ = contents.try_push(section, format!("{}\n{line}", target.content));
    rewrite_sections(document, &boundaries, &contents)
}

#[cfg(test)]
mod tests {
    use super::{append_item, next_document};
    use crate::checkbox::Checkbox;
    use crate::template::TemplateError;

    fn default_carry() -> Vec<String> {
        vec!["todo".to_string(), "notes".to_string(), "next".to_string()]
    }

    #[test]
    fn carries_unchecked_items_and_notes() {
        let template = "TODO:\n{{ todo }}\nNOTES:\n{{ notes }}\n";
        let document = "TODO:\n- [ ] a\n- [x] b\nNOTES:\nsome text\n";

        let next = next_document(template, document, &default_carry()).expect("rotate");
        assert_eq!(next, "TODO:\n- [ ] a\nNOTES:\nsome text\n");
    }

    #[test]
    fn sections_outside_whitelist_are_reset() {
        let template = "LOG:\n{{ log }}\nTODO:\n{{ todo }}\n";
        let document = "LOG:\nwent well\nTODO:\n- [ ] keep\n";

        let next = next_document(template, document, &default_carry()).expect("rotate");
        assert_eq!(next, "LOG:\n\nTODO:\n- [ ] keep\n");
    }

    #[test]
    fn rotating_a_fresh_document_is_stable() {
        let template = "TODO:\n{{ todo }}\nNOTES:\n{{ notes }}\n";
        let document = "TODO:\n- [ ] a\nNOTES:\nsome text\n";

        let once = next_document(template, document, &default_carry()).expect("first");
        let twice = next_document(template, &once, &default_carry()).expect("second");
        assert_eq!(once, document);
        assert_eq!(twice, once);
    }

    #[test]
    fn last_section_carries_every_unfinished_line() {
        let cases = [
            (
                "NOTES:\n{{ notes }}\nTODO:\n{{ todo }}\n",
                "NOTES:\nn\nTODO:\n- [ ] a\n- [ ] b\n- [x] c\n",
                "NOTES:\nn\nTODO:\n- [ ] a\n- [ ] b\n",
            ),
            (
                "TODO:\n{{ todo }}\nNOTES:\n{{ notes }}\n",
                "TODO:\n- [ ] a\nNOTES:\nline1\nline2\n",
                "TODO:\n- [ ] a\nNOTES:\nline1\nline2\n",
            ),
            (
                "TODO:\n{{ todo }}\nNOTES:\n{{ notes }}\n",
                "TODO:\n\nNOTES:\n- [ ] keep\n- [X] done\nplain text\n",
                "TODO:\n\nNOTES:\n- [ ] keep\nplain text\n",
            ),
        ];

        for (template, document, expected) in cases {
            let next = next_document(template, document, &default_carry()).expect("rotate");
            assert_eq!(next, expected, "document: {document:?}");
        }
    }

    #[test]
    fn append_goes_after_a_multi_line_last_section() {
        let template = "TODO:\n{{ todo }}\nNOTES:\n{{ notes }}\n";
        let document = "TODO:\n- [ ] a\nNOTES:\nline1\nline2\n";

        let appended = append_item(template, document, "notes", "new", None).expect("append");
        assert_eq!(appended, "TODO:\n- [ ] a\nNOTES:\nline1\nline2\nnew\n");
    }

    #[test]
    fn drifted_document_aborts_rotation() {
        let template = "TODO:\n{{ todo }}\nNOTES:\n{{ notes }}\n";
        let err = next_document(template, "markers edited away", &default_carry())
            .expect_err("drift");
        assert!(matches!(err, TemplateError::AnchorNotFound { .. }));
    }

    #[test]
    fn appends_items_with_optional_checkbox() {
        let template = "TODO:\n{{ todo }}\nNOTES:\n{{ notes }}\n";
        let document = "TODO:\n- [ ] a\nNOTES:\nsome text\n";

        let plain = append_item(template, document, "notes", "more", None).expect("append");
        assert_eq!(plain, "TODO:\n- [ ] a\nNOTES:\nsome text\nmore\n");

        let boxed = append_item(template, document, "todo", "b", Some(Checkbox::Checked))
            .expect("append checkbox");
        assert_eq!(boxed, "TODO:\n- [ ] a\n- [X] b\nNOTES:\nsome text\n");
    }

    #[test]
    fn append_to_unknown_section_fails() {
        let template = "TODO:\n{{ todo }}\n";
        let err = append_item(template, "TODO:\n\n", "ideas", "x", None).expect_err("unknown");
        assert_eq!(err, TemplateError::SectionNotFound("ideas".to_string()));
    }
}
