//! Section parser.
//!
//! Splits template text on `{{ name }}` markers and records, for every
//! marker, the literal text on either side of it.

use super::{TemplateError, TemplateResult};
use crate::model::section::{SectionBoundary, Sections};
use once_cell::sync::Lazy;
use regex::Regex;

static MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*(\w*)\s*\}\}").expect("valid marker regex"));

/// Parses template text into boundaries ordered by first marker occurrence.
///
/// # Errors
/// - `AdjacentMarkers` when two markers have no text between them.
/// - `DuplicateSection` when a name is used by more than one marker.
pub fn parse_template(template: &str) -> TemplateResult<Sections<SectionBoundary>> {
    // (marker text, name, start, end) for every marker in order.
    let markers: Vec<(&str, &str, usize, usize)> = MARKER_RE
        .captures_iter(template)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1).map_or("", |m| m.as_str());
            Some((whole.as_str(), name.trim(), whole.start(), whole.end()))
        })
        .collect();

    let mut sections = Sections::new();
    for (index, &(marker, name, start, end)) in markers.iter().enumerate() {
        let before_start = match index {
            0 => 0,
            _ => markers[index - 1].3,
        };
        let after_end = markers.get(index + 1).map_or(template.len(), |next| next.2);

        if index > 0 && before_start == start {
            return Err(TemplateError::AdjacentMarkers {
                first: markers[index - 1].0.to_string(),
                second: marker.to_string(),
            });
        }

        let mut boundary = SectionBoundary::new(
            name,
            &template[before_start..start],
            &template[end..after_end],
            marker,
        );
        if index + 1 == markers.len() {
            boundary = boundary.ending_template();
        }
        sections
            .try_push(name, boundary)
            .map_err(|(name, _)| TemplateError::DuplicateSection(name))?;
    }

    Ok(sections)
}

/// Strips every marker from the template, leaving a blank document.
pub fn remove_template_tags(template: &str) -> String {
    MARKER_RE.replace_all(template, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::{parse_template, remove_template_tags};
    use crate::template::TemplateError;

    #[test]
    fn parses_before_and_after_anchors() {
        let sections = parse_template("TODO:\n{{ todo }}\nNOTES:\n{{notes}}\n").expect("parse");

        let names: Vec<&str> = sections.names().collect();
        assert_eq!(names, vec!["todo", "notes"]);

        let todo = sections.get("todo").expect("todo section");
        assert_eq!(todo.before, "TODO:\n");
        assert_eq!(todo.after, "\nNOTES:\n");
        assert_eq!(todo.marker, "{{ todo }}");

        let notes = sections.get("notes").expect("notes section");
        assert_eq!(notes.before, "\nNOTES:\n");
        assert_eq!(notes.after, "\n");
        assert_eq!(notes.marker, "{{notes}}");
    }

    #[test]
    fn template_without_markers_is_empty() {
        let sections = parse_template("just some text\n").expect("parse");
        assert!(sections.is_empty());
    }

    #[test]
    fn blank_marker_name_is_accepted() {
        let sections = parse_template("a{{   }}b").expect("parse");
        let blank = sections.get("").expect("blank section");
        assert_eq!(blank.before, "a");
        assert_eq!(blank.after, "b");
    }

    #[test]
    fn malformed_markers_stay_plain_text() {
        let sections = parse_template("a {{ open } b {{ two words }} c {{ ok }} d").expect("parse");
        assert_eq!(sections.len(), 1);
        let ok = sections.get("ok").expect("ok section");
        assert_eq!(ok.before, "a {{ open } b {{ two words }} c ");
    }

    #[test]
    fn markers_on_one_line_are_split_individually() {
        let sections = parse_template("[{{ a }}|{{ b }}]").expect("parse");
        assert_eq!(sections.get("a").expect("a").after, "|");
        assert_eq!(sections.get("b").expect("b").before, "|");
    }

    #[test]
    fn rejects_adjacent_markers() {
        let err = parse_template("x{{ a }}{{ b }}y").expect_err("adjacent markers");
        assert_eq!(
            err,
            TemplateError::AdjacentMarkers {
                first: "{{ a }}".to_string(),
                second: "{{ b }}".to_string(),
            }
        );
    }

    #[test]
    fn rejects_duplicate_section_names() {
        let err = parse_template("a{{ todo }}b{{todo}}c").expect_err("duplicate");
        assert_eq!(err, TemplateError::DuplicateSection("todo".to_string()));
    }

    #[test]
    fn marker_at_edges_yields_empty_anchors() {
        let sections = parse_template("{{ head }}\n---\n{{ tail }}").expect("parse");
        assert_eq!(sections.get("head").expect("head").before, "");
        assert_eq!(sections.get("tail").expect("tail").after, "");
    }

    #[test]
    fn only_the_last_marker_ends_the_template() {
        let sections = parse_template("TODO:\n{{ todo }}\nNOTES:\n{{ notes }}\n").expect("parse");
        assert!(!sections.get("todo").expect("todo").ends_template);
        assert!(sections.get("notes").expect("notes").ends_template);
    }

    #[test]
    fn removes_all_marker_text() {
        let fresh = remove_template_tags("TODO:\n{{ todo }}\nNOTES:\n{{notes}}\n");
        assert_eq!(fresh, "TODO:\n\nNOTES:\n\n");
    }
}
