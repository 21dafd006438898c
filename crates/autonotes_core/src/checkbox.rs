//! Checkbox line classifier.
//!
//! Matching is substring based, so list prefixes (`-`, `*`, `1.`) and
//! mid-line markers are all accepted without a line grammar.

const CHECKBOX_MARKERS: &[&str] = &["[ ]", "[]", "[X]", "[x]"];
const CHECKED_MARKERS: &[&str] = &["[X]", "[x]"];

/// Returns whether the line contains any checkbox marker.
pub fn is_checkbox_line(line: &str) -> bool {
    CHECKBOX_MARKERS.iter().any(|marker| line.contains(marker))
}

/// Returns whether the line carries a checked checkbox.
pub fn is_checked(line: &str) -> bool {
    is_checkbox_line(line) && CHECKED_MARKERS.iter().any(|marker| line.contains(marker))
}

/// Drops checked lines from section content, keeping everything else verbatim.
pub fn retain_unfinished(content: &str) -> String {
    content
        .split('\n')
        .filter(|line| !is_checked(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Checkbox prefix for appended items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkbox {
    Unchecked,
    Checked,
}

impl Checkbox {
    /// Maps CLI-style flags to an optional checkbox; `checked` alone is ignored.
    pub fn from_flags(checkbox: bool, checked: bool) -> Option<Self> {
        match (checkbox, checked) {
            (false, _) => None,
            (true, false) => Some(Self::Unchecked),
            (true, true) => Some(Self::Checked),
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            Self::Unchecked => "[ ]",
            Self::Checked => "[X]",
        }
    }

    /// Renders `item` as a list line, e.g. `- [ ] item`.
    pub fn decorate(self, item: &str) -> String {
        format!("- {} {item}", self.marker())
    }
}

#[cfg(test)]
mod tests {
    use super::{is_checkbox_line, is_checked, retain_unfinished, Checkbox};

    #[test]
    fn classifies_lines() {
        let cases = [
            ("- [x] done", true, true),
            ("- [X] Done", true, true),
            ("- [ ] pending", true, false),
            ("- [] pending", true, false),
            ("* [x] star prefix", true, true),
            ("1. [ ] numbered", true, false),
            ("text with [x] in the middle", true, true),
            ("plain text", false, false),
            ("[y] not a box", false, false),
            ("", false, false),
        ];

        for (line, checkbox, checked) in cases {
            assert_eq!(is_checkbox_line(line), checkbox, "is_checkbox_line({line:?})");
            assert_eq!(is_checked(line), checked, "is_checked({line:?})");
        }
    }

    #[test]
    fn retain_unfinished_drops_only_checked_lines() {
        let content = "- [ ] a\n- [x] b\nplain\n- [X] c\n";
        assert_eq!(retain_unfinished(content), "- [ ] a\nplain\n");
    }

    #[test]
    fn retain_unfinished_keeps_text_without_checkboxes() {
        assert_eq!(retain_unfinished("some text"), "some text");
        assert_eq!(retain_unfinished(""), "");
    }

    #[test]
    fn checkbox_flags_and_rendering() {
        assert_eq!(Checkbox::from_flags(false, true), None);
        assert_eq!(
            Checkbox::from_flags(true, false).map(|b| b.decorate("ship it")),
            Some("- [ ] ship it".to_string())
        );
        assert_eq!(
            Checkbox::from_flags(true, true).map(|b| b.decorate("shipped")),
            Some("- [X] shipped".to_string())
        );
    }
}
