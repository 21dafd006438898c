//! Section boundary records.
//!
//! # Responsibility
//! - Hold the anchor text that surrounds one `{{ name }}` marker.
//! - Keep sections in first-occurrence order for downstream rewriting.
//!
//! # Invariants
//! - `Sections` never holds two entries with the same name.
//! - Iteration order equals marker order in the template.

use serde::Serialize;

/// Anchor record for one named template marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionBoundary {
    /// Trimmed marker name, e.g. `todo` for `{{ todo }}`.
    pub name: String,
    /// Literal template text between the previous marker (or start) and this one.
    pub before: String,
    /// Literal template text between this marker and the next one (or end).
    pub after: String,
    /// Marker text exactly as written in the template.
    pub marker: String,
    /// Last marker of the template: `after` runs to the end of the text, so
    /// it resolves to its last occurrence instead of its first.
    pub ends_template: bool,
}

impl SectionBoundary {
    pub fn new(
        name: impl Into<String>,
        before: impl Into<String>,
        after: impl Into<String>,
        marker: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            before: before.into(),
            after: after.into(),
            marker: marker.into(),
            ends_template: false,
        }
    }

    /// Marks the boundary as belonging to the template's last marker.
    pub fn ending_template(mut self) -> Self {
        self.ends_template = true;
        self
    }
}

/// A boundary paired with the live text it currently encloses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedSection {
    pub boundary: SectionBoundary,
    pub content: String,
}

impl MatchedSection {
    pub fn name(&self) -> &str {
        self.boundary.name.as_str()
    }
}

/// Insertion-ordered association list keyed by section name.
///
/// Templates hold a handful of sections, so linear lookup is fine and keeps
/// ordering explicit instead of incidental.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sections<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for Sections<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> Sections<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry, returning it back when the name is already taken.
    pub fn try_push(&mut self, name: impl Into<String>, value: T) -> Result<(), (String, T)> {
        let name = name.into();
        if self.contains(name.as_str()) {
            return Err((name, value));
        }
        self.entries.push((name, value));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(key, _)| key == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::Sections;

    #[test]
    fn keeps_insertion_order() {
        let mut sections = Sections::new();
        sections.try_push("b", 1).expect("first insert");
        sections.try_push("a", 2).expect("second insert");
        sections.try_push("c", 3).expect("third insert");

        let names: Vec<&str> = sections.names().collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(sections.get("a"), Some(&2));
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut sections = Sections::new();
        sections.try_push("todo", 1).expect("first insert");
        let (name, value) = sections.try_push("todo", 2).expect_err("duplicate");
        assert_eq!(name, "todo");
        assert_eq!(value, 2);
        assert_eq!(sections.len(), 1);
    }
}
