//! JD sections and the canonical section map.
//!
//! A job description is pre-cleaned into a small set of named sections. The
//! section set is closed and ordered; everything that iterates sections
//! (normalization, SimHash weighting) walks [`JdSection::ALL`] rather than
//! insertion order, so two maps with the same content always project the same
//! way.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The fixed set of JD sections, in canonical order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JdSection {
    Responsibilities,
    Requirements,
    Preferred,
    Etc,
}

impl JdSection {
    /// All sections in canonical order.
    pub const ALL: [JdSection; 4] = [
        JdSection::Responsibilities,
        JdSection::Requirements,
        JdSection::Preferred,
        JdSection::Etc,
    ];

    /// Stable string key, used in headers and storage.
    pub fn key(&self) -> &'static str {
        match self {
            JdSection::Responsibilities => "RESPONSIBILITIES",
            JdSection::Requirements => "REQUIREMENTS",
            JdSection::Preferred => "PREFERRED",
            JdSection::Etc => "ETC",
        }
    }
}

/// The canonical section map: section → ordered list of lines.
///
/// This is the structured representation of a JD used as input to both
/// text normalization and SimHash fingerprinting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalSections {
    sections: BTreeMap<JdSection, Vec<String>>,
}

impl CanonicalSections {
    /// Create an empty section map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the lines of a section.
    pub fn set_lines(
        mut self,
        section: JdSection,
        lines: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.sections
            .insert(section, lines.into_iter().map(Into::into).collect());
        self
    }

    /// Append a line to a section.
    pub fn push_line(&mut self, section: JdSection, line: impl Into<String>) {
        self.sections.entry(section).or_default().push(line.into());
    }

    /// Lines of a section, empty slice if absent.
    pub fn lines(&self, section: JdSection) -> &[String] {
        self.sections.get(&section).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate non-empty sections in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (JdSection, &[String])> {
        JdSection::ALL
            .into_iter()
            .map(|s| (s, self.lines(s)))
            .filter(|(_, lines)| !lines.is_empty())
    }

    /// True if no section has any lines.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Total number of lines across all sections.
    pub fn line_count(&self) -> usize {
        self.iter().map(|(_, lines)| lines.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iteration_follows_canonical_order() {
        // Insert out of order; iteration must still be canonical.
        let sections = CanonicalSections::new()
            .set_lines(JdSection::Etc, ["flexible hours"])
            .set_lines(JdSection::Responsibilities, ["build services"]);

        let order: Vec<JdSection> = sections.iter().map(|(s, _)| s).collect();
        assert_eq!(order, vec![JdSection::Responsibilities, JdSection::Etc]);
    }

    #[test]
    fn test_empty_sections_are_skipped() {
        let sections =
            CanonicalSections::new().set_lines(JdSection::Preferred, Vec::<String>::new());
        assert!(sections.is_empty());
        assert_eq!(sections.line_count(), 0);
    }

    #[test]
    fn test_serde_round_trip() {
        let sections = CanonicalSections::new()
            .set_lines(JdSection::Requirements, ["3+ years of Rust"]);

        let json = serde_json::to_string(&sections).unwrap();
        assert!(json.contains("REQUIREMENTS"));

        let back: CanonicalSections = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sections);
    }
}
