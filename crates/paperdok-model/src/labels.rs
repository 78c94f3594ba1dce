//! Display text for numbered elements
//!
//! Both renderers take heading, caption and reference text from here so
//! their wording cannot drift apart.

use std::fmt;

use serde::Serialize;

/// Abstract lead-in
pub const ABSTRACT_PREFIX: &str = "Abstract\u{2014}";

/// Keyword lead-in
pub const KEYWORDS_PREFIX: &str = "Index Terms\u{2014}";

/// Heading above the reference list
pub const REFERENCES_HEADING: &str = "REFERENCES";

/// A `{section}.{count}` number assigned at render time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Label {
    pub section: usize,
    pub number: usize,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section, self.number)
    }
}

/// `1. INTRODUCTION`
pub fn section_heading(index: usize, heading: &str) -> String {
    let heading = heading.trim();
    if heading.is_empty() {
        format!("{}.", index)
    } else {
        format!("{}. {}", index, heading.to_uppercase())
    }
}

/// `1.2 Experimental Setup`
pub fn subsection_heading(label: Label, title: &str) -> String {
    let title = title.trim();
    if title.is_empty() {
        label.to_string()
    } else {
        format!("{} {}", label, title)
    }
}

/// `TABLE 1.2: RESULTS`, defaulting to `Data Table {n}`
pub fn table_caption(label: Label, caption: Option<&str>) -> String {
    let text = caption
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Data Table {}", label.number));
    format!("TABLE {}: {}", label, text.to_uppercase())
}

/// `FIG. 1.1: SYSTEM OVERVIEW`, or `FIG. 1.1` without a caption
pub fn figure_caption(label: Label, caption: Option<&str>) -> String {
    match caption.map(str::trim).filter(|c| !c.is_empty()) {
        Some(text) => format!("FIG. {}: {}", label, text.to_uppercase()),
        None => format!("FIG. {}", label),
    }
}

/// `[3] A. Author, "Title," ...`
pub fn reference_entry(number: usize, text: &str) -> String {
    format!("[{}] {}", number, text.trim())
}

/// Placeholder text substituted for an image that cannot be drawn
pub fn image_placeholder(reason: &str) -> String {
    format!("[Image unavailable: {}]", reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    const L12: Label = Label {
        section: 1,
        number: 2,
    };

    #[test]
    fn test_section_heading() {
        assert_eq!(section_heading(2, "Related work"), "2. RELATED WORK");
        assert_eq!(section_heading(3, "  "), "3.");
    }

    #[test]
    fn test_table_caption_default() {
        assert_eq!(table_caption(L12, Some("Results")), "TABLE 1.2: RESULTS");
        assert_eq!(table_caption(L12, None), "TABLE 1.2: DATA TABLE 2");
        assert_eq!(table_caption(L12, Some(" ")), "TABLE 1.2: DATA TABLE 2");
    }

    #[test]
    fn test_figure_caption() {
        assert_eq!(figure_caption(L12, Some("Overview")), "FIG. 1.2: OVERVIEW");
        assert_eq!(figure_caption(L12, None), "FIG. 1.2");
    }

    #[test]
    fn test_subsection_and_reference() {
        assert_eq!(subsection_heading(L12, "Setup"), "1.2 Setup");
        assert_eq!(reference_entry(4, " Knuth, TAOCP "), "[4] Knuth, TAOCP");
    }
}
