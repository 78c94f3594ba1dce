//! Section content blocks
//!
//! Content is a tagged variant. Sequence comes only from the declared
//! `order` key of each [`SectionBlock`], never from block type adjacency.

use serde::{Deserialize, Serialize};

use crate::inline::TextRun;

/// Sort key assigned to blocks that arrive without an `order`
pub const DEFAULT_ORDER: i64 = i64::MAX;

/// A content block together with its sort key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionBlock {
    /// Declared sort key
    pub order: i64,
    /// The block content
    pub content: ContentBlock,
}

/// Content block variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    /// Body text, one or more paragraphs
    Text(TextBlock),
    /// A data table
    Table(TableBlock),
    /// An image with its caption
    Image(ImageBlock),
    /// An inline reference entry
    Reference(ReferenceBlock),
    /// A second-level heading with optional body text
    Subsection(SubsectionBlock),
}

impl ContentBlock {
    /// Short name of the variant, used in logs and reports
    pub fn kind(&self) -> &'static str {
        match self {
            ContentBlock::Text(_) => "text",
            ContentBlock::Table(_) => "table",
            ContentBlock::Image(_) => "image",
            ContentBlock::Reference(_) => "reference",
            ContentBlock::Subsection(_) => "subsection",
        }
    }
}

/// Paragraphs of formatted runs
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextBlock {
    pub paragraphs: Vec<Vec<TextRun>>,
}

impl TextBlock {
    /// Plain text of all paragraphs, separated by blank lines
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.iter().map(|r| r.text.as_str()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Table data as supplied by the caller
///
/// Headers and rows may be empty; renderers go through
/// [`crate::table::NormalizedTable`] before emitting anything.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableBlock {
    /// Column headers
    pub headers: Vec<String>,
    /// Row data
    pub rows: Vec<Vec<String>>,
    /// Caption or table name
    pub caption: Option<String>,
}

/// Figure size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    Small,
    #[default]
    Medium,
    Large,
}

impl SizeClass {
    /// Parse a size class name, falling back to medium
    ///
    /// `very-small` is accepted as an alias for small.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "small" | "very-small" => SizeClass::Small,
            "large" => SizeClass::Large,
            _ => SizeClass::Medium,
        }
    }
}

/// An image block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageBlock {
    /// Encoded image bytes (PNG, JPEG)
    #[serde(skip)]
    pub data: Vec<u8>,
    /// Declared MIME type, if any
    pub mime_type: Option<String>,
    /// Requested size class
    pub size: SizeClass,
    /// Figure caption
    pub caption: Option<String>,
}

/// An inline reference entry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReferenceBlock {
    pub text: String,
}

/// Second-level heading block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubsectionBlock {
    /// Heading text without numbering
    pub title: String,
    /// Body paragraphs following the heading
    pub paragraphs: Vec<Vec<TextRun>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_class_parse() {
        assert_eq!(SizeClass::parse("small"), SizeClass::Small);
        assert_eq!(SizeClass::parse("very-small"), SizeClass::Small);
        assert_eq!(SizeClass::parse(" LARGE "), SizeClass::Large);
        assert_eq!(SizeClass::parse("huge"), SizeClass::Medium);
    }

    #[test]
    fn test_block_kind() {
        let block = ContentBlock::Table(TableBlock::default());
        assert_eq!(block.kind(), "table");
    }

    #[test]
    fn test_block_serialization_tag() {
        let block = ContentBlock::Reference(ReferenceBlock {
            text: "A. Author, Paper".to_string(),
        });
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "reference");
        assert_eq!(json["text"], "A. Author, Paper");
    }
}
