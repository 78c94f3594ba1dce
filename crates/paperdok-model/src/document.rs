//! Document root, authors and sections

use serde::{Deserialize, Serialize};

use crate::block::{ContentBlock, SectionBlock};

/// A complete paper, built fresh for each generation call
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    /// Paper title
    pub title: String,
    /// Authors in byline order
    pub authors: Vec<Author>,
    /// Abstract text, empty when absent
    pub abstract_text: String,
    /// Index terms
    pub keywords: Vec<String>,
    /// Numbered body sections
    pub sections: Vec<Section>,
    /// Closing reference list
    pub references: Vec<String>,
}

impl Document {
    /// Authors grouped into byline rows of at most `per_row`
    pub fn author_rows(&self, per_row: usize) -> impl Iterator<Item = &[Author]> {
        self.authors.chunks(per_row.max(1))
    }

    /// Keywords joined for display
    pub fn keyword_line(&self) -> String {
        self.keywords.join(", ")
    }

    /// Author names, comma separated
    pub fn author_names(&self) -> String {
        self.authors
            .iter()
            .map(|a| a.name.as_str())
            .filter(|n| !n.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One author entry
///
/// Missing affiliation or email render blank; the author is never dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    /// Affiliation lines in display order
    pub affiliation: Vec<String>,
    pub email: String,
}

/// A numbered section
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Section {
    /// 1-based position in the document
    pub index: usize,
    /// Heading text as supplied
    pub heading: String,
    /// Blocks in input order
    pub blocks: Vec<SectionBlock>,
}

impl Section {
    /// Blocks in render order
    ///
    /// Sorted by `order`; the sort is stable so equal keys keep their input
    /// position.
    pub fn ordered_blocks(&self) -> Vec<&SectionBlock> {
        let mut blocks: Vec<&SectionBlock> = self.blocks.iter().collect();
        blocks.sort_by_key(|b| b.order);
        blocks
    }

    /// Number of table blocks
    pub fn table_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b.content, ContentBlock::Table(_)))
            .count()
    }

    /// Number of image blocks
    pub fn figure_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b.content, ContentBlock::Image(_)))
            .count()
    }
}
