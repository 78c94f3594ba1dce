//! Shared layout-constant table
//!
//! The single source of every measurement used by the renderers. The
//! DOCX and HTML renderers both read [`LAYOUT`]; neither carries its own
//! numeric constants.

use serde::Serialize;

use crate::block::SizeClass;
use crate::units::Twips;

/// Font sizes keyed by content role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FontTable {
    pub title: Twips,
    pub author_name: Twips,
    pub affiliation: Twips,
    pub email: Twips,
    pub abstract_text: Twips,
    pub heading: Twips,
    pub subheading: Twips,
    pub body: Twips,
    pub caption: Twips,
    pub table_header: Twips,
    pub table_cell: Twips,
    pub reference: Twips,
}

/// Paragraph spacing keyed by content role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpacingTable {
    pub title_after: Twips,
    pub author_row_after: Twips,
    pub abstract_after: Twips,
    pub keywords_after: Twips,
    pub heading_before: Twips,
    pub heading_after: Twips,
    pub subheading_before: Twips,
    pub subheading_after: Twips,
    pub body_after: Twips,
    /// Space above an image, inside its own flow unit
    pub figure_lead_in: Twips,
    /// Space between an image and its caption
    pub figure_trailing: Twips,
    pub caption_after: Twips,
    pub table_caption_before: Twips,
    pub table_caption_after: Twips,
    pub table_after: Twips,
    pub reference_before: Twips,
    pub reference_after: Twips,
}

/// Table drawing parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableStyle {
    /// Border stroke width on every cell edge
    pub border_width: Twips,
    /// Border color as six hex digits
    pub border_color: &'static str,
    pub cell_margin: Twips,
}

/// Figure sizing limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FigureLimits {
    pub small: Twips,
    pub medium: Twips,
    pub large: Twips,
    /// Maximum width as a percentage of the column width
    pub max_width_percent: i64,
    pub max_height: Twips,
    /// Source pixel density above which images are resampled
    pub max_dpi: u32,
}

/// The fixed academic two-column layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Layout {
    pub font_family: &'static str,
    pub page_width: Twips,
    pub page_height: Twips,
    pub margin: Twips,
    pub column_count: u32,
    pub column_width: Twips,
    pub column_gap: Twips,
    /// Exact line pitch for body text
    pub line_height: Twips,
    /// Exact line pitch for reference entries
    pub reference_line_height: Twips,
    pub reference_indent: Twips,
    /// Character spacing applied to justified body text
    pub letter_spacing: Twips,
    /// Authors per byline row
    pub author_columns: usize,
    pub fonts: FontTable,
    pub spacing: SpacingTable,
    pub table: TableStyle,
    pub figure: FigureLimits,
}

/// The layout every renderer uses
pub static LAYOUT: Layout = Layout {
    font_family: "Times New Roman",
    page_width: Twips(12240),
    page_height: Twips(15840),
    margin: Twips(1080),
    column_count: 2,
    column_width: Twips(4860),
    column_gap: Twips(360),
    line_height: Twips(240),
    reference_line_height: Twips(200),
    reference_indent: Twips(360),
    letter_spacing: Twips(-2),
    author_columns: 3,
    fonts: FontTable {
        title: Twips::from_points(24),
        author_name: Twips::from_points(10),
        affiliation: Twips::from_points(10),
        email: Twips::from_points(9),
        abstract_text: Twips::from_points(9),
        heading: Twips::from_points(10),
        subheading: Twips::from_points(10),
        body: Twips::from_points(10),
        caption: Twips::from_points(9),
        table_header: Twips::from_points(9),
        table_cell: Twips::from_points(9),
        reference: Twips::from_points(9),
    },
    spacing: SpacingTable {
        title_after: Twips(240),
        author_row_after: Twips(200),
        abstract_after: Twips(120),
        keywords_after: Twips(240),
        heading_before: Twips(240),
        heading_after: Twips(0),
        subheading_before: Twips(120),
        subheading_after: Twips(0),
        body_after: Twips(120),
        figure_lead_in: Twips(240),
        figure_trailing: Twips(120),
        caption_after: Twips(240),
        table_caption_before: Twips(240),
        table_caption_after: Twips(120),
        table_after: Twips(240),
        reference_before: Twips(60),
        reference_after: Twips(0),
    },
    table: TableStyle {
        border_width: Twips(20),
        border_color: "000000",
        cell_margin: Twips(108),
    },
    figure: FigureLimits {
        small: Twips(2016),
        medium: Twips(2880),
        large: Twips(4320),
        max_width_percent: 90,
        max_height: Twips(5760),
        max_dpi: 300,
    },
};

impl Layout {
    /// Width between the left and right margins
    pub fn text_width(&self) -> Twips {
        self.page_width - self.margin - self.margin
    }

    /// Widest an image may be drawn inside one column
    pub fn figure_max_width(&self) -> Twips {
        self.column_width.scale(self.figure.max_width_percent, 100)
    }

    /// Target width for a figure size class
    pub fn figure_width(&self, size: SizeClass) -> Twips {
        let target = match size {
            SizeClass::Small => self.figure.small,
            SizeClass::Medium => self.figure.medium,
            SizeClass::Large => self.figure.large,
        };
        target.min(self.figure_max_width())
    }

    /// Width of each grid column for a table of `columns` columns
    ///
    /// The grid always fits one text column, however many columns the
    /// table has.
    pub fn table_column_width(&self, columns: usize) -> Twips {
        Twips(self.column_width.get() / columns.max(1) as i64)
    }

    /// Width of one cell in an author row
    ///
    /// Cells sit edge to edge; a full row spans the text width and a
    /// shorter row is centered.
    pub fn author_cell_width(&self) -> Twips {
        Twips(self.text_width().get() / self.author_columns.max(1) as i64)
    }
}
