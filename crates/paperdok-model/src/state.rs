//! Per-call renderer state
//!
//! Each render call owns one [`RenderState`]. It carries the numbering
//! counters, the column cursor and the collected [`RenderReport`]; nothing
//! here is shared between calls.

use crate::labels::Label;
use crate::layout::Layout;
use crate::report::{NoteKind, RenderNote, RenderReport};
use crate::units::Twips;

/// Mutable state threaded through one render call
#[derive(Debug)]
pub struct RenderState<'a> {
    layout: &'a Layout,
    section: usize,
    tables: usize,
    figures: usize,
    subsections: usize,
    references: usize,
    /// Number of columns in the current flow region
    columns: u32,
    /// Zero-based column the cursor is in
    column: u32,
    /// Estimated distance from the top of the current column
    offset: Twips,
    page: usize,
    report: RenderReport,
}

impl<'a> RenderState<'a> {
    /// Fresh state at the top of page one, single-column front matter
    pub fn new(layout: &'a Layout) -> Self {
        Self {
            layout,
            section: 0,
            tables: 0,
            figures: 0,
            subsections: 0,
            references: 0,
            columns: 1,
            column: 0,
            offset: Twips::ZERO,
            page: 1,
            report: RenderReport::default(),
        }
    }

    /// The layout this state measures against
    pub fn layout(&self) -> &'a Layout {
        self.layout
    }

    /// Enter a section, resetting its table, figure and subsection counters
    pub fn begin_section(&mut self, index: usize) {
        self.section = index;
        self.tables = 0;
        self.figures = 0;
        self.subsections = 0;
    }

    /// Current section index, zero before the first section
    pub fn section(&self) -> usize {
        self.section
    }

    /// Number the next table in the current section
    pub fn next_table(&mut self) -> Label {
        self.tables += 1;
        Label {
            section: self.section,
            number: self.tables,
        }
    }

    /// Number the next figure in the current section
    pub fn next_figure(&mut self) -> Label {
        self.figures += 1;
        Label {
            section: self.section,
            number: self.figures,
        }
    }

    /// Number the next subsection in the current section
    pub fn next_subsection(&mut self) -> Label {
        self.subsections += 1;
        Label {
            section: self.section,
            number: self.subsections,
        }
    }

    /// Number the next entry of the reference list
    pub fn next_reference(&mut self) -> usize {
        self.references += 1;
        self.references
    }

    /// Switch the flow to `columns` columns, starting a fresh column region
    pub fn set_columns(&mut self, columns: u32) {
        self.columns = columns.max(1);
        self.column = 0;
    }

    /// Current column count
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Zero-based column index of the cursor
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Current page number, from one
    pub fn page(&self) -> usize {
        self.page
    }

    /// Width of the current flow region
    pub fn flow_width(&self) -> Twips {
        if self.columns > 1 {
            self.layout.column_width
        } else {
            self.layout.text_width()
        }
    }

    /// Advance the cursor by a block height, wrapping columns and pages
    ///
    /// A block taller than the remaining column space moves whole to the
    /// next column, matching keep-together behavior.
    pub fn advance(&mut self, height: Twips) {
        let usable = self.layout.page_height - self.layout.margin - self.layout.margin;
        if self.offset + height > usable && self.offset > Twips::ZERO {
            self.column += 1;
            if self.column >= self.columns {
                self.column = 0;
                self.page += 1;
            }
            self.offset = Twips::ZERO;
        }
        self.offset = self.offset + height;
    }

    /// Advance by an estimated height for `chars` characters of text
    ///
    /// Assumes an average glyph width of half the font size.
    pub fn advance_text(&mut self, chars: usize, font_size: Twips, line_height: Twips) {
        let glyph = (font_size.get() / 2).max(1);
        let per_line = (self.flow_width().get() / glyph).max(1) as usize;
        let lines = chars.div_ceil(per_line).max(1);
        self.advance(Twips(line_height.get() * lines as i64));
    }

    /// Record a recoverable event against a table or figure
    pub fn note(&mut self, label: Label, kind: NoteKind) {
        self.report.notes.push(RenderNote { label, kind });
    }

    /// Finish the call and hand back the report
    pub fn finish(mut self) -> RenderReport {
        self.report.estimated_pages = self.page;
        self.report
    }
}
