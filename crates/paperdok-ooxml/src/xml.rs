//! Typed WordprocessingML fragments
//!
//! Small value types that serialize into `w:` markup. Each type writes its
//! children in the order the schema requires, so callers can set
//! properties in any order without producing a file Word rejects.

use paperdok_model::inline::is_xml_char;
use paperdok_model::Twips;

use crate::units::{border_eighths, half_points};

/// Escape special XML characters
///
/// Characters outside the XML 1.0 `Char` production are dropped.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars().filter(|&c| is_xml_char(c)) {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Alias of [`escape_xml`] for attribute values
pub fn escape_attr(text: &str) -> String {
    escape_xml(text)
}

/// Paragraph alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justification {
    Left,
    Center,
    Right,
    /// Justified on both edges
    Both,
}

impl Justification {
    pub fn as_str(self) -> &'static str {
        match self {
            Justification::Left => "left",
            Justification::Center => "center",
            Justification::Right => "right",
            Justification::Both => "both",
        }
    }

    /// Parse a `w:jc` value
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "left" | "start" => Some(Justification::Left),
            "center" => Some(Justification::Center),
            "right" | "end" => Some(Justification::Right),
            "both" | "distribute" => Some(Justification::Both),
            _ => None,
        }
    }
}

/// How `w:line` is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRule {
    Auto,
    Exact,
    AtLeast,
}

impl LineRule {
    fn as_str(self) -> &'static str {
        match self {
            LineRule::Auto => "auto",
            LineRule::Exact => "exact",
            LineRule::AtLeast => "atLeast",
        }
    }
}

/// `w:spacing` on a paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Spacing {
    pub before: Option<Twips>,
    pub after: Option<Twips>,
    pub line: Option<(Twips, LineRule)>,
}

impl Spacing {
    /// Space before and after
    pub fn around(before: Twips, after: Twips) -> Self {
        Self {
            before: Some(before),
            after: Some(after),
            line: None,
        }
    }

    /// Set an exact line pitch
    pub fn exact_line(mut self, line: Twips) -> Self {
        self.line = Some((line, LineRule::Exact));
        self
    }

    fn write(&self, out: &mut String) {
        out.push_str("<w:spacing");
        if let Some(before) = self.before {
            out.push_str(&format!(" w:before=\"{}\"", before.get()));
        }
        if let Some(after) = self.after {
            out.push_str(&format!(" w:after=\"{}\"", after.get()));
        }
        if let Some((line, rule)) = self.line {
            out.push_str(&format!(
                " w:line=\"{}\" w:lineRule=\"{}\"",
                line.get(),
                rule.as_str()
            ));
        }
        out.push_str("/>");
    }
}

/// `w:ind` on a paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Indent {
    pub left: Option<Twips>,
    pub right: Option<Twips>,
    pub hanging: Option<Twips>,
    pub first_line: Option<Twips>,
}

impl Indent {
    /// Left indent with the first line pulled back by the same amount
    pub fn hanging(amount: Twips) -> Self {
        Self {
            left: Some(amount),
            hanging: Some(amount),
            ..Default::default()
        }
    }

    fn write(&self, out: &mut String) {
        out.push_str("<w:ind");
        if let Some(left) = self.left {
            out.push_str(&format!(" w:left=\"{}\"", left.get()));
        }
        if let Some(right) = self.right {
            out.push_str(&format!(" w:right=\"{}\"", right.get()));
        }
        // hanging and firstLine are mutually exclusive
        if let Some(hanging) = self.hanging {
            out.push_str(&format!(" w:hanging=\"{}\"", hanging.get()));
        } else if let Some(first) = self.first_line {
            out.push_str(&format!(" w:firstLine=\"{}\"", first.get()));
        }
        out.push_str("/>");
    }
}

/// Border line style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderStyle {
    Single,
    Nil,
}

impl BorderStyle {
    fn as_str(self) -> &'static str {
        match self {
            BorderStyle::Single => "single",
            BorderStyle::Nil => "nil",
        }
    }
}

/// One border line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Border {
    pub style: BorderStyle,
    pub width: Twips,
    /// Six hex digits
    pub color: String,
}

impl Border {
    /// A solid line
    pub fn single(width: Twips, color: &str) -> Self {
        Self {
            style: BorderStyle::Single,
            width,
            color: color.to_string(),
        }
    }

    /// No line
    pub fn nil() -> Self {
        Self {
            style: BorderStyle::Nil,
            width: Twips::ZERO,
            color: "auto".to_string(),
        }
    }

    fn write(&self, out: &mut String, edge: Edge) {
        match self.style {
            BorderStyle::Nil => {
                out.push_str(&format!("<w:{} w:val=\"nil\"/>", edge.as_str()));
            }
            BorderStyle::Single => {
                out.push_str(&format!(
                    "<w:{} w:val=\"{}\" w:sz=\"{}\" w:space=\"0\" w:color=\"{}\"/>",
                    edge.as_str(),
                    self.style.as_str(),
                    border_eighths(self.width),
                    escape_attr(&self.color)
                ));
            }
        }
    }
}

/// Border edge, in schema order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Edge {
    Top,
    Left,
    Bottom,
    Right,
    InsideH,
    InsideV,
}

impl Edge {
    fn as_str(self) -> &'static str {
        match self {
            Edge::Top => "top",
            Edge::Left => "left",
            Edge::Bottom => "bottom",
            Edge::Right => "right",
            Edge::InsideH => "insideH",
            Edge::InsideV => "insideV",
        }
    }

    /// The four outer edges
    pub const OUTER: [Edge; 4] = [Edge::Top, Edge::Left, Edge::Bottom, Edge::Right];

    /// Outer edges plus inner grid lines
    pub const GRID: [Edge; 6] = [
        Edge::Top,
        Edge::Left,
        Edge::Bottom,
        Edge::Right,
        Edge::InsideH,
        Edge::InsideV,
    ];
}

/// A set of borders (`w:tblBorders`, `w:tcBorders`)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Borders {
    edges: Vec<(Edge, Border)>,
}

impl Borders {
    /// The same border on each of `edges`
    pub fn uniform(edges: &[Edge], border: &Border) -> Self {
        let mut borders = Self::default();
        for edge in edges {
            borders.set(*edge, border.clone());
        }
        borders
    }

    /// Set one edge, replacing any existing border on it
    pub fn set(&mut self, edge: Edge, border: Border) {
        self.edges.retain(|(e, _)| *e != edge);
        self.edges.push((edge, border));
        self.edges.sort_by_key(|(e, _)| *e);
    }

    /// Border on an edge
    pub fn get(&self, edge: Edge) -> Option<&Border> {
        self.edges.iter().find(|(e, _)| *e == edge).map(|(_, b)| b)
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    fn write(&self, out: &mut String, element: &str) {
        if self.edges.is_empty() {
            return;
        }
        out.push_str(&format!("<w:{}>", element));
        for (edge, border) in &self.edges {
            border.write(out, *edge);
        }
        out.push_str(&format!("</w:{}>", element));
    }
}

/// Run formatting
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunProps {
    pub font: Option<&'static str>,
    pub bold: bool,
    pub italic: bool,
    /// Character spacing adjustment
    pub spacing: Option<Twips>,
    pub size: Option<Twips>,
    pub underline: bool,
}

impl RunProps {
    /// Plain text at `size` in `font`
    pub fn sized(font: &'static str, size: Twips) -> Self {
        Self {
            font: Some(font),
            size: Some(size),
            ..Default::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn letter_spacing(mut self, spacing: Twips) -> Self {
        self.spacing = Some(spacing);
        self
    }

    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn write(&self, out: &mut String) {
        if self.is_empty() {
            return;
        }
        out.push_str("<w:rPr>");
        if let Some(font) = self.font {
            let font = escape_attr(font);
            out.push_str(&format!(
                "<w:rFonts w:ascii=\"{0}\" w:hAnsi=\"{0}\" w:cs=\"{0}\"/>",
                font
            ));
        }
        if self.bold {
            out.push_str("<w:b/>");
        }
        if self.italic {
            out.push_str("<w:i/>");
        }
        if let Some(spacing) = self.spacing {
            out.push_str(&format!("<w:spacing w:val=\"{}\"/>", spacing.get()));
        }
        if let Some(size) = self.size {
            let hp = half_points(size);
            out.push_str(&format!("<w:sz w:val=\"{0}\"/><w:szCs w:val=\"{0}\"/>", hp));
        }
        if self.underline {
            out.push_str("<w:u w:val=\"single\"/>");
        }
        out.push_str("</w:rPr>");
    }
}

/// Section layout (`w:sectPr`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionProps {
    pub page_width: Twips,
    pub page_height: Twips,
    pub margin: Twips,
    pub columns: u32,
    pub column_gap: Twips,
    /// Start on the same page as the previous section
    pub continuous: bool,
}

impl SectionProps {
    pub fn write(&self, out: &mut String) {
        out.push_str("<w:sectPr>");
        if self.continuous {
            out.push_str("<w:type w:val=\"continuous\"/>");
        }
        out.push_str(&format!(
            "<w:pgSz w:w=\"{}\" w:h=\"{}\"/>",
            self.page_width.get(),
            self.page_height.get()
        ));
        let m = self.margin.get();
        out.push_str(&format!(
            "<w:pgMar w:top=\"{0}\" w:right=\"{0}\" w:bottom=\"{0}\" w:left=\"{0}\" w:header=\"720\" w:footer=\"720\" w:gutter=\"0\"/>",
            m
        ));
        out.push_str(&format!(
            "<w:cols w:num=\"{}\" w:space=\"{}\"/>",
            self.columns.max(1),
            self.column_gap.get()
        ));
        out.push_str("</w:sectPr>");
    }
}

/// A paragraph under construction
#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    keep_next: bool,
    keep_lines: bool,
    spacing: Option<Spacing>,
    indent: Option<Indent>,
    justification: Option<Justification>,
    outline_level: Option<u8>,
    section: Option<SectionProps>,
    runs: String,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn justify(mut self, justification: Justification) -> Self {
        self.justification = Some(justification);
        self
    }

    pub fn spacing(mut self, spacing: Spacing) -> Self {
        self.spacing = Some(spacing);
        self
    }

    pub fn indent(mut self, indent: Indent) -> Self {
        self.indent = Some(indent);
        self
    }

    /// Keep on the same page as the next paragraph
    pub fn keep_next(mut self) -> Self {
        self.keep_next = true;
        self
    }

    /// Never split this paragraph across pages or columns
    pub fn keep_lines(mut self) -> Self {
        self.keep_lines = true;
        self
    }

    pub fn outline_level(mut self, level: u8) -> Self {
        self.outline_level = Some(level);
        self
    }

    /// End a section at this paragraph
    pub fn section(mut self, props: SectionProps) -> Self {
        self.section = Some(props);
        self
    }

    /// Append a text run; `\n` becomes a line break
    pub fn run(mut self, text: &str, props: &RunProps) -> Self {
        self.runs.push_str("<w:r>");
        props.write(&mut self.runs);
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.runs.push_str("<w:br/>");
            }
            if !line.is_empty() {
                self.runs.push_str(&format!(
                    "<w:t xml:space=\"preserve\">{}</w:t>",
                    escape_xml(line)
                ));
            }
        }
        self.runs.push_str("</w:r>");
        self
    }

    /// Append a run wrapping pre-built run content such as a drawing
    pub fn raw_run(mut self, content: &str) -> Self {
        self.runs.push_str("<w:r>");
        self.runs.push_str(content);
        self.runs.push_str("</w:r>");
        self
    }

    fn has_props(&self) -> bool {
        self.keep_next
            || self.keep_lines
            || self.spacing.is_some()
            || self.indent.is_some()
            || self.justification.is_some()
            || self.outline_level.is_some()
            || self.section.is_some()
    }

    pub fn write(&self, out: &mut String) {
        out.push_str("<w:p>");
        if self.has_props() {
            out.push_str("<w:pPr>");
            if self.keep_next {
                out.push_str("<w:keepNext/>");
            }
            if self.keep_lines {
                out.push_str("<w:keepLines/>");
            }
            if let Some(spacing) = &self.spacing {
                spacing.write(out);
            }
            if let Some(indent) = &self.indent {
                indent.write(out);
            }
            if let Some(jc) = self.justification {
                out.push_str(&format!("<w:jc w:val=\"{}\"/>", jc.as_str()));
            }
            if let Some(level) = self.outline_level {
                out.push_str(&format!("<w:outlineLvl w:val=\"{}\"/>", level));
            }
            if let Some(section) = &self.section {
                section.write(out);
            }
            out.push_str("</w:pPr>");
        }
        out.push_str(&self.runs);
        out.push_str("</w:p>\n");
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write(&mut out);
        out
    }
}

/// A table cell
#[derive(Debug, Clone, Default)]
pub struct Cell {
    pub width: Twips,
    pub borders: Borders,
    pub paragraphs: Vec<Paragraph>,
}

impl Cell {
    fn write(&self, out: &mut String) {
        out.push_str("<w:tc><w:tcPr>");
        out.push_str(&format!(
            "<w:tcW w:w=\"{}\" w:type=\"dxa\"/>",
            self.width.get()
        ));
        self.borders.write(out, "tcBorders");
        out.push_str("<w:vAlign w:val=\"center\"/>");
        out.push_str("</w:tcPr>");
        if self.paragraphs.is_empty() {
            // a cell must hold at least one paragraph
            out.push_str("<w:p/>");
        }
        for paragraph in &self.paragraphs {
            paragraph.write(out);
        }
        out.push_str("</w:tc>\n");
    }
}

/// A table row
#[derive(Debug, Clone, Default)]
pub struct Row {
    /// Repeat as header row on each page
    pub header: bool,
    pub cant_split: bool,
    pub cells: Vec<Cell>,
}

impl Row {
    fn write(&self, out: &mut String) {
        out.push_str("<w:tr>");
        if self.header || self.cant_split {
            out.push_str("<w:trPr>");
            if self.cant_split {
                out.push_str("<w:cantSplit/>");
            }
            if self.header {
                out.push_str("<w:tblHeader/>");
            }
            out.push_str("</w:trPr>");
        }
        for cell in &self.cells {
            cell.write(out);
        }
        out.push_str("</w:tr>\n");
    }
}

/// A fixed-layout table
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub justification: Option<Justification>,
    pub borders: Borders,
    pub cell_margin: Twips,
    /// Column widths
    pub grid: Vec<Twips>,
    pub rows: Vec<Row>,
}

impl Table {
    /// Sum of the grid widths
    pub fn width(&self) -> Twips {
        Twips(self.grid.iter().map(|w| w.get()).sum())
    }

    pub fn write(&self, out: &mut String) {
        out.push_str("<w:tbl>\n<w:tblPr>");
        out.push_str(&format!(
            "<w:tblW w:w=\"{}\" w:type=\"dxa\"/>",
            self.width().get()
        ));
        if let Some(jc) = self.justification {
            out.push_str(&format!("<w:jc w:val=\"{}\"/>", jc.as_str()));
        }
        self.borders.write(out, "tblBorders");
        out.push_str("<w:tblLayout w:type=\"fixed\"/>");
        let m = self.cell_margin.get();
        out.push_str(&format!(
            "<w:tblCellMar><w:top w:w=\"0\" w:type=\"dxa\"/><w:left w:w=\"{0}\" w:type=\"dxa\"/><w:bottom w:w=\"0\" w:type=\"dxa\"/><w:right w:w=\"{0}\" w:type=\"dxa\"/></w:tblCellMar>",
            m
        ));
        out.push_str("</w:tblPr>\n<w:tblGrid>");
        for width in &self.grid {
            out.push_str(&format!("<w:gridCol w:w=\"{}\"/>", width.get()));
        }
        out.push_str("</w:tblGrid>\n");
        for row in &self.rows {
            row.write(out);
        }
        out.push_str("</w:tbl>\n");
    }
}
