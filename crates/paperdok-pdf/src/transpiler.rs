//! DOCX flow to Typst markup transpiler
//!
//! Works from the flow read back out of a generated DOCX, so the local PDF
//! is laid out from exactly what the DOCX says: paragraph alignment, keep
//! flags, spacing, tables and pictures, and the section breaks that switch
//! between single-column front matter and the two-column body.
//!
//! Text is always emitted as Typst string literals in code mode, never as
//! raw markup, so user text cannot be misread as markup syntax.

use std::fmt::Write as _;

use paperdok_model::{Layout, Twips};
use paperdok_ooxml::{
    DocxContent, FlowBlock, FlowCell, FlowImage, FlowParagraph, FlowRun, FlowTable, Justification,
};

/// Converts a read-back DOCX into a Typst document
#[derive(Debug, Clone, Copy)]
pub struct Transpiler<'a> {
    layout: &'a Layout,
}

impl<'a> Transpiler<'a> {
    pub fn new(layout: &'a Layout) -> Self {
        Self { layout }
    }

    /// Transpile a whole document
    pub fn transpile(&self, content: &DocxContent) -> String {
        let mut output = self.preamble();
        let mut region = String::new();

        for block in &content.flow.blocks {
            match block {
                FlowBlock::Paragraph(p) => region.push_str(&self.paragraph(p, content)),
                FlowBlock::Table(t) => region.push_str(&self.table(t, content)),
                FlowBlock::SectionEnd { columns } => {
                    output.push_str(&self.region(&region, *columns));
                    region.clear();
                }
            }
        }
        if !region.is_empty() {
            output.push_str(&self.region(&region, 1));
        }

        output
    }

    fn preamble(&self) -> String {
        let l = self.layout;
        let mut out = String::new();
        let _ = writeln!(
            out,
            "#set page(width: {}, height: {}, margin: {})",
            pt(l.page_width),
            pt(l.page_height),
            pt(l.margin)
        );
        let _ = writeln!(
            out,
            "#set text(font: \"{}\", size: {}, hyphenate: true, lang: \"en\")",
            escape_str(l.font_family),
            pt(l.fonts.body)
        );
        // leading is the gap between lines, not the line pitch
        let _ = writeln!(
            out,
            "#set par(justify: true, leading: {}, spacing: 0pt)",
            pt(l.line_height - l.fonts.body)
        );
        out.push_str("#set block(above: 0pt, below: 0pt)\n\n");
        out
    }

    /// Content laid out in `columns` columns
    fn region(&self, content: &str, columns: u32) -> String {
        if columns > 1 {
            format!(
                "#columns({}, gutter: {})[\n{}]\n",
                columns,
                pt(self.layout.column_gap),
                content
            )
        } else {
            content.to_string()
        }
    }

    fn paragraph(&self, p: &FlowParagraph, content: &DocxContent) -> String {
        let before = p.space_before.unwrap_or(Twips::ZERO);
        let after = p.space_after.unwrap_or(Twips::ZERO);

        if p.is_empty() {
            let gap = before + after;
            return if gap.get() > 0 {
                format!("#v({})\n", pt(gap))
            } else {
                String::new()
            };
        }

        let body = if p.images.is_empty() {
            self.runs(&p.runs)
        } else {
            p.images
                .iter()
                .map(|img| image(img, content))
                .collect::<Vec<_>>()
                .join("")
        };

        let mut settings = String::new();
        match p.justification {
            Some(Justification::Both) | None => {}
            Some(_) => settings.push_str("#set par(justify: false)\n"),
        }
        if let Some(hanging) = p.hanging {
            let _ = writeln!(settings, "#set par(hanging-indent: {})", pt(hanging));
        }

        let mut out = format!(
            "#block(width: 100%, above: {}, below: {}, breakable: {}, sticky: {})[\n{}",
            pt(before),
            pt(after),
            !p.keep_lines,
            p.keep_next,
            settings
        );
        match align(p.justification) {
            Some(a) => {
                let _ = writeln!(out, "#align({})[{}]", a, body);
            }
            None => {
                out.push_str(&body);
                out.push('\n');
            }
        }
        out.push_str("]\n");
        out
    }

    fn runs(&self, runs: &[FlowRun]) -> String {
        runs.iter().map(|r| format!("#{}", run(r))).collect()
    }

    fn table(&self, table: &FlowTable, content: &DocxContent) -> String {
        let columns = table
            .grid
            .len()
            .max(table.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0));
        if columns == 0 {
            return String::new();
        }

        let widths = if table.grid.len() == columns {
            table.grid.iter().map(|w| pt(*w)).collect::<Vec<_>>().join(", ")
        } else {
            vec!["1fr"; columns].join(", ")
        };
        let stroke = if table.bordered() {
            format!(
                "{} + rgb(\"#{}\")",
                pt(self.layout.table.border_width),
                self.layout.table.border_color
            )
        } else {
            "none".to_string()
        };

        let mut out = String::new();
        let _ = writeln!(
            out,
            "#align(center)[#table(\n  columns: ({},),\n  stroke: {},\n  inset: (x: {}, y: 2pt),\n  align: center + horizon,",
            widths,
            stroke,
            pt(self.layout.table.cell_margin)
        );

        let header_rows: Vec<_> = table.rows.iter().take_while(|r| r.header).collect();
        if !header_rows.is_empty() {
            out.push_str("  table.header(\n");
            for row in &header_rows {
                for cell in &row.cells {
                    let _ = writeln!(out, "    [{}],", self.cell(cell, content));
                }
            }
            out.push_str("  ),\n");
        }
        for row in table.rows.iter().skip(header_rows.len()) {
            for cell in &row.cells {
                let _ = writeln!(out, "  [{}],", self.cell(cell, content));
            }
            // short rows are padded so the grid stays aligned
            for _ in row.cells.len()..columns {
                out.push_str("  [],\n");
            }
        }
        out.push_str(")]\n");
        out
    }

    fn cell(&self, cell: &FlowCell, content: &DocxContent) -> String {
        cell.paragraphs
            .iter()
            .map(|p| {
                if p.images.is_empty() {
                    self.runs(&p.runs)
                } else {
                    p.images.iter().map(|i| image(i, content)).collect()
                }
            })
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("#linebreak()")
    }
}

/// A run as a Typst code expression
fn run(run: &FlowRun) -> String {
    let mut expr = String::new();
    for (i, line) in run.text.split('\n').enumerate() {
        if i > 0 {
            expr.push_str(" + linebreak() + ");
        }
        let _ = write!(expr, "[#\"{}\"]", escape_str(line));
    }
    if expr.contains(" + ") {
        expr = format!("({})", expr);
    }
    match (run.size, run.spacing) {
        (Some(size), Some(tracking)) => {
            expr = format!("text(size: {}, tracking: {}, {})", pt(size), pt(tracking), expr)
        }
        (Some(size), None) => expr = format!("text(size: {}, {})", pt(size), expr),
        (None, Some(tracking)) => expr = format!("text(tracking: {}, {})", pt(tracking), expr),
        (None, None) => {}
    }
    if run.underline {
        expr = format!("underline({})", expr);
    }
    if run.italic {
        expr = format!("emph({})", expr);
    }
    if run.bold {
        expr = format!("strong({})", expr);
    }
    expr
}

fn image(img: &FlowImage, content: &DocxContent) -> String {
    match content.image(&img.rel_id) {
        Some(data) => format!(
            "#image(bytes(({})), width: {}, height: {})",
            data.iter()
                .map(u8::to_string)
                .collect::<Vec<_>>()
                .join(","),
            pt(img.width),
            pt(img.height)
        ),
        None => {
            log::warn!("Picture {} has no image part, drawing an empty box", img.rel_id);
            format!("#box(width: {}, height: {})", pt(img.width), pt(img.height))
        }
    }
}

fn align(justification: Option<Justification>) -> Option<&'static str> {
    match justification {
        Some(Justification::Center) => Some("center"),
        Some(Justification::Right) => Some("right"),
        Some(Justification::Left) => Some("left"),
        Some(Justification::Both) | None => None,
    }
}

/// Twips as Typst points
fn pt(length: Twips) -> String {
    let text = format!("{:.2}", length.as_points());
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "-0" | "" => "0pt".to_string(),
        other => format!("{}pt", other),
    }
}

/// Escape text for a Typst string literal
fn escape_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\t' => out.push_str("\\t"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}
