//! Reading generated DOCX packages back
//!
//! The local PDF path needs the laid-out flow of a DOCX: paragraphs with
//! their alignment, keep flags and runs, tables, inline pictures and the
//! section breaks that switch column counts. [`FlowDocument::parse`]
//! recovers exactly that from `word/document.xml`; styles are not resolved.

use std::collections::HashMap;

use paperdok_model::Twips;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::archive::OoxmlArchive;
use crate::error::{OoxmlError, Result};
use crate::relationships::Relationships;
use crate::units::{twips_from_emu, twips_from_half_points};
use crate::xml::Justification;

/// A formatted text run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowRun {
    /// Text, with `\n` for line breaks
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub size: Option<Twips>,
    /// Character spacing (`w:spacing` in the run properties)
    pub spacing: Option<Twips>,
}

/// An inline picture
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowImage {
    /// Relationship ID of the image part
    pub rel_id: String,
    pub width: Twips,
    pub height: Twips,
}

/// A paragraph and its direct formatting
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowParagraph {
    pub justification: Option<Justification>,
    pub keep_next: bool,
    pub keep_lines: bool,
    pub space_before: Option<Twips>,
    pub space_after: Option<Twips>,
    /// Hanging indent
    pub hanging: Option<Twips>,
    pub runs: Vec<FlowRun>,
    pub images: Vec<FlowImage>,
}

impl FlowParagraph {
    /// Concatenated run text
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Whether the paragraph has neither text nor pictures
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.runs.iter().all(|r| r.text.trim().is_empty())
    }
}

/// A table cell
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowCell {
    pub paragraphs: Vec<FlowParagraph>,
    /// Whether the cell declares its own borders
    pub bordered: bool,
}

impl FlowCell {
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(FlowParagraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A table row
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowRow {
    pub header: bool,
    pub cells: Vec<FlowCell>,
}

/// A table
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowTable {
    /// Grid column widths
    pub grid: Vec<Twips>,
    pub rows: Vec<FlowRow>,
}

impl FlowTable {
    /// Whether any cell draws a border
    pub fn bordered(&self) -> bool {
        self.rows.iter().flat_map(|r| &r.cells).any(|c| c.bordered)
    }
}

/// Top-level flow content
#[derive(Debug, Clone, PartialEq)]
pub enum FlowBlock {
    Paragraph(FlowParagraph),
    Table(FlowTable),
    /// End of a section laid out in `columns` columns
    SectionEnd { columns: u32 },
}

/// Body content of a DOCX in document order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowDocument {
    pub blocks: Vec<FlowBlock>,
}

impl FlowDocument {
    /// Parse `word/document.xml`
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(false);

        let mut parser = FlowParser::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => parser.open(e),
                Ok(Event::Empty(ref e)) => {
                    parser.open(e);
                    parser.close(e.local_name().as_ref());
                }
                Ok(Event::End(ref e)) => parser.close(e.local_name().as_ref()),
                Ok(Event::Text(ref e)) => {
                    if parser.in_text {
                        if let Some(run) = parser.run.as_mut() {
                            let text = e.unescape().unwrap_or_default();
                            run.text.push_str(&text);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(FlowDocument {
            blocks: parser.blocks,
        })
    }

    /// All top-level paragraphs
    pub fn paragraphs(&self) -> impl Iterator<Item = &FlowParagraph> {
        self.blocks.iter().filter_map(|b| match b {
            FlowBlock::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    /// All tables
    pub fn tables(&self) -> impl Iterator<Item = &FlowTable> {
        self.blocks.iter().filter_map(|b| match b {
            FlowBlock::Table(t) => Some(t),
            _ => None,
        })
    }
}

/// Event-driven parse state
#[derive(Default)]
struct FlowParser {
    blocks: Vec<FlowBlock>,
    in_body: bool,
    paragraph: Option<FlowParagraph>,
    run: Option<FlowRun>,
    in_run_props: bool,
    in_text: bool,
    image: Option<FlowImage>,
    table: Option<FlowTable>,
    row: Option<FlowRow>,
    cell: Option<FlowCell>,
    in_cell_props: bool,
    /// Column count of the `w:sectPr` being read
    section: Option<u32>,
    /// Section ended by the current paragraph
    pending_section: Option<u32>,
}

impl FlowParser {
    fn open(&mut self, e: &BytesStart) {
        match e.local_name().as_ref() {
            b"body" => self.in_body = true,
            b"p" if self.in_body => self.paragraph = Some(FlowParagraph::default()),
            b"r" if self.paragraph.is_some() => self.run = Some(FlowRun::default()),
            b"rPr" => self.in_run_props = true,
            b"t" if self.run.is_some() => self.in_text = true,
            b"br" => {
                if let Some(run) = self.run.as_mut() {
                    run.text.push('\n');
                }
            }
            b"tab" if self.run.is_some() && !self.in_run_props => {
                if let Some(run) = self.run.as_mut() {
                    run.text.push('\t');
                }
            }
            b"b" if self.in_run_props => {
                if let Some(run) = self.run.as_mut() {
                    run.bold = toggle_on(e);
                }
            }
            b"i" if self.in_run_props => {
                if let Some(run) = self.run.as_mut() {
                    run.italic = toggle_on(e);
                }
            }
            b"u" if self.in_run_props => {
                if let Some(run) = self.run.as_mut() {
                    run.underline = attr(e, b"val").map_or(true, |v| v != "none");
                }
            }
            b"sz" if self.in_run_props => {
                if let (Some(run), Some(size)) = (self.run.as_mut(), int_attr(e, b"val")) {
                    run.size = Some(twips_from_half_points(size));
                }
            }
            b"keepNext" => {
                if let Some(p) = self.paragraph.as_mut() {
                    p.keep_next = toggle_on(e);
                }
            }
            b"keepLines" => {
                if let Some(p) = self.paragraph.as_mut() {
                    p.keep_lines = toggle_on(e);
                }
            }
            b"spacing" if self.in_run_props => {
                if let (Some(run), Some(spacing)) = (self.run.as_mut(), int_attr(e, b"val")) {
                    run.spacing = Some(Twips(spacing));
                }
            }
            b"spacing" => {
                if let Some(p) = self.paragraph.as_mut() {
                    p.space_before = int_attr(e, b"before").map(Twips);
                    p.space_after = int_attr(e, b"after").map(Twips);
                }
            }
            b"ind" => {
                if let Some(p) = self.paragraph.as_mut() {
                    p.hanging = int_attr(e, b"hanging").map(Twips);
                }
            }
            b"jc" => {
                if let Some(p) = self.paragraph.as_mut() {
                    p.justification = attr(e, b"val").and_then(|v| Justification::parse(&v));
                }
            }
            b"drawing" if self.paragraph.is_some() => self.image = Some(FlowImage::default()),
            b"extent" => {
                if let Some(image) = self.image.as_mut() {
                    image.width = int_attr(e, b"cx").map(twips_from_emu).unwrap_or_default();
                    image.height = int_attr(e, b"cy").map(twips_from_emu).unwrap_or_default();
                }
            }
            b"blip" => {
                if let (Some(image), Some(id)) = (self.image.as_mut(), attr(e, b"embed")) {
                    image.rel_id = id;
                }
            }
            b"tbl" if self.in_body => self.table = Some(FlowTable::default()),
            b"gridCol" => {
                if let (Some(table), Some(width)) = (self.table.as_mut(), int_attr(e, b"w")) {
                    table.grid.push(Twips(width));
                }
            }
            b"tr" if self.table.is_some() => self.row = Some(FlowRow::default()),
            b"tblHeader" => {
                if let Some(row) = self.row.as_mut() {
                    row.header = toggle_on(e);
                }
            }
            b"tc" if self.row.is_some() => self.cell = Some(FlowCell::default()),
            b"tcPr" => self.in_cell_props = true,
            b"top" | b"left" | b"bottom" | b"right" if self.in_cell_props => {
                let drawn = attr(e, b"val").is_some_and(|v| v != "nil" && v != "none");
                if let Some(cell) = self.cell.as_mut() {
                    cell.bordered |= drawn;
                }
            }
            b"sectPr" => self.section = Some(1),
            b"cols" => {
                if let Some(columns) = self.section.as_mut() {
                    *columns = int_attr(e, b"num").map(|n| n.max(1) as u32).unwrap_or(1);
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"body" => self.in_body = false,
            b"t" => self.in_text = false,
            b"rPr" => self.in_run_props = false,
            b"tcPr" => self.in_cell_props = false,
            b"r" => {
                if let (Some(run), Some(p)) = (self.run.take(), self.paragraph.as_mut()) {
                    if !run.text.is_empty() {
                        p.runs.push(run);
                    }
                }
            }
            b"drawing" => {
                if let (Some(image), Some(p)) = (self.image.take(), self.paragraph.as_mut()) {
                    if !image.rel_id.is_empty() {
                        p.images.push(image);
                    }
                }
            }
            b"p" => {
                let Some(paragraph) = self.paragraph.take() else {
                    return;
                };
                if let Some(cell) = self.cell.as_mut() {
                    cell.paragraphs.push(paragraph);
                } else if self.table.is_none() {
                    self.blocks.push(FlowBlock::Paragraph(paragraph));
                }
                if let Some(columns) = self.pending_section.take() {
                    self.blocks.push(FlowBlock::SectionEnd { columns });
                }
            }
            b"tc" => {
                if let (Some(cell), Some(row)) = (self.cell.take(), self.row.as_mut()) {
                    row.cells.push(cell);
                }
            }
            b"tr" => {
                if let (Some(row), Some(table)) = (self.row.take(), self.table.as_mut()) {
                    table.rows.push(row);
                }
            }
            b"tbl" => {
                if let Some(table) = self.table.take() {
                    self.blocks.push(FlowBlock::Table(table));
                }
            }
            b"sectPr" => {
                if let Some(columns) = self.section.take() {
                    if self.paragraph.is_some() {
                        self.pending_section = Some(columns);
                    } else {
                        self.blocks.push(FlowBlock::SectionEnd { columns });
                    }
                }
            }
            _ => {}
        }
    }
}

/// A DOCX unpacked for conversion: its flow plus embedded images
#[derive(Debug, Clone, Default)]
pub struct DocxContent {
    pub flow: FlowDocument,
    /// Image bytes keyed by relationship ID
    pub images: HashMap<String, Vec<u8>>,
}

impl DocxContent {
    /// Read DOCX bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let archive = OoxmlArchive::from_bytes(bytes)?;
        Self::from_archive(&archive)
    }

    /// Read an unpacked package
    pub fn from_archive(archive: &OoxmlArchive) -> Result<Self> {
        let flow = FlowDocument::parse(archive.document_xml()?)?;

        let mut images = HashMap::new();
        if let Some(rels_xml) = archive.document_rels_xml() {
            let rels = Relationships::parse(rels_xml)?;
            for (id, rel) in rels.iter() {
                if !rels.is_image(id) {
                    continue;
                }
                let path = format!("word/{}", rel.target.trim_start_matches('/'));
                match archive.get(&path) {
                    Some(data) => {
                        images.insert(id.to_string(), data.to_vec());
                    }
                    None => log::warn!("Image relationship {} points at missing part {}", id, path),
                }
            }
        }

        Ok(Self { flow, images })
    }

    /// Bytes of the image behind a relationship ID
    pub fn image(&self, rel_id: &str) -> Option<&[u8]> {
        self.images.get(rel_id).map(Vec::as_slice)
    }
}

fn attr(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.local_name().as_ref() == name)
        .and_then(|a| String::from_utf8(a.value.to_vec()).ok())
}

fn int_attr(e: &BytesStart, name: &[u8]) -> Option<i64> {
    attr(e, name).and_then(|v| v.parse().ok())
}

/// On/off property: present means on unless `w:val` says otherwise
fn toggle_on(e: &BytesStart) -> bool {
    attr(e, b"val").map_or(true, |v| v != "0" && v != "false" && v != "off")
}
