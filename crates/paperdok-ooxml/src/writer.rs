//! DOCX generation
//!
//! [`DocxRenderer`] builds a complete package from a [`Document`]: single
//! column front matter (title, author grid, abstract, index terms), then a
//! continuous section break into the two-column body.
//!
//! Every measurement comes from the shared [`Layout`]. Numbering, caption
//! wording, table normalization and figure sizing come from the model
//! helpers, so the HTML renderer produces the same structure.

use std::collections::HashMap;

use paperdok_model::labels::{self, Label};
use paperdok_model::{
    prepare_figure, ContentBlock, Document, ImageBlock, Layout, NoteKind, PreparedFigure,
    RenderOutput, RenderState, ReferenceBlock, Section, SubsectionBlock, TableBlock, TextRun,
    Twips, LAYOUT,
};
use sha2::{Digest, Sha256};

use crate::archive::{OoxmlArchive, DOCUMENT_PART, DOCUMENT_RELS_PART};
use crate::error::Result;
use crate::package::{document_rels, write_fixed_parts};
use crate::relationships::Relationships;
use crate::units::emu;
use crate::xml::{
    escape_xml, Border, Borders, Cell, Edge, Indent, Justification, Paragraph, Row, RunProps,
    SectionProps, Spacing, Table,
};

/// Renders documents to DOCX bytes
#[derive(Debug, Clone, Copy)]
pub struct DocxRenderer<'a> {
    layout: &'a Layout,
}

impl Default for DocxRenderer<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxRenderer<'static> {
    /// Renderer using the standard layout
    pub fn new() -> Self {
        Self { layout: &LAYOUT }
    }
}

impl<'a> DocxRenderer<'a> {
    /// Renderer using a custom layout table
    pub fn with_layout(layout: &'a Layout) -> Self {
        Self { layout }
    }

    /// Render a document to a DOCX package
    pub fn render(&self, doc: &Document) -> Result<RenderOutput<Vec<u8>>> {
        let mut writer = DocxWriter::new(self.layout);
        let document_xml = writer.generate_document_xml(doc);

        let mut archive = OoxmlArchive::new();
        write_fixed_parts(&mut archive, doc, self.layout);
        archive.set_string(DOCUMENT_PART, document_xml);
        archive.set_string(DOCUMENT_RELS_PART, writer.relationships.to_xml());
        for (path, data) in writer.media.drain(..) {
            archive.set(path, data);
        }

        let report = writer.state.finish();
        log::debug!(
            "Rendered DOCX: {} sections, ~{} pages, {} notes",
            doc.sections.len(),
            report.estimated_pages,
            report.notes.len()
        );
        Ok(RenderOutput {
            output: archive.to_bytes()?,
            report,
        })
    }
}

/// State of one render call
struct DocxWriter<'a> {
    layout: &'a Layout,
    state: RenderState<'a>,
    output: String,
    relationships: Relationships,
    /// Package path and bytes of each embedded image
    media: Vec<(String, Vec<u8>)>,
    /// Relationship ID of each embedded image, keyed by content hash
    media_ids: HashMap<String, String>,
    next_drawing_id: usize,
}

impl<'a> DocxWriter<'a> {
    fn new(layout: &'a Layout) -> Self {
        Self {
            layout,
            state: RenderState::new(layout),
            output: String::new(),
            relationships: document_rels(),
            media: Vec::new(),
            media_ids: HashMap::new(),
            next_drawing_id: 1,
        }
    }

    fn generate_document_xml(&mut self, doc: &Document) -> String {
        self.output.clear();
        self.output
            .push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        self.output.push('\n');
        self.output.push_str(r#"<w:document "#);
        self.output
            .push_str(r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#);
        self.output.push_str(
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
        );
        self.output.push_str(
            r#"xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" "#,
        );
        self.output
            .push_str(r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#);
        self.output
            .push_str(r#"xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">"#);
        self.output.push('\n');
        self.output.push_str("<w:body>\n");

        self.generate_front_matter(doc);

        for section in &doc.sections {
            self.generate_section(section);
        }
        self.generate_references(&doc.references);

        // body section: continuous, two columns
        self.body_section(2, true).write(&mut self.output);
        self.output.push('\n');
        self.output.push_str("</w:body>\n");
        self.output.push_str("</w:document>");

        std::mem::take(&mut self.output)
    }

    fn body_section(&self, columns: u32, continuous: bool) -> SectionProps {
        SectionProps {
            page_width: self.layout.page_width,
            page_height: self.layout.page_height,
            margin: self.layout.margin,
            columns,
            column_gap: self.layout.column_gap,
            continuous,
        }
    }

    fn font(&self, size: Twips) -> RunProps {
        RunProps::sized(self.layout.font_family, size)
    }

    fn emit(&mut self, paragraph: Paragraph) {
        paragraph.write(&mut self.output);
    }

    // ==================== Front matter ====================

    fn generate_front_matter(&mut self, doc: &Document) {
        let layout = self.layout;

        let title = self.font(layout.fonts.title).bold();
        self.emit(
            Paragraph::new()
                .justify(Justification::Center)
                .spacing(Spacing::around(Twips::ZERO, layout.spacing.title_after))
                .run(&doc.title, &title),
        );
        self.state
            .advance_text(doc.title.chars().count(), layout.fonts.title, layout.fonts.title);

        for row in doc.author_rows(layout.author_columns) {
            self.generate_author_row(row);
        }

        if !doc.abstract_text.is_empty() {
            let props = self.font(layout.fonts.abstract_text).bold();
            self.emit(
                Paragraph::new()
                    .justify(Justification::Both)
                    .spacing(Spacing::around(Twips::ZERO, layout.spacing.abstract_after))
                    .run(labels::ABSTRACT_PREFIX, &props.clone().italic())
                    .run(&doc.abstract_text, &props),
            );
            self.state.advance_text(
                doc.abstract_text.chars().count(),
                layout.fonts.abstract_text,
                layout.line_height,
            );
        }

        if !doc.keywords.is_empty() {
            let props = self.font(layout.fonts.abstract_text).bold();
            let line = doc.keyword_line();
            self.emit(
                Paragraph::new()
                    .justify(Justification::Both)
                    .spacing(Spacing::around(Twips::ZERO, layout.spacing.keywords_after))
                    .run(labels::KEYWORDS_PREFIX, &props.clone().italic())
                    .run(&line, &props),
            );
            self.state.advance_text(
                line.chars().count(),
                layout.fonts.abstract_text,
                layout.line_height,
            );
        }

        // ends the single-column front matter section
        let front = self.body_section(1, false);
        self.emit(Paragraph::new().section(front));
        self.state.set_columns(layout.column_count);
    }

    fn generate_author_row(&mut self, row: &[paperdok_model::Author]) {
        let layout = self.layout;
        let width = layout.author_cell_width();
        let none = Borders::uniform(&Edge::GRID, &Border::nil());

        let mut cells = Vec::new();
        let mut tallest = 0;
        for author in row {
            let mut paragraphs = vec![Paragraph::new()
                .justify(Justification::Center)
                .run(&author.name, &self.font(layout.fonts.author_name).bold())];
            for line in &author.affiliation {
                paragraphs.push(
                    Paragraph::new()
                        .justify(Justification::Center)
                        .run(line, &self.font(layout.fonts.affiliation).italic()),
                );
            }
            if !author.email.is_empty() {
                paragraphs.push(
                    Paragraph::new()
                        .justify(Justification::Center)
                        .run(&author.email, &self.font(layout.fonts.email)),
                );
            }
            tallest = tallest.max(paragraphs.len());
            cells.push(Cell {
                width,
                borders: Borders::default(),
                paragraphs,
            });
        }

        let table = Table {
            justification: Some(Justification::Center),
            borders: none,
            cell_margin: layout.table.cell_margin,
            grid: vec![width; cells.len()],
            rows: vec![Row {
                header: false,
                cant_split: true,
                cells,
            }],
        };
        table.write(&mut self.output);
        self.emit(
            Paragraph::new().spacing(Spacing::around(Twips::ZERO, layout.spacing.author_row_after)),
        );
        self.state.advance(Twips(
            layout.line_height.get() * tallest as i64 + layout.spacing.author_row_after.get(),
        ));
    }

    // ==================== Body ====================

    fn generate_section(&mut self, section: &Section) {
        let layout = self.layout;
        self.state.begin_section(section.index);

        let heading = labels::section_heading(section.index, &section.heading);
        self.emit(
            Paragraph::new()
                .justify(Justification::Center)
                .spacing(Spacing::around(
                    layout.spacing.heading_before,
                    layout.spacing.heading_after,
                ))
                .keep_next()
                .outline_level(0)
                .run(&heading, &self.font(layout.fonts.heading).bold()),
        );
        self.state
            .advance(layout.spacing.heading_before + layout.line_height);

        for block in section.ordered_blocks() {
            self.generate_block(&block.content);
        }
    }

    fn generate_block(&mut self, block: &ContentBlock) {
        match block {
            ContentBlock::Text(text) => {
                for paragraph in &text.paragraphs {
                    self.generate_body_paragraph(paragraph);
                }
            }
            ContentBlock::Table(table) => self.generate_table(table),
            ContentBlock::Image(image) => self.generate_image(image),
            ContentBlock::Reference(reference) => self.generate_reference_block(reference),
            ContentBlock::Subsection(subsection) => self.generate_subsection(subsection),
        }
    }

    fn run_props(&self, run: &TextRun, size: Twips) -> RunProps {
        let mut props = self.font(size).letter_spacing(self.layout.letter_spacing);
        props.bold = run.bold;
        props.italic = run.italic;
        props.underline = run.underline;
        props
    }

    fn generate_body_paragraph(&mut self, runs: &[TextRun]) {
        let layout = self.layout;
        let mut paragraph = Paragraph::new().justify(Justification::Both).spacing(
            Spacing::around(Twips::ZERO, layout.spacing.body_after).exact_line(layout.line_height),
        );
        let mut chars = 0;
        for run in runs {
            chars += run.text.chars().count();
            paragraph = paragraph.run(&run.text, &self.run_props(run, layout.fonts.body));
        }
        self.emit(paragraph);
        self.state
            .advance_text(chars, layout.fonts.body, layout.line_height);
        self.state.advance(layout.spacing.body_after);
    }

    fn generate_subsection(&mut self, subsection: &SubsectionBlock) {
        let layout = self.layout;
        let label = self.state.next_subsection();
        let heading = labels::subsection_heading(label, &subsection.title);
        self.emit(
            Paragraph::new()
                .justify(Justification::Left)
                .spacing(Spacing::around(
                    layout.spacing.subheading_before,
                    layout.spacing.subheading_after,
                ))
                .keep_next()
                .outline_level(1)
                .run(&heading, &self.font(layout.fonts.subheading).bold()),
        );
        self.state
            .advance(layout.spacing.subheading_before + layout.line_height);

        for paragraph in &subsection.paragraphs {
            self.generate_body_paragraph(paragraph);
        }
    }

    fn generate_table(&mut self, block: &TableBlock) {
        let layout = self.layout;
        let label = self.state.next_table();
        let table = block.normalize();
        if table.synthesized() {
            log::warn!(
                "Table {} is incomplete ({}), placeholder content synthesized",
                label,
                table
                    .fixes
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            self.state.note(
                label,
                NoteKind::TablePlaceholder {
                    fixes: table.fixes.clone(),
                },
            );
        }

        let caption = labels::table_caption(label, block.caption.as_deref());
        self.emit(
            Paragraph::new()
                .justify(Justification::Center)
                .spacing(Spacing::around(
                    layout.spacing.table_caption_before,
                    layout.spacing.table_caption_after,
                ))
                .keep_next()
                .keep_lines()
                .run(&caption, &self.font(layout.fonts.caption).bold()),
        );

        let line = Border::single(layout.table.border_width, layout.table.border_color);
        let cell_borders = Borders::uniform(&Edge::OUTER, &line);
        let width = layout.table_column_width(table.columns());

        let cell = |text: &str, props: &RunProps| Cell {
            width,
            borders: cell_borders.clone(),
            paragraphs: vec![Paragraph::new()
                .justify(Justification::Center)
                .run(text, props)],
        };

        let header_props = self.font(layout.fonts.table_header).bold();
        let cell_props = self.font(layout.fonts.table_cell);

        let mut rows = vec![Row {
            header: true,
            cant_split: true,
            cells: table.headers.iter().map(|h| cell(h, &header_props)).collect(),
        }];
        for data in &table.rows {
            rows.push(Row {
                header: false,
                cant_split: true,
                cells: data.iter().map(|c| cell(c, &cell_props)).collect(),
            });
        }

        Table {
            justification: Some(Justification::Center),
            borders: Borders::uniform(&Edge::GRID, &line),
            cell_margin: layout.table.cell_margin,
            grid: vec![width; table.columns()],
            rows,
        }
        .write(&mut self.output);

        // keeps consecutive tables apart
        self.emit(Paragraph::new().spacing(Spacing::around(Twips::ZERO, layout.spacing.table_after)));

        let row_count = table.rows.len() as i64 + 1;
        self.state.advance(Twips(
            layout.spacing.table_caption_before.get()
                + layout.line_height.get() * (row_count + 1)
                + layout.spacing.table_after.get(),
        ));
    }

    fn generate_image(&mut self, image: &ImageBlock) {
        let layout = self.layout;
        let label = self.state.next_figure();

        let figure_paragraph = Paragraph::new()
            .justify(Justification::Center)
            .spacing(Spacing::around(
                layout.spacing.figure_lead_in,
                layout.spacing.figure_trailing,
            ))
            .keep_next()
            .keep_lines();

        let height = match prepare_figure(image, layout) {
            Ok(figure) => {
                let drawing = self.embed_figure(label, &figure);
                self.emit(figure_paragraph.raw_run(&drawing));
                figure.height
            }
            Err(e) => {
                log::warn!("Figure {} replaced by placeholder: {}", label, e);
                let reason = e.to_string();
                let text = labels::image_placeholder(&reason);
                self.emit(figure_paragraph.run(&text, &self.font(layout.fonts.body).italic()));
                self.state.note(label, NoteKind::ImagePlaceholder { reason });
                layout.line_height
            }
        };

        let caption = labels::figure_caption(label, image.caption.as_deref());
        self.emit(
            Paragraph::new()
                .justify(Justification::Center)
                .spacing(Spacing::around(Twips::ZERO, layout.spacing.caption_after))
                .keep_lines()
                .run(&caption, &self.font(layout.fonts.caption).bold()),
        );

        self.state.advance(
            layout.spacing.figure_lead_in
                + height
                + layout.spacing.figure_trailing
                + layout.line_height
                + layout.spacing.caption_after,
        );
    }

    /// Store the image bytes and return the `w:drawing` run content
    ///
    /// Identical image data is stored once and shared between drawings.
    fn embed_figure(&mut self, label: Label, figure: &PreparedFigure) -> String {
        let hash = content_hash(&figure.data);
        let rel_id = match self.media_ids.get(&hash) {
            Some(id) => id.clone(),
            None => {
                let index = self.media.len() + 1;
                let file_name = format!("image{}.{}", index, figure.format.extension());
                let id = self
                    .relationships
                    .add(format!("media/{}", file_name), Relationships::TYPE_IMAGE);
                self.media
                    .push((format!("word/media/{}", file_name), figure.data.clone()));
                self.media_ids.insert(hash, id.clone());
                id
            }
        };

        let drawing_id = self.next_drawing_id;
        self.next_drawing_id += 1;
        let name = format!("Figure {}", label);

        drawing_xml(
            drawing_id,
            &rel_id,
            &name,
            emu(figure.width),
            emu(figure.height),
        )
    }

    fn reference_paragraph(&self) -> Paragraph {
        let layout = self.layout;
        Paragraph::new()
            .justify(Justification::Both)
            .spacing(
                Spacing::around(layout.spacing.reference_before, layout.spacing.reference_after)
                    .exact_line(layout.reference_line_height),
            )
            .indent(Indent::hanging(layout.reference_indent))
    }

    fn generate_reference_block(&mut self, reference: &ReferenceBlock) {
        let layout = self.layout;
        let text = reference.text.trim();
        if text.is_empty() {
            return;
        }
        let paragraph = self
            .reference_paragraph()
            .run(text, &self.font(layout.fonts.reference));
        self.emit(paragraph);
        self.state.advance_text(
            text.chars().count(),
            layout.fonts.reference,
            layout.reference_line_height,
        );
    }

    fn generate_references(&mut self, references: &[String]) {
        let layout = self.layout;
        let entries: Vec<&str> = references
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .collect();
        if entries.is_empty() {
            return;
        }

        self.emit(
            Paragraph::new()
                .justify(Justification::Center)
                .spacing(Spacing::around(
                    layout.spacing.heading_before,
                    layout.spacing.heading_after,
                ))
                .keep_next()
                .outline_level(0)
                .run(labels::REFERENCES_HEADING, &self.font(layout.fonts.heading).bold()),
        );
        self.state
            .advance(layout.spacing.heading_before + layout.line_height);

        for entry in entries {
            let number = self.state.next_reference();
            let text = labels::reference_entry(number, entry);
            let paragraph = self
                .reference_paragraph()
                .run(&text, &self.font(layout.fonts.reference));
            self.emit(paragraph);
            self.state.advance_text(
                text.chars().count(),
                layout.fonts.reference,
                layout.reference_line_height,
            );
        }
    }
}

/// SHA-256 of media content
fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let result = hasher.finalize();
    format!(
        "sha256:{}",
        result.iter().map(|b| format!("{:02x}", b)).collect::<String>()
    )
}

/// Inline picture markup for a `w:r`
fn drawing_xml(id: usize, rel_id: &str, name: &str, cx: i64, cy: i64) -> String {
    let name = escape_xml(name);
    let mut xml = String::new();
    xml.push_str("<w:drawing>");
    xml.push_str(r#"<wp:inline distT="0" distB="0" distL="0" distR="0">"#);
    xml.push_str(&format!(r#"<wp:extent cx="{}" cy="{}"/>"#, cx, cy));
    xml.push_str(r#"<wp:effectExtent l="0" t="0" r="0" b="0"/>"#);
    xml.push_str(&format!(r#"<wp:docPr id="{}" name="{}"/>"#, id, name));
    xml.push_str(r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks noChangeAspect="1"/></wp:cNvGraphicFramePr>"#);
    xml.push_str(r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#);
    xml.push_str("<pic:pic>");
    xml.push_str(&format!(
        r#"<pic:nvPicPr><pic:cNvPr id="{}" name="{}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
        id, name
    ));
    xml.push_str(&format!(
        r#"<pic:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
        escape_xml(rel_id)
    ));
    xml.push_str(&format!(
        r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr>"#,
        cx, cy
    ));
    xml.push_str("</pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing>");
    xml
}
