//! HTML generation
//!
//! The page is one self-contained file: the stylesheet is inlined and
//! figures are embedded as `data:` URLs. Structure follows the DOCX
//! renderer block for block, taking numbering, caption text, table
//! normalization and figure sizing from the same model helpers.

use std::fmt::Write as _;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use paperdok_model::inline::is_xml_char;
use paperdok_model::labels;
use paperdok_model::{
    prepare_figure, Author, ContentBlock, Document, ImageBlock, Layout, NoteKind, RenderOutput,
    RenderState, ReferenceBlock, Section, SubsectionBlock, TableBlock, TextRun, Twips, LAYOUT,
};

use crate::css::{css_length, stylesheet, CssUnit};

/// Renders documents to a single HTML page
#[derive(Debug, Clone, Copy)]
pub struct HtmlRenderer<'a> {
    layout: &'a Layout,
}

impl Default for HtmlRenderer<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlRenderer<'static> {
    pub fn new() -> Self {
        Self { layout: &LAYOUT }
    }
}

impl<'a> HtmlRenderer<'a> {
    pub fn with_layout(layout: &'a Layout) -> Self {
        Self { layout }
    }

    /// Render a document to an HTML string
    ///
    /// Never fails: incomplete tables and undrawable images are replaced
    /// by placeholders and listed in the report.
    pub fn render(&self, doc: &Document) -> RenderOutput<String> {
        let mut writer = HtmlWriter::new(self.layout);
        writer.generate_page(doc);

        let report = writer.state.finish();
        log::debug!(
            "Rendered HTML: {} sections, ~{} pages, {} notes",
            doc.sections.len(),
            report.estimated_pages,
            report.notes.len()
        );
        RenderOutput {
            output: writer.output,
            report,
        }
    }
}

struct HtmlWriter<'a> {
    layout: &'a Layout,
    state: RenderState<'a>,
    output: String,
}

impl<'a> HtmlWriter<'a> {
    fn new(layout: &'a Layout) -> Self {
        Self {
            layout,
            state: RenderState::new(layout),
            output: String::new(),
        }
    }

    fn line(&mut self, text: &str) {
        self.output.push_str(text);
        self.output.push('\n');
    }

    fn generate_page(&mut self, doc: &Document) {
        let title = html_escape(&doc.title);
        let _ = write!(
            self.output,
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<meta name="generator" content="paperdok {version}">
<meta name="author" content="{author}">
<meta name="keywords" content="{keywords}">
<title>{title}</title>
<style>
{css}</style>
</head>
<body>
<article class="paper">
"#,
            version = crate::VERSION,
            author = html_escape(&doc.author_names()),
            keywords = html_escape(&doc.keyword_line()),
            title = title,
            css = stylesheet(self.layout),
        );

        self.generate_front_matter(doc);

        self.line(r#"<div class="paper-body">"#);
        for section in &doc.sections {
            self.generate_section(section);
        }
        self.generate_references(&doc.references);
        self.line("</div>");

        self.line("</article>");
        self.line("</body>");
        self.output.push_str("</html>\n");
    }

    fn generate_front_matter(&mut self, doc: &Document) {
        let layout = self.layout;
        self.line(r#"<header class="front-matter">"#);

        let _ = writeln!(
            self.output,
            r#"<h1 class="title">{}</h1>"#,
            html_escape(&doc.title)
        );
        self.state
            .advance_text(doc.title.chars().count(), layout.fonts.title, layout.fonts.title);

        for row in doc.author_rows(layout.author_columns) {
            self.generate_author_row(row);
        }

        if !doc.abstract_text.is_empty() {
            let _ = writeln!(
                self.output,
                r#"<p class="abstract"><em>{}</em>{}</p>"#,
                labels::ABSTRACT_PREFIX,
                html_escape(&doc.abstract_text)
            );
            self.state.advance_text(
                doc.abstract_text.chars().count(),
                layout.fonts.abstract_text,
                layout.line_height,
            );
        }

        if !doc.keywords.is_empty() {
            let line = doc.keyword_line();
            let _ = writeln!(
                self.output,
                r#"<p class="keywords"><em>{}</em>{}</p>"#,
                labels::KEYWORDS_PREFIX,
                html_escape(&line)
            );
            self.state.advance_text(
                line.chars().count(),
                layout.fonts.abstract_text,
                layout.line_height,
            );
        }

        self.line("</header>");
        self.state.set_columns(layout.column_count);
    }

    fn generate_author_row(&mut self, row: &[Author]) {
        let layout = self.layout;
        let width = css_length(layout.author_cell_width(), CssUnit::Inch);
        self.line(r#"<div class="authors">"#);
        let mut tallest = 0;
        for author in row {
            let mut lines = 1;
            let _ = writeln!(self.output, r#"<div class="author" style="width: {}">"#, width);
            let _ = writeln!(
                self.output,
                r#"<div class="author-name">{}</div>"#,
                html_escape(&author.name)
            );
            for affiliation in &author.affiliation {
                let _ = writeln!(
                    self.output,
                    r#"<div class="affiliation">{}</div>"#,
                    html_escape(affiliation)
                );
                lines += 1;
            }
            if !author.email.is_empty() {
                let _ = writeln!(
                    self.output,
                    r#"<div class="email">{}</div>"#,
                    html_escape(&author.email)
                );
                lines += 1;
            }
            self.line("</div>");
            tallest = usize::max(tallest, lines);
        }
        self.line("</div>");
        self.state.advance(Twips(
            layout.line_height.get() * tallest as i64 + layout.spacing.author_row_after.get(),
        ));
    }

    fn generate_section(&mut self, section: &Section) {
        let layout = self.layout;
        self.state.begin_section(section.index);

        let _ = writeln!(
            self.output,
            r#"<section class="paper-section" id="section-{}">"#,
            section.index
        );
        let _ = writeln!(
            self.output,
            r#"<h2 class="section-heading">{}</h2>"#,
            html_escape(&labels::section_heading(section.index, &section.heading))
        );
        self.state
            .advance(layout.spacing.heading_before + layout.line_height);

        for block in section.ordered_blocks() {
            self.generate_block(&block.content);
        }
        self.line("</section>");
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

    fn generate_body_paragraph(&mut self, runs: &[TextRun]) {
        let layout = self.layout;
        self.output.push_str(r#"<p class="body-text">"#);
        let mut chars = 0;
        for run in runs {
            chars += run.text.chars().count();
            self.output.push_str(&format_run(run));
        }
        self.line("</p>");
        self.state
            .advance_text(chars, layout.fonts.body, layout.line_height);
        self.state.advance(layout.spacing.body_after);
    }

    fn generate_subsection(&mut self, subsection: &SubsectionBlock) {
        let layout = self.layout;
        let label = self.state.next_subsection();
        let _ = writeln!(
            self.output,
            r#"<h3 class="subsection-heading">{}</h3>"#,
            html_escape(&labels::subsection_heading(label, &subsection.title))
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

        let width = css_length(layout.table_column_width(table.columns()), CssUnit::Inch);

        self.line(r#"<div class="table-block">"#);
        let _ = writeln!(
            self.output,
            r#"<p class="caption table-caption">{}</p>"#,
            html_escape(&labels::table_caption(label, block.caption.as_deref()))
        );
        self.line(r#"<table class="data-table">"#);
        self.output.push_str("<colgroup>");
        for _ in 0..table.columns() {
            let _ = write!(self.output, r#"<col style="width: {}">"#, width);
        }
        self.line("</colgroup>");

        self.output.push_str("<thead><tr>");
        for header in &table.headers {
            let _ = write!(self.output, "<th>{}</th>", html_escape(header));
        }
        self.line("</tr></thead>");

        self.line("<tbody>");
        for row in &table.rows {
            self.output.push_str("<tr>");
            for cell in row {
                let _ = write!(self.output, "<td>{}</td>", html_escape(cell));
            }
            self.line("</tr>");
        }
        self.line("</tbody>");
        self.line("</table>");
        self.line("</div>");

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
        let caption = labels::figure_caption(label, image.caption.as_deref());

        self.line(r#"<figure class="figure-block">"#);
        let height = match prepare_figure(image, layout) {
            Ok(figure) => {
                let _ = writeln!(
                    self.output,
                    r#"<img src="data:{};base64,{}" alt="{}" style="width: {}; height: {}">"#,
                    figure.format.mime(),
                    STANDARD.encode(&figure.data),
                    html_escape(&caption),
                    css_length(figure.width, CssUnit::Inch),
                    css_length(figure.height, CssUnit::Inch),
                );
                figure.height
            }
            Err(e) => {
                log::warn!("Figure {} replaced by placeholder: {}", label, e);
                let reason = e.to_string();
                let _ = writeln!(
                    self.output,
                    r#"<p class="image-placeholder">{}</p>"#,
                    html_escape(&labels::image_placeholder(&reason))
                );
                self.state.note(label, NoteKind::ImagePlaceholder { reason });
                layout.line_height
            }
        };
        let _ = writeln!(
            self.output,
            r#"<figcaption class="caption figure-caption">{}</figcaption>"#,
            html_escape(&caption)
        );
        self.line("</figure>");

        self.state.advance(
            layout.spacing.figure_lead_in
                + height
                + layout.spacing.figure_trailing
                + layout.line_height
                + layout.spacing.caption_after,
        );
    }

    fn generate_reference_block(&mut self, reference: &ReferenceBlock) {
        let layout = self.layout;
        let text = reference.text.trim();
        if text.is_empty() {
            return;
        }
        let _ = writeln!(self.output, r#"<p class="reference">{}</p>"#, html_escape(text));
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

        self.line(r#"<section class="references">"#);
        let _ = writeln!(
            self.output,
            r#"<h2 class="section-heading">{}</h2>"#,
            labels::REFERENCES_HEADING
        );
        self.state
            .advance(layout.spacing.heading_before + layout.line_height);

        for entry in entries {
            let number = self.state.next_reference();
            let text = labels::reference_entry(number, entry);
            let _ = writeln!(
                self.output,
                r#"<p class="reference" id="ref-{}">{}</p>"#,
                number,
                html_escape(&text)
            );
            self.state.advance_text(
                text.chars().count(),
                layout.fonts.reference,
                layout.reference_line_height,
            );
        }
        self.line("</section>");
    }
}

/// One inline run with its emphasis tags
fn format_run(run: &TextRun) -> String {
    let mut text = html_escape(&run.text).replace('\n', "<br>");
    if run.underline {
        text = format!("<u>{}</u>", text);
    }
    if run.italic {
        text = format!("<em>{}</em>", text);
    }
    if run.bold {
        text = format!("<strong>{}</strong>", text);
    }
    text
}

/// Escape HTML special characters, dropping characters XML forbids
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars().filter(|&c| is_xml_char(c)) {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
