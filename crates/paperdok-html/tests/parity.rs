//! The HTML and DOCX renderers must agree on structure: the same headings,
//! captions and numbering in the same order, and the same report.

use std::io::Cursor;

use image::{ImageBuffer, ImageFormat, Rgb};
use paperdok_html::{parse_css_length, HtmlRenderer};
use paperdok_model::{Document, DocumentBuilder, LAYOUT};
use paperdok_ooxml::{DocxContent, DocxRenderer};
use regex::Regex;
use serde_json::json;

fn png_base64(width: u32, height: u32) -> String {
    use base64::Engine as _;
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(width, height, Rgb([10, 10, 10]));
    let mut data = Vec::new();
    img.write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
        .unwrap();
    base64::engine::general_purpose::STANDARD.encode(data)
}

fn sample() -> Document {
    let table = |caption: &str, order: i64| {
        json!({"type": "table", "caption": caption, "order": order, "headers": ["Metric", "Value"], "rows": [["p50", "12"]]})
    };
    DocumentBuilder::from_value(&json!({
        "title": "Parity Check",
        "authors": [{"name": "Ada"}, {"name": "Grace"}],
        "abstract": "Both outputs agree.",
        "keywords": "html, docx",
        "sections": [
            {
                "title": "Introduction",
                "contentBlocks": [
                    {"type": "text", "content": "Opening remarks.", "order": 1},
                    {"type": "image", "data": png_base64(64, 48), "caption": "Overview", "order": 3},
                    table("Latency", 2)
                ],
                "subsections": [{"title": "Scope", "content": "Narrow."}]
            },
            {
                "title": "Evaluation",
                "contentBlocks": [
                    table("Throughput", 1),
                    {"type": "table", "headers": [], "rows": [], "order": 2},
                    {"type": "image", "data": "", "caption": "Missing", "order": 3}
                ]
            }
        ],
        "references": ["A. Author, Paper One.", "B. Author, Paper Two."]
    }))
    .unwrap()
}

fn is_structural(text: &str) -> bool {
    let heading = Regex::new(r"^(\d+\. |\d+\.\d+ |TABLE \d+\.\d+|FIG\. \d+\.\d+|REFERENCES$|\[\d+\] )").unwrap();
    heading.is_match(text)
}

fn docx_outline(doc: &Document) -> Vec<String> {
    let docx = DocxRenderer::new().render(doc).unwrap().output;
    DocxContent::from_bytes(&docx)
        .unwrap()
        .flow
        .paragraphs()
        .map(|p| p.text())
        .filter(|t| is_structural(t))
        .collect()
}

fn html_outline(doc: &Document) -> Vec<String> {
    let html = HtmlRenderer::new().render(doc).output;
    let tag = Regex::new(r#"<(h2|h3|p|figcaption) class="[^"]*"[^>]*>([^<]*)</"#).unwrap();
    tag.captures_iter(&html)
        .map(|c| c[2].replace("&amp;", "&"))
        .filter(|t| is_structural(t))
        .collect()
}

#[test]
fn headings_and_captions_match() {
    let doc = sample();
    let docx = docx_outline(&doc);
    let html = html_outline(&doc);
    assert_eq!(docx, html);

    assert_eq!(
        docx,
        vec![
            "1. INTRODUCTION",
            "TABLE 1.1: LATENCY",
            "FIG. 1.1: OVERVIEW",
            "1.1 Scope",
            "2. EVALUATION",
            "TABLE 2.1: THROUGHPUT",
            "TABLE 2.2: DATA TABLE 2",
            "FIG. 2.1: MISSING",
            "REFERENCES",
            "[1] A. Author, Paper One.",
            "[2] B. Author, Paper Two.",
        ]
    );
}

#[test]
fn reports_match() {
    let doc = sample();
    let docx = DocxRenderer::new().render(&doc).unwrap().report;
    let html = HtmlRenderer::new().render(&doc).report;
    assert_eq!(docx, html);
    assert_eq!(html.synthesized_tables().len(), 1);
    assert_eq!(html.image_placeholders().len(), 1);
}

#[test]
fn figure_sizes_match() {
    let doc = sample();
    let html = HtmlRenderer::new().render(&doc).output;
    let style = Regex::new(r#"<img [^>]*style="width: ([0-9.]+)in; height: ([0-9.]+)in""#).unwrap();
    let caps = style.captures(&html).expect("one drawn figure");
    let width: f64 = caps[1].parse().unwrap();
    let height: f64 = caps[2].parse().unwrap();

    let docx = DocxRenderer::new().render(&doc).unwrap().output;
    let content = DocxContent::from_bytes(&docx).unwrap();
    let image = content
        .flow
        .paragraphs()
        .flat_map(|p| p.images.iter())
        .next()
        .expect("one drawing");

    assert!((width * 1440.0 - image.width.get() as f64).abs() <= 1.0);
    assert!((height * 1440.0 - image.height.get() as f64).abs() <= 1.0);
}

/// Author cell widths per byline row, in twips
fn html_author_rows(html: &str) -> Vec<Vec<i64>> {
    let cell = Regex::new(r#"^<div class="author" style="width: ([^"]+)">$"#).unwrap();
    let mut rows: Vec<Vec<i64>> = Vec::new();
    for line in html.lines() {
        if line == r#"<div class="authors">"# {
            rows.push(Vec::new());
        } else if let Some(caps) = cell.captures(line) {
            let width = parse_css_length(&caps[1]).unwrap().get();
            rows.last_mut().unwrap().push(width);
        }
    }
    rows
}

fn docx_author_rows(doc: &Document) -> Vec<Vec<i64>> {
    let docx = DocxRenderer::new().render(doc).unwrap().output;
    DocxContent::from_bytes(&docx)
        .unwrap()
        .flow
        .tables()
        .filter(|t| !t.bordered())
        .map(|t| t.grid.iter().map(|w| w.get()).collect())
        .collect()
}

#[test]
fn author_rows_match() {
    for count in [1, 2, 4, 5] {
        let authors: Vec<_> = (1..=count).map(|i| json!({"name": format!("Author {}", i)})).collect();
        let doc = DocumentBuilder::from_value(&json!({"title": "Byline", "authors": authors})).unwrap();

        let html = html_author_rows(&HtmlRenderer::new().render(&doc).output);
        let docx = docx_author_rows(&doc);
        assert_eq!(html.len(), docx.len(), "{} authors", count);
        for (h, d) in html.iter().zip(&docx) {
            assert_eq!(h.len(), d.len(), "{} authors", count);
            for (hw, dw) in h.iter().zip(d) {
                assert!((hw - dw).abs() <= 1, "{} vs {}", hw, dw);
            }
        }
        let cells: usize = html.iter().map(Vec::len).sum();
        assert_eq!(cells, count);
    }
}

#[test]
fn wide_table_grids_match_and_fit() {
    let headers: Vec<String> = (1..=10).map(|i| format!("H{}", i)).collect();
    let doc = DocumentBuilder::from_value(&json!({
        "title": "Wide",
        "sections": [{"title": "Data", "contentBlocks": [
            {"type": "table", "headers": headers, "rows": [["x"]]}
        ]}]
    }))
    .unwrap();

    let html = HtmlRenderer::new().render(&doc).output;
    let col = Regex::new(r#"<col style="width: ([^"]+)">"#).unwrap();
    let html_grid: Vec<i64> = col
        .captures_iter(&html)
        .map(|c| parse_css_length(&c[1]).unwrap().get())
        .collect();

    let docx = DocxRenderer::new().render(&doc).unwrap().output;
    let content = DocxContent::from_bytes(&docx).unwrap();
    let table = content.flow.tables().find(|t| t.bordered()).unwrap();

    assert_eq!(html_grid.len(), 10);
    assert_eq!(table.grid.len(), 10);
    for (h, d) in html_grid.iter().zip(&table.grid) {
        assert!((h - d.get()).abs() <= 1);
    }
    let total: i64 = table.grid.iter().map(|w| w.get()).sum();
    assert!(total <= LAYOUT.column_width.get());
}

#[test]
fn control_characters_are_dropped_in_both() {
    let doc = DocumentBuilder::from_value(&json!({
        "title": "Bad\u{1}Title",
        "sections": [{"title": "Ve\u{b}rtical", "content": "Body\u{1b}."}]
    }))
    .unwrap();

    let html = HtmlRenderer::new().render(&doc).output;
    assert!(!html.chars().any(|c| c < ' ' && !matches!(c, '\t' | '\n' | '\r')));
    assert!(html.contains(r#"<h1 class="title">BadTitle</h1>"#));
    assert_eq!(docx_outline(&doc), html_outline(&doc));
    assert_eq!(docx_outline(&doc)[0], "1. VERTICAL");
}
