//! Document model builder
//!
//! Turns a loosely-typed request payload into a [`Document`]. Optional
//! fields are coerced to empty values; structural problems (missing title,
//! `sections` that is not a list, unknown block types) are reported as
//! [`ValidationError`]s rather than papered over.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Value};

use crate::block::{
    ContentBlock, ImageBlock, ReferenceBlock, SectionBlock, SizeClass, SubsectionBlock,
    TableBlock, TextBlock, DEFAULT_ORDER,
};
use crate::document::{Author, Document, Section};
use crate::error::{Result, ValidationError};
use crate::inline::parse_inline;

/// Structured author fields, in the order they are printed
const AFFILIATION_FIELDS: &[&str] = &[
    "department",
    "organization",
    "university",
    "institution",
    "city",
    "state",
    "country",
];

/// Heading given to the section created for standalone tables and figures
const STANDALONE_SECTION: &str = "Content";

/// Builds [`Document`]s from request payloads
pub struct DocumentBuilder;

impl DocumentBuilder {
    /// Build a document from a JSON string
    pub fn from_json_str(json: &str) -> Result<Document> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| ValidationError::Json(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Build a document from a parsed payload
    pub fn from_value(payload: &Value) -> Result<Document> {
        let root = payload.as_object().ok_or(ValidationError::NotAnObject)?;

        let title = match root.get("title") {
            None | Some(Value::Null) => return Err(ValidationError::MissingTitle),
            Some(Value::String(s)) if s.trim().is_empty() => {
                return Err(ValidationError::MissingTitle)
            }
            Some(Value::String(s)) => s.trim().to_string(),
            Some(_) => return Err(invalid("title", "a string")),
        };

        let authors = optional_array(root, "authors")?
            .iter()
            .enumerate()
            .map(|(i, v)| parse_author(i, v))
            .collect::<Result<Vec<_>>>()?;

        let abstract_text = optional_string(root, "abstract")?;
        let keywords = parse_keywords(root)?;

        let mut sections = optional_array(root, "sections")?
            .iter()
            .enumerate()
            .map(|(i, v)| parse_section(i, v))
            .collect::<Result<Vec<_>>>()?;

        attach_standalone(root, &mut sections)?;

        for (i, section) in sections.iter_mut().enumerate() {
            section.index = i + 1;
        }

        let references = optional_array(root, "references")?
            .iter()
            .filter_map(reference_text)
            .collect();

        let document = Document {
            title,
            authors,
            abstract_text,
            keywords,
            sections,
            references,
        };
        log::debug!(
            "Built document: {} authors, {} sections, {} references",
            document.authors.len(),
            document.sections.len(),
            document.references.len()
        );
        Ok(document)
    }
}

fn invalid(field: impl Into<String>, expected: &'static str) -> ValidationError {
    ValidationError::InvalidField {
        field: field.into(),
        expected,
    }
}

fn optional_array<'a>(object: &'a Map<String, Value>, key: &str) -> Result<&'a [Value]> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(_) => Err(invalid(key, "an array")),
    }
}

fn optional_string(object: &Map<String, Value>, key: &str) -> Result<String> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(_) => Err(invalid(key, "a string")),
    }
}

/// First non-blank string among `keys`
fn first_text(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| object.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn parse_author(index: usize, value: &Value) -> Result<Author> {
    let object = match value {
        Value::String(name) => {
            return Ok(Author {
                name: name.trim().to_string(),
                ..Default::default()
            })
        }
        Value::Object(object) => object,
        _ => return Err(invalid(format!("authors[{}]", index), "an object")),
    };

    let name = first_text(object, &["name"]).unwrap_or_default();
    let email = first_text(object, &["email"]).unwrap_or_default();

    let mut affiliation: Vec<String> = AFFILIATION_FIELDS
        .iter()
        .filter_map(|field| first_text(object, &[*field]))
        .collect();

    if affiliation.is_empty() {
        if let Some(text) = first_text(object, &["affiliation"]) {
            affiliation = text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .filter(|line| !line.to_ascii_lowercase().starts_with("email"))
                .map(str::to_string)
                .collect();
        }
    }

    Ok(Author {
        name,
        affiliation,
        email,
    })
}

fn parse_keywords(root: &Map<String, Value>) -> Result<Vec<String>> {
    let keywords: Vec<String> = match root.get("keywords") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(s)) => s.split(',').map(|k| k.trim().to_string()).collect(),
        Some(Value::Array(items)) => items.iter().map(|k| scalar_text(k).trim().to_string()).collect(),
        Some(_) => return Err(invalid("keywords", "a string or an array")),
    };
    Ok(keywords.into_iter().filter(|k| !k.is_empty()).collect())
}

fn parse_section(index: usize, value: &Value) -> Result<Section> {
    let path = format!("sections[{}]", index);
    let object = value.as_object().ok_or_else(|| invalid(path.clone(), "an object"))?;

    let heading = first_text(object, &["title", "heading"]).unwrap_or_default();
    let mut blocks = Vec::new();

    if let Some(content) = first_text(object, &["content"]) {
        blocks.push(SectionBlock {
            order: 0,
            content: ContentBlock::Text(TextBlock {
                paragraphs: parse_inline(&content),
            }),
        });
    }

    let block_key = if object.contains_key("contentBlocks") {
        "contentBlocks"
    } else {
        "blocks"
    };
    let raw_blocks = match object.get(block_key) {
        None | Some(Value::Null) => &[][..],
        Some(Value::Array(items)) => items.as_slice(),
        Some(_) => return Err(invalid(format!("{}.{}", path, block_key), "an array")),
    };
    for (j, raw) in raw_blocks.iter().enumerate() {
        let block_path = format!("{}.{}[{}]", path, block_key, j);
        if let Some(block) = parse_block(index + 1, &block_path, raw, None)? {
            blocks.push(block);
        }
    }

    let subsections = match object.get("subsections") {
        None | Some(Value::Null) => &[][..],
        Some(Value::Array(items)) => items.as_slice(),
        Some(_) => return Err(invalid(format!("{}.subsections", path), "an array")),
    };
    if !subsections.is_empty() {
        // Subsections follow the declared blocks
        let mut next_order = blocks
            .iter()
            .map(|b| b.order)
            .filter(|o| *o != DEFAULT_ORDER)
            .max()
            .map_or(1, |o| o.saturating_add(1));
        for (k, raw) in subsections.iter().enumerate() {
            let sub_path = format!("{}.subsections[{}]", path, k);
            let object = raw.as_object().ok_or_else(|| invalid(sub_path, "an object"))?;
            blocks.push(SectionBlock {
                order: next_order,
                content: subsection(object),
            });
            next_order = next_order.saturating_add(1);
        }
    }

    Ok(Section {
        index: index + 1,
        heading,
        blocks,
    })
}

fn subsection(object: &Map<String, Value>) -> ContentBlock {
    ContentBlock::Subsection(SubsectionBlock {
        title: first_text(object, &["title"]).unwrap_or_default(),
        paragraphs: first_text(object, &["content"])
            .map(|c| parse_inline(&c))
            .unwrap_or_default(),
    })
}

fn parse_order(path: &str, object: &Map<String, Value>) -> Result<i64> {
    match object.get("order") {
        None | Some(Value::Null) => Ok(DEFAULT_ORDER),
        Some(Value::Number(n)) => {
            if let Some(order) = n.as_i64() {
                Ok(order)
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
                    _ => Err(invalid(format!("{}.order", path), "an integer")),
                }
            }
        }
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(format!("{}.order", path), "an integer")),
        Some(_) => Err(invalid(format!("{}.order", path), "an integer")),
    }
}

/// Parse one content block; `Ok(None)` means the block carries nothing to render
fn parse_block(
    section: usize,
    path: &str,
    value: &Value,
    forced_kind: Option<&str>,
) -> Result<Option<SectionBlock>> {
    let object = value
        .as_object()
        .ok_or_else(|| invalid(path.to_string(), "an object"))?;
    let order = parse_order(path, object)?;

    let kind = forced_kind
        .map(str::to_string)
        .or_else(|| first_text(object, &["type"]))
        .unwrap_or_else(|| "text".to_string())
        .to_ascii_lowercase();

    let content = match kind.as_str() {
        "text" | "paragraph" => {
            let paragraphs = first_text(object, &["content", "text"])
                .map(|c| parse_inline(&c))
                .unwrap_or_default();
            if paragraphs.is_empty() {
                log::debug!("{}: empty text block skipped", path);
                return Ok(None);
            }
            ContentBlock::Text(TextBlock { paragraphs })
        }
        "table" => ContentBlock::Table(parse_table(path, object)?),
        "image" | "figure" => ContentBlock::Image(parse_image(path, object)),
        "reference" => match reference_text(value) {
            Some(text) => ContentBlock::Reference(ReferenceBlock { text }),
            None => return Ok(None),
        },
        "subsection" => subsection(object),
        other => {
            return Err(ValidationError::UnknownBlockType {
                section,
                kind: other.to_string(),
            })
        }
    };

    Ok(Some(SectionBlock { order, content }))
}

fn parse_table(path: &str, object: &Map<String, Value>) -> Result<TableBlock> {
    let headers = match object.get("headers") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(|h| scalar_text(h).trim().to_string()).collect(),
        Some(_) => return Err(invalid(format!("{}.headers", path), "an array")),
    };

    let rows_key = if object.contains_key("rows") {
        "rows"
    } else {
        "tableData"
    };
    let rows = match object.get(rows_key) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|row| match row {
                Value::Array(cells) => Some(cells.iter().map(scalar_text).collect()),
                Value::Object(cells) => Some(cells.values().map(scalar_text).collect()),
                _ => {
                    log::warn!("{}: non-list table row ignored", path);
                    None
                }
            })
            .collect(),
        Some(_) => return Err(invalid(format!("{}.{}", path, rows_key), "an array")),
    };

    Ok(TableBlock {
        headers,
        rows,
        caption: first_text(object, &["caption", "tableName", "name"]),
    })
}

fn parse_image(path: &str, object: &Map<String, Value>) -> ImageBlock {
    let raw = first_text(object, &["data"]).unwrap_or_default();
    let (data, url_mime) = match decode_image_data(&raw) {
        Ok(decoded) => decoded,
        Err(e) => {
            // Kept empty; the renderer substitutes a placeholder
            log::warn!("{}: image data is not valid base64: {}", path, e);
            (Vec::new(), None)
        }
    };

    ImageBlock {
        data,
        mime_type: first_text(object, &["mimeType"]).or(url_mime),
        size: first_text(object, &["size"])
            .map(|s| SizeClass::parse(&s))
            .unwrap_or_default(),
        caption: first_text(object, &["caption"]),
    }
}

/// Decode base64 image data, tolerating a `data:<mime>;base64,` prefix
///
/// Returns the bytes and the MIME type named by the prefix, if any.
pub fn decode_image_data(raw: &str) -> std::result::Result<(Vec<u8>, Option<String>), base64::DecodeError> {
    let raw = raw.trim();
    let (mime, payload) = match raw.split_once(',') {
        Some((prefix, payload)) if prefix.starts_with("data:") => {
            let mime = prefix
                .trim_start_matches("data:")
                .split(';')
                .next()
                .filter(|m| !m.is_empty())
                .map(str::to_string);
            (mime, payload)
        }
        _ => (None, raw),
    };
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    Ok((STANDARD.decode(compact)?, mime))
}

fn reference_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Object(object) => first_text(object, &["text", "content"])?,
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn attach_standalone(root: &Map<String, Value>, sections: &mut Vec<Section>) -> Result<()> {
    let tables = optional_array(root, "tables")?;
    let figures = optional_array(root, "figures")?;
    if tables.is_empty() && figures.is_empty() {
        return Ok(());
    }

    if sections.is_empty() {
        sections.push(Section {
            index: 1,
            heading: STANDALONE_SECTION.to_string(),
            blocks: Vec::new(),
        });
    }

    let mut extra = Vec::new();
    for (i, raw) in tables.iter().enumerate() {
        if let Some(block) = parse_block(1, &format!("tables[{}]", i), raw, Some("table"))? {
            extra.push(block);
        }
    }
    for (i, raw) in figures.iter().enumerate() {
        if let Some(block) = parse_block(1, &format!("figures[{}]", i), raw, Some("image"))? {
            extra.push(block);
        }
    }
    sections[0].blocks.extend(extra);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PIXEL_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

    #[test]
    fn test_minimal_document() {
        let doc = DocumentBuilder::from_value(&json!({"title": "  A Paper  "})).unwrap();
        assert_eq!(doc.title, "A Paper");
        assert!(doc.authors.is_empty());
        assert!(doc.abstract_text.is_empty());
        assert!(doc.sections.is_empty());
    }

    #[test]
    fn test_missing_title_rejected() {
        assert_eq!(
            DocumentBuilder::from_value(&json!({"abstract": "x"})),
            Err(ValidationError::MissingTitle)
        );
        assert_eq!(
            DocumentBuilder::from_value(&json!({"title": "   "})),
            Err(ValidationError::MissingTitle)
        );
    }

    #[test]
    fn test_non_list_sections_rejected() {
        let err = DocumentBuilder::from_value(&json!({"title": "T", "sections": "intro"}))
            .unwrap_err();
        assert_eq!(err.field(), Some("sections"));
    }

    #[test]
    fn test_root_must_be_object() {
        assert_eq!(
            DocumentBuilder::from_value(&json!(["title"])),
            Err(ValidationError::NotAnObject)
        );
        assert!(matches!(
            DocumentBuilder::from_json_str("{not json"),
            Err(ValidationError::Json(_))
        ));
    }

    #[test]
    fn test_author_missing_fields_kept() {
        let doc = DocumentBuilder::from_value(&json!({
            "title": "T",
            "authors": [{"name": "Ada"}, {"email": "x@y.z"}]
        }))
        .unwrap();
        assert_eq!(doc.authors.len(), 2);
        assert_eq!(doc.authors[0].name, "Ada");
        assert!(doc.authors[0].affiliation.is_empty());
        assert!(doc.authors[0].email.is_empty());
        assert_eq!(doc.authors[1].name, "");
    }

    #[test]
    fn test_author_affiliation_lines() {
        let doc = DocumentBuilder::from_value(&json!({
            "title": "T",
            "authors": [{"name": "Ada", "affiliation": "Dept. of CS\nUniv. X\nEmail: ada@x.edu"}]
        }))
        .unwrap();
        assert_eq!(doc.authors[0].affiliation, vec!["Dept. of CS", "Univ. X"]);
    }

    #[test]
    fn test_structured_affiliation_fields_win() {
        let doc = DocumentBuilder::from_value(&json!({
            "title": "T",
            "authors": [{
                "name": "Ada",
                "affiliation": "ignored",
                "city": "London",
                "department": "Mathematics"
            }]
        }))
        .unwrap();
        assert_eq!(doc.authors[0].affiliation, vec!["Mathematics", "London"]);
    }

    #[test]
    fn test_keywords_from_string_and_array() {
        let doc = DocumentBuilder::from_value(&json!({"title": "T", "keywords": "a, b,, c"})).unwrap();
        assert_eq!(doc.keywords, vec!["a", "b", "c"]);
        let doc = DocumentBuilder::from_value(&json!({"title": "T", "keywords": ["x", " y "]})).unwrap();
        assert_eq!(doc.keywords, vec!["x", "y"]);
    }

    #[test]
    fn test_missing_order_sorts_last() {
        let doc = DocumentBuilder::from_value(&json!({
            "title": "T",
            "sections": [{
                "title": "Intro",
                "contentBlocks": [
                    {"type": "text", "content": "late one"},
                    {"type": "text", "content": "second", "order": 2},
                    {"type": "text", "content": "late two"},
                    {"type": "text", "content": "first", "order": 1}
                ]
            }]
        }))
        .unwrap();
        let texts: Vec<String> = doc.sections[0]
            .ordered_blocks()
            .iter()
            .map(|b| match &b.content {
                ContentBlock::Text(t) => t.plain_text(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(texts, vec!["first", "second", "late one", "late two"]);
    }

    #[test]
    fn test_invalid_order_rejected() {
        let err = DocumentBuilder::from_value(&json!({
            "title": "T",
            "sections": [{"contentBlocks": [{"type": "text", "content": "x", "order": "soon"}]}]
        }))
        .unwrap_err();
        assert_eq!(err.field(), Some("sections[0].contentBlocks[0].order"));
    }

    #[test]
    fn test_unknown_block_type_rejected() {
        let err = DocumentBuilder::from_value(&json!({
            "title": "T",
            "sections": [{"contentBlocks": [{"type": "video"}]}]
        }))
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownBlockType {
                section: 1,
                kind: "video".to_string()
            }
        );
    }

    #[test]
    fn test_table_rows_from_table_data() {
        let doc = DocumentBuilder::from_value(&json!({
            "title": "T",
            "sections": [{"contentBlocks": [{
                "type": "table",
                "tableName": "Results",
                "headers": ["A", 2],
                "tableData": [["1", null], [true, 3.5]]
            }]}]
        }))
        .unwrap();
        match &doc.sections[0].blocks[0].content {
            ContentBlock::Table(t) => {
                assert_eq!(t.headers, vec!["A", "2"]);
                assert_eq!(t.rows, vec![vec!["1", ""], vec!["true", "3.5"]]);
                assert_eq!(t.caption.as_deref(), Some("Results"));
            }
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_image_data_url_decoded() {
        let data = format!("data:image/png;base64,{}", PIXEL_PNG);
        let doc = DocumentBuilder::from_value(&json!({
            "title": "T",
            "sections": [{"contentBlocks": [{"type": "image", "data": data, "size": "small", "caption": "Pixel"}]}]
        }))
        .unwrap();
        match &doc.sections[0].blocks[0].content {
            ContentBlock::Image(img) => {
                assert!(img.data.starts_with(b"\x89PNG"));
                assert_eq!(img.mime_type.as_deref(), Some("image/png"));
                assert_eq!(img.size, SizeClass::Small);
            }
            other => panic!("expected image, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_image_data_is_not_a_validation_error() {
        let doc = DocumentBuilder::from_value(&json!({
            "title": "T",
            "sections": [{"contentBlocks": [{"type": "image", "data": "%%%not base64%%%"}]}]
        }))
        .unwrap();
        match &doc.sections[0].blocks[0].content {
            ContentBlock::Image(img) => assert!(img.data.is_empty()),
            other => panic!("expected image, got {:?}", other),
        }
    }

    #[test]
    fn test_references_string_or_record() {
        let doc = DocumentBuilder::from_value(&json!({
            "title": "T",
            "references": ["One", {"text": "Two"}, {"url": "skipped"}, "", 42]
        }))
        .unwrap();
        assert_eq!(doc.references, vec!["One", "Two"]);
    }

    #[test]
    fn test_subsections_follow_blocks() {
        let doc = DocumentBuilder::from_value(&json!({
            "title": "T",
            "sections": [{
                "title": "Method",
                "contentBlocks": [{"type": "text", "content": "body", "order": 4}],
                "subsections": [{"title": "Setup", "content": "details"}]
            }]
        }))
        .unwrap();
        let blocks = &doc.sections[0].blocks;
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].order, 5);
        assert_eq!(blocks[1].content.kind(), "subsection");
    }

    #[test]
    fn test_standalone_tables_create_section() {
        let doc = DocumentBuilder::from_value(&json!({
            "title": "T",
            "tables": [{"headers": ["H"], "tableData": [["v"]], "order": 1}],
            "figures": [{"data": PIXEL_PNG, "caption": "F"}]
        }))
        .unwrap();
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].heading, "Content");
        assert_eq!(doc.sections[0].table_count(), 1);
        assert_eq!(doc.sections[0].figure_count(), 1);
    }

    #[test]
    fn test_section_content_becomes_leading_text() {
        let doc = DocumentBuilder::from_value(&json!({
            "title": "T",
            "sections": [{"title": "Intro", "content": "Opening words."}]
        }))
        .unwrap();
        assert_eq!(doc.sections[0].index, 1);
        assert_eq!(doc.sections[0].blocks[0].order, 0);
    }
}
