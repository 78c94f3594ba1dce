//! Inline formatting for text content
//!
//! Text arrives from a rich-text form and may carry a small subset of
//! HTML: `<b>`, `<strong>`, `<i>`, `<em>`, `<u>`, `<br>` and a handful of
//! entities. Everything else is stripped to its text.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A run of text with uniform formatting
///
/// A `\n` inside `text` is a hard line break within the paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl TextRun {
    /// An unformatted run
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// A bold run
    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            ..Default::default()
        }
    }

    fn same_format(&self, other: &TextRun) -> bool {
        self.bold == other.bold && self.italic == other.italic && self.underline == other.underline
    }
}

#[derive(Default)]
struct FormatDepth {
    bold: u32,
    italic: u32,
    underline: u32,
}

impl FormatDepth {
    fn apply(&mut self, tag: &str, closing: bool) {
        let slot = match tag {
            "b" | "strong" => &mut self.bold,
            "i" | "em" => &mut self.italic,
            "u" | "ins" => &mut self.underline,
            _ => return,
        };
        if closing {
            *slot = slot.saturating_sub(1);
        } else {
            *slot += 1;
        }
    }

    fn run(&self, text: String) -> TextRun {
        TextRun {
            text,
            bold: self.bold > 0,
            italic: self.italic > 0,
            underline: self.underline > 0,
        }
    }
}

/// Parse text content into paragraphs of formatted runs
///
/// Paragraphs are separated by blank lines or `<p>` boundaries. Empty
/// paragraphs are dropped.
pub fn parse_inline(source: &str) -> Vec<Vec<TextRun>> {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    static BREAK_RE: OnceLock<Regex> = OnceLock::new();
    let tag_re =
        TAG_RE.get_or_init(|| Regex::new(r"<\s*(/)?\s*([a-zA-Z][a-zA-Z0-9]*)[^>]*>").unwrap());
    let break_re = BREAK_RE.get_or_init(|| Regex::new(r"\n[ \t]*\n").unwrap());

    let source = source.replace("\r\n", "\n");
    let mut paragraphs: Vec<Vec<TextRun>> = Vec::new();
    let mut current: Vec<TextRun> = Vec::new();
    let mut depth = FormatDepth::default();
    let mut cursor = 0;

    for caps in tag_re.captures_iter(&source) {
        let Some(whole) = caps.get(0) else { continue };
        push_text(break_re, &source[cursor..whole.start()], &depth, &mut current, &mut paragraphs);
        cursor = whole.end();

        let closing = caps.get(1).is_some();
        let tag = caps
            .get(2)
            .map(|m| m.as_str().to_ascii_lowercase())
            .unwrap_or_default();
        match tag.as_str() {
            "br" => push_run(&mut current, depth.run("\n".to_string())),
            "p" | "div" => finish_paragraph(&mut current, &mut paragraphs),
            other => depth.apply(other, closing),
        }
    }
    push_text(break_re, &source[cursor..], &depth, &mut current, &mut paragraphs);
    finish_paragraph(&mut current, &mut paragraphs);

    paragraphs
}

/// Whether `c` may appear in an XML 1.0 document
///
/// `#x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]`
pub fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Concatenated plain text of a paragraph
pub fn plain_text(runs: &[TextRun]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}

fn push_text(
    break_re: &Regex,
    text: &str,
    depth: &FormatDepth,
    current: &mut Vec<TextRun>,
    paragraphs: &mut Vec<Vec<TextRun>>,
) {
    let mut pieces = break_re.split(text).peekable();
    while let Some(piece) = pieces.next() {
        let piece = decode_entities(piece);
        if !piece.is_empty() {
            push_run(current, depth.run(piece));
        }
        if pieces.peek().is_some() {
            finish_paragraph(current, paragraphs);
        }
    }
}

fn push_run(current: &mut Vec<TextRun>, run: TextRun) {
    if let Some(last) = current.last_mut() {
        if last.same_format(&run) {
            last.text.push_str(&run.text);
            return;
        }
    }
    current.push(run);
}

fn finish_paragraph(current: &mut Vec<TextRun>, paragraphs: &mut Vec<Vec<TextRun>>) {
    let mut runs = std::mem::take(current);

    // Trim the paragraph edges, not the interior runs
    if let Some(first) = runs.first_mut() {
        first.text = first.text.trim_start().to_string();
    }
    if let Some(last) = runs.last_mut() {
        last.text = last.text.trim_end().to_string();
    }
    runs.retain(|r| !r.text.is_empty());

    if !runs.is_empty() {
        paragraphs.push(runs);
    }
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&nbsp;", "\u{a0}")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_chars() {
        assert!(is_xml_char('\t') && is_xml_char('é') && is_xml_char('\u{1F600}'));
        assert!(!is_xml_char('\u{1}') && !is_xml_char('\u{b}') && !is_xml_char('\u{FFFE}'));
    }

    #[test]
    fn test_plain_paragraphs() {
        let paras = parse_inline("First paragraph.\n\nSecond paragraph.");
        assert_eq!(paras.len(), 2);
        assert_eq!(plain_text(&paras[0]), "First paragraph.");
        assert_eq!(plain_text(&paras[1]), "Second paragraph.");
    }

    #[test]
    fn test_bold_and_italic_runs() {
        let paras = parse_inline("A <b>bold</b> and <em>italic</em> word");
        assert_eq!(paras.len(), 1);
        let runs = &paras[0];
        assert_eq!(runs.len(), 5);
        assert!(runs[1].bold && !runs[1].italic);
        assert_eq!(runs[1].text, "bold");
        assert!(runs[3].italic);
        assert_eq!(runs[4].text, " word");
    }

    #[test]
    fn test_nested_formatting() {
        let paras = parse_inline("<strong><i>both</i></strong>");
        let run = &paras[0][0];
        assert!(run.bold && run.italic);
    }

    #[test]
    fn test_line_break_and_entities() {
        let paras = parse_inline("Tom &amp; Jerry<br/>5 &lt; 6");
        assert_eq!(paras.len(), 1);
        assert_eq!(plain_text(&paras[0]), "Tom & Jerry\n5 < 6");
    }

    #[test]
    fn test_paragraph_tags_split() {
        let paras = parse_inline("<p>One</p><p>Two</p>");
        assert_eq!(paras.len(), 2);
    }

    #[test]
    fn test_unknown_tags_stripped() {
        let paras = parse_inline("<span class=\"x\">kept</span>");
        assert_eq!(plain_text(&paras[0]), "kept");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_inline("").is_empty());
        assert!(parse_inline("  \n\n  ").is_empty());
    }
}
