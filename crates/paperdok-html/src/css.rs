//! CSS generated from the layout table
//!
//! Lengths are converted from twips at the point of emission with
//! [`css_length`]; no measurement is written into the stylesheet by hand.

use paperdok_model::units::{TWIPS_PER_INCH, TWIPS_PER_POINT};
use paperdok_model::{Layout, Twips};

/// CSS absolute length unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CssUnit {
    Inch,
    Point,
}

impl CssUnit {
    fn suffix(self) -> &'static str {
        match self {
            CssUnit::Inch => "in",
            CssUnit::Point => "pt",
        }
    }

    fn twips_per_unit(self) -> i64 {
        match self {
            CssUnit::Inch => TWIPS_PER_INCH,
            CssUnit::Point => TWIPS_PER_POINT,
        }
    }
}

/// Format a length in the given unit, e.g. `0.75in` or `-0.1pt`
pub fn css_length(length: Twips, unit: CssUnit) -> String {
    let value = length.get() as f64 / unit.twips_per_unit() as f64;
    format!("{}{}", format_number(value), unit.suffix())
}

/// Parse an `in` or `pt` length back to twips
pub fn parse_css_length(text: &str) -> Option<Twips> {
    let text = text.trim();
    let (number, unit) = if let Some(n) = text.strip_suffix("in") {
        (n, CssUnit::Inch)
    } else if let Some(n) = text.strip_suffix("pt") {
        (n, CssUnit::Point)
    } else {
        return None;
    };
    let value: f64 = number.trim().parse().ok()?;
    Some(Twips((value * unit.twips_per_unit() as f64).round() as i64))
}

/// Up to four decimals, trailing zeros dropped
fn format_number(value: f64) -> String {
    let text = format!("{:.4}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

fn inches(length: Twips) -> String {
    css_length(length, CssUnit::Inch)
}

fn points(length: Twips) -> String {
    css_length(length, CssUnit::Point)
}

/// The document stylesheet
pub fn stylesheet(layout: &Layout) -> String {
    let s = &layout.spacing;
    let f = &layout.fonts;
    format!(
        r#"@page {{
    size: letter;
    margin: {margin};
}}
* {{ box-sizing: border-box; }}
body {{
    font-family: "{font}", Times, serif;
    font-size: {body_size};
    line-height: {line};
    color: #000;
    margin: 0;
}}
.paper {{
    width: {text_width};
    margin: 0 auto;
}}
.title {{
    font-size: {title_size};
    font-weight: bold;
    text-align: center;
    margin: 0 0 {title_after};
}}
.authors {{
    display: flex;
    justify-content: center;
    margin: 0 0 {author_row_after};
    text-align: center;
}}
.author {{
    flex: 0 0 {author_cell};
    width: {author_cell};
    padding: 0 {cell_margin};
}}
.author-name {{ font-size: {author_size}; font-weight: bold; }}
.affiliation {{ font-size: {affiliation_size}; font-style: italic; }}
.email {{ font-size: {email_size}; }}
.abstract, .keywords {{
    font-size: {abstract_size};
    font-weight: bold;
    text-align: justify;
    margin: 0 0 {abstract_after};
}}
.keywords {{ margin-bottom: {keywords_after}; }}
.paper-body {{
    columns: {columns};
    column-gap: {column_gap};
}}
.section-heading {{
    font-size: {heading_size};
    font-weight: bold;
    text-align: center;
    margin: {heading_before} 0 {heading_after};
    break-after: avoid;
}}
.subsection-heading {{
    font-size: {subheading_size};
    font-weight: bold;
    text-align: left;
    margin: {subheading_before} 0 {subheading_after};
    break-after: avoid;
}}
.body-text {{
    text-align: justify;
    text-justify: distribute;
    hyphens: auto;
    letter-spacing: {letter_spacing};
    line-height: {line};
    margin: 0 0 {body_after};
}}
.caption {{
    font-size: {caption_size};
    font-weight: bold;
    text-align: center;
}}
.table-block {{ margin: 0 0 {table_after}; }}
.table-caption {{ margin: {table_caption_before} 0 {table_caption_after}; break-after: avoid; }}
.data-table {{
    border-collapse: collapse;
    table-layout: fixed;
    margin: 0 auto;
}}
.data-table th, .data-table td {{
    border: {border_width} solid #{border_color};
    padding: 0 {cell_margin};
    text-align: center;
    vertical-align: middle;
}}
.data-table th {{ font-size: {header_size}; font-weight: bold; }}
.data-table td {{ font-size: {cell_size}; }}
.data-table tr {{ break-inside: avoid; }}
.figure-block {{
    text-align: center;
    margin: {figure_lead_in} 0 0;
    break-inside: avoid;
}}
.figure-block img {{
    display: block;
    margin: 0 auto {figure_trailing};
    max-width: {figure_max_width};
}}
.figure-caption {{ margin: 0 0 {caption_after}; break-before: avoid; }}
.image-placeholder {{ font-style: italic; text-align: center; margin: 0 0 {figure_trailing}; }}
.reference {{
    font-size: {reference_size};
    line-height: {reference_line};
    text-align: justify;
    padding-left: {reference_indent};
    text-indent: -{reference_indent};
    margin: {reference_before} 0 {reference_after};
}}
"#,
        margin = inches(layout.margin),
        font = layout.font_family,
        body_size = points(f.body),
        line = points(layout.line_height),
        text_width = inches(layout.text_width()),
        title_size = points(f.title),
        title_after = points(s.title_after),
        author_cell = inches(layout.author_cell_width()),
        author_row_after = points(s.author_row_after),
        author_size = points(f.author_name),
        affiliation_size = points(f.affiliation),
        email_size = points(f.email),
        abstract_size = points(f.abstract_text),
        abstract_after = points(s.abstract_after),
        keywords_after = points(s.keywords_after),
        columns = layout.column_count,
        column_gap = inches(layout.column_gap),
        heading_size = points(f.heading),
        heading_before = points(s.heading_before),
        heading_after = points(s.heading_after),
        subheading_size = points(f.subheading),
        subheading_before = points(s.subheading_before),
        subheading_after = points(s.subheading_after),
        letter_spacing = points(layout.letter_spacing),
        body_after = points(s.body_after),
        caption_size = points(f.caption),
        table_after = points(s.table_after),
        table_caption_before = points(s.table_caption_before),
        table_caption_after = points(s.table_caption_after),
        border_width = points(layout.table.border_width),
        border_color = layout.table.border_color,
        cell_margin = points(layout.table.cell_margin),
        header_size = points(f.table_header),
        cell_size = points(f.table_cell),
        figure_lead_in = points(s.figure_lead_in),
        figure_trailing = points(s.figure_trailing),
        figure_max_width = inches(layout.figure_max_width()),
        caption_after = points(s.caption_after),
        reference_size = points(f.reference),
        reference_line = points(layout.reference_line_height),
        reference_indent = inches(layout.reference_indent),
        reference_before = points(s.reference_before),
        reference_after = points(s.reference_after),
    )
}
