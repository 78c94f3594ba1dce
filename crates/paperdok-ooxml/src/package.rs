//! Fixed package parts
//!
//! Everything in a generated DOCX besides `word/document.xml`, its
//! relationships and media.

use paperdok_model::{Document, Layout};

use crate::archive::{OoxmlArchive, CONTENT_TYPES_PART};
use crate::relationships::Relationships;
use crate::units::half_points;
use crate::xml::escape_xml;

pub const STYLES_PART: &str = "word/styles.xml";
pub const SETTINGS_PART: &str = "word/settings.xml";
pub const CORE_PART: &str = "docProps/core.xml";
pub const ROOT_RELS_PART: &str = "_rels/.rels";

/// Write content types, root relationships, styles, settings and core
/// properties into `archive`
pub fn write_fixed_parts(archive: &mut OoxmlArchive, doc: &Document, layout: &Layout) {
    archive.set_string(CONTENT_TYPES_PART, content_types_xml());
    archive.set_string(ROOT_RELS_PART, root_rels().to_xml());
    archive.set_string(STYLES_PART, styles_xml(layout));
    archive.set_string(SETTINGS_PART, settings_xml(layout));
    archive.set_string(CORE_PART, core_xml(doc));
}

fn content_types_xml() -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Default Extension="png" ContentType="image/png"/>
  <Default Extension="jpeg" ContentType="image/jpeg"/>
"#,
    );
    let overrides = [
        (
            "/word/document.xml",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
        ),
        (
            "/word/styles.xml",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml",
        ),
        (
            "/word/settings.xml",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml",
        ),
        (
            "/docProps/core.xml",
            "application/vnd.openxmlformats-package.core-properties+xml",
        ),
    ];
    for (part, content_type) in overrides {
        xml.push_str(&format!(
            "  <Override PartName=\"{}\" ContentType=\"{}\"/>\n",
            part, content_type
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn root_rels() -> Relationships {
    let mut rels = Relationships::new();
    rels.add("word/document.xml", Relationships::TYPE_OFFICE_DOCUMENT);
    rels.add("docProps/core.xml", Relationships::TYPE_CORE_PROPERTIES);
    rels
}

/// Relationships of `word/document.xml` before any media is added
pub fn document_rels() -> Relationships {
    let mut rels = Relationships::new();
    rels.add("styles.xml", Relationships::TYPE_STYLES);
    rels.add("settings.xml", Relationships::TYPE_SETTINGS);
    rels
}

/// Document defaults only; all formatting is applied directly
fn styles_xml(layout: &Layout) -> String {
    let font = escape_xml(layout.font_family);
    let size = half_points(layout.fonts.body);
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:docDefaults>
    <w:rPrDefault><w:rPr><w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:eastAsia="{font}" w:cs="{font}"/><w:sz w:val="{size}"/><w:szCs w:val="{size}"/><w:lang w:val="en-US"/></w:rPr></w:rPrDefault>
    <w:pPrDefault><w:pPr><w:spacing w:after="0" w:line="{line}" w:lineRule="auto"/></w:pPr></w:pPrDefault>
  </w:docDefaults>
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>
  <w:style w:type="table" w:default="1" w:styleId="TableNormal"><w:name w:val="Normal Table"/><w:tblPr><w:tblInd w:w="0" w:type="dxa"/><w:tblCellMar><w:top w:w="0" w:type="dxa"/><w:left w:w="{margin}" w:type="dxa"/><w:bottom w:w="0" w:type="dxa"/><w:right w:w="{margin}" w:type="dxa"/></w:tblCellMar></w:tblPr></w:style>
</w:styles>"#,
        font = font,
        size = size,
        line = layout.line_height.get(),
        margin = layout.table.cell_margin.get(),
    )
}

fn settings_xml(layout: &Layout) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:defaultTabStop w:val="720"/>
  <w:autoHyphenation/>
  <w:consecutiveHyphenLimit w:val="2"/>
  <w:hyphenationZone w:val="{}"/>
  <w:doNotHyphenateCaps/>
  <w:compat><w:compatSetting w:name="compatibilityMode" w:uri="http://schemas.microsoft.com/office/word" w:val="15"/></w:compat>
</w:settings>"#,
        layout.reference_indent.get()
    )
}

fn core_xml(doc: &Document) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
    );
    if !doc.title.is_empty() {
        xml.push_str(&format!("<dc:title>{}</dc:title>", escape_xml(&doc.title)));
    }
    let creators = doc.author_names();
    if !creators.is_empty() {
        xml.push_str(&format!("<dc:creator>{}</dc:creator>", escape_xml(&creators)));
    }
    if !doc.keywords.is_empty() {
        xml.push_str(&format!(
            "<cp:keywords>{}</cp:keywords>",
            escape_xml(&doc.keyword_line())
        ));
    }
    if !doc.abstract_text.is_empty() {
        xml.push_str(&format!(
            "<dc:description>{}</dc:description>",
            escape_xml(&doc.abstract_text)
        ));
    }
    xml.push_str("</cp:coreProperties>");
    xml
}
