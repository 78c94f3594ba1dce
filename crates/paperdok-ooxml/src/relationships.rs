//! Relationship parts (`_rels/*.rels`)
//!
//! The renderer allocates `rId`s as it embeds images; the reader resolves
//! `r:embed` references back to media paths.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};
use crate::xml::escape_attr;

/// OOXML namespace for relationships
pub const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Relationship type URIs used by the package
impl Relationships {
    pub const TYPE_OFFICE_DOCUMENT: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const TYPE_CORE_PROPERTIES: &'static str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
    pub const TYPE_STYLES: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    pub const TYPE_SETTINGS: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";
    pub const TYPE_IMAGE: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
}

/// A relationship target with its type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipTarget {
    /// Target path, relative to the owning part's folder
    pub target: String,
    /// Relationship type URI
    pub rel_type: String,
}

/// Relationships of one part, kept in insertion order
#[derive(Debug, Clone)]
pub struct Relationships {
    order: Vec<String>,
    map: HashMap<String, RelationshipTarget>,
    next_id: u32,
}

impl Default for Relationships {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            map: HashMap::new(),
            next_id: 1,
        }
    }
}

impl Relationships {
    /// Create an empty relationship set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `.rels` part
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut rels = Self::new();
        let mut max_id: u32 = 0;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    let mut id = None;
                    let mut target = None;
                    let mut rel_type = String::new();

                    for attr in e.attributes().filter_map(|a| a.ok()) {
                        let value = attr.unescape_value().ok().map(|s| s.to_string());
                        match attr.key.as_ref() {
                            b"Id" => id = value,
                            b"Target" => target = value,
                            b"Type" => rel_type = value.unwrap_or_default(),
                            _ => {}
                        }
                    }

                    if let (Some(id), Some(target)) = (id, target) {
                        if let Some(num) = id_number(&id) {
                            max_id = max_id.max(num);
                        }
                        rels.order.push(id.clone());
                        rels.map.insert(id, RelationshipTarget { target, rel_type });
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        rels.next_id = max_id + 1;
        Ok(rels)
    }

    /// Add a relationship and return its generated ID
    pub fn add(&mut self, target: impl Into<String>, rel_type: &str) -> String {
        let id = format!("rId{}", self.next_id);
        self.next_id += 1;
        self.order.push(id.clone());
        self.map.insert(
            id.clone(),
            RelationshipTarget {
                target: target.into(),
                rel_type: rel_type.to_string(),
            },
        );
        id
    }

    /// Target path for an ID
    pub fn get(&self, id: &str) -> Option<&str> {
        self.map.get(id).map(|r| r.target.as_str())
    }

    /// Whether an ID refers to an image
    pub fn is_image(&self, id: &str) -> bool {
        self.map
            .get(id)
            .is_some_and(|r| r.rel_type == Self::TYPE_IMAGE)
    }

    /// Number of relationships
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RelationshipTarget)> {
        self.order
            .iter()
            .filter_map(|id| self.map.get(id).map(|rel| (id.as_str(), rel)))
    }

    /// Serialize to a `.rels` part
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<Relationships xmlns="{}">"#, RELATIONSHIPS_NS));
        xml.push('\n');
        for (id, rel) in self.iter() {
            xml.push_str(&format!(
                "  <Relationship Id=\"{}\" Type=\"{}\" Target=\"{}\"/>\n",
                escape_attr(id),
                escape_attr(&rel.rel_type),
                escape_attr(&rel.target)
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }
}

/// Numeric part of an ID such as `rId5`
fn id_number(id: &str) -> Option<u32> {
    id.strip_prefix("rId")
        .or_else(|| id.strip_prefix("RId"))
        .or_else(|| id.strip_prefix("rid"))
        .and_then(|n| n.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_lookup() {
        let mut rels = Relationships::new();
        let styles = rels.add("styles.xml", Relationships::TYPE_STYLES);
        let image = rels.add("media/image1.png", Relationships::TYPE_IMAGE);

        assert_eq!(styles, "rId1");
        assert_eq!(image, "rId2");
        assert_eq!(rels.get("rId2"), Some("media/image1.png"));
        assert!(rels.is_image("rId2"));
        assert!(!rels.is_image("rId1"));
        assert_eq!(rels.len(), 2);
    }

    #[test]
    fn test_roundtrip() {
        let mut rels = Relationships::new();
        rels.add("styles.xml", Relationships::TYPE_STYLES);
        rels.add("media/a&b.png", Relationships::TYPE_IMAGE);

        let xml = rels.to_xml();
        assert!(xml.contains(&format!(r#"xmlns="{}""#, RELATIONSHIPS_NS)));
        assert!(xml.contains("a&amp;b.png"));

        let parsed = Relationships::parse(xml.as_bytes()).unwrap();
        assert_eq!(parsed.get("rId2"), Some("media/a&b.png"));
        let targets: Vec<&str> = parsed.iter().map(|(_, r)| r.target.as_str()).collect();
        assert_eq!(targets, vec!["styles.xml", "media/a&b.png"]);
    }

    #[test]
    fn test_add_continues_after_parsed_ids() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
        <Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
            <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
            <Relationship Id="rId7" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/x.png"/>
        </Relationships>"#;

        let mut rels = Relationships::parse(xml).unwrap();
        assert!(rels.is_image("rId7"));
        assert_eq!(rels.add("media/y.png", Relationships::TYPE_IMAGE), "rId8");
    }

    #[test]
    fn test_id_number() {
        assert_eq!(id_number("rId12"), Some(12));
        assert_eq!(id_number("RId5"), Some(5));
        assert_eq!(id_number("image"), None);
    }
}
