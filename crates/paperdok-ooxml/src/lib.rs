//! # paperdok-ooxml
//!
//! DOCX output for paperdok.
//!
//! This crate provides:
//! - [`DocxRenderer`], which turns a [`paperdok_model::Document`] into a
//!   complete two-column DOCX package
//! - a typed WordprocessingML fragment builder ([`xml`])
//! - [`DocxContent`], which reads a package back into its layout flow for
//!   local PDF conversion
//!
//! ## Example
//!
//! ```
//! use paperdok_model::DocumentBuilder;
//! use paperdok_ooxml::{DocxContent, DocxRenderer};
//!
//! let doc = DocumentBuilder::from_json_str(r#"{"title": "Hello"}"#).unwrap();
//! let rendered = DocxRenderer::new().render(&doc)?;
//! assert!(rendered.output.starts_with(b"PK"));
//!
//! let content = DocxContent::from_bytes(&rendered.output)?;
//! assert_eq!(content.flow.paragraphs().next().unwrap().text(), "Hello");
//! # Ok::<(), paperdok_ooxml::OoxmlError>(())
//! ```

pub mod archive;
pub mod error;
pub mod package;
pub mod reader;
pub mod relationships;
pub mod units;
pub mod writer;
pub mod xml;

#[cfg(test)]
pub(crate) mod test_utils;

pub use archive::OoxmlArchive;
pub use error::{OoxmlError, Result};
pub use reader::{
    DocxContent, FlowBlock, FlowCell, FlowDocument, FlowImage, FlowParagraph, FlowRow, FlowRun,
    FlowTable,
};
pub use relationships::Relationships;
pub use writer::DocxRenderer;
pub use xml::Justification;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
