//! # paperdok-html
//!
//! Renders a [`paperdok_model::Document`] to one self-contained HTML page
//! with print CSS. The page mirrors the DOCX output: the same numbering,
//! captions, table normalization and figure sizes, with every length
//! derived from the shared layout table.
//!
//! ```
//! use paperdok_html::HtmlRenderer;
//! use paperdok_model::DocumentBuilder;
//!
//! let doc = DocumentBuilder::from_json_str(r#"{"title": "Hello"}"#).unwrap();
//! let page = HtmlRenderer::new().render(&doc).output;
//! assert!(page.contains(r#"<h1 class="title">Hello</h1>"#));
//! ```

pub mod css;
pub mod renderer;

pub use css::{css_length, parse_css_length, stylesheet, CssUnit};
pub use renderer::{html_escape, HtmlRenderer};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
