//! paperdok-model - canonical document model
//!
//! This crate holds everything the renderers agree on:
//!
//! - the [`Document`] tree and its [`DocumentBuilder`]
//! - the canonical length unit [`Twips`] and the shared [`LAYOUT`] table
//! - render-time helpers that must behave identically in every renderer:
//!   table normalization, figure measurement, numbering and caption text
//!
//! # Example
//!
//! ```
//! use paperdok_model::DocumentBuilder;
//!
//! let doc = DocumentBuilder::from_json_str(r#"{"title": "On Twips"}"#)?;
//! assert_eq!(doc.title, "On Twips");
//! # Ok::<(), paperdok_model::ValidationError>(())
//! ```

pub mod block;
pub mod builder;
pub mod document;
pub mod error;
pub mod figure;
pub mod inline;
pub mod labels;
pub mod layout;
pub mod report;
pub mod state;
pub mod table;
pub mod units;

pub use block::{
    ContentBlock, ImageBlock, ReferenceBlock, SectionBlock, SizeClass, SubsectionBlock,
    TableBlock, TextBlock, DEFAULT_ORDER,
};
pub use builder::DocumentBuilder;
pub use document::{Author, Document, Section};
pub use error::{Result, ValidationError};
pub use figure::{prepare_figure, FigureError, FigureFormat, PreparedFigure};
pub use inline::TextRun;
pub use labels::Label;
pub use layout::{Layout, LAYOUT};
pub use report::{NoteKind, RenderNote, RenderOutput, RenderReport};
pub use state::RenderState;
pub use table::{NormalizedTable, TableFix};
pub use units::Twips;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
