//! Render results and recoverable-failure reporting

use serde::Serialize;

use crate::labels::Label;
use crate::table::TableFix;

/// What happened to a block that could not be rendered as supplied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoteKind {
    /// Table content was synthesized
    TablePlaceholder { fixes: Vec<TableFix> },
    /// An image was replaced by placeholder text
    ImagePlaceholder { reason: String },
}

/// One recoverable rendering event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderNote {
    /// Number of the affected table or figure
    pub label: Label,
    #[serde(flatten)]
    pub kind: NoteKind,
}

/// Recoverable events collected during one render call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderReport {
    pub notes: Vec<RenderNote>,
    /// Rough page count from the renderer's running layout estimate
    pub estimated_pages: usize,
}

impl RenderReport {
    /// Whether any table content was synthesized
    pub fn synthesized(&self) -> bool {
        self.notes
            .iter()
            .any(|n| matches!(n.kind, NoteKind::TablePlaceholder { .. }))
    }

    /// Labels of tables with synthesized content
    pub fn synthesized_tables(&self) -> Vec<Label> {
        self.notes
            .iter()
            .filter(|n| matches!(n.kind, NoteKind::TablePlaceholder { .. }))
            .map(|n| n.label)
            .collect()
    }

    /// Labels of figures replaced by placeholder text
    pub fn image_placeholders(&self) -> Vec<Label> {
        self.notes
            .iter()
            .filter(|n| matches!(n.kind, NoteKind::ImagePlaceholder { .. }))
            .map(|n| n.label)
            .collect()
    }

    /// True when every block rendered as supplied
    pub fn is_clean(&self) -> bool {
        self.notes.is_empty()
    }
}

/// A rendered document plus its report
#[derive(Debug, Clone)]
pub struct RenderOutput<T> {
    pub output: T,
    pub report: RenderReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_flags() {
        let label = Label {
            section: 2,
            number: 1,
        };
        let mut report = RenderReport::default();
        assert!(report.is_clean());
        assert!(!report.synthesized());

        report.notes.push(RenderNote {
            label,
            kind: NoteKind::ImagePlaceholder {
                reason: "empty image data".to_string(),
            },
        });
        assert!(!report.synthesized());
        assert_eq!(report.image_placeholders(), vec![label]);

        report.notes.push(RenderNote {
            label,
            kind: NoteKind::TablePlaceholder {
                fixes: vec![TableFix::MissingRows],
            },
        });
        assert!(report.synthesized());
        assert_eq!(report.synthesized_tables(), vec![label]);
    }

    #[test]
    fn test_note_serialization() {
        let note = RenderNote {
            label: Label {
                section: 1,
                number: 3,
            },
            kind: NoteKind::TablePlaceholder {
                fixes: vec![TableFix::MissingHeaders],
            },
        };
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["kind"], "table_placeholder");
        assert_eq!(json["fixes"][0], "missing_headers");
        assert_eq!(json["label"]["number"], 3);
    }
}
