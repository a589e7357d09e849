//! The Content Model: a plain, serializable document tree.
//!
//! A [`ContentModelDocument`] holds an ordered list of [`Block`]s; paragraphs
//! hold [`Segment`]s. Every block and segment carries a format record that is
//! independent from DOM styling, the converters in [`crate::convert`] map
//! between the two.
//!
//! The model is either derived from the live DOM on demand or retained by the
//! cache between events. It never points back into the DOM except through
//! entity wrapper ids, which stay owned by the host DOM.

mod block;
mod format;
mod normalize;
mod path;
mod segment;
mod selection;

pub use block::{
    Block, Divider, FormatContainer, ListItem, ListLevel, ListType, Paragraph, Table, TableCell,
    TableRow,
};
pub use format::{BlockFormat, Direction, SegmentFormat, TextStyle, has_segment_css};
pub use normalize::{normalize_blocks, normalize_paragraph};
pub use path::{BlockPath, GroupStep, group, group_mut, leaf_sibling, visit_blocks, visit_blocks_mut};
pub use segment::{Br, Entity, EntityFormat, Image, Segment, SelectionMarker, Text};
pub use selection::{
    SelectedItem, clear_selection, collect_selection, find_selection_marker, has_selection,
    is_collapsed, select_between_markers, selected_paragraphs,
};

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Root of the Content Model.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentModelDocument {
    pub blocks: Vec<Block>,
    /// The range selection this model was built from ran backwards.
    #[serde(default)]
    pub has_reverted_range_selection: bool,
}

impl ContentModelDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from blocks.
    #[must_use]
    pub fn with_blocks(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            has_reverted_range_selection: false,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Paragraph at `path`, if the path names a paragraph.
    #[must_use]
    pub fn paragraph(&self, path: &BlockPath) -> Option<&Paragraph> {
        path.paragraph(&self.blocks)
    }

    pub fn paragraph_mut(&mut self, path: &BlockPath) -> Option<&mut Paragraph> {
        path.paragraph_mut(&mut self.blocks)
    }

    /// Plain text of all paragraphs, one line per paragraph.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut lines = Vec::new();
        visit_blocks(&self.blocks, &mut |_, block| {
            if let Block::Paragraph(paragraph) = block {
                lines.push(paragraph.text());
            }
        });
        lines.join("\n")
    }

    /// See [`normalize_blocks`].
    pub fn normalize(&mut self) {
        normalize_blocks(&mut self.blocks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let doc = ContentModelDocument::with_blocks(vec![Block::Paragraph(Paragraph::with_segments(
            vec![
                Segment::text("hi", SegmentFormat::default().with_bold()),
                Segment::marker(SegmentFormat::default()),
            ],
        ))]);
        let json = doc.to_json().unwrap();
        assert!(json.contains("\"blockType\":\"Paragraph\""));
        assert_eq!(ContentModelDocument::from_json(&json).unwrap(), doc);
    }

    #[test]
    fn test_invalid_json_is_serialization_error() {
        let err = ContentModelDocument::from_json("{").unwrap_err();
        assert!(matches!(err, crate::Error::Serialization(_)));
    }

    #[test]
    fn test_plain_text() {
        let doc = ContentModelDocument::with_blocks(vec![
            Block::Paragraph(Paragraph::with_segments(vec![Segment::text(
                "a",
                SegmentFormat::default(),
            )])),
            Block::Paragraph(Paragraph::with_segments(vec![Segment::text(
                "b",
                SegmentFormat::default(),
            )])),
        ]);
        assert_eq!(doc.plain_text(), "a\nb");
    }
}
