//! Blocks and block groups.

use crate::model::format::{BlockFormat, SegmentFormat};
use crate::model::segment::{Entity, Segment};
use serde::{Deserialize, Serialize};

/// A run of segments rendered as one line box.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub format: BlockFormat,
    /// Segment format applied to the paragraph element itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_format: Option<SegmentFormat>,
    /// Heading or `p` tag; `None` writes a `div`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decorator: Option<String>,
    /// Synthesized around inline content that had no block element of its
    /// own. Implicit paragraphs without format write no wrapper element.
    #[serde(default)]
    pub is_implicit: bool,
}

impl Paragraph {
    #[must_use]
    pub fn new(is_implicit: bool) -> Self {
        Self {
            is_implicit,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_segments(segments: Vec<Segment>) -> Self {
        Self {
            segments,
            ..Self::default()
        }
    }

    /// Index of the first selection marker.
    #[must_use]
    pub fn marker_index(&self) -> Option<usize> {
        self.segments.iter().position(Segment::is_marker)
    }

    /// Concatenated text of the text segments.
    #[must_use]
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .filter_map(Segment::as_text)
            .map(|text| text.text.as_str())
            .collect()
    }

    /// Whether the paragraph needs its own wrapper element.
    #[must_use]
    pub fn needs_wrapper(&self) -> bool {
        !self.is_implicit
            || self.decorator.is_some()
            || !self.format.is_empty()
            || self.segment_format.as_ref().is_some_and(|f| !f.is_empty())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListType {
    Ordered,
    Unordered,
}

impl ListType {
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Ordered => "ol",
            Self::Unordered => "ul",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLevel {
    pub list_type: ListType,
}

/// One `li`. Nested lists are expressed by a longer `levels` stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub levels: Vec<ListLevel>,
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub format: BlockFormat,
}

/// `blockquote` or `pre` holding child blocks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatContainer {
    pub tag: String,
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub format: BlockFormat,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Divider {
    pub tag: String,
    #[serde(default)]
    pub is_selected: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub is_header: bool,
    #[serde(default)]
    pub is_selected: bool,
    #[serde(default)]
    pub format: BlockFormat,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub rows: Vec<TableRow>,
    #[serde(default)]
    pub format: BlockFormat,
}

/// A block of the document.
///
/// `Entity` is opaque: editing steps may move or drop it wholesale but never
/// look inside.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "blockType")]
pub enum Block {
    Paragraph(Paragraph),
    Entity(Entity),
    Table(Table),
    ListItem(ListItem),
    FormatContainer(FormatContainer),
    Divider(Divider),
}

impl Block {
    #[must_use]
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Self::Paragraph(paragraph) => Some(paragraph),
            _ => None,
        }
    }

    pub fn as_paragraph_mut(&mut self) -> Option<&mut Paragraph> {
        match self {
            Self::Paragraph(paragraph) => Some(paragraph),
            _ => None,
        }
    }

    /// Child blocks of a list item or format container.
    #[must_use]
    pub fn child_blocks(&self) -> Option<&Vec<Block>> {
        match self {
            Self::ListItem(item) => Some(&item.blocks),
            Self::FormatContainer(container) => Some(&container.blocks),
            _ => None,
        }
    }

    pub fn child_blocks_mut(&mut self) -> Option<&mut Vec<Block>> {
        match self {
            Self::ListItem(item) => Some(&mut item.blocks),
            Self::FormatContainer(container) => Some(&mut container.blocks),
            _ => None,
        }
    }

    /// Whether normalization may drop this block.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Paragraph(paragraph) => paragraph.segments.is_empty(),
            Self::Table(table) => table.rows.iter().all(|row| row.cells.is_empty()),
            Self::ListItem(item) => item.blocks.is_empty(),
            Self::FormatContainer(container) => container.blocks.is_empty(),
            Self::Entity(_) | Self::Divider(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_text_and_marker() {
        let paragraph = Paragraph::with_segments(vec![
            Segment::text("ab", SegmentFormat::default()),
            Segment::marker(SegmentFormat::default()),
            Segment::text("c", SegmentFormat::default()),
        ]);
        assert_eq!(paragraph.text(), "abc");
        assert_eq!(paragraph.marker_index(), Some(1));
    }

    #[test]
    fn test_needs_wrapper() {
        assert!(Paragraph::new(false).needs_wrapper());
        assert!(!Paragraph::new(true).needs_wrapper());
        let mut heading = Paragraph::new(true);
        heading.decorator = Some("h1".to_string());
        assert!(heading.needs_wrapper());
    }

    #[test]
    fn test_block_emptiness() {
        assert!(Block::Paragraph(Paragraph::new(false)).is_empty());
        assert!(
            !Block::Divider(Divider {
                tag: "hr".to_string(),
                is_selected: false
            })
            .is_empty()
        );
        assert!(Block::Table(Table::default()).is_empty());
    }
}
