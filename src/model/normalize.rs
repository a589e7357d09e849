//! Model clean-up after editing.

use crate::model::block::{Block, Paragraph};
use crate::model::segment::Segment;

/// Normalize a group of blocks in place:
///
/// - list items without levels are unwrapped into their parent group
/// - empty paragraphs, list items and format containers are dropped
/// - paragraphs are normalized with [`normalize_paragraph`]
pub fn normalize_blocks(blocks: &mut Vec<Block>) {
    for i in (0..blocks.len()).rev() {
        let unwrap = matches!(&blocks[i], Block::ListItem(item) if item.levels.is_empty());
        if unwrap {
            if let Block::ListItem(mut item) = blocks.remove(i) {
                normalize_blocks(&mut item.blocks);
                blocks.splice(i..i, item.blocks);
            }
            continue;
        }

        match &mut blocks[i] {
            Block::Paragraph(paragraph) => normalize_paragraph(paragraph),
            Block::ListItem(item) => normalize_blocks(&mut item.blocks),
            Block::FormatContainer(container) => normalize_blocks(&mut container.blocks),
            Block::Table(table) => {
                for cell in table.rows.iter_mut().flat_map(|row| row.cells.iter_mut()) {
                    normalize_blocks(&mut cell.blocks);
                }
            }
            Block::Entity(_) | Block::Divider(_) => {}
        }

        if blocks[i].is_empty() {
            blocks.remove(i);
        }
    }
}

/// Normalize the segments of one paragraph:
///
/// - empty text segments are removed
/// - adjacent text with the same format and selection state is merged
/// - a paragraph holding only markers gets a `Br` so it keeps a line box
/// - a trailing `Br` after visible content is dropped (browsers don't show it)
pub fn normalize_paragraph(paragraph: &mut Paragraph) {
    let segments = &mut paragraph.segments;
    segments.retain(|segment| !matches!(segment, Segment::Text(text) if text.text.is_empty()));

    let mut merged: Vec<Segment> = Vec::with_capacity(segments.len());
    for segment in segments.drain(..) {
        if let (Some(Segment::Text(last)), Segment::Text(next)) = (merged.last_mut(), &segment) {
            if last.format == next.format && last.is_selected == next.is_selected {
                last.text.push_str(&next.text);
                continue;
            }
        }
        merged.push(segment);
    }
    *segments = merged;

    if !segments.is_empty() && segments.iter().all(Segment::is_marker) {
        let format = segments
            .last()
            .map(|s| s.format().clone())
            .unwrap_or_default();
        segments.push(Segment::br(format));
        return;
    }

    let visible: Vec<usize> = segments
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.is_marker())
        .map(|(i, _)| i)
        .collect();
    if let [.., before, last] = visible.as_slice() {
        if segments[*last].is_br() && !segments[*before].is_br() {
            segments.remove(*last);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::block::{ListItem, ListLevel, ListType};
    use crate::model::format::SegmentFormat;

    fn text(s: &str) -> Segment {
        Segment::text(s, SegmentFormat::default())
    }

    fn marker() -> Segment {
        Segment::marker(SegmentFormat::default())
    }

    fn br() -> Segment {
        Segment::br(SegmentFormat::default())
    }

    #[test]
    fn test_merge_and_drop_empty_text() {
        let mut paragraph = Paragraph::with_segments(vec![text("a"), text(""), text("b"), marker()]);
        normalize_paragraph(&mut paragraph);
        assert_eq!(paragraph.segments, vec![text("ab"), marker()]);
    }

    #[test]
    fn test_different_format_is_not_merged() {
        let bold = Segment::text("b", SegmentFormat::default().with_bold());
        let mut paragraph = Paragraph::with_segments(vec![text("a"), bold.clone()]);
        normalize_paragraph(&mut paragraph);
        assert_eq!(paragraph.segments, vec![text("a"), bold]);
    }

    #[test]
    fn test_marker_only_gets_br() {
        let mut paragraph = Paragraph::with_segments(vec![marker()]);
        normalize_paragraph(&mut paragraph);
        assert_eq!(paragraph.segments, vec![marker(), br()]);
    }

    #[test]
    fn test_trailing_br() {
        let mut paragraph = Paragraph::with_segments(vec![text("a"), marker(), br()]);
        normalize_paragraph(&mut paragraph);
        assert_eq!(paragraph.segments, vec![text("a"), marker()]);

        let mut double = Paragraph::with_segments(vec![text("a"), br(), br()]);
        normalize_paragraph(&mut double);
        assert_eq!(double.segments.len(), 3);

        let mut only = Paragraph::with_segments(vec![br()]);
        normalize_paragraph(&mut only);
        assert_eq!(only.segments, vec![br()]);
    }

    #[test]
    fn test_empty_blocks_removed_and_levelless_list_unwrapped() {
        let mut blocks = vec![
            Block::Paragraph(Paragraph::new(false)),
            Block::ListItem(ListItem {
                levels: vec![],
                blocks: vec![Block::Paragraph(Paragraph::with_segments(vec![text("x")]))],
                format: Default::default(),
            }),
            Block::ListItem(ListItem {
                levels: vec![ListLevel {
                    list_type: ListType::Unordered,
                }],
                blocks: vec![Block::Paragraph(Paragraph::new(false))],
                format: Default::default(),
            }),
        ];
        normalize_blocks(&mut blocks);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].as_paragraph().unwrap().text(), "x");
    }
}
