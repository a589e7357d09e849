//! Paragraph splitting shared by Enter, paste and block insertion.

use crate::edit::delete_selection::InsertPoint;
use crate::model::{Block, BlockPath, ContentModelDocument, Paragraph, Segment, SegmentFormat};

/// Split the paragraph at `path` before segment `at`. The second half is
/// inserted right after it and its path returned.
///
/// Both halves become explicit paragraphs with the original block format.
/// A half left with nothing but markers gets a `Br` to keep its line.
pub fn split_paragraph(
    model: &mut ContentModelDocument,
    path: &BlockPath,
    at: usize,
) -> Option<BlockPath> {
    let group = path.group_mut(&mut model.blocks)?;
    let Some(Block::Paragraph(paragraph)) = group.get_mut(path.index) else {
        return None;
    };
    let at = at.min(paragraph.segments.len());
    let tail = paragraph.segments.split_off(at);
    let mut second = Paragraph {
        segments: tail,
        format: paragraph.format.clone(),
        segment_format: paragraph.segment_format.clone(),
        decorator: paragraph.decorator.clone(),
        is_implicit: false,
    };
    paragraph.is_implicit = false;
    keep_line(paragraph);
    keep_line(&mut second);
    group.insert(path.index + 1, Block::Paragraph(second));
    Some(path.with_index(path.index + 1))
}

/// Append an explicit paragraph holding only a caret, for inserting into a
/// model that has no selection.
pub fn append_caret_paragraph(model: &mut ContentModelDocument) -> InsertPoint {
    model.blocks.push(Block::Paragraph(Paragraph::with_segments(vec![
        Segment::marker(SegmentFormat::default()),
    ])));
    InsertPoint {
        path: BlockPath::root(model.blocks.len() - 1),
        marker_index: 0,
    }
}

fn keep_line(paragraph: &mut Paragraph) {
    if paragraph.segments.iter().all(Segment::is_marker) {
        let format = paragraph
            .segments
            .last()
            .map(|segment| segment.format().clone())
            .unwrap_or_else(SegmentFormat::default);
        paragraph.segments.push(Segment::br(format));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_in_middle() {
        let mut paragraph = Paragraph::new(true);
        paragraph.decorator = Some("h1".to_string());
        paragraph.segments = vec![
            Segment::text("ab", SegmentFormat::default()),
            Segment::marker(SegmentFormat::default()),
            Segment::text("cd", SegmentFormat::default()),
        ];
        let mut model = ContentModelDocument::with_blocks(vec![Block::Paragraph(paragraph)]);
        let second = split_paragraph(&mut model, &BlockPath::root(0), 1).unwrap();
        assert_eq!(second, BlockPath::root(1));
        let first = model.blocks[0].as_paragraph().unwrap();
        let next = model.blocks[1].as_paragraph().unwrap();
        assert!(!first.is_implicit);
        assert_eq!(first.text(), "ab");
        assert_eq!(next.marker_index(), Some(0));
        assert_eq!(next.decorator.as_deref(), Some("h1"));
    }

    #[test]
    fn test_split_at_start_keeps_line() {
        let mut model = ContentModelDocument::with_blocks(vec![Block::Paragraph(
            Paragraph::with_segments(vec![Segment::marker(SegmentFormat::default())]),
        )]);
        split_paragraph(&mut model, &BlockPath::root(0), 0).unwrap();
        let first = model.blocks[0].as_paragraph().unwrap();
        let second = model.blocks[1].as_paragraph().unwrap();
        assert!(first.segments[0].is_br());
        assert!(second.segments[0].is_marker());
        assert!(second.segments[1].is_br());
    }

    #[test]
    fn test_split_requires_paragraph() {
        let mut model = ContentModelDocument::new();
        assert_eq!(split_paragraph(&mut model, &BlockPath::root(0), 0), None);
    }
}
