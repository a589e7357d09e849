//! Pasting HTML at the selection.

use crate::convert;
use crate::dom::NodeId;
use crate::edit::delete_selection::{InsertPoint, collect_entities, delete_selection};
use crate::edit::paragraph::{append_caret_paragraph, split_paragraph};
use crate::editor::{EditorCore, FormatOptions};
use crate::error::Result;
use crate::input::RawEvent;
use crate::model::{Block, ContentModelDocument, Segment, clear_selection};
use crate::plugin::ChangeSource;

/// Replace the selection with the content of `html`. Returns whether
/// anything was inserted.
pub fn paste(core: &mut EditorCore, html: &str) -> Result<bool> {
    core.ensure_alive()?;
    let container = core.dom_mut().create_element("div");
    let result = paste_from(core, container, html);
    // Entity wrappers were moved into the editor; only leftovers go.
    core.dom_mut().release(container);
    result
}

fn paste_from(core: &mut EditorCore, container: NodeId, html: &str) -> Result<bool> {
    core.dom_mut().set_inner_html(container, html)?;
    let mut pasted = convert::create_content_model(core.dom(), container, None, None);
    clear_selection(&mut pasted.blocks);
    pasted.normalize();
    if pasted.blocks.is_empty() {
        tracing::debug!("nothing to paste");
        return Ok(false);
    }
    let new_entities = collect_entities(&pasted.blocks);

    let options = FormatOptions::new("paste")
        .with_source(ChangeSource::Paste)
        .with_raw_event(RawEvent::Paste);
    core.format_content_model(
        move |model, context| {
            let result = delete_selection(model, &[], Some(context));
            let point = match result.insert_point {
                Some(point) => point,
                None => append_caret_paragraph(model),
            };
            merge_model(model, &point, pasted.blocks);
            context.new_entities.extend(new_entities);
            model.normalize();
            true
        },
        options,
    )
}

/// Insert `blocks` at the caret. A single paragraph is inlined; otherwise
/// the caret paragraph is split, the first and last pasted paragraphs join
/// the two halves and the rest goes in between. The caret ends up after
/// the pasted content.
pub fn merge_model(model: &mut ContentModelDocument, point: &InsertPoint, mut blocks: Vec<Block>) {
    if blocks.len() == 1 && matches!(blocks[0], Block::Paragraph(_)) {
        if let (Some(Block::Paragraph(source)), Some(paragraph)) =
            (blocks.pop(), model.paragraph_mut(&point.path))
        {
            let at = point.marker_index.min(paragraph.segments.len());
            paragraph.segments.splice(at..at, source.segments);
        }
        return;
    }

    let Some(tail_path) = split_paragraph(model, &point.path, point.marker_index) else {
        return;
    };
    let first = match blocks.first() {
        Some(Block::Paragraph(_)) => Some(blocks.remove(0)),
        _ => None,
    };
    let last = match blocks.last() {
        Some(Block::Paragraph(_)) => blocks.pop(),
        _ => None,
    };

    if let (Some(Block::Paragraph(first)), Some(head)) = (first, model.paragraph_mut(&point.path)) {
        if head.segments.iter().all(Segment::is_br) {
            head.segments.clear();
        }
        head.segments.extend(first.segments);
    }
    if let (Some(Block::Paragraph(last)), Some(tail)) = (last, model.paragraph_mut(&tail_path)) {
        tail.segments.splice(0..0, last.segments);
    }
    if let Some(group) = tail_path.group_mut(&mut model.blocks) {
        let at = tail_path.index.min(group.len());
        group.splice(at..at, blocks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockPath, Paragraph, SegmentFormat, find_selection_marker};

    fn text(s: &str) -> Segment {
        Segment::text(s, SegmentFormat::default())
    }

    fn paragraph(segments: Vec<Segment>) -> Block {
        Block::Paragraph(Paragraph::with_segments(segments))
    }

    fn caret_model() -> ContentModelDocument {
        ContentModelDocument::with_blocks(vec![paragraph(vec![
            text("ab"),
            Segment::marker(SegmentFormat::default()),
            text("cd"),
        ])])
    }

    fn point() -> InsertPoint {
        InsertPoint {
            path: BlockPath::root(0),
            marker_index: 1,
        }
    }

    #[test]
    fn test_single_paragraph_is_inlined() {
        let mut model = caret_model();
        merge_model(&mut model, &point(), vec![paragraph(vec![text("X")])]);
        model.normalize();
        assert_eq!(model.plain_text(), "abXcd");
        assert_eq!(find_selection_marker(&model.blocks), Some((BlockPath::root(0), 1)));
    }

    #[test]
    fn test_multiple_paragraphs_split_the_caret_paragraph() {
        let mut model = caret_model();
        merge_model(
            &mut model,
            &point(),
            vec![
                paragraph(vec![text("1")]),
                paragraph(vec![text("2")]),
                paragraph(vec![text("3")]),
            ],
        );
        model.normalize();
        assert_eq!(model.plain_text(), "ab1\n2\n3cd");
        assert_eq!(find_selection_marker(&model.blocks), Some((BlockPath::root(2), 1)));
    }
}
