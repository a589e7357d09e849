//! Deletion steps for a collapsed caret.
//!
//! Each step looks at the insert point left by the selection deletion and
//! either deletes something, setting the result, or leaves the context
//! untouched for the next step.

use crate::edit::delete_selection::{DeleteResult, DeleteSelectionContext, InsertPoint};
use crate::model::{
    Block, BlockPath, GroupStep, Segment, find_selection_marker, leaf_sibling,
};
use crate::plugin::EntityOperation;
use crate::unicode::{CharClass, classify, first_grapheme, last_grapheme, remove_grapheme};

/// Delete one grapheme or inline segment after the caret, or join the next
/// block when the caret is at the end of its paragraph.
pub fn forward_delete_collapsed(context: &mut DeleteSelectionContext<'_>) {
    delete_collapsed(context, true);
}

/// Delete one grapheme or inline segment before the caret, or join the
/// previous block when the caret is at the start of its paragraph.
pub fn backward_delete_collapsed(context: &mut DeleteSelectionContext<'_>) {
    delete_collapsed(context, false);
}

/// Delete the word after the caret plus the spaces following it.
pub fn forward_delete_word(context: &mut DeleteSelectionContext<'_>) {
    delete_word(context, true);
}

/// Delete the spaces before the caret plus the word preceding them.
pub fn backward_delete_word(context: &mut DeleteSelectionContext<'_>) {
    delete_word(context, false);
}

/// Delete everything between the start of the paragraph and the caret.
pub fn delete_all_segment_before(context: &mut DeleteSelectionContext<'_>) {
    let Some(point) = context.insert_point.clone() else {
        return;
    };
    if point.marker_index == 0 {
        return;
    }
    let Some(paragraph) = context.paragraph_mut() else {
        return;
    };
    let removed: Vec<Segment> = paragraph.segments.drain(..point.marker_index).collect();
    for segment in removed {
        if let Segment::Entity(entity) = segment {
            context.delete_entity(entity, EntityOperation::Overwrite);
        }
    }
    context.refresh_marker();
    context.delete_result = DeleteResult::Range;
}

fn delete_collapsed(context: &mut DeleteSelectionContext<'_>, forward: bool) {
    let Some(point) = context.insert_point.clone() else {
        return;
    };
    let Some(paragraph) = context.model.paragraph_mut(&point.path) else {
        return;
    };
    let len = paragraph.segments.len();
    let neighbor = if forward {
        Some(point.marker_index + 1).filter(|i| *i < len)
    } else {
        point.marker_index.checked_sub(1)
    };
    // A trailing Br only holds the line box of an empty paragraph.
    let neighbor = neighbor.filter(|i| !(forward && *i == len - 1 && paragraph.segments[*i].is_br()));

    match neighbor {
        Some(index) => delete_segment(context, &point, index, forward),
        None if forward => join_next(context, &point),
        None => {
            if !outdent_list_item(context, &point) {
                join_previous(context, &point);
            }
        }
    }
}

fn delete_segment(
    context: &mut DeleteSelectionContext<'_>,
    point: &InsertPoint,
    index: usize,
    forward: bool,
) {
    let Some(paragraph) = context.model.paragraph_mut(&point.path) else {
        return;
    };
    let remove = match &mut paragraph.segments[index] {
        Segment::Text(text) => {
            remove_grapheme(&mut text.text, forward);
            text.text.is_empty()
        }
        Segment::SelectionMarker(_) => false,
        Segment::Br(_) | Segment::Image(_) | Segment::Entity(_) => true,
    };
    if remove {
        if let Segment::Entity(entity) = paragraph.segments.remove(index) {
            context.delete_entity(entity, entity_operation(forward));
        }
    }
    context.refresh_marker();
    context.delete_result = DeleteResult::SingleChar;
}

/// Forward deletion reaches an entity's start, backward deletion its end.
const fn entity_operation(forward: bool) -> EntityOperation {
    if forward {
        EntityOperation::RemoveFromStart
    } else {
        EntityOperation::RemoveFromEnd
    }
}

fn join_next(context: &mut DeleteSelectionContext<'_>, point: &InsertPoint) {
    let blocks = &mut context.model.blocks;
    let Some(next) = leaf_sibling(blocks, &point.path, true) else {
        return;
    };
    match neighbor_kind(blocks, &next) {
        Some(NeighborKind::Paragraph) => {
            let Some(Block::Paragraph(removed)) = remove_block_at(blocks, &next) else {
                return;
            };
            let Some(paragraph) = point.path.paragraph_mut(blocks) else {
                return;
            };
            if paragraph.segments.last().is_some_and(Segment::is_br) {
                paragraph.segments.pop();
            }
            paragraph.segments.extend(removed.segments);
        }
        Some(NeighborKind::Table) | None => return,
        Some(NeighborKind::Removable) => {
            if let Some(Block::Entity(entity)) = remove_block_at(blocks, &next) {
                context.delete_entity(entity, EntityOperation::RemoveFromStart);
            }
        }
    }
    context.refresh_marker();
    context.delete_result = DeleteResult::Range;
}

fn join_previous(context: &mut DeleteSelectionContext<'_>, point: &InsertPoint) {
    let blocks = &mut context.model.blocks;
    let Some(previous) = leaf_sibling(blocks, &point.path, false) else {
        return;
    };
    match neighbor_kind(blocks, &previous) {
        Some(NeighborKind::Paragraph) => {
            let Some(Block::Paragraph(current)) = remove_block_at(blocks, &point.path) else {
                return;
            };
            let Some(paragraph) = previous.paragraph_mut(blocks) else {
                return;
            };
            if paragraph.segments.last().is_some_and(Segment::is_br) {
                paragraph.segments.pop();
            }
            paragraph.segments.extend(current.segments);
        }
        Some(NeighborKind::Table) | None => return,
        Some(NeighborKind::Removable) => {
            if let Some(Block::Entity(entity)) = remove_block_at(blocks, &previous) {
                context.delete_entity(entity, EntityOperation::RemoveFromEnd);
            }
        }
    }
    relocate_marker(context);
    context.delete_result = DeleteResult::Range;
}

/// Backspace at the very start of a list item removes one list level. A
/// list item left without levels is unwrapped by normalization.
fn outdent_list_item(context: &mut DeleteSelectionContext<'_>, point: &InsertPoint) -> bool {
    if point.marker_index != 0 || point.path.index != 0 {
        return false;
    }
    if !matches!(point.path.groups.last(), Some(GroupStep::Child(_))) {
        return false;
    }
    let Some(parent) = point.path.parent() else {
        return false;
    };
    let Some(Block::ListItem(item)) = parent.block_mut(&mut context.model.blocks) else {
        return false;
    };
    item.levels.pop();
    context.delete_result = DeleteResult::Range;
    true
}

fn delete_word(context: &mut DeleteSelectionContext<'_>, forward: bool) {
    let Some(point) = context.insert_point.clone() else {
        return;
    };
    let Some(paragraph) = context.model.paragraph_mut(&point.path) else {
        return;
    };
    let indices: Vec<usize> = if forward {
        (point.marker_index + 1..paragraph.segments.len()).collect()
    } else {
        (0..point.marker_index).rev().collect()
    };

    let mut state = WordState::Start;
    let mut deleted = false;
    'segments: for index in indices {
        let Segment::Text(text) = &mut paragraph.segments[index] else {
            break;
        };
        loop {
            let grapheme = if forward {
                first_grapheme(&text.text)
            } else {
                last_grapheme(&text.text)
            };
            let Some(grapheme) = grapheme else {
                break;
            };
            let Some(next) = state.accept(classify(grapheme), forward) else {
                break 'segments;
            };
            state = next;
            remove_grapheme(&mut text.text, forward);
            deleted = true;
        }
    }

    if !deleted {
        return;
    }
    paragraph
        .segments
        .retain(|segment| !matches!(segment, Segment::Text(text) if text.text.is_empty()));
    context.refresh_marker();
    context.delete_result = DeleteResult::Range;
}

/// Progress of a word deletion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WordState {
    Start,
    /// Backward: spaces next to the caret skipped so far.
    LeadingSpaces,
    Word(CharClass),
    /// Forward: spaces after the word.
    TrailingSpaces,
}

impl WordState {
    /// State after consuming a grapheme of `class`, or `None` to stop.
    fn accept(self, class: CharClass, forward: bool) -> Option<Self> {
        match (self, class) {
            (Self::Start | Self::LeadingSpaces, CharClass::Space) => Some(if forward {
                Self::TrailingSpaces
            } else {
                Self::LeadingSpaces
            }),
            (Self::Start | Self::LeadingSpaces, class) => Some(Self::Word(class)),
            (Self::Word(word), class) if word == class => Some(self),
            (Self::Word(_), CharClass::Space) if forward => Some(Self::TrailingSpaces),
            (Self::TrailingSpaces, CharClass::Space) => Some(self),
            _ => None,
        }
    }
}

/// How a joining deletion treats the neighboring leaf block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NeighborKind {
    Paragraph,
    /// Never merged into or deleted across.
    Table,
    /// Entity, divider or empty group: removed whole.
    Removable,
}

fn neighbor_kind(blocks: &[Block], path: &BlockPath) -> Option<NeighborKind> {
    Some(match path.block(blocks)? {
        Block::Paragraph(_) => NeighborKind::Paragraph,
        Block::Table(_) => NeighborKind::Table,
        _ => NeighborKind::Removable,
    })
}

fn remove_block_at(blocks: &mut Vec<Block>, path: &BlockPath) -> Option<Block> {
    crate::edit::delete_selection::remove_block(blocks, path)
}

/// Find the marker again after blocks before it were removed.
fn relocate_marker(context: &mut DeleteSelectionContext<'_>) {
    context.insert_point = find_selection_marker(&context.model.blocks)
        .map(|(path, marker_index)| InsertPoint { path, marker_index });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::delete_selection::delete_selection;
    use crate::model::{
        ContentModelDocument, Entity, EntityFormat, ListItem, ListLevel, ListType, Paragraph,
        SegmentFormat,
    };
    use crate::dom::Dom;

    fn text(s: &str) -> Segment {
        Segment::text(s, SegmentFormat::default())
    }

    fn marker() -> Segment {
        Segment::marker(SegmentFormat::default())
    }

    fn paragraph(segments: Vec<Segment>) -> Block {
        Block::Paragraph(Paragraph::with_segments(segments))
    }

    fn run(
        blocks: Vec<Block>,
        step: fn(&mut DeleteSelectionContext<'_>),
    ) -> (ContentModelDocument, DeleteResult) {
        let mut model = ContentModelDocument::with_blocks(blocks);
        let result = delete_selection(&mut model, &[Some(step)], None);
        model.normalize();
        (model, result.delete_result)
    }

    #[test]
    fn test_backspace_one_grapheme() {
        let (model, result) = run(
            vec![paragraph(vec![text("ae\u{301}"), marker(), text("x")])],
            backward_delete_collapsed,
        );
        assert_eq!(result, DeleteResult::SingleChar);
        assert_eq!(model.plain_text(), "ax");
    }

    #[test]
    fn test_delete_forward_one_grapheme() {
        let (model, result) = run(
            vec![paragraph(vec![text("a"), marker(), text("👍🏽b")])],
            forward_delete_collapsed,
        );
        assert_eq!(result, DeleteResult::SingleChar);
        assert_eq!(model.plain_text(), "ab");
    }

    #[test]
    fn test_backspace_at_start_joins_previous() {
        let (model, result) = run(
            vec![
                paragraph(vec![text("ab")]),
                paragraph(vec![marker(), text("cd")]),
            ],
            backward_delete_collapsed,
        );
        assert_eq!(result, DeleteResult::Range);
        assert_eq!(model.blocks.len(), 1);
        assert_eq!(model.plain_text(), "abcd");
        assert_eq!(find_selection_marker(&model.blocks), Some((BlockPath::root(0), 1)));
    }

    #[test]
    fn test_delete_at_end_joins_next() {
        let (model, result) = run(
            vec![
                paragraph(vec![marker(), Segment::br(SegmentFormat::default())]),
                paragraph(vec![text("cd")]),
            ],
            forward_delete_collapsed,
        );
        assert_eq!(result, DeleteResult::Range);
        assert_eq!(model.blocks.len(), 1);
        assert_eq!(model.plain_text(), "cd");
    }

    #[test]
    fn test_backspace_at_document_start_does_nothing() {
        let (_, result) = run(
            vec![paragraph(vec![marker(), text("cd")])],
            backward_delete_collapsed,
        );
        assert_eq!(result, DeleteResult::NotDeleted);
    }

    #[test]
    fn test_backspace_in_list_item_outdents() {
        let item = Block::ListItem(ListItem {
            levels: vec![ListLevel {
                list_type: ListType::Unordered,
            }],
            blocks: vec![paragraph(vec![marker(), text("x")])],
            format: Default::default(),
        });
        let (model, result) = run(vec![paragraph(vec![text("a")]), item], backward_delete_collapsed);
        assert_eq!(result, DeleteResult::Range);
        assert!(matches!(model.blocks[1], Block::Paragraph(_)));
        assert_eq!(model.plain_text(), "a\nx");
    }

    #[test]
    fn test_backspace_removes_entity_from_end() {
        let mut dom = Dom::new();
        let entity = Entity::new(
            dom.create_element("span"),
            EntityFormat {
                entity_type: Some("e".to_string()),
                id: Some("e1".to_string()),
                is_readonly: true,
            },
        );
        let mut model = ContentModelDocument::with_blocks(vec![paragraph(vec![
            text("a"),
            Segment::Entity(entity),
            marker(),
        ])]);
        let mut format_context = crate::editor::FormatContext::default();
        let result = delete_selection(
            &mut model,
            &[Some(backward_delete_collapsed)],
            Some(&mut format_context),
        );
        assert_eq!(result.delete_result, DeleteResult::SingleChar);
        assert_eq!(format_context.deleted_entities.len(), 1);
        assert_eq!(
            format_context.deleted_entities[0].operation,
            EntityOperation::RemoveFromEnd
        );
    }

    #[test]
    fn test_backward_word() {
        let (model, result) = run(
            vec![paragraph(vec![text("one two  "), marker(), text("three")])],
            backward_delete_word,
        );
        assert_eq!(result, DeleteResult::Range);
        assert_eq!(model.plain_text(), "one three");
    }

    #[test]
    fn test_forward_word_takes_trailing_spaces() {
        let (model, _) = run(
            vec![paragraph(vec![text("a"), marker(), text("bc  de")])],
            forward_delete_word,
        );
        assert_eq!(model.plain_text(), "ade");
    }

    #[test]
    fn test_forward_word_from_space_deletes_spaces_only() {
        let (model, _) = run(
            vec![paragraph(vec![text("a"), marker(), text("  bc")])],
            forward_delete_word,
        );
        assert_eq!(model.plain_text(), "abc");
    }

    #[test]
    fn test_word_stops_at_punctuation() {
        let (model, _) = run(
            vec![paragraph(vec![text("end."), marker()])],
            backward_delete_word,
        );
        assert_eq!(model.plain_text(), "end");
    }

    #[test]
    fn test_delete_all_before() {
        let (model, result) = run(
            vec![paragraph(vec![text("abc "), text("def"), marker(), text("g")])],
            delete_all_segment_before,
        );
        assert_eq!(result, DeleteResult::Range);
        assert_eq!(model.plain_text(), "g");
    }
}
