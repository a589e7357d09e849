//! Deleting the selected content of a model.
//!
//! [`delete_selection`] first removes an expanded selection, leaving a
//! collapsed marker at the insert point, then runs the extra steps in order
//! for as long as nothing has been deleted yet.

use crate::editor::{DeletedEntity, FormatContext};
use crate::model::{
    Block, BlockPath, ContentModelDocument, Entity, GroupStep, Paragraph, SegmentFormat,
    SelectedItem, Segment, collect_selection, find_selection_marker, is_collapsed, visit_blocks,
};
use crate::plugin::EntityOperation;

/// What a deletion did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DeleteResult {
    #[default]
    NotDeleted,
    /// One character or one inline segment next to the caret.
    SingleChar,
    /// A selection, a word, a block, or a paragraph boundary.
    Range,
}

/// Where the collapsed caret sits: a paragraph and the index of its marker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InsertPoint {
    pub path: BlockPath,
    pub marker_index: usize,
}

/// State shared by the steps of one deletion.
#[derive(Debug)]
pub struct DeleteSelectionContext<'a> {
    pub model: &'a mut ContentModelDocument,
    pub insert_point: Option<InsertPoint>,
    pub delete_result: DeleteResult,
    pub deleted_entities: Vec<DeletedEntity>,
}

impl DeleteSelectionContext<'_> {
    /// Record an entity removed with `operation`.
    pub fn delete_entity(&mut self, entity: Entity, operation: EntityOperation) {
        self.deleted_entities.push(DeletedEntity { entity, operation });
    }

    /// Paragraph of the insert point.
    pub fn paragraph_mut(&mut self) -> Option<&mut Paragraph> {
        let path = self.insert_point.as_ref()?.path.clone();
        self.model.paragraph_mut(&path)
    }

    /// Re-read the marker index after segments around it changed.
    pub fn refresh_marker(&mut self) {
        let index = self
            .insert_point
            .as_ref()
            .and_then(|point| self.model.paragraph(&point.path))
            .and_then(Paragraph::marker_index);
        match (index, self.insert_point.as_mut()) {
            (Some(index), Some(point)) => point.marker_index = index,
            (None, _) => self.insert_point = None,
            _ => {}
        }
    }
}

/// One step of a deletion pipeline.
pub type DeleteSelectionStep = fn(&mut DeleteSelectionContext<'_>);

/// Outcome of [`delete_selection`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteSelectionResult {
    pub insert_point: Option<InsertPoint>,
    pub delete_result: DeleteResult,
}

/// Delete the selection of `model`, then run `steps`.
///
/// A step only runs while there is an insert point and nothing has been
/// deleted yet; `None` entries are skipped. Removed entities are reported to
/// `format_context`.
pub fn delete_selection(
    model: &mut ContentModelDocument,
    steps: &[Option<DeleteSelectionStep>],
    format_context: Option<&mut FormatContext>,
) -> DeleteSelectionResult {
    let mut context = DeleteSelectionContext {
        model,
        insert_point: None,
        delete_result: DeleteResult::NotDeleted,
        deleted_entities: Vec::new(),
    };
    delete_expanded_selection(&mut context);

    for step in steps.iter().flatten() {
        if context.insert_point.is_none() || context.delete_result != DeleteResult::NotDeleted {
            break;
        }
        step(&mut context);
    }

    if let Some(format_context) = format_context {
        format_context.deleted_entities.append(&mut context.deleted_entities);
    }
    tracing::trace!(result = ?context.delete_result, "selection deleted");
    DeleteSelectionResult {
        insert_point: context.insert_point,
        delete_result: context.delete_result,
    }
}

fn delete_expanded_selection(context: &mut DeleteSelectionContext<'_>) {
    let items = collect_selection(&context.model.blocks);
    if items.is_empty() {
        return;
    }
    if is_collapsed(&context.model.blocks) {
        context.insert_point = find_selection_marker(&context.model.blocks)
            .map(|(path, marker_index)| InsertPoint { path, marker_index });
        return;
    }

    context.model.has_reverted_range_selection = false;
    let deleted = if items.iter().any(|item| matches!(item, SelectedItem::Cell { .. })) {
        delete_selected_cells(context, &items)
    } else {
        delete_range(context, &items)
    };
    if deleted {
        context.delete_result = DeleteResult::Range;
    }
}

/// Remove a range selection: the insert point is where the first selected
/// item was, and what is left of the last selected paragraph joins it.
fn delete_range(context: &mut DeleteSelectionContext<'_>, items: &[SelectedItem]) -> bool {
    let mut deleted = Vec::new();
    let blocks = &mut context.model.blocks;

    let (anchor, anchor_index, marker_format) = match &items[0] {
        SelectedItem::Segments { path, indices } => {
            let format = path
                .paragraph(blocks)
                .and_then(|paragraph| paragraph.segments.get(indices[0]))
                .map(|segment| segment.format().clone())
                .unwrap_or_default();
            (path.clone(), indices[0], format)
        }
        SelectedItem::Block { path } => {
            let Some(block) = path.block_mut(blocks) else {
                return false;
            };
            if let Block::Entity(entity) =
                std::mem::replace(block, Block::Paragraph(Paragraph::new(false)))
            {
                deleted.push(entity);
            }
            (path.clone(), 0, SegmentFormat::default())
        }
        SelectedItem::Cell { .. } => return false,
    };

    let last = items.iter().rev().find_map(|item| match item {
        SelectedItem::Segments { path, .. } => Some(path),
        _ => None,
    });
    let mut tail = Vec::new();
    if let Some(last) = last {
        if *last != anchor && last.table_context() == anchor.table_context() {
            if let Some(paragraph) = last.paragraph_mut(blocks) {
                for segment in paragraph.segments.drain(..) {
                    match segment {
                        Segment::Entity(entity) if entity.is_selected => deleted.push(entity),
                        segment if segment.is_selected() => {}
                        segment => tail.push(segment),
                    }
                }
            }
        }
    }

    for item in items.iter().rev() {
        match item {
            SelectedItem::Segments { path, .. } => {
                let Some(paragraph) = path.paragraph_mut(blocks) else {
                    continue;
                };
                remove_selected_segments(paragraph, &mut deleted);
                if *path != anchor && paragraph.segments.is_empty() {
                    remove_block(blocks, path);
                }
            }
            SelectedItem::Block { path } if *path != anchor => {
                if let Some(Block::Entity(entity)) = remove_block(blocks, path) {
                    deleted.push(entity);
                }
            }
            SelectedItem::Block { .. } | SelectedItem::Cell { .. } => {}
        }
    }

    let Some(paragraph) = anchor.paragraph_mut(blocks) else {
        return false;
    };
    let index = anchor_index.min(paragraph.segments.len());
    paragraph.segments.insert(index, Segment::marker(marker_format));
    paragraph.segments.splice(index + 1..index + 1, tail);

    for entity in deleted {
        context.delete_entity(entity, EntityOperation::Overwrite);
    }
    context.insert_point = Some(InsertPoint {
        path: anchor,
        marker_index: index,
    });
    true
}

/// Empty every selected table cell. The caret goes into the first one.
fn delete_selected_cells(context: &mut DeleteSelectionContext<'_>, items: &[SelectedItem]) -> bool {
    let mut deleted = Vec::new();
    let mut first: Option<BlockPath> = None;
    for item in items {
        let SelectedItem::Cell { table, row, col } = item else {
            continue;
        };
        let Some(Block::Table(block)) = table.block_mut(&mut context.model.blocks) else {
            continue;
        };
        let Some(cell) = block.rows.get_mut(*row).and_then(|r| r.cells.get_mut(*col)) else {
            continue;
        };
        deleted.extend(collect_entities(&cell.blocks));
        let mut segments = vec![Segment::br(SegmentFormat::default())];
        if first.is_none() {
            segments.insert(0, Segment::marker(SegmentFormat::default()));
            let mut groups = table.groups.clone();
            groups.push(GroupStep::Cell {
                block: table.index,
                row: *row,
                col: *col,
            });
            first = Some(BlockPath::new(groups, 0));
        }
        cell.blocks = vec![Block::Paragraph(Paragraph::with_segments(segments))];
        cell.is_selected = false;
    }

    for entity in deleted {
        context.delete_entity(entity, EntityOperation::Overwrite);
    }
    let Some(path) = first else {
        return false;
    };
    context.insert_point = Some(InsertPoint {
        path,
        marker_index: 0,
    });
    true
}

fn remove_selected_segments(paragraph: &mut Paragraph, deleted: &mut Vec<Entity>) {
    let segments = std::mem::take(&mut paragraph.segments);
    for segment in segments {
        match segment {
            Segment::Entity(entity) if entity.is_selected => deleted.push(entity),
            segment if segment.is_selected() => {}
            segment => paragraph.segments.push(segment),
        }
    }
}

/// Remove the block at `path` from its group.
pub(crate) fn remove_block(blocks: &mut Vec<Block>, path: &BlockPath) -> Option<Block> {
    let group = path.group_mut(blocks)?;
    (path.index < group.len()).then(|| group.remove(path.index))
}

/// Entities anywhere in `blocks`, block and inline.
pub(crate) fn collect_entities(blocks: &[Block]) -> Vec<Entity> {
    let mut entities = Vec::new();
    visit_blocks(blocks, &mut |_, block| match block {
        Block::Entity(entity) => entities.push(entity.clone()),
        Block::Paragraph(paragraph) => entities.extend(
            paragraph
                .segments
                .iter()
                .filter_map(Segment::as_entity)
                .cloned(),
        ),
        _ => {}
    });
    entities
}
