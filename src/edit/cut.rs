//! Copy and cut: extracting the selected content.

use crate::convert::{self, ModelToDomOptions};
use crate::dom::NodeId;
use crate::edit::delete_selection::{DeleteResult, delete_selection};
use crate::editor::{EditorCore, FormatOptions};
use crate::error::Result;
use crate::input::RawEvent;
use crate::model::{
    Block, ContentModelDocument, Paragraph, Segment, Table, TableRow, clear_selection,
    has_selection, is_collapsed,
};
use crate::plugin::ChangeSource;

/// Write a copy of the selected content into a new detached `div`.
///
/// Entity wrappers are deep-copied, so the live entities stay where they
/// are. `None` when the selection is missing or collapsed.
pub fn clone_selected_content(core: &mut EditorCore) -> Result<Option<NodeId>> {
    let model = core.create_content_model(None)?;
    if !has_selection(&model.blocks) || is_collapsed(&model.blocks) {
        return Ok(None);
    }
    let mut selected = ContentModelDocument::with_blocks(selected_blocks(&model.blocks));
    clear_selection(&mut selected.blocks);
    selected.normalize();

    let dom = core.dom_mut();
    clone_entity_wrappers(dom, &mut selected.blocks)?;
    let container = dom.create_element("div");
    let options = ModelToDomOptions {
        add_delimiter_for_entity: false,
    };
    convert::set_content_model(dom, container, &selected, &options, None)?;
    Ok(Some(container))
}

/// Delete the selection through the model.
pub fn delete_selected_content(core: &mut EditorCore, source: ChangeSource) -> Result<bool> {
    let mut options = FormatOptions::new("deleteSelection").with_source(source);
    if source == ChangeSource::Cut {
        options.raw_event = Some(RawEvent::Cut);
    }
    core.format_content_model(
        |model, context| {
            let result = delete_selection(model, &[], Some(context));
            if result.delete_result == DeleteResult::NotDeleted {
                return false;
            }
            model.normalize();
            true
        },
        options,
    )
}

/// Selected parts of `blocks`, keeping the groups around them.
fn selected_blocks(blocks: &[Block]) -> Vec<Block> {
    let mut out = Vec::new();
    for block in blocks {
        match block {
            Block::Paragraph(paragraph) => {
                let segments: Vec<Segment> = paragraph
                    .segments
                    .iter()
                    .filter(|segment| segment.is_selected() && !segment.is_marker())
                    .cloned()
                    .collect();
                if !segments.is_empty() {
                    out.push(Block::Paragraph(Paragraph {
                        segments,
                        ..paragraph.clone()
                    }));
                }
            }
            Block::Entity(entity) if entity.is_selected => out.push(block.clone()),
            Block::Divider(divider) if divider.is_selected => out.push(block.clone()),
            Block::Entity(_) | Block::Divider(_) => {}
            Block::ListItem(item) => {
                let children = selected_blocks(&item.blocks);
                if !children.is_empty() {
                    let mut item = item.clone();
                    item.blocks = children;
                    out.push(Block::ListItem(item));
                }
            }
            Block::FormatContainer(container) => {
                let children = selected_blocks(&container.blocks);
                if !children.is_empty() {
                    let mut container = container.clone();
                    container.blocks = children;
                    out.push(Block::FormatContainer(container));
                }
            }
            Block::Table(table) => {
                let has_cells = table
                    .rows
                    .iter()
                    .any(|row| row.cells.iter().any(|cell| cell.is_selected));
                if has_cells {
                    let rows: Vec<TableRow> = table
                        .rows
                        .iter()
                        .map(|row| TableRow {
                            cells: row.cells.iter().filter(|c| c.is_selected).cloned().collect(),
                        })
                        .filter(|row| !row.cells.is_empty())
                        .collect();
                    out.push(Block::Table(Table {
                        rows,
                        format: table.format.clone(),
                    }));
                } else {
                    for cell in table.rows.iter().flat_map(|row| row.cells.iter()) {
                        out.extend(selected_blocks(&cell.blocks));
                    }
                }
            }
        }
    }
    out
}

fn clone_entity_wrappers(dom: &mut crate::dom::Dom, blocks: &mut [Block]) -> Result<()> {
    for block in blocks {
        match block {
            Block::Entity(entity) => entity.wrapper = dom.clone_subtree(entity.wrapper)?,
            Block::Paragraph(paragraph) => {
                for segment in &mut paragraph.segments {
                    if let Segment::Entity(entity) = segment {
                        entity.wrapper = dom.clone_subtree(entity.wrapper)?;
                    }
                }
            }
            Block::ListItem(item) => clone_entity_wrappers(dom, &mut item.blocks)?,
            Block::FormatContainer(container) => clone_entity_wrappers(dom, &mut container.blocks)?,
            Block::Table(table) => {
                for cell in table.rows.iter_mut().flat_map(|row| row.cells.iter_mut()) {
                    clone_entity_wrappers(dom, &mut cell.blocks)?;
                }
            }
            Block::Divider(_) => {}
        }
    }
    Ok(())
}
