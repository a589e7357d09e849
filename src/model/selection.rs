//! Selection state inside the model.
//!
//! A collapsed selection is a single selected [`Segment::SelectionMarker`].
//! An expanded selection has a marker at each boundary with every segment and
//! block in between flagged `is_selected`.

use crate::model::block::Block;
use crate::model::path::{BlockPath, visit_blocks, visit_blocks_mut};
use crate::model::segment::Segment;

/// One selected piece of the document, in document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectedItem {
    /// Selected segments of a paragraph (indices ascending).
    Segments { path: BlockPath, indices: Vec<usize> },
    /// A selected entity block or divider.
    Block { path: BlockPath },
    /// A selected table cell (table selection).
    Cell {
        table: BlockPath,
        row: usize,
        col: usize,
    },
}

/// Collect everything flagged as selected.
#[must_use]
pub fn collect_selection(blocks: &[Block]) -> Vec<SelectedItem> {
    let mut items = Vec::new();
    visit_blocks(blocks, &mut |path, block| match block {
        Block::Paragraph(paragraph) => {
            let indices: Vec<usize> = paragraph
                .segments
                .iter()
                .enumerate()
                .filter(|(_, segment)| segment.is_selected())
                .map(|(i, _)| i)
                .collect();
            if !indices.is_empty() {
                items.push(SelectedItem::Segments {
                    path: path.clone(),
                    indices,
                });
            }
        }
        Block::Entity(entity) if entity.is_selected => {
            items.push(SelectedItem::Block { path: path.clone() });
        }
        Block::Divider(divider) if divider.is_selected => {
            items.push(SelectedItem::Block { path: path.clone() });
        }
        Block::Table(table) => {
            for (row, table_row) in table.rows.iter().enumerate() {
                for (col, cell) in table_row.cells.iter().enumerate() {
                    if cell.is_selected {
                        items.push(SelectedItem::Cell {
                            table: path.clone(),
                            row,
                            col,
                        });
                    }
                }
            }
        }
        _ => {}
    });
    items
}

/// Whether anything in the model is selected.
#[must_use]
pub fn has_selection(blocks: &[Block]) -> bool {
    !collect_selection(blocks).is_empty()
}

/// Paths of paragraphs that contain selected segments.
#[must_use]
pub fn selected_paragraphs(blocks: &[Block]) -> Vec<BlockPath> {
    collect_selection(blocks)
        .into_iter()
        .filter_map(|item| match item {
            SelectedItem::Segments { path, .. } => Some(path),
            _ => None,
        })
        .collect()
}

/// First selected marker: paragraph path and segment index.
#[must_use]
pub fn find_selection_marker(blocks: &[Block]) -> Option<(BlockPath, usize)> {
    let mut found = None;
    visit_blocks(blocks, &mut |path, block| {
        if found.is_some() {
            return;
        }
        if let Block::Paragraph(paragraph) = block {
            if let Some(index) = paragraph
                .segments
                .iter()
                .position(|s| s.is_marker() && s.is_selected())
            {
                found = Some((path.clone(), index));
            }
        }
    });
    found
}

/// Drop every marker and clear every selection flag.
pub fn clear_selection(blocks: &mut [Block]) {
    visit_blocks_mut(blocks, &mut |_, block| match block {
        Block::Paragraph(paragraph) => {
            paragraph.segments.retain(|segment| !segment.is_marker());
            for segment in &mut paragraph.segments {
                segment.set_selected(false);
            }
        }
        Block::Entity(entity) => entity.is_selected = false,
        Block::Divider(divider) => divider.is_selected = false,
        Block::Table(table) => {
            for cell in table.rows.iter_mut().flat_map(|row| row.cells.iter_mut()) {
                cell.is_selected = false;
            }
        }
        Block::ListItem(_) | Block::FormatContainer(_) => {}
    });
}

/// Flag everything between the first and second marker as selected.
///
/// With a single marker only the marker itself is selected.
pub fn select_between_markers(blocks: &mut [Block]) {
    let mut total = 0usize;
    visit_blocks(blocks, &mut |_, block| {
        if let Block::Paragraph(paragraph) = block {
            total += paragraph.segments.iter().filter(|s| s.is_marker()).count();
        }
    });

    let mut seen = 0usize;
    let mut inside = false;
    visit_blocks_mut(blocks, &mut |_, block| match block {
        Block::Paragraph(paragraph) => {
            for segment in &mut paragraph.segments {
                if segment.is_marker() {
                    seen += 1;
                    segment.set_selected(seen <= 2);
                    inside = seen == 1 && total >= 2;
                } else {
                    segment.set_selected(inside);
                }
            }
        }
        Block::Entity(entity) => entity.is_selected = inside,
        Block::Divider(divider) => divider.is_selected = inside,
        Block::Table(_) | Block::ListItem(_) | Block::FormatContainer(_) => {}
    });
}

/// Whether the selection is a single collapsed marker.
#[must_use]
pub fn is_collapsed(blocks: &[Block]) -> bool {
    let items = collect_selection(blocks);
    match items.as_slice() {
        [SelectedItem::Segments { path, indices }] if indices.len() == 1 => path
            .paragraph(blocks)
            .and_then(|p| p.segments.get(indices[0]))
            .is_some_and(Segment::is_marker),
        _ => false,
    }
}
