//! Addressing blocks inside nested groups.
//!
//! A [`BlockPath`] names a block by the chain of groups that lead to it
//! (list items, format containers, table cells) plus its index inside the
//! innermost group. Paths replace object identity: editing code records the
//! path of the paragraph it works on and resolves it again when needed.

use crate::model::block::{Block, Paragraph};
use serde::{Deserialize, Serialize};

/// One step down into a nested group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GroupStep {
    /// Into the child blocks of the list item / format container at `block`.
    Child(usize),
    /// Into a table cell of the table at `block`.
    Cell { block: usize, row: usize, col: usize },
}

impl GroupStep {
    /// Index of the block this step descends into.
    #[must_use]
    pub const fn block(self) -> usize {
        match self {
            Self::Child(block) | Self::Cell { block, .. } => block,
        }
    }
}

/// Location of a block in a document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPath {
    pub groups: Vec<GroupStep>,
    pub index: usize,
}

impl BlockPath {
    /// Path of a top-level block.
    #[must_use]
    pub const fn root(index: usize) -> Self {
        Self {
            groups: Vec::new(),
            index,
        }
    }

    #[must_use]
    pub const fn new(groups: Vec<GroupStep>, index: usize) -> Self {
        Self { groups, index }
    }

    /// Same group, other index.
    #[must_use]
    pub fn with_index(&self, index: usize) -> Self {
        Self {
            groups: self.groups.clone(),
            index,
        }
    }

    /// Path of the group block that directly contains this block.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (last, rest) = self.groups.split_last()?;
        Some(Self {
            groups: rest.to_vec(),
            index: last.block(),
        })
    }

    /// Steps up to and including the innermost table cell. Two blocks can
    /// only be merged when their table contexts are equal.
    #[must_use]
    pub fn table_context(&self) -> &[GroupStep] {
        let end = self
            .groups
            .iter()
            .rposition(|step| matches!(step, GroupStep::Cell { .. }))
            .map_or(0, |i| i + 1);
        &self.groups[..end]
    }

    #[must_use]
    pub fn block<'a>(&self, blocks: &'a [Block]) -> Option<&'a Block> {
        group(blocks, &self.groups)?.get(self.index)
    }

    pub fn block_mut<'a>(&self, blocks: &'a mut Vec<Block>) -> Option<&'a mut Block> {
        group_mut(blocks, &self.groups)?.get_mut(self.index)
    }

    #[must_use]
    pub fn paragraph<'a>(&self, blocks: &'a [Block]) -> Option<&'a Paragraph> {
        self.block(blocks)?.as_paragraph()
    }

    pub fn paragraph_mut<'a>(&self, blocks: &'a mut Vec<Block>) -> Option<&'a mut Paragraph> {
        self.block_mut(blocks)?.as_paragraph_mut()
    }

    /// The group vector that holds this block.
    pub fn group_mut<'a>(&self, blocks: &'a mut Vec<Block>) -> Option<&'a mut Vec<Block>> {
        group_mut(blocks, &self.groups)
    }
}

/// Resolve a chain of group steps to the blocks of that group.
#[must_use]
pub fn group<'a>(blocks: &'a [Block], steps: &[GroupStep]) -> Option<&'a [Block]> {
    let mut current = blocks;
    for step in steps {
        current = match (*step, current.get(step.block())?) {
            (GroupStep::Child(_), block) => block.child_blocks()?.as_slice(),
            (GroupStep::Cell { row, col, .. }, Block::Table(table)) => {
                table.rows.get(row)?.cells.get(col)?.blocks.as_slice()
            }
            (GroupStep::Cell { .. }, _) => return None,
        };
    }
    Some(current)
}

/// Mutable variant of [`group`].
pub fn group_mut<'a>(blocks: &'a mut Vec<Block>, steps: &[GroupStep]) -> Option<&'a mut Vec<Block>> {
    let mut current = blocks;
    for step in steps {
        let block = current.get_mut(step.block())?;
        current = match (*step, block) {
            (GroupStep::Child(_), block) => block.child_blocks_mut()?,
            (GroupStep::Cell { row, col, .. }, Block::Table(table)) => {
                &mut table.rows.get_mut(row)?.cells.get_mut(col)?.blocks
            }
            (GroupStep::Cell { .. }, _) => return None,
        };
    }
    Some(current)
}

/// Visit every block in document order. Groups are visited before their
/// children; table cells row by row.
pub fn visit_blocks<'a>(blocks: &'a [Block], visitor: &mut dyn FnMut(&BlockPath, &'a Block)) {
    let mut groups = Vec::new();
    walk(blocks, &mut groups, visitor);
}

fn walk<'a>(
    blocks: &'a [Block],
    groups: &mut Vec<GroupStep>,
    visitor: &mut dyn FnMut(&BlockPath, &'a Block),
) {
    for (index, block) in blocks.iter().enumerate() {
        visitor(&BlockPath::new(groups.clone(), index), block);
        match block {
            Block::ListItem(_) | Block::FormatContainer(_) => {
                if let Some(children) = block.child_blocks() {
                    groups.push(GroupStep::Child(index));
                    walk(children, groups, visitor);
                    groups.pop();
                }
            }
            Block::Table(table) => {
                for (row, table_row) in table.rows.iter().enumerate() {
                    for (col, cell) in table_row.cells.iter().enumerate() {
                        groups.push(GroupStep::Cell {
                            block: index,
                            row,
                            col,
                        });
                        walk(&cell.blocks, groups, visitor);
                        groups.pop();
                    }
                }
            }
            Block::Paragraph(_) | Block::Entity(_) | Block::Divider(_) => {}
        }
    }
}

/// Mutable variant of [`visit_blocks`].
pub fn visit_blocks_mut(blocks: &mut [Block], visitor: &mut dyn FnMut(&BlockPath, &mut Block)) {
    let mut groups = Vec::new();
    walk_mut(blocks, &mut groups, visitor);
}

fn walk_mut(
    blocks: &mut [Block],
    groups: &mut Vec<GroupStep>,
    visitor: &mut dyn FnMut(&BlockPath, &mut Block),
) {
    for (index, block) in blocks.iter_mut().enumerate() {
        visitor(&BlockPath::new(groups.clone(), index), block);
        match block {
            Block::ListItem(item) => {
                groups.push(GroupStep::Child(index));
                walk_mut(&mut item.blocks, groups, visitor);
                groups.pop();
            }
            Block::FormatContainer(container) => {
                groups.push(GroupStep::Child(index));
                walk_mut(&mut container.blocks, groups, visitor);
                groups.pop();
            }
            Block::Table(table) => {
                for (row, table_row) in table.rows.iter_mut().enumerate() {
                    for (col, cell) in table_row.cells.iter_mut().enumerate() {
                        groups.push(GroupStep::Cell {
                            block: index,
                            row,
                            col,
                        });
                        walk_mut(&mut cell.blocks, groups, visitor);
                        groups.pop();
                    }
                }
            }
            Block::Paragraph(_) | Block::Entity(_) | Block::Divider(_) => {}
        }
    }
}

/// Nearest leaf block before/after `path`, crossing list items and format
/// containers but never leaving a table cell.
///
/// When the neighbor is an empty group, the group itself is returned.
#[must_use]
pub fn leaf_sibling(blocks: &[Block], path: &BlockPath, forward: bool) -> Option<BlockPath> {
    let mut current = path.clone();
    loop {
        let siblings = group(blocks, &current.groups)?;
        let candidate = if forward {
            current.index.checked_add(1).filter(|i| *i < siblings.len())
        } else {
            current.index.checked_sub(1)
        };
        if let Some(index) = candidate {
            return Some(descend_to_leaf(blocks, current.with_index(index), forward));
        }
        match current.groups.last() {
            Some(GroupStep::Child(_)) => current = current.parent()?,
            Some(GroupStep::Cell { .. }) | None => return None,
        }
    }
}

fn descend_to_leaf(blocks: &[Block], mut path: BlockPath, forward: bool) -> BlockPath {
    while let Some(children) = path.block(blocks).and_then(Block::child_blocks) {
        if children.is_empty() {
            break;
        }
        let index = if forward { 0 } else { children.len() - 1 };
        path.groups.push(GroupStep::Child(path.index));
        path.index = index;
    }
    path
}
