//! DOM selection values and node paths.

use crate::dom::{Dom, NodeId};
use serde::{Deserialize, Serialize};

/// A point in the DOM: a text node plus char offset, or an element plus child
/// index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DomPosition {
    pub node: NodeId,
    pub offset: usize,
}

impl DomPosition {
    #[must_use]
    pub const fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A DOM range between two positions in document order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DomRange {
    pub start: DomPosition,
    pub end: DomPosition,
}

impl DomRange {
    #[must_use]
    pub const fn new(start: DomPosition, end: DomPosition) -> Self {
        Self { start, end }
    }

    /// A zero-width range at `position`.
    #[must_use]
    pub const fn collapsed_at(position: DomPosition) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    #[must_use]
    pub fn collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// The editor's selection. Exactly one variant is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DomSelection {
    Range { range: DomRange, is_reverted: bool },
    Image { image: NodeId },
    Table {
        table: NodeId,
        first_column: usize,
        last_column: usize,
        first_row: usize,
        last_row: usize,
    },
}

impl DomSelection {
    /// Forward range selection.
    #[must_use]
    pub const fn range(range: DomRange) -> Self {
        Self::Range {
            range,
            is_reverted: false,
        }
    }

    /// Collapsed caret at `node`/`offset`.
    #[must_use]
    pub const fn caret(node: NodeId, offset: usize) -> Self {
        Self::range(DomRange::collapsed_at(DomPosition::new(node, offset)))
    }

    /// The range of a `Range` selection.
    #[must_use]
    pub const fn as_range(&self) -> Option<&DomRange> {
        match self {
            Self::Range { range, .. } => Some(range),
            _ => None,
        }
    }

    /// True only for a collapsed `Range` selection.
    #[must_use]
    pub fn is_collapsed_range(&self) -> bool {
        self.as_range().is_some_and(DomRange::collapsed)
    }
}

/// Selection stored in an undo snapshot, expressed as child-index paths from
/// the editor root so it survives re-parsing the HTML.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SnapshotSelection {
    #[serde(rename_all = "camelCase")]
    Range {
        start: Vec<usize>,
        end: Vec<usize>,
        is_reverted: bool,
    },
    Image { path: Vec<usize> },
    #[serde(rename_all = "camelCase")]
    Table {
        path: Vec<usize>,
        first_column: usize,
        last_column: usize,
        first_row: usize,
        last_row: usize,
    },
}

/// Child-index path from `root` to `node`, or `None` if `node` is outside.
#[must_use]
pub fn node_path(dom: &Dom, root: NodeId, node: NodeId) -> Option<Vec<usize>> {
    let mut path = Vec::new();
    let mut current = node;
    while current != root {
        path.push(dom.index_in_parent(current)?);
        current = dom.parent(current)?;
    }
    path.reverse();
    Some(path)
}

/// Follow a child-index path from `root`.
#[must_use]
pub fn resolve_node_path(dom: &Dom, root: NodeId, path: &[usize]) -> Option<NodeId> {
    path.iter()
        .try_fold(root, |node, index| dom.child_at(node, *index))
}

/// Position path: the node path with the offset appended.
fn position_path(dom: &Dom, root: NodeId, position: DomPosition) -> Option<Vec<usize>> {
    let mut path = node_path(dom, root, position.node)?;
    path.push(position.offset);
    Some(path)
}

fn resolve_position_path(dom: &Dom, root: NodeId, path: &[usize]) -> Option<DomPosition> {
    let (offset, node_path) = path.split_last()?;
    let node = resolve_node_path(dom, root, node_path)?;
    let offset = (*offset).min(dom.node_length(node));
    Some(DomPosition::new(node, offset))
}

impl SnapshotSelection {
    /// Capture `selection` relative to `root`.
    #[must_use]
    pub fn capture(dom: &Dom, root: NodeId, selection: &DomSelection) -> Option<Self> {
        match *selection {
            DomSelection::Range { range, is_reverted } => Some(Self::Range {
                start: position_path(dom, root, range.start)?,
                end: position_path(dom, root, range.end)?,
                is_reverted,
            }),
            DomSelection::Image { image } => Some(Self::Image {
                path: node_path(dom, root, image)?,
            }),
            DomSelection::Table {
                table,
                first_column,
                last_column,
                first_row,
                last_row,
            } => Some(Self::Table {
                path: node_path(dom, root, table)?,
                first_column,
                last_column,
                first_row,
                last_row,
            }),
        }
    }

    /// Resolve back into a live selection. Offsets are clamped to the node
    /// length; paths that no longer exist give `None`.
    #[must_use]
    pub fn resolve(&self, dom: &Dom, root: NodeId) -> Option<DomSelection> {
        match self {
            Self::Range {
                start,
                end,
                is_reverted,
            } => Some(DomSelection::Range {
                range: DomRange::new(
                    resolve_position_path(dom, root, start)?,
                    resolve_position_path(dom, root, end)?,
                ),
                is_reverted: *is_reverted,
            }),
            Self::Image { path } => Some(DomSelection::Image {
                image: resolve_node_path(dom, root, path)?,
            }),
            Self::Table {
                path,
                first_column,
                last_column,
                first_row,
                last_row,
            } => Some(DomSelection::Table {
                table: resolve_node_path(dom, root, path)?,
                first_column: *first_column,
                last_column: *last_column,
                first_row: *first_row,
                last_row: *last_row,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_and_resolve_after_reparse() {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        dom.set_inner_html(root, "<div><span>ab</span><span>cd</span></div>")
            .unwrap();
        let text = dom
            .first_child(dom.child_at(dom.first_child(root).unwrap(), 1).unwrap())
            .unwrap();
        let selection = DomSelection::caret(text, 1);
        let captured = SnapshotSelection::capture(&dom, root, &selection).unwrap();
        assert_eq!(
            captured,
            SnapshotSelection::Range {
                start: vec![0, 1, 0, 1],
                end: vec![0, 1, 0, 1],
                is_reverted: false
            }
        );

        let html = dom.inner_html(root);
        dom.set_inner_html(root, &html).unwrap();
        let resolved = captured.resolve(&dom, root).unwrap();
        let range = resolved.as_range().unwrap();
        assert_eq!(dom.text(range.start.node), Some("cd"));
        assert_eq!(range.start.offset, 1);
        assert!(resolved.is_collapsed_range());
    }

    #[test]
    fn test_resolve_missing_path() {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        let selection = SnapshotSelection::Image { path: vec![3] };
        assert_eq!(selection.resolve(&dom, root), None);
    }

    #[test]
    fn test_node_path_outside_root() {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        let other = dom.create_text("x");
        assert_eq!(node_path(&dom, root, other), None);
        assert_eq!(node_path(&dom, root, root), Some(vec![]));
    }
}
