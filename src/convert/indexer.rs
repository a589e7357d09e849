//! Mapping between DOM nodes and paragraph segments.
//!
//! Both converters record, for every paragraph they touch, the ordered list of
//! nodes its segments came from. With that layout a selection change can be
//! applied to a cached model by rebuilding only the paragraphs involved,
//! without converting the whole DOM again.

use std::collections::HashMap;

use crate::dom::{Dom, DomSelection, NodeId};
use crate::model::{
    BlockPath, ContentModelDocument, Image, Segment, SegmentFormat, clear_selection,
    select_between_markers, selected_paragraphs,
};
use crate::unicode::char_to_byte;

/// Where one non-marker segment of a paragraph came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutEntry {
    /// A text node. Its current text is re-read on reconciliation.
    Text { node: NodeId, format: SegmentFormat },
    /// An `img` element.
    Image { node: NodeId, image: Image },
    /// A segment that never changes under native editing (`Br`, entity).
    Other(Segment),
}

/// Boundaries of a selection resolved against indexed nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Boundaries {
    Range {
        start: (NodeId, usize),
        end: (NodeId, usize),
    },
    Image(NodeId),
}

impl Boundaries {
    fn nodes(self) -> Vec<NodeId> {
        match self {
            Self::Range { start, end } => vec![start.0, end.0],
            Self::Image(node) => vec![node],
        }
    }

    /// Char offsets inside `node` where a marker belongs, ascending.
    fn cuts(self, node: NodeId) -> Vec<usize> {
        let Self::Range { start, end } = self else {
            return Vec::new();
        };
        let mut cuts = Vec::new();
        if start.0 == node {
            cuts.push(start.1);
        }
        if end.0 == node && end != start {
            cuts.push(end.1);
        }
        cuts.sort_unstable();
        cuts
    }
}

/// Index of paragraph layouts produced by the last conversion.
#[derive(Clone, Debug, Default)]
pub struct DomIndexer {
    paragraphs: HashMap<BlockPath, Vec<LayoutEntry>>,
    nodes: HashMap<NodeId, BlockPath>,
}

impl DomIndexer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.paragraphs.clear();
        self.nodes.clear();
    }

    /// Register a paragraph, even one that ends up without segments.
    pub fn begin_paragraph(&mut self, path: &BlockPath) {
        self.paragraphs.entry(path.clone()).or_default();
    }

    /// Append a layout entry to the paragraph at `path`.
    pub fn push(&mut self, path: &BlockPath, entry: LayoutEntry) {
        match &entry {
            LayoutEntry::Text { node, .. } | LayoutEntry::Image { node, .. } => {
                self.nodes.insert(*node, path.clone());
            }
            LayoutEntry::Other(_) => {}
        }
        self.paragraphs.entry(path.clone()).or_default().push(entry);
    }

    /// Paragraph a text or image node belongs to.
    #[must_use]
    pub fn paragraph_of(&self, node: NodeId) -> Option<&BlockPath> {
        self.nodes.get(&node)
    }

    #[must_use]
    pub fn is_indexed(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Move the selection of `model` from `old` to `new` using the recorded
    /// layouts.
    ///
    /// Every paragraph touched by either selection is rebuilt from the
    /// current text of its nodes, so text typed natively by the browser is
    /// picked up on the way. Returns false, leaving `model` untouched, when
    /// the new selection cannot be expressed this way: table selections,
    /// element positions, unindexed or released nodes.
    pub fn reconcile_selection(
        &self,
        dom: &Dom,
        model: &mut ContentModelDocument,
        new: &DomSelection,
        old: Option<&DomSelection>,
    ) -> bool {
        let Some(boundaries) = self.boundaries(dom, new) else {
            return false;
        };

        let mut affected = selected_paragraphs(&model.blocks);
        let mut add = |path: &BlockPath| {
            if !affected.contains(path) {
                affected.push(path.clone());
            }
        };
        if let Some(old) = old {
            for node in selection_nodes(old) {
                if let Some(path) = self.nodes.get(&node) {
                    add(path);
                }
            }
        }
        for node in boundaries.nodes() {
            if let Some(path) = self.nodes.get(&node) {
                add(path);
            }
        }

        let mut rebuilt = Vec::with_capacity(affected.len());
        for path in &affected {
            if model.paragraph(path).is_none() {
                return false;
            }
            let Some(segments) = self.rebuild(dom, path, boundaries) else {
                return false;
            };
            rebuilt.push((path, segments));
        }

        clear_selection(&mut model.blocks);
        for (path, segments) in rebuilt {
            if let Some(paragraph) = model.paragraph_mut(path) {
                paragraph.segments = segments;
            }
        }

        match new {
            DomSelection::Range { is_reverted, .. } => {
                select_between_markers(&mut model.blocks);
                model.has_reverted_range_selection = *is_reverted;
            }
            _ => model.has_reverted_range_selection = false,
        }
        tracing::trace!(paragraphs = affected.len(), "selection reconciled from index");
        true
    }

    fn boundaries(&self, dom: &Dom, selection: &DomSelection) -> Option<Boundaries> {
        match selection {
            DomSelection::Range { range, .. } => {
                let indexed_text = |node: NodeId| {
                    dom.is_text(node)
                        && matches!(self.layout_entry(node), Some(LayoutEntry::Text { .. }))
                };
                if !indexed_text(range.start.node) || !indexed_text(range.end.node) {
                    return None;
                }
                Some(Boundaries::Range {
                    start: (range.start.node, range.start.offset),
                    end: (range.end.node, range.end.offset),
                })
            }
            DomSelection::Image { image } => {
                matches!(self.layout_entry(*image), Some(LayoutEntry::Image { .. }))
                    .then_some(Boundaries::Image(*image))
            }
            DomSelection::Table { .. } => None,
        }
    }

    fn layout_entry(&self, node: NodeId) -> Option<&LayoutEntry> {
        let path = self.nodes.get(&node)?;
        self.paragraphs.get(path)?.iter().find(|entry| match entry {
            LayoutEntry::Text { node: n, .. } | LayoutEntry::Image { node: n, .. } => *n == node,
            LayoutEntry::Other(_) => false,
        })
    }

    fn rebuild(&self, dom: &Dom, path: &BlockPath, boundaries: Boundaries) -> Option<Vec<Segment>> {
        let layout = self.paragraphs.get(path)?;
        let mut segments = Vec::with_capacity(layout.len() + 2);
        for entry in layout {
            match entry {
                LayoutEntry::Text { node, format } => {
                    let text = dom.text(*node)?;
                    let length = text.chars().count();
                    let mut last = 0;
                    for cut in boundaries.cuts(*node) {
                        let cut = cut.min(length);
                        push_text(&mut segments, text, last, cut, format);
                        segments.push(Segment::marker(format.clone()));
                        last = cut;
                    }
                    push_text(&mut segments, text, last, length, format);
                }
                LayoutEntry::Image { node, image } => {
                    if !dom.is_alive(*node) {
                        return None;
                    }
                    let mut image = image.clone();
                    let selected = boundaries == Boundaries::Image(*node);
                    image.is_selected = selected;
                    image.is_selected_as_image_selection = selected;
                    segments.push(Segment::Image(image));
                }
                LayoutEntry::Other(segment) => {
                    let mut segment = segment.clone();
                    segment.set_selected(false);
                    segments.push(segment);
                }
            }
        }
        Some(segments)
    }
}

fn push_text(segments: &mut Vec<Segment>, text: &str, from: usize, to: usize, format: &SegmentFormat) {
    if from >= to {
        return;
    }
    let piece = &text[char_to_byte(text, from)..char_to_byte(text, to)];
    segments.push(Segment::text(piece, format.clone()));
}

fn selection_nodes(selection: &DomSelection) -> Vec<NodeId> {
    match selection {
        DomSelection::Range { range, .. } => vec![range.start.node, range.end.node],
        DomSelection::Image { image } => vec![*image],
        DomSelection::Table { table, .. } => vec![*table],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{DomPosition, DomRange};
    use crate::model::{Block, Paragraph, find_selection_marker, is_collapsed};

    /// One paragraph `[text "hello" (node t1), marker, text "world" (node t2)]`.
    fn setup() -> (Dom, NodeId, NodeId, ContentModelDocument, DomIndexer) {
        let mut dom = Dom::new();
        let t1 = dom.create_text("hello");
        let t2 = dom.create_text("world");
        let mut model = ContentModelDocument::with_blocks(vec![Block::Paragraph(
            Paragraph::with_segments(vec![
                Segment::text("hello", SegmentFormat::default()),
                Segment::marker(SegmentFormat::default()),
                Segment::text("world", SegmentFormat::default()),
            ]),
        )]);
        select_between_markers(&mut model.blocks);
        let mut indexer = DomIndexer::new();
        let path = BlockPath::root(0);
        indexer.begin_paragraph(&path);
        for node in [t1, t2] {
            indexer.push(
                &path,
                LayoutEntry::Text {
                    node,
                    format: SegmentFormat::default(),
                },
            );
        }
        (dom, t1, t2, model, indexer)
    }

    #[test]
    fn test_collapsed_move() {
        let (dom, t1, _, mut model, indexer) = setup();
        let old = DomSelection::caret(t1, 5);
        assert!(indexer.reconcile_selection(&dom, &mut model, &DomSelection::caret(t1, 2), Some(&old)));
        assert!(is_collapsed(&model.blocks));
        let paragraph = model.blocks[0].as_paragraph().unwrap();
        assert_eq!(paragraph.text(), "helloworld");
        assert_eq!(find_selection_marker(&model.blocks), Some((BlockPath::root(0), 1)));
        assert_eq!(paragraph.segments[0].as_text().unwrap().text, "he");
    }

    #[test]
    fn test_range_across_nodes() {
        let (dom, t1, t2, mut model, indexer) = setup();
        let range = DomRange::new(DomPosition::new(t1, 1), DomPosition::new(t2, 2));
        let selection = DomSelection::Range {
            range,
            is_reverted: true,
        };
        assert!(indexer.reconcile_selection(&dom, &mut model, &selection, None));
        assert!(model.has_reverted_range_selection);
        let selected: String = model.blocks[0]
            .as_paragraph()
            .unwrap()
            .segments
            .iter()
            .filter(|s| s.is_selected())
            .filter_map(Segment::as_text)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(selected, "ellowo");
    }

    #[test]
    fn test_picks_up_native_typing() {
        let (mut dom, t1, _, mut model, indexer) = setup();
        dom.set_text(t1, "hello!").unwrap();
        assert!(indexer.reconcile_selection(&dom, &mut model, &DomSelection::caret(t1, 6), None));
        assert_eq!(model.plain_text(), "hello!world");
    }

    #[test]
    fn test_unindexed_or_released_nodes_fail() {
        let (mut dom, t1, _, mut model, indexer) = setup();
        let before = model.clone();
        let other = dom.create_text("x");
        assert!(!indexer.reconcile_selection(&dom, &mut model, &DomSelection::caret(other, 0), None));
        dom.release(t1);
        assert!(!indexer.reconcile_selection(&dom, &mut model, &DomSelection::caret(t1, 0), None));
        assert_eq!(model, before);
    }

    #[test]
    fn test_table_selection_fails() {
        let (mut dom, _, _, mut model, indexer) = setup();
        let table = dom.create_element("table");
        let selection = DomSelection::Table {
            table,
            first_column: 0,
            last_column: 0,
            first_row: 0,
            last_row: 0,
        };
        assert!(!indexer.reconcile_selection(&dom, &mut model, &selection, None));
    }
}
