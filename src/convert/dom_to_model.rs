//! DOM → Content Model.
//!
//! Walks the children of the editor root once, keeping a stack of open block
//! groups. Paragraphs are created lazily the first time inline content needs
//! one, so no empty implicit paragraph is ever produced. Selection boundaries
//! become [`Segment::SelectionMarker`]s at the exact point they sit in the
//! walk.

use crate::convert::entity::{
    DelimiterSide, is_block_entity_container, is_entity_element, parse_entity_format,
    valid_delimiter_side,
};
use crate::convert::indexer::{DomIndexer, LayoutEntry};
use crate::dom::{Dom, DomPosition, DomSelection, NodeId, NodeKind};
use crate::model::{
    Block, BlockFormat, BlockPath, ContentModelDocument, Direction, Divider, Entity,
    FormatContainer, GroupStep, Image, ListItem, ListLevel, ListType, Paragraph, Segment,
    SegmentFormat, Table, TableCell, TableRow, group_mut, has_segment_css, select_between_markers,
};
use crate::unicode::char_to_byte;

/// Build a model from the children of `root`.
///
/// `selection` becomes markers and selection flags. When an `indexer` is
/// given it is cleared and filled with the layout of every paragraph.
pub fn create_content_model(
    dom: &Dom,
    root: NodeId,
    selection: Option<&DomSelection>,
    indexer: Option<&mut DomIndexer>,
) -> ContentModelDocument {
    let mut indexer = indexer;
    if let Some(indexer) = indexer.as_deref_mut() {
        indexer.clear();
    }

    let mut context = Context::new(dom, root, selection, indexer);
    context.process_children(root);

    let mut document = ContentModelDocument::with_blocks(context.blocks);
    if let Some(DomSelection::Range { is_reverted, .. }) = selection {
        select_between_markers(&mut document.blocks);
        document.has_reverted_range_selection = *is_reverted;
    }
    tracing::trace!(blocks = document.blocks.len(), "content model created");
    document
}

/// How a lazily created paragraph looks in the current block element.
#[derive(Clone, Debug, Default)]
struct ParagraphTemplate {
    explicit: bool,
    decorator: Option<String>,
    format: BlockFormat,
    segment_format: Option<SegmentFormat>,
}

impl ParagraphTemplate {
    fn create(&self) -> Paragraph {
        Paragraph {
            segments: Vec::new(),
            format: self.format.clone(),
            segment_format: self.segment_format.clone(),
            decorator: self.decorator.clone(),
            is_implicit: !self.explicit,
        }
    }
}

/// One open block group.
#[derive(Debug)]
struct Frame {
    steps: Vec<GroupStep>,
    open: Option<usize>,
    template: ParagraphTemplate,
}

impl Frame {
    fn new(steps: Vec<GroupStep>) -> Self {
        Self {
            steps,
            open: None,
            template: ParagraphTemplate::default(),
        }
    }
}

struct TableSelection {
    table: NodeId,
    rows: (usize, usize),
    columns: (usize, usize),
}

struct Context<'a, 'b> {
    dom: &'a Dom,
    blocks: Vec<Block>,
    /// Never empty: the root frame stays for the whole walk.
    frames: Vec<Frame>,
    format: SegmentFormat,
    list_levels: Vec<ListLevel>,
    /// Frame that receives list items of the list being walked.
    list_base: Option<usize>,
    inline_depth: usize,
    start: Option<DomPosition>,
    end: Option<DomPosition>,
    image: Option<NodeId>,
    table: Option<TableSelection>,
    indexer: Option<&'b mut DomIndexer>,
}

impl<'a, 'b> Context<'a, 'b> {
    fn new(
        dom: &'a Dom,
        root: NodeId,
        selection: Option<&DomSelection>,
        indexer: Option<&'b mut DomIndexer>,
    ) -> Self {
        let mut context = Self {
            dom,
            blocks: Vec::new(),
            frames: vec![Frame::new(Vec::new())],
            format: SegmentFormat::default(),
            list_levels: Vec::new(),
            list_base: None,
            inline_depth: 0,
            start: None,
            end: None,
            image: None,
            table: None,
            indexer,
        };
        match selection {
            Some(DomSelection::Range { range, .. }) => {
                context.start = Some(normalize_position(dom, root, range.start));
                context.end = Some(normalize_position(dom, root, range.end));
            }
            Some(DomSelection::Image { image }) => context.image = Some(*image),
            Some(DomSelection::Table {
                table,
                first_column,
                last_column,
                first_row,
                last_row,
            }) => {
                context.table = Some(TableSelection {
                    table: *table,
                    rows: (*first_row, *last_row),
                    columns: (*first_column, *last_column),
                });
            }
            None => {}
        }
        context
    }

    fn top(&self) -> usize {
        self.frames.len() - 1
    }

    fn close(&mut self) {
        let top = self.top();
        self.frames[top].open = None;
    }

    fn push_block_at(&mut self, frame: usize, block: Block) -> Option<usize> {
        let group = group_mut(&mut self.blocks, &self.frames[frame].steps)?;
        group.push(block);
        Some(group.len() - 1)
    }

    fn group_len(&mut self, frame: usize) -> usize {
        group_mut(&mut self.blocks, &self.frames[frame].steps).map_or(0, |group| group.len())
    }

    /// Close the open paragraph and append a block to the current group.
    fn push_block(&mut self, block: Block) -> Option<usize> {
        self.close();
        let top = self.top();
        self.push_block_at(top, block)
    }

    fn ensure_paragraph(&mut self) -> Option<BlockPath> {
        let top = self.top();
        if let Some(index) = self.frames[top].open {
            return Some(BlockPath::new(self.frames[top].steps.clone(), index));
        }
        let paragraph = self.frames[top].template.create();
        let index = self.push_block_at(top, Block::Paragraph(paragraph))?;
        self.frames[top].open = Some(index);
        let path = BlockPath::new(self.frames[top].steps.clone(), index);
        if let Some(indexer) = self.indexer.as_deref_mut() {
            indexer.begin_paragraph(&path);
        }
        Some(path)
    }

    fn add_segment(&mut self, segment: Segment, layout: Option<LayoutEntry>) {
        let Some(path) = self.ensure_paragraph() else {
            return;
        };
        if let Some(paragraph) = path.paragraph_mut(&mut self.blocks) {
            paragraph.segments.push(segment);
        }
        if let (Some(indexer), Some(entry)) = (self.indexer.as_deref_mut(), layout) {
            indexer.push(&path, entry);
        }
    }

    fn add_marker(&mut self) {
        let marker = Segment::marker(self.format.clone());
        self.add_segment(marker, None);
    }

    fn check_boundary(&mut self, node: NodeId, index: usize) {
        let at = Some(DomPosition::new(node, index));
        if self.start == at {
            self.add_marker();
        }
        if self.end == at && self.end != self.start {
            self.add_marker();
        }
    }

    fn process_children(&mut self, node: NodeId) {
        let dom = self.dom;
        let children = dom.children(node);
        for (index, child) in children.iter().enumerate() {
            self.check_boundary(node, index);
            self.process_node(*child);
        }
        self.check_boundary(node, children.len());
    }

    fn process_node(&mut self, node: NodeId) {
        let dom = self.dom;
        match dom.kind(node) {
            Some(NodeKind::Text(text)) => self.process_text(node, text),
            Some(NodeKind::Element(element)) => self.process_element(node, &element.tag),
            None => {}
        }
    }

    fn process_text(&mut self, node: NodeId, text: &str) {
        let length = text.chars().count();
        let mut cuts = Vec::new();
        if let Some(start) = self.start.filter(|p| p.node == node) {
            cuts.push(start.offset.min(length));
        }
        if let Some(end) = self.end.filter(|p| p.node == node && self.end != self.start) {
            cuts.push(end.offset.min(length));
        }
        cuts.sort_unstable();

        let top = self.top();
        if cuts.is_empty()
            && (text.is_empty()
                || (self.inline_depth == 0
                    && self.frames[top].open.is_none()
                    && is_layout_whitespace(text)))
        {
            return;
        }

        let format = self.format.clone();
        let mut last = 0;
        for cut in cuts {
            if cut > last {
                let piece = &text[char_to_byte(text, last)..char_to_byte(text, cut)];
                self.add_segment(Segment::text(piece, format.clone()), None);
            }
            self.add_marker();
            last = cut;
        }
        if length > last {
            let piece = &text[char_to_byte(text, last)..];
            self.add_segment(Segment::text(piece, format.clone()), None);
        }

        if let Some(path) = self.ensure_paragraph() {
            if let Some(indexer) = self.indexer.as_deref_mut() {
                indexer.push(&path, LayoutEntry::Text { node, format });
            }
        }
    }

    fn process_element(&mut self, node: NodeId, tag: &str) {
        let dom = self.dom;
        if valid_delimiter_side(dom, node).is_some() {
            return;
        }
        if is_entity_element(dom, node) {
            self.process_entity(node, tag);
            return;
        }
        if is_block_entity_container(dom, node) {
            self.close();
            self.process_children(node);
            self.close();
            return;
        }

        match tag {
            "br" => {
                let br = Segment::br(self.format.clone());
                self.add_segment(br.clone(), Some(LayoutEntry::Other(br)));
            }
            "img" => self.process_image(node),
            "hr" => {
                self.push_block(Block::Divider(Divider {
                    tag: tag.to_string(),
                    is_selected: false,
                }));
                self.close();
            }
            "table" => self.process_table(node),
            "ol" => self.process_list(node, ListType::Ordered),
            "ul" => self.process_list(node, ListType::Unordered),
            "li" if self.list_base.is_some() => self.process_list_item(node),
            "blockquote" | "pre" => self.process_container(node, tag),
            "div" | "p" | "li" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.process_block(node, tag);
            }
            "script" | "style" | "head" | "meta" | "title" | "template" => {}
            _ => self.process_inline(node, tag),
        }
    }

    fn process_entity(&mut self, node: NodeId, tag: &str) {
        let dom = self.dom;
        let entity = Entity {
            wrapper: node,
            entity_format: parse_entity_format(dom, node),
            format: self.format.clone(),
            is_selected: false,
        };
        let is_block = tag == "div"
            || dom
                .parent(node)
                .is_some_and(|parent| is_block_entity_container(dom, parent));
        if is_block {
            self.push_block(Block::Entity(entity));
            self.close();
        } else {
            let segment = Segment::Entity(entity);
            self.add_segment(segment.clone(), Some(LayoutEntry::Other(segment)));
        }
    }

    fn process_image(&mut self, node: NodeId) {
        let dom = self.dom;
        let mut format = self.format.clone();
        if let Some(css) = dom.attribute(node, "style") {
            format.apply_css(css);
        }
        let layout = Image {
            src: dom.attribute(node, "src").unwrap_or_default().to_string(),
            alt: dom.attribute(node, "alt").map(str::to_string),
            format,
            is_selected: false,
            is_selected_as_image_selection: false,
        };
        let mut image = layout.clone();
        if self.image == Some(node) {
            image.is_selected = true;
            image.is_selected_as_image_selection = true;
        }
        self.add_segment(
            Segment::Image(image),
            Some(LayoutEntry::Image {
                node,
                image: layout,
            }),
        );
    }

    fn process_block(&mut self, node: NodeId, tag: &str) {
        let dom = self.dom;
        self.close();
        let top = self.top();
        let blocks_before = self.group_len(top);

        let css = dom.attribute(node, "style").unwrap_or_default();
        let template = ParagraphTemplate {
            explicit: true,
            decorator: (tag != "div" && tag != "li").then(|| tag.to_string()),
            format: block_format_of(dom, node),
            segment_format: has_segment_css(css).then(|| {
                let mut format = SegmentFormat::default();
                format.apply_css(css);
                format
            }),
        };
        let saved_template = std::mem::replace(&mut self.frames[top].template, template);
        let saved_format = self.format.clone();
        let saved_depth = std::mem::take(&mut self.inline_depth);
        self.format.apply_css(css);

        self.process_children(node);

        if self.group_len(top) == blocks_before && self.frames[top].open.is_none() {
            self.ensure_paragraph();
        }
        self.close();
        self.frames[top].template = saved_template;
        self.format = saved_format;
        self.inline_depth = saved_depth;
    }

    fn process_inline(&mut self, node: NodeId, tag: &str) {
        let dom = self.dom;
        let saved = self.format.clone();
        self.format.apply_tag(tag);
        if let Some(css) = dom.attribute(node, "style") {
            self.format.apply_css(css);
        }
        if tag == "font" {
            if let Some(face) = dom.attribute(node, "face") {
                self.format.font_family = Some(face.to_string());
            }
            if let Some(color) = dom.attribute(node, "color") {
                self.format.text_color = Some(color.to_string());
            }
        }
        self.inline_depth += 1;
        self.process_children(node);
        self.inline_depth -= 1;
        self.format = saved;
    }

    /// Walk `node` as the content of a new group at `steps`.
    fn process_group(&mut self, node: NodeId, steps: Vec<GroupStep>, keep_lists: bool) {
        let dom = self.dom;
        let saved_levels = if keep_lists {
            None
        } else {
            Some((std::mem::take(&mut self.list_levels), self.list_base.take()))
        };
        let saved_format = self.format.clone();
        let saved_depth = std::mem::take(&mut self.inline_depth);
        if let Some(css) = dom.attribute(node, "style") {
            self.format.apply_css(css);
        }

        self.frames.push(Frame::new(steps));
        self.process_children(node);
        self.frames.pop();

        self.format = saved_format;
        self.inline_depth = saved_depth;
        if let Some((levels, base)) = saved_levels {
            self.list_levels = levels;
            self.list_base = base;
        }
    }

    fn process_container(&mut self, node: NodeId, tag: &str) {
        let container = FormatContainer {
            tag: tag.to_string(),
            blocks: Vec::new(),
            format: block_format_of(self.dom, node),
        };
        let Some(index) = self.push_block(Block::FormatContainer(container)) else {
            return;
        };
        let top = self.top();
        let mut steps = self.frames[top].steps.clone();
        steps.push(GroupStep::Child(index));
        self.process_group(node, steps, false);
        self.close();
    }

    fn process_list(&mut self, node: NodeId, list_type: ListType) {
        self.close();
        let outermost = self.list_levels.is_empty();
        let saved_base = self.list_base;
        if outermost {
            self.list_base = Some(self.top());
        }
        self.list_levels.push(ListLevel { list_type });

        self.process_children(node);

        self.list_levels.pop();
        if outermost {
            self.list_base = saved_base;
        }
        self.close();
    }

    fn process_list_item(&mut self, node: NodeId) {
        let Some(base) = self.list_base else {
            return;
        };
        self.close();
        let item = ListItem {
            levels: self.list_levels.clone(),
            blocks: Vec::new(),
            format: block_format_of(self.dom, node),
        };
        self.frames[base].open = None;
        let Some(index) = self.push_block_at(base, Block::ListItem(item)) else {
            return;
        };
        let mut steps = self.frames[base].steps.clone();
        steps.push(GroupStep::Child(index));
        self.process_group(node, steps, true);
    }

    fn process_table(&mut self, node: NodeId) {
        let dom = self.dom;
        let table = Table {
            rows: Vec::new(),
            format: block_format_of(dom, node),
        };
        let Some(table_index) = self.push_block(Block::Table(table)) else {
            return;
        };
        let top = self.top();
        let base_steps = self.frames[top].steps.clone();

        let mut rows = Vec::new();
        for child in dom.children(node) {
            match dom.tag(*child) {
                Some("tr") => rows.push(*child),
                Some("tbody" | "thead" | "tfoot") => rows.extend(
                    dom.children(*child)
                        .iter()
                        .copied()
                        .filter(|n| dom.tag(*n) == Some("tr")),
                ),
                _ => {}
            }
        }

        for (row, tr) in rows.into_iter().enumerate() {
            self.with_table(top, table_index, |table| table.rows.push(TableRow::default()));
            let cells = dom
                .children(tr)
                .iter()
                .copied()
                .filter(|n| matches!(dom.tag(*n), Some("td" | "th")));
            for (col, td) in cells.enumerate() {
                let cell = TableCell {
                    blocks: Vec::new(),
                    is_header: dom.tag(td) == Some("th"),
                    is_selected: self.is_cell_selected(node, row, col),
                    format: block_format_of(dom, td),
                };
                self.with_table(top, table_index, |table| {
                    if let Some(table_row) = table.rows.get_mut(row) {
                        table_row.cells.push(cell);
                    }
                });
                let mut steps = base_steps.clone();
                steps.push(GroupStep::Cell {
                    block: table_index,
                    row,
                    col,
                });
                self.process_group(td, steps, false);
            }
        }
        self.close();
    }

    fn with_table(&mut self, frame: usize, index: usize, f: impl FnOnce(&mut Table)) {
        let group = group_mut(&mut self.blocks, &self.frames[frame].steps);
        if let Some(Block::Table(table)) = group.and_then(|g| g.get_mut(index)) {
            f(table);
        }
    }

    fn is_cell_selected(&self, table: NodeId, row: usize, col: usize) -> bool {
        self.table.as_ref().is_some_and(|selection| {
            selection.table == table
                && (selection.rows.0..=selection.rows.1).contains(&row)
                && (selection.columns.0..=selection.columns.1).contains(&col)
        })
    }
}

fn block_format_of(dom: &Dom, node: NodeId) -> BlockFormat {
    let mut format = BlockFormat::default();
    if let Some(css) = dom.attribute(node, "style") {
        format.apply_css(css);
    }
    if let Some(direction) = dom.attribute(node, "dir").and_then(Direction::parse) {
        format.direction = Some(direction);
    }
    format
}

/// Formatting whitespace between block elements.
fn is_layout_whitespace(text: &str) -> bool {
    text.chars().all(|c| matches!(c, ' ' | '\n' | '\r' | '\t'))
}

/// Move a selection position out of delimiters, entity wrappers and
/// block-entity containers, to the matching point before or after the
/// entity.
fn normalize_position(dom: &Dom, root: NodeId, position: DomPosition) -> DomPosition {
    let mut opaque = None;
    let mut previous = None;
    let mut current = Some(position.node);
    while let Some(node) = current {
        if node == root {
            break;
        }
        if valid_delimiter_side(dom, node).is_some()
            || is_entity_element(dom, node)
            || is_block_entity_container(dom, node)
        {
            opaque = Some((node, previous));
        }
        previous = Some(node);
        current = dom.parent(node);
    }

    let Some((node, inner_child)) = opaque else {
        return position;
    };
    let (Some(parent), Some(index)) = (dom.parent(node), dom.index_in_parent(node)) else {
        return position;
    };

    if is_block_entity_container(dom, node) {
        let wrapper = dom
            .children(node)
            .iter()
            .position(|child| is_entity_element(dom, *child));
        let before = match (wrapper, inner_child) {
            (None, _) => true,
            (Some(w), Some(child)) => dom.index_in_parent(child).is_some_and(|i| i < w),
            (Some(w), None) => position.offset <= w,
        };
        return DomPosition::new(parent, if before { index } else { index + 1 });
    }

    match valid_delimiter_side(dom, node) {
        Some(DelimiterSide::Before) => DomPosition::new(parent, index + 1),
        Some(DelimiterSide::After) => DomPosition::new(parent, index),
        None => DomPosition::new(parent, index + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::DomRange;
    use crate::model::{TextStyle, collect_selection, find_selection_marker, is_collapsed};

    fn load(html: &str) -> (Dom, NodeId) {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        dom.set_attribute(root, "contenteditable", "true").unwrap();
        dom.set_inner_html(root, html).unwrap();
        (dom, root)
    }

    fn node_at(dom: &Dom, root: NodeId, path: &[usize]) -> NodeId {
        crate::dom::selection::resolve_node_path(dom, root, path).unwrap()
    }

    #[test]
    fn test_implicit_paragraph_and_formats() {
        let (dom, root) = load("a<b>b</b><span style=\"color:red\">c</span>");
        let model = create_content_model(&dom, root, None, None);
        assert_eq!(model.blocks.len(), 1);
        let paragraph = model.blocks[0].as_paragraph().unwrap();
        assert!(paragraph.is_implicit);
        assert_eq!(paragraph.segments.len(), 3);
        assert!(paragraph.segments[1].format().style.contains(TextStyle::BOLD));
        assert_eq!(paragraph.segments[2].format().text_color.as_deref(), Some("red"));
    }

    #[test]
    fn test_blocks_and_layout_whitespace() {
        let (dom, root) = load("<div>one</div>\n  <h1>two</h1><hr><p></p>");
        let model = create_content_model(&dom, root, None, None);
        assert_eq!(model.blocks.len(), 4);
        let heading = model.blocks[1].as_paragraph().unwrap();
        assert_eq!(heading.decorator.as_deref(), Some("h1"));
        assert!(!heading.is_implicit);
        assert!(matches!(model.blocks[2], Block::Divider(_)));
        assert!(model.blocks[3].as_paragraph().unwrap().segments.is_empty());
    }

    #[test]
    fn test_collapsed_selection_in_text() {
        let (dom, root) = load("<div>hello</div>");
        let text = node_at(&dom, root, &[0, 0]);
        let model = create_content_model(&dom, root, Some(&DomSelection::caret(text, 2)), None);
        assert!(is_collapsed(&model.blocks));
        assert_eq!(find_selection_marker(&model.blocks), Some((BlockPath::root(0), 1)));
        assert_eq!(model.plain_text(), "hello");
    }

    #[test]
    fn test_range_selection_across_paragraphs() {
        let (dom, root) = load("<div>ab</div><div>cd</div>");
        let start = node_at(&dom, root, &[0, 0]);
        let end = node_at(&dom, root, &[1, 0]);
        let selection = DomSelection::Range {
            range: DomRange::new(DomPosition::new(start, 1), DomPosition::new(end, 1)),
            is_reverted: true,
        };
        let model = create_content_model(&dom, root, Some(&selection), None);
        assert!(model.has_reverted_range_selection);
        assert_eq!(collect_selection(&model.blocks).len(), 2);
    }

    #[test]
    fn test_lists_are_flattened_with_levels() {
        let (dom, root) = load("<ol><li>a</li><ul><li>b</li></ul></ol>");
        let model = create_content_model(&dom, root, None, None);
        assert_eq!(model.blocks.len(), 2);
        let Block::ListItem(inner) = &model.blocks[1] else {
            panic!("expected list item");
        };
        assert_eq!(inner.levels.len(), 2);
        assert_eq!(inner.levels[1].list_type, ListType::Unordered);
    }

    #[test]
    fn test_table_selection_marks_cells() {
        let (dom, root) = load("<table><tbody><tr><td>a</td><td>b</td></tr></tbody></table>");
        let table = node_at(&dom, root, &[0]);
        let selection = DomSelection::Table {
            table,
            first_column: 1,
            last_column: 1,
            first_row: 0,
            last_row: 0,
        };
        let model = create_content_model(&dom, root, Some(&selection), None);
        let Block::Table(table) = &model.blocks[0] else {
            panic!("expected table");
        };
        assert!(!table.rows[0].cells[0].is_selected);
        assert!(table.rows[0].cells[1].is_selected);
        assert_eq!(table.rows[0].cells[1].blocks.len(), 1);
    }

    #[test]
    fn test_entity_and_delimiters() {
        let (dom, root) = load(concat!(
            "<div>a<span class=\"entityDelimiterBefore\">\u{200B}</span>",
            "<span class=\"_Entity _EType_mention _EId_m1 _EReadonly_1\" contenteditable=\"false\">@x</span>",
            "<span class=\"entityDelimiterAfter\">\u{200B}</span></div>"
        ));
        let after = node_at(&dom, root, &[0, 3, 0]);
        let model = create_content_model(&dom, root, Some(&DomSelection::caret(after, 1)), None);
        let paragraph = model.blocks[0].as_paragraph().unwrap();
        assert_eq!(paragraph.segments.len(), 3);
        let entity = paragraph.segments[1].as_entity().unwrap();
        assert_eq!(entity.entity_format.id.as_deref(), Some("m1"));
        assert!(paragraph.segments[2].is_marker());
    }

    #[test]
    fn test_image_selection() {
        let (dom, root) = load("<img src=\"a.png\" alt=\"A\">");
        let image = node_at(&dom, root, &[0]);
        let model = create_content_model(&dom, root, Some(&DomSelection::Image { image }), None);
        let Segment::Image(image) = &model.blocks[0].as_paragraph().unwrap().segments[0] else {
            panic!("expected image");
        };
        assert!(image.is_selected_as_image_selection);
        assert_eq!(image.alt.as_deref(), Some("A"));
    }

    #[test]
    fn test_indexer_is_filled() {
        let (dom, root) = load("<div>a<br>b</div>");
        let mut indexer = DomIndexer::new();
        create_content_model(&dom, root, None, Some(&mut indexer));
        let text = node_at(&dom, root, &[0, 2]);
        assert_eq!(indexer.paragraph_of(text), Some(&BlockPath::root(0)));
    }
}
