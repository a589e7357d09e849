//! Content Model → DOM.
//!
//! The children of the editor root are rebuilt from scratch on every write,
//! except for entity wrappers: those belong to the host and are re-parented
//! into their new place. Selection markers are turned into DOM positions
//! while writing, so the resulting selection always matches the new nodes.

use crate::convert::entity::{BLOCK_ENTITY_CONTAINER, DelimiterSide, add_delimiters, create_delimiter};
use crate::convert::indexer::{DomIndexer, LayoutEntry};
use crate::dom::{Dom, DomPosition, DomRange, DomSelection, NodeId};
use crate::error::Result;
use crate::model::{
    Block, BlockFormat, BlockPath, ContentModelDocument, Entity, GroupStep, ListItem, ListType,
    Paragraph, Segment, SegmentFormat, Table, visit_blocks,
};

/// Options for [`set_content_model`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelToDomOptions {
    /// Surround non-editable entities with delimiters.
    pub add_delimiter_for_entity: bool,
}

impl Default for ModelToDomOptions {
    fn default() -> Self {
        Self {
            add_delimiter_for_entity: true,
        }
    }
}

/// Write `model` into `root`, replacing its children.
///
/// Returns the DOM selection described by the model: its markers, an image
/// selected as a whole, or a rectangle of selected table cells.
pub fn set_content_model(
    dom: &mut Dom,
    root: NodeId,
    model: &ContentModelDocument,
    options: &ModelToDomOptions,
    indexer: Option<&mut DomIndexer>,
) -> Result<Option<DomSelection>> {
    let mut indexer = indexer;
    if let Some(indexer) = indexer.as_deref_mut() {
        indexer.clear();
    }

    for wrapper in entity_wrappers(model) {
        dom.detach(wrapper);
    }
    for child in dom.take_children(root) {
        dom.release(child);
    }

    let mut writer = Writer {
        dom,
        options: *options,
        indexer,
        start: None,
        end: None,
        image: None,
        table: None,
    };
    writer.write_blocks(root, &model.blocks, &[])?;

    let selection = writer.selection(model.has_reverted_range_selection);
    tracing::trace!(blocks = model.blocks.len(), ?selection, "content model written");
    Ok(selection)
}

fn entity_wrappers(model: &ContentModelDocument) -> Vec<NodeId> {
    let mut wrappers = Vec::new();
    visit_blocks(&model.blocks, &mut |_, block| match block {
        Block::Entity(entity) => wrappers.push(entity.wrapper),
        Block::Paragraph(paragraph) => wrappers.extend(
            paragraph
                .segments
                .iter()
                .filter_map(Segment::as_entity)
                .map(|entity| entity.wrapper),
        ),
        _ => {}
    });
    wrappers
}

struct SelectedCells {
    table: NodeId,
    rows: (usize, usize),
    columns: (usize, usize),
}

struct Writer<'a, 'b> {
    dom: &'a mut Dom,
    options: ModelToDomOptions,
    indexer: Option<&'b mut DomIndexer>,
    start: Option<DomPosition>,
    end: Option<DomPosition>,
    image: Option<NodeId>,
    table: Option<SelectedCells>,
}

impl Writer<'_, '_> {
    fn selection(&self, is_reverted: bool) -> Option<DomSelection> {
        if let Some(image) = self.image {
            return Some(DomSelection::Image { image });
        }
        if let Some(start) = self.start {
            let end = self.end.unwrap_or(start);
            return Some(DomSelection::Range {
                range: DomRange::new(start, end),
                is_reverted: is_reverted && start != end,
            });
        }
        self.table.as_ref().map(|cells| DomSelection::Table {
            table: cells.table,
            first_column: cells.columns.0,
            last_column: cells.columns.1,
            first_row: cells.rows.0,
            last_row: cells.rows.1,
        })
    }

    fn element(&mut self, tag: &str, parent: NodeId) -> Result<NodeId> {
        let node = self.dom.create_element(tag);
        self.dom.append_child(parent, node)?;
        Ok(node)
    }

    fn apply_block_format(&mut self, node: NodeId, format: &BlockFormat, extra_css: &str) -> Result<()> {
        if let Some(direction) = format.direction {
            self.dom.set_attribute(node, "dir", direction.as_str())?;
        }
        let css = join_css(&format.to_css(), extra_css);
        if !css.is_empty() {
            self.dom.set_attribute(node, "style", &css)?;
        }
        Ok(())
    }

    fn write_blocks(&mut self, parent: NodeId, blocks: &[Block], groups: &[GroupStep]) -> Result<()> {
        let mut lists: Vec<(ListType, NodeId)> = Vec::new();
        for (index, block) in blocks.iter().enumerate() {
            let path = BlockPath::new(groups.to_vec(), index);
            if let Block::ListItem(item) = block {
                self.write_list_item(parent, item, &path, &mut lists)?;
                continue;
            }
            lists.clear();
            match block {
                Block::Paragraph(paragraph) => self.write_paragraph(parent, paragraph, &path)?,
                Block::Entity(entity) => self.write_block_entity(parent, entity)?,
                Block::Table(table) => self.write_table(parent, table, &path)?,
                Block::FormatContainer(container) => {
                    let node = self.element(&container.tag, parent)?;
                    self.apply_block_format(node, &container.format, "")?;
                    let mut steps = groups.to_vec();
                    steps.push(GroupStep::Child(index));
                    self.write_blocks(node, &container.blocks, &steps)?;
                }
                Block::Divider(divider) => {
                    self.element(&divider.tag, parent)?;
                }
                Block::ListItem(_) => {}
            }
        }
        Ok(())
    }

    fn write_list_item(
        &mut self,
        parent: NodeId,
        item: &ListItem,
        path: &BlockPath,
        lists: &mut Vec<(ListType, NodeId)>,
    ) -> Result<()> {
        let shared = lists
            .iter()
            .zip(&item.levels)
            .take_while(|((list_type, _), level)| *list_type == level.list_type)
            .count();
        lists.truncate(shared);
        for level in &item.levels[shared..] {
            let list_parent = lists.last().map_or(parent, |(_, node)| *node);
            let node = self.element(level.list_type.tag(), list_parent)?;
            lists.push((level.list_type, node));
        }

        let list = lists.last().map_or(parent, |(_, node)| *node);
        let li = self.element("li", list)?;
        self.apply_block_format(li, &item.format, "")?;
        let mut steps = path.groups.clone();
        steps.push(GroupStep::Child(path.index));
        self.write_blocks(li, &item.blocks, &steps)
    }

    fn write_table(&mut self, parent: NodeId, table: &Table, path: &BlockPath) -> Result<()> {
        let table_node = self.element("table", parent)?;
        self.apply_block_format(table_node, &table.format, "")?;
        let body = self.element("tbody", table_node)?;
        for (row, table_row) in table.rows.iter().enumerate() {
            let tr = self.element("tr", body)?;
            for (col, cell) in table_row.cells.iter().enumerate() {
                let td = self.element(if cell.is_header { "th" } else { "td" }, tr)?;
                self.apply_block_format(td, &cell.format, "")?;
                if cell.is_selected {
                    self.select_cell(table_node, row, col);
                }
                let mut steps = path.groups.clone();
                steps.push(GroupStep::Cell {
                    block: path.index,
                    row,
                    col,
                });
                self.write_blocks(td, &cell.blocks, &steps)?;
            }
        }
        Ok(())
    }

    fn select_cell(&mut self, table: NodeId, row: usize, col: usize) {
        match &mut self.table {
            None => {
                self.table = Some(SelectedCells {
                    table,
                    rows: (row, row),
                    columns: (col, col),
                });
            }
            Some(cells) if cells.table == table => {
                cells.rows = (cells.rows.0.min(row), cells.rows.1.max(row));
                cells.columns = (cells.columns.0.min(col), cells.columns.1.max(col));
            }
            Some(_) => {}
        }
    }

    fn write_block_entity(&mut self, parent: NodeId, entity: &Entity) -> Result<()> {
        if !self.dom.is_alive(entity.wrapper) {
            tracing::warn!(wrapper = ?entity.wrapper, "entity wrapper no longer exists");
            return Ok(());
        }
        if self.options.add_delimiter_for_entity && !is_editable_in(self.dom, entity.wrapper, parent) {
            let container = self.element("div", parent)?;
            self.dom.set_attribute(container, "class", BLOCK_ENTITY_CONTAINER)?;
            let before = create_delimiter(self.dom, DelimiterSide::Before, &entity.format)?;
            self.dom.append_child(container, before)?;
            self.dom.append_child(container, entity.wrapper)?;
            let after = create_delimiter(self.dom, DelimiterSide::After, &entity.format)?;
            self.dom.append_child(container, after)?;
        } else {
            self.dom.append_child(parent, entity.wrapper)?;
        }
        Ok(())
    }

    fn write_paragraph(&mut self, parent: NodeId, paragraph: &Paragraph, path: &BlockPath) -> Result<()> {
        let container = if paragraph.needs_wrapper() {
            let tag = paragraph.decorator.as_deref().unwrap_or("div");
            let node = self.element(tag, parent)?;
            let segment_css = paragraph
                .segment_format
                .as_ref()
                .map(SegmentFormat::to_css)
                .unwrap_or_default();
            self.apply_block_format(node, &paragraph.format, &segment_css)?;
            node
        } else {
            parent
        };

        if let Some(indexer) = self.indexer.as_deref_mut() {
            indexer.begin_paragraph(path);
        }

        let mut last_text: Option<(NodeId, usize)> = None;
        for segment in &paragraph.segments {
            let mut text_node = None;
            let entry = match segment {
                Segment::Text(text) => {
                    let span = self.element("span", container)?;
                    let css = text.format.to_css();
                    if !css.is_empty() {
                        self.dom.set_attribute(span, "style", &css)?;
                    }
                    let node = self.dom.create_text(&text.text);
                    self.dom.append_child(span, node)?;
                    text_node = Some((node, text.text.chars().count()));
                    Some(LayoutEntry::Text {
                        node,
                        format: text.format.clone(),
                    })
                }
                Segment::SelectionMarker(_) => {
                    let position = match last_text {
                        Some((node, length)) => DomPosition::new(node, length),
                        None => DomPosition::new(container, self.dom.children(container).len()),
                    };
                    if self.start.is_none() {
                        self.start = Some(position);
                    } else {
                        self.end = Some(position);
                    }
                    text_node = last_text;
                    None
                }
                Segment::Br(_) => {
                    self.element("br", container)?;
                    Some(LayoutEntry::Other(segment.clone()))
                }
                Segment::Image(image) => {
                    let node = self.element("img", container)?;
                    self.dom.set_attribute(node, "src", &image.src)?;
                    if let Some(alt) = &image.alt {
                        self.dom.set_attribute(node, "alt", alt)?;
                    }
                    let css = image.format.to_css();
                    if !css.is_empty() {
                        self.dom.set_attribute(node, "style", &css)?;
                    }
                    if image.is_selected_as_image_selection {
                        self.image = Some(node);
                    }
                    let mut layout = image.clone();
                    layout.is_selected = false;
                    layout.is_selected_as_image_selection = false;
                    Some(LayoutEntry::Image {
                        node,
                        image: layout,
                    })
                }
                Segment::Entity(entity) => {
                    if self.dom.is_alive(entity.wrapper) {
                        self.dom.append_child(container, entity.wrapper)?;
                        if self.options.add_delimiter_for_entity
                            && !is_editable_in(self.dom, entity.wrapper, container)
                        {
                            add_delimiters(self.dom, entity.wrapper, &entity.format)?;
                        }
                        Some(LayoutEntry::Other(segment.clone()))
                    } else {
                        tracing::warn!(wrapper = ?entity.wrapper, "entity wrapper no longer exists");
                        None
                    }
                }
            };
            last_text = text_node;
            if let (Some(indexer), Some(entry)) = (self.indexer.as_deref_mut(), entry) {
                indexer.push(path, entry);
            }
        }
        Ok(())
    }
}

/// Editability of `wrapper` once it sits under `parent`.
fn is_editable_in(dom: &Dom, wrapper: NodeId, parent: NodeId) -> bool {
    match dom.attribute(wrapper, "contenteditable") {
        Some(value) if value.eq_ignore_ascii_case("false") => false,
        Some(value) if value.is_empty() || value.eq_ignore_ascii_case("true") => true,
        _ => dom.is_content_editable(parent),
    }
}

fn join_css(first: &str, second: &str) -> String {
    match (first.is_empty(), second.is_empty()) {
        (true, _) => second.to_string(),
        (_, true) => first.to_string(),
        _ => format!("{first};{second}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::create_content_model;
    use crate::convert::entity::apply_entity_format;
    use crate::model::{EntityFormat, ListLevel, TextStyle, select_between_markers};

    fn setup() -> (Dom, NodeId) {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        dom.set_attribute(root, "contenteditable", "true").unwrap();
        (dom, root)
    }

    fn text(s: &str) -> Segment {
        Segment::text(s, SegmentFormat::default())
    }

    #[test]
    fn test_paragraphs_and_caret() {
        let (mut dom, root) = setup();
        let mut model = ContentModelDocument::with_blocks(vec![Block::Paragraph(
            Paragraph::with_segments(vec![
                Segment::text("ab", SegmentFormat::default().with_bold()),
                Segment::marker(SegmentFormat::default()),
            ]),
        )]);
        select_between_markers(&mut model.blocks);
        let selection = set_content_model(&mut dom, root, &model, &ModelToDomOptions::default(), None)
            .unwrap()
            .unwrap();
        insta::assert_snapshot!(
            dom.inner_html(root),
            @r#"<div><span style="font-weight:bold">ab</span></div>"#
        );
        let range = selection.as_range().unwrap();
        assert!(range.collapsed());
        assert_eq!(dom.text(range.start.node), Some("ab"));
        assert_eq!(range.start.offset, 2);
    }

    #[test]
    fn test_implicit_paragraph_has_no_wrapper() {
        let (mut dom, root) = setup();
        let mut paragraph = Paragraph::new(true);
        paragraph.segments = vec![text("x"), Segment::br(SegmentFormat::default())];
        let model = ContentModelDocument::with_blocks(vec![Block::Paragraph(paragraph)]);
        set_content_model(&mut dom, root, &model, &ModelToDomOptions::default(), None).unwrap();
        insta::assert_snapshot!(dom.inner_html(root), @"<span>x</span><br>");
    }

    #[test]
    fn test_nested_lists() {
        let (mut dom, root) = setup();
        let item = |levels: Vec<ListType>, s: &str| {
            Block::ListItem(ListItem {
                levels: levels
                    .into_iter()
                    .map(|list_type| ListLevel { list_type })
                    .collect(),
                blocks: vec![Block::Paragraph(Paragraph {
                    is_implicit: true,
                    ..Paragraph::with_segments(vec![text(s)])
                })],
                format: BlockFormat::default(),
            })
        };
        let model = ContentModelDocument::with_blocks(vec![
            item(vec![ListType::Ordered], "a"),
            item(vec![ListType::Ordered, ListType::Unordered], "b"),
            item(vec![ListType::Ordered], "c"),
        ]);
        set_content_model(&mut dom, root, &model, &ModelToDomOptions::default(), None).unwrap();
        insta::assert_snapshot!(
            dom.inner_html(root),
            @"<ol><li><span>a</span></li><ul><li><span>b</span></li></ul><li><span>c</span></li></ol>"
        );
    }

    #[test]
    fn test_entity_wrapper_is_reused_with_delimiters() {
        let (mut dom, root) = setup();
        let wrapper = dom.create_element("span");
        let format = EntityFormat {
            entity_type: Some("mention".to_string()),
            id: Some("m1".to_string()),
            is_readonly: true,
        };
        apply_entity_format(&mut dom, wrapper, &format).unwrap();
        let label = dom.create_text("@x");
        dom.append_child(wrapper, label).unwrap();

        let model = ContentModelDocument::with_blocks(vec![Block::Paragraph(
            Paragraph::with_segments(vec![
                text("a"),
                Segment::Entity(Entity::new(wrapper, format)),
            ]),
        )]);
        set_content_model(&mut dom, root, &model, &ModelToDomOptions::default(), None).unwrap();
        let div = dom.first_child(root).unwrap();
        assert_eq!(dom.children(div).len(), 4);
        assert_eq!(dom.child_at(div, 2), Some(wrapper));

        // Writing again keeps the same wrapper node alive.
        set_content_model(&mut dom, root, &model, &ModelToDomOptions::default(), None).unwrap();
        assert!(dom.is_alive(wrapper));
        assert!(dom.is_alive(label));
    }

    #[test]
    fn test_round_trip_is_stable() {
        let (mut dom, root) = setup();
        dom.set_inner_html(
            root,
            concat!(
                "<div style=\"text-align:center\"><span style=\"font-style:italic\">hi</span><br></div>",
                "<blockquote><div><span>q</span></div></blockquote>",
                "<table><tbody><tr><td><span>c</span></td><th><span>d</span></th></tr></tbody></table>",
                "<hr><h2><span>t</span></h2>"
            ),
        )
        .unwrap();
        let first = create_content_model(&dom, root, None, None);
        set_content_model(&mut dom, root, &first, &ModelToDomOptions::default(), None).unwrap();
        let html = dom.inner_html(root);
        let second = create_content_model(&dom, root, None, None);
        assert_eq!(first, second);
        set_content_model(&mut dom, root, &second, &ModelToDomOptions::default(), None).unwrap();
        assert_eq!(dom.inner_html(root), html);
        let italic = first.blocks[0].as_paragraph().unwrap().segments[0].format().style;
        assert_eq!(italic, TextStyle::ITALIC);
    }

    #[test]
    fn test_selected_cells_become_table_selection() {
        let (mut dom, root) = setup();
        let mut table = Table::default();
        table.rows.push(crate::model::TableRow {
            cells: vec![
                crate::model::TableCell {
                    is_selected: true,
                    ..Default::default()
                },
                crate::model::TableCell {
                    is_selected: true,
                    ..Default::default()
                },
            ],
        });
        let model = ContentModelDocument::with_blocks(vec![Block::Table(table)]);
        let selection = set_content_model(&mut dom, root, &model, &ModelToDomOptions::default(), None)
            .unwrap();
        assert!(matches!(
            selection,
            Some(DomSelection::Table {
                first_column: 0,
                last_column: 1,
                ..
            })
        ));
    }
}
