//! Host DOM abstraction.
//!
//! The engine never talks to a browser directly. Instead it works on a small
//! arena-backed node tree with the subset of DOM behavior the Content Model
//! needs: elements with attributes, text nodes, parent/child links, HTML
//! serialization and the `contenteditable` rule.
//!
//! Node ids are generational: releasing a subtree bumps the generation of each
//! freed slot, so a stale [`NodeId`] held by a deferred callback can be
//! detected with [`Dom::is_alive`] instead of silently aliasing a new node.
//!
//! Offsets inside text nodes are counted in `char`s, offsets inside elements
//! are child indices.

pub mod html;
pub mod selection;

pub use selection::{DomPosition, DomRange, DomSelection, SnapshotSelection};

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Handle to a node in a [`Dom`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// Element payload: lower-case tag name plus ordered attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
}

/// What a node holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    Text(String),
}

#[derive(Clone, Debug)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Clone, Debug, Default)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena of DOM nodes.
#[derive(Clone, Debug, Default)]
pub struct Dom {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl Dom {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let node = Node {
            kind,
            parent: None,
            children: Vec::new(),
        };
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation == id.generation {
            slot.node.as_ref()
        } else {
            None
        }
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation == id.generation {
            slot.node.as_mut()
        } else {
            None
        }
    }

    fn expect_node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.node_mut(id).ok_or(Error::NodeNotFound(id))
    }

    /// Create a detached element. The tag is stored lower-case.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element(Element {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        }))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeKind::Text(text.to_string()))
    }

    /// Whether `id` still refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Number of live nodes in the arena.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }

    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).map(|node| &node.kind)
    }

    #[must_use]
    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Some(NodeKind::Text(_)))
    }

    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Some(NodeKind::Element(_)))
    }

    /// Tag name of an element.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Element(element) => Some(element.tag.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    /// Data of a text node.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Text(text) => Some(text.as_str()),
            NodeKind::Element(_) => None,
        }
    }

    /// Length of a text node in chars, or child count of an element.
    #[must_use]
    pub fn node_length(&self, id: NodeId) -> usize {
        match self.kind(id) {
            Some(NodeKind::Text(text)) => text.chars().count(),
            Some(NodeKind::Element(_)) => self.children(id).len(),
            None => 0,
        }
    }

    /// Replace the data of a text node.
    pub fn set_text(&mut self, id: NodeId, value: &str) -> Result<()> {
        match &mut self.expect_node_mut(id)?.kind {
            NodeKind::Text(text) => {
                value.clone_into(text);
                Ok(())
            }
            NodeKind::Element(_) => Err(Error::NodeNotFound(id)),
        }
    }

    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Element(element) => element
                .attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    /// All attributes of an element, in insertion order.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> &[(String, String)] {
        match self.kind(id) {
            Some(NodeKind::Element(element)) => &element.attributes,
            _ => &[],
        }
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<()> {
        let NodeKind::Element(element) = &mut self.expect_node_mut(id)?.kind else {
            return Err(Error::NodeNotFound(id));
        };
        let name = name.to_ascii_lowercase();
        if let Some(entry) = element.attributes.iter_mut().find(|(key, _)| *key == name) {
            value.clone_into(&mut entry.1);
        } else {
            element.attributes.push((name, value.to_string()));
        }
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<()> {
        if let NodeKind::Element(element) = &mut self.expect_node_mut(id)?.kind {
            element.attributes.retain(|(key, _)| key != name);
        }
        Ok(())
    }

    /// Iterate the whitespace-separated entries of the `class` attribute.
    pub fn classes(&self, id: NodeId) -> impl Iterator<Item = &str> {
        self.attribute(id, "class")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }

    #[must_use]
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).any(|c| c == class)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> Result<()> {
        if self.has_class(id, class) {
            return Ok(());
        }
        let value = match self.attribute(id, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_string(),
        };
        self.set_attribute(id, "class", &value)
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> Result<()> {
        if !self.has_class(id, class) {
            return Ok(());
        }
        let value: Vec<String> = self
            .classes(id)
            .filter(|c| *c != class)
            .map(str::to_string)
            .collect();
        if value.is_empty() {
            self.remove_attribute(id, "class")
        } else {
            let value = value.join(" ");
            self.set_attribute(id, "class", &value)
        }
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Children of a node (empty for text nodes and dead ids).
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |node| node.children.as_slice())
    }

    #[must_use]
    pub fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// Position of `id` among its parent's children.
    #[must_use]
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|child| *child == id)
    }

    #[must_use]
    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let index = self.index_in_parent(id)?;
        let parent = self.parent(id)?;
        index.checked_sub(1).and_then(|i| self.child_at(parent, i))
    }

    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let index = self.index_in_parent(id)?;
        let parent = self.parent(id)?;
        self.child_at(parent, index + 1)
    }

    /// Whether `node` is `ancestor` or lives below it.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if !self.is_alive(ancestor) {
            return false;
        }
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Remove `id` from its parent without freeing it.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.retain(|child| *child != id);
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
        }
    }

    /// Insert `child` into `parent` before `reference` (or at the end).
    ///
    /// The child is detached from its previous parent first. Inserting a node
    /// into its own subtree is refused.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        if !self.is_alive(parent) {
            return Err(Error::NodeNotFound(parent));
        }
        if !self.is_alive(child) {
            return Err(Error::NodeNotFound(child));
        }
        if self.contains(child, parent) {
            tracing::warn!(?parent, ?child, "refusing to insert a node into its own subtree");
            return Ok(());
        }
        self.detach(child);
        let position = reference.and_then(|r| self.children(parent).iter().position(|c| *c == r));
        let parent_node = self.expect_node_mut(parent)?;
        match position {
            Some(index) => parent_node.children.insert(index, child),
            None => parent_node.children.push(child),
        }
        self.expect_node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent` at child index `index` (clamped).
    pub fn insert_at(&mut self, parent: NodeId, child: NodeId, index: usize) -> Result<()> {
        let reference = self.child_at(parent, index);
        self.insert_before(parent, child, reference)
    }

    /// Insert `new_node` right after `node` in the same parent.
    pub fn insert_after(&mut self, node: NodeId, new_node: NodeId) -> Result<()> {
        let parent = self.parent(node).ok_or(Error::NodeNotFound(node))?;
        let reference = self.next_sibling(node);
        self.insert_before(parent, new_node, reference)
    }

    /// Detach `id` and free it together with everything still below it.
    pub fn release(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        self.detach(id);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let index = current.index as usize;
            let Some(node) = self.slots[index].node.take() else {
                continue;
            };
            stack.extend(node.children);
            self.slots[index].generation = self.slots[index].generation.wrapping_add(1);
            self.free.push(current.index);
        }
    }

    /// Detach every child of `id` and return them in order.
    pub fn take_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let children = self.children(id).to_vec();
        for child in &children {
            self.detach(*child);
        }
        children
    }

    /// Concatenated text of all text nodes below `id`.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            Some(NodeKind::Text(text)) => out.push_str(text),
            Some(NodeKind::Element(_)) => {
                for child in self.children(id) {
                    self.collect_text(*child, out);
                }
            }
            None => {}
        }
    }

    /// Browser `isContentEditable`: the nearest `contenteditable` attribute
    /// on the node or an ancestor decides; no attribute at all means false.
    #[must_use]
    pub fn is_content_editable(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            match self.attribute(node, "contenteditable") {
                Some(value) if value.eq_ignore_ascii_case("false") => return false,
                Some(value) if value.is_empty() || value.eq_ignore_ascii_case("true") => {
                    return true;
                }
                _ => {}
            }
            current = self.parent(node);
        }
        false
    }

    /// Deep-copy a subtree. The copy is detached.
    pub fn clone_subtree(&mut self, id: NodeId) -> Result<NodeId> {
        let kind = self.kind(id).cloned().ok_or(Error::NodeNotFound(id))?;
        let copy = self.alloc(kind);
        for child in self.children(id).to_vec() {
            let child_copy = self.clone_subtree(child)?;
            self.append_child(copy, child_copy)?;
        }
        Ok(copy)
    }

    /// Pre-order list of `id` and all its descendants.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !self.is_alive(current) {
                continue;
            }
            out.push(current);
            stack.extend(self.children(current).iter().rev());
        }
        out
    }

    /// Elements below `root` (inclusive) carrying `class`, in document order.
    #[must_use]
    pub fn query_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.has_class(*id, class))
            .collect()
    }

    /// Serialize the children of `id` as HTML.
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> String {
        html::serialize_children(self, id)
    }

    /// Serialize `id` itself as HTML.
    #[must_use]
    pub fn outer_html(&self, id: NodeId) -> String {
        html::serialize_node(self, id)
    }

    /// Replace the children of `id` with nodes parsed from `source`.
    ///
    /// Parsing happens first; on error the existing children are untouched.
    pub fn set_inner_html(&mut self, id: NodeId, source: &str) -> Result<()> {
        if !self.is_alive(id) {
            return Err(Error::NodeNotFound(id));
        }
        let nodes = html::parse_fragment(self, source)?;
        for child in self.take_children(id) {
            self.release(child);
        }
        for node in nodes {
            self.append_child(id, node)?;
        }
        Ok(())
    }
}
