//! DOM conventions for entities and their delimiters.
//!
//! An entity wrapper carries `_Entity _EType_<type> _EId_<id> _EReadonly_<0|1>`.
//! Delimiters are `span`s holding a single zero-width space placed right
//! before (`entityDelimiterBefore`) and after (`entityDelimiterAfter`) a
//! non-editable entity. Block entities are wrapped in a
//! `div._E_EBlockEntityContainer` that holds both delimiters.

use crate::dom::{Dom, NodeId};
use crate::error::{Error, Result};
use crate::model::{EntityFormat, SegmentFormat};

pub const ENTITY_CLASS: &str = "_Entity";
pub const ENTITY_TYPE_PREFIX: &str = "_EType_";
pub const ENTITY_ID_PREFIX: &str = "_EId_";
pub const ENTITY_READONLY_PREFIX: &str = "_EReadonly_";
pub const DELIMITER_BEFORE: &str = "entityDelimiterBefore";
pub const DELIMITER_AFTER: &str = "entityDelimiterAfter";
pub const BLOCK_ENTITY_CONTAINER: &str = "_E_EBlockEntityContainer";
pub const ZERO_WIDTH_SPACE: char = '\u{200B}';
const ZWS_STR: &str = "\u{200B}";

/// Which side of an entity a delimiter sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DelimiterSide {
    Before,
    After,
}

impl DelimiterSide {
    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Before => DELIMITER_BEFORE,
            Self::After => DELIMITER_AFTER,
        }
    }
}

#[must_use]
pub fn is_entity_element(dom: &Dom, node: NodeId) -> bool {
    dom.has_class(node, ENTITY_CLASS)
}

#[must_use]
pub fn is_block_entity_container(dom: &Dom, node: NodeId) -> bool {
    dom.has_class(node, BLOCK_ENTITY_CONTAINER)
}

/// Side of a delimiter element by class only, whatever its content.
#[must_use]
pub fn delimiter_side(dom: &Dom, node: NodeId) -> Option<DelimiterSide> {
    if dom.has_class(node, DELIMITER_BEFORE) {
        Some(DelimiterSide::Before)
    } else if dom.has_class(node, DELIMITER_AFTER) {
        Some(DelimiterSide::After)
    } else {
        None
    }
}

/// A delimiter whose content is still exactly one zero-width space.
#[must_use]
pub fn valid_delimiter_side(dom: &Dom, node: NodeId) -> Option<DelimiterSide> {
    let side = delimiter_side(dom, node)?;
    (dom.text_content(node) == ZWS_STR).then_some(side)
}

/// Read the entity format from a wrapper's classes.
#[must_use]
pub fn parse_entity_format(dom: &Dom, wrapper: NodeId) -> EntityFormat {
    let mut format = EntityFormat::default();
    for class in dom.classes(wrapper) {
        if let Some(entity_type) = class.strip_prefix(ENTITY_TYPE_PREFIX) {
            format.entity_type = Some(entity_type.to_string());
        } else if let Some(id) = class.strip_prefix(ENTITY_ID_PREFIX) {
            format.id = Some(id.to_string());
        } else if let Some(flag) = class.strip_prefix(ENTITY_READONLY_PREFIX) {
            format.is_readonly = flag == "1";
        }
    }
    format
}

/// Class attribute value for an entity format.
#[must_use]
pub fn entity_class_names(format: &EntityFormat) -> String {
    let mut classes = vec![ENTITY_CLASS.to_string()];
    if let Some(entity_type) = &format.entity_type {
        classes.push(format!("{ENTITY_TYPE_PREFIX}{entity_type}"));
    }
    if let Some(id) = &format.id {
        classes.push(format!("{ENTITY_ID_PREFIX}{id}"));
    }
    classes.push(format!(
        "{ENTITY_READONLY_PREFIX}{}",
        u8::from(format.is_readonly)
    ));
    classes.join(" ")
}

/// Stamp entity classes on a wrapper. Read-only entities become
/// `contenteditable="false"`.
pub fn apply_entity_format(dom: &mut Dom, wrapper: NodeId, format: &EntityFormat) -> Result<()> {
    dom.set_attribute(wrapper, "class", &entity_class_names(format))?;
    if format.is_readonly {
        dom.set_attribute(wrapper, "contenteditable", "false")?;
    }
    Ok(())
}

/// Create a detached delimiter span.
pub fn create_delimiter(dom: &mut Dom, side: DelimiterSide, format: &SegmentFormat) -> Result<NodeId> {
    let span = dom.create_element("span");
    dom.set_attribute(span, "class", side.class())?;
    let css = format.to_css();
    if !css.is_empty() {
        dom.set_attribute(span, "style", &css)?;
    }
    let text = dom.create_text(ZWS_STR);
    dom.append_child(span, text)?;
    Ok(span)
}

/// Valid delimiters currently adjacent to `wrapper`: `(before, after)`.
#[must_use]
pub fn adjacent_delimiters(dom: &Dom, wrapper: NodeId) -> (Option<NodeId>, Option<NodeId>) {
    let before = dom
        .previous_sibling(wrapper)
        .filter(|n| valid_delimiter_side(dom, *n) == Some(DelimiterSide::Before));
    let after = dom
        .next_sibling(wrapper)
        .filter(|n| valid_delimiter_side(dom, *n) == Some(DelimiterSide::After));
    (before, after)
}

/// Make sure `wrapper` has a valid delimiter on each side. Returns
/// `(before, after)`.
pub fn add_delimiters(
    dom: &mut Dom,
    wrapper: NodeId,
    format: &SegmentFormat,
) -> Result<(NodeId, NodeId)> {
    let (before, after) = adjacent_delimiters(dom, wrapper);
    let after = match after {
        Some(node) => node,
        None => {
            let node = create_delimiter(dom, DelimiterSide::After, format)?;
            dom.insert_after(wrapper, node)?;
            node
        }
    };
    let before = match before {
        Some(node) => node,
        None => {
            let node = create_delimiter(dom, DelimiterSide::Before, format)?;
            let parent = dom.parent(wrapper).ok_or(Error::NodeNotFound(wrapper))?;
            dom.insert_before(parent, node, Some(wrapper))?;
            node
        }
    };
    Ok((before, after))
}

/// Remove the delimiter role from `node`: drop both classes and strip every
/// zero-width space from its text.
pub fn demote_delimiter(dom: &mut Dom, node: NodeId) -> Result<()> {
    dom.remove_class(node, DELIMITER_BEFORE)?;
    dom.remove_class(node, DELIMITER_AFTER)?;
    for child in dom.descendants(node) {
        if let Some(text) = dom.text(child) {
            if text.contains(ZERO_WIDTH_SPACE) {
                let stripped = text.replace(ZERO_WIDTH_SPACE, "");
                dom.set_text(child, &stripped)?;
            }
        }
    }
    Ok(())
}

/// The entity a delimiter belongs to, if it still sits next to one.
#[must_use]
pub fn delimiter_entity(dom: &Dom, delimiter: NodeId) -> Option<NodeId> {
    let sibling = match delimiter_side(dom, delimiter)? {
        DelimiterSide::Before => dom.next_sibling(delimiter),
        DelimiterSide::After => dom.previous_sibling(delimiter),
    }?;
    is_entity_element(dom, sibling).then_some(sibling)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_class_round_trip() {
        let format = EntityFormat {
            entity_type: Some("mention".to_string()),
            id: Some("m_1".to_string()),
            is_readonly: true,
        };
        let classes = entity_class_names(&format);
        assert_eq!(classes, "_Entity _EType_mention _EId_m_1 _EReadonly_1");

        let mut dom = Dom::new();
        let wrapper = dom.create_element("span");
        apply_entity_format(&mut dom, wrapper, &format).unwrap();
        assert_eq!(parse_entity_format(&dom, wrapper), format);
        assert_eq!(dom.attribute(wrapper, "contenteditable"), Some("false"));
    }

    #[test]
    fn test_add_delimiters_is_idempotent() {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        let wrapper = dom.create_element("span");
        dom.append_child(root, wrapper).unwrap();
        let first = add_delimiters(&mut dom, wrapper, &SegmentFormat::default()).unwrap();
        let second = add_delimiters(&mut dom, wrapper, &SegmentFormat::default()).unwrap();
        assert_eq!(first, second);
        assert_eq!(dom.children(root).len(), 3);
        assert_eq!(delimiter_entity(&dom, first.0), None);
    }

    #[test]
    fn test_demote_strips_zws() {
        let mut dom = Dom::new();
        let span = create_delimiter(&mut dom, DelimiterSide::After, &SegmentFormat::default()).unwrap();
        let text = dom.first_child(span).unwrap();
        dom.set_text(text, "\u{200B}ab").unwrap();
        assert_eq!(valid_delimiter_side(&dom, span), None);
        demote_delimiter(&mut dom, span).unwrap();
        assert_eq!(dom.text(text), Some("ab"));
        assert_eq!(delimiter_side(&dom, span), None);
    }
}
