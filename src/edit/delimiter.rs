//! Keeping entity delimiters consistent with native editing.
//!
//! A caret inside a delimiter is a caret next to a non-editable entity.
//! Arrow keys skip over the entity from one delimiter to the other. Enter
//! splits the paragraph through the model. A typed character lands inside
//! the delimiter first; once the browser inserted it, the delimiter is
//! demoted to plain text and fresh delimiters are added around the entity.

use crate::convert::entity::{
    DELIMITER_AFTER, DELIMITER_BEFORE, DelimiterSide, ENTITY_CLASS, ZERO_WIDTH_SPACE,
    add_delimiters, adjacent_delimiters, delimiter_entity, delimiter_side, demote_delimiter,
    is_entity_element, valid_delimiter_side,
};
use crate::dom::{Dom, DomPosition, DomSelection, NodeId};
use crate::edit::paragraph::split_paragraph;
use crate::editor::{EditorCore, FormatOptions};
use crate::error::Result;
use crate::input::{KeyCode, KeyboardEvent, RawEvent};
use crate::model::{Segment, SegmentFormat, find_selection_marker};
use crate::plugin::ChangeSource;
use crate::unicode::{TextDirection, detect_direction};

/// The delimiter element `node` belongs to, by class, with its side.
#[must_use]
pub fn find_delimiter(dom: &Dom, node: NodeId) -> Option<(NodeId, DelimiterSide)> {
    let element = if dom.is_text(node) { dom.parent(node)? } else { node };
    delimiter_side(dom, element).map(|side| (element, side))
}

/// React to a keystroke while the caret may sit in a delimiter.
pub fn handle_delimiter_key_down(core: &mut EditorCore, raw: &mut KeyboardEvent) -> Result<()> {
    let Some(caret) = collapsed_caret(core) else {
        return Ok(());
    };
    let delimiter = find_delimiter(core.dom(), caret.node);

    match (raw.code, delimiter) {
        (KeyCode::Left | KeyCode::Right, Some((node, side))) if raw.modifiers.is_empty() => {
            move_over_entity(core, raw, node, side)
        }
        (KeyCode::Enter, Some(_)) if !raw.is_composing => enter_on_delimiter(core, raw),
        (_, Some((node, _))) if raw.is_character_value() => {
            core.schedule_deferred(move |core| fix_typed_delimiter(core, node))
        }
        (code, _) if code.is_deletion() && is_near_entity(core.dom(), caret.node) => {
            let add = core.add_delimiter_for_entity();
            core.schedule_deferred(move |core| {
                let root = core.root();
                if reconcile_delimiters(core.dom_mut(), root, add)? {
                    core.clear_model_cache();
                }
                Ok(())
            })
        }
        _ => Ok(()),
    }
}

fn collapsed_caret(core: &EditorCore) -> Option<DomPosition> {
    core.selection()
        .filter(|selection| selection.is_collapsed_range())
        .and_then(DomSelection::as_range)
        .map(|range| range.start)
}

fn is_near_entity(dom: &Dom, node: NodeId) -> bool {
    let element = if dom.is_text(node) { dom.parent(node) } else { Some(node) };
    let Some(element) = element else {
        return false;
    };
    let is_marked = |n: NodeId| is_entity_element(dom, n) || delimiter_side(dom, n).is_some();
    is_marked(element)
        || dom.previous_sibling(element).is_some_and(is_marked)
        || dom.next_sibling(element).is_some_and(is_marked)
        || dom.children(element).iter().any(|child| is_marked(*child))
}

/// Direction of the content around `node`: the nearest `dir` attribute,
/// else the first strong character of the enclosing element.
fn is_rtl_at(dom: &Dom, node: NodeId) -> bool {
    let mut current = Some(node);
    while let Some(id) = current {
        if let Some(dir) = dom.attribute(id, "dir") {
            return dir.eq_ignore_ascii_case("rtl");
        }
        current = dom.parent(id);
    }
    let scope = dom.parent(node).and_then(|p| dom.parent(p)).unwrap_or(node);
    detect_direction(&dom.text_content(scope)) == TextDirection::Rtl
}

/// Move the DOM caret to the delimiter on the other side of the entity.
/// The cached model follows through the `SelectionChanged` this raises.
fn move_over_entity(
    core: &mut EditorCore,
    raw: &mut KeyboardEvent,
    delimiter: NodeId,
    side: DelimiterSide,
) -> Result<()> {
    let dom = core.dom();
    let forward = (raw.code == KeyCode::Right) != is_rtl_at(dom, delimiter);
    let crossing = match side {
        DelimiterSide::Before => forward,
        DelimiterSide::After => !forward,
    };
    if !crossing {
        return Ok(());
    }
    let Some(entity) = delimiter_entity(dom, delimiter) else {
        return Ok(());
    };
    let (before, after) = adjacent_delimiters(dom, entity);
    let target = if forward { after } else { before };
    let Some(text) = target.and_then(|target| dom.first_child(target)) else {
        return Ok(());
    };
    let offset = if forward { dom.node_length(text) } else { 0 };
    if raw.prevent_default() {
        core.set_dom_selection(Some(DomSelection::caret(text, offset)))?;
        tracing::trace!(forward, "caret moved over entity");
    }
    Ok(())
}

fn enter_on_delimiter(core: &mut EditorCore, raw: &mut KeyboardEvent) -> Result<()> {
    let options = FormatOptions::new("handleEnterOnEntityDelimiter")
        .with_source(ChangeSource::Keyboard)
        .with_raw_event(RawEvent::Keyboard(*raw));
    let changed = core.format_content_model(
        |model, _| {
            let Some((path, _)) = find_selection_marker(&model.blocks) else {
                return false;
            };
            let Some(paragraph) = model.paragraph_mut(&path) else {
                return false;
            };
            for segment in &mut paragraph.segments {
                if let Segment::Text(text) = segment {
                    text.text.retain(|c| c != ZERO_WIDTH_SPACE);
                }
            }
            paragraph
                .segments
                .retain(|segment| !matches!(segment, Segment::Text(text) if text.text.is_empty()));
            let Some(marker) = paragraph.marker_index() else {
                return false;
            };
            split_paragraph(model, &path, marker).is_some()
        },
        options,
    )?;
    if changed {
        raw.prevent_default();
    }
    Ok(())
}

/// Deferred half of typing into a delimiter: the browser has inserted the
/// character by now. No-op when the delimiter is gone or still valid.
fn fix_typed_delimiter(core: &mut EditorCore, delimiter: NodeId) -> Result<()> {
    let root = core.root();
    let dom = core.dom();
    if !dom.is_alive(delimiter) || !dom.contains(root, delimiter) {
        return Ok(());
    }
    if valid_delimiter_side(dom, delimiter).is_some() {
        return Ok(());
    }
    let entity = delimiter_entity(dom, delimiter).filter(|entity| !dom.is_content_editable(*entity));
    let mut format = SegmentFormat::default();
    if let Some(style) = dom.attribute(delimiter, "style") {
        format.apply_css(style);
    }
    let caret = collapsed_caret(core).filter(|caret| dom.contains(delimiter, caret.node));
    let caret = caret.map(|caret| {
        let removed = dom
            .text(caret.node)
            .map_or(0, |text| text.chars().take(caret.offset).filter(|c| *c == ZERO_WIDTH_SPACE).count());
        DomPosition::new(caret.node, caret.offset - removed)
    });

    let dom = core.dom_mut();
    demote_delimiter(dom, delimiter)?;
    if let Some(entity) = entity {
        add_delimiters(dom, entity, &format)?;
    }
    if let Some(caret) = caret {
        core.set_dom_selection(Some(DomSelection::caret(caret.node, caret.offset)))?;
    }
    core.clear_model_cache();
    tracing::debug!(?delimiter, "typed delimiter demoted");
    Ok(())
}

/// Bring every delimiter below `root` back in line: a delimiter that lost
/// its zero-width space or its entity is demoted (or removed when empty),
/// and, when `add` is set, each non-editable entity gets both delimiters.
///
/// Returns whether anything changed. A second call on the result changes
/// nothing.
pub fn reconcile_delimiters(dom: &mut Dom, root: NodeId, add: bool) -> Result<bool> {
    let mut changed = false;
    let mut delimiters = dom.query_class(root, DELIMITER_BEFORE);
    delimiters.extend(dom.query_class(root, DELIMITER_AFTER));
    for node in delimiters {
        if !dom.is_alive(node) {
            continue;
        }
        let keep = add
            && valid_delimiter_side(dom, node).is_some()
            && delimiter_entity(dom, node).is_some_and(|entity| !dom.is_content_editable(entity));
        if keep {
            continue;
        }
        if dom.text_content(node).chars().all(|c| c == ZERO_WIDTH_SPACE) {
            dom.release(node);
        } else {
            demote_delimiter(dom, node)?;
        }
        changed = true;
    }

    if add {
        for wrapper in entity_wrappers(dom, root) {
            if dom.is_content_editable(wrapper) {
                continue;
            }
            let (before, after) = adjacent_delimiters(dom, wrapper);
            if before.is_none() || after.is_none() {
                add_delimiters(dom, wrapper, &SegmentFormat::default())?;
                changed = true;
            }
        }
    }
    if changed {
        tracing::trace!("delimiters reconciled");
    }
    Ok(changed)
}

/// Strip delimiters from an extracted copy: valid ones are removed, typed
/// ones keep their text as plain spans.
pub fn remove_delimiters(dom: &mut Dom, root: NodeId) -> Result<()> {
    let mut delimiters = dom.query_class(root, DELIMITER_BEFORE);
    delimiters.extend(dom.query_class(root, DELIMITER_AFTER));
    for node in delimiters {
        if valid_delimiter_side(dom, node).is_some() {
            dom.release(node);
        } else {
            demote_delimiter(dom, node)?;
        }
    }
    Ok(())
}

/// Outermost entity wrappers below `root`. Entities nested inside another
/// entity belong to it and are left alone.
pub(crate) fn entity_wrappers(dom: &Dom, root: NodeId) -> Vec<NodeId> {
    dom.query_class(root, ENTITY_CLASS)
        .into_iter()
        .filter(|wrapper| {
            let mut current = dom.parent(*wrapper);
            while let Some(node) = current {
                if node == root {
                    return true;
                }
                if is_entity_element(dom, node) {
                    return false;
                }
                current = dom.parent(node);
            }
            true
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(html: &str) -> (Dom, NodeId) {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        dom.set_attribute(root, "contenteditable", "true").unwrap();
        dom.set_inner_html(root, html).unwrap();
        (dom, root)
    }

    const ENTITY: &str =
        "<span class=\"_Entity _EType_e _EId_e1 _EReadonly_1\" contenteditable=\"false\">E</span>";

    #[test]
    fn test_reconcile_adds_missing_delimiters() {
        let (mut dom, root) = load(&format!("<div>a{ENTITY}b</div>"));
        assert!(reconcile_delimiters(&mut dom, root, true).unwrap());
        let html = dom.inner_html(root);
        assert!(html.contains("entityDelimiterBefore"));
        assert!(html.contains("entityDelimiterAfter"));
        assert!(!reconcile_delimiters(&mut dom, root, true).unwrap());
        assert_eq!(dom.inner_html(root), html);
    }

    #[test]
    fn test_reconcile_removes_orphans_and_demotes_typed() {
        let (mut dom, root) = load(
            "<div><span class=\"entityDelimiterAfter\">\u{200B}</span>\
             <span class=\"entityDelimiterBefore\">\u{200B}x</span></div>",
        );
        assert!(reconcile_delimiters(&mut dom, root, true).unwrap());
        assert_eq!(dom.inner_html(root), "<div><span>x</span></div>");
    }

    #[test]
    fn test_editable_entity_gets_no_delimiters() {
        let (mut dom, root) = load("<div><span class=\"_Entity _EType_e _EReadonly_0\">E</span></div>");
        assert!(!reconcile_delimiters(&mut dom, root, true).unwrap());
    }

    #[test]
    fn test_remove_delimiters() {
        let (mut dom, root) = load(&format!("<div>{ENTITY}</div>"));
        reconcile_delimiters(&mut dom, root, true).unwrap();
        remove_delimiters(&mut dom, root).unwrap();
        assert_eq!(dom.inner_html(root), format!("<div>{ENTITY}</div>"));
    }

    #[test]
    fn test_find_delimiter_from_text() {
        let (mut dom, root) = load(&format!("<div>{ENTITY}</div>"));
        reconcile_delimiters(&mut dom, root, true).unwrap();
        let before = dom.query_class(root, DELIMITER_BEFORE)[0];
        let text = dom.first_child(before).unwrap();
        assert_eq!(find_delimiter(&dom, text), Some((before, DelimiterSide::Before)));
        assert_eq!(find_delimiter(&dom, root), None);
    }

    #[test]
    fn test_nested_entities_are_skipped() {
        let (dom, root) = load(&format!(
            "<div class=\"_Entity _EType_outer _EReadonly_1\">{ENTITY}</div>"
        ));
        assert_eq!(entity_wrappers(&dom, root).len(), 1);
    }
}
