//! Backspace and Delete through the model.
//!
//! Plain deletions inside a text node are left to the browser; everything
//! that can cross a segment, block or entity boundary goes through the
//! delete pipeline.

use crate::dom::DomSelection;
use crate::edit::delete_selection::{DeleteResult, DeleteSelectionStep, delete_selection};
use crate::edit::delete_steps::{
    backward_delete_collapsed, backward_delete_word, delete_all_segment_before,
    forward_delete_collapsed, forward_delete_word,
};
use crate::editor::{EditorCore, FormatOptions};
use crate::error::Result;
use crate::input::{KeyCode, KeyboardEvent, RawEvent};
use crate::plugin::ChangeSource;

/// Steps for a Backspace/Delete keystroke, in the order they are tried:
/// delete to line start, delete word, delete one unit.
#[must_use]
pub fn get_delete_steps(raw: &KeyboardEvent, is_mac: bool) -> [Option<DeleteSelectionStep>; 3] {
    let forward = raw.code == KeyCode::Delete;
    let delete_all_before = is_mac && !forward && raw.meta() && !raw.alt();
    let delete_word = if is_mac {
        raw.alt() && !raw.meta()
    } else {
        raw.ctrl() && !raw.alt()
    };

    let all_before: Option<DeleteSelectionStep> =
        delete_all_before.then_some(delete_all_segment_before);
    let word: Option<DeleteSelectionStep> = match (delete_word, forward) {
        (false, _) => None,
        (true, true) => Some(forward_delete_word),
        (true, false) => Some(backward_delete_word),
    };
    let single: DeleteSelectionStep = if forward {
        forward_delete_collapsed
    } else {
        backward_delete_collapsed
    };
    [all_before, word, Some(single)]
}

/// Whether the keystroke must go through the model. False only for a plain
/// deletion inside a text node the browser handles the same way.
#[must_use]
pub fn should_delete_with_content_model(core: &EditorCore, raw: &KeyboardEvent) -> bool {
    let Some(selection) = core.selection() else {
        return false;
    };
    let range = match selection {
        DomSelection::Range { range, .. } if range.collapsed() => range,
        _ => return true,
    };
    if raw.has_modifier_key() {
        return true;
    }
    let dom = core.dom();
    let node = range.start.node;
    if !dom.is_text(node) {
        return true;
    }
    let offset = range.start.offset;
    let length = dom.node_length(node);
    let is_non_editable = |sibling: Option<_>| {
        sibling.is_some_and(|sibling| dom.is_element(sibling) && !dom.is_content_editable(sibling))
    };

    let can_delete_before = raw.code == KeyCode::Backspace
        && offset > 1
        && (offset < length || !is_non_editable(dom.next_sibling(node)));
    let can_delete_after = raw.code == KeyCode::Delete
        && offset + 1 < length
        && (offset > 0 || !is_non_editable(dom.previous_sibling(node)));
    !(can_delete_before || can_delete_after)
}

/// Handle Backspace/Delete. Returns whether the model changed; the
/// keystroke is then prevented.
pub fn keyboard_delete(core: &mut EditorCore, raw: &mut KeyboardEvent) -> Result<bool> {
    if !raw.code.is_deletion() || !should_delete_with_content_model(core, raw) {
        return Ok(false);
    }
    let steps = get_delete_steps(raw, core.environment().is_mac);
    let api_name = if raw.code == KeyCode::Delete {
        "handleDeleteKey"
    } else {
        "handleBackspaceKey"
    };
    let event = *raw;
    let options = FormatOptions {
        change_data: Some(format!("{:?}", raw.code)),
        ..FormatOptions::new(api_name)
            .with_source(ChangeSource::Keyboard)
            .with_raw_event(RawEvent::Keyboard(event))
    };

    let changed = core.format_content_model_with(
        |core, context| {
            let Some(model) = core.transaction_model_mut() else {
                return false;
            };
            let result = delete_selection(model, &steps, Some(context));
            context.skip_undo_snapshot = true;
            if result.delete_result == DeleteResult::NotDeleted {
                return false;
            }
            model.normalize();
            if let Err(err) = core.notify_before_keyboard_editing(&event) {
                tracing::warn!(error = %err, "beforeKeyboardEditing not raised");
            }
            true
        },
        options,
    )?;
    if changed {
        raw.prevent_default();
    }
    tracing::debug!(api = api_name, changed, "keyboard delete");
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_without_modifiers() {
        let steps = get_delete_steps(&KeyboardEvent::key(KeyCode::Backspace), false);
        assert!(steps[0].is_none());
        assert!(steps[1].is_none());
        assert!(steps[2].is_some());
    }

    #[test]
    fn test_word_steps_by_platform() {
        let ctrl = KeyboardEvent::with_ctrl(KeyCode::Backspace);
        let alt = KeyboardEvent::with_alt(KeyCode::Backspace);
        assert!(get_delete_steps(&ctrl, false)[1].is_some());
        assert!(get_delete_steps(&ctrl, true)[1].is_none());
        assert!(get_delete_steps(&alt, true)[1].is_some());
        assert!(get_delete_steps(&alt, false)[1].is_none());
    }

    #[test]
    fn test_delete_all_before_only_backward_on_mac() {
        let meta_backspace = KeyboardEvent::with_meta(KeyCode::Backspace);
        let meta_delete = KeyboardEvent::with_meta(KeyCode::Delete);
        assert!(get_delete_steps(&meta_backspace, true)[0].is_some());
        assert!(get_delete_steps(&meta_backspace, false)[0].is_none());
        assert!(get_delete_steps(&meta_delete, true)[0].is_none());
    }
}
