//! Typing over an expanded selection.
//!
//! The selected content is removed through the model, then the browser
//! inserts the typed character natively. The deleted content's format
//! becomes the pending format so the new character inherits it.

use crate::dom::DomSelection;
use crate::edit::delete_selection::{DeleteResult, delete_selection};
use crate::editor::{EditorCore, FormatOptions};
use crate::error::Result;
use crate::input::{KeyboardEvent, RawEvent};
use crate::plugin::ChangeSource;

/// Whether a keystroke over `selection` must delete the selection first.
#[must_use]
pub fn should_input_with_content_model(selection: &DomSelection, raw: &KeyboardEvent) -> bool {
    let expanded = match selection {
        DomSelection::Range { range, .. } => !range.collapsed() && !raw.is_composing,
        DomSelection::Image { .. } | DomSelection::Table { .. } => true,
    };
    expanded && (raw.is_enter() || raw.is_character_value())
}

/// Delete the selection ahead of a native insertion. Returns whether the
/// model changed. The keystroke is never prevented.
pub fn keyboard_input(core: &mut EditorCore, raw: &KeyboardEvent) -> Result<bool> {
    let Some(selection) = core.selection().copied() else {
        return Ok(false);
    };
    if !should_input_with_content_model(&selection, raw) {
        return Ok(false);
    }

    core.add_undo_snapshot(false, Vec::new())?;
    let options = FormatOptions::new("handleKeyboardInput")
        .with_source(ChangeSource::Keyboard)
        .with_raw_event(RawEvent::Keyboard(*raw));
    core.format_content_model(
        |model, context| {
            let result = delete_selection(model, &[], Some(context));
            // The browser types into the DOM next; the cache would be stale.
            context.clear_model_cache = true;
            context.skip_undo_snapshot = true;
            if result.delete_result != DeleteResult::Range {
                return false;
            }
            context.new_pending_format = result.insert_point.and_then(|point| {
                model
                    .paragraph(&point.path)
                    .and_then(|paragraph| paragraph.segments.get(point.marker_index))
                    .map(|marker| marker.format().clone())
            });
            model.normalize();
            true
        },
        options,
    )
}
