//! Applying the pending format to text the browser just inserted.

use crate::editor::{EditorCore, FormatOptions};
use crate::error::Result;
use crate::model::{Segment, find_selection_marker, normalize_paragraph};

/// Move the last `data` typed before the caret into its own segment with
/// the pending format, and give the caret that format too. The pending
/// format is consumed. Returns whether the model changed.
pub fn apply_pending_format(core: &mut EditorCore, data: &str) -> Result<bool> {
    let Some(pending) = core.format_state_mut().pending_format.take() else {
        return Ok(false);
    };
    if data.is_empty() {
        return Ok(false);
    }
    let mut options = FormatOptions::new("applyPendingFormat");
    options.skip_undo_snapshot = true;

    core.format_content_model(
        |model, _| {
            let Some((path, marker)) = find_selection_marker(&model.blocks) else {
                return false;
            };
            let Some(paragraph) = model.paragraph_mut(&path) else {
                return false;
            };
            let Some(Segment::Text(previous)) = marker.checked_sub(1).and_then(|i| paragraph.segments.get_mut(i))
            else {
                return false;
            };
            if !previous.text.ends_with(data) {
                return false;
            }
            let format = previous.format.merge(&pending.format);
            let split = previous.text.len() - data.len();
            previous.text.truncate(split);
            paragraph.segments.insert(marker, Segment::text(data, format.clone()));
            if let Some(marker) = paragraph.segments.get_mut(marker + 1) {
                *marker.format_mut() = format;
            }
            normalize_paragraph(paragraph);
            true
        },
        options,
    )
}
