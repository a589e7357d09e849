//! Pending format: formatting chosen at a caret, applied to what is typed
//! there next.

use crate::dom::DomSelection;
use crate::edit;
use crate::editor::{EditorCore, PendingFormat};
use crate::error::Result;
use crate::plugin::{EditorPlugin, PluginEvent};

#[derive(Debug, Default)]
pub struct FormatPlugin;

impl FormatPlugin {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn clear(core: &mut EditorCore, reason: &'static str) {
        if core.format_state_mut().pending_format.take().is_some() {
            tracing::trace!(reason, "pending format cleared");
        }
    }

    /// An editor with no text yet starts typing in the default format.
    fn seed_default_format(core: &mut EditorCore) {
        let state = core.format_state();
        if state.pending_format.is_some() || state.default_format.is_empty() {
            return;
        }
        let text = core.dom().text_content(core.root());
        let is_empty = text
            .chars()
            .all(|c| c == crate::convert::entity::ZERO_WIDTH_SPACE || c.is_whitespace());
        if !is_empty {
            return;
        }
        let position = core
            .selection()
            .filter(|selection| selection.is_collapsed_range())
            .and_then(DomSelection::as_range)
            .map(|range| range.start);
        let format = core.format_state().default_format.clone();
        core.format_state_mut().pending_format = Some(PendingFormat { format, position });
    }
}

impl EditorPlugin for FormatPlugin {
    fn name(&self) -> &'static str {
        "Format"
    }

    fn dispose(&mut self, core: &mut EditorCore) -> Result<()> {
        core.format_state_mut().pending_format = None;
        Ok(())
    }

    fn on_plugin_event(&mut self, core: &mut EditorCore, event: &mut PluginEvent) -> Result<()> {
        match event {
            PluginEvent::KeyDown { raw, .. } => {
                if raw.code.is_navigation() {
                    Self::clear(core, "navigation");
                } else if raw.is_character_value() && !raw.default_prevented() {
                    Self::seed_default_format(core);
                }
            }
            PluginEvent::Input { raw } => {
                if raw.is_composing {
                    return Ok(());
                }
                if let Some(data) = raw.data.as_deref() {
                    edit::apply_pending_format(core, data)?;
                }
            }
            PluginEvent::CompositionEnd { data } => {
                edit::apply_pending_format(core, data)?;
            }
            PluginEvent::SelectionChanged { new, .. } => {
                if !new.as_ref().is_some_and(DomSelection::is_collapsed_range) {
                    Self::clear(core, "selection expanded");
                }
            }
            PluginEvent::ContentChanged { .. } if core.format_state().pending_format.is_some() => {
                // A change elsewhere moved the caret away from where the
                // format was chosen.
                let at = core
                    .selection()
                    .and_then(DomSelection::as_range)
                    .map(|range| range.start);
                let keep = core
                    .format_state()
                    .pending_format
                    .as_ref()
                    .is_some_and(|pending| pending.position.is_none() || pending.position == at);
                if !keep {
                    Self::clear(core, "content changed");
                }
            }
            _ => {}
        }
        Ok(())
    }
}
