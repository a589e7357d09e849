//! Undo snapshots around native typing, and auto-complete undo.

use crate::dom::DomSelection;
use crate::editor::EditorCore;
use crate::error::Result;
use crate::input::{KeyCode, KeyboardEvent};
use crate::plugin::{ChangeSource, EditorPlugin, PluginEvent};

/// Kind of the last keystroke that changed content natively.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LastKey {
    Backspace,
    Delete,
    Space,
    Other,
}

/// Records undo steps at natural boundaries of typing: switching between
/// Backspace and Delete, the first space after a word, Enter, and typing
/// over a selection. A plain Backspace right after an auto-complete change
/// reverts that change.
#[derive(Debug, Default)]
pub struct UndoPlugin {
    last_key: Option<LastKey>,
}

impl UndoPlugin {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn is_auto_complete_undo(core: &EditorCore, raw: &KeyboardEvent) -> bool {
        raw.code == KeyCode::Backspace
            && !raw.has_modifier_key()
            && !raw.default_prevented()
            && !core.undo_state().has_new_content
            && core.undo_state().service.can_undo_auto_complete()
    }

    fn on_key_down(&mut self, core: &mut EditorCore, raw: &mut KeyboardEvent) -> Result<()> {
        if Self::is_auto_complete_undo(core, raw) {
            raw.prevent_default();
            tracing::debug!("auto-complete undone by backspace");
            core.undo()?;
            self.last_key = Some(LastKey::Backspace);
            return Ok(());
        }
        if raw.default_prevented() || raw.is_composing {
            return Ok(());
        }

        let expanded = !core.selection().is_some_and(DomSelection::is_collapsed_range);
        match raw.code {
            KeyCode::Backspace | KeyCode::Delete => {
                let key = if raw.code == KeyCode::Backspace {
                    LastKey::Backspace
                } else {
                    LastKey::Delete
                };
                if expanded || self.last_key != Some(key) {
                    core.add_undo_snapshot(false, Vec::new())?;
                }
                self.last_key = Some(key);
                core.undo.has_new_content = true;
            }
            KeyCode::Enter => {
                core.add_undo_snapshot(false, Vec::new())?;
                self.last_key = Some(LastKey::Other);
                core.undo.has_new_content = true;
            }
            KeyCode::Char(c) if raw.is_character_value() => {
                let is_space = c.is_whitespace();
                if expanded || (is_space && self.last_key != Some(LastKey::Space)) {
                    core.add_undo_snapshot(false, Vec::new())?;
                }
                self.last_key = Some(if is_space { LastKey::Space } else { LastKey::Other });
                core.undo.has_new_content = true;
            }
            code if code.is_navigation() => {
                if core.undo_state().has_new_content {
                    core.add_undo_snapshot(false, Vec::new())?;
                }
                self.last_key = None;
            }
            _ => {}
        }
        Ok(())
    }
}

impl EditorPlugin for UndoPlugin {
    fn name(&self) -> &'static str {
        "Undo"
    }

    fn will_handle_event_exclusively(&mut self, core: &EditorCore, event: &PluginEvent) -> bool {
        matches!(event, PluginEvent::KeyDown { raw, .. } if Self::is_auto_complete_undo(core, raw))
    }

    fn on_plugin_event(&mut self, core: &mut EditorCore, event: &mut PluginEvent) -> Result<()> {
        match event {
            PluginEvent::EditorReady => {
                if !core.undo_state().service.can_move(0) {
                    core.add_undo_snapshot(false, Vec::new())?;
                }
            }
            PluginEvent::KeyDown { raw, .. } => self.on_key_down(core, raw)?,
            PluginEvent::Input { .. } | PluginEvent::CompositionEnd { .. } => {
                core.undo.has_new_content = true;
            }
            PluginEvent::ContentChanged { source, .. } => {
                if *source != ChangeSource::Restore {
                    core.undo.service.clear_redo();
                    self.last_key = None;
                }
            }
            _ => {}
        }
        Ok(())
    }
}
