//! Keyboard editing through the model.

use crate::edit::{keyboard_delete, keyboard_input};
use crate::editor::EditorCore;
use crate::error::Result;
use crate::input::KeyCode;
use crate::plugin::{EditorPlugin, PluginEvent};

/// Which keystrokes [`EditPlugin`] takes over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EditOptions {
    /// Backspace and Delete.
    pub handle_delete: bool,
    /// Characters and Enter typed over an expanded selection.
    pub handle_input_over_selection: bool,
}

impl Default for EditOptions {
    fn default() -> Self {
        Self {
            handle_delete: true,
            handle_input_over_selection: true,
        }
    }
}

/// Routes Backspace/Delete and typing over a selection through the delete
/// pipeline instead of native browser editing.
#[derive(Debug, Default)]
pub struct EditPlugin {
    options: EditOptions,
}

impl EditPlugin {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: EditOptions) -> Self {
        Self { options }
    }
}

impl EditorPlugin for EditPlugin {
    fn name(&self) -> &'static str {
        "Edit"
    }

    fn on_plugin_event(&mut self, core: &mut EditorCore, event: &mut PluginEvent) -> Result<()> {
        let PluginEvent::KeyDown {
            raw,
            handled_by_edit_feature,
        } = event
        else {
            return Ok(());
        };
        if raw.default_prevented() || raw.is_composing {
            return Ok(());
        }
        let handled = match raw.code {
            KeyCode::Backspace | KeyCode::Delete if self.options.handle_delete => {
                keyboard_delete(core, raw)?
            }
            KeyCode::Backspace | KeyCode::Delete => false,
            _ if self.options.handle_input_over_selection => keyboard_input(core, raw)?,
            _ => false,
        };
        if handled {
            *handled_by_edit_feature = true;
        }
        Ok(())
    }
}
