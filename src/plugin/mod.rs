//! Editor plugins and the events they receive.
//!
//! Every plugin sees every event in registration order. A plugin that
//! returns true from [`EditorPlugin::will_handle_event_exclusively`] for a
//! DOM event (`KeyDown`, `KeyUp`, `Input`, `CompositionEnd`) becomes the only
//! receiver of that event.
//!
//! The built-in plugins are registered before any user plugin:
//!
//! | order | plugin | concern |
//! |-------|--------|---------|
//! | 1 | [`CachePlugin`] | keeps or drops the cached model |
//! | 2 | [`UndoPlugin`] | snapshots around typing, auto-complete undo |
//! | 3 | [`FormatPlugin`] | pending format for the next typed text |
//! | 4 | [`EntityPlugin`] | entity map and delimiters |
//!
//! [`EditPlugin`] is not built in; hosts add it through
//! [`EditorOptions::plugins`](crate::EditorOptions::plugins).

mod cache;
mod edit;
mod entity;
mod event;
mod format;
mod undo;

pub use cache::{CachePlugin, should_clear_cache};
pub use edit::{EditOptions, EditPlugin};
pub use entity::EntityPlugin;
pub use event::{ChangeSource, ChangedEntity, EntityOperation, PluginEvent};
pub use format::FormatPlugin;
pub use undo::UndoPlugin;

use crate::editor::EditorCore;
use crate::error::Result;

/// A unit of editor behavior driven by [`PluginEvent`]s.
pub trait EditorPlugin {
    /// Name used in logs and dispose error reports.
    fn name(&self) -> &'static str;

    /// Called once when the editor is created, before `EditorReady`.
    fn initialize(&mut self, _core: &mut EditorCore) {}

    /// Called once from [`Editor::dispose`](crate::Editor::dispose). A
    /// failure is reported and the remaining plugins are still disposed.
    fn dispose(&mut self, _core: &mut EditorCore) -> Result<()> {
        Ok(())
    }

    /// Claim a DOM event so no other plugin receives it.
    fn will_handle_event_exclusively(&mut self, _core: &EditorCore, _event: &PluginEvent) -> bool {
        false
    }

    fn on_plugin_event(&mut self, core: &mut EditorCore, event: &mut PluginEvent) -> Result<()>;
}
