//! Decides when the cached model can no longer be trusted.

use crate::dom::DomSelection;
use crate::editor::EditorCore;
use crate::error::Result;
use crate::plugin::{EditorPlugin, PluginEvent};

/// Whether `event` makes the cached model unsafe to keep.
///
/// True for a `KeyDown` that another feature already took over or whose
/// default is prevented, for Enter, and for character input over anything
/// but a collapsed range selection.
///
/// The cache plugin is registered first, so the two flags only reflect what
/// the host set before forwarding the event. Built-in plugins that take a
/// keystroke over go through a format transaction, which refreshes the
/// cache on its own.
#[must_use]
pub fn should_clear_cache(event: &PluginEvent, selection: Option<&DomSelection>) -> bool {
    let PluginEvent::KeyDown {
        raw,
        handled_by_edit_feature,
    } = event
    else {
        return false;
    };
    *handled_by_edit_feature
        || raw.default_prevented()
        || raw.is_enter()
        || (raw.is_character_value() && !selection.is_some_and(DomSelection::is_collapsed_range))
}

/// Keeps the cached model in step with native editing.
#[derive(Debug, Default)]
pub struct CachePlugin;

impl CachePlugin {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn invalidate(core: &mut EditorCore, reason: &'static str) {
        if core.is_in_shadow_edit() {
            core.cache.deferred_invalidation = true;
            tracing::trace!(reason, "cache invalidation deferred until shadow edit ends");
            return;
        }
        if core.cache.model.is_some() {
            tracing::debug!(reason, "model cache invalidated");
        }
        core.cache.invalidate();
    }
}

impl EditorPlugin for CachePlugin {
    fn name(&self) -> &'static str {
        "Cache"
    }

    fn dispose(&mut self, core: &mut EditorCore) -> Result<()> {
        core.cache.invalidate();
        Ok(())
    }

    fn on_plugin_event(&mut self, core: &mut EditorCore, event: &mut PluginEvent) -> Result<()> {
        match event {
            PluginEvent::KeyDown { .. } => {
                if should_clear_cache(event, core.selection()) {
                    Self::invalidate(core, "keyDown");
                }
            }
            PluginEvent::Input { .. } | PluginEvent::CompositionEnd { .. } => {
                // Native typing changed text under the cached layout.
                let reconciled = match core.selection().copied() {
                    Some(selection) => core.reconcile_cached_selection(&selection, None),
                    None => false,
                };
                if !reconciled {
                    Self::invalidate(core, "input");
                }
            }
            PluginEvent::SelectionChanged { new, old } => {
                let reconciled = match new {
                    Some(new) => core.reconcile_cached_selection(new, old.as_ref()),
                    None => false,
                };
                if !reconciled {
                    Self::invalidate(core, "selectionChanged");
                }
            }
            PluginEvent::ContentChanged { .. } => {
                if core.cache.model.is_none() {
                    Self::invalidate(core, "contentChanged");
                }
            }
            PluginEvent::LeavingShadowEdit => {
                if std::mem::take(&mut core.cache.deferred_invalidation) {
                    core.cache.invalidate();
                    tracing::debug!("deferred cache invalidation applied");
                }
            }
            _ => {}
        }
        Ok(())
    }
}
