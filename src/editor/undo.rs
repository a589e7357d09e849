//! Undo and redo on top of the snapshot service.

use crate::dom::SnapshotSelection;
use crate::editor::editor_core::EditorCore;
use crate::error::Result;
use crate::plugin::{ChangeSource, EntityOperation, PluginEvent};
use crate::undo::{EntityState, Snapshot};

impl EditorCore {
    /// Capture the current content. Nothing is recorded during shadow edit.
    pub(crate) fn take_snapshot(&mut self, is_auto_complete: bool, entity_states: Vec<EntityState>) {
        if self.is_in_shadow_edit() {
            tracing::trace!("snapshot skipped in shadow edit");
            return;
        }
        let selection = self
            .selection()
            .and_then(|selection| SnapshotSelection::capture(self.dom(), self.root(), selection));
        let snapshot = Snapshot {
            html: self.dom().inner_html(self.root()),
            entity_states,
            selection,
        };
        self.undo.service.add_snapshot(snapshot, is_auto_complete);
        self.undo.has_new_content = false;
    }

    /// Record the current content as an undo step.
    pub fn add_undo_snapshot(&mut self, can_undo_by_backspace: bool, entity_states: Vec<EntityState>) -> Result<()> {
        self.ensure_alive()?;
        self.take_snapshot(can_undo_by_backspace, entity_states);
        Ok(())
    }

    /// Replace the content with `snapshot`.
    ///
    /// The cached model is dropped, the stored selection is resolved against
    /// the new nodes, and `ContentChanged` with [`ChangeSource::Restore`] is
    /// queued, preceded by one `UpdateEntityState` operation per stored
    /// entity state whose wrapper still exists.
    pub fn restore_undo_snapshot(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.ensure_alive()?;
        self.cache.invalidate();
        self.format.pending_format = None;
        let root = self.root();
        self.dom_mut().set_inner_html(root, &snapshot.html)?;
        let selection = snapshot
            .selection
            .as_ref()
            .and_then(|selection| selection.resolve(self.dom(), root));
        self.set_selection_silently(selection);
        self.undo.has_new_content = false;

        self.entities.entities.clear();
        for state in &snapshot.entity_states {
            let wrapper = self
                .dom()
                .query_class(root, &format!("{}{}", crate::convert::entity::ENTITY_ID_PREFIX, state.id))
                .into_iter()
                .next();
            let Some(wrapper) = wrapper else {
                tracing::debug!(id = %state.id, "entity state without wrapper, skipped");
                continue;
            };
            let entity_format = crate::convert::entity::parse_entity_format(self.dom(), wrapper);
            self.trigger_event(PluginEvent::EntityOperation {
                operation: EntityOperation::UpdateEntityState,
                wrapper,
                entity_format,
                state: Some(state.state.clone()),
            })?;
        }
        self.trigger_event(PluginEvent::ContentChanged {
            source: ChangeSource::Restore,
            data: None,
            changed_entities: None,
            entity_states: snapshot.entity_states.clone(),
        })?;
        tracing::debug!(size = snapshot.size(), "undo snapshot restored");
        Ok(())
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.undo.has_new_content || self.undo.service.can_move(-1)
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.undo.service.can_move(1)
    }

    /// Step back one snapshot. Unsaved typing is recorded first so it can be
    /// redone. Returns false at the start of history.
    pub fn undo(&mut self) -> Result<bool> {
        self.ensure_alive()?;
        if self.undo.has_new_content {
            self.take_snapshot(false, Vec::new());
        }
        match self.undo.service.move_by(-1) {
            Some(snapshot) => {
                self.restore_undo_snapshot(&snapshot)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Step forward one snapshot. Returns false at the end of history.
    pub fn redo(&mut self) -> Result<bool> {
        self.ensure_alive()?;
        match self.undo.service.move_by(1) {
            Some(snapshot) => {
                self.restore_undo_snapshot(&snapshot)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
