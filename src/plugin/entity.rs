//! Entity tracking and delimiter upkeep.

use std::collections::BTreeSet;

use crate::convert::entity::{apply_entity_format, parse_entity_format};
use crate::dom::NodeId;
use crate::edit::delimiter::entity_wrappers;
use crate::edit::{handle_delimiter_key_down, reconcile_delimiters, remove_delimiters};
use crate::editor::{EditorCore, EntityMapEntry};
use crate::error::Result;
use crate::plugin::{ChangedEntity, EditorPlugin, EntityOperation, PluginEvent};

/// Maintains the entity map and the delimiters around non-editable
/// entities.
///
/// Entities reported by a transaction are registered or retired directly.
/// A change without that report (undo, `set_content`) triggers a scan of
/// the whole content, raising `NewEntity` for unknown wrappers and
/// `Overwrite` for vanished ones.
#[derive(Debug, Default)]
pub struct EntityPlugin;

impl EntityPlugin {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Track `wrapper`. Its id is renamed when another entity already owns
    /// it. Returns false when it was tracked already.
    fn register(core: &mut EditorCore, wrapper: NodeId) -> Result<bool> {
        let mut format = parse_entity_format(core.dom(), wrapper);
        if let Some(entry) = format.id.as_ref().and_then(|id| core.entities.entities.get_mut(id)) {
            if entry.wrapper == wrapper {
                entry.is_deleted = false;
                return Ok(false);
            }
        }

        let base = format
            .id
            .clone()
            .or_else(|| format.entity_type.clone())
            .unwrap_or_else(|| "Entity".to_string());
        let id = core.entities.unique_id(&base);
        if format.id.as_deref() != Some(id.as_str()) {
            tracing::debug!(from = ?format.id, to = %id, "entity id made unique");
            format.id = Some(id.clone());
            apply_entity_format(core.dom_mut(), wrapper, &format)?;
            core.clear_model_cache();
        }
        core.entities.entities.insert(
            id,
            EntityMapEntry {
                wrapper,
                entity_type: format.entity_type,
                is_deleted: false,
            },
        );
        Ok(true)
    }

    fn retire(core: &mut EditorCore, wrapper: NodeId) {
        for entry in core.entities.entities.values_mut() {
            if entry.wrapper == wrapper {
                entry.is_deleted = true;
            }
        }
    }

    /// Compare the content against the map.
    fn scan(core: &mut EditorCore) -> Result<()> {
        let root = core.root();
        let mut seen = BTreeSet::new();
        for wrapper in entity_wrappers(core.dom(), root) {
            if Self::register(core, wrapper)? {
                core.trigger_event(PluginEvent::EntityOperation {
                    operation: EntityOperation::NewEntity,
                    wrapper,
                    entity_format: parse_entity_format(core.dom(), wrapper),
                    state: None,
                })?;
            }
            seen.insert(wrapper);
        }

        let mut vanished = Vec::new();
        for entry in core.entities.entities.values_mut() {
            if !entry.is_deleted && !seen.contains(&entry.wrapper) {
                entry.is_deleted = true;
                vanished.push(entry.wrapper);
            }
        }
        for wrapper in vanished {
            let entity_format = if core.dom().is_alive(wrapper) {
                parse_entity_format(core.dom(), wrapper)
            } else {
                Default::default()
            };
            core.trigger_event(PluginEvent::EntityOperation {
                operation: EntityOperation::Overwrite,
                wrapper,
                entity_format,
                state: None,
            })?;
        }
        Ok(())
    }

    fn apply_changes(core: &mut EditorCore, changed: &[ChangedEntity]) -> Result<()> {
        for change in changed {
            let wrapper = change.entity.wrapper;
            match change.operation {
                EntityOperation::NewEntity if core.dom().is_alive(wrapper) => {
                    Self::register(core, wrapper)?;
                }
                EntityOperation::NewEntity | EntityOperation::UpdateEntityState => {}
                EntityOperation::Overwrite
                | EntityOperation::RemoveFromStart
                | EntityOperation::RemoveFromEnd => Self::retire(core, wrapper),
            }
        }
        Ok(())
    }

    fn reconcile(core: &mut EditorCore) -> Result<()> {
        let root = core.root();
        let add = core.add_delimiter_for_entity();
        if reconcile_delimiters(core.dom_mut(), root, add)? {
            core.clear_model_cache();
        }
        Ok(())
    }
}

impl EditorPlugin for EntityPlugin {
    fn name(&self) -> &'static str {
        "Entity"
    }

    fn dispose(&mut self, core: &mut EditorCore) -> Result<()> {
        core.entities.entities.clear();
        Ok(())
    }

    fn on_plugin_event(&mut self, core: &mut EditorCore, event: &mut PluginEvent) -> Result<()> {
        match event {
            PluginEvent::EditorReady => {
                Self::scan(core)?;
                Self::reconcile(core)
            }
            PluginEvent::ContentChanged {
                changed_entities, ..
            } => {
                match changed_entities {
                    Some(changed) => Self::apply_changes(core, changed)?,
                    None => Self::scan(core)?,
                }
                Self::reconcile(core)
            }
            PluginEvent::KeyDown { raw, .. } => handle_delimiter_key_down(core, raw),
            PluginEvent::ExtractContentWithDom { root } | PluginEvent::BeforeCutCopy { root, .. } => {
                remove_delimiters(core.dom_mut(), *root)
            }
            _ => Ok(()),
        }
    }
}
