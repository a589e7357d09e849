//! The part of the editor that plugins and core APIs share.

use std::collections::VecDeque;

use crate::convert::{self, DomIndexer, ModelToDomOptions};
use crate::dom::{Dom, DomSelection, NodeId};
use crate::editor::format::InFlight;
use crate::editor::options::Environment;
use crate::editor::state::{
    CacheState, EntityMapState, FormatState, LifecycleState, UndoState,
};
use crate::error::{Error, Result};
use crate::input::KeyboardEvent;
use crate::model::{ContentModelDocument, SegmentFormat};
use crate::plugin::PluginEvent;
use crate::undo::UndoSnapshotsService;

/// Work to run after the host finished its default handling of the current
/// event (an animation frame in a browser).
pub type DeferredTask = Box<dyn FnOnce(&mut EditorCore) -> Result<()>>;

/// DOM, selection and per-plugin state of one editor.
///
/// Plugin events raised through core APIs are queued here and delivered by
/// [`Editor`](crate::Editor) once the current dispatch returns, so a plugin
/// handling one event never re-enters another plugin.
pub struct EditorCore {
    dom: Dom,
    root: NodeId,
    selection: Option<DomSelection>,
    pub(crate) cache: CacheState,
    pub(crate) undo: UndoState,
    pub(crate) lifecycle: LifecycleState,
    pub(crate) format: FormatState,
    pub(crate) entities: EntityMapState,
    events: VecDeque<PluginEvent>,
    deferred: VecDeque<DeferredTask>,
    environment: Environment,
    add_delimiter_for_entity: bool,
    pub(crate) in_flight: Option<InFlight>,
}

impl EditorCore {
    pub(crate) fn new(
        dom: Dom,
        root: NodeId,
        undo: Box<dyn UndoSnapshotsService>,
        disable_cache: bool,
        add_delimiter_for_entity: bool,
        environment: Environment,
        default_format: SegmentFormat,
    ) -> Self {
        Self {
            dom,
            root,
            selection: None,
            cache: CacheState {
                indexer: (!disable_cache).then(DomIndexer::new),
                ..CacheState::default()
            },
            undo: UndoState {
                service: undo,
                has_new_content: false,
            },
            lifecycle: LifecycleState::default(),
            format: FormatState {
                pending_format: None,
                default_format,
            },
            entities: EntityMapState::default(),
            events: VecDeque::new(),
            deferred: VecDeque::new(),
            environment,
            add_delimiter_for_entity,
            in_flight: None,
        }
    }

    /// Fail with [`Error::Disposed`] once the editor is disposed.
    pub fn ensure_alive(&self) -> Result<()> {
        if self.lifecycle.is_disposed {
            return Err(Error::Disposed);
        }
        Ok(())
    }

    #[must_use]
    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    /// Direct DOM access, as native browser editing would have. Changes made
    /// this way are not seen by a cached model until it is invalidated or
    /// reconciled.
    pub fn dom_mut(&mut self) -> &mut Dom {
        &mut self.dom
    }

    /// The content-editable root element.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.environment
    }

    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.lifecycle.is_disposed
    }

    #[must_use]
    pub const fn is_in_shadow_edit(&self) -> bool {
        self.lifecycle.shadow_edit
    }

    #[must_use]
    pub const fn add_delimiter_for_entity(&self) -> bool {
        self.add_delimiter_for_entity
    }

    #[must_use]
    pub const fn cache_state(&self) -> &CacheState {
        &self.cache
    }

    #[must_use]
    pub const fn undo_state(&self) -> &UndoState {
        &self.undo
    }

    #[must_use]
    pub const fn format_state(&self) -> &FormatState {
        &self.format
    }

    pub fn format_state_mut(&mut self) -> &mut FormatState {
        &mut self.format
    }

    #[must_use]
    pub const fn entity_map(&self) -> &EntityMapState {
        &self.entities
    }

    /// Current selection without the disposed check.
    #[must_use]
    pub const fn selection(&self) -> Option<&DomSelection> {
        self.selection.as_ref()
    }

    pub fn get_dom_selection(&self) -> Result<Option<DomSelection>> {
        self.ensure_alive()?;
        Ok(self.selection)
    }

    /// Move the selection and queue `SelectionChanged` when it differs.
    pub fn set_dom_selection(&mut self, selection: Option<DomSelection>) -> Result<()> {
        self.ensure_alive()?;
        if self.selection == selection {
            return Ok(());
        }
        let old = std::mem::replace(&mut self.selection, selection);
        self.events.push_back(PluginEvent::SelectionChanged {
            new: selection,
            old,
        });
        Ok(())
    }

    /// Replace the selection without telling plugins. Used after a write,
    /// where the cached model already matches the new selection.
    pub(crate) fn set_selection_silently(&mut self, selection: Option<DomSelection>) {
        self.selection = selection;
    }

    /// Queue an event for delivery to every plugin.
    pub fn trigger_event(&mut self, event: PluginEvent) -> Result<()> {
        self.ensure_alive()?;
        tracing::trace!(event = event.name(), "plugin event queued");
        self.events.push_back(event);
        Ok(())
    }

    pub(crate) fn next_event(&mut self) -> Option<PluginEvent> {
        self.events.pop_front()
    }

    #[must_use]
    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Run `task` after the host finished handling the current event. The
    /// task must tolerate its nodes having been detached meanwhile.
    pub fn schedule_deferred(
        &mut self,
        task: impl FnOnce(&mut Self) -> Result<()> + 'static,
    ) -> Result<()> {
        self.ensure_alive()?;
        self.deferred.push_back(Box::new(task));
        Ok(())
    }

    pub(crate) fn take_deferred(&mut self) -> Vec<DeferredTask> {
        self.deferred.drain(..).collect()
    }

    #[must_use]
    pub fn has_deferred(&self) -> bool {
        !self.deferred.is_empty()
    }

    /// Tell plugins that a keystroke is about to be handled through the
    /// model instead of natively.
    pub fn notify_before_keyboard_editing(&mut self, raw: &KeyboardEvent) -> Result<()> {
        self.trigger_event(PluginEvent::BeforeKeyboardEditing { raw: *raw })
    }

    /// The model of the current content.
    ///
    /// Without `selection_override` the cached model is returned when there
    /// is one; otherwise the DOM is converted and, with caching enabled, the
    /// result is kept as the new cache.
    pub fn create_content_model(
        &mut self,
        selection_override: Option<&DomSelection>,
    ) -> Result<ContentModelDocument> {
        self.ensure_alive()?;
        if selection_override.is_none() {
            if let Some(model) = &self.cache.model {
                return Ok(model.clone());
            }
        }
        let model = self.build_model(selection_override);
        if selection_override.is_none() && self.cache.is_enabled() {
            self.cache.model = Some(model.clone());
        }
        Ok(model)
    }

    /// Convert the DOM. The indexer is refilled unless a selection override
    /// makes the result unsuitable for caching.
    pub(crate) fn build_model(&mut self, selection_override: Option<&DomSelection>) -> ContentModelDocument {
        match selection_override {
            Some(selection) => convert::create_content_model(&self.dom, self.root, Some(selection), None),
            None => convert::create_content_model(
                &self.dom,
                self.root,
                self.selection.as_ref(),
                self.cache.indexer.as_mut(),
            ),
        }
    }

    /// Write `model` into the DOM and select what it selects. With caching
    /// enabled the model becomes the cache.
    pub fn set_content_model(&mut self, model: ContentModelDocument) -> Result<Option<DomSelection>> {
        self.ensure_alive()?;
        let selection = self.write_model(&model)?;
        self.set_selection_silently(selection);
        if self.cache.is_enabled() {
            self.cache.model = Some(model);
        }
        Ok(selection)
    }

    pub(crate) fn write_model(&mut self, model: &ContentModelDocument) -> Result<Option<DomSelection>> {
        let options = ModelToDomOptions {
            add_delimiter_for_entity: self.add_delimiter_for_entity,
        };
        convert::set_content_model(&mut self.dom, self.root, model, &options, self.cache.indexer.as_mut())
    }

    /// Move the selection of the cached model to `new` through the indexer.
    /// False when nothing is cached or the indexer cannot do it.
    pub(crate) fn reconcile_cached_selection(
        &mut self,
        new: &DomSelection,
        old: Option<&DomSelection>,
    ) -> bool {
        let (Some(model), Some(indexer)) = (self.cache.model.as_mut(), self.cache.indexer.as_ref())
        else {
            return false;
        };
        indexer.reconcile_selection(&self.dom, model, new, old)
    }

    /// Drop the cached model now, or at the end of the outermost transaction
    /// when called from inside one.
    pub fn clear_model_cache(&mut self) {
        if self.in_flight.is_some() {
            self.cache.pending_clear = true;
        } else {
            self.cache.invalidate();
        }
    }

    pub(crate) fn mark_disposed(&mut self) {
        self.lifecycle.is_disposed = true;
        self.cache.invalidate();
        self.events.clear();
        self.deferred.clear();
    }
}

impl std::fmt::Debug for EditorCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorCore")
            .field("root", &self.root)
            .field("selection", &self.selection)
            .field("lifecycle", &self.lifecycle)
            .field("has_cached_model", &self.cache.model.is_some())
            .field("pending_events", &self.events.len())
            .finish_non_exhaustive()
    }
}
