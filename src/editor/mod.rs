//! The editor: core state plus the plugins driving it.
//!
//! The host forwards DOM events through the `handle_*` methods. Each call
//! delivers one event to the plugins in order, then drains the events the
//! plugins raised meanwhile. Work a plugin scheduled for after the host's
//! default handling runs when the host calls [`Editor::run_deferred`].

mod editor_core;
mod format;
mod options;
mod state;
mod undo;

pub use editor_core::{DeferredTask, EditorCore};
pub use format::{DeletedEntity, FormatContext, FormatOptions};
pub use options::{DisposeErrorHandler, EditorOptions, Environment};
pub use state::{
    CacheState, EntityMapEntry, EntityMapState, FormatState, LifecycleState, PendingFormat,
    UndoState,
};

use crate::dom::{Dom, DomSelection, NodeId, SnapshotSelection};
use crate::edit;
use crate::error::{Error, Result};
use crate::input::{InputEvent, KeyboardEvent};
use crate::model::{ContentModelDocument, Entity};
use crate::plugin::{
    CachePlugin, ChangeSource, EditorPlugin, EntityPlugin, FormatPlugin, PluginEvent, UndoPlugin,
};
use crate::undo::{Snapshot, Snapshots};

/// Events drained after one host call. Plugins that keep raising events
/// beyond this are cut off.
const MAX_QUEUED_EVENTS: usize = 256;

/// A rich-text editor bound to one root element.
pub struct Editor {
    core: EditorCore,
    plugins: Vec<Box<dyn EditorPlugin>>,
    dispose_error_handler: Option<DisposeErrorHandler>,
    shadow_snapshot: Option<Snapshot>,
}

impl Editor {
    /// Create an editor on a fresh `div contenteditable="true"` root.
    pub fn new(options: EditorOptions) -> Result<Self> {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        dom.set_attribute(root, "contenteditable", "true")?;
        Self::with_root(dom, root, options)
    }

    /// Create an editor on an existing root element of `dom`.
    pub fn with_root(dom: Dom, root: NodeId, mut options: EditorOptions) -> Result<Self> {
        if !dom.is_element(root) {
            return Err(Error::NodeNotFound(root));
        }
        let service = options
            .undo_snapshot_service
            .take()
            .unwrap_or_else(|| Box::new(Snapshots::new(options.undo_max_size)));
        let mut core = EditorCore::new(
            dom,
            root,
            service,
            options.disable_cache,
            options.add_delimiter_for_entity,
            options.environment,
            options.default_segment_format.clone(),
        );
        if let Some(html) = &options.initial_html {
            core.dom_mut().set_inner_html(root, html)?;
        }

        let mut plugins: Vec<Box<dyn EditorPlugin>> = vec![
            Box::new(CachePlugin::new()),
            Box::new(UndoPlugin::new()),
            Box::new(FormatPlugin::new()),
            Box::new(EntityPlugin::new()),
        ];
        plugins.append(&mut options.plugins);

        let mut editor = Self {
            core,
            plugins,
            dispose_error_handler: options.dispose_error_handler.take(),
            shadow_snapshot: None,
        };
        for plugin in &mut editor.plugins {
            plugin.initialize(&mut editor.core);
        }
        editor.dispatch(PluginEvent::EditorReady)?;
        tracing::debug!(plugins = editor.plugins.len(), "editor ready");
        Ok(editor)
    }

    #[must_use]
    pub const fn core(&self) -> &EditorCore {
        &self.core
    }

    /// Mutable core access. Events raised through it are delivered on the
    /// next `Editor` call, or by [`flush_events`](Self::flush_events).
    pub fn core_mut(&mut self) -> &mut EditorCore {
        &mut self.core
    }

    #[must_use]
    pub fn dom(&self) -> &Dom {
        self.core.dom()
    }

    /// The DOM as the host sees it, for simulating native edits.
    pub fn dom_mut(&mut self) -> &mut Dom {
        self.core.dom_mut()
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.core.root()
    }

    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.core.is_disposed()
    }

    /// Inner HTML of the root, editor-only markup included.
    pub fn inner_html(&self) -> Result<String> {
        self.core.ensure_alive()?;
        Ok(self.core.dom().inner_html(self.core.root()))
    }

    pub fn get_dom_selection(&self) -> Result<Option<DomSelection>> {
        self.core.get_dom_selection()
    }

    pub fn set_dom_selection(&mut self, selection: Option<DomSelection>) -> Result<()> {
        self.core.set_dom_selection(selection)?;
        self.flush_events()
    }

    pub fn create_content_model(&mut self) -> Result<ContentModelDocument> {
        self.core.create_content_model(None)
    }

    /// Replace the whole content with `html`. Records an undo step.
    pub fn set_content(&mut self, html: &str) -> Result<()> {
        self.core.ensure_alive()?;
        let root = self.core.root();
        self.core.dom_mut().set_inner_html(root, html)?;
        self.core.cache.invalidate();
        self.core.set_selection_silently(None);
        self.core.add_undo_snapshot(false, Vec::new())?;
        self.core.trigger_event(PluginEvent::ContentChanged {
            source: ChangeSource::SetContent,
            data: None,
            changed_entities: None,
            entity_states: Vec::new(),
        })?;
        self.flush_events()
    }

    /// See [`EditorCore::format_content_model`].
    pub fn format_content_model(
        &mut self,
        mutator: impl FnOnce(&mut ContentModelDocument, &mut FormatContext) -> bool,
        options: FormatOptions,
    ) -> Result<bool> {
        let changed = self.core.format_content_model(mutator, options)?;
        self.flush_events()?;
        Ok(changed)
    }

    pub fn undo(&mut self) -> Result<bool> {
        let moved = self.core.undo()?;
        self.flush_events()?;
        Ok(moved)
    }

    pub fn redo(&mut self) -> Result<bool> {
        let moved = self.core.redo()?;
        self.flush_events()?;
        Ok(moved)
    }

    /// Record the current content as an undo step.
    pub fn take_snapshot(&mut self) -> Result<()> {
        self.core.add_undo_snapshot(false, Vec::new())
    }

    /// Forward a `keydown`. The returned event tells the host whether to run
    /// its default action.
    pub fn handle_key_down(&mut self, raw: KeyboardEvent) -> Result<KeyboardEvent> {
        let event = self.dispatch(PluginEvent::KeyDown {
            raw,
            handled_by_edit_feature: false,
        })?;
        Ok(event.keyboard().copied().unwrap_or(raw))
    }

    pub fn handle_key_up(&mut self, raw: KeyboardEvent) -> Result<KeyboardEvent> {
        let event = self.dispatch(PluginEvent::KeyUp { raw })?;
        Ok(event.keyboard().copied().unwrap_or(raw))
    }

    /// Forward an `input` event, after the host applied it to the DOM.
    pub fn handle_input(&mut self, raw: InputEvent) -> Result<()> {
        self.dispatch(PluginEvent::Input { raw }).map(drop)
    }

    pub fn handle_composition_end(&mut self, data: &str) -> Result<()> {
        self.dispatch(PluginEvent::CompositionEnd {
            data: data.to_string(),
        })
        .map(drop)
    }

    /// Forward a `selectionchange`.
    pub fn handle_selection_change(&mut self, selection: Option<DomSelection>) -> Result<()> {
        self.core.ensure_alive()?;
        let old = self.core.selection().copied();
        if old == selection {
            return Ok(());
        }
        self.core.set_selection_silently(selection);
        self.dispatch(PluginEvent::SelectionChanged {
            new: selection,
            old,
        })
        .map(drop)
    }

    /// Run the work scheduled for after the host's default handling. After
    /// dispose the queue is already empty, so this is a no-op.
    ///
    /// Returns how many tasks ran.
    pub fn run_deferred(&mut self) -> Result<usize> {
        if self.core.is_disposed() {
            tracing::trace!("deferred tasks skipped, editor disposed");
            return Ok(0);
        }
        let tasks = self.core.take_deferred();
        let mut ran = 0;
        for task in tasks {
            if self.core.is_disposed() {
                tracing::trace!("remaining deferred tasks skipped, editor disposed");
                break;
            }
            if let Err(err) = task(&mut self.core) {
                tracing::warn!(%err, "deferred task failed");
            }
            ran += 1;
        }
        self.flush_events()?;
        Ok(ran)
    }

    /// Paste `html` at the selection, replacing selected content.
    pub fn paste(&mut self, html: &str) -> Result<bool> {
        let event = self.dispatch(PluginEvent::BeforePaste {
            html: html.to_string(),
        })?;
        let PluginEvent::BeforePaste { html } = event else {
            return Ok(false);
        };
        let changed = edit::paste(&mut self.core, &html)?;
        self.flush_events()?;
        Ok(changed)
    }

    /// HTML of the selected content, editor-only markup removed.
    pub fn copy(&mut self) -> Result<Option<String>> {
        self.extract_selection(false)
    }

    /// Like [`copy`](Self::copy), then delete the selection.
    pub fn cut(&mut self) -> Result<Option<String>> {
        let html = self.extract_selection(true)?;
        if html.is_some() {
            edit::delete_selected_content(&mut self.core, ChangeSource::Cut)?;
            self.flush_events()?;
        }
        Ok(html)
    }

    fn extract_selection(&mut self, is_cut: bool) -> Result<Option<String>> {
        self.core.ensure_alive()?;
        let Some(clone) = edit::clone_selected_content(&mut self.core)? else {
            return Ok(None);
        };
        self.dispatch(PluginEvent::BeforeCutCopy { is_cut, root: clone })?;
        let html = self.core.dom().inner_html(clone);
        self.core.dom_mut().release(clone);
        Ok(Some(html))
    }

    /// Content HTML without editor-only markup such as entity delimiters.
    pub fn get_content(&mut self) -> Result<String> {
        self.core.ensure_alive()?;
        let root = self.core.root();
        let clone = self.core.dom_mut().clone_subtree(root)?;
        let result = self.dispatch(PluginEvent::ExtractContentWithDom { root: clone });
        let html = self.core.dom().inner_html(clone);
        self.core.dom_mut().release(clone);
        result?;
        Ok(html)
    }

    /// Insert `wrapper` as a read-only entity at the selection. `wrapper`
    /// must be a detached element; it gets a unique id among live entities.
    pub fn insert_entity(
        &mut self,
        wrapper: NodeId,
        entity_type: &str,
        is_block: bool,
    ) -> Result<Option<Entity>> {
        let entity = edit::insert_entity(&mut self.core, wrapper, entity_type, is_block)?;
        self.flush_events()?;
        Ok(entity)
    }

    /// Start a preview: edits until [`leave_shadow_edit`] are discarded and
    /// never recorded in undo.
    ///
    /// [`leave_shadow_edit`]: Self::leave_shadow_edit
    pub fn enter_shadow_edit(&mut self) -> Result<()> {
        self.core.ensure_alive()?;
        if self.core.is_in_shadow_edit() {
            return Ok(());
        }
        let root = self.core.root();
        self.shadow_snapshot = Some(Snapshot {
            html: self.core.dom().inner_html(root),
            entity_states: Vec::new(),
            selection: self
                .core
                .selection()
                .and_then(|selection| SnapshotSelection::capture(self.core.dom(), root, selection)),
        });
        self.core.lifecycle.shadow_edit = true;
        self.dispatch(PluginEvent::EnteredShadowEdit).map(drop)
    }

    /// End the preview and put the content back.
    pub fn leave_shadow_edit(&mut self) -> Result<()> {
        self.core.ensure_alive()?;
        if !self.core.is_in_shadow_edit() {
            return Ok(());
        }
        self.dispatch(PluginEvent::LeavingShadowEdit)?;
        self.core.lifecycle.shadow_edit = false;
        if let Some(snapshot) = self.shadow_snapshot.take() {
            let root = self.core.root();
            self.core.dom_mut().set_inner_html(root, &snapshot.html)?;
            self.core.cache.invalidate();
            let selection = snapshot
                .selection
                .as_ref()
                .and_then(|selection| selection.resolve(self.core.dom(), root));
            self.core.set_selection_silently(selection);
        }
        Ok(())
    }

    /// Dispose every plugin, last registered first, then shut the core.
    ///
    /// A plugin failing to dispose is reported to the dispose error handler
    /// (or logged) and the others are still disposed. Any later call fails
    /// with [`Error::Disposed`].
    pub fn dispose(&mut self) -> Result<()> {
        self.core.ensure_alive()?;
        if let Err(err) = self.dispatch(PluginEvent::BeforeDispose) {
            tracing::warn!(%err, "beforeDispose handling failed");
        }
        for plugin in self.plugins.iter_mut().rev() {
            if let Err(err) = plugin.dispose(&mut self.core) {
                match self.dispose_error_handler.as_mut() {
                    Some(handler) => handler(plugin.name(), &err),
                    None => tracing::error!(plugin = plugin.name(), %err, "plugin dispose failed"),
                }
            }
        }
        self.core.mark_disposed();
        self.shadow_snapshot = None;
        tracing::debug!("editor disposed");
        Ok(())
    }

    /// Deliver the events queued through the core.
    pub fn flush_events(&mut self) -> Result<()> {
        let mut delivered = 0;
        while let Some(mut event) = self.core.next_event() {
            if delivered == MAX_QUEUED_EVENTS {
                let mut dropped = 1;
                while self.core.next_event().is_some() {
                    dropped += 1;
                }
                tracing::warn!(dropped, "plugin event budget exhausted");
                break;
            }
            delivered += 1;
            self.deliver(&mut event)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, mut event: PluginEvent) -> Result<PluginEvent> {
        self.core.ensure_alive()?;
        self.deliver(&mut event)?;
        self.flush_events()?;
        Ok(event)
    }

    fn deliver(&mut self, event: &mut PluginEvent) -> Result<()> {
        if event.is_dom_event() {
            let core = &self.core;
            let claimer = self
                .plugins
                .iter_mut()
                .position(|plugin| plugin.will_handle_event_exclusively(core, event));
            if let Some(index) = claimer {
                tracing::trace!(
                    plugin = self.plugins[index].name(),
                    event = event.name(),
                    "event handled exclusively"
                );
                return self.plugins[index].on_plugin_event(&mut self.core, event);
            }
        }
        for plugin in &mut self.plugins {
            plugin.on_plugin_event(&mut self.core, event)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("core", &self.core)
            .field(
                "plugins",
                &self.plugins.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}
