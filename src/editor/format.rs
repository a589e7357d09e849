//! The format transaction: the single gateway through which the model is
//! mutated and written back.

use crate::dom::DomSelection;
use crate::editor::editor_core::EditorCore;
use crate::editor::state::PendingFormat;
use crate::error::{Error, Result};
use crate::input::RawEvent;
use crate::model::{ContentModelDocument, Entity, Image, SegmentFormat};
use crate::plugin::{ChangeSource, ChangedEntity, EntityOperation, PluginEvent};
use crate::undo::EntityState;

/// Options of [`EditorCore::format_content_model`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatOptions {
    /// Name of the calling API, for logs.
    pub api_name: &'static str,
    pub raw_event: Option<RawEvent>,
    pub change_source: ChangeSource,
    /// Carried by the `ContentChanged` event.
    pub change_data: Option<String>,
    /// Do not record undo snapshots for this change.
    pub skip_undo_snapshot: bool,
    /// Build the model for this selection instead of the current one. The
    /// cache is bypassed.
    pub selection_override: Option<DomSelection>,
    /// Mark the state before this change as revertible by one Backspace.
    pub can_undo_by_backspace: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            api_name: "formatContentModel",
            raw_event: None,
            change_source: ChangeSource::Format,
            change_data: None,
            skip_undo_snapshot: false,
            selection_override: None,
            can_undo_by_backspace: false,
        }
    }
}

impl FormatOptions {
    #[must_use]
    pub fn new(api_name: &'static str) -> Self {
        Self {
            api_name,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: ChangeSource) -> Self {
        self.change_source = source;
        self
    }

    #[must_use]
    pub fn with_raw_event(mut self, raw_event: RawEvent) -> Self {
        self.raw_event = Some(raw_event);
        self
    }
}

/// An entity removed by a mutator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeletedEntity {
    pub entity: Entity,
    pub operation: EntityOperation,
}

/// Per-call scratch space handed to the mutator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormatContext {
    pub new_entities: Vec<Entity>,
    pub deleted_entities: Vec<DeletedEntity>,
    pub new_images: Vec<Image>,
    pub raw_event: Option<RawEvent>,
    /// Drop the cached model after this call.
    pub clear_model_cache: bool,
    pub skip_undo_snapshot: bool,
    /// Becomes the pending format at the resulting caret.
    pub new_pending_format: Option<SegmentFormat>,
    /// Stored with the snapshot taken after the change.
    pub entity_states: Vec<EntityState>,
}

impl FormatContext {
    #[must_use]
    pub fn new(raw_event: Option<RawEvent>) -> Self {
        Self {
            raw_event,
            ..Self::default()
        }
    }
}

/// State of the outermost transaction while its mutator runs. Nested
/// transactions edit `model` in place and leave the write-back to the
/// outermost one.
#[derive(Debug)]
pub(crate) struct InFlight {
    pub(crate) model: ContentModelDocument,
    pub(crate) nested_changed: bool,
    pub(crate) nested: FormatContext,
}

impl FormatContext {
    /// Fold what a nested mutator collected into this context.
    fn absorb(&mut self, nested: Self) {
        self.new_entities.extend(nested.new_entities);
        self.deleted_entities.extend(nested.deleted_entities);
        self.new_images.extend(nested.new_images);
        self.entity_states.extend(nested.entity_states);
        self.clear_model_cache |= nested.clear_model_cache;
        if self.new_pending_format.is_none() {
            self.new_pending_format = nested.new_pending_format;
        }
    }
}

impl EditorCore {
    /// Run `mutator` on the current model and write the result back when it
    /// reports a change. Returns whether it did.
    ///
    /// A mutator returning false leaves the DOM, the cached model and the
    /// undo stack as they were.
    pub fn format_content_model(
        &mut self,
        mutator: impl FnOnce(&mut ContentModelDocument, &mut FormatContext) -> bool,
        options: FormatOptions,
    ) -> Result<bool> {
        self.format_content_model_with(
            |core, context| {
                core.transaction_model_mut()
                    .is_some_and(|model| mutator(model, context))
            },
            options,
        )
    }

    /// The model being edited by the running transaction.
    pub fn transaction_model_mut(&mut self) -> Option<&mut ContentModelDocument> {
        self.in_flight.as_mut().map(|in_flight| &mut in_flight.model)
    }

    /// Like [`format_content_model`](Self::format_content_model), but the
    /// mutator gets the core and reaches the model through
    /// [`transaction_model_mut`](Self::transaction_model_mut), so it can
    /// start a nested transaction.
    ///
    /// A nested transaction edits the same model. Only the outermost one
    /// writes the DOM, records snapshots and raises `ContentChanged`, and it
    /// commits when either level reported a change.
    pub fn format_content_model_with(
        &mut self,
        mutator: impl FnOnce(&mut Self, &mut FormatContext) -> bool,
        options: FormatOptions,
    ) -> Result<bool> {
        self.ensure_alive()?;
        if self.in_flight.is_some() {
            return Ok(self.run_nested(mutator, &options));
        }
        let api = options.api_name;

        let cached = if options.selection_override.is_none() {
            self.cache.model.take()
        } else {
            None
        };
        let original = cached.clone();
        let model = match cached {
            Some(model) => model,
            None => self.build_model(options.selection_override.as_ref()),
        };
        tracing::trace!(api, cached = original.is_some(), "transaction started");

        self.in_flight = Some(InFlight {
            model,
            nested_changed: false,
            nested: FormatContext::default(),
        });
        let mut context = FormatContext::new(options.raw_event.clone());
        let changed = mutator(self, &mut context);
        let in_flight = self.in_flight.take();

        let Some(in_flight) = in_flight.filter(|_| !self.is_disposed()) else {
            return Err(Error::Disposed);
        };
        let InFlight {
            model,
            nested_changed,
            nested,
        } = in_flight;
        context.absorb(nested);

        if !changed && !nested_changed {
            if original.is_some() && self.cache.model.is_none() {
                self.cache.model = original;
            }
            if context.clear_model_cache {
                self.clear_model_cache();
            }
            self.finish_transaction();
            tracing::trace!(api, "transaction aborted, nothing changed");
            return Ok(false);
        }

        let should_snapshot = !options.skip_undo_snapshot && !context.skip_undo_snapshot;
        if should_snapshot
            && (self.undo.has_new_content
                || options.can_undo_by_backspace
                || !self.undo.service.can_move(0))
        {
            self.take_snapshot(options.can_undo_by_backspace, Vec::new());
        }

        let selection = self.write_model(&model)?;
        self.set_selection_silently(selection);

        if context.clear_model_cache || !self.cache.is_enabled() {
            self.cache.model = None;
            self.clear_model_cache();
        } else {
            self.cache.model = Some(model);
        }

        if let Some(format) = context.new_pending_format.take() {
            self.format.pending_format = Some(PendingFormat {
                format,
                position: selection
                    .as_ref()
                    .filter(|s| s.is_collapsed_range())
                    .and_then(DomSelection::as_range)
                    .map(|range| range.start),
            });
        }

        if should_snapshot {
            self.take_snapshot(false, context.entity_states.clone());
        }

        let mut changed_entities: Vec<ChangedEntity> = context
            .new_entities
            .iter()
            .map(|entity| ChangedEntity {
                entity: entity.clone(),
                operation: EntityOperation::NewEntity,
            })
            .collect();
        changed_entities.extend(context.deleted_entities.iter().map(|deleted| ChangedEntity {
            entity: deleted.entity.clone(),
            operation: deleted.operation,
        }));
        for changed in &changed_entities {
            self.trigger_event(PluginEvent::EntityOperation {
                operation: changed.operation,
                wrapper: changed.entity.wrapper,
                entity_format: changed.entity.entity_format.clone(),
                state: None,
            })?;
        }
        self.trigger_event(PluginEvent::ContentChanged {
            source: options.change_source,
            data: options.change_data,
            changed_entities: Some(changed_entities),
            entity_states: context.entity_states,
        })?;

        self.finish_transaction();
        tracing::debug!(api, source = ?options.change_source, "transaction committed");
        Ok(true)
    }

    /// Run a mutator inside the transaction already in flight.
    fn run_nested(
        &mut self,
        mutator: impl FnOnce(&mut Self, &mut FormatContext) -> bool,
        options: &FormatOptions,
    ) -> bool {
        let api = options.api_name;
        if options.selection_override.is_some() {
            tracing::warn!(api, "selection override ignored by nested transaction");
        }
        let mut context = FormatContext::new(options.raw_event.clone());
        let changed = mutator(self, &mut context);
        if let Some(in_flight) = self.in_flight.as_mut() {
            if changed {
                in_flight.nested_changed = true;
                in_flight.nested.absorb(context);
            } else if context.clear_model_cache {
                in_flight.nested.clear_model_cache = true;
            }
        }
        tracing::trace!(api, changed, "nested transaction finished");
        changed
    }

    fn finish_transaction(&mut self) {
        if self.cache.pending_clear {
            self.cache.pending_clear = false;
            self.cache.invalidate();
            tracing::trace!("deferred cache clear applied");
        }
    }
}
