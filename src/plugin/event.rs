//! Events delivered to plugins.

use crate::dom::{DomSelection, NodeId};
use crate::input::{InputEvent, KeyboardEvent};
use crate::model::{Entity, EntityFormat};
use crate::undo::EntityState;

/// What caused a content change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeSource {
    Format,
    Keyboard,
    Paste,
    Cut,
    InsertEntity,
    /// An undo snapshot was restored.
    Restore,
    /// Content replaced through `set_content` or initial HTML.
    SetContent,
}

/// Lifecycle operation reported for an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityOperation {
    NewEntity,
    /// Removed as part of an expanded selection being replaced.
    Overwrite,
    /// Removed by a forward deletion reaching its start.
    RemoveFromStart,
    /// Removed by a backward deletion reaching its end.
    RemoveFromEnd,
    /// The host should apply the carried state (from an undo snapshot).
    UpdateEntityState,
}

/// An entity touched by a content change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangedEntity {
    pub entity: Entity,
    pub operation: EntityOperation,
}

/// Every event a plugin can receive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PluginEvent {
    KeyDown {
        raw: KeyboardEvent,
        /// Already taken over by an edit feature.
        handled_by_edit_feature: bool,
    },
    KeyUp {
        raw: KeyboardEvent,
    },
    Input {
        raw: InputEvent,
    },
    CompositionEnd {
        data: String,
    },
    ContentChanged {
        source: ChangeSource,
        data: Option<String>,
        /// `None` when the change did not track entities (restore, set content).
        changed_entities: Option<Vec<ChangedEntity>>,
        entity_states: Vec<EntityState>,
    },
    SelectionChanged {
        new: Option<DomSelection>,
        old: Option<DomSelection>,
    },
    /// The edit plugin is about to change content for this keystroke.
    BeforeKeyboardEditing {
        raw: KeyboardEvent,
    },
    EntityOperation {
        operation: EntityOperation,
        wrapper: NodeId,
        entity_format: EntityFormat,
        state: Option<String>,
    },
    EditorReady,
    BeforeDispose,
    EnteredShadowEdit,
    LeavingShadowEdit,
    /// Plugins may rewrite `html` before it is merged.
    BeforePaste {
        html: String,
    },
    /// `root` is a detached clone of the content; plugins strip editor-only
    /// markup from it.
    ExtractContentWithDom {
        root: NodeId,
    },
    BeforeCutCopy {
        is_cut: bool,
        /// Detached clone holding the selected content.
        root: NodeId,
    },
}

impl PluginEvent {
    /// Events coming straight from the host DOM, which a plugin may claim
    /// exclusively.
    #[must_use]
    pub const fn is_dom_event(&self) -> bool {
        matches!(
            self,
            Self::KeyDown { .. } | Self::KeyUp { .. } | Self::Input { .. } | Self::CompositionEnd { .. }
        )
    }

    /// Short name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::KeyDown { .. } => "keyDown",
            Self::KeyUp { .. } => "keyUp",
            Self::Input { .. } => "input",
            Self::CompositionEnd { .. } => "compositionEnd",
            Self::ContentChanged { .. } => "contentChanged",
            Self::SelectionChanged { .. } => "selectionChanged",
            Self::BeforeKeyboardEditing { .. } => "beforeKeyboardEditing",
            Self::EntityOperation { .. } => "entityOperation",
            Self::EditorReady => "editorReady",
            Self::BeforeDispose => "beforeDispose",
            Self::EnteredShadowEdit => "enteredShadowEdit",
            Self::LeavingShadowEdit => "leavingShadowEdit",
            Self::BeforePaste { .. } => "beforePaste",
            Self::ExtractContentWithDom { .. } => "extractContentWithDom",
            Self::BeforeCutCopy { .. } => "beforeCutCopy",
        }
    }

    /// The keyboard event of `KeyDown`/`KeyUp`/`BeforeKeyboardEditing`.
    #[must_use]
    pub const fn keyboard(&self) -> Option<&KeyboardEvent> {
        match self {
            Self::KeyDown { raw, .. } | Self::KeyUp { raw } | Self::BeforeKeyboardEditing { raw } => {
                Some(raw)
            }
            _ => None,
        }
    }
}
