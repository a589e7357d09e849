//! Per-editor state records owned by [`EditorCore`](crate::EditorCore).
//!
//! Built-in plugins keep their state here rather than inside themselves, so
//! the core APIs (transactions, undo) can read and update it directly.

use std::collections::BTreeMap;

use crate::convert::DomIndexer;
use crate::dom::{DomPosition, NodeId};
use crate::model::{ContentModelDocument, SegmentFormat};
use crate::undo::UndoSnapshotsService;

/// Cached model and the index that keeps it in sync with the DOM.
#[derive(Debug, Default)]
pub struct CacheState {
    pub model: Option<ContentModelDocument>,
    /// `None` when caching is disabled.
    pub indexer: Option<DomIndexer>,
    /// A nested transaction asked for a clear; the outermost one applies it.
    pub(crate) pending_clear: bool,
    /// An invalidation arrived during shadow edit.
    pub(crate) deferred_invalidation: bool,
}

impl CacheState {
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.indexer.is_some()
    }

    /// An invalidation is waiting for shadow edit to end.
    #[must_use]
    pub const fn has_deferred_invalidation(&self) -> bool {
        self.deferred_invalidation
    }

    /// Drop the cached model and its index.
    pub fn invalidate(&mut self) {
        self.model = None;
        if let Some(indexer) = &mut self.indexer {
            indexer.clear();
        }
    }
}

pub struct UndoState {
    pub service: Box<dyn UndoSnapshotsService>,
    /// Content changed since the last snapshot.
    pub has_new_content: bool,
}

impl std::fmt::Debug for UndoState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoState")
            .field("has_new_content", &self.has_new_content)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LifecycleState {
    pub is_disposed: bool,
    /// Preview mode: cache invalidation and snapshots wait until it ends.
    pub shadow_edit: bool,
}

/// Format to apply to the next typed text at `position`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingFormat {
    pub format: SegmentFormat,
    /// Caret the format was set at. Moving away cancels it.
    pub position: Option<DomPosition>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormatState {
    pub pending_format: Option<PendingFormat>,
    pub default_format: SegmentFormat,
}

/// Known entity of the entity map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityMapEntry {
    pub wrapper: NodeId,
    pub entity_type: Option<String>,
    pub is_deleted: bool,
}

/// Entity id → entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntityMapState {
    pub entities: BTreeMap<String, EntityMapEntry>,
}

impl EntityMapState {
    /// `base` if unused, else `base_1`, `base_2`, ...
    ///
    /// A trailing `_<n>` already on `base` is stripped first so repeated
    /// copies do not grow `_1_1_1`.
    #[must_use]
    pub fn unique_id(&self, base: &str) -> String {
        if !self.entities.contains_key(base) {
            return base.to_string();
        }
        let stem = match base.rsplit_once('_') {
            Some((stem, suffix))
                if !stem.is_empty() && !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) =>
            {
                stem
            }
            _ => base,
        };
        (1..)
            .map(|n| format!("{stem}_{n}"))
            .find(|id| !self.entities.contains_key(id))
            .unwrap_or_else(|| stem.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Dom;

    #[test]
    fn test_unique_id() {
        let mut dom = Dom::new();
        let mut map = EntityMapState::default();
        assert_eq!(map.unique_id("mention"), "mention");
        for id in ["mention", "mention_1"] {
            map.entities.insert(
                id.to_string(),
                EntityMapEntry {
                    wrapper: dom.create_element("span"),
                    entity_type: None,
                    is_deleted: false,
                },
            );
        }
        assert_eq!(map.unique_id("mention"), "mention_2");
        assert_eq!(map.unique_id("mention_1"), "mention_2");
    }
}
