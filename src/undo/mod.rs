//! Undo snapshots.
//!
//! The editor records a [`Snapshot`] of the root's HTML, entity state and
//! selection after each edit. Snapshots live in an [`UndoSnapshotsService`],
//! by default the size-bounded in-memory [`Snapshots`] stack.
//!
//! Besides plain undo/redo the stack tracks an *auto-complete* snapshot: the
//! state right before a single automatic edit (an auto-correction, say), so
//! that one Backspace right after it can revert just that edit.

mod manager;
mod snapshot;

pub use manager::{DEFAULT_MAX_SIZE, Snapshots, UndoSnapshotsService};
pub use snapshot::{EntityState, Snapshot};
