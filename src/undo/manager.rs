//! The undo snapshot stack.

use crate::undo::snapshot::Snapshot;

/// Default byte budget of the in-memory stack.
pub const DEFAULT_MAX_SIZE: usize = 10_000_000;

/// Storage of undo snapshots.
///
/// [`Snapshots`] is the in-memory implementation; hosts may plug in another
/// one (for example a server-backed store) through
/// [`EditorOptions::undo_snapshot_service`](crate::EditorOptions::undo_snapshot_service).
pub trait UndoSnapshotsService {
    /// Whether `move_by(step)` would succeed.
    fn can_move(&self, step: isize) -> bool;

    /// Move the cursor by `step` (`-1` undo, `1` redo) and return the snapshot
    /// there, or `None` when out of bounds.
    fn move_by(&mut self, step: isize) -> Option<Snapshot>;

    /// Push a snapshot, or refresh the top entry when the HTML is unchanged.
    fn add_snapshot(&mut self, snapshot: Snapshot, is_auto_complete_snapshot: bool);

    /// Drop everything after the cursor.
    fn clear_redo(&mut self);

    /// Exactly one edit happened since the auto-complete snapshot.
    fn can_undo_auto_complete(&self) -> bool;
}

/// Linear, size-bounded snapshot stack.
#[derive(Clone, Debug)]
pub struct Snapshots {
    snapshots: Vec<Snapshot>,
    current_index: Option<usize>,
    auto_complete_index: Option<usize>,
    total_size: usize,
    max_size: usize,
}

impl Default for Snapshots {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE)
    }
}

impl Snapshots {
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            snapshots: Vec::new(),
            current_index: None,
            auto_complete_index: None,
            total_size: 0,
            max_size,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Cursor position; `None` for an empty stack.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    #[must_use]
    pub fn auto_complete_index(&self) -> Option<usize> {
        self.auto_complete_index
    }

    #[must_use]
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    #[must_use]
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    #[must_use]
    pub fn current(&self) -> Option<&Snapshot> {
        self.snapshots.get(self.current_index?)
    }

    fn target(&self, step: isize) -> Option<usize> {
        let current = self.current_index?;
        current
            .checked_add_signed(step)
            .filter(|index| *index < self.snapshots.len())
    }

    /// Evict from the oldest end until the total fits.
    fn evict(&mut self) {
        let mut count = 0;
        while count + 1 < self.snapshots.len() && self.total_size > self.max_size {
            self.total_size -= self.snapshots[count].size();
            count += 1;
        }
        if count == 0 {
            return;
        }
        self.snapshots.drain(..count);
        self.current_index = self.current_index.map(|index| index.saturating_sub(count));
        self.auto_complete_index = self.auto_complete_index.and_then(|index| index.checked_sub(count));
        tracing::debug!(evicted = count, total_size = self.total_size, "undo snapshots evicted");
    }
}

impl UndoSnapshotsService for Snapshots {
    fn can_move(&self, step: isize) -> bool {
        self.target(step).is_some()
    }

    fn move_by(&mut self, step: isize) -> Option<Snapshot> {
        let index = self.target(step)?;
        self.current_index = Some(index);
        self.auto_complete_index = None;
        self.snapshots.get(index).cloned()
    }

    fn add_snapshot(&mut self, snapshot: Snapshot, is_auto_complete_snapshot: bool) {
        if let Some(index) = self.current_index {
            if self.snapshots[index].can_replace(&snapshot) {
                self.snapshots[index] = snapshot;
                if is_auto_complete_snapshot {
                    self.auto_complete_index = Some(index);
                }
                tracing::trace!(index, "undo snapshot refreshed in place");
                return;
            }
        }

        let size = snapshot.size();
        if size > self.max_size {
            tracing::warn!(size, max_size = self.max_size, "undo snapshot larger than the stack, dropped");
            return;
        }

        self.clear_redo();
        self.snapshots.push(snapshot);
        let index = self.snapshots.len() - 1;
        self.current_index = Some(index);
        self.total_size += size;
        tracing::trace!(index, size, total_size = self.total_size, "undo snapshot added");
        self.evict();

        if is_auto_complete_snapshot {
            self.auto_complete_index = self.current_index;
        }
    }

    fn clear_redo(&mut self) {
        let keep = self.current_index.map_or(0, |index| index + 1);
        if keep >= self.snapshots.len() {
            return;
        }
        let removed: usize = self.snapshots[keep..].iter().map(Snapshot::size).sum();
        self.snapshots.truncate(keep);
        self.total_size -= removed;
        self.auto_complete_index = None;
    }

    fn can_undo_auto_complete(&self) -> bool {
        match (self.auto_complete_index, self.current_index) {
            (Some(auto), Some(current)) => current == auto + 1,
            _ => false,
        }
    }
}
