//! Test doubles: a plugin that logs what it sees, and an undo stack the
//! test can inspect while the editor owns it.

use std::cell::RefCell;
use std::rc::Rc;

use contentmodel_rust::{
    EditorCore, EditorPlugin, Error, PluginEvent, Result, Snapshot, Snapshots,
    UndoSnapshotsService,
};

pub type EventLog = Rc<RefCell<Vec<String>>>;

/// Appends `"<name>:<event>"` for every event it receives.
pub struct RecordingPlugin {
    name: &'static str,
    log: EventLog,
    claim_key_down: bool,
    fail_dispose: bool,
}

impl RecordingPlugin {
    pub fn new(name: &'static str, log: &EventLog) -> Self {
        Self {
            name,
            log: Rc::clone(log),
            claim_key_down: false,
            fail_dispose: false,
        }
    }

    /// Claim every `KeyDown` exclusively.
    pub fn claiming_key_down(mut self) -> Self {
        self.claim_key_down = true;
        self
    }

    pub fn failing_dispose(mut self) -> Self {
        self.fail_dispose = true;
        self
    }
}

impl EditorPlugin for RecordingPlugin {
    fn name(&self) -> &'static str {
        self.name
    }

    fn dispose(&mut self, _core: &mut EditorCore) -> Result<()> {
        self.log.borrow_mut().push(format!("{}:dispose", self.name));
        if self.fail_dispose {
            return Err(Error::plugin(self.name, "dispose failed"));
        }
        Ok(())
    }

    fn will_handle_event_exclusively(&mut self, _core: &EditorCore, event: &PluginEvent) -> bool {
        self.claim_key_down && matches!(event, PluginEvent::KeyDown { .. })
    }

    fn on_plugin_event(&mut self, _core: &mut EditorCore, event: &mut PluginEvent) -> Result<()> {
        self.log
            .borrow_mut()
            .push(format!("{}:{}", self.name, event.name()));
        Ok(())
    }
}

/// Entries of `log` that start with `prefix`.
pub fn entries(log: &EventLog, prefix: &str) -> Vec<String> {
    log.borrow()
        .iter()
        .filter(|entry| entry.starts_with(prefix))
        .cloned()
        .collect()
}

/// In-memory stack shared between the editor and the test.
#[derive(Clone, Default)]
pub struct SharedSnapshots(pub Rc<RefCell<Snapshots>>);

impl SharedSnapshots {
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn htmls(&self) -> Vec<String> {
        self.0
            .borrow()
            .snapshots()
            .iter()
            .map(|snapshot| snapshot.html.clone())
            .collect()
    }
}

impl UndoSnapshotsService for SharedSnapshots {
    fn can_move(&self, step: isize) -> bool {
        self.0.borrow().can_move(step)
    }

    fn move_by(&mut self, step: isize) -> Option<Snapshot> {
        self.0.borrow_mut().move_by(step)
    }

    fn add_snapshot(&mut self, snapshot: Snapshot, is_auto_complete_snapshot: bool) {
        self.0
            .borrow_mut()
            .add_snapshot(snapshot, is_auto_complete_snapshot);
    }

    fn clear_redo(&mut self) {
        self.0.borrow_mut().clear_redo();
    }

    fn can_undo_auto_complete(&self) -> bool {
        self.0.borrow().can_undo_auto_complete()
    }
}
