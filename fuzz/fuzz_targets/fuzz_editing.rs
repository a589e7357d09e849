//! Fuzz target for keyboard editing through the model.
//!
//! Drives an editor with arbitrary carets, keys and pastes. Errors are
//! fine; panics are not.

#![no_main]

use arbitrary::Arbitrary;
use contentmodel_rust::{
    DomSelection, EditPlugin, Editor, EditorOptions, KeyCode, KeyModifiers, KeyboardEvent,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Action {
    Caret { node: u8, offset: u8 },
    Backspace { ctrl: bool },
    Delete,
    Enter,
    Char(char),
    Paste(String),
    Undo,
    Redo,
    Deferred,
}

#[derive(Debug, Arbitrary)]
struct Input {
    html: String,
    actions: Vec<Action>,
}

fuzz_target!(|input: Input| {
    let options = EditorOptions::default()
        .with_html(&input.html)
        .with_plugin(EditPlugin::new());
    let Ok(mut editor) = Editor::new(options) else {
        return;
    };

    for action in input.actions.into_iter().take(64) {
        let _ = match action {
            Action::Caret { node, offset } => {
                let dom = editor.dom();
                let texts: Vec<_> = dom
                    .descendants(editor.root())
                    .into_iter()
                    .filter(|n| dom.is_text(*n))
                    .collect();
                if texts.is_empty() {
                    continue;
                }
                let node = texts[usize::from(node) % texts.len()];
                let length = dom.text(node).map_or(0, |t| t.chars().count());
                let offset = usize::from(offset) % (length + 1);
                editor.handle_selection_change(Some(DomSelection::caret(node, offset)))
            }
            Action::Backspace { ctrl } => {
                let modifiers = if ctrl { KeyModifiers::CTRL } else { KeyModifiers::empty() };
                editor
                    .handle_key_down(KeyboardEvent::new(KeyCode::Backspace, modifiers))
                    .map(|_| ())
            }
            Action::Delete => editor.handle_key_down(KeyboardEvent::key(KeyCode::Delete)).map(|_| ()),
            Action::Enter => editor.handle_key_down(KeyboardEvent::key(KeyCode::Enter)).map(|_| ()),
            Action::Char(c) => editor.handle_key_down(KeyboardEvent::char(c)).map(|_| ()),
            Action::Paste(html) => editor.paste(&html).map(|_| ()),
            Action::Undo => editor.undo().map(|_| ()),
            Action::Redo => editor.redo().map(|_| ()),
            Action::Deferred => editor.run_deferred().map(|_| ()),
        };
    }
    let _ = editor.inner_html();
});
