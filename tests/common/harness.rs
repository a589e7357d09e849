//! Editor setup and DOM lookup helpers shared by the integration tests.

use std::sync::Once;

use contentmodel_rust::convert::entity::{DELIMITER_AFTER, DELIMITER_BEFORE};
use contentmodel_rust::{
    DomSelection, EditPlugin, Editor, EditorOptions, KeyCode, KeyboardEvent, NodeId,
};

/// Route `tracing` output through the test writer once per binary.
pub fn setup_test_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

/// Editor with the built-in plugins only.
pub fn plain_editor(html: &str) -> Editor {
    setup_test_logging();
    Editor::new(EditorOptions::default().with_html(html)).expect("editor")
}

/// Editor that also routes deletions and typing over selections through
/// the model.
pub fn editing_editor(html: &str) -> Editor {
    setup_test_logging();
    Editor::new(
        EditorOptions::default()
            .with_html(html)
            .with_plugin(EditPlugin::new()),
    )
    .expect("editor")
}

/// Text nodes under the root, in document order.
pub fn text_nodes(editor: &Editor) -> Vec<NodeId> {
    let dom = editor.dom();
    dom.descendants(editor.root())
        .into_iter()
        .filter(|node| dom.is_text(*node))
        .collect()
}

/// The first text node whose content is exactly `text`.
pub fn text_node(editor: &Editor, text: &str) -> NodeId {
    text_nodes(editor)
        .into_iter()
        .find(|node| editor.dom().text(*node) == Some(text))
        .unwrap_or_else(|| panic!("no text node {text:?} in {:?}", editor.inner_html()))
}

/// Put a collapsed caret at `offset` in `node`, as the browser reports it.
pub fn place_caret(editor: &mut Editor, node: NodeId, offset: usize) {
    editor
        .handle_selection_change(Some(DomSelection::caret(node, offset)))
        .expect("selection change");
}

pub fn select_range(editor: &mut Editor, start: (NodeId, usize), end: (NodeId, usize)) {
    use contentmodel_rust::{DomPosition, DomRange};
    let range = DomRange::new(
        DomPosition::new(start.0, start.1),
        DomPosition::new(end.0, end.1),
    );
    editor
        .handle_selection_change(Some(DomSelection::range(range)))
        .expect("selection change");
}

pub fn press(editor: &mut Editor, code: KeyCode) -> KeyboardEvent {
    editor
        .handle_key_down(KeyboardEvent::key(code))
        .expect("key down")
}

/// Delimiter elements under the root: `(before, after)`.
pub fn delimiters(editor: &Editor) -> (Vec<NodeId>, Vec<NodeId>) {
    let dom = editor.dom();
    (
        dom.query_class(editor.root(), DELIMITER_BEFORE),
        dom.query_class(editor.root(), DELIMITER_AFTER),
    )
}

/// Plain text of the current model.
pub fn model_text(editor: &mut Editor) -> String {
    editor.create_content_model().expect("model").plain_text()
}
