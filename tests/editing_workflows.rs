//! Keyboard editing, clipboard and entities driven through the editor the
//! way a host forwards browser events.

mod common;

use common::harness::{
    delimiters, editing_editor, model_text, place_caret, press, select_range, setup_test_logging,
    text_node,
};
use common::recording::{EventLog, RecordingPlugin, entries};
use contentmodel_rust::model::find_selection_marker;
use contentmodel_rust::{
    BlockPath, DomSelection, EditPlugin, Editor, EditorOptions, KeyCode, KeyboardEvent, NodeId,
};

const ZWS: char = '\u{200B}';

/// Detached `span` holding `label`, ready to become an entity.
fn entity_wrapper(editor: &mut Editor, label: &str) -> NodeId {
    let dom = editor.dom_mut();
    let wrapper = dom.create_element("span");
    let text = dom.create_text(label);
    dom.append_child(wrapper, text).unwrap();
    wrapper
}

/// `<div>ab</div>` with a read-only mention inserted at `offset`.
fn editor_with_mention(offset: usize) -> (Editor, NodeId) {
    let mut editor = editing_editor("<div>ab</div>");
    let ab = text_node(&editor, "ab");
    place_caret(&mut editor, ab, offset);
    let wrapper = entity_wrapper(&mut editor, "@bob");
    editor.insert_entity(wrapper, "mention", false).unwrap().unwrap();
    (editor, wrapper)
}

#[test]
fn test_backspace_at_segment_start_goes_through_model() {
    let mut editor = editing_editor("<div>test</div>");
    let text = text_node(&editor, "test");
    place_caret(&mut editor, text, 1);

    let event = press(&mut editor, KeyCode::Backspace);
    assert!(event.default_prevented());
    assert_eq!(model_text(&mut editor), "est");
    assert_eq!(editor.inner_html().unwrap(), "<div><span>est</span></div>");

    assert!(editor.undo().unwrap());
    assert_eq!(editor.inner_html().unwrap(), "<div>test</div>");
    assert!(editor.redo().unwrap());
    assert_eq!(editor.inner_html().unwrap(), "<div><span>est</span></div>");
}

#[test]
fn test_plain_backspace_inside_text_is_left_to_browser() {
    let mut editor = editing_editor("<div>test</div>");
    let text = text_node(&editor, "test");
    place_caret(&mut editor, text, 3);

    let event = press(&mut editor, KeyCode::Backspace);
    assert!(!event.default_prevented());
    assert_eq!(editor.inner_html().unwrap(), "<div>test</div>");
}

#[test]
fn test_delete_at_end_of_content_changes_nothing() {
    let mut editor = editing_editor("<div>test</div>");
    let text = text_node(&editor, "test");
    place_caret(&mut editor, text, 4);

    let event = press(&mut editor, KeyCode::Delete);
    assert!(!event.default_prevented());
    assert_eq!(editor.inner_html().unwrap(), "<div>test</div>");
}

#[test]
fn test_backspace_at_paragraph_start_joins_paragraphs() {
    let mut editor = editing_editor("<div>ab</div><div>cd</div>");
    let cd = text_node(&editor, "cd");
    place_caret(&mut editor, cd, 0);

    let event = press(&mut editor, KeyCode::Backspace);
    assert!(event.default_prevented());
    let model = editor.create_content_model().unwrap();
    assert_eq!(model.blocks.len(), 1);
    assert_eq!(model.plain_text(), "abcd");
}

#[test]
fn test_ctrl_backspace_deletes_previous_word() {
    let mut editor = editing_editor("<div>hello world</div>");
    let text = text_node(&editor, "hello world");
    place_caret(&mut editor, text, 11);

    let event = editor
        .handle_key_down(KeyboardEvent::with_ctrl(KeyCode::Backspace))
        .unwrap();
    assert!(event.default_prevented());
    assert_eq!(model_text(&mut editor), "hello ");
}

#[test]
fn test_typing_over_selection_deletes_it_first() {
    let mut editor = editing_editor("<div>hello world</div>");
    let text = text_node(&editor, "hello world");
    select_range(&mut editor, (text, 0), (text, 6));

    let event = press(&mut editor, KeyCode::Char('x'));
    // The browser still inserts the character itself.
    assert!(!event.default_prevented());
    assert!(editor.core().cache_state().model.is_none());
    assert_eq!(model_text(&mut editor), "world");
    assert!(editor.core().can_undo());
}

#[test]
fn test_paste_splits_the_caret_paragraph() {
    let mut editor = editing_editor("<div>abcd</div>");
    let text = text_node(&editor, "abcd");
    place_caret(&mut editor, text, 2);

    assert!(editor.paste("<div>1</div><div>2</div>").unwrap());
    let model = editor.create_content_model().unwrap();
    assert_eq!(model.blocks.len(), 2);
    assert_eq!(model.plain_text(), "ab1\n2cd");
}

#[test]
fn test_paste_without_selection_appends() {
    let mut editor = editing_editor("<div>a</div>");
    assert!(editor.paste("<div>b</div>").unwrap());
    assert_eq!(model_text(&mut editor), "a\nb");
    assert!(!editor.paste("").unwrap());
}

#[test]
fn test_copy_keeps_content_and_cut_removes_it() {
    let mut editor = editing_editor("<div>hello world</div>");
    let text = text_node(&editor, "hello world");
    select_range(&mut editor, (text, 0), (text, 5));

    let copied = editor.copy().unwrap().unwrap();
    assert!(copied.contains("hello"));
    assert!(!copied.contains("world"));
    assert_eq!(model_text(&mut editor), "hello world");

    let cut = editor.cut().unwrap().unwrap();
    assert_eq!(cut, copied);
    assert_eq!(model_text(&mut editor), " world");

    assert!(editor.undo().unwrap());
    assert_eq!(model_text(&mut editor), "hello world");
}

#[test]
fn test_copy_without_expanded_selection_is_none() {
    let mut editor = editing_editor("<div>hello</div>");
    assert_eq!(editor.copy().unwrap(), None);
    let text = text_node(&editor, "hello");
    place_caret(&mut editor, text, 2);
    assert_eq!(editor.cut().unwrap(), None);
    assert_eq!(model_text(&mut editor), "hello");
}

#[test]
fn test_inserted_entities_get_unique_ids_and_delimiters() {
    let (mut editor, _) = editor_with_mention(2);
    assert_eq!(delimiters(&editor).0.len(), 1);
    assert_eq!(delimiters(&editor).1.len(), 1);

    let second = entity_wrapper(&mut editor, "@amy");
    let entity = editor.insert_entity(second, "mention", false).unwrap().unwrap();
    assert_eq!(entity.entity_format.id.as_deref(), Some("mention_1"));
    assert!(entity.entity_format.is_readonly);
    assert_eq!(editor.core().entity_map().entities.len(), 2);
    assert_eq!(delimiters(&editor).0.len(), 2);
    assert_eq!(delimiters(&editor).1.len(), 2);

    let content = editor.get_content().unwrap();
    assert!(content.contains("@bob"));
    assert!(content.contains("@amy"));
    assert!(!content.contains(ZWS));
    // Extraction works on a copy.
    assert_eq!(delimiters(&editor).1.len(), 2);
}

#[test]
fn test_arrow_keys_jump_over_entity() {
    let (mut editor, _) = editor_with_mention(1);
    let (before, after) = delimiters(&editor);
    let before_text = editor.dom().first_child(before[0]).unwrap();
    let after_text = editor.dom().first_child(after[0]).unwrap();

    place_caret(&mut editor, before_text, 0);
    let event = press(&mut editor, KeyCode::Right);
    assert!(event.default_prevented());
    assert_eq!(
        editor.get_dom_selection().unwrap(),
        Some(DomSelection::caret(after_text, 1))
    );
    // The model caret sits right after the entity.
    let model = editor.create_content_model().unwrap();
    assert_eq!(
        find_selection_marker(&model.blocks),
        Some((BlockPath::root(0), 2))
    );

    let event = press(&mut editor, KeyCode::Left);
    assert!(event.default_prevented());
    assert_eq!(
        editor.get_dom_selection().unwrap(),
        Some(DomSelection::caret(before_text, 0))
    );
}

#[test]
fn test_arrow_keys_follow_rtl_direction() {
    let (mut editor, _) = editor_with_mention(1);
    let root = editor.root();
    editor.dom_mut().set_attribute(root, "dir", "rtl").unwrap();
    let (before, after) = delimiters(&editor);
    let before_text = editor.dom().first_child(before[0]).unwrap();
    let after_text = editor.dom().first_child(after[0]).unwrap();
    place_caret(&mut editor, before_text, 0);

    // Right moves away from the entity in right-to-left content.
    let event = press(&mut editor, KeyCode::Right);
    assert!(!event.default_prevented());
    assert_eq!(
        editor.get_dom_selection().unwrap(),
        Some(DomSelection::caret(before_text, 0))
    );

    let event = press(&mut editor, KeyCode::Left);
    assert!(event.default_prevented());
    assert_eq!(
        editor.get_dom_selection().unwrap(),
        Some(DomSelection::caret(after_text, 1))
    );
}

#[test]
fn test_enter_in_delimiter_splits_paragraph() {
    let (mut editor, _) = editor_with_mention(2);
    let after = delimiters(&editor).1[0];
    let zws_text = editor.dom().first_child(after).unwrap();
    place_caret(&mut editor, zws_text, 1);

    let event = press(&mut editor, KeyCode::Enter);
    assert!(event.default_prevented());
    let model = editor.create_content_model().unwrap();
    assert_eq!(model.blocks.len(), 2);
    let (path, _) = find_selection_marker(&model.blocks).unwrap();
    assert_eq!(path, BlockPath::root(1));
    assert!(editor.core().can_undo());
}

#[test]
fn test_character_typed_into_delimiter_is_fixed_up() {
    let (mut editor, wrapper) = editor_with_mention(2);
    let after = delimiters(&editor).1[0];
    let zws_text = editor.dom().first_child(after).unwrap();
    place_caret(&mut editor, zws_text, 1);

    let event = press(&mut editor, KeyCode::Char('x'));
    assert!(!event.default_prevented());
    assert!(editor.core().has_deferred());

    // What the browser does before the next frame.
    editor.dom_mut().set_text(zws_text, "\u{200B}x").unwrap();
    place_caret(&mut editor, zws_text, 2);

    assert_eq!(editor.run_deferred().unwrap(), 1);
    assert_eq!(editor.dom().text(zws_text), Some("x"));
    assert_eq!(
        editor.get_dom_selection().unwrap(),
        Some(DomSelection::caret(zws_text, 1))
    );
    let (before, after_now) = delimiters(&editor);
    assert_eq!(before.len(), 1);
    assert_eq!(after_now.len(), 1);
    assert_ne!(after_now[0], after);
    assert_eq!(editor.dom().next_sibling(wrapper), Some(after_now[0]));
    assert_eq!(model_text(&mut editor), "abx");
}

#[test]
fn test_deferred_fix_tolerates_detached_delimiter() {
    let (mut editor, _) = editor_with_mention(2);
    let after = delimiters(&editor).1[0];
    let zws_text = editor.dom().first_child(after).unwrap();
    place_caret(&mut editor, zws_text, 1);
    press(&mut editor, KeyCode::Char('x'));

    editor.dom_mut().release(after);
    assert_eq!(editor.run_deferred().unwrap(), 1);
    assert!(!editor.dom().is_alive(after));
}

#[test]
fn test_backspace_after_entity_removes_it() {
    setup_test_logging();
    let log = EventLog::default();
    let mut editor = Editor::new(
        EditorOptions::default()
            .with_html("<div>ab</div>")
            .with_plugin(EditPlugin::new())
            .with_plugin(RecordingPlugin::new("rec", &log)),
    )
    .unwrap();
    let ab = text_node(&editor, "ab");
    place_caret(&mut editor, ab, 2);
    let wrapper = entity_wrapper(&mut editor, "@bob");
    editor.insert_entity(wrapper, "mention", false).unwrap().unwrap();

    let after = delimiters(&editor).1[0];
    let zws_text = editor.dom().first_child(after).unwrap();
    place_caret(&mut editor, zws_text, 1);
    log.borrow_mut().clear();

    let event = press(&mut editor, KeyCode::Backspace);
    assert!(event.default_prevented());
    assert_eq!(model_text(&mut editor), "ab");
    assert_eq!(delimiters(&editor), (Vec::new(), Vec::new()));
    assert!(!editor.dom().contains(editor.root(), wrapper));
    assert!(entries(&log, "rec:").contains(&"rec:entityOperation".to_string()));
}
