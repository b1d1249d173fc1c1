//! End-to-end scenarios through the public facade surface, in the style of
//! `core-actions`'s scenario test files: build an `Editor`, drive a handful
//! of host-level calls, assert on the rendered outcome rather than internal
//! state.

use pretty_assertions::assert_eq;
use treenote_editor::Editor;

fn render_all(editor: &Editor) -> Vec<String> {
    (0..editor.row_count())
        .map(|y| {
            let len = editor.get_entry_line_length(y);
            format!("{}{}", editor.get_entry_prefix(y), editor.get_entry_content(y, 0, len))
        })
        .collect()
}

#[test]
fn typing_then_splitting_a_line_produces_two_rows() {
    let mut editor = Editor::make_empty();
    editor.line_insert_text("hello world");
    editor.cursor_mv_left(5);
    editor.line_newline();

    let rows = render_all(&editor);
    assert_eq!(rows, vec!["└── hello ".to_string(), "    world".to_string()]);
}

#[test]
fn undo_redo_round_trips_a_compacted_insert() {
    let mut editor = Editor::make_empty();
    editor.line_insert_text("a");
    editor.line_insert_text("b");
    editor.line_insert_text("c");
    assert_eq!(editor.get_entry_content(0, 0, 3), "abc");

    // three compacted keystrokes collapse into a single undo step
    assert!(editor.undo().is_some());
    assert_eq!(editor.get_entry_line_length(0), 0);

    assert!(editor.redo().is_some());
    assert_eq!(editor.get_entry_content(0, 0, 3), "abc");
}

#[test]
fn indenting_a_node_then_moving_it_back_restores_the_original_tree_shape() {
    let mut editor = Editor::make_empty();
    editor.line_insert_text("first");
    editor.node_insert_below();
    editor.line_insert_text("second");

    let before = render_all(&editor);
    assert_eq!(editor.node_move_lower_indent(), 0);
    assert_ne!(render_all(&editor), before);

    assert_eq!(editor.node_move_higher_rec(), 0);
    assert_eq!(render_all(&editor), before);
}

#[test]
fn cut_then_paste_preserves_content_independent_of_the_cut_node() {
    let mut editor = Editor::make_empty();
    editor.line_insert_text("keep me");
    editor.node_insert_below();
    editor.line_insert_text("to be cut");

    assert_eq!(editor.node_cut(), 0);
    assert_eq!(editor.row_count(), 1);

    assert_eq!(editor.node_paste_default(), 0);
    assert_eq!(editor.row_count(), 2);
    assert_eq!(editor.get_entry_content(1, 0, 9), "to be cut");
}

#[test]
fn saving_and_reloading_round_trips_through_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("note.txt");

    let mut editor = Editor::make_empty();
    editor.line_insert_text("root line");
    editor.node_insert_child();
    editor.line_insert_text("child line");
    let (status, _) = editor.save_file(Some(&path));
    assert_eq!(status, treenote_editor::FileStatus::None);
    assert!(!editor.modified());

    let mut reopened = Editor::make_empty();
    let (status, _) = reopened.load_file(&path);
    assert_eq!(status, treenote_editor::FileStatus::None);
    assert_eq!(render_all(&reopened), render_all(&editor));
    assert!(!reopened.modified());
}
