//! Document-level scenarios spanning parse, structural edits, and undo —
//! the cross-module behavior `treenote-doc`'s own unit tests don't exercise
//! end-to-end.

use pretty_assertions::assert_eq;
use treenote_doc::{ops, CursorSnapshot, Document, TreeIndex};

fn cursor_zero() -> CursorSnapshot {
    CursorSnapshot { y: 0, x: 0 }
}

#[test]
fn parse_then_serialize_is_a_fixed_point_for_a_well_formed_tree() {
    let body = "├── first\n│   nested-line\n└── second\n";
    let doc = Document::from_text(body, Some("my title"));
    assert_eq!(doc.title(), "my title");
    assert_eq!(doc.to_text(), body);
}

#[test]
fn a_malformed_indent_jump_is_clamped_to_the_deepest_open_ancestor() {
    // "second" claims indent depth 2 but only one level ("first") is open;
    // it must attach as first's child rather than panic or get dropped.
    let text = "└── first\n        └── second\n";
    let doc = Document::from_text(text, None);
    let first = doc.tree.node_at(&TreeIndex::root().child(0)).unwrap();
    assert_eq!(first.content.to_str(&doc.arena, 0), "first");
    assert_eq!(first.children.len(), 1);
    assert_eq!(first.children[0].content.to_str(&doc.arena, 0), "second");
}

#[test]
fn move_lower_then_undo_restores_sibling_order() {
    // Document::new() already seeds one empty child; this adds a second so
    // there's a predecessor for it to demote under.
    let mut doc = Document::new();
    doc.tree.root.children.push(treenote_doc::Node::new());
    assert_eq!(doc.tree.root.children.len(), 2);
    let second = TreeIndex::root().child(1);

    assert_eq!(ops::move_lower(&mut doc, &second, cursor_zero()).unwrap(), 0);
    assert_eq!(doc.tree.root.children.len(), 1, "second is now nested under first");

    doc.history.undo(&mut doc.tree);
    assert_eq!(doc.tree.root.children.len(), 2, "undo restores both as top-level siblings");
}

#[test]
fn delete_recursive_refuses_the_sole_empty_node_but_allows_after_insertion() {
    let mut doc = Document::new();
    let only = TreeIndex::root().child(0);
    assert_eq!(ops::delete_recursive(&mut doc, &only, cursor_zero()).unwrap(), 1);

    ops::insert_below(&mut doc, &only, cursor_zero());
    assert_eq!(doc.tree.root.children.len(), 2);
    assert_eq!(ops::delete_recursive(&mut doc, &only, cursor_zero()).unwrap(), 0);
    assert_eq!(doc.tree.root.children.len(), 1);
}

#[test]
fn copy_survives_deletion_of_the_original_subtree() {
    let mut doc = Document::new();
    let only = TreeIndex::root().child(0);
    ops::insert_child(&mut doc, &only, cursor_zero());
    ops::copy(&mut doc, &only).unwrap();

    ops::delete_recursive(&mut doc, &only, cursor_zero()).unwrap();
    doc.tree.ensure_nonempty();

    let target = TreeIndex::root().child(0);
    assert_eq!(ops::paste_default(&mut doc, &target, cursor_zero()).unwrap(), 0);
    assert_eq!(
        doc.tree.root.children.len(),
        2,
        "pasting the clipboard node restores a sibling even though the original subtree is gone"
    );
}
