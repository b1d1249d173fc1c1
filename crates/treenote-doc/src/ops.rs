//! Node-level composite operations (`spec.md` §4.4): move/indent/reorder,
//! recursive and children-preserving delete, and cut/copy/paste. Each
//! composite here issues one or more [`crate::DocumentCommand`]s through
//! [`crate::DocumentHistory`], grouping multi-step operations into a single
//! `Multi` entry via `append_multi` so they undo/redo atomically.
//!
//! Every function returns `Ok(0)` when the operation was performed and
//! `Ok(1)` when it was refused at a boundary (`spec.md` §7.3); `Err` is
//! reserved for the logic-error category (§7.2) and should not arise under
//! correct use by the facade.

use crate::history::CursorSnapshot;
use crate::tree::{Node, TreeIndex};
use crate::{Document, DocumentCommand, TreeNoteError};

fn is_empty_leaf(node: &Node) -> bool {
    node.children.is_empty() && node.content.line_count() == 1 && node.content.line_length(0) == 0
}

fn exec_or_append(doc: &mut Document, cmd: DocumentCommand, cursor_before: CursorSnapshot, first: &mut bool) {
    if *first {
        doc.history.exec(&mut doc.tree, cmd, cursor_before);
        *first = false;
    } else {
        doc.history.append_multi(&mut doc.tree, cmd);
    }
}

/// Move higher / promote: the source becomes a sibling of its parent,
/// just after it, dragging its later siblings along as its own children.
pub fn move_higher(doc: &mut Document, src: &TreeIndex, cursor_before: CursorSnapshot) -> Result<i32, TreeNoteError> {
    if src.depth() <= 1 {
        return Ok(1);
    }
    let parent = src.parent().unwrap();
    let k = src.last().unwrap();
    let sibling_count = doc.tree.sibling_count(&parent);
    let mut first = true;
    for _ in (k + 1)..sibling_count {
        let later_src = parent.child(k + 1);
        let dst_pos = doc.tree.node_at(src).map(|n| n.children.len()).unwrap_or(0);
        let dst = src.child(dst_pos);
        exec_or_append(doc, DocumentCommand::MoveNode { src: later_src, dst }, cursor_before, &mut first);
    }
    let grandparent = parent.parent().unwrap();
    let parent_pos = parent.last().unwrap();
    let dst = grandparent.child(parent_pos + 1);
    exec_or_append(doc, DocumentCommand::MoveNode { src: src.clone(), dst }, cursor_before, &mut first);
    tracing::trace!(target: "doc.tree", op = "move_higher", "performed");
    Ok(0)
}

/// Move lower / demote: the source becomes the last child of its
/// immediate predecessor sibling. Refused when there is no predecessor.
pub fn move_lower(doc: &mut Document, src: &TreeIndex, cursor_before: CursorSnapshot) -> Result<i32, TreeNoteError> {
    let parent = match src.parent() {
        Some(p) => p,
        None => return Ok(1),
    };
    let k = match src.last() {
        Some(k) if k > 0 => k,
        _ => return Ok(1),
    };
    let predecessor = parent.child(k - 1);
    let dst_pos = doc.tree.node_at(&predecessor).map(|n| n.children.len()).unwrap_or(0);
    let dst = predecessor.child(dst_pos);
    doc.history.exec(&mut doc.tree, DocumentCommand::MoveNode { src: src.clone(), dst }, cursor_before);
    tracing::trace!(target: "doc.tree", op = "move_lower", "performed");
    Ok(0)
}

/// Indent: the source's own children become its siblings (in order, right
/// after it), then the now-childless source is demoted under its
/// predecessor. Refused when there is no predecessor.
pub fn indent(doc: &mut Document, src: &TreeIndex, cursor_before: CursorSnapshot) -> Result<i32, TreeNoteError> {
    let parent = match src.parent() {
        Some(p) => p,
        None => return Ok(1),
    };
    let k = match src.last() {
        Some(k) if k > 0 => k,
        _ => return Ok(1),
    };
    let child_count = doc.tree.node_at(src).map(|n| n.children.len()).unwrap_or(0);
    let mut first = true;
    for i in 0..child_count {
        let csrc = src.child(0);
        let cdst = parent.child(k + 1 + i);
        exec_or_append(doc, DocumentCommand::MoveNode { src: csrc, dst: cdst }, cursor_before, &mut first);
    }
    let predecessor = parent.child(k - 1);
    let dst_pos = doc.tree.node_at(&predecessor).map(|n| n.children.len()).unwrap_or(0);
    let dst = predecessor.child(dst_pos);
    exec_or_append(doc, DocumentCommand::MoveNode { src: src.clone(), dst }, cursor_before, &mut first);
    tracing::trace!(target: "doc.tree", op = "indent", "performed");
    Ok(0)
}

/// Swap with the previous sibling; at the top boundary, falls through to
/// [`move_higher`] only if `promote_at_boundary` is set (the facade derives
/// this from the cursor's `move_node_depth` memory).
pub fn reorder_up(
    doc: &mut Document,
    src: &TreeIndex,
    cursor_before: CursorSnapshot,
    promote_at_boundary: bool,
) -> Result<i32, TreeNoteError> {
    let parent = match src.parent() {
        Some(p) => p,
        None => return Ok(1),
    };
    let k = match src.last() {
        Some(k) => k,
        None => return Ok(1),
    };
    if k > 0 {
        let dst = parent.child(k - 1);
        doc.history.exec(&mut doc.tree, DocumentCommand::MoveNode { src: src.clone(), dst }, cursor_before);
        return Ok(0);
    }
    if promote_at_boundary {
        move_higher(doc, src, cursor_before)
    } else {
        Ok(1)
    }
}

/// Swap with the next sibling; at the bottom boundary, falls through to
/// [`move_lower`] only if `demote_at_boundary` is set.
pub fn reorder_down(
    doc: &mut Document,
    src: &TreeIndex,
    cursor_before: CursorSnapshot,
    demote_at_boundary: bool,
) -> Result<i32, TreeNoteError> {
    let parent = match src.parent() {
        Some(p) => p,
        None => return Ok(1),
    };
    let k = match src.last() {
        Some(k) => k,
        None => return Ok(1),
    };
    let sibling_count = doc.tree.sibling_count(&parent);
    if k + 1 < sibling_count {
        let dst = parent.child(k + 1);
        doc.history.exec(&mut doc.tree, DocumentCommand::MoveNode { src: src.clone(), dst }, cursor_before);
        return Ok(0);
    }
    if demote_at_boundary {
        move_lower(doc, src, cursor_before)
    } else {
        Ok(1)
    }
}

/// Detaches and discards the whole subtree at `src`. Refused when `src` is
/// the sole remaining empty node in the document.
pub fn delete_recursive(doc: &mut Document, src: &TreeIndex, cursor_before: CursorSnapshot) -> Result<i32, TreeNoteError> {
    let node = doc.tree.node_at(src).ok_or_else(|| TreeNoteError::InvalidTreeIndex { index: src.clone() })?;
    if doc.tree.root.children.len() == 1 && *src == TreeIndex::root().child(0) && is_empty_leaf(node) {
        return Ok(1);
    }
    doc.history.exec(&mut doc.tree, DocumentCommand::DeleteNode { at: src.clone(), node: None }, cursor_before);
    tracing::trace!(target: "doc.tree", op = "delete_recursive", "performed");
    Ok(0)
}

/// Deletes `src` but keeps its children: they are re-parented to the
/// previous sibling if one exists, otherwise raised to `src`'s former
/// position among its own siblings.
pub fn delete_keeping_children(doc: &mut Document, src: &TreeIndex, cursor_before: CursorSnapshot) -> Result<i32, TreeNoteError> {
    let node = doc.tree.node_at(src).ok_or_else(|| TreeNoteError::InvalidTreeIndex { index: src.clone() })?;
    if doc.tree.root.children.len() == 1 && *src == TreeIndex::root().child(0) && is_empty_leaf(node) {
        return Ok(1);
    }
    let child_count = node.children.len();
    if child_count == 0 {
        return delete_recursive(doc, src, cursor_before);
    }
    let parent = src.parent().ok_or_else(|| TreeNoteError::InvalidTreeIndex { index: src.clone() })?;
    let k = src.last().ok_or_else(|| TreeNoteError::InvalidTreeIndex { index: src.clone() })?;
    let mut first = true;
    let final_pos = if k > 0 {
        let predecessor = parent.child(k - 1);
        for _ in 0..child_count {
            let csrc = src.child(0);
            let dst_pos = doc.tree.node_at(&predecessor).map(|n| n.children.len()).unwrap_or(0);
            let cdst = predecessor.child(dst_pos);
            exec_or_append(doc, DocumentCommand::MoveNode { src: csrc, dst: cdst }, cursor_before, &mut first);
        }
        k
    } else {
        for i in 0..child_count {
            let csrc = src.child(0);
            let cdst = parent.child(k + i);
            exec_or_append(doc, DocumentCommand::MoveNode { src: csrc, dst: cdst }, cursor_before, &mut first);
        }
        k + child_count
    };
    let final_idx = parent.child(final_pos);
    exec_or_append(doc, DocumentCommand::DeleteNode { at: final_idx, node: None }, cursor_before, &mut first);
    tracing::trace!(target: "doc.tree", op = "delete_keeping_children", "performed");
    Ok(0)
}

/// Non-mutating guard matching [`delete_recursive`]'s refusal rule, used by
/// hosts that want to gray out the delete action rather than issue it and
/// check the return code.
pub fn delete_check(doc: &Document, src: &TreeIndex) -> bool {
    match doc.tree.node_at(src) {
        Some(node) => !(doc.tree.root.children.len() == 1 && *src == TreeIndex::root().child(0) && is_empty_leaf(node)),
        None => false,
    }
}

/// Inserts a new empty sibling immediately after `at`.
pub fn insert_below(doc: &mut Document, at: &TreeIndex, cursor_before: CursorSnapshot) -> TreeIndex {
    let parent = at.parent().unwrap_or_else(TreeIndex::root);
    let pos = at.last().map(|p| p + 1).unwrap_or_else(|| doc.tree.root.children.len());
    let target = parent.child(pos);
    let node = doc.tree.new_node();
    doc.history.exec(&mut doc.tree, DocumentCommand::InsertNode { at: target.clone(), node: Some(node) }, cursor_before);
    target
}

/// Inserts a new empty sibling immediately before `at`.
pub fn insert_above(doc: &mut Document, at: &TreeIndex, cursor_before: CursorSnapshot) -> TreeIndex {
    let parent = at.parent().unwrap_or_else(TreeIndex::root);
    let pos = at.last().unwrap_or(0);
    let target = parent.child(pos);
    let node = doc.tree.new_node();
    doc.history.exec(&mut doc.tree, DocumentCommand::InsertNode { at: target.clone(), node: Some(node) }, cursor_before);
    target
}

/// Inserts a new empty child appended after `at`'s existing children.
pub fn insert_child(doc: &mut Document, at: &TreeIndex, cursor_before: CursorSnapshot) -> TreeIndex {
    let pos = doc.tree.node_at(at).map(|n| n.children.len()).unwrap_or(0);
    let target = at.child(pos);
    let node = doc.tree.new_node();
    doc.history.exec(&mut doc.tree, DocumentCommand::InsertNode { at: target.clone(), node: Some(node) }, cursor_before);
    target
}

/// Snapshots a deep clone of `src` into the single-slot clipboard.
pub fn copy(doc: &mut Document, src: &TreeIndex) -> Result<i32, TreeNoteError> {
    let node = doc.tree.node_at(src).ok_or_else(|| TreeNoteError::InvalidTreeIndex { index: src.clone() })?;
    let clone = node.deep_clone(&mut doc.arena);
    doc.clipboard = Some(clone);
    tracing::trace!(target: "doc.tree", op = "copy", "performed");
    Ok(0)
}

/// Copy then delete.
pub fn cut(doc: &mut Document, src: &TreeIndex, cursor_before: CursorSnapshot) -> Result<i32, TreeNoteError> {
    copy(doc, src)?;
    delete_recursive(doc, src, cursor_before)
}

fn clipboard_payload(doc: &mut Document) -> Option<Node> {
    let clip = doc.clipboard.as_ref()?;
    Some(clip.deep_clone(&mut doc.arena))
}

/// Inserts the clipboard clone as a child of `target` if it has children,
/// otherwise as the following sibling. Refused when the clipboard is empty.
pub fn paste_default(doc: &mut Document, target: &TreeIndex, cursor_before: CursorSnapshot) -> Result<i32, TreeNoteError> {
    let Some(payload) = clipboard_payload(doc) else {
        return Ok(1);
    };
    let has_children = doc.tree.node_at(target).map(|n| !n.children.is_empty()).unwrap_or(false);
    let at = if has_children {
        let pos = doc.tree.node_at(target).unwrap().children.len();
        target.child(pos)
    } else {
        let parent = target.parent().unwrap_or_else(TreeIndex::root);
        let pos = target.last().map(|p| p + 1).unwrap_or(0);
        parent.child(pos)
    };
    doc.history.exec(&mut doc.tree, DocumentCommand::InsertNode { at, node: Some(payload) }, cursor_before);
    tracing::trace!(target: "doc.tree", op = "paste_default", "performed");
    Ok(0)
}

/// Inserts the clipboard clone as the sibling immediately before `target`.
/// Refused when the clipboard is empty.
pub fn paste_above(doc: &mut Document, target: &TreeIndex, cursor_before: CursorSnapshot) -> Result<i32, TreeNoteError> {
    let Some(payload) = clipboard_payload(doc) else {
        return Ok(1);
    };
    let parent = target.parent().unwrap_or_else(TreeIndex::root);
    let pos = target.last().unwrap_or(0);
    let at = parent.child(pos);
    doc.history.exec(&mut doc.tree, DocumentCommand::InsertNode { at, node: Some(payload) }, cursor_before);
    tracing::trace!(target: "doc.tree", op = "paste_above", "performed");
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn siblings_count(doc: &Document, parent: &TreeIndex) -> usize {
        doc.tree.sibling_count(parent)
    }

    #[test]
    fn move_higher_refused_at_depth_one() {
        let mut doc = Document::new();
        let src = TreeIndex::root().child(0);
        assert_eq!(move_higher(&mut doc, &src, CursorSnapshot::default()).unwrap(), 1);
    }

    #[test]
    fn move_lower_demotes_under_predecessor() {
        let mut doc = Document::new();
        doc.tree.root.children.push(Node::new());
        doc.tree.root.children.push(Node::new());
        let src = TreeIndex::root().child(2);
        assert_eq!(move_lower(&mut doc, &src, CursorSnapshot::default()).unwrap(), 0);
        assert_eq!(siblings_count(&doc, &TreeIndex::root()), 2);
        let new_idx = TreeIndex::root().child(1).child(0);
        assert!(doc.tree.node_at(&new_idx).is_some());
    }

    #[test]
    fn move_lower_refused_at_first_sibling() {
        let mut doc = Document::new();
        let src = TreeIndex::root().child(0);
        assert_eq!(move_lower(&mut doc, &src, CursorSnapshot::default()).unwrap(), 1);
    }

    #[test]
    fn delete_recursive_refused_for_sole_empty_node() {
        let mut doc = Document::new();
        let src = TreeIndex::root().child(0);
        assert_eq!(delete_recursive(&mut doc, &src, CursorSnapshot::default()).unwrap(), 1);
    }

    #[test]
    fn delete_keeping_children_raises_to_root_slot() {
        // A has children X, Y; sibling B follows. Delete A keeping children.
        let mut doc = Document::new();
        let a = TreeIndex::root().child(0);
        doc.tree.node_at_mut(&a).unwrap().children.push(Node::new());
        doc.tree.node_at_mut(&a).unwrap().children.push(Node::new());
        doc.tree.root.children.push(Node::new()); // B
        assert_eq!(siblings_count(&doc, &TreeIndex::root()), 2);
        assert_eq!(delete_keeping_children(&mut doc, &a, CursorSnapshot::default()).unwrap(), 0);
        assert_eq!(siblings_count(&doc, &TreeIndex::root()), 3);
        doc.history.undo(&mut doc.tree);
        assert_eq!(siblings_count(&doc, &TreeIndex::root()), 2);
    }

    #[test]
    fn delete_check_refuses_only_the_sole_empty_node() {
        let mut doc = Document::new();
        let src = TreeIndex::root().child(0);
        assert!(!delete_check(&doc, &src));
        insert_below(&mut doc, &src, CursorSnapshot::default());
        assert!(delete_check(&doc, &src));
    }

    #[test]
    fn insert_below_above_and_child_place_nodes_correctly() {
        let mut doc = Document::new();
        let a = TreeIndex::root().child(0);
        let b = insert_below(&mut doc, &a, CursorSnapshot::default());
        assert_eq!(b, TreeIndex::root().child(1));
        assert_eq!(siblings_count(&doc, &TreeIndex::root()), 2);
        let z = insert_above(&mut doc, &a, CursorSnapshot::default());
        assert_eq!(z, TreeIndex::root().child(0));
        assert_eq!(siblings_count(&doc, &TreeIndex::root()), 3);
        // `a` itself (the original sole node) now sits one position later.
        let a_now = TreeIndex::root().child(1);
        let child = insert_child(&mut doc, &a_now, CursorSnapshot::default());
        assert_eq!(child, a_now.child(0));
        assert_eq!(doc.tree.node_at(&a_now).unwrap().children.len(), 1);
    }

    #[test]
    fn paste_default_refused_when_clipboard_empty() {
        let mut doc = Document::new();
        let target = TreeIndex::root().child(0);
        assert_eq!(paste_default(&mut doc, &target, CursorSnapshot::default()).unwrap(), 1);
    }

    #[test]
    fn copy_then_paste_default_inserts_clone_as_sibling_when_childless() {
        let mut doc = Document::new();
        let src = TreeIndex::root().child(0);
        let entry = doc.arena.append(b"hello");
        let Document { tree, arena, .. } = &mut doc;
        tree.node_at_mut(&src).unwrap().content.insert_str(arena, 0, 0, entry, false);
        copy(&mut doc, &src).unwrap();
        assert_eq!(paste_default(&mut doc, &src, CursorSnapshot::default()).unwrap(), 0);
        assert_eq!(siblings_count(&doc, &TreeIndex::root()), 2);
        let pasted = TreeIndex::root().child(1);
        assert_eq!(doc.tree.node_at(&pasted).unwrap().content.to_str(&doc.arena, 0), "hello");
    }

    #[test]
    fn copy_then_paste_default_inserts_clone_as_child_when_node_has_children() {
        let mut doc = Document::new();
        let parent = TreeIndex::root().child(0);
        doc.tree.node_at_mut(&parent).unwrap().children.push(Node::new());
        let leaf = TreeIndex::root().child(1);
        copy(&mut doc, &leaf).unwrap();
        assert_eq!(paste_default(&mut doc, &parent, CursorSnapshot::default()).unwrap(), 0);
        assert_eq!(doc.tree.node_at(&parent).unwrap().children.len(), 2);
    }
}
