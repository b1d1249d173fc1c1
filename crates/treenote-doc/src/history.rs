//! Document-level command stack (`spec.md` §4.5, component E): a single
//! linear undo timeline over both structural tree commands and per-node
//! text edits.

use crate::tree::{Node, Tree, TreeIndex};

/// Minimal cursor save/restore payload (`spec.md` §3 "save is (x, y)").
/// The full cursor state machine lives in `treenote-view`, one layer above
/// this crate; history only needs to round-trip this pair through undo and
/// redo, so it is kept here rather than introducing a dependency cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorSnapshot {
    pub y: usize,
    pub x: usize,
}

impl CursorSnapshot {
    pub fn new(y: usize, x: usize) -> Self {
        Self { y, x }
    }
}

/// Reversible document-level command. Payloads carry whatever is needed to
/// invert themselves; detached subtrees are moved *into* the command on
/// delete/undo-of-insert and moved back out on the matching reverse.
pub enum DocumentCommand {
    MoveNode {
        src: TreeIndex,
        dst: TreeIndex,
    },
    /// Marks that a node's own piece table already recorded a text edit;
    /// undo/redo here only delegates to that piece table.
    EditContents {
        at: TreeIndex,
    },
    InsertNode {
        at: TreeIndex,
        node: Option<Node>,
    },
    DeleteNode {
        at: TreeIndex,
        node: Option<Node>,
    },
    Multi(Vec<DocumentCommand>),
}

impl DocumentCommand {
    fn apply(&mut self, tree: &mut Tree) {
        match self {
            DocumentCommand::MoveNode { src, dst } => {
                if let Some(node) = tree.detach(src) {
                    tree.insert_at(dst, node);
                }
                tree.ensure_nonempty();
            }
            DocumentCommand::EditContents { at } => {
                if let Some(node) = tree.node_at_mut(at) {
                    node.content.redo();
                }
            }
            DocumentCommand::InsertNode { at, node } => {
                let n = node.take().unwrap_or_default();
                tree.insert_at(at, n);
            }
            DocumentCommand::DeleteNode { at, node } => {
                *node = tree.detach(at);
                tree.ensure_nonempty();
            }
            DocumentCommand::Multi(cmds) => {
                for c in cmds.iter_mut() {
                    c.apply(tree);
                }
            }
        }
    }

    fn invert(&mut self, tree: &mut Tree) {
        match self {
            DocumentCommand::MoveNode { src, dst } => {
                if let Some(node) = tree.detach(dst) {
                    tree.insert_at(src, node);
                }
                tree.ensure_nonempty();
            }
            DocumentCommand::EditContents { at } => {
                if let Some(node) = tree.node_at_mut(at) {
                    node.content.undo();
                }
            }
            DocumentCommand::InsertNode { at, node } => {
                *node = tree.detach(at);
                tree.ensure_nonempty();
            }
            DocumentCommand::DeleteNode { at, node } => {
                let n = node.take().unwrap_or_default();
                tree.insert_at(at, n);
            }
            DocumentCommand::Multi(cmds) => {
                for c in cmds.iter_mut().rev() {
                    c.invert(tree);
                }
            }
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            DocumentCommand::MoveNode { .. } => "move_node",
            DocumentCommand::EditContents { .. } => "edit_contents",
            DocumentCommand::InsertNode { .. } => "insert_node",
            DocumentCommand::DeleteNode { .. } => "delete_node",
            DocumentCommand::Multi(cmds) => cmds.first().map(|c| c.display_name()).unwrap_or("multi"),
        }
    }
}

struct HistoryEntry {
    command: DocumentCommand,
    cursor_before: CursorSnapshot,
    cursor_after: Option<CursorSnapshot>,
}

/// Default document command-stack bound before the oldest half is
/// discarded. Overridable via `treenote-config`.
pub const DEFAULT_MAX_HIST: usize = 2000;

pub struct DocumentHistory {
    entries: Vec<HistoryEntry>,
    position: usize,
    save_position: usize,
    max_hist: usize,
}

impl Default for DocumentHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentHistory {
    pub fn new() -> Self {
        Self::with_max_hist(DEFAULT_MAX_HIST)
    }

    pub fn with_max_hist(max_hist: usize) -> Self {
        Self {
            entries: Vec::new(),
            position: 0,
            save_position: 0,
            max_hist,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Records `cmd` as the next history entry. For every command kind
    /// other than `EditContents`, this also performs the forward effect;
    /// `EditContents` is recorded only after its piece table already
    /// executed the edit itself (`spec.md` §4.5).
    pub fn exec(&mut self, tree: &mut Tree, mut cmd: DocumentCommand, cursor_before: CursorSnapshot) {
        self.cleanup_truncate();
        if !matches!(cmd, DocumentCommand::EditContents { .. }) {
            cmd.apply(tree);
        }
        tracing::trace!(target: "doc.history", name = cmd.display_name(), position = self.position, "exec");
        self.entries.push(HistoryEntry {
            command: cmd,
            cursor_before,
            cursor_after: None,
        });
        self.position = self.entries.len();
        self.cleanup_bound();
    }

    /// Applies `cmd` forward and folds it into the current top-of-history
    /// entry, promoting that entry to `Multi` if it wasn't already one.
    /// Used to batch the sub-steps of a compound structural operation.
    pub fn append_multi(&mut self, tree: &mut Tree, mut cmd: DocumentCommand) {
        cmd.apply(tree);
        debug_assert!(self.position > 0 && self.position == self.entries.len());
        if let Some(top) = self.entries.last_mut() {
            match &mut top.command {
                DocumentCommand::Multi(cmds) => cmds.push(cmd),
                other => {
                    let prior = std::mem::replace(other, DocumentCommand::Multi(Vec::new()));
                    if let DocumentCommand::Multi(cmds) = other {
                        cmds.push(prior);
                        cmds.push(cmd);
                    }
                }
            }
        }
        tracing::trace!(target: "doc.history", position = self.position, "append_multi");
    }

    pub fn set_cursor_after(&mut self, cursor: CursorSnapshot) {
        if let Some(top) = self.entries.last_mut() {
            top.cursor_after = Some(cursor);
        }
    }

    /// Truncates any redo tail before a new exec, matching the "new exec
    /// after undo" contract in §4.5's cleanup rule.
    fn cleanup_truncate(&mut self) {
        if self.position < self.entries.len() {
            self.entries.truncate(self.position);
            tracing::trace!(target: "doc.history", position = self.position, "redo_tail_truncated");
        }
    }

    fn cleanup_bound(&mut self) {
        if self.entries.len() == self.max_hist {
            let half = self.max_hist / 2;
            self.entries.drain(0..half);
            self.position -= half;
            self.save_position = self.save_position.saturating_sub(half);
            tracing::trace!(target: "doc.history", max_hist = self.max_hist, "history_compacted");
        }
    }

    pub fn undo(&mut self, tree: &mut Tree) -> Option<CursorSnapshot> {
        if self.position == 0 {
            return None;
        }
        self.position -= 1;
        let entry = &mut self.entries[self.position];
        entry.command.invert(tree);
        tracing::trace!(target: "doc.history", position = self.position, "undo");
        Some(entry.cursor_before)
    }

    pub fn redo(&mut self, tree: &mut Tree) -> Option<CursorSnapshot> {
        if self.position >= self.entries.len() {
            return None;
        }
        let entry = &mut self.entries[self.position];
        entry.command.apply(tree);
        let after = entry.cursor_after.unwrap_or(entry.cursor_before);
        self.position += 1;
        tracing::trace!(target: "doc.history", position = self.position, "redo");
        Some(after)
    }

    pub fn get_current_cmd_name(&self) -> Option<&'static str> {
        if self.position == 0 {
            return None;
        }
        self.entries.get(self.position - 1).map(|e| e.command.display_name())
    }

    pub fn mark_saved(&mut self) {
        self.save_position = self.position;
    }

    pub fn modified(&self) -> bool {
        self.position != self.save_position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Node;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_then_undo_redo_restores_count() {
        let mut tree = Tree::new();
        let mut history = DocumentHistory::new();
        let at = TreeIndex::root().child(1);
        let cmd = DocumentCommand::InsertNode { at: at.clone(), node: Some(Node::new()) };
        history.exec(&mut tree, cmd, CursorSnapshot::default());
        assert_eq!(tree.root.children.len(), 2);
        assert!(history.modified());
        history.undo(&mut tree);
        assert_eq!(tree.root.children.len(), 1);
        history.redo(&mut tree);
        assert_eq!(tree.root.children.len(), 2);
    }

    #[test]
    fn save_point_tracks_modified() {
        let mut tree = Tree::new();
        let mut history = DocumentHistory::new();
        assert!(!history.modified());
        let at = TreeIndex::root().child(1);
        history.exec(
            &mut tree,
            DocumentCommand::InsertNode { at, node: Some(Node::new()) },
            CursorSnapshot::default(),
        );
        assert!(history.modified());
        history.mark_saved();
        assert!(!history.modified());
        history.undo(&mut tree);
        assert!(history.modified());
    }

    #[test]
    fn append_multi_promotes_to_multi_command() {
        let mut tree = Tree::new();
        let mut history = DocumentHistory::new();
        let at1 = TreeIndex::root().child(1);
        history.exec(
            &mut tree,
            DocumentCommand::InsertNode { at: at1, node: Some(Node::new()) },
            CursorSnapshot::default(),
        );
        let at2 = TreeIndex::root().child(2);
        history.append_multi(&mut tree, DocumentCommand::InsertNode { at: at2, node: Some(Node::new()) });
        assert_eq!(tree.root.children.len(), 3);
        assert_eq!(history.len(), 1);
        history.undo(&mut tree);
        assert_eq!(tree.root.children.len(), 1);
    }

    #[test]
    fn move_node_round_trip() {
        let mut tree = Tree::new();
        tree.root.children.push(Node::new());
        let mut history = DocumentHistory::new();
        let src = TreeIndex::root().child(1);
        let dst = TreeIndex::root().child(0).child(0);
        history.exec(
            &mut tree,
            DocumentCommand::MoveNode { src, dst: dst.clone() },
            CursorSnapshot::default(),
        );
        assert_eq!(tree.root.children.len(), 1);
        assert!(tree.node_at(&dst).is_some());
        history.undo(&mut tree);
        assert_eq!(tree.root.children.len(), 2);
    }
}
