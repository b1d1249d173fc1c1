//! The node tree (`spec.md` §4.4, component D): ownership of child nodes
//! and per-node content, plus the primitive topology mutations every
//! composite operation in [`crate::ops`] is built from.

use treenote_text::PieceTable;

/// A finite sequence of child positions from the root. The empty index
/// addresses the (invisible) root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TreeIndex(pub Vec<usize>);

impl TreeIndex {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child(&self, pos: usize) -> Self {
        let mut v = self.0.clone();
        v.push(pos);
        Self(v)
    }

    /// The index of this node's parent; `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// This node's position among its siblings; `None` at the root.
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn with_last(&self, pos: usize) -> Self {
        let mut v = self.0.clone();
        *v.last_mut().expect("with_last called on root index") = pos;
        Self(v)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for TreeIndex {
    fn from(v: Vec<usize>) -> Self {
        Self(v)
    }
}

/// A node owning its multi-line content and its children.
pub struct Node {
    pub content: PieceTable,
    pub children: Vec<Node>,
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

impl Node {
    pub fn new() -> Self {
        Self {
            content: PieceTable::new(),
            children: Vec::new(),
        }
    }

    pub fn with_content(content: PieceTable) -> Self {
        Self {
            content,
            children: Vec::new(),
        }
    }

    /// A new empty node whose piece table is bounded by `max_hist` rather
    /// than the default, so nodes created under a configured document
    /// (`treenote-config`'s `history.piece_table_max`) all share the same
    /// history bound.
    pub fn with_max_hist(max_hist: usize) -> Self {
        Self {
            content: PieceTable::with_max_hist(max_hist),
            children: Vec::new(),
        }
    }

    /// Deep-clones this subtree, flattening each piece table to text and
    /// re-appending into `arena` rather than sharing entries, so the clone
    /// stays valid even if the original subtree is later deleted and its
    /// undo never replays (design notes: clipboard independence).
    pub fn deep_clone(&self, arena: &mut treenote_text::Arena) -> Node {
        let mut content = PieceTable::with_max_hist(self.content.max_hist());
        for line in 0..self.content.line_count() {
            if line > 0 {
                content.make_line_break(arena, line - 1, content.line_length(line - 1));
            }
            let text = self.content.to_str(arena, line);
            if !text.is_empty() {
                let entry = arena.append(text.as_bytes());
                content.insert_str(arena, line, 0, entry, false);
            }
        }
        Node {
            content,
            children: self.children.iter().map(|c| c.deep_clone(arena)).collect(),
        }
    }
}

/// Owns the root node. The root is invisible and exists only to own
/// children; `root.children` is never empty (an empty document is
/// normalized to a single empty child).
pub struct Tree {
    pub root: Node,
    /// The history bound every node created under this tree (by the
    /// invariant-restoring empty child, the parser, or the insert/paste
    /// primitives) is built with, threaded from `treenote-config`'s
    /// `history.piece_table_max`.
    piece_max_hist: usize,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub fn new() -> Self {
        Self::with_piece_max_hist(treenote_text::DEFAULT_MAX_HIST)
    }

    /// A fresh tree whose root child (and every node later created under
    /// it) is bounded by `max_hist` rather than the crate default.
    pub fn with_piece_max_hist(max_hist: usize) -> Self {
        Self {
            root: Node {
                content: PieceTable::with_max_hist(max_hist),
                children: vec![Node::with_max_hist(max_hist)],
            },
            piece_max_hist: max_hist,
        }
    }

    /// Builds a new empty node matching this tree's configured history
    /// bound. Call sites that add nodes to a live tree (insert/paste
    /// primitives, the invariant-restoring empty child) use this instead of
    /// `Node::new()` so they don't silently revert to the crate default.
    pub fn new_node(&self) -> Node {
        Node::with_max_hist(self.piece_max_hist)
    }

    pub fn piece_max_hist(&self) -> usize {
        self.piece_max_hist
    }

    /// Restores the `root.children.count >= 1` invariant after a deletion
    /// that could have emptied it.
    pub fn ensure_nonempty(&mut self) {
        if self.root.children.is_empty() {
            let node = self.new_node();
            self.root.children.push(node);
            tracing::trace!(target: "doc.tree", "inserted_empty_child_to_restore_invariant");
        }
    }

    pub fn node_at(&self, idx: &TreeIndex) -> Option<&Node> {
        let mut node = &self.root;
        for &pos in idx.as_slice() {
            node = node.children.get(pos)?;
        }
        Some(node)
    }

    pub fn node_at_mut(&mut self, idx: &TreeIndex) -> Option<&mut Node> {
        let mut node = &mut self.root;
        for &pos in idx.as_slice() {
            node = node.children.get_mut(pos)?;
        }
        Some(node)
    }

    /// The children vector a given tree-index lives in (i.e. its parent's
    /// children). `idx` must not be the root.
    pub fn siblings_mut(&mut self, idx: &TreeIndex) -> Option<&mut Vec<Node>> {
        let parent = idx.parent()?;
        self.node_at_mut(&parent).map(|n| &mut n.children)
    }

    pub fn siblings(&self, idx: &TreeIndex) -> Option<&Vec<Node>> {
        let parent = idx.parent()?;
        self.node_at(&parent).map(|n| &n.children)
    }

    pub fn sibling_count(&self, parent: &TreeIndex) -> usize {
        self.node_at(parent).map(|n| n.children.len()).unwrap_or(0)
    }

    /// Moves (not copies) the contiguous-position child at `src` to
    /// position `dst` within the same children vector, preserving the
    /// `Node`'s identity.
    pub fn reorder_children(children: &mut Vec<Node>, src: usize, dst: usize) {
        if src == dst {
            return;
        }
        let node = children.remove(src);
        children.insert(dst.min(children.len()), node);
    }

    pub fn insert_child(children: &mut Vec<Node>, at: usize, node: Node) {
        children.insert(at.min(children.len()), node);
    }

    pub fn detach_child(children: &mut Vec<Node>, at: usize) -> Node {
        children.remove(at)
    }

    /// Detaches the subtree rooted at `idx` from the tree entirely.
    pub fn detach(&mut self, idx: &TreeIndex) -> Option<Node> {
        let pos = idx.last()?;
        let siblings = self.siblings_mut(idx)?;
        if pos >= siblings.len() {
            return None;
        }
        Some(Self::detach_child(siblings, pos))
    }

    /// Inserts `node` at tree-index `idx` (i.e. as child number `idx.last()`
    /// of `idx`'s parent).
    pub fn insert_at(&mut self, idx: &TreeIndex, node: Node) {
        if let Some(pos) = idx.last() {
            if let Some(siblings) = self.siblings_mut(idx) {
                Self::insert_child(siblings, pos, node);
                return;
            }
        }
        self.root.children.push(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fresh_tree_has_single_empty_child() {
        let tree = Tree::new();
        assert_eq!(tree.root.children.len(), 1);
        let idx = TreeIndex::root().child(0);
        assert!(tree.node_at(&idx).is_some());
    }

    #[test]
    fn detach_and_insert_round_trip() {
        let mut tree = Tree::new();
        tree.root.children.push(Node::new());
        let idx = TreeIndex::root().child(1);
        let detached = tree.detach(&idx).unwrap();
        assert_eq!(tree.root.children.len(), 1);
        tree.insert_at(&idx, detached);
        assert_eq!(tree.root.children.len(), 2);
    }

    #[test]
    fn reorder_preserves_count() {
        let mut tree = Tree::new();
        tree.root.children.push(Node::new());
        tree.root.children.push(Node::new());
        Tree::reorder_children(&mut tree.root.children, 0, 2);
        assert_eq!(tree.root.children.len(), 3);
    }

    #[test]
    fn ensure_nonempty_restores_invariant() {
        let mut tree = Tree::new();
        tree.root.children.clear();
        tree.ensure_nonempty();
        assert_eq!(tree.root.children.len(), 1);
    }
}
