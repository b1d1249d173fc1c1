//! Flattened display cache (`spec.md` §4.6, component F): a pre-order
//! snapshot of `(tree-index, line_no)` pairs, one per visual row, rebuilt
//! wholesale after every structural or content change.
//!
//! Design notes call out that the cache could hold non-owning borrows into
//! the tree; since the contract is "rebuild unconditionally on every
//! mutation" anyway, storing owned `(TreeIndex, line_no)` pairs and
//! re-dereferencing the tree on read is the cleaner choice in Rust — no
//! lifetime ties the cache to the tree between rebuilds.

use treenote_doc::{Node, Tree, TreeIndex};
use treenote_text::Arena;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub index: TreeIndex,
    pub line_no: usize,
}

#[derive(Debug, Default)]
pub struct DisplayCache {
    entries: Vec<CacheEntry>,
}

impl DisplayCache {
    pub fn rebuild(tree: &Tree) -> Self {
        let mut entries = Vec::new();
        visit(&tree.root, &TreeIndex::root(), &mut entries);
        tracing::trace!(target: "view.cache", rows = entries.len(), "rebuilt");
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn row(&self, y: usize) -> Option<&CacheEntry> {
        self.entries.get(y)
    }

    /// Borrowed slice of display rows starting at `row`, up to `count`.
    pub fn get_lc_range(&self, row: usize, count: usize) -> &[CacheEntry] {
        let start = row.min(self.entries.len());
        let end = (row.saturating_add(count)).min(self.entries.len());
        &self.entries[start..end]
    }

    pub fn entry_depth(&self, y: usize) -> usize {
        self.entries.get(y).map(|e| e.index.depth()).unwrap_or(0)
    }

    pub fn entry_child_count(&self, tree: &Tree, y: usize) -> usize {
        self.entries
            .get(y)
            .and_then(|e| tree.node_at(&e.index))
            .map(|n| n.children.len())
            .unwrap_or(0)
    }

    pub fn entry_line_length(&self, tree: &Tree, y: usize) -> usize {
        self.entries
            .get(y)
            .and_then(|e| tree.node_at(&e.index).map(|n| (n, e.line_no)))
            .map(|(n, line_no)| n.content.line_length(line_no))
            .unwrap_or(0)
    }

    pub fn get_entry_content(&self, tree: &Tree, arena: &Arena, y: usize, begin: usize, len: usize) -> String {
        match self.entries.get(y) {
            Some(e) => match tree.node_at(&e.index) {
                Some(n) => n.content.to_substr(arena, e.line_no, begin, len),
                None => String::new(),
            },
            None => String::new(),
        }
    }

    /// The drawn column prefix (ancestor `│ `/`  ` columns plus this row's
    /// own branch or continuation marker) for row `y`.
    pub fn get_entry_prefix(&self, tree: &Tree, y: usize) -> String {
        match self.entries.get(y) {
            Some(e) => entry_prefix(tree, &e.index, e.line_no),
            None => String::new(),
        }
    }

    /// Character count (not byte count) of [`Self::get_entry_prefix`].
    pub fn get_entry_prefix_length(&self, tree: &Tree, y: usize) -> usize {
        self.get_entry_prefix(tree, y).chars().count()
    }

    /// Lexicographic binary search over `(index, line_no)` pairs; returns
    /// the nearest row when `(idx, line)` isn't an exact cache entry.
    pub fn approx_pos_of_tree_idx(&self, idx: &TreeIndex, line: usize) -> usize {
        if self.entries.is_empty() {
            return 0;
        }
        let pos = self
            .entries
            .partition_point(|e| (&e.index, e.line_no) < (idx, line));
        pos.min(self.entries.len() - 1)
    }
}

fn visit(node: &Node, prefix: &TreeIndex, out: &mut Vec<CacheEntry>) {
    for (i, child) in node.children.iter().enumerate() {
        let idx = prefix.child(i);
        let lines = child.content.line_count().max(1);
        for line_no in 0..lines {
            out.push(CacheEntry { index: idx.clone(), line_no });
        }
        visit(child, &idx, out);
    }
}

fn is_last_sibling(tree: &Tree, idx: &TreeIndex) -> bool {
    match idx.parent() {
        None => true,
        Some(parent) => {
            let count = tree.sibling_count(&parent);
            idx.last().map(|p| p + 1 == count).unwrap_or(true)
        }
    }
}

/// Prefix-glyph mapper (`spec.md` §4.9/§6 `make_line_string_default`):
/// `ancestor_is_last[d]` says whether the ancestor at column `d` is the
/// last child of its parent (blank column) or not (`│` column); `is_branch`
/// picks the branch-marker row vs. a plain continuation row, and
/// `self_is_last` picks between `├`/`└` (or their blank continuations).
pub fn make_line_string_default(ancestor_is_last: &[bool], is_branch: bool, self_is_last: bool) -> String {
    let mut out = String::new();
    for &last in ancestor_is_last {
        out.push_str(if last { "    " } else { "│   " });
    }
    if is_branch {
        out.push_str(if self_is_last { "└── " } else { "├── " });
    } else {
        out.push_str(if self_is_last { "    " } else { "│   " });
    }
    out
}

fn entry_prefix(tree: &Tree, idx: &TreeIndex, line_no: usize) -> String {
    let ancestor_is_last: Vec<bool> = (1..idx.depth())
        .map(|d| is_last_sibling(tree, &TreeIndex::from(idx.as_slice()[..d].to_vec())))
        .collect();
    make_line_string_default(&ancestor_is_last, line_no == 0, is_last_sibling(tree, idx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rebuild_counts_one_row_per_line_min_one() {
        let mut tree = Tree::new();
        tree.root.children.push(Node::new());
        let cache = DisplayCache::rebuild(&tree);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.entry_depth(0), 1);
    }

    #[test]
    fn reverse_lookup_matches_forward_lookup_for_every_row() {
        let mut tree = Tree::new();
        tree.root.children.push(Node::new());
        tree.root.children[0].children.push(Node::new());
        let cache = DisplayCache::rebuild(&tree);
        for y in 0..cache.len() {
            let e = cache.row(y).unwrap();
            assert_eq!(cache.approx_pos_of_tree_idx(&e.index, e.line_no), y);
        }
    }

    #[test]
    fn get_lc_range_clamps_to_cache_length() {
        let tree = Tree::new();
        let cache = DisplayCache::rebuild(&tree);
        let rows = cache.get_lc_range(0, 50);
        assert_eq!(rows.len(), cache.len());
    }

    #[test]
    fn prefix_glyphs_mark_last_sibling_with_blank_branch() {
        let mut tree = Tree::new();
        tree.root.children.push(Node::new());
        let cache = DisplayCache::rebuild(&tree);
        assert_eq!(cache.get_entry_prefix(&tree, 0), "├── ");
        assert_eq!(cache.get_entry_prefix(&tree, 1), "└── ");
    }
}
