//! Cursor state machine (`spec.md` §4.7, component G): a `(y, x)` position
//! over the flattened display cache, plus the "intended" memory that lets
//! vertical and tree-navigation moves feel stable across ragged subtrees.

use crate::cache::DisplayCache;
use treenote_doc::{CursorSnapshot, Tree, TreeIndex};
use treenote_text::Arena;

/// Only space and tab are treated as non-word characters (`spec.md` §9
/// Open Questions: the source has an in-progress TODO to extend this to
/// punctuation; this preserves current behavior rather than guessing it).
fn is_word_constituent(c: char) -> bool {
    c != ' ' && c != '\t'
}

#[derive(Debug, Clone, Default)]
pub struct Cursor {
    pub y: usize,
    pub x: usize,
    pub x_intended: usize,
    pub depth_intended: usize,
    pub index_intended: Vec<usize>,
    pub move_node_depth: Option<usize>,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&self) -> CursorSnapshot {
        CursorSnapshot::new(self.y, self.x)
    }

    pub fn restore(&mut self, snap: CursorSnapshot, tree: &Tree, cache: &DisplayCache) {
        self.y = snap.y;
        self.x = snap.x;
        self.clamp(tree, cache);
        self.x_intended = self.x;
        self.sync_intended(cache);
    }

    pub fn clamp(&mut self, tree: &Tree, cache: &DisplayCache) {
        if cache.is_empty() {
            self.y = 0;
            self.x = 0;
            return;
        }
        self.y = self.y.min(cache.len() - 1);
        self.x = self.x.min(cache.entry_line_length(tree, self.y));
    }

    fn sync_intended(&mut self, cache: &DisplayCache) {
        if let Some(e) = cache.row(self.y) {
            self.depth_intended = e.index.depth();
            self.index_intended = e.index.as_slice().to_vec();
            self.move_node_depth = Some(self.depth_intended);
        }
    }

    fn line_length(&self, tree: &Tree, cache: &DisplayCache, y: usize) -> usize {
        cache.entry_line_length(tree, y)
    }

    fn char_at(&self, arena: &Arena, tree: &Tree, cache: &DisplayCache, y: usize, x: usize) -> Option<char> {
        let e = cache.row(y)?;
        let node = tree.node_at(&e.index)?;
        if x >= node.content.line_length(e.line_no) {
            return None;
        }
        node.content.to_substr(arena, e.line_no, x, 1).chars().next()
    }

    fn step_right(&mut self, tree: &Tree, cache: &DisplayCache) -> bool {
        let len = self.line_length(tree, cache, self.y);
        if self.x < len {
            self.x += 1;
            true
        } else if self.y + 1 < cache.len() {
            self.y += 1;
            self.x = 0;
            true
        } else {
            false
        }
    }

    fn step_left(&mut self, tree: &Tree, cache: &DisplayCache) -> bool {
        if self.x > 0 {
            self.x -= 1;
            true
        } else if self.y > 0 {
            self.y -= 1;
            self.x = self.line_length(tree, cache, self.y);
            true
        } else {
            false
        }
    }

    /// Moves left character-at-a-time, wrapping across node boundaries.
    pub fn mv_left(&mut self, tree: &Tree, cache: &DisplayCache, amt: usize) {
        for _ in 0..amt {
            if !self.step_left(tree, cache) {
                break;
            }
        }
        self.x_intended = self.x;
        self.sync_intended(cache);
    }

    pub fn mv_right(&mut self, tree: &Tree, cache: &DisplayCache, amt: usize) {
        for _ in 0..amt {
            if !self.step_right(tree, cache) {
                break;
            }
        }
        self.x_intended = self.x;
        self.sync_intended(cache);
    }

    pub fn mv_up(&mut self, tree: &Tree, cache: &DisplayCache, amt: usize) {
        self.y = self.y.saturating_sub(amt);
        self.x = self.x_intended.min(self.line_length(tree, cache, self.y));
        self.sync_intended(cache);
    }

    pub fn mv_down(&mut self, tree: &Tree, cache: &DisplayCache, amt: usize) {
        if cache.is_empty() {
            return;
        }
        self.y = (self.y + amt).min(cache.len() - 1);
        self.x = self.x_intended.min(self.line_length(tree, cache, self.y));
        self.sync_intended(cache);
    }

    /// Advances until a non-word character is immediately followed by a
    /// word-constituent one, crossing node/line boundaries as needed;
    /// stops at end-of-file otherwise.
    pub fn word_forward(&mut self, arena: &Arena, tree: &Tree, cache: &DisplayCache) {
        loop {
            // The character the cursor is about to step past becomes "left"
            // of the new position once the step completes.
            let left = self.char_at(arena, tree, cache, self.y, self.x);
            if !self.step_right(tree, cache) {
                break;
            }
            if let Some(c) = self.char_at(arena, tree, cache, self.y, self.x) {
                let left_is_word = left.map(is_word_constituent).unwrap_or(false);
                if is_word_constituent(c) && !left_is_word {
                    break;
                }
            }
        }
        self.x_intended = self.x;
        self.sync_intended(cache);
    }

    /// Symmetric to [`Self::word_forward`]: steps one left first, then
    /// continues left until a word-constituent is preceded by a non-word
    /// character (or start-of-file is reached).
    pub fn word_backward(&mut self, arena: &Arena, tree: &Tree, cache: &DisplayCache) {
        if self.step_left(tree, cache) {
            loop {
                if let Some(c) = self.char_at(arena, tree, cache, self.y, self.x) {
                    let before = if self.x > 0 { self.char_at(arena, tree, cache, self.y, self.x - 1) } else { None };
                    let before_is_word = before.map(is_word_constituent).unwrap_or(false);
                    if is_word_constituent(c) && !before_is_word {
                        break;
                    }
                }
                if !self.step_left(tree, cache) {
                    break;
                }
            }
        }
        self.x_intended = self.x;
        self.sync_intended(cache);
    }

    pub fn to_sol(&mut self, cache: &DisplayCache) {
        self.x = 0;
        self.x_intended = 0;
        self.sync_intended(cache);
    }

    pub fn to_eol(&mut self, tree: &Tree, cache: &DisplayCache) {
        self.x = self.line_length(tree, cache, self.y);
        self.x_intended = self.x;
        self.sync_intended(cache);
    }

    pub fn to_sof(&mut self, cache: &DisplayCache) {
        self.y = 0;
        self.x = 0;
        self.x_intended = 0;
        self.sync_intended(cache);
    }

    pub fn to_eof(&mut self, tree: &Tree, cache: &DisplayCache) {
        self.y = cache.len().saturating_sub(1);
        self.x = self.line_length(tree, cache, self.y);
        self.x_intended = self.x;
        self.sync_intended(cache);
    }

    /// If the current node's depth is greater than 1, walks upward to the
    /// nearest row at `depth - 1`.
    pub fn nd_parent(&mut self, cache: &DisplayCache) {
        let depth = cache.entry_depth(self.y);
        if depth <= 1 {
            return;
        }
        self.depth_intended = depth - 1;
        while self.y > 0 {
            self.y -= 1;
            if cache.entry_depth(self.y) == self.depth_intended {
                break;
            }
        }
        self.x = 0;
        self.sync_intended(cache);
    }

    /// If the current node has children, walks down to the first row at
    /// `depth + 1`, preferring the sibling position remembered in
    /// `index_intended` when one is present at that depth.
    pub fn nd_child(&mut self, tree: &Tree, cache: &DisplayCache) {
        let idx = match cache.row(self.y) {
            Some(e) => e.index.clone(),
            None => return,
        };
        let has_children = tree.node_at(&idx).map(|n| !n.children.is_empty()).unwrap_or(false);
        if !has_children {
            return;
        }
        let target_depth = idx.depth() + 1;
        self.depth_intended = target_depth;
        let want_pos = self.index_intended.get(target_depth - 1).copied();
        let mut chosen = None;
        let mut y = self.y + 1;
        while y < cache.len() {
            let depth = cache.entry_depth(y);
            if depth < target_depth {
                break;
            }
            if depth == target_depth {
                if chosen.is_none() {
                    chosen = Some(y);
                }
                if want_pos.is_some() && cache.row(y).and_then(|e| e.index.last()) == want_pos {
                    chosen = Some(y);
                    break;
                }
            }
            y += 1;
        }
        if let Some(y) = chosen {
            self.y = y;
            self.x = 0;
        }
        self.sync_intended(cache);
    }

    pub fn nd_prev(&mut self, cache: &DisplayCache) {
        let mut y = self.y;
        while y > 0 {
            y -= 1;
            if cache.entry_depth(y) == self.depth_intended {
                self.y = y;
                self.x = 0;
                self.sync_intended(cache);
                return;
            }
        }
    }

    pub fn nd_next(&mut self, cache: &DisplayCache) {
        let mut y = self.y;
        while y + 1 < cache.len() {
            y += 1;
            if cache.entry_depth(y) == self.depth_intended {
                self.y = y;
                self.x = 0;
                self.sync_intended(cache);
                return;
            }
        }
    }

    pub fn go_to(&mut self, tree: &Tree, cache: &DisplayCache, idx: &TreeIndex, line: usize, col: usize) {
        self.y = cache.approx_pos_of_tree_idx(idx, line);
        self.x = col.min(self.line_length(tree, cache, self.y));
        self.x_intended = self.x;
        self.sync_intended(cache);
    }

    pub fn go_to_row_col(&mut self, tree: &Tree, cache: &DisplayCache, row: usize, col: usize) {
        self.y = row.min(cache.len().saturating_sub(1));
        self.x = col.min(self.line_length(tree, cache, self.y));
        self.x_intended = self.x;
        self.sync_intended(cache);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use treenote_doc::Node;

    fn two_line_doc() -> (Arena, Tree, DisplayCache) {
        let mut arena = Arena::new();
        let mut tree = Tree::new();
        let node = &mut tree.root.children[0];
        let e1 = arena.append(b"hello");
        node.content.insert_str(&arena, 0, 0, e1, false);
        node.content.make_line_break(&arena, 0, node.content.line_length(0));
        let e2 = arena.append(b"world");
        node.content.insert_str(&arena, 1, 0, e2, false);
        let cache = DisplayCache::rebuild(&tree);
        (arena, tree, cache)
    }

    #[test]
    fn mv_right_wraps_to_next_line() {
        let (_arena, tree, cache) = two_line_doc();
        let mut cur = Cursor::new();
        cur.mv_right(&tree, &cache, 5);
        assert_eq!((cur.y, cur.x), (0, 5));
        cur.mv_right(&tree, &cache, 1);
        assert_eq!((cur.y, cur.x), (1, 0));
    }

    #[test]
    fn mv_left_wraps_to_previous_line_end() {
        let (_arena, tree, cache) = two_line_doc();
        let mut cur = Cursor::new();
        cur.y = 1;
        cur.x = 0;
        cur.mv_left(&tree, &cache, 1);
        assert_eq!((cur.y, cur.x), (0, 5));
    }

    #[test]
    fn mv_down_clamps_x_to_intended() {
        let (_arena, tree, cache) = two_line_doc();
        let mut cur = Cursor::new();
        cur.x = 5;
        cur.x_intended = 5;
        cur.mv_down(&tree, &cache, 1);
        assert_eq!((cur.y, cur.x), (1, 5));
    }

    #[test]
    fn word_forward_crosses_line_boundary() {
        let (arena, tree, cache) = two_line_doc();
        let mut cur = Cursor::new();
        cur.word_forward(&arena, &tree, &cache);
        assert_eq!((cur.y, cur.x), (1, 0));
    }

    #[test]
    fn save_restore_round_trip() {
        let (_arena, tree, cache) = two_line_doc();
        let mut cur = Cursor::new();
        cur.mv_right(&tree, &cache, 3);
        let snap = cur.save();
        cur.mv_right(&tree, &cache, 2);
        cur.restore(snap, &tree, &cache);
        assert_eq!((cur.y, cur.x), (0, 3));
    }

    #[test]
    fn nd_parent_refused_at_depth_one() {
        let mut tree = Tree::new();
        tree.root.children[0].children.push(Node::new());
        let cache = DisplayCache::rebuild(&tree);
        let mut cur = Cursor::new();
        cur.y = 0;
        cur.sync_intended(&cache);
        cur.nd_parent(&cache);
        assert_eq!(cur.y, 0);
    }

    #[test]
    fn nd_child_then_parent_round_trips() {
        let mut tree = Tree::new();
        tree.root.children[0].children.push(Node::new());
        let cache = DisplayCache::rebuild(&tree);
        let mut cur = Cursor::new();
        cur.sync_intended(&cache);
        cur.nd_child(&tree, &cache);
        assert_eq!(cur.y, 1);
        cur.nd_parent(&cache);
        assert_eq!(cur.y, 0);
    }
}
