//! The presentation layer: the flattened display cache (F) and the cursor
//! state machine (G), composed into a [`ViewState`] the editor facade
//! drives after every document mutation.

pub mod cache;
pub mod cursor;

pub use cache::{make_line_string_default, CacheEntry, DisplayCache};
pub use cursor::Cursor;

use treenote_doc::Tree;

/// Display cache plus cursor, rebuilt together on the facade's
/// "rebuild cache → clamp/move cursor" sequence (`spec.md` §4.4/§4.8).
#[derive(Debug, Default)]
pub struct ViewState {
    pub cache: DisplayCache,
    pub cursor: Cursor,
}

impl ViewState {
    pub fn new(tree: &Tree) -> Self {
        Self {
            cache: DisplayCache::rebuild(tree),
            cursor: Cursor::new(),
        }
    }

    /// Rebuilds the cache from `tree` and re-clamps the cursor into it.
    /// Called after any structural or content edit.
    pub fn rebuild(&mut self, tree: &Tree) {
        self.cache = DisplayCache::rebuild(tree);
        self.cursor.clamp(tree, &self.cache);
        tracing::trace!(target: "view.cursor", y = self.cursor.y, x = self.cursor.x, "clamped_after_rebuild");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rebuild_keeps_cursor_in_bounds_after_shrink() {
        let mut tree = Tree::new();
        tree.root.children.push(treenote_doc::Node::new());
        let mut view = ViewState::new(&tree);
        view.cursor.y = 1;
        tree.root.children.pop();
        view.rebuild(&tree);
        assert_eq!(view.cursor.y, 0);
    }
}
