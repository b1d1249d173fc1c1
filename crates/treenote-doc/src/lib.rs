//! The document layer: the node tree (D), the document-level command
//! stack (E), and on-disk parse/serialize (I), composed into a single
//! [`Document`] aggregate that the editor facade drives.

pub mod error;
pub mod format;
pub mod history;
pub mod ops;
pub mod tree;

pub use error::TreeNoteError;
pub use format::{parse, serialize, title};
pub use history::{CursorSnapshot, DocumentCommand, DocumentHistory};
pub use tree::{Node, Tree, TreeIndex};

use treenote_text::Arena;

/// A loaded or in-progress note document: the shared content arena, the
/// node tree, its command history, and the single-slot clipboard used by
/// cut/copy/paste.
pub struct Document {
    pub arena: Arena,
    pub tree: Tree,
    pub history: DocumentHistory,
    clipboard: Option<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            tree: Tree::new(),
            history: DocumentHistory::new(),
            clipboard: None,
        }
    }

    pub fn with_history_bound(max_hist: usize) -> Self {
        Self {
            arena: Arena::new(),
            tree: Tree::new(),
            history: DocumentHistory::with_max_hist(max_hist),
            clipboard: None,
        }
    }

    /// Assembles a document from already-built parts, for callers (the
    /// editor facade) that need to control the arena's block size or the
    /// history bound, e.g. from `treenote-config`.
    pub fn from_parts(arena: Arena, tree: Tree, max_hist: usize) -> Self {
        Self {
            arena,
            tree,
            history: DocumentHistory::with_max_hist(max_hist),
            clipboard: None,
        }
    }

    pub fn modified(&self) -> bool {
        self.history.modified()
    }

    pub fn mark_saved(&mut self) {
        self.history.mark_saved();
    }

    /// Builds a document from on-disk tree-drawing text (`spec.md` §4.9).
    /// `doc_title`, when given, becomes the root's content line 0.
    pub fn from_text(text: &str, doc_title: Option<&str>) -> Self {
        let mut arena = Arena::new();
        let tree = format::parse(&mut arena, text, doc_title, treenote_text::DEFAULT_MAX_HIST);
        Self::from_parts(arena, tree, history::DEFAULT_MAX_HIST)
    }

    pub fn to_text(&self) -> String {
        format::serialize(&self.arena, &self.tree)
    }

    pub fn title(&self) -> String {
        format::title(&self.arena, &self.tree)
    }
}
