//! The editor facade (`spec.md` §4.8, component H): the host-facing surface
//! that composes the document (`treenote-doc`), the view (`treenote-view`),
//! and configuration (`treenote-config`) into the single object a host
//! drives one user action at a time.
//!
//! Every facade method follows the same sequence (§4.8): compute
//! `cursor_before` → perform the edit, possibly issuing several low-level
//! commands → if anything was recorded, rebuild the cache → clamp/move the
//! cursor → save `cursor_after` onto the top of history.

mod io;
mod line_edit;
mod navigation;
mod render;
mod status;
mod tree_edit;

pub use io::{LoadStats, SaveStats};
pub use status::FileStatus;

use anyhow::Context;
use std::path::{Path, PathBuf};
use treenote_config::Config;
use treenote_doc::{CursorSnapshot, Document, TreeIndex};
use treenote_text::{Arena, EditKind};
use treenote_view::ViewState;

/// Design notes (`spec.md` §9) replace the source's module-scoped
/// "currently-editing" compaction token with state the facade owns: the
/// node last touched by a text edit, the kind of edit, and the `(line,
/// pos)` it landed on. Any navigation, undo/redo, or structural operation
/// clears it, so a later edit at the same spot never falsely compacts
/// across an intervening move.
struct ActiveEdit {
    node: TreeIndex,
    kind: EditKind,
    line: usize,
    pos: usize,
}

/// The document, its presentation state, and the effective configuration,
/// composed into the API a host drives (`spec.md` §6).
pub struct Editor {
    pub document: Document,
    pub view: ViewState,
    pub config: Config,
    path: Option<PathBuf>,
    active: Option<ActiveEdit>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::make_empty()
    }
}

impl Editor {
    /// A fresh, untitled document with default configuration.
    pub fn make_empty() -> Self {
        Self::with_config(Config::default())
    }

    /// A fresh, untitled document built from an already-loaded configuration
    /// (arena block size, history bounds).
    pub fn with_config(config: Config) -> Self {
        let arena = Arena::with_block_size(config.arena.block_size);
        let tree = treenote_doc::Tree::with_piece_max_hist(config.history.piece_table_max);
        let document = Document::from_parts(arena, tree, config.history.document_max);
        let view = ViewState::new(&document.tree);
        Self {
            document,
            view,
            config,
            path: None,
            active: None,
        }
    }

    /// Loads `path`'s configuration from a sibling `treenote.toml`, falling
    /// back to defaults, then builds an empty editor from it.
    pub fn make_empty_with_config_dir(dir: &Path) -> Self {
        let config = Config::load_from(&dir.join("treenote.toml"));
        Self::with_config(config)
    }

    /// Strict counterpart to [`Self::make_empty_with_config_dir`] for hosts
    /// that pass an explicit `--config` path and want a hard failure instead
    /// of silent fallback when it is missing or malformed (`treenote-config`'s
    /// `try_load_from`; the boundary error split `SPEC_FULL.md` §3.2 assigns
    /// to `anyhow` rather than the internal `TreeNoteError` enum).
    pub fn try_with_config_file(path: &Path) -> anyhow::Result<Self> {
        let config = Config::try_load_from(path)
            .with_context(|| format!("failed to load config {}", path.display()))?;
        Ok(Self::with_config(config))
    }

    pub fn modified(&self) -> bool {
        self.document.modified()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn title(&self) -> String {
        self.document.title()
    }

    /// Discards the in-memory document and returns the editor to a fresh,
    /// untitled state. The host is responsible for prompting about unsaved
    /// changes before calling this; the facade does not gate it.
    pub fn close_file(&mut self) {
        let config = self.config.clone();
        *self = Self::with_config(config);
        tracing::trace!(target: "editor.facade", "closed");
    }

    fn current_index(&self) -> Option<TreeIndex> {
        self.view.cache.row(self.view.cursor.y).map(|e| e.index.clone())
    }

    fn current_line(&self) -> usize {
        self.view.cache.row(self.view.cursor.y).map(|e| e.line_no).unwrap_or(0)
    }

    fn cursor_before(&self) -> CursorSnapshot {
        self.view.cursor.save()
    }

    /// `true` when the last text edit landed at exactly `(node, kind, line,
    /// pos)`, i.e. the next edit at this spot should compact into it.
    fn compacts(&self, node: &TreeIndex, kind: EditKind, line: usize, pos: usize) -> bool {
        self.active
            .as_ref()
            .map(|a| a.node == *node && a.kind == kind && a.line == line && a.pos == pos)
            .unwrap_or(false)
    }

    fn set_active(&mut self, node: TreeIndex, kind: EditKind, line: usize, pos: usize) {
        self.active = Some(ActiveEdit { node, kind, line, pos });
    }

    /// Releases the compaction token. Called after every navigation,
    /// undo/redo, and structural (tree) operation (`spec.md` §9).
    fn release_active(&mut self) {
        self.active = None;
    }

    /// Rebuilds the cache and clamps the cursor into it; the shared tail of
    /// every facade operation (§4.8).
    fn after_mutation(&mut self) {
        self.view.rebuild(&self.document.tree);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn make_empty_has_one_empty_row() {
        let editor = Editor::make_empty();
        assert_eq!(editor.view.cache.len(), 1);
        assert!(!editor.modified());
    }

    #[test]
    fn close_file_resets_to_untitled() {
        let mut editor = Editor::make_empty();
        editor.line_insert_text("hello");
        assert!(editor.modified());
        editor.close_file();
        assert!(!editor.modified());
        assert_eq!(editor.view.cache.len(), 1);
    }
}
