//! Document lifecycle: load, save, and the best-effort autosave snapshot
//! (`spec.md` §5/§6, `SPEC_FULL.md` §5). Grounded on the teacher's
//! `core-actions::io_ops` split between an `open_file`/`write_file` pair and
//! a caller that owns the resulting state transition.

use crate::status::FileStatus;
use crate::Editor;
use std::path::{Path, PathBuf};
use treenote_doc::Document;
use treenote_text::Arena;
use treenote_view::ViewState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub node_count: usize,
    pub row_count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveStats {
    pub bytes_written: usize,
}

fn count_nodes(node: &treenote_doc::Node) -> usize {
    node.children.iter().map(|c| 1 + count_nodes(c)).sum()
}

impl Editor {
    /// Loads `path` as tree-drawing text, replacing the current document.
    /// `does_not_exist` and the other status variants are benign for the
    /// host to report; nothing here panics on a missing or unreadable file.
    pub fn load_file(&mut self, path: &Path) -> (FileStatus, LoadStats) {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                let status = FileStatus::from_read_error(&err, path);
                tracing::warn!(target: "host.io", path = %path.display(), ?status, "load_failed");
                return (status, LoadStats::default());
            }
        };
        let title = path.file_name().and_then(|s| s.to_str());
        let mut arena = Arena::with_block_size(self.config.arena.block_size);
        let tree = treenote_doc::parse(&mut arena, &text, title, self.config.history.piece_table_max);
        let node_count = count_nodes(&tree.root);
        self.document = Document::from_parts(arena, tree, self.config.history.document_max);
        self.view = ViewState::new(&self.document.tree);
        self.path = Some(path.to_path_buf());
        self.active = None;
        self.document.mark_saved();
        tracing::info!(target: "host.io", path = %path.display(), node_count, "loaded");
        (
            FileStatus::None,
            LoadStats {
                node_count,
                row_count: self.view.cache.len(),
            },
        )
    }

    /// Serializes and writes the document to `path` (or the path it was
    /// loaded from, if `path` is `None`), becoming the new save-point.
    pub fn save_file(&mut self, path: Option<&Path>) -> (FileStatus, SaveStats) {
        let target = match path.map(Path::to_path_buf).or_else(|| self.path.clone()) {
            Some(p) => p,
            None => return (FileStatus::DoesNotExist, SaveStats::default()),
        };
        let text = self.document.to_text();
        match std::fs::write(&target, text.as_bytes()) {
            Ok(()) => {
                self.document.mark_saved();
                self.path = Some(target.clone());
                tracing::info!(target: "host.io", path = %target.display(), bytes = text.len(), "saved");
                (FileStatus::None, SaveStats { bytes_written: text.len() })
            }
            Err(err) => {
                let status = FileStatus::from_write_error(&err, &target);
                tracing::warn!(target: "host.io", path = %target.display(), ?status, "save_failed");
                (status, SaveStats::default())
            }
        }
    }

    /// Writes a best-effort snapshot to `dir`, resolving conflicts with a
    /// numeric suffix up to `config.autosave.max_suffix` (`SPEC_FULL.md`
    /// §5, grounded on `original_source/src/treenote_tui/window.cpp`'s
    /// autosave conflict loop).
    pub fn save_to_tmp(&self, dir: &Path) -> FileStatus {
        let pid = std::process::id();
        let base = dir.join(format!("treenote.{pid}.save"));
        let candidates = std::iter::once(base).chain((0..self.config.autosave.max_suffix).map(|n| dir.join(format!("treenote.{pid}.save.{n}"))));
        let text = self.document.to_text();
        for candidate in candidates {
            match try_create(&candidate, text.as_bytes()) {
                Ok(()) => {
                    tracing::info!(target: "host.io", path = %candidate.display(), "autosaved");
                    return FileStatus::None;
                }
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(err) => {
                    let status = FileStatus::from_write_error(&err, &candidate);
                    tracing::warn!(target: "host.io", path = %candidate.display(), ?status, "autosave_failed");
                    return status;
                }
            }
        }
        tracing::warn!(target: "host.io", dir = %dir.display(), "autosave_exhausted_suffixes");
        FileStatus::IsUnwritable
    }
}

fn try_create(path: &PathBuf, bytes: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    let mut f = std::fs::OpenOptions::new().write(true).create_new(true).open(path)?;
    f.write_all(bytes)
}
