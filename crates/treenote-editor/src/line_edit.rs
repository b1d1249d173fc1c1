//! Per-node line editing (`spec.md` §4.3/§6): the facade drives a single
//! node's piece table directly, one keystroke or word-sized edit at a
//! time, and folds the low-level table commands it produces into the
//! document history as they land.
//!
//! Line edits never merge across tree-node boundaries; `make_line_break`
//! and `make_line_join` only ever touch lines within the node the cursor
//! is already on (`spec.md` §9: line ops are strictly per-piece-table).

use crate::Editor;
use treenote_doc::{Document, DocumentCommand, TreeIndex};
use treenote_text::EditKind;

/// Only space and tab are non-word characters, mirroring
/// `treenote_view::Cursor`'s own rule (not exported, so duplicated here)
/// rather than guessing at a richer definition the source never settled on.
fn is_word_constituent(c: char) -> bool {
    c != ' ' && c != '\t'
}

/// Folds one more produced table command into the document history: the
/// first becomes a plain `EditContents`, every later one in the same call
/// folds into a `Multi` via `append_multi`, the same mechanism composite
/// tree operations use (`treenote_doc::ops`).
fn record(history: &mut treenote_doc::DocumentHistory, tree: &mut treenote_doc::Tree, at: &TreeIndex, cursor_before: treenote_doc::CursorSnapshot, first: &mut bool) {
    if *first {
        history.exec(tree, DocumentCommand::EditContents { at: at.clone() }, cursor_before);
        *first = false;
    } else {
        history.append_multi(tree, DocumentCommand::EditContents { at: at.clone() });
    }
}

impl Editor {
    /// Inserts `text` at the cursor as a single run (`spec.md` §6
    /// `line_insert_text`). Returns `0`; insertion at a valid cursor
    /// position never refuses.
    pub fn line_insert_text(&mut self, text: &str) -> i32 {
        if text.is_empty() {
            return 0;
        }
        let idx = match self.current_index() {
            Some(idx) => idx,
            None => return 1,
        };
        let line = self.current_line();
        let pos = self.view.cursor.x;
        let cursor_before = self.cursor_before();
        let compact = self.compacts(&idx, EditKind::Insertion, line, pos);

        let chars = text.chars().count();
        {
            let Document { tree, arena, history, .. } = &mut self.document;
            let entry = arena.append(text.as_bytes());
            let node = match tree.node_at_mut(&idx) {
                Some(n) => n,
                None => return 1,
            };
            let created = node.content.insert_str(arena, line, pos, entry, compact);
            if created {
                history.exec(tree, DocumentCommand::EditContents { at: idx.clone() }, cursor_before);
            }
        }

        self.after_mutation();
        self.view.cursor.go_to(&self.document.tree, &self.view.cache, &idx, line, pos + chars);
        self.document.history.set_cursor_after(self.view.cursor.save());
        self.set_active(idx, EditKind::Insertion, line, pos + chars);
        0
    }

    /// Forward delete (`Delete` key): removes the character under the
    /// cursor, or joins the next line into this one at end-of-line, or
    /// refuses at the node's own end (`spec.md` §6/§9).
    pub fn line_delete_char(&mut self) -> i32 {
        let idx = match self.current_index() {
            Some(idx) => idx,
            None => return 1,
        };
        let line = self.current_line();
        let pos = self.view.cursor.x;
        let cursor_before = self.cursor_before();
        let compact = self.compacts(&idx, EditKind::DeletionAfter, line, pos);

        let performed = {
            let Document { tree, arena, history, .. } = &mut self.document;
            let Some(node) = tree.node_at_mut(&idx) else { return 1 };
            let len = node.content.line_length(line);
            if pos < len {
                let created = node.content.delete_char_current(arena, line, pos, compact);
                if created {
                    history.exec(tree, DocumentCommand::EditContents { at: idx.clone() }, cursor_before);
                }
                true
            } else if line + 1 < node.content.line_count() {
                let created = node.content.make_line_join(line);
                if created {
                    history.exec(tree, DocumentCommand::EditContents { at: idx.clone() }, cursor_before);
                }
                created
            } else {
                false
            }
        };
        if !performed {
            return 1;
        }

        self.after_mutation();
        self.view.cursor.go_to(&self.document.tree, &self.view.cache, &idx, line, pos);
        self.document.history.set_cursor_after(self.view.cursor.save());
        self.set_active(idx, EditKind::DeletionAfter, line, pos);
        0
    }

    /// Backspace: removes the character before the cursor, or joins this
    /// line into the previous one at start-of-line, or refuses at the
    /// node's own start.
    pub fn line_backspace(&mut self) -> i32 {
        let idx = match self.current_index() {
            Some(idx) => idx,
            None => return 1,
        };
        let line = self.current_line();
        let pos = self.view.cursor.x;
        let cursor_before = self.cursor_before();
        let compact = self.compacts(&idx, EditKind::DeletionBefore, line, pos);

        let (performed, new_line, new_pos) = {
            let Document { tree, arena, history, .. } = &mut self.document;
            let Some(node) = tree.node_at_mut(&idx) else { return 1 };
            if pos > 0 {
                let created = node.content.delete_char_before(arena, line, pos, compact);
                if created {
                    history.exec(tree, DocumentCommand::EditContents { at: idx.clone() }, cursor_before);
                }
                (true, line, pos - 1)
            } else if line > 0 {
                let prev_len = node.content.line_length(line - 1);
                let created = node.content.make_line_join(line - 1);
                if created {
                    history.exec(tree, DocumentCommand::EditContents { at: idx.clone() }, cursor_before);
                }
                (created, line - 1, prev_len)
            } else {
                (false, line, pos)
            }
        };
        if !performed {
            return 1;
        }

        self.after_mutation();
        self.view.cursor.go_to(&self.document.tree, &self.view.cache, &idx, new_line, new_pos);
        self.document.history.set_cursor_after(self.view.cursor.save());
        self.set_active(idx, EditKind::DeletionBefore, new_line, new_pos);
        0
    }

    /// Splits the current line at the cursor (`spec.md` §6 `line_newline`).
    pub fn line_newline(&mut self) -> i32 {
        let idx = match self.current_index() {
            Some(idx) => idx,
            None => return 1,
        };
        let line = self.current_line();
        let pos = self.view.cursor.x;
        let cursor_before = self.cursor_before();

        {
            let Document { tree, arena, history, .. } = &mut self.document;
            let Some(node) = tree.node_at_mut(&idx) else { return 1 };
            node.content.make_line_break(arena, line, pos);
            history.exec(tree, DocumentCommand::EditContents { at: idx.clone() }, cursor_before);
        }

        self.after_mutation();
        self.view.cursor.go_to(&self.document.tree, &self.view.cache, &idx, line + 1, 0);
        self.document.history.set_cursor_after(self.view.cursor.save());
        self.release_active();
        0
    }

    /// Deletes forward to the start of the next word, falling through to
    /// exactly one line join at the end of a line within the node
    /// (`spec.md` §9: a documented simplification of the upstream
    /// word-boundary TODO rather than a cross-node merge).
    pub fn line_forward_delete_word(&mut self) -> i32 {
        let idx = match self.current_index() {
            Some(idx) => idx,
            None => return 1,
        };
        let line = self.current_line();
        let pos = self.view.cursor.x;
        let cursor_before = self.cursor_before();

        let mut any = false;
        {
            let Document { tree, arena, history, .. } = &mut self.document;
            let mut first = true;
            let mut prev: Option<char> = None;
            loop {
                let Some(node) = tree.node_at_mut(&idx) else { break };
                let len = node.content.line_length(line);
                if pos >= len {
                    if line + 1 < node.content.line_count() {
                        let created = node.content.make_line_join(line);
                        if created {
                            record(history, tree, &idx, cursor_before, &mut first);
                            any = true;
                        }
                    }
                    break;
                }
                let ch = node.content.to_substr(arena, line, pos, 1).chars().next();
                if let (Some(ch), Some(prev_ch)) = (ch, prev) {
                    if is_word_constituent(ch) && !is_word_constituent(prev_ch) {
                        break;
                    }
                }
                let created = node.content.delete_char_current(arena, line, pos, !first);
                if created {
                    record(history, tree, &idx, cursor_before, &mut first);
                    any = true;
                }
                prev = ch;
                if prev.is_none() {
                    break;
                }
            }
        }
        if !any {
            return 1;
        }

        self.after_mutation();
        self.view.cursor.go_to(&self.document.tree, &self.view.cache, &idx, line, pos);
        self.document.history.set_cursor_after(self.view.cursor.save());
        self.release_active();
        0
    }

    /// Symmetric to [`Self::line_forward_delete_word`]: deletes backward
    /// past the current word to just after the previous one.
    pub fn line_backward_delete_word(&mut self) -> i32 {
        let idx = match self.current_index() {
            Some(idx) => idx,
            None => return 1,
        };
        let line = self.current_line();
        let pos = self.view.cursor.x;
        let cursor_before = self.cursor_before();

        let mut any = false;
        let mut final_line = line;
        let mut final_pos = pos;
        {
            let Document { tree, arena, history, .. } = &mut self.document;
            let mut first = true;
            let mut prev: Option<char> = None;
            loop {
                let Some(node) = tree.node_at_mut(&idx) else { break };
                if final_pos == 0 {
                    if final_line > 0 {
                        let prev_len = node.content.line_length(final_line - 1);
                        let created = node.content.make_line_join(final_line - 1);
                        if created {
                            record(history, tree, &idx, cursor_before, &mut first);
                            any = true;
                        }
                        final_line -= 1;
                        final_pos = prev_len;
                    }
                    break;
                }
                let ch = node.content.to_substr(arena, final_line, final_pos - 1, 1).chars().next();
                if let (Some(ch), Some(prev_ch)) = (ch, prev) {
                    if is_word_constituent(ch) && !is_word_constituent(prev_ch) {
                        break;
                    }
                }
                let created = node.content.delete_char_before(arena, final_line, final_pos, !first);
                if created {
                    record(history, tree, &idx, cursor_before, &mut first);
                    any = true;
                }
                final_pos -= 1;
                prev = ch;
                if prev.is_none() {
                    break;
                }
            }
        }
        if !any {
            return 1;
        }

        self.after_mutation();
        self.view.cursor.go_to(&self.document.tree, &self.view.cache, &idx, final_line, final_pos);
        self.document.history.set_cursor_after(self.view.cursor.save());
        self.release_active();
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn successive_inserts_compact_into_one_undo_step() {
        let mut editor = Editor::make_empty();
        editor.line_insert_text("h");
        editor.line_insert_text("i");
        assert_eq!(editor.document.to_text(), "hi\n");
        assert_eq!(editor.document.history.len(), 1);
        editor.undo();
        assert_eq!(editor.document.to_text(), "\n");
    }

    #[test]
    fn delete_char_refuses_at_node_end() {
        let mut editor = Editor::make_empty();
        assert_eq!(editor.line_delete_char(), 1);
    }

    #[test]
    fn backspace_refuses_at_node_start() {
        let mut editor = Editor::make_empty();
        assert_eq!(editor.line_backspace(), 1);
    }

    #[test]
    fn newline_splits_current_line() {
        let mut editor = Editor::make_empty();
        editor.line_insert_text("ab");
        editor.cursor_mv_left(1);
        editor.line_newline();
        assert_eq!(editor.document.to_text(), "a\nb\n");
        assert_eq!((editor.view.cursor.y, editor.view.cursor.x), (1, 0));
    }

    #[test]
    fn forward_delete_word_stops_before_next_word() {
        let mut editor = Editor::make_empty();
        editor.line_insert_text("foo bar");
        editor.cursor_to_sol();
        editor.line_forward_delete_word();
        assert_eq!(editor.document.to_text(), "bar\n");
    }

    #[test]
    fn backward_delete_word_removes_trailing_word() {
        let mut editor = Editor::make_empty();
        editor.line_insert_text("foo bar");
        editor.line_backward_delete_word();
        assert_eq!(editor.document.to_text(), "foo \n");
    }
}
