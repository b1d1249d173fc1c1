//! Cursor movement and undo/redo (`spec.md` §4.7/§6). Every method here
//! releases the active-edit compaction token (`spec.md` §9): once the
//! cursor moves, or history is rewound, a later text edit at the same spot
//! must start a fresh undo entry rather than silently merge into the old one.

use crate::Editor;
use treenote_doc::TreeIndex;

impl Editor {
    pub fn cursor_mv_left(&mut self, amt: usize) {
        self.view.cursor.mv_left(&self.document.tree, &self.view.cache, amt);
        self.release_active();
    }

    pub fn cursor_mv_right(&mut self, amt: usize) {
        self.view.cursor.mv_right(&self.document.tree, &self.view.cache, amt);
        self.release_active();
    }

    pub fn cursor_mv_up(&mut self, amt: usize) {
        self.view.cursor.mv_up(&self.document.tree, &self.view.cache, amt);
        self.release_active();
    }

    pub fn cursor_mv_down(&mut self, amt: usize) {
        self.view.cursor.mv_down(&self.document.tree, &self.view.cache, amt);
        self.release_active();
    }

    pub fn cursor_wd_forward(&mut self) {
        self.view.cursor.word_forward(&self.document.arena, &self.document.tree, &self.view.cache);
        self.release_active();
    }

    pub fn cursor_wd_backward(&mut self) {
        self.view.cursor.word_backward(&self.document.arena, &self.document.tree, &self.view.cache);
        self.release_active();
    }

    pub fn cursor_to_sof(&mut self) {
        self.view.cursor.to_sof(&self.view.cache);
        self.release_active();
    }

    pub fn cursor_to_eof(&mut self) {
        self.view.cursor.to_eof(&self.document.tree, &self.view.cache);
        self.release_active();
    }

    pub fn cursor_to_sol(&mut self) {
        self.view.cursor.to_sol(&self.view.cache);
        self.release_active();
    }

    pub fn cursor_to_eol(&mut self) {
        self.view.cursor.to_eol(&self.document.tree, &self.view.cache);
        self.release_active();
    }

    pub fn cursor_nd_parent(&mut self) {
        self.view.cursor.nd_parent(&self.view.cache);
        self.release_active();
    }

    pub fn cursor_nd_child(&mut self) {
        self.view.cursor.nd_child(&self.document.tree, &self.view.cache);
        self.release_active();
    }

    pub fn cursor_nd_prev(&mut self) {
        self.view.cursor.nd_prev(&self.view.cache);
        self.release_active();
    }

    pub fn cursor_nd_next(&mut self) {
        self.view.cursor.nd_next(&self.view.cache);
        self.release_active();
    }

    pub fn cursor_go_to(&mut self, index: &TreeIndex, line: usize, col: usize) {
        self.view.cursor.go_to(&self.document.tree, &self.view.cache, index, line, col);
        self.release_active();
    }

    pub fn cursor_go_to_row_col(&mut self, row: usize, col: usize) {
        self.view.cursor.go_to_row_col(&self.document.tree, &self.view.cache, row, col);
        self.release_active();
    }

    /// Undoes the command on top of history, if any, restoring the cursor
    /// to where it sat before that command was issued. Returns the name of
    /// the command undone, or `None` if history is empty.
    pub fn undo(&mut self) -> Option<&'static str> {
        let name = self.document.history.get_current_cmd_name();
        if let Some(snap) = self.document.history.undo(&mut self.document.tree) {
            self.after_mutation();
            self.view.cursor.restore(snap, &self.document.tree, &self.view.cache);
        }
        self.release_active();
        name
    }

    /// Re-applies the next command in history, if any.
    pub fn redo(&mut self) -> Option<&'static str> {
        if let Some(snap) = self.document.history.redo(&mut self.document.tree) {
            self.after_mutation();
            self.view.cursor.restore(snap, &self.document.tree, &self.view.cache);
            self.release_active();
            return self.document.history.get_current_cmd_name();
        }
        self.release_active();
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::Editor;

    #[test]
    fn undo_restores_cursor_and_text() {
        let mut editor = Editor::make_empty();
        editor.line_insert_text("hi");
        assert_eq!(editor.document.to_text(), "hi\n");
        editor.undo();
        assert_eq!(editor.document.to_text(), "\n");
        editor.redo();
        assert_eq!(editor.document.to_text(), "hi\n");
    }

    #[test]
    fn navigation_releases_active_token() {
        let mut editor = Editor::make_empty();
        editor.line_insert_text("a");
        assert!(editor.active.is_some());
        editor.cursor_mv_left(1);
        assert!(editor.active.is_none());
    }
}
