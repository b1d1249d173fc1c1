//! Rendering support (`spec.md` §6): thin delegations to the display
//! cache so a host never has to reach past the facade into `treenote-view`
//! or `treenote-doc` directly.

pub use treenote_view::make_line_string_default;

use crate::Editor;
use treenote_view::CacheEntry;

impl Editor {
    pub fn get_lc_range(&self, row: usize, count: usize) -> &[CacheEntry] {
        self.view.cache.get_lc_range(row, count)
    }

    pub fn get_entry_prefix(&self, y: usize) -> String {
        self.view.cache.get_entry_prefix(&self.document.tree, y)
    }

    pub fn get_entry_prefix_length(&self, y: usize) -> usize {
        self.view.cache.get_entry_prefix_length(&self.document.tree, y)
    }

    pub fn get_entry_content(&self, y: usize, begin: usize, len: usize) -> String {
        self.view.cache.get_entry_content(&self.document.tree, &self.document.arena, y, begin, len)
    }

    pub fn get_entry_line_length(&self, y: usize) -> usize {
        self.view.cache.entry_line_length(&self.document.tree, y)
    }

    pub fn row_count(&self) -> usize {
        self.view.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Editor;
    use pretty_assertions::assert_eq;

    #[test]
    fn entry_prefix_marks_the_only_child_as_last() {
        let editor = Editor::make_empty();
        assert_eq!(editor.get_entry_prefix(0), "└── ");
    }

    #[test]
    fn entry_content_reads_back_inserted_text() {
        let mut editor = Editor::make_empty();
        editor.line_insert_text("abc");
        assert_eq!(editor.get_entry_content(0, 0, 3), "abc");
        assert_eq!(editor.get_entry_line_length(0), 3);
    }
}
