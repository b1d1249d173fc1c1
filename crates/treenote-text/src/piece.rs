//! Piece table: a per-node, multi-line view over the shared [`Arena`], with
//! its own reversible command history and adjacency-based compaction.

use crate::arena::{Arena, Entry};
use crate::utf8;

/// One line's worth of entries. Concatenating their arena byte ranges
/// yields the line's rendered content.
pub type PieceLine = Vec<Entry>;

/// Which kind of high-level edit last touched a piece table, used both for
/// the command's user-facing label and for compaction decisions made by the
/// owning facade (see the design notes: compaction context lives with the
/// caller, not in module-scoped state).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Insertion,
    DeletionBefore,
    DeletionAfter,
    LineBreak,
    LineJoin,
}

/// Reversible low-level command atom (`spec.md` §4.3). Every variant stores
/// enough information to invert itself without consulting the arena again;
/// `merge_pos` fields are mutated in place across undo/redo cycles as
/// neighbors merge and un-merge.
#[derive(Debug, Clone)]
pub enum TableCommand {
    SplitInsert {
        line: usize,
        idx: usize,
        left: Entry,
        entry: Entry,
        right: Entry,
    },
    SplitDelete {
        line: usize,
        idx: usize,
        left: Entry,
        right: Entry,
        orig: Entry,
    },
    GrowRhs {
        line: usize,
        idx: usize,
        disp: usize,
        bytes: usize,
    },
    ShrinkRhs {
        line: usize,
        idx: usize,
        disp: usize,
        bytes: usize,
    },
    ShrinkLhs {
        line: usize,
        idx: usize,
        disp: usize,
        bytes: usize,
    },
    InsertEntry {
        line: usize,
        idx: usize,
        entry: Entry,
        merge_pos: Option<(usize, usize)>,
    },
    DeleteEntry {
        line: usize,
        idx: usize,
        entry: Entry,
        merge_pos: Option<(usize, usize)>,
    },
    LineBreak {
        line: usize,
        left: PieceLine,
        right: PieceLine,
    },
    LineJoin {
        line: usize,
        upper: PieceLine,
        lower: PieceLine,
    },
    Multi(Vec<TableCommand>),
}

fn remove_and_merge(line: &mut PieceLine, idx: usize) -> (Entry, Option<(usize, usize)>) {
    let removed = line.remove(idx);
    if idx > 0 && idx < line.len() {
        let l = line[idx - 1];
        let r = line[idx];
        if l.end() == r.start {
            let merge_pos = (l.disp_len, l.byte_len);
            line[idx - 1] = Entry::new(l.start, l.disp_len + r.disp_len, l.byte_len + r.byte_len);
            line.remove(idx);
            return (removed, Some(merge_pos));
        }
    }
    (removed, None)
}

fn unmerge_and_insert(
    line: &mut PieceLine,
    idx: usize,
    entry: Entry,
    merge_pos: Option<(usize, usize)>,
) {
    if let Some((dchars, dbytes)) = merge_pos {
        let merged = line[idx - 1];
        let left = Entry::new(merged.start, dchars, dbytes);
        let right = Entry::new(
            merged.start + dbytes,
            merged.disp_len - dchars,
            merged.byte_len - dbytes,
        );
        line.splice(idx - 1..idx, [left, right]);
    }
    line.insert(idx, entry);
}

/// Concatenate two pieces of a line produced by a prior split, merging the
/// boundary entries back into one if they are still arena-adjacent.
fn merge_lines(mut left: PieceLine, right: PieceLine) -> PieceLine {
    if let (Some(l), Some(r)) = (left.last().copied(), right.first()) {
        if l.end() == r.start {
            let merged = Entry::new(l.start, l.disp_len + r.disp_len, l.byte_len + r.byte_len);
            left.pop();
            left.push(merged);
            left.extend(right.into_iter().skip(1));
            return left;
        }
    }
    left.extend(right);
    left
}

impl TableCommand {
    fn apply(&mut self, lines: &mut Vec<PieceLine>) {
        match self {
            TableCommand::SplitInsert {
                line,
                idx,
                left,
                entry,
                right,
            } => {
                lines[*line].splice(*idx..=*idx, [*left, *entry, *right]);
            }
            TableCommand::SplitDelete {
                line, idx, left, right, ..
            } => {
                lines[*line].splice(*idx..=*idx, [*left, *right]);
            }
            TableCommand::GrowRhs {
                line,
                idx,
                disp,
                bytes,
            } => {
                let e = &mut lines[*line][*idx];
                e.disp_len += *disp;
                e.byte_len += *bytes;
            }
            TableCommand::ShrinkRhs {
                line,
                idx,
                disp,
                bytes,
            } => {
                let e = &mut lines[*line][*idx];
                e.disp_len -= *disp;
                e.byte_len -= *bytes;
            }
            TableCommand::ShrinkLhs {
                line,
                idx,
                disp,
                bytes,
            } => {
                let e = &mut lines[*line][*idx];
                e.start += *bytes;
                e.disp_len -= *disp;
                e.byte_len -= *bytes;
            }
            TableCommand::InsertEntry {
                line,
                idx,
                entry,
                merge_pos,
            } => {
                unmerge_and_insert(&mut lines[*line], *idx, *entry, *merge_pos);
            }
            TableCommand::DeleteEntry {
                line, idx, merge_pos, ..
            } => {
                let (_, new_merge_pos) = remove_and_merge(&mut lines[*line], *idx);
                *merge_pos = new_merge_pos;
            }
            TableCommand::LineBreak { line, left, right } => {
                lines[*line] = left.clone();
                lines.insert(*line + 1, right.clone());
            }
            TableCommand::LineJoin { line, upper, lower } => {
                lines[*line] = merge_lines(upper.clone(), lower.clone());
                lines.remove(*line + 1);
            }
            TableCommand::Multi(cmds) => {
                for c in cmds.iter_mut() {
                    c.apply(lines);
                }
            }
        }
    }

    fn invert(&mut self, lines: &mut Vec<PieceLine>) {
        match self {
            TableCommand::SplitInsert {
                line, idx, left, right, ..
            } => {
                let orig = Entry::new(left.start, left.disp_len + right.disp_len, left.byte_len + right.byte_len);
                lines[*line].splice(*idx..*idx + 3, [orig]);
            }
            TableCommand::SplitDelete { line, idx, orig, .. } => {
                lines[*line].splice(*idx..*idx + 2, [*orig]);
            }
            TableCommand::GrowRhs {
                line,
                idx,
                disp,
                bytes,
            } => {
                let e = &mut lines[*line][*idx];
                e.disp_len -= *disp;
                e.byte_len -= *bytes;
            }
            TableCommand::ShrinkRhs {
                line,
                idx,
                disp,
                bytes,
            } => {
                let e = &mut lines[*line][*idx];
                e.disp_len += *disp;
                e.byte_len += *bytes;
            }
            TableCommand::ShrinkLhs {
                line,
                idx,
                disp,
                bytes,
            } => {
                let e = &mut lines[*line][*idx];
                e.start -= *bytes;
                e.disp_len += *disp;
                e.byte_len += *bytes;
            }
            TableCommand::InsertEntry { line, idx, merge_pos, .. } => {
                let (_, new_merge_pos) = remove_and_merge(&mut lines[*line], *idx);
                *merge_pos = new_merge_pos;
            }
            TableCommand::DeleteEntry {
                line,
                idx,
                entry,
                merge_pos,
            } => {
                unmerge_and_insert(&mut lines[*line], *idx, *entry, *merge_pos);
            }
            TableCommand::LineBreak { line, left, right } => {
                lines[*line] = merge_lines(left.clone(), right.clone());
                lines.remove(*line + 1);
            }
            TableCommand::LineJoin { line, upper, lower } => {
                lines[*line] = upper.clone();
                lines.insert(*line + 1, lower.clone());
            }
            TableCommand::Multi(cmds) => {
                for c in cmds.iter_mut().rev() {
                    c.invert(lines);
                }
            }
        }
    }

    /// User-facing command name, descending once into `Multi` per `spec.md` §4.3.
    fn display_name(&self) -> &'static str {
        match self {
            TableCommand::SplitInsert { .. }
            | TableCommand::GrowRhs { .. }
            | TableCommand::InsertEntry { .. } => "insert_text",
            TableCommand::SplitDelete { .. }
            | TableCommand::ShrinkRhs { .. }
            | TableCommand::ShrinkLhs { .. }
            | TableCommand::DeleteEntry { .. } => "delete_text",
            TableCommand::LineBreak { .. } => "line_break",
            TableCommand::LineJoin { .. } => "line_join",
            TableCommand::Multi(cmds) => cmds.first().map(|c| c.display_name()).unwrap_or("multi"),
        }
    }
}

/// Maximum number of commands retained per piece-table history before the
/// oldest half is discarded. Overridable via `treenote-config`.
pub const DEFAULT_MAX_HIST: usize = 1000;

/// Locates, in character coordinates, which entry a position falls in.
/// Returns `(idx, offset)` where `offset == 0` means `pos` lands exactly on
/// the boundary before `entries[idx]` (or `idx == entries.len()` at
/// end-of-line), and `offset > 0` means `pos` is interior to `entries[idx]`.
fn locate(entries: &[Entry], pos: usize) -> (usize, usize) {
    let mut acc = 0usize;
    for (i, e) in entries.iter().enumerate() {
        if pos < acc + e.disp_len {
            return (i, pos - acc);
        }
        acc += e.disp_len;
    }
    (entries.len(), 0)
}

fn split_entry(arena: &Arena, e: Entry, char_offset: usize) -> (Entry, Entry) {
    if char_offset == 0 {
        return (Entry::empty_at(e.start), e);
    }
    if char_offset == e.disp_len {
        return (e, Entry::empty_at(e.end()));
    }
    if e.is_ascii_fast() {
        let left = Entry::new(e.start, char_offset, char_offset);
        let right = Entry::new(e.start + char_offset, e.disp_len - char_offset, e.byte_len - char_offset);
        return (left, right);
    }
    let whole = arena.bytes_owned(e.start, e.byte_len);
    let mut byte_off = 0usize;
    let mut chars_seen = 0usize;
    while chars_seen < char_offset {
        let (_, consumed) = utf8::next_char(&whole[byte_off..]);
        byte_off += consumed.max(1);
        chars_seen += 1;
    }
    let left = Entry::new(e.start, char_offset, byte_off);
    let right = Entry::new(e.start + byte_off, e.disp_len - char_offset, e.byte_len - byte_off);
    (left, right)
}

/// Per-node multi-line piece table with its own undo/redo history.
pub struct PieceTable {
    lines: Vec<PieceLine>,
    history: Vec<TableCommand>,
    position: usize,
    max_hist: usize,
}

impl Default for PieceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceTable {
    pub fn new() -> Self {
        Self::with_max_hist(DEFAULT_MAX_HIST)
    }

    pub fn with_max_hist(max_hist: usize) -> Self {
        Self {
            lines: vec![PieceLine::new()],
            history: Vec::new(),
            position: 0,
            max_hist,
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line_length(&self, line: usize) -> usize {
        self.lines
            .get(line)
            .map(|l| l.iter().map(|e| e.disp_len).sum())
            .unwrap_or(0)
    }

    pub fn entries(&self, line: usize) -> &[Entry] {
        &self.lines[line]
    }

    pub fn to_str(&self, arena: &Arena, line: usize) -> String {
        arena.render(&self.lines[line])
    }

    pub fn to_substr(&self, arena: &Arena, line: usize, pos: usize, len: usize) -> String {
        arena.render_range(&self.lines[line], pos, len)
    }

    fn clamp_line(&self, line: usize) -> usize {
        line.min(self.lines.len() - 1)
    }

    fn exec(&mut self, cmd: TableCommand) {
        if self.position < self.history.len() {
            self.history.truncate(self.position);
            tracing::trace!(target: "text.piece", position = self.position, "history_truncated");
        }
        self.history.push(cmd);
        self.history
            .last_mut()
            .unwrap()
            .apply(&mut self.lines);
        self.position = self.history.len();
        if self.history.len() == self.max_hist {
            let half = self.max_hist / 2;
            self.history.drain(0..half);
            self.position -= half;
            tracing::trace!(target: "text.piece", max_hist = self.max_hist, "history_compacted");
        }
    }

    /// Mutates the top-of-history command in place instead of appending a
    /// new one, re-applying its new forward effect. Callers (the editor
    /// facade) decide *whether* to compact based on the node-identity token
    /// described in the design notes; this only performs the mechanical
    /// in-place mutation once that decision has been made.
    fn compact_top<F>(&mut self, f: F)
    where
        F: FnOnce(&mut TableCommand),
    {
        debug_assert!(self.position > 0 && self.position == self.history.len());
        if let Some(top) = self.history.last_mut() {
            top.invert(&mut self.lines);
            f(top);
            top.apply(&mut self.lines);
        }
    }

    /// Kind and (line, pos) marker of the top-of-history command, used by
    /// the facade to decide whether the next edit should compact into it.
    pub fn last_edit_marker(&self) -> Option<(EditKind, usize, usize)> {
        if self.position == 0 || self.position != self.history.len() {
            return None;
        }
        let top = self.history.last()?;
        marker_of(top)
    }

    pub fn get_current_cmd_name(&self) -> Option<&'static str> {
        if self.position == 0 {
            return None;
        }
        self.history.get(self.position - 1).map(|c| c.display_name())
    }

    /// Inserts `new_entry` (already appended to the arena by the caller) at
    /// `(line, pos)` in character coordinates. Returns `true` if a new
    /// history entry was created (the caller should wrap this into a
    /// document-level `edit_contents` command); `false` means the edit was
    /// compacted into the previous command.
    pub fn insert_str(
        &mut self,
        arena: &Arena,
        line: usize,
        pos: usize,
        new_entry: Entry,
        compact: bool,
    ) -> bool {
        let line_idx = self.clamp_line(line);
        let len = self.line_length(line_idx);
        let pos = pos.min(len);

        if compact {
            if let Some(did) = self.try_compact_insert(line_idx, pos, new_entry) {
                return !did;
            }
        }

        let (idx, offset) = locate(&self.lines[line_idx], pos);
        let cmd = if offset > 0 {
            let e = self.lines[line_idx][idx];
            let (left, right) = split_entry(arena, e, offset);
            TableCommand::SplitInsert {
                line: line_idx,
                idx,
                left,
                entry: new_entry,
                right,
            }
        } else if idx == 0 {
            TableCommand::InsertEntry {
                line: line_idx,
                idx: 0,
                entry: new_entry,
                merge_pos: None,
            }
        } else {
            let prev = self.lines[line_idx][idx - 1];
            if prev.end() == new_entry.start {
                TableCommand::GrowRhs {
                    line: line_idx,
                    idx: idx - 1,
                    disp: new_entry.disp_len,
                    bytes: new_entry.byte_len,
                }
            } else {
                TableCommand::InsertEntry {
                    line: line_idx,
                    idx,
                    entry: new_entry,
                    merge_pos: None,
                }
            }
        };
        tracing::trace!(target: "text.piece", op = "insert_str", line = line_idx, pos, "exec");
        self.exec(cmd);
        true
    }

    /// Attempts to grow the existing top-of-history insertion in place.
    /// Returns `Some(true)` if compacted, `Some(false)` if compaction was
    /// attempted but not applicable (shape mismatch), `None` if there is no
    /// history to compact into.
    fn try_compact_insert(&mut self, line_idx: usize, pos: usize, new_entry: Entry) -> Option<bool> {
        if self.position == 0 || self.position != self.history.len() {
            return None;
        }
        let grows = match self.history.last()? {
            TableCommand::SplitInsert { line, entry, .. } => {
                *line == line_idx && pos == entry_insertion_point(self, line_idx, entry)
            }
            TableCommand::InsertEntry { line, entry, .. } => {
                *line == line_idx && pos == entry_insertion_point(self, line_idx, entry)
            }
            TableCommand::GrowRhs { line, idx, .. } => {
                *line == line_idx
                    && self
                        .lines
                        .get(line_idx)
                        .and_then(|l| l.get(*idx))
                        .map(|e| e.end() == new_entry.start && pos == self.line_length(line_idx))
                        .unwrap_or(false)
            }
            _ => false,
        };
        if !grows {
            return Some(false);
        }
        self.compact_top(|top| match top {
            TableCommand::SplitInsert { entry, .. } | TableCommand::InsertEntry { entry, .. } => {
                entry.disp_len += new_entry.disp_len;
                entry.byte_len += new_entry.byte_len;
            }
            TableCommand::GrowRhs { disp, bytes, .. } => {
                *disp += new_entry.disp_len;
                *bytes += new_entry.byte_len;
            }
            _ => unreachable!(),
        });
        Some(true)
    }

    /// Deletes the character at `(line, pos)` (forward delete / `Delete`
    /// key). Returns whether a new history entry was created.
    pub fn delete_char_current(&mut self, arena: &Arena, line: usize, pos: usize, compact: bool) -> bool {
        self.delete_one(arena, line, pos, false, compact)
    }

    /// Deletes the character before `(line, pos)` (backspace). Returns
    /// whether a new history entry was created.
    pub fn delete_char_before(&mut self, arena: &Arena, line: usize, pos: usize, compact: bool) -> bool {
        if pos == 0 {
            return false;
        }
        self.delete_one(arena, line, pos - 1, true, compact)
    }

    fn delete_one(&mut self, arena: &Arena, line: usize, pos: usize, backspace: bool, compact: bool) -> bool {
        let line_idx = self.clamp_line(line);
        let len = self.line_length(line_idx);
        if pos >= len {
            return false;
        }
        let kind = if backspace {
            EditKind::DeletionBefore
        } else {
            EditKind::DeletionAfter
        };
        if compact && self.try_compact_delete(arena, line_idx, pos, kind) {
            return false;
        }

        let (idx, offset) = locate(&self.lines[line_idx], pos);
        let e = self.lines[line_idx][idx];
        let cmd = if e.disp_len == 1 {
            TableCommand::DeleteEntry {
                line: line_idx,
                idx,
                entry: e,
                merge_pos: None,
            }
        } else if offset == 0 {
            // deleting the entry's first character -> shrink from the left
            let (_, one) = split_entry(arena, e, 1);
            TableCommand::ShrinkLhs {
                line: line_idx,
                idx,
                disp: e.disp_len - one.disp_len,
                bytes: e.byte_len - one.byte_len,
            }
        } else if offset == e.disp_len - 1 {
            // deleting the entry's last character -> shrink from the right
            let (rest, _) = split_entry(arena, e, e.disp_len - 1);
            TableCommand::ShrinkRhs {
                line: line_idx,
                idx,
                disp: e.disp_len - rest.disp_len,
                bytes: e.byte_len - rest.byte_len,
            }
        } else {
            let (left, mid_right) = split_entry(arena, e, offset);
            let (_, right) = split_entry(arena, mid_right, 1);
            TableCommand::SplitDelete {
                line: line_idx,
                idx,
                left,
                right,
                orig: e,
            }
        };
        tracing::trace!(target: "text.piece", op = "delete_one", line = line_idx, pos, backspace, "exec");
        self.exec(cmd);
        true
    }

    fn try_compact_delete(&mut self, arena: &Arena, line_idx: usize, pos: usize, kind: EditKind) -> bool {
        if self.position == 0 || self.position != self.history.len() {
            return false;
        }
        let Some((prev_kind, prev_line, prev_pos)) = self.last_edit_marker() else {
            return false;
        };
        if prev_kind != kind || prev_line != line_idx || prev_pos != pos {
            return false;
        }
        // Re-derive the low-level delete at the same (idx, offset) the
        // previous step landed on and splice it into the existing command,
        // promoting to `Multi` when the deletion crosses an entry boundary.
        let (idx, offset) = locate(&self.lines[line_idx], pos);
        if idx >= self.lines[line_idx].len() {
            return false;
        }
        let e = self.lines[line_idx][idx];
        let backspace = matches!(kind, EditKind::DeletionBefore);
        let next_op = if e.disp_len == 1 {
            TableCommand::DeleteEntry {
                line: line_idx,
                idx,
                entry: e,
                merge_pos: None,
            }
        } else if offset == 0 {
            let (_, one) = split_entry(arena, e, 1);
            TableCommand::ShrinkLhs {
                line: line_idx,
                idx,
                disp: e.disp_len - one.disp_len,
                bytes: e.byte_len - one.byte_len,
            }
        } else if offset == e.disp_len - 1 {
            let (rest, _) = split_entry(arena, e, e.disp_len - 1);
            TableCommand::ShrinkRhs {
                line: line_idx,
                idx,
                disp: e.disp_len - rest.disp_len,
                bytes: e.byte_len - rest.byte_len,
            }
        } else {
            let (left, mid_right) = split_entry(arena, e, offset);
            let (_, right) = split_entry(arena, mid_right, 1);
            TableCommand::SplitDelete {
                line: line_idx,
                idx,
                left,
                right,
                orig: e,
            }
        };

        self.compact_top(|top| {
            let same_site = match (&top, &next_op) {
                (TableCommand::ShrinkLhs { idx: a, .. }, TableCommand::ShrinkLhs { idx: b, .. })
                | (TableCommand::ShrinkRhs { idx: a, .. }, TableCommand::ShrinkRhs { idx: b, .. }) => a == b,
                _ => false,
            };
            match (&mut *top, same_site) {
                (TableCommand::ShrinkLhs { disp, bytes, .. }, true) => {
                    if let TableCommand::ShrinkLhs {
                        disp: d2, bytes: b2, ..
                    } = &next_op
                    {
                        *disp += d2;
                        *bytes += b2;
                    }
                }
                (TableCommand::ShrinkRhs { disp, bytes, .. }, true) => {
                    if let TableCommand::ShrinkRhs {
                        disp: d2, bytes: b2, ..
                    } = &next_op
                    {
                        *disp += d2;
                        *bytes += b2;
                    }
                }
                (TableCommand::SplitDelete { .. }, _) if matches!(next_op, TableCommand::ShrinkLhs { .. } | TableCommand::ShrinkRhs { .. } if e.disp_len == 1) => {
                    *top = next_op.clone();
                }
                _ => {
                    let prior = top.clone();
                    *top = TableCommand::Multi(vec![prior, next_op.clone()]);
                }
            }
        });
        true
    }

    /// Breaks `upper` at `pos` characters into two lines. Returns whether a
    /// new history entry was created (always `true`; line breaks never
    /// compact).
    pub fn make_line_break(&mut self, arena: &Arena, upper: usize, pos: usize) -> bool {
        let line_idx = self.clamp_line(upper);
        let len = self.line_length(line_idx);
        let pos = pos.min(len);
        let entries = self.lines[line_idx].clone();
        let split_idx = {
            let (idx, offset) = locate(&entries, pos);
            if offset == 0 {
                idx
            } else {
                idx + 1 // will be materialized by split below
            }
        };
        let (left, right) = {
            let (idx, offset) = locate(&entries, pos);
            if offset == 0 {
                (entries[..idx].to_vec(), entries[idx..].to_vec())
            } else {
                let e = entries[idx];
                let (l, r) = split_entry(arena, e, offset);
                let mut left = entries[..idx].to_vec();
                left.push(l);
                let mut right = vec![r];
                right.extend(entries[idx + 1..].iter().copied());
                (left, right)
            }
        };
        let _ = split_idx;
        let cmd = TableCommand::LineBreak {
            line: line_idx,
            left,
            right,
        };
        tracing::trace!(target: "text.piece", op = "line_break", line = line_idx, pos, "exec");
        self.exec(cmd);
        true
    }

    /// Joins `upper` with `upper + 1`. Returns `false` if there is no
    /// following line.
    pub fn make_line_join(&mut self, upper: usize) -> bool {
        let line_idx = self.clamp_line(upper);
        if line_idx + 1 >= self.lines.len() {
            return false;
        }
        let cmd = TableCommand::LineJoin {
            line: line_idx,
            upper: self.lines[line_idx].clone(),
            lower: self.lines[line_idx + 1].clone(),
        };
        tracing::trace!(target: "text.piece", op = "line_join", line = line_idx, "exec");
        self.exec(cmd);
        true
    }

    pub fn undo(&mut self) -> bool {
        if self.position == 0 {
            return false;
        }
        self.position -= 1;
        self.history[self.position].invert(&mut self.lines);
        tracing::trace!(target: "text.piece", op = "undo", position = self.position, "done");
        true
    }

    pub fn redo(&mut self) -> bool {
        if self.position >= self.history.len() {
            return false;
        }
        self.history[self.position].apply(&mut self.lines);
        self.position += 1;
        tracing::trace!(target: "text.piece", op = "redo", position = self.position, "done");
        true
    }

    /// Discards all recorded history without touching current content.
    /// Used after populating a table programmatically (the file parser)
    /// so the result isn't undoable back to empty.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.position = 0;
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history_position(&self) -> usize {
        self.position
    }

    /// The configured history bound this table was constructed with, so
    /// callers that build a fresh table alongside an existing one (e.g. the
    /// clipboard's deep clone) can match it instead of reverting to the
    /// default.
    pub fn max_hist(&self) -> usize {
        self.max_hist
    }
}

fn entry_insertion_point(table: &PieceTable, line_idx: usize, entry: &Entry) -> usize {
    let mut acc = 0usize;
    for e in &table.lines[line_idx] {
        if e.start == entry.start && e.end() == entry.end() {
            return acc + e.disp_len;
        }
        acc += e.disp_len;
    }
    usize::MAX
}

fn marker_of(cmd: &TableCommand) -> Option<(EditKind, usize, usize)> {
    match cmd {
        TableCommand::SplitInsert { line, entry, .. } | TableCommand::InsertEntry { line, entry, .. } => {
            Some((EditKind::Insertion, *line, entry.start))
        }
        TableCommand::GrowRhs { line, idx, .. } => Some((EditKind::Insertion, *line, *idx)),
        TableCommand::ShrinkLhs { line, idx, .. } => Some((EditKind::DeletionBefore, *line, *idx)),
        TableCommand::ShrinkRhs { line, idx, .. } => Some((EditKind::DeletionAfter, *line, *idx)),
        TableCommand::SplitDelete { line, idx, .. } => Some((EditKind::DeletionAfter, *line, *idx)),
        TableCommand::DeleteEntry { line, idx, .. } => Some((EditKind::DeletionAfter, *line, *idx)),
        TableCommand::LineBreak { line, .. } => Some((EditKind::LineBreak, *line, 0)),
        TableCommand::LineJoin { line, .. } => Some((EditKind::LineJoin, *line, 0)),
        TableCommand::Multi(cmds) => cmds.first().and_then(marker_of),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn insert(arena: &mut Arena, table: &mut PieceTable, line: usize, pos: usize, s: &str, compact: bool) {
        let entry = arena.append(s.as_bytes());
        table.insert_str(arena, line, pos, entry, compact);
    }

    #[test]
    fn insert_then_undo_redo() {
        let mut arena = Arena::new();
        let mut table = PieceTable::new();
        insert(&mut arena, &mut table, 0, 0, "abc", false);
        assert_eq!(table.to_str(&arena, 0), "abc");
        assert!(table.undo());
        assert_eq!(table.to_str(&arena, 0), "");
        assert!(table.redo());
        assert_eq!(table.to_str(&arena, 0), "abc");
    }

    #[test]
    fn insert_compaction_produces_single_history_entry() {
        let mut arena = Arena::new();
        let mut table = PieceTable::new();
        insert(&mut arena, &mut table, 0, 0, "a", false);
        insert(&mut arena, &mut table, 0, 1, "b", true);
        insert(&mut arena, &mut table, 0, 2, "c", true);
        assert_eq!(table.to_str(&arena, 0), "abc");
        assert_eq!(table.history_len(), 1);
        assert!(table.undo());
        assert_eq!(table.to_str(&arena, 0), "");
    }

    #[test]
    fn delete_before_compaction() {
        let mut arena = Arena::new();
        let mut table = PieceTable::new();
        insert(&mut arena, &mut table, 0, 0, "abc", false);
        table.delete_char_before(&arena, 0, 3, false);
        table.delete_char_before(&arena, 0, 2, true);
        assert_eq!(table.to_str(&arena, 0), "a");
        assert!(table.undo());
        assert_eq!(table.to_str(&arena, 0), "abc");
    }

    #[test]
    fn interior_insert_splits_entry() {
        let mut arena = Arena::new();
        let mut table = PieceTable::new();
        insert(&mut arena, &mut table, 0, 0, "ac", false);
        insert(&mut arena, &mut table, 0, 1, "b", false);
        assert_eq!(table.to_str(&arena, 0), "abc");
        assert!(table.undo());
        assert_eq!(table.to_str(&arena, 0), "ac");
        assert!(table.redo());
        assert_eq!(table.to_str(&arena, 0), "abc");
    }

    #[test]
    fn interior_delete_splits_and_undoes() {
        let mut arena = Arena::new();
        let mut table = PieceTable::new();
        insert(&mut arena, &mut table, 0, 0, "abcde", false);
        table.delete_char_current(&arena, 0, 2, false);
        assert_eq!(table.to_str(&arena, 0), "abde");
        assert!(table.undo());
        assert_eq!(table.to_str(&arena, 0), "abcde");
    }

    #[test]
    fn line_break_and_join_roundtrip() {
        let mut arena = Arena::new();
        let mut table = PieceTable::new();
        insert(&mut arena, &mut table, 0, 0, "helloworld", false);
        table.make_line_break(&arena, 0, 5);
        assert_eq!(table.line_count(), 2);
        assert_eq!(table.to_str(&arena, 0), "hello");
        assert_eq!(table.to_str(&arena, 1), "world");
        table.make_line_join(0);
        assert_eq!(table.line_count(), 1);
        assert_eq!(table.to_str(&arena, 0), "helloworld");
        assert!(table.undo());
        assert_eq!(table.line_count(), 2);
        assert!(table.undo());
        assert_eq!(table.line_count(), 1);
        assert_eq!(table.to_str(&arena, 0), "helloworld");
    }

    #[test]
    fn unicode_insert_and_delete() {
        let mut arena = Arena::new();
        let mut table = PieceTable::new();
        insert(&mut arena, &mut table, 0, 0, "héllo", false);
        assert_eq!(table.line_length(0), 5);
        table.delete_char_current(&arena, 0, 1, false);
        assert_eq!(table.to_str(&arena, 0), "hllo");
        assert!(table.undo());
        assert_eq!(table.to_str(&arena, 0), "héllo");
    }
}
