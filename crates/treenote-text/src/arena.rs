//! Append-only, block-chunked byte storage shared by every piece table in a
//! document.
//!
//! Bytes once written are never overwritten or relocated, so an [`Entry`]
//! captured at any point in time remains valid for the lifetime of the
//! arena; piece-table entries hold `(start, disp_len, byte_len)` triples
//! rather than borrowed views for exactly this reason (see the design notes
//! on shared-resource policy).

use crate::utf8;

/// Byte size of one storage block. Fixed per `spec.md` §3; overridable only
/// for tests via [`Arena::with_block_size`].
pub const BLOCK_SIZE: usize = 1024;

/// A contiguous run of characters referenced by absolute arena offset.
///
/// `disp_len <= byte_len` always; equality holds iff the run is pure ASCII,
/// which call sites use as a fast path to avoid walking UTF-8 boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entry {
    pub start: usize,
    pub disp_len: usize,
    pub byte_len: usize,
}

impl Entry {
    pub fn new(start: usize, disp_len: usize, byte_len: usize) -> Self {
        Self {
            start,
            disp_len,
            byte_len,
        }
    }

    /// One past the last byte this entry covers.
    pub fn end(&self) -> usize {
        self.start + self.byte_len
    }

    /// True when every character in this entry is a single byte, making
    /// character offsets and byte offsets interchangeable.
    pub fn is_ascii_fast(&self) -> bool {
        self.disp_len == self.byte_len
    }

    /// An entry covering zero characters at `start`. Used to seed splits.
    pub fn empty_at(start: usize) -> Self {
        Self {
            start,
            disp_len: 0,
            byte_len: 0,
        }
    }
}

/// Append-only block store. Each append call produces the bytes for exactly
/// one content line (the caller stops at a newline or NUL, which the arena
/// treats as a line delimiter and does not store).
pub struct Arena {
    blocks: Vec<Vec<u8>>,
    block_size: usize,
    len: usize,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    pub fn new() -> Self {
        Self::with_block_size(BLOCK_SIZE)
    }

    /// Construct an arena with a non-default block size. Only meant for
    /// tests that want to exercise block-boundary splitting without
    /// generating megabytes of input.
    pub fn with_block_size(block_size: usize) -> Self {
        assert!(block_size > 0, "block size must be positive");
        Self {
            blocks: vec![Vec::with_capacity(block_size)],
            block_size,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn push_byte(&mut self, b: u8) {
        if self.blocks.last().expect("at least one block").len() == self.block_size {
            self.blocks.push(Vec::with_capacity(self.block_size));
            tracing::trace!(target: "text.arena", blocks = self.blocks.len(), "block_rollover");
        }
        self.blocks.last_mut().unwrap().push(b);
        self.len += 1;
    }

    /// Appends `bytes` up to (and not including) the first `\n` or `\0`, or
    /// to the end of `bytes` if no delimiter is present. Each character is
    /// validated; malformed sequences are replaced with U+FFFD at
    /// append-time so the arena's invariant (every stored range is valid
    /// UTF-8 on character boundaries) always holds.
    pub fn append(&mut self, bytes: &[u8]) -> Entry {
        let start = self.len;
        let mut disp_len = 0usize;
        let mut byte_len = 0usize;
        let mut i = 0usize;
        while i < bytes.len() {
            let b = bytes[i];
            if b == b'\n' || b == 0 {
                break;
            }
            let (ch, consumed) = utf8::next_char(&bytes[i..]);
            let mut encode_buf = [0u8; 4];
            let encoded = ch.encode_utf8(&mut encode_buf);
            for &eb in encoded.as_bytes() {
                self.push_byte(eb);
            }
            disp_len += 1;
            byte_len += encoded.len();
            i += consumed.max(1);
        }
        tracing::trace!(target: "text.arena", start, disp_len, byte_len, "append");
        Entry::new(start, disp_len, byte_len)
    }

    pub fn byte_at(&self, offset: usize) -> u8 {
        let block_idx = offset / self.block_size;
        let within = offset % self.block_size;
        self.blocks[block_idx][within]
    }

    /// Contiguous byte slices covering `[start, start+len)`, split at block
    /// boundaries. A caller must not assume any individual slice ends on a
    /// character boundary — only the full concatenation is guaranteed valid
    /// UTF-8.
    pub fn slices(&self, start: usize, len: usize) -> Vec<&[u8]> {
        if len == 0 {
            return Vec::new();
        }
        let mut out = Vec::new();
        let mut pos = start;
        let end = start + len;
        while pos < end {
            let block_idx = pos / self.block_size;
            let within = pos % self.block_size;
            let block = &self.blocks[block_idx];
            let avail = block.len() - within;
            let take = avail.min(end - pos);
            out.push(&block[within..within + take]);
            pos += take;
        }
        out
    }

    /// Owned copy of `[start, start+len)`. Used by the piece table whenever
    /// it needs to walk characters (the non-ASCII slow path); collapsing
    /// the block-split view into one buffer first keeps the character walk
    /// simple and correct even when a character's bytes straddle a block
    /// boundary.
    pub fn bytes_owned(&self, start: usize, len: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(len);
        for s in self.slices(start, len) {
            out.extend_from_slice(s);
        }
        out
    }

    /// Byte views for every entry in `entries`, in order, each split at
    /// block boundaries as per [`Arena::slices`].
    pub fn view(&self, entries: &[Entry]) -> Vec<&[u8]> {
        let mut out = Vec::new();
        for e in entries {
            out.extend(self.slices(e.start, e.byte_len));
        }
        out
    }

    /// Renders `entries` as a single `String`.
    pub fn render(&self, entries: &[Entry]) -> String {
        let mut buf = Vec::new();
        for view in self.view(entries) {
            buf.extend_from_slice(view);
        }
        String::from_utf8(buf).expect("arena entries are always valid utf-8")
    }

    /// Renders the sub-range `[char_pos, char_pos+char_len)` of `entries` as
    /// a `String`, honoring each entry's ASCII fast path and otherwise
    /// walking characters via [`crate::utf8`].
    pub fn render_range(&self, entries: &[Entry], char_pos: usize, char_len: usize) -> String {
        if char_len == 0 {
            return String::new();
        }
        let mut buf = Vec::new();
        let mut acc = 0usize;
        let mut remaining = char_len;
        for e in entries {
            if remaining == 0 {
                break;
            }
            if acc + e.disp_len <= char_pos {
                acc += e.disp_len;
                continue;
            }
            let local_start = char_pos.saturating_sub(acc);
            let local_take = (e.disp_len - local_start).min(remaining);
            if local_start == 0 && local_take == e.disp_len {
                buf.extend(self.bytes_owned(e.start, e.byte_len));
            } else if e.is_ascii_fast() {
                buf.extend(self.bytes_owned(e.start + local_start, local_take));
            } else {
                let whole = self.bytes_owned(e.start, e.byte_len);
                let mut byte_off = 0usize;
                let mut chars_seen = 0usize;
                let mut i = 0usize;
                while i < whole.len() && chars_seen < local_start {
                    let (_, consumed) = utf8::next_char(&whole[i..]);
                    i += consumed.max(1);
                    chars_seen += 1;
                }
                byte_off = i;
                let mut take_bytes = 0usize;
                let mut taken_chars = 0usize;
                let mut j = byte_off;
                while j < whole.len() && taken_chars < local_take {
                    let (_, consumed) = utf8::next_char(&whole[j..]);
                    j += consumed.max(1);
                    take_bytes += consumed.max(1);
                    taken_chars += 1;
                }
                buf.extend_from_slice(&whole[byte_off..byte_off + take_bytes]);
            }
            remaining -= local_take;
            acc += e.disp_len;
        }
        String::from_utf8(buf).expect("arena entries are always valid utf-8")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn append_stops_at_newline() {
        let mut arena = Arena::new();
        let entry = arena.append(b"hello\nworld");
        assert_eq!(entry.disp_len, 5);
        assert_eq!(entry.byte_len, 5);
        assert_eq!(arena.render(&[entry]), "hello");
    }

    #[test]
    fn append_replaces_invalid_bytes() {
        let mut arena = Arena::new();
        let entry = arena.append(&[b'a', 0xFF, b'b']);
        assert_eq!(arena.render(&[entry]), "a\u{FFFD}b");
        assert_eq!(entry.disp_len, 3);
    }

    #[test]
    fn entries_crossing_block_boundary_render_correctly() {
        let mut arena = Arena::with_block_size(4);
        let entry = arena.append("€€€".as_bytes()); // 3 bytes each, crosses 4-byte blocks
        assert_eq!(arena.render(&[entry]), "€€€");
    }

    #[test]
    fn render_range_ascii_fast_path() {
        let mut arena = Arena::new();
        let entry = arena.append(b"abcdef");
        assert_eq!(arena.render_range(&[entry], 2, 3), "cde");
    }

    #[test]
    fn render_range_multibyte() {
        let mut arena = Arena::new();
        let entry = arena.append("héllo wörld".as_bytes());
        assert_eq!(arena.render_range(&[entry], 0, 5), "héllo");
        assert_eq!(arena.render_range(&[entry], 6, 5), "wörld");
    }
}
