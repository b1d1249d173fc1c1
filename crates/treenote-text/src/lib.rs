//! Shared content storage for tree-note documents: the byte-level UTF-8
//! helpers, the append-only content arena, and the per-node piece table
//! built on top of it.

pub mod arena;
pub mod piece;
pub mod utf8;

pub use arena::{Arena, Entry, BLOCK_SIZE};
pub use piece::{EditKind, PieceTable, TableCommand, DEFAULT_MAX_HIST};
