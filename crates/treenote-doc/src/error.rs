//! Logic-error type for conditions that cannot arise under correct use of
//! the document engine (spec §7.2). The facade never returns this in
//! steady state; callers that can statically rule it out use
//! `debug_assert!` alongside the `Result`, matching the pattern the
//! teacher's view invariants follow.

use crate::tree::TreeIndex;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeNoteError {
    #[error("tree index {index:?} does not address an existing node")]
    InvalidTreeIndex { index: TreeIndex },

    #[error("history position {position} out of range for {len} entries")]
    InvalidHistoryPosition { position: usize, len: usize },

    #[error("display cache is empty")]
    EmptyCache,

    #[error("piece table for line {line} is corrupt: {detail}")]
    CorruptPieceTable { line: usize, detail: &'static str },
}
