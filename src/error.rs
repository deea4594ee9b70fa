//! Failure kinds surfaced by [`crate::PieceTree`].
//!
//! Every fallible operation on the tree either completes or fails before any
//! structural change is made, since lookup always precedes mutation: the
//! tree's invariants hold on every `Err` return exactly as they did before
//! the call.

use thiserror::Error;

/// A single failure kind, carrying the numeric context of the offending
/// call so callers can match on it instead of parsing a message.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PieceTreeError {
    /// `line` is not present in the tree.
    #[error("line {line} not found in piece tree")]
    LineNotFound { line: usize },

    /// `column` exceeds the characters present on the requested line.
    #[error("column {column} is out of line bounds")]
    ColumnOutOfLineBounds { column: usize },

    /// Advancing by `column` units walked past the end of the document.
    #[error("column {column} is beyond the document length")]
    ColumnBeyondDocument { column: usize },

    /// A removal of `length` units starting at the located position would
    /// extend past the end of the document.
    #[error("removal length {length} is greater than the remaining document")]
    RemovalTooLong { length: usize },

    /// `remove` was called with a length less than one.
    #[error("removal length must be greater than 0, got {length}")]
    RemovalLengthNotPositive { length: usize },

    /// The removal's starting position resolved to no node; an internal
    /// invariant was violated.
    #[error("the starting removal position has no node")]
    RemovalStartMissing,
}

/// The crate's result alias, used by every fallible public method.
pub type PieceTreeResult<T> = Result<T, PieceTreeError>;
