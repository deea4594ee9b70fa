//! # piece-tree
//!
//! An AVL-balanced piece tree: a data structure for representing an edited
//! document as a sequence of slices ("pieces") over two append-only
//! buffers, inspired by VS Code's text buffer reimplementation.
//!
//! The tree never owns or reads document content; callers supply
//! [`Piece`] values describing where each slice of text lives, and the
//! tree maintains them as a balanced, line-indexed structure with
//! O(log n) insertion, removal, and line lookup.

mod error;
mod iter;
mod piece;
mod piece_tree;
mod position;
mod tree;

pub use error::{PieceTreeError, PieceTreeResult};
pub use iter::Iter;
pub use piece::{BufferKind, Piece};
pub use piece_tree::PieceTree;
