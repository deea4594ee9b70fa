//! Transient locators inside the tree.
//!
//! A [`Position`] pins a point inside a specific node's piece. It is only
//! meaningful against the arena and tree shape that produced it, and a
//! `Position` must never be reused across a mutating call: insertion and
//! removal can free, split, or rotate the very node it points at.

use crate::error::{PieceTreeError, PieceTreeResult};
use crate::tree::{Arena, NodeId};

/// A point `(node, piece_offset)` inside the tree, produced by [`find_line`]
/// and [`find_column`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct Position {
    pub node: NodeId,
    pub piece_offset: usize,
}

/// Locates the start of visual line `line`, searching from `root`.
pub(crate) fn find_line(arena: &Arena, root: NodeId, mut line: usize) -> Option<Position> {
    let mut node = root;
    loop {
        let n = arena.get(node);
        let line_sum_subtree = n.left_line_count + n.piece.line_breaks.len();

        if n.left_line_count <= line && line <= line_sum_subtree {
            let mut line_in_node = line - n.left_line_count;
            let mut located = node;

            if line_in_node == 0 {
                loop {
                    let Some(prev) = arena.predecessor(located) else {
                        break;
                    };
                    located = prev;
                    line_in_node = arena.get(located).piece.line_breaks.len();
                    if line_in_node != 0 {
                        break;
                    }
                }
            }

            let located_piece = &arena.get(located).piece;
            let mut piece_offset = if line_in_node != 0 {
                located_piece.line_breaks[line_in_node - 1] + 1
            } else {
                0
            };

            if piece_offset >= located_piece.length {
                match arena.successor(located) {
                    Some(next) => {
                        located = next;
                        piece_offset = 0;
                    }
                    None => return Some(Position {
                        node: located,
                        piece_offset,
                    }),
                }
            }

            return Some(Position {
                node: located,
                piece_offset,
            });
        }

        if line_sum_subtree < line {
            line -= line_sum_subtree;
            node = n.right?;
        } else {
            node = n.left?;
        }
    }
}

/// Advances `column` units from the Position produced by [`find_line`].
pub(crate) fn find_column(
    arena: &Arena,
    mut node: NodeId,
    line_begin_offset: usize,
    column: usize,
) -> PieceTreeResult<Position> {
    let piece_line = arena.get(node).piece.line_of_offset(line_begin_offset);
    let mut piece_offset = line_begin_offset + column;

    {
        let piece = &arena.get(node).piece;
        if piece_line < piece.line_breaks.len() && piece_offset >= piece.line_breaks[piece_line] {
            return Err(PieceTreeError::ColumnOutOfLineBounds { column });
        }
    }

    while piece_offset > arena.get(node).piece.length {
        piece_offset -= arena.get(node).piece.length;

        node = arena
            .successor(node)
            .ok_or(PieceTreeError::ColumnBeyondDocument { column })?;

        let piece = &arena.get(node).piece;
        if !piece.line_breaks.is_empty() && piece_offset >= piece.line_breaks[0] {
            return Err(PieceTreeError::ColumnOutOfLineBounds { column });
        }
    }

    Ok(Position { node, piece_offset })
}
