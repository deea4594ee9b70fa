//! The public façade: a balanced tree of [`Piece`] values addressed by
//! `(line, column)` rather than by absolute offset.
//!
//! `PieceTree` owns no text. Every [`Piece`] it stores is a slice
//! descriptor into buffers the caller manages; the tree only ever moves,
//! splits, and merges those descriptors.

use crate::error::{PieceTreeError, PieceTreeResult};
use crate::iter::Iter;
use crate::piece::Piece;
use crate::position::{find_column, find_line, Position};
use crate::tree::{Arena, NodeId};

/// A balanced tree of [`Piece`]s representing one edited document.
#[derive(Debug, Clone, Default)]
pub struct PieceTree {
    arena: Arena,
    root: Option<NodeId>,
}

impl PieceTree {
    /// An empty tree with no pieces.
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Inserts `piece` so that it begins at `(line, column)`.
    ///
    /// `line` and `column` are both zero-based; `column` counts units
    /// within the line, not bytes from the start of the document.
    pub fn insert(&mut self, piece: Piece, line: usize, column: usize) -> PieceTreeResult<()> {
        let Some(root) = self.root else {
            let node = self.arena.alloc(piece);
            self.root = Some(node);
            return Ok(());
        };

        let line_pos =
            find_line(&self.arena, root, line).ok_or(PieceTreeError::LineNotFound { line })?;
        let pos = find_column(&self.arena, line_pos.node, line_pos.piece_offset, column)?;

        let new_node = self.insert_node_at_position(pos, piece);

        let mut root = self.root.expect("root set above");
        self.arena.balance_and_update(new_node, &mut root);
        self.root = Some(root);
        Ok(())
    }

    /// Removes `length` units starting at `(line, column)`.
    pub fn remove(&mut self, line: usize, column: usize, length: usize) -> PieceTreeResult<()> {
        if length < 1 {
            return Err(PieceTreeError::RemovalLengthNotPositive { length });
        }

        let root = self.root.ok_or(PieceTreeError::LineNotFound { line })?;
        let line_pos =
            find_line(&self.arena, root, line).ok_or(PieceTreeError::LineNotFound { line })?;
        let start = find_column(&self.arena, line_pos.node, line_pos.piece_offset, column)?;

        self.remove_starting_from_position(start, length)
    }

    /// Returns copies of the pieces making up visual line `line`, with the
    /// first piece left-trimmed to the line's start and the last piece
    /// right-trimmed just past its line break (if the line isn't the
    /// document's last).
    pub fn get_line_pieces(&self, line: usize) -> PieceTreeResult<Vec<Piece>> {
        let root = self.root.ok_or(PieceTreeError::LineNotFound { line })?;
        let start =
            find_line(&self.arena, root, line).ok_or(PieceTreeError::LineNotFound { line })?;
        Ok(self.get_line_pieces_from_position(start))
    }

    /// An in-order, forward-only iterator over every piece currently in
    /// the tree.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(&self.arena, self.root)
    }

    /// Splices `piece` into the tree at `pos`, returning the id of the
    /// newly allocated node holding it (the node to rebalance from).
    fn insert_node_at_position(&mut self, pos: Position, piece: Piece) -> NodeId {
        let target = pos.node;
        let piece_offset = pos.piece_offset;
        let target_len = self.arena.get(target).piece.length;
        let target_parent = self.arena.get(target).parent;

        if piece_offset == 0 {
            let new_node = self.arena.alloc(piece);
            let target_left = self.arena.get(target).left;

            self.replace_in_parent(target_parent, target, new_node);
            self.arena.get_mut(new_node).parent = target_parent;
            self.arena.get_mut(new_node).right = Some(target);
            self.arena.get_mut(new_node).left = target_left;
            if let Some(left) = target_left {
                self.arena.get_mut(left).parent = Some(new_node);
            }
            self.arena.get_mut(target).left = None;
            self.arena.get_mut(target).parent = Some(new_node);

            self.arena.recalc_metadata(target);
            self.arena.recalc_metadata(new_node);
            new_node
        } else if piece_offset >= target_len {
            let new_node = self.arena.alloc(piece);
            let target_right = self.arena.get(target).right;

            self.replace_in_parent(target_parent, target, new_node);
            self.arena.get_mut(new_node).parent = target_parent;
            self.arena.get_mut(new_node).left = Some(target);
            self.arena.get_mut(new_node).right = target_right;
            if let Some(right) = target_right {
                self.arena.get_mut(right).parent = Some(new_node);
            }
            self.arena.get_mut(target).right = None;
            self.arena.get_mut(target).parent = Some(new_node);

            self.arena.recalc_metadata(target);
            self.arena.recalc_metadata(new_node);
            new_node
        } else {
            let right_piece = self
                .arena
                .get_mut(target)
                .piece
                .split_at(piece_offset as isize);
            let right_node = self.arena.alloc(right_piece);
            let new_node = self.arena.alloc(piece);

            self.replace_in_parent(target_parent, target, new_node);
            self.arena.get_mut(new_node).parent = target_parent;
            self.arena.get_mut(new_node).left = Some(target);
            self.arena.get_mut(new_node).right = Some(right_node);
            self.arena.get_mut(target).parent = Some(new_node);
            self.arena.get_mut(right_node).parent = Some(new_node);

            self.arena.recalc_metadata(target);
            self.arena.recalc_metadata(right_node);
            self.arena.recalc_metadata(new_node);
            new_node
        }
    }

    /// Rewrites `old`'s slot in `parent` (or the tree root, if `parent` is
    /// `None`) to hold `new` instead.
    fn replace_in_parent(&mut self, parent: Option<NodeId>, old: NodeId, new: NodeId) {
        match parent {
            Some(parent) => {
                let node = self.arena.get_mut(parent);
                if node.left == Some(old) {
                    node.left = Some(new);
                } else {
                    node.right = Some(new);
                }
            }
            None => self.root = Some(new),
        }
    }

    fn remove_starting_from_position(
        &mut self,
        start: Position,
        mut remaining: usize,
    ) -> PieceTreeResult<()> {
        let mut node = start.node;
        let mut offset = start.piece_offset;

        while remaining > 0 {
            let length = self.arena.get(node).piece.length;

            if offset > 0 {
                if offset + remaining < length {
                    let split_at = offset + remaining;
                    let right_piece = self.arena.get_mut(node).piece.split_at(split_at as isize);
                    let right_node = self.arena.alloc(right_piece);

                    let node_right = self.arena.get(node).right;
                    self.arena.get_mut(right_node).right = node_right;
                    if let Some(r) = node_right {
                        self.arena.get_mut(r).parent = Some(right_node);
                    }
                    self.arena.get_mut(node).right = Some(right_node);
                    self.arena.get_mut(right_node).parent = Some(node);
                    self.arena.recalc_metadata(right_node);

                    let mut root = self.root.expect("node is in the tree");
                    self.arena.balance_and_update(right_node, &mut root);
                    self.root = Some(root);

                    let piece = &mut self.arena.get_mut(node).piece;
                    piece.length = offset;
                    let keep = piece.line_breaks.partition_point(|&b| b < offset);
                    piece.line_breaks.truncate(keep);

                    let mut root = self.root.expect("node is in the tree");
                    self.arena.balance_and_update(node, &mut root);
                    self.root = Some(root);

                    remaining = 0;
                } else {
                    let old_length = length;
                    self.arena.get_mut(node).piece.cut_right(offset);
                    let new_length = self.arena.get(node).piece.length;
                    remaining -= old_length - new_length;

                    let mut root = self.root.expect("node is in the tree");
                    self.arena.balance_and_update(node, &mut root);
                    self.root = Some(root);

                    if remaining > 0 {
                        node = self
                            .arena
                            .successor(node)
                            .ok_or(PieceTreeError::RemovalTooLong { length: remaining })?;
                        offset = 0;
                    }
                }
            } else if remaining < length {
                self.arena.get_mut(node).piece.cut_left(remaining);
                remaining = 0;

                let mut root = self.root.expect("node is in the tree");
                self.arena.balance_and_update(node, &mut root);
                self.root = Some(root);
            } else {
                remaining -= length;

                if remaining > 0 {
                    node = self
                        .arena
                        .successor(node)
                        .ok_or(PieceTreeError::RemovalTooLong { length: remaining })?;
                    offset = 0;
                } else {
                    let mut root = self.root.expect("node is in the tree");
                    let became_empty = self.arena.remove(node, &mut root);
                    self.root = if became_empty { None } else { Some(root) };
                }
            }
        }

        Ok(())
    }

    fn get_line_pieces_from_position(&self, start: Position) -> Vec<Piece> {
        let mut pieces = Vec::new();
        let mut node = start.node;

        let mut first_piece = self.arena.get(node).piece.clone();
        if start.piece_offset > 0 {
            first_piece.cut_left(start.piece_offset);
        }
        let mut end_line_in_piece = Self::trim_to_first_break(&mut first_piece);
        pieces.push(first_piece);

        while !end_line_in_piece {
            let Some(next) = self.arena.successor(node) else {
                break;
            };
            node = next;

            let mut piece = self.arena.get(node).piece.clone();
            end_line_in_piece = Self::trim_to_first_break(&mut piece);
            pieces.push(piece);
        }

        pieces
    }

    /// If `piece` carries an interior line break, cuts it right after the
    /// first one and reports that the line ended inside it.
    fn trim_to_first_break(piece: &mut Piece) -> bool {
        let Some(&first_break) = piece.line_breaks.first() else {
            return false;
        };
        if first_break + 1 < piece.length {
            piece.cut_right(first_break + 1);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::BufferKind;
    use proptest::prelude::*;

    fn added(offset: usize, length: usize, breaks: &[usize]) -> Piece {
        Piece::new(BufferKind::Added, offset, length, breaks.to_vec())
    }

    fn line_shapes(tree: &PieceTree) -> Vec<(usize, Vec<usize>)> {
        tree.iter()
            .map(|p| (p.length, p.line_breaks.clone()))
            .collect()
    }

    #[test]
    fn insert_empty_tree_becomes_single_piece() {
        let mut tree = PieceTree::new();
        tree.insert(added(0, 7, &[3]), 0, 0).unwrap();
        assert_eq!(line_shapes(&tree), vec![(7, vec![3])]);
    }

    #[test]
    fn insert_splits_middle_of_line() {
        let mut tree = PieceTree::new();
        tree.insert(added(0, 7, &[3]), 0, 0).unwrap();
        tree.insert(added(7, 5, &[2]), 1, 0).unwrap();
        assert_eq!(
            line_shapes(&tree),
            vec![(4, vec![3]), (5, vec![2]), (3, vec![])]
        );
    }

    #[test]
    fn insert_first_line_appends_at_column() {
        let mut tree = PieceTree::new();
        tree.insert(added(0, 4, &[2]), 0, 0).unwrap();
        tree.insert(added(4, 3, &[]), 0, 1).unwrap();
        assert_eq!(line_shapes(&tree), vec![(1, vec![]), (3, vec![]), (3, vec![1])]);
    }

    #[test]
    fn remove_between_splits_the_piece() {
        let mut tree = PieceTree::new();
        tree.insert(added(0, 7, &[3]), 0, 0).unwrap();
        tree.remove(1, 1, 1).unwrap();
        assert_eq!(line_shapes(&tree), vec![(5, vec![3]), (1, vec![])]);
    }

    #[test]
    fn remove_from_start_of_line() {
        let mut tree = PieceTree::new();
        tree.insert(added(0, 7, &[3]), 0, 0).unwrap();
        tree.remove(0, 0, 3).unwrap();
        assert_eq!(line_shapes(&tree), vec![(4, vec![0])]);
    }

    #[test]
    fn remove_spanning_two_nodes() {
        let mut tree = PieceTree::new();
        tree.insert(added(0, 4, &[2]), 0, 0).unwrap();
        tree.insert(added(4, 3, &[]), 0, 1).unwrap();
        tree.remove(0, 2, 3).unwrap();
        assert_eq!(line_shapes(&tree), vec![(1, vec![]), (1, vec![]), (2, vec![0])]);
    }

    #[test]
    fn remove_more_than_available_fails() {
        let mut tree = PieceTree::new();
        tree.insert(added(0, 4, &[2]), 0, 0).unwrap();
        tree.insert(added(4, 3, &[]), 0, 1).unwrap();
        assert!(matches!(
            tree.remove(0, 1, 7),
            Err(PieceTreeError::RemovalTooLong { .. })
        ));
    }

    #[test]
    fn remove_zero_length_is_rejected() {
        let mut tree = PieceTree::new();
        tree.insert(added(0, 4, &[]), 0, 0).unwrap();
        assert!(matches!(
            tree.remove(0, 0, 0),
            Err(PieceTreeError::RemovalLengthNotPositive { length: 0 })
        ));
    }

    #[test]
    fn remove_entire_single_piece_tree() {
        let mut tree = PieceTree::new();
        tree.insert(added(0, 4, &[]), 0, 0).unwrap();
        tree.remove(0, 0, 4).unwrap();
        assert_eq!(tree.iter().count(), 0);
    }

    #[test]
    fn get_line_pieces_trims_trailing_piece_at_break() {
        let mut tree = PieceTree::new();
        tree.insert(added(0, 7, &[3]), 0, 0).unwrap();
        let pieces = tree.get_line_pieces(0).unwrap();
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].length, 4);
        assert_eq!(pieces[0].line_breaks, vec![3]);
    }

    #[test]
    fn get_line_pieces_on_last_line_runs_to_end() {
        let mut tree = PieceTree::new();
        tree.insert(added(0, 7, &[3]), 0, 0).unwrap();
        let pieces = tree.get_line_pieces(1).unwrap();
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].length, 3);
        assert_eq!(pieces[0].line_breaks, Vec::<usize>::new());
    }

    #[test]
    fn get_line_pieces_spans_multiple_nodes() {
        let mut tree = PieceTree::new();
        tree.insert(added(0, 4, &[2]), 0, 0).unwrap();
        tree.insert(added(4, 3, &[]), 0, 1).unwrap();
        let pieces = tree.get_line_pieces(0).unwrap();
        let total: usize = pieces.iter().map(|p| p.length).sum();
        assert_eq!(total, 4);
        assert_eq!(pieces.last().unwrap().line_breaks, vec![0]);
    }

    #[test]
    fn missing_line_is_reported() {
        let mut tree = PieceTree::new();
        tree.insert(added(0, 4, &[]), 0, 0).unwrap();
        assert!(matches!(
            tree.get_line_pieces(5),
            Err(PieceTreeError::LineNotFound { line: 5 })
        ));
    }

    #[test]
    fn cut_left_on_non_root_node_keeps_ancestor_metadata_correct() {
        let mut tree = PieceTree::new();
        // A becomes the root's left child once B is appended after it.
        tree.insert(added(0, 10, &[2, 5, 8]), 0, 0).unwrap();
        tree.insert(added(10, 5, &[]), 3, 1).unwrap();

        tree.remove(0, 0, 3).unwrap();

        let root = tree.root.expect("tree still has nodes");
        assert_subtree_consistent(&tree, root);
    }

    #[test]
    fn cut_right_on_non_root_node_keeps_ancestor_metadata_correct() {
        let mut tree = PieceTree::new();
        // A becomes the root's left child once B is appended after it.
        tree.insert(added(0, 10, &[2, 5, 8]), 0, 0).unwrap();
        tree.insert(added(10, 5, &[]), 3, 1).unwrap();

        tree.remove(1, 1, 6).unwrap();

        let root = tree.root.expect("tree still has nodes");
        assert_subtree_consistent(&tree, root);
    }

    /// Recursively checks that `id`'s subtree is height-balanced and that
    /// `height`/`left_line_count` agree with what its children actually
    /// hold — the two pieces of cached metadata every rotation and remove
    /// is responsible for keeping correct.
    fn assert_subtree_consistent(tree: &PieceTree, id: NodeId) -> (i64, usize) {
        let node = tree.arena.get(id);
        let left = node.left.map(|l| assert_subtree_consistent(tree, l));
        let right = node.right.map(|r| assert_subtree_consistent(tree, r));

        let left_height = left.map(|(h, _)| h).unwrap_or(0);
        let right_height = right.map(|(h, _)| h).unwrap_or(0);
        assert!(
            (left_height - right_height).abs() <= 1,
            "node {id:?} unbalanced: left height {left_height}, right height {right_height}"
        );

        let expected_height = 1 + left_height.max(right_height);
        assert_eq!(node.height, expected_height, "cached height wrong at {id:?}");

        let expected_left_line_count = left.map(|(_, lines)| lines).unwrap_or(0);
        assert_eq!(
            node.left_line_count, expected_left_line_count,
            "cached left_line_count wrong at {id:?}"
        );

        let own_lines = expected_left_line_count + node.piece.line_breaks.len();
        (expected_height, own_lines)
    }

    proptest! {
        /// A tree built purely by appending to the end of a growing
        /// document — the access pattern a text editor exercises on every
        /// keystroke — stays height-balanced, and its cached metadata
        /// never drifts from what the shape of the tree actually implies.
        #[test]
        fn append_only_insertion_stays_balanced(
            chunk_lengths in prop::collection::vec(1usize..20, 1..60),
        ) {
            let mut tree = PieceTree::new();
            let mut doc_len = 0usize;
            let mut offset = 0usize;

            for len in chunk_lengths {
                let piece = added(offset, len, &[]);
                let line = 0;
                tree.insert(piece, line, doc_len).unwrap();
                offset += len;
                doc_len += len;
            }

            if let Some(root) = tree.root {
                assert_subtree_consistent(&tree, root);
            }
        }
    }
}
