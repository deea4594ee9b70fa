//! Arena-backed AVL tree storing [`Piece`] values, keyed by document
//! position rather than by any explicit key.
//!
//! Nodes live in a `Vec`-backed arena and are addressed by [`NodeId`], a
//! `Copy` index type. `parent`/`left`/`right` links are `Option<NodeId>`, so
//! there are no reference cycles at the type level and no unsafe code is
//! needed to maintain the parent back-links the AVL rebalancing relies on.
//! Removing a node returns its slot to a free-list for reuse by later
//! insertions.

use crate::piece::Piece;

/// An index into the tree's arena. Never constructed by callers; obtained
/// from the tree itself and only meaningful against the arena that produced
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub piece: Piece,
    pub parent: Option<NodeId>,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    pub height: i64,
    pub left_line_count: usize,
}

impl Node {
    fn new(piece: Piece) -> Self {
        Self {
            piece,
            parent: None,
            left: None,
            right: None,
            height: 1,
            left_line_count: 0,
        }
    }
}

#[derive(Debug, Clone)]
enum Slot {
    Occupied(Node),
    Free(Option<usize>),
}

/// Owner of every [`Node`] in a [`crate::PieceTree`]. Exclusively owns all
/// nodes by value; a removed node's slot is released to an internal
/// free-list rather than left as a permanent hole.
#[derive(Debug, Clone, Default)]
pub(crate) struct Arena {
    slots: Vec<Slot>,
    free_head: Option<usize>,
}

impl Arena {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
        }
    }

    pub fn insert(&mut self, piece: Piece) -> NodeId {
        let node = Node::new(piece);
        match self.free_head.take() {
            Some(index) => {
                let next_free = match &self.slots[index] {
                    Slot::Free(next) => *next,
                    Slot::Occupied(_) => unreachable!("free list points at occupied slot"),
                };
                self.free_head = next_free;
                self.slots[index] = Slot::Occupied(node);
                NodeId(index)
            }
            None => {
                let index = self.slots.len();
                self.slots.push(Slot::Occupied(node));
                NodeId(index)
            }
        }
    }

    /// Frees a node's slot. The caller must have already unlinked it from
    /// the tree.
    pub fn free(&mut self, id: NodeId) {
        self.slots[id.0] = Slot::Free(self.free_head.take());
        self.free_head = Some(id.0);
    }

    pub fn get(&self, id: NodeId) -> &Node {
        match &self.slots[id.0] {
            Slot::Occupied(node) => node,
            Slot::Free(_) => panic!("dangling NodeId {id:?}"),
        }
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        match &mut self.slots[id.0] {
            Slot::Occupied(node) => node,
            Slot::Free(_) => panic!("dangling NodeId {id:?}"),
        }
    }

    fn height(&self, id: Option<NodeId>) -> i64 {
        id.map(|id| self.get(id).height).unwrap_or(0)
    }

    fn line_breaks(&self, id: Option<NodeId>) -> usize {
        id.map(|id| self.get(id).piece.line_breaks.len()).unwrap_or(0)
    }

    /// Recomputes `height` and `left_line_count` for `id` from its
    /// (already-correct) children. Never descends: must be called
    /// bottom-up.
    pub fn recalc_metadata(&mut self, id: NodeId) {
        let (left, right) = {
            let node = self.get(id);
            (node.left, node.right)
        };
        let height = 1 + self.height(left).max(self.height(right));
        let left_line_count = left
            .map(|l| self.get(l).left_line_count + self.line_breaks(Some(l)))
            .unwrap_or(0);
        let node = self.get_mut(id);
        node.height = height;
        node.left_line_count = left_line_count;
    }

    fn balance_factor(&self, id: NodeId) -> i64 {
        let node = self.get(id);
        self.height(node.left) - self.height(node.right)
    }

    /// Replaces `old`'s slot in its parent (or the tree root) with `new`.
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>, root: &mut NodeId) {
        match parent {
            Some(parent_id) => {
                let parent_node = self.get_mut(parent_id);
                if parent_node.left == Some(old) {
                    parent_node.left = new;
                } else {
                    debug_assert_eq!(parent_node.right, Some(old));
                    parent_node.right = new;
                }
            }
            None => {
                if let Some(new_id) = new {
                    *root = new_id;
                }
            }
        }
        if let Some(new_id) = new {
            self.get_mut(new_id).parent = parent;
        }
    }

    /// Right rotation around `id`. Returns the new subtree root.
    fn rotate_right(&mut self, id: NodeId, root: &mut NodeId) -> NodeId {
        let parent = self.get(id).parent;
        let new_top = self.get(id).left.expect("rotate_right needs a left child");

        let new_top_right = self.get(new_top).right;
        self.get_mut(id).left = new_top_right;
        if let Some(child) = new_top_right {
            self.get_mut(child).parent = Some(id);
        }

        self.replace_child(parent, id, Some(new_top), root);

        self.get_mut(new_top).right = Some(id);
        self.get_mut(id).parent = Some(new_top);

        self.recalc_metadata(id);
        self.recalc_metadata(new_top);
        new_top
    }

    /// Left rotation around `id`. Returns the new subtree root.
    fn rotate_left(&mut self, id: NodeId, root: &mut NodeId) -> NodeId {
        let parent = self.get(id).parent;
        let new_top = self.get(id).right.expect("rotate_left needs a right child");

        let new_top_left = self.get(new_top).left;
        self.get_mut(id).right = new_top_left;
        if let Some(child) = new_top_left {
            self.get_mut(child).parent = Some(id);
        }

        self.replace_child(parent, id, Some(new_top), root);

        self.get_mut(new_top).left = Some(id);
        self.get_mut(id).parent = Some(new_top);

        self.recalc_metadata(id);
        self.recalc_metadata(new_top);
        new_top
    }

    /// Walks from `start` to the root, recomputing metadata and rebalancing
    /// at every level. Returns the id of the (possibly new) tree root.
    pub fn balance_and_update(&mut self, start: NodeId, root: &mut NodeId) {
        let mut current = start;
        loop {
            self.recalc_metadata(current);

            let bf = self.balance_factor(current);
            if bf < -1 {
                let right = self.get(current).right.unwrap();
                if self.balance_factor(right) == 1 {
                    let new_right = self.rotate_right(right, root);
                    self.get_mut(current).right = Some(new_right);
                }
                current = self.rotate_left(current, root);
            } else if bf > 1 {
                let left = self.get(current).left.unwrap();
                if self.balance_factor(left) == -1 {
                    let new_left = self.rotate_left(left, root);
                    self.get_mut(current).left = Some(new_left);
                }
                current = self.rotate_right(current, root);
            }

            self.recalc_metadata(current);

            match self.get(current).parent {
                Some(parent) => current = parent,
                None => {
                    *root = current;
                    return;
                }
            }
        }
    }

    pub fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.get(id).left {
            id = left;
        }
        id
    }

    pub fn rightmost(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.get(id).right {
            id = right;
        }
        id
    }

    /// In-order successor of `id`, or `None` if `id` is the last node.
    pub fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(right) = self.get(id).right {
            return Some(self.leftmost(right));
        }
        let mut current = id;
        loop {
            let parent = self.get(current).parent?;
            if self.get(parent).left == Some(current) {
                return Some(parent);
            }
            current = parent;
        }
    }

    /// In-order predecessor of `id`, or `None` if `id` is the first node.
    pub fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(left) = self.get(id).left {
            return Some(self.rightmost(left));
        }
        let mut current = id;
        loop {
            let parent = self.get(current).parent?;
            if self.get(parent).right == Some(current) {
                return Some(parent);
            }
            current = parent;
        }
    }

    /// Removes `id` from the tree and frees its slot. `root` is updated in
    /// place to reflect any new tree root produced by rebalancing.
    ///
    /// Returns `true` if `id` was the only node in the tree, in which case
    /// `root` is left pointing at the now-freed slot and the caller must
    /// treat the tree as having no root at all rather than read `*root`.
    pub fn remove(&mut self, id: NodeId, root: &mut NodeId) -> bool {
        let node = self.get(id);
        let parent = node.parent;
        let left = node.left;
        let right = node.right;

        let became_empty = parent.is_none() && left.is_none() && right.is_none();

        if let Some(right_id) = right {
            self.replace_child(parent, id, Some(right_id), root);
            if let Some(left_id) = left {
                let attach_point = self.leftmost(right_id);
                self.get_mut(attach_point).left = Some(left_id);
                self.get_mut(left_id).parent = Some(attach_point);
                self.balance_and_update(attach_point, root);
            } else {
                self.balance_and_update(right_id, root);
            }
        } else if let Some(left_id) = left {
            self.replace_child(parent, id, Some(left_id), root);
            self.balance_and_update(left_id, root);
        } else {
            self.replace_child(parent, id, None, root);
            if let Some(parent_id) = parent {
                self.balance_and_update(parent_id, root);
            }
        }

        self.free(id);
        became_empty
    }

    /// Inserts a brand-new node holding `piece` with no parent/children set,
    /// for the caller to splice into the tree.
    pub fn alloc(&mut self, piece: Piece) -> NodeId {
        self.insert(piece)
    }
}
