//! A caller-owned, append-only text store for the runnable demos.
//!
//! `piece_tree::PieceTree` never reads or stores characters; something has
//! to play the role of the "added buffer" from the piece-tree design and
//! hand back [`Piece`] descriptors pointing into it. `DemoBuffer` is that
//! something — real applications would back it with a rope, a memory-mapped
//! file, or a structured edit log instead.

use piece_tree::{BufferKind, Piece};

/// An append-only store of text, handing out [`Piece`]s that describe the
/// slices appended to it.
#[derive(Debug, Clone, Default)]
pub struct DemoBuffer {
    content: String,
}

impl DemoBuffer {
    pub fn new() -> Self {
        Self {
            content: String::new(),
        }
    }

    /// Appends `text`, returning a [`Piece`] describing exactly the slice
    /// just appended.
    pub fn append(&mut self, text: &str) -> Piece {
        let offset = self.content.len();
        let line_breaks = text
            .char_indices()
            .filter(|&(_, ch)| ch == '\n')
            .map(|(i, _)| i)
            .collect();
        self.content.push_str(text);
        Piece::new(BufferKind::Added, offset, text.len(), line_breaks)
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Reads back the text a piece describes. Panics if `piece` doesn't
    /// reference this buffer's added content — demos only ever construct
    /// pieces through [`DemoBuffer::append`], so this always holds for
    /// them.
    pub fn slice(&self, piece: &Piece) -> &str {
        assert!(
            matches!(piece.buffer_kind, BufferKind::Added),
            "DemoBuffer only backs the added buffer"
        );
        &self.content[piece.offset..piece.end()]
    }
}
