#[path = "demo_buffer.rs"]
mod demo_buffer;

use demo_buffer::DemoBuffer;
use piece_tree::PieceTree;
use std::time::Instant;

/// Builds a document out of `count` separately-appended, separately-inserted
/// lines, each becoming its own piece — the worst case for piece count, and
/// the case real editors hit on every keystroke.
fn build_by_line(count: usize) -> (PieceTree, DemoBuffer, usize) {
    let mut buffer = DemoBuffer::new();
    let mut tree = PieceTree::new();
    let mut line = 0;

    for i in 0..count {
        let piece = buffer.append(&format!("This is line {i} with some content.\n"));
        tree.insert(piece, line, 0).unwrap();
        line += 1;
    }

    (tree, buffer, line)
}

fn main() {
    println!("=== PieceTree Performance Demo ===\n");

    // Demo 1: Building a large document one inserted line at a time.
    println!("1. Building a large document from 1000 inserted lines:");
    let start = Instant::now();
    let (tree, buffer, line_count) = build_by_line(1000);
    let build_time = start.elapsed();

    let piece_count = tree.iter().count();
    println!("   Built {line_count} lines ({piece_count} pieces) in {build_time:?}");
    println!("   Added-buffer length: {} bytes", buffer.content().len());

    // Demo 2: Random line access.
    println!("\n2. Random line access performance:");
    let start = Instant::now();
    let mut total_chars = 0;

    for i in (0..100).map(|x| (x * 7) % line_count) {
        if let Ok(pieces) = tree.get_line_pieces(i) {
            total_chars += pieces.iter().map(|p| p.length).sum::<usize>();
        }
    }

    let access_time = start.elapsed();
    println!("   Accessed 100 random lines in {access_time:?}");
    println!("   Total units read: {total_chars}");

    // Demo 3: Sequential line access via get_line_pieces.
    println!("\n3. Sequential line access performance:");
    let start = Instant::now();
    let mut lines_seen = 0;

    for i in 0..line_count {
        if tree.get_line_pieces(i).is_ok() {
            lines_seen += 1;
        }
    }

    let sequential_time = start.elapsed();
    println!("   Accessed {lines_seen} lines sequentially in {sequential_time:?}");

    // Demo 4: Sequential line access via the in-order iterator, which never
    // re-walks the tree from the root.
    println!("\n4. Full in-order iteration performance:");
    let start = Instant::now();
    let piece_count = tree.iter().count();
    let iter_time = start.elapsed();
    println!("   Iterated {piece_count} pieces in {iter_time:?}");

    // Demo 5: Repeated-content efficiency — appending the same text many
    // times still produces one piece per insertion, independent of how
    // much the added buffer itself has grown.
    println!("\n5. Repeated-content piece layout:");
    let mut repeat_buffer = DemoBuffer::new();
    let mut repeat_tree = PieceTree::new();
    let repeated_line = "This line is repeated many times to demonstrate efficiency.\n";

    for i in 0..100 {
        let piece = repeat_buffer.append(repeated_line);
        repeat_tree.insert(piece, i, 0).unwrap();
    }

    println!(
        "   {} pieces over {} bytes of added-buffer content",
        repeat_tree.iter().count(),
        repeat_buffer.content().len()
    );

    // Demo 6: Removal performance once the tree has grown large.
    println!("\n6. Bulk removal performance:");
    let mut removal_tree = tree.clone();
    let start = Instant::now();
    let mut removed_lines = 0;

    for _ in 0..500 {
        if removal_tree.remove(0, 0, 1).is_ok() {
            removed_lines += 1;
        }
    }

    let removal_time = start.elapsed();
    println!("   Removed {removed_lines} units from the front in {removal_time:?}");

    println!("\n=== Performance Demo Completed ===");
    println!("\nKey Observations:");
    println!("- Inserting at a (line, column) is O(log n) in the number of pieces");
    println!("- Line lookup relies on cached per-node line-break counts, not a content scan");
    println!("- Piece count tracks edit count, not document size");
    println!("- Removal splits at most two pieces regardless of tree size");
}
