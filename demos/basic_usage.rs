#[path = "demo_buffer.rs"]
mod demo_buffer;

use demo_buffer::DemoBuffer;
use piece_tree::PieceTree;

fn line_text(buffer: &DemoBuffer, pieces: &[piece_tree::Piece]) -> String {
    pieces.iter().map(|p| buffer.slice(p)).collect()
}

fn print_lines(tree: &PieceTree, buffer: &DemoBuffer, label: &str) {
    println!("   {label}:");
    let mut line = 0;
    loop {
        match tree.get_line_pieces(line) {
            Ok(pieces) => {
                println!("     line {line}: {:?}", line_text(buffer, &pieces));
                line += 1;
            }
            Err(_) => break,
        }
    }
}

fn main() {
    println!("=== PieceTree Basic Usage Example ===\n");

    // Example 1: Building a document by appending to the added buffer and
    // inserting the resulting piece.
    println!("1. Building a document from one append:");
    let mut buffer = DemoBuffer::new();
    let mut tree = PieceTree::new();

    let p1 = buffer.append("Hello, World!\nThis is line 2.\nAnd this is line 3.");
    tree.insert(p1, 0, 0).unwrap();
    print_lines(&tree, &buffer, "initial document");

    // Example 2: Inserting more text in the middle of an existing line.
    println!("\n2. Inserting into an existing line:");
    let p2 = buffer.append(" (inserted)");
    tree.insert(p2, 0, 6).unwrap();
    print_lines(&tree, &buffer, "after insert");

    // Example 3: Removing a span of text.
    println!("\n3. Removing a span:");
    tree.remove(0, 6, 11).unwrap();
    print_lines(&tree, &buffer, "after remove");

    // Example 4: Iterating over the raw pieces making up the tree.
    println!("\n4. Raw piece layout:");
    for piece in tree.iter() {
        println!(
            "   piece: offset={} length={} line_breaks={:?} -> {:?}",
            piece.offset,
            piece.length,
            piece.line_breaks,
            buffer.slice(piece)
        );
    }

    // Example 5: A removal that runs past the end of the document fails
    // instead of silently truncating.
    println!("\n5. Over-long removal is rejected:");
    match tree.remove(0, 0, 10_000) {
        Ok(()) => println!("   unexpectedly succeeded"),
        Err(e) => println!("   rejected as expected: {e}"),
    }

    // Example 6: UTF-8 content is handled as opaque units; the piece tree
    // never interprets bytes, only line-break positions the caller supplies.
    println!("\n6. UTF-8 content:");
    let mut utf8_buffer = DemoBuffer::new();
    let mut utf8_tree = PieceTree::new();
    let p = utf8_buffer.append("Hello 世界\nこんにちは\n🦀 Rust");
    utf8_tree.insert(p, 0, 0).unwrap();
    print_lines(&utf8_tree, &utf8_buffer, "utf8 document");

    println!("\n=== Example completed ===");
}
