//! Simple standalone example of the sequence-tree CRDT.
//!
//! Two users edit a shared document, synchronizing through events after
//! each editing session.
//!
//! Run with: cargo run --example simple

use crdt_lseq::{Event, Tree};

fn main() {
    println!("=== Simple Sequence CRDT Example ===\n");

    // Create two replicas representing two users
    let mut alice = Tree::new();
    let mut bob = Tree::new();

    println!("Alice and Bob start editing a document\n");

    // Alice types "Hello"
    println!("Alice types 'Hello':");
    let mut alice_events: Vec<Event> = Vec::new();
    for (i, ch) in "Hello".chars().enumerate() {
        alice_events.extend(alice.insert_at(i, ch.into()).unwrap());
    }
    println!("  Alice's document: '{}'", alice.to_text());

    // Bob receives Alice's changes
    println!("\nBob receives Alice's events...");
    for event in alice_events {
        bob.apply(event).unwrap();
    }
    println!("  Bob's document: '{}'", bob.to_text());

    // Bob appends " World!"
    println!("\nBob appends ' World!':");
    let mut bob_events: Vec<Event> = Vec::new();
    let mut position = bob.visible_node_count();
    for ch in " World!".chars() {
        bob_events.extend(bob.insert_at(position, ch.into()).unwrap());
        position += 1;
    }
    println!("  Bob's document: '{}'", bob.to_text());

    // Alice receives Bob's changes
    println!("\nAlice receives Bob's events...");
    for event in bob_events {
        alice.apply(event).unwrap();
    }

    println!("\n--- After Synchronization ---");
    println!("  Alice sees: '{}'", alice.to_text());
    println!("  Bob sees:   '{}'", bob.to_text());

    if alice.to_text() == bob.to_text() {
        println!("\n✓ SUCCESS: Both users converged to the same document!");
    } else {
        println!("\n✗ ERROR: Documents did not converge!");
    }

    // Show the identifier layout
    println!("\n--- Technical Details ---");
    println!("Positions are determined by path identifiers:");
    alice.dump_nodes();

    // Demonstrate deletion
    println!("\n=== Deletion Example ===");
    println!("Alice deletes the first character");
    let delete_event = alice.delete_at(0).unwrap();
    println!("  Alice's document: '{}'", alice.to_text());

    println!("Synchronizing deletion to Bob...");
    bob.apply(delete_event).unwrap();
    println!("  Bob's document: '{}'", bob.to_text());

    if alice.to_text() == bob.to_text() {
        println!("✓ Deletion synchronized successfully!");
    }

    println!("\n=== Example Complete ===");
    println!("The tree keeps deleted characters as tombstones, so");
    println!("future edits near them stay well-defined on every replica.");
}
