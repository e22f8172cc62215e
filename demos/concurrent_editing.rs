//! Concurrent editing example for the sequence-tree CRDT.
//!
//! Two replicas edit the same document at the same time, then exchange
//! events and converge. Also shows the collision signal a transport
//! layer has to handle when two replicas race for the same identifier.
//!
//! Run with: cargo run --example concurrent_editing
//! Set RUST_LOG=crdt_lseq=debug to watch identifier allocation.

use crdt_lseq::{Event, Tree, TreeError};
use tracing_subscriber::EnvFilter;

fn replicate(events: &[Event], target: &mut Tree) {
    for event in events {
        match target.apply(event.clone()) {
            Ok(()) => {}
            Err(TreeError::IdentifierCollision(id)) => {
                // Both replicas raced for the same slot; in a real
                // system the sender reallocates and resends.
                println!("  ! collision on {id}, sender must reallocate");
            }
            Err(err) => println!("  ! rejected event: {err}"),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Concurrent Editing Example ===\n");

    // Both replicas start from the same synchronized document
    let mut base = Tree::new();
    for (i, ch) in "The fox jumps".chars().enumerate() {
        base.insert_at(i, ch.into()).unwrap();
    }
    let mut alice = base.clone();
    let mut bob = base;

    println!("Shared starting document: '{}'\n", alice.to_text());

    // Alice inserts "quick " in the middle while Bob rewrites the end
    println!("Alice inserts 'quick ' after 'The ':");
    let mut alice_events: Vec<Event> = Vec::new();
    for (offset, ch) in "quick ".chars().enumerate() {
        alice_events.extend(alice.insert_at(4 + offset, ch.into()).unwrap());
    }
    println!("  Alice's document: '{}'", alice.to_text());

    println!("Bob deletes 'jumps' and appends 'sleeps':");
    let mut bob_events: Vec<Event> = Vec::new();
    for _ in 0..5 {
        let end = bob.visible_node_count();
        bob_events.push(bob.delete_at(end - 1).unwrap());
    }
    for ch in "sleeps".chars() {
        let end = bob.visible_node_count();
        bob_events.extend(bob.insert_at(end, ch.into()).unwrap());
    }
    println!("  Bob's document:   '{}'\n", bob.to_text());

    // Exchange events
    println!("Exchanging events...");
    replicate(&bob_events, &mut alice);
    replicate(&alice_events, &mut bob);

    println!("\n--- After Synchronization ---");
    println!("  Alice sees: '{}'", alice.to_text());
    println!("  Bob sees:   '{}'", bob.to_text());

    if alice.to_text() == bob.to_text() {
        println!("\n✓ SUCCESS: Replicas converged!");
    } else {
        println!("\n✗ ERROR: Replicas did not converge!");
    }

    // Front insertion storm: the allocation strategies keep identifiers
    // short even when every insert lands at position 0
    println!("\n=== Front Insertion Storm ===");
    let mut storm = Tree::new();
    let mut storm_events: Vec<Event> = Vec::new();
    for i in 0..40u32 {
        let ch = char::from_u32(65 + (i % 26)).unwrap();
        storm_events.extend(storm.insert_at(0, ch.into()).unwrap());
    }
    let deepest = storm
        .iter()
        .map(|node| node.identifier().len())
        .max()
        .unwrap();
    println!("40 front inserts, deepest identifier: {deepest} digits");
    println!("({} events emitted, relocations included)", storm_events.len());

    // A fresh replica replays the storm verbatim
    let mut mirror = Tree::new();
    replicate(&storm_events, &mut mirror);
    println!(
        "replica convergence after replay: {}",
        if mirror.to_text() == storm.to_text() {
            "✓"
        } else {
            "✗"
        }
    );

    println!("\n=== Example Complete ===");
}
