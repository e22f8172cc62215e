//! Integration tests for the LSEQ sequence-tree CRDT.
//!
//! These tests verify correctness across multiple scenarios including
//! basic positional editing, concurrent editing, and convergence
//! properties.

use crdt_lseq::{Tree, TreeError, Value};

fn build_text(tree: &mut Tree, text: &str) {
    for (i, character) in text.chars().enumerate() {
        tree.insert_at(i, character.into()).unwrap();
    }
}

#[test]
fn test_basic_sequence_operations() {
    let mut tree = Tree::new();
    assert_eq!(tree.to_text(), "");
    assert_eq!(tree.visible_node_count(), 0);

    build_text(&mut tree, "abc");
    assert_eq!(tree.to_text(), "abc");
    assert_eq!(tree.visible_node_count(), 3);

    // Delete middle character
    tree.delete_at(1).unwrap();
    assert_eq!(tree.to_text(), "ac");
    assert_eq!(tree.visible_node_count(), 2);
    assert_eq!(tree.total_node_count(), 3); // tombstone retained
}

#[test]
fn test_single_insert_emits_single_event() {
    let mut tree = Tree::new();
    let events = tree.insert_at(0, 'a'.into()).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(tree.to_text(), "a");
}

#[test]
fn test_middle_insert() {
    let mut tree = Tree::new();
    build_text(&mut tree, "ac");

    tree.insert_at(1, 'b'.into()).unwrap();
    assert_eq!(tree.to_text(), "abc");
}

#[test]
fn test_order_invariant_against_vec() {
    // Scripted inserts at arbitrary positions must land exactly where a
    // plain Vec would put them.
    let mut tree = Tree::new();
    let mut mirror: Vec<char> = Vec::new();
    let script = [
        (0, 'a'),
        (1, 'b'),
        (0, 'c'),
        (2, 'd'),
        (1, 'e'),
        (5, 'f'),
        (3, 'g'),
        (0, 'h'),
        (4, 'i'),
        (8, 'j'),
    ];

    for (position, character) in script {
        tree.insert_at(position, character.into()).unwrap();
        mirror.insert(position, character);
        assert_eq!(tree.to_text(), mirror.iter().collect::<String>());
    }
}

#[test]
fn test_deletes_mirror_vec() {
    let mut tree = Tree::new();
    let mut mirror: Vec<char> = "abcdefgh".chars().collect();
    build_text(&mut tree, "abcdefgh");

    for position in [3, 0, 5, 2, 0] {
        tree.delete_at(position).unwrap();
        mirror.remove(position);
        assert_eq!(tree.to_text(), mirror.iter().collect::<String>());
    }
}

#[test]
fn test_replication_through_events() {
    let mut tree = Tree::new();
    let mut replica = Tree::new();

    let mut events = Vec::new();
    for (i, character) in "hello".chars().enumerate() {
        events.extend(tree.insert_at(i, character.into()).unwrap());
    }
    events.push(tree.delete_at(0).unwrap());

    for event in events {
        replica.apply(event).unwrap();
    }

    assert_eq!(replica.to_text(), tree.to_text());
    assert_eq!(replica.to_text(), "ello");
    assert_eq!(replica.total_node_count(), tree.total_node_count());
}

#[test]
fn test_concurrent_inserts_at_same_position_converge() {
    // Two replicas insert at the same position concurrently. With very
    // low probability both pick the same identifier, which would
    // surface as a collision on apply and require the sender to redo
    // the insert, so the scenario retries until the identifiers differ.
    let mut converged = false;

    for _ in 0..20 {
        let mut base = Tree::new();
        build_text(&mut base, "ac");
        let mut tree1 = base.clone();
        let mut tree2 = base;

        let events1 = tree1.insert_at(1, 'X'.into()).unwrap();
        let events2 = tree2.insert_at(1, 'Y'.into()).unwrap();
        if events1[0].identifier() == events2[0].identifier() {
            continue;
        }

        for event in events2 {
            tree1.apply(event).unwrap();
        }
        for event in events1 {
            tree2.apply(event).unwrap();
        }

        assert_eq!(tree1.to_text(), tree2.to_text());
        let text = tree1.to_text();
        assert!(text == "aXYc" || text == "aYXc", "unexpected merge: {text}");
        converged = true;
        break;
    }

    assert!(converged, "replicas kept colliding on the same identifier");
}

#[test]
fn test_event_order_independence() {
    // Two independent event streams applied in different interleavings
    // (each stream staying in order) produce identical trees.
    let mut base = Tree::new();
    build_text(&mut base, "abc");

    let mut tree1 = base.clone();
    let mut tree2 = base.clone();
    let mut observer = base;

    let mut stream1 = Vec::new();
    stream1.extend(tree1.insert_at(1, 'X'.into()).unwrap());
    stream1.extend(tree1.insert_at(4, 'Z'.into()).unwrap());
    stream1.push(tree1.delete_at(0).unwrap());

    let mut stream2 = Vec::new();
    stream2.extend(tree2.insert_at(2, 'Y'.into()).unwrap());

    // tree1 sees stream2 after its own ops, tree2 the reverse, and the
    // observer sees stream2 interleaved into stream1.
    for event in &stream2 {
        tree1.apply(event.clone()).unwrap();
    }
    for event in &stream1 {
        tree2.apply(event.clone()).unwrap();
    }
    for (i, event) in stream1.iter().enumerate() {
        observer.apply(event.clone()).unwrap();
        if i == 0 {
            for event in &stream2 {
                observer.apply(event.clone()).unwrap();
            }
        }
    }

    assert_eq!(tree1.to_text(), tree2.to_text());
    assert_eq!(tree1.to_text(), observer.to_text());
    assert_eq!(tree1.to_text().len(), 5);
}

#[test]
fn test_concurrent_deletion_of_same_node() {
    let mut base = Tree::new();
    build_text(&mut base, "ab");
    let mut tree1 = base.clone();
    let mut tree2 = base;

    let delete1 = tree1.delete_at(0).unwrap();
    let delete2 = tree2.delete_at(0).unwrap();
    assert_eq!(delete1.identifier(), delete2.identifier());

    tree1.apply(delete2).unwrap();
    tree2.apply(delete1).unwrap();

    assert_eq!(tree1.to_text(), "b");
    assert_eq!(tree2.to_text(), "b");
}

#[test]
fn test_reference_sequences() {
    // Block-ordering sequences carry block ids instead of characters.
    let mut tree = Tree::new();
    tree.insert_at(0, "block-1".into()).unwrap();
    tree.insert_at(1, "block-2".into()).unwrap();
    tree.insert_at(1, "block-3".into()).unwrap();

    assert_eq!(
        tree.to_values(),
        vec![
            Value::Reference("block-1".to_string()),
            Value::Reference("block-3".to_string()),
            Value::Reference("block-2".to_string()),
        ]
    );
}

#[test]
fn test_error_handling() {
    let mut tree = Tree::new();

    assert_eq!(
        tree.insert_at(1, 'a'.into()),
        Err(TreeError::PositionOutOfRange {
            position: 1,
            size: 0
        })
    );
    assert_eq!(
        tree.delete_at(0),
        Err(TreeError::PositionOutOfRange {
            position: 0,
            size: 0
        })
    );

    build_text(&mut tree, "ab");
    assert_eq!(
        tree.delete_at(2),
        Err(TreeError::PositionOutOfRange {
            position: 2,
            size: 2
        })
    );
}
