//! Integration tests for docagram-store
//!
//! These tests drive the store the way an analysis run does: raw model output
//! in, queries and session export out.

use docagram_domain::{DiagramGraph, Relationship};
use docagram_store::RelationshipStore;

#[test]
fn test_basic_parse() {
    let mut store = RelationshipStore::new();

    let added = store.parse_relationships(
        "Google to Chrome Browser (develops and maintains the browser)",
        "http://a",
    );

    assert_eq!(added.len(), 1, "Should add exactly one relationship");
    assert_eq!(added[0].entity1, "Google");
    assert_eq!(added[0].entity2, "Chrome Browser");
    assert_eq!(added[0].description, "develops and maintains the browser");
    assert_eq!(added[0].source_url, "http://a");

    assert_eq!(store.get_entity_count("Google"), 1);
    assert_eq!(store.get_entity_count("Chrome Browser"), 1);
    assert_eq!(store.get_entity_source("Google"), Some("http://a"));
}

#[test]
fn test_reverse_duplicate_rejected() {
    let mut store = RelationshipStore::new();
    store.parse_relationships("A to B (x)", "http://a");

    let added = store.parse_relationships("B to A (x)", "http://b");

    assert!(added.is_empty(), "Reverse duplicate should be rejected");
    assert_eq!(store.len(), 1);
    assert_eq!(store.get_entity_count("A"), 1);
    assert_eq!(store.get_entity_source("B"), Some("http://a"));
}

#[test]
fn test_unmatched_line_changes_nothing() {
    let mut store = RelationshipStore::new();

    let added = store.parse_relationships("This is not a relationship line.", "http://a");

    assert!(added.is_empty());
    assert!(store.is_empty());
    assert!(store.get_entities_list().is_empty());
}

#[test]
fn test_reparse_is_idempotent() {
    let mut store = RelationshipStore::new();
    let output = "1. Alice to Bob (mentors)\n2. Bob to Carol (works with)\nnoise";

    let first = store.parse_relationships(output, "http://a");
    let second = store.parse_relationships(output, "http://a");

    assert_eq!(first.len(), 2);
    assert!(second.is_empty(), "Second identical parse should add nothing");
    assert_eq!(store.len(), 2);
}

#[test]
fn test_delete_entity_leaves_neighbour_counts() {
    let mut store = RelationshipStore::new();
    store.parse_relationships("A to B (x)\nB to C (y)", "http://a");

    let removed = store.delete_entity("B");

    assert_eq!(removed, 2);
    assert!(store.get_relationships().is_empty());
    assert_eq!(store.get_entity_count("B"), 0);
    assert_eq!(store.get_entity_source("B"), None);

    // Neighbours keep their counts and sources
    assert_eq!(store.get_entity_count("A"), 1);
    assert_eq!(store.get_entity_count("C"), 1);
    assert_eq!(store.get_entity_source("A"), Some("http://a"));
    assert_eq!(store.get_entities_list(), vec!["A".to_string(), "C".to_string()]);
}

#[test]
fn test_export_import_count_consistency() {
    let mut store = RelationshipStore::new();
    store.parse_relationships(
        "Google to Chrome (develops)\nGoogle to Android (owns)\nAndroid to Linux (builds on)",
        "http://a",
    );
    store.parse_relationships("Chrome to Blink (uses)", "http://b");
    store.select_entity("Google");

    let export = store.export_to_json();
    let mut restored = RelationshipStore::new();
    restored.import_from_json(export);

    assert_eq!(restored.get_relationships(), store.get_relationships());
    assert_eq!(restored.get_entities_list(), store.get_entities_list());
    assert_eq!(restored.selected_entity(), Some("Google"));
    for name in store.get_entities_list() {
        assert_eq!(
            restored.get_entity_count(&name),
            store.get_entity_count(&name),
            "Count for {} should survive export/import",
            name
        );
        assert_eq!(restored.get_entity_source(&name), store.get_entity_source(&name));
    }
}

#[test]
fn test_import_after_delete_repairs_counts() {
    let mut store = RelationshipStore::new();
    store.parse_relationships("A to B (x)\nB to C (y)\nA to D (z)", "http://a");
    store.delete_entity("B");
    assert_eq!(store.get_entity_count("A"), 2);

    let mut restored = RelationshipStore::new();
    restored.import_from_json(store.export_to_json());

    assert_eq!(restored.get_entity_count("A"), 1);
    assert_eq!(restored.get_entity_count("C"), 0);
    assert_eq!(restored.get_entity_source("C"), Some("http://a"));
}

#[test]
fn test_malformed_import_degrades_to_defaults() {
    let mut store = RelationshipStore::new();
    store.parse_relationships("A to B (x)", "http://a");

    store
        .import_json_str(r#"{"relationships": null, "selectedEntity": "A"}"#)
        .unwrap();

    assert!(store.is_empty());
    assert!(store.get_entities_list().is_empty());
    assert_eq!(store.selected_entity(), Some("A"));
    assert!(store.visible_relationships().is_empty());
}

#[test]
fn test_incremental_chunks_accumulate() {
    let mut store = RelationshipStore::new();
    let chunks = [
        "Rust to Mozilla (originally sponsored by)",
        "Cargo to Rust (package manager for)\nMozilla to Rust (sponsored)",
        "Rust to Mozilla (originally sponsored by)\nCrates.io to Cargo (registry for)",
    ];

    let added: Vec<usize> = chunks
        .iter()
        .map(|chunk| store.parse_relationships(chunk, "http://rust").len())
        .collect();

    assert_eq!(added, vec![1, 2, 1]);
    assert_eq!(store.get_entity_count("Rust"), 3);
    assert_eq!(
        store.get_entity_relationships("Cargo"),
        vec![
            Relationship::new("Cargo", "Rust", "package manager for", ""),
            Relationship::new("Crates.io", "Cargo", "registry for", ""),
        ]
    );
}

#[test]
fn test_selection_feeds_diagram() {
    let mut store = RelationshipStore::new();
    store.parse_relationships("A to B (x)\nB to C (y)\nD to E (z)", "http://a");

    store.select_entity("B");
    let graph = DiagramGraph::project(&store.visible_relationships());

    assert_eq!(graph.edges.len(), 2);
    assert_eq!(graph.nodes.len(), 3);
    assert_eq!(graph.entity_for_key("C"), Some("C"));
    assert_eq!(graph.entity_for_key("D"), None);
}
