// Tests for graph building from registry members and classification records

use ringmap_core::graph::{RingGraph, GRAPH_FILE};
use ringmap_core::members::Member;
use ringmap_spider::ClassificationRecord;

fn member(id: i64, url: &str) -> Member {
    Member {
        id,
        name: format!("Member {}", id),
        status: "RUN".to_string(),
        url: url.to_string(),
        tags: Vec::new(),
        failed_reason: None,
    }
}

fn link(start: &str, target: &str) -> ClassificationRecord {
    ClassificationRecord::LinkFound {
        start: start.to_string(),
        from: format!("{}friends", start),
        target: target.to_string(),
        selector: "main".to_string(),
    }
}

// ============================================================================
// Node Set Tests
// ============================================================================

#[test]
fn test_every_member_is_a_node_even_without_records() {
    let members = vec![
        member(1, "https://a.example/"),
        member(2, "https://b.example/"),
        member(3, "https://c.example/"),
    ];
    let graph = RingGraph::build(members, &[]).unwrap();

    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_isolated_member_keeps_its_node_alongside_edges() {
    let members = vec![
        member(1, "https://a.example/"),
        member(2, "https://b.example/"),
        member(3, "https://lonely.example/"),
    ];
    let records = vec![link("https://a.example/", "https://b.example/")];
    let graph = RingGraph::build(members, &records).unwrap();

    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 1);
    assert!(graph.successors(3).is_empty());
    assert!(graph.predecessors(3).is_empty());
}

// ============================================================================
// Edge Tests
// ============================================================================

#[test]
fn test_link_records_become_directed_edges() {
    let members = vec![member(1, "https://a.example/"), member(2, "https://b.example/")];
    let records = vec![link("https://a.example/", "https://b.example/")];
    let graph = RingGraph::build(members, &records).unwrap();

    assert!(graph.contains_edge(1, 2));
    assert!(!graph.contains_edge(2, 1));
}

#[test]
fn test_duplicate_links_collapse_to_one_edge() {
    let members = vec![member(1, "https://a.example/"), member(2, "https://b.example/")];
    let records = vec![
        link("https://a.example/", "https://b.example/"),
        link("https://a.example/", "https://b.example/"),
        link("https://a.example/", "https://www.b.example/"),
    ];
    let graph = RingGraph::build(members, &records).unwrap();

    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn test_self_links_are_dropped() {
    let members = vec![member(1, "https://a.example/"), member(2, "https://b.example/")];
    // the www variant normalizes to the same host as the start
    let records = vec![link("https://a.example/", "https://www.a.example/")];
    let graph = RingGraph::build(members, &records).unwrap();

    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_links_to_unknown_hosts_are_dropped() {
    let members = vec![member(1, "https://a.example/")];
    let records = vec![
        link("https://a.example/", "https://stranger.example/"),
        link("https://stranger.example/", "https://a.example/"),
    ];
    let graph = RingGraph::build(members, &records).unwrap();

    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_hosts_normalize_before_matching() {
    let members = vec![
        member(1, "https://www.a.example/"),
        member(2, "https://blog.b.example/"),
    ];
    let records = vec![link("https://a.example/", "https://b.example/")];
    let graph = RingGraph::build(members, &records).unwrap();

    assert!(graph.contains_edge(1, 2));
}

// ============================================================================
// Links Page Tests
// ============================================================================

#[test]
fn test_directory_record_sets_links_page() {
    let members = vec![member(1, "https://a.example/")];
    let records = vec![ClassificationRecord::DirectoryFound {
        start: "https://a.example/".to_string(),
        target: "https://a.example/friends".to_string(),
    }];
    let graph = RingGraph::build(members, &records).unwrap();

    assert_eq!(graph.links_page(1), Some("https://a.example/friends"));
    assert_eq!(graph.links_page(2), None);
}

#[test]
fn test_later_directory_record_wins() {
    let members = vec![member(1, "https://a.example/")];
    let records = vec![
        ClassificationRecord::DirectoryFound {
            start: "https://a.example/".to_string(),
            target: "https://a.example/links".to_string(),
        },
        ClassificationRecord::DirectoryFound {
            start: "https://a.example/".to_string(),
            target: "https://a.example/friends".to_string(),
        },
    ];
    let graph = RingGraph::build(members, &records).unwrap();

    assert_eq!(graph.links_page(1), Some("https://a.example/friends"));
}

// ============================================================================
// Snapshot Tests
// ============================================================================

#[test]
fn test_snapshot_round_trip_preserves_graph() {
    let members = vec![
        member(1, "https://a.example/"),
        member(2, "https://b.example/"),
        member(3, "https://c.example/"),
    ];
    let records = vec![
        link("https://a.example/", "https://b.example/"),
        link("https://b.example/", "https://c.example/"),
        ClassificationRecord::DirectoryFound {
            start: "https://a.example/".to_string(),
            target: "https://a.example/friends".to_string(),
        },
    ];
    let graph = RingGraph::build(members, &records).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(GRAPH_FILE);
    graph.save(&path).unwrap();

    let loaded = RingGraph::load(&path).unwrap();
    assert_eq!(loaded.node_count(), 3);
    assert!(loaded.contains_edge(1, 2));
    assert!(loaded.contains_edge(2, 3));
    assert_eq!(loaded.links_page(1), Some("https://a.example/friends"));
}

#[test]
fn test_snapshot_is_deterministic() {
    let members = vec![
        member(1, "https://a.example/"),
        member(2, "https://b.example/"),
        member(3, "https://c.example/"),
    ];
    let records = vec![
        link("https://c.example/", "https://a.example/"),
        link("https://a.example/", "https://b.example/"),
        link("https://b.example/", "https://c.example/"),
    ];

    let first = RingGraph::build(members.clone(), &records).unwrap().snapshot();
    let second = RingGraph::build(members, &records).unwrap().snapshot();

    assert_eq!(first.edges, second.edges);
    assert_eq!(first.edges, vec![(1, 2), (2, 3), (3, 1)]);
}

#[test]
fn test_host_collision_is_fatal() {
    let members = vec![
        member(1, "https://www.a.example/"),
        member(2, "https://blog.a.example/"),
    ];
    assert!(RingGraph::build(members, &[]).is_err());
}
