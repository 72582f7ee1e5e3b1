// Tests for the read-only query layer: listing, resolution and path finding

use ringmap_core::analyze::analyze;
use ringmap_core::graph::RingGraph;
use ringmap_core::members::Member;
use ringmap_core::query::{QuerySnapshot, ITEMS_PER_PAGE};
use ringmap_spider::ClassificationRecord;

fn member(id: i64, name: &str, url: &str) -> Member {
    Member {
        id,
        name: name.to_string(),
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

fn host(id: i64) -> String {
    format!("https://m{}.example/", id)
}

fn snapshot_of(members: Vec<Member>, records: Vec<ClassificationRecord>) -> QuerySnapshot {
    let graph = RingGraph::build(members, &records).unwrap();
    let stats = analyze(&graph);
    QuerySnapshot::new(graph, stats)
}

// ============================================================================
// Resolution Tests
// ============================================================================

#[test]
fn test_resolve_by_id_and_host() {
    let snapshot = snapshot_of(
        vec![member(7, "Alpha", "https://www.a.example/")],
        Vec::new(),
    );

    assert_eq!(snapshot.resolve("7"), Some(7));
    assert_eq!(snapshot.resolve("a.example"), Some(7));
    assert_eq!(snapshot.resolve("www.a.example"), Some(7));
    assert_eq!(snapshot.resolve("https://a.example/about"), Some(7));
    assert_eq!(snapshot.resolve("8"), None);
    assert_eq!(snapshot.resolve("b.example"), None);
}

// ============================================================================
// Listing Tests
// ============================================================================

#[test]
fn test_list_paginates() {
    let members: Vec<Member> = (1..=40)
        .map(|id| member(id, &format!("Member {}", id), &host(id)))
        .collect();
    let snapshot = snapshot_of(members, Vec::new());

    let first = snapshot.list(1, None);
    assert_eq!(first.total_items, 40);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.items.len(), ITEMS_PER_PAGE);

    let second = snapshot.list(2, None);
    assert_eq!(second.items.len(), 40 - ITEMS_PER_PAGE);
    assert_eq!(second.items[0].id, ITEMS_PER_PAGE as i64 + 1);
}

#[test]
fn test_list_page_beyond_end_is_empty() {
    let snapshot = snapshot_of(vec![member(1, "Alpha", &host(1))], Vec::new());
    let listing = snapshot.list(5, None);
    assert!(listing.items.is_empty());
    assert_eq!(listing.total_items, 1);
}

#[test]
fn test_list_search_is_case_insensitive() {
    let snapshot = snapshot_of(
        vec![
            member(1, "Alpha Blog", &host(1)),
            member(2, "Beta Notes", &host(2)),
        ],
        Vec::new(),
    );

    let listing = snapshot.list(1, Some("ALPHA"));
    assert_eq!(listing.total_items, 1);
    assert_eq!(listing.items[0].id, 1);
}

#[test]
fn test_list_search_matches_links_page() {
    let records = vec![ClassificationRecord::DirectoryFound {
        start: host(1),
        target: format!("{}friends", host(1)),
    }];
    let snapshot = snapshot_of(
        vec![member(1, "Alpha", &host(1)), member(2, "Beta", &host(2))],
        records,
    );

    let listing = snapshot.list(1, Some("friends"));
    assert_eq!(listing.total_items, 1);
    assert_eq!(listing.items[0].id, 1);
}

// ============================================================================
// Shortest Path Tests
// ============================================================================

#[test]
fn test_single_shortest_path() {
    let snapshot = snapshot_of(
        vec![
            member(1, "Alpha", &host(1)),
            member(2, "Beta", &host(2)),
            member(3, "Gamma", &host(3)),
        ],
        vec![link(&host(1), &host(2)), link(&host(2), &host(3))],
    );

    let result = snapshot.shortest_paths(1, 3);
    assert_eq!(result.distance, 2);
    assert_eq!(result.paths, vec![vec![1, 2, 3]]);
    let ids: Vec<i64> = result.nodes.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn test_all_equally_short_paths_are_returned() {
    // diamond: 1 -> {2, 3} -> 4
    let snapshot = snapshot_of(
        vec![
            member(1, "Alpha", &host(1)),
            member(2, "Beta", &host(2)),
            member(3, "Gamma", &host(3)),
            member(4, "Delta", &host(4)),
        ],
        vec![
            link(&host(1), &host(2)),
            link(&host(1), &host(3)),
            link(&host(2), &host(4)),
            link(&host(3), &host(4)),
        ],
    );

    let result = snapshot.shortest_paths(1, 4);
    assert_eq!(result.distance, 2);
    assert_eq!(result.paths, vec![vec![1, 2, 4], vec![1, 3, 4]]);
}

#[test]
fn test_longer_path_is_not_reported() {
    // 1 -> 2 directly, and also 1 -> 3 -> 2
    let snapshot = snapshot_of(
        vec![
            member(1, "Alpha", &host(1)),
            member(2, "Beta", &host(2)),
            member(3, "Gamma", &host(3)),
        ],
        vec![
            link(&host(1), &host(2)),
            link(&host(1), &host(3)),
            link(&host(3), &host(2)),
        ],
    );

    let result = snapshot.shortest_paths(1, 2);
    assert_eq!(result.distance, 1);
    assert_eq!(result.paths, vec![vec![1, 2]]);
}

#[test]
fn test_unreachable_target_reports_minus_one() {
    let snapshot = snapshot_of(
        vec![member(1, "Alpha", &host(1)), member(2, "Beta", &host(2))],
        vec![link(&host(2), &host(1))],
    );

    let result = snapshot.shortest_paths(1, 2);
    assert_eq!(result.distance, -1);
    assert!(result.paths.is_empty());
    let ids: Vec<i64> = result.nodes.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn test_path_to_self_is_trivial() {
    let snapshot = snapshot_of(vec![member(1, "Alpha", &host(1))], Vec::new());

    let result = snapshot.shortest_paths(1, 1);
    assert_eq!(result.distance, 0);
    assert_eq!(result.paths, vec![vec![1]]);
}

// ============================================================================
// Neighbor Tests
// ============================================================================

#[test]
fn test_successors_and_predecessors() {
    let snapshot = snapshot_of(
        vec![
            member(1, "Alpha", &host(1)),
            member(2, "Beta", &host(2)),
            member(3, "Gamma", &host(3)),
        ],
        vec![
            link(&host(1), &host(2)),
            link(&host(3), &host(2)),
            link(&host(2), &host(3)),
        ],
    );

    let successors: Vec<i64> = snapshot.successors(2).iter().map(|n| n.id).collect();
    assert_eq!(successors, vec![3]);

    let predecessors: Vec<i64> = snapshot.predecessors(2).iter().map(|n| n.id).collect();
    assert_eq!(predecessors, vec![1, 3]);
}

#[test]
fn test_unknown_member_has_no_neighbors() {
    let snapshot = snapshot_of(vec![member(1, "Alpha", &host(1))], Vec::new());
    assert!(snapshot.successors(99).is_empty());
    assert!(snapshot.predecessors(99).is_empty());
}
