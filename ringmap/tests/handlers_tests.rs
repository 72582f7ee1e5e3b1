use ringmap::handlers::*;
use ringmap_core::analyze;
use ringmap_core::graph::{RingGraph, GRAPH_FILE};
use ringmap_core::members::Member;
use ringmap_core::query::{save_stats, QuerySnapshot, STATS_FILE};
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

fn snapshot() -> QuerySnapshot {
    let members = vec![
        member(1, "Alpha", "https://a.example/"),
        member(2, "Beta", "https://b.example/"),
        member(3, "Gamma", "https://c.example/"),
    ];
    let records = vec![
        link("https://a.example/", "https://b.example/"),
        link("https://b.example/", "https://c.example/"),
    ];
    let graph = RingGraph::build(members, &records).unwrap();
    let stats = analyze::analyze(&graph);
    QuerySnapshot::new(graph, stats)
}

#[test]
fn test_expand_data_dir_plain_path() {
    assert_eq!(expand_data_dir("/tmp/ringmap"), std::path::PathBuf::from("/tmp/ringmap"));
}

#[test]
fn test_expand_data_dir_tilde() {
    let expanded = expand_data_dir("~/ringmap-data");
    assert!(!expanded.to_string_lossy().starts_with('~'));
    assert!(expanded.to_string_lossy().ends_with("ringmap-data"));
}

#[test]
fn test_render_listing_shows_all_members() {
    let snapshot = snapshot();
    let listing = snapshot.list(1, None);
    let text = render_listing(&listing);

    assert!(text.contains("Page 1/1 (3 members)"));
    assert!(text.contains("#1 Alpha <https://a.example/>"));
    assert!(text.contains("#3 Gamma <https://c.example/>"));
}

#[test]
fn test_render_listing_search_filters() {
    let snapshot = snapshot();
    let listing = snapshot.list(1, Some("beta"));
    let text = render_listing(&listing);

    assert!(text.contains("#2 Beta"));
    assert!(!text.contains("#1 Alpha"));
}

#[test]
fn test_render_paths_chain() {
    let snapshot = snapshot();
    let result = snapshot.shortest_paths(1, 3);
    let text = render_paths(&result);

    assert!(text.contains("Distance 2 (1 path)"));
    assert!(text.contains("Alpha (#1) -> Beta (#2) -> Gamma (#3)"));
}

#[test]
fn test_render_paths_unreachable() {
    let snapshot = snapshot();
    // the chain only runs forward, so 3 cannot reach 1
    let result = snapshot.shortest_paths(3, 1);
    let text = render_paths(&result);

    assert!(text.contains("No path from #3 to #1"));
}

#[test]
fn test_render_neighbors() {
    let snapshot = snapshot();
    let text = render_neighbors("Members #2 links to", &snapshot.successors(2));

    assert!(text.contains("Members #2 links to (1)"));
    assert!(text.contains("#3 Gamma"));
}

#[test]
fn test_snapshot_round_trip_through_data_dir() {
    let members = vec![
        member(1, "Alpha", "https://a.example/"),
        member(2, "Beta", "https://www.b.example/"),
    ];
    let records = vec![link("https://a.example/", "https://b.example/")];
    let graph = RingGraph::build(members, &records).unwrap();
    let stats = analyze::analyze(&graph);

    let dir = tempfile::tempdir().unwrap();
    graph.save(&dir.path().join(GRAPH_FILE)).unwrap();
    save_stats(&stats, &dir.path().join(STATS_FILE)).unwrap();

    let loaded = QuerySnapshot::load(dir.path()).unwrap();
    assert_eq!(loaded.resolve("1"), Some(1));
    assert_eq!(loaded.resolve("b.example"), Some(2));
    assert_eq!(loaded.resolve("www.b.example"), Some(2));
    assert_eq!(loaded.resolve("nobody.example"), None);
    assert!(loaded.graph().contains_edge(1, 2));
    assert_eq!(loaded.stats_for(1).unwrap().outgoing.reachable, 1);
}
