//! Per-member reachability statistics, computed by breadth-first search
//! from every node over the graph and over its reverse.

use crate::graph::RingGraph;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::info;

/// How far a member can reach along one edge direction. A member with no
/// reachable peers reports zeros across the board, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ConnectionStats {
    /// Other members at finite distance.
    pub reachable: usize,
    /// Mean geodesic distance to those members; 0.0 when none.
    pub avg_distance: f64,
    /// Members within six hops, the ring's "six degrees" convention.
    pub within_six: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DirectionalStats {
    pub outgoing: ConnectionStats,
    pub incoming: ConnectionStats,
}

/// Unweighted single-source distances following `direction` edges.
/// The source itself is included at distance 0.
pub fn bfs_distances(graph: &RingGraph, source: i64, direction: Direction) -> HashMap<i64, usize> {
    let mut distances = HashMap::new();
    distances.insert(source, 0usize);
    let mut queue = VecDeque::new();
    queue.push_back(source);

    while let Some(node) = queue.pop_front() {
        let next_distance = distances[&node] + 1;
        for neighbor in graph.neighbors_directed(node, direction) {
            if !distances.contains_key(&neighbor) {
                distances.insert(neighbor, next_distance);
                queue.push_back(neighbor);
            }
        }
    }
    distances
}

fn stats_from_distances(distances: &HashMap<i64, usize>) -> ConnectionStats {
    // the source sits in the map at distance 0 and is not a peer
    let reachable = distances.len().saturating_sub(1);
    if reachable == 0 {
        return ConnectionStats::default();
    }
    let total: usize = distances.values().sum();
    let within_six = distances.values().filter(|d| **d <= 6).count() - 1;
    ConnectionStats {
        reachable,
        avg_distance: total as f64 / reachable as f64,
        within_six,
    }
}

/// Full connectivity statistics for every member in both directions.
/// O(N·(N+E)); fine at registry scale.
pub fn analyze(graph: &RingGraph) -> HashMap<i64, DirectionalStats> {
    let mut stats = HashMap::new();
    for id in graph.node_ids() {
        let outgoing = stats_from_distances(&bfs_distances(graph, id, Direction::Outgoing));
        let incoming = stats_from_distances(&bfs_distances(graph, id, Direction::Incoming));
        stats.insert(id, DirectionalStats { outgoing, incoming });
    }
    info!("Connectivity analyzed for {} members", stats.len());
    stats
}
