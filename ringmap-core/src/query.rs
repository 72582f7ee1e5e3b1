//! Read-only query layer over a finished run: loads the persisted graph and
//! statistics wholesale at startup and answers listing, path and neighbor
//! queries. There is no live-update path; rerun the analysis instead.

use crate::analyze::{bfs_distances, DirectionalStats};
use crate::error::{CoreError, Result};
use crate::graph::{RingGraph, GRAPH_FILE};
use crate::members::Member;
use petgraph::Direction;
use ringmap_spider::host::{simple_host, strip_host};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

pub const STATS_FILE: &str = "stats.json";
pub const ITEMS_PER_PAGE: usize = 32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberBrief {
    pub id: i64,
    pub name: String,
    pub url: String,
}

impl From<&Member> for MemberBrief {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id,
            name: member.name.clone(),
            url: member.url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsItem {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub links: String,
    pub stats: DirectionalStats,
}

#[derive(Debug, Serialize)]
pub struct PageListing {
    pub total_items: usize,
    pub total_pages: usize,
    pub page: usize,
    pub items: Vec<StatsItem>,
}

/// All equally-short paths between two members: the distance, every node
/// touched by any of the paths, and the paths themselves as id sequences.
/// `distance == -1` means no path; the node list then still names both
/// endpoints.
#[derive(Debug, Serialize)]
pub struct ShortestPaths {
    pub source_id: i64,
    pub target_id: i64,
    pub distance: i64,
    pub nodes: Vec<MemberBrief>,
    pub paths: Vec<Vec<i64>>,
}

pub struct QuerySnapshot {
    graph: RingGraph,
    stats: HashMap<i64, DirectionalStats>,
    host_index: HashMap<String, i64>,
}

impl QuerySnapshot {
    /// Load the persisted graph and statistics. Any missing or unreadable
    /// artifact is fatal: serving queries over half a run would be worse
    /// than not starting.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let graph = RingGraph::load(&data_dir.join(GRAPH_FILE))?;
        let stats = load_stats(&data_dir.join(STATS_FILE))?;
        Ok(Self::new(graph, stats))
    }

    pub fn new(graph: RingGraph, stats: HashMap<i64, DirectionalStats>) -> Self {
        let host_index = graph
            .members()
            .iter()
            .map(|m| (simple_host(&m.url), m.id))
            .filter(|(host, _)| !host.is_empty())
            .collect();
        Self { graph, stats, host_index }
    }

    pub fn graph(&self) -> &RingGraph {
        &self.graph
    }

    /// Resolve a member by decimal id or by (possibly un-normalized) host.
    pub fn resolve(&self, key: &str) -> Option<i64> {
        if let Ok(id) = key.parse::<i64>() {
            return self.graph.member(id).map(|m| m.id);
        }
        self.host_index.get(&strip_host(key)).copied()
    }

    /// Paginated stats listing, optionally filtered by a case-insensitive
    /// substring over id, name, url and links page.
    pub fn list(&self, page: usize, query: Option<&str>) -> PageListing {
        let needle = query.map(str::to_lowercase);
        let matching: Vec<StatsItem> = self
            .graph
            .members()
            .iter()
            .map(|m| StatsItem {
                id: m.id,
                name: m.name.clone(),
                url: m.url.clone(),
                links: self.graph.links_page(m.id).unwrap_or("").to_string(),
                stats: self.stats.get(&m.id).copied().unwrap_or_default(),
            })
            .filter(|item| match &needle {
                Some(q) => {
                    item.id.to_string().contains(q)
                        || item.name.to_lowercase().contains(q)
                        || item.url.to_lowercase().contains(q)
                        || item.links.to_lowercase().contains(q)
                }
                None => true,
            })
            .collect();

        let total_items = matching.len();
        let total_pages = total_items.div_ceil(ITEMS_PER_PAGE);
        let page = page.max(1);
        let items = matching
            .into_iter()
            .skip((page - 1) * ITEMS_PER_PAGE)
            .take(ITEMS_PER_PAGE)
            .collect();
        PageListing { total_items, total_pages, page, items }
    }

    pub fn stats_for(&self, id: i64) -> Option<DirectionalStats> {
        self.stats.get(&id).copied()
    }

    /// Every shortest path from `source_id` to `target_id`, following edges
    /// forward.
    pub fn shortest_paths(&self, source_id: i64, target_id: i64) -> ShortestPaths {
        let distances = bfs_distances(&self.graph, source_id, Direction::Outgoing);

        let Some(&distance) = distances.get(&target_id) else {
            let nodes = [source_id, target_id]
                .iter()
                .filter_map(|id| self.graph.member(*id).map(MemberBrief::from))
                .collect();
            return ShortestPaths {
                source_id,
                target_id,
                distance: -1,
                nodes,
                paths: Vec::new(),
            };
        };

        // Walk backwards from the target: a predecessor lies on a shortest
        // path exactly when its distance is one less.
        let mut paths = Vec::new();
        let mut current = vec![target_id];
        self.collect_paths(&distances, target_id, source_id, &mut current, &mut paths);
        for path in &mut paths {
            path.reverse();
        }
        paths.sort();

        let mut seen = HashSet::new();
        let mut nodes = Vec::new();
        for path in &paths {
            for id in path {
                if seen.insert(*id)
                    && let Some(member) = self.graph.member(*id)
                {
                    nodes.push(MemberBrief::from(member));
                }
            }
        }

        ShortestPaths {
            source_id,
            target_id,
            distance: distance as i64,
            nodes,
            paths,
        }
    }

    fn collect_paths(
        &self,
        distances: &HashMap<i64, usize>,
        node: i64,
        source_id: i64,
        current: &mut Vec<i64>,
        paths: &mut Vec<Vec<i64>>,
    ) {
        if node == source_id {
            paths.push(current.clone());
            return;
        }
        let node_distance = distances[&node];
        for predecessor in self.graph.neighbors_directed(node, Direction::Incoming) {
            if distances.get(&predecessor) == Some(&(node_distance - 1)) {
                current.push(predecessor);
                self.collect_paths(distances, predecessor, source_id, current, paths);
                current.pop();
            }
        }
    }

    pub fn successors(&self, id: i64) -> Vec<MemberBrief> {
        self.graph
            .successors(id)
            .iter()
            .filter_map(|id| self.graph.member(*id).map(MemberBrief::from))
            .collect()
    }

    pub fn predecessors(&self, id: i64) -> Vec<MemberBrief> {
        self.graph
            .predecessors(id)
            .iter()
            .filter_map(|id| self.graph.member(*id).map(MemberBrief::from))
            .collect()
    }
}

pub fn save_stats(stats: &HashMap<i64, DirectionalStats>, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(stats)?;
    crate::records::write_atomic(path, &json)
}

pub fn load_stats(path: &Path) -> Result<HashMap<i64, DirectionalStats>> {
    if !path.exists() {
        return Err(CoreError::MissingArtifact(format!(
            "{} (run `ringmap analyze` first)",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
