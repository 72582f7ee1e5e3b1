//! Connectivity graph over member ids, rebuilt from scratch on every
//! analysis run. Never mutated incrementally.

use crate::error::{CoreError, Result};
use crate::members::{member_host_map, Member};
use chrono::{DateTime, Utc};
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use ringmap_spider::host::simple_host;
use ringmap_spider::ClassificationRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

pub const GRAPH_FILE: &str = "graph.json";

/// Directed simple graph whose node set is exactly the member id set.
/// Edges come from `friends_link` records whose endpoints both resolve to
/// known, distinct members; everything else in the log is identity noise.
pub struct RingGraph {
    graph: DiGraphMap<i64, ()>,
    members: Vec<Member>,
    by_id: HashMap<i64, Member>,
    links_pages: HashMap<i64, String>,
    generated_at: DateTime<Utc>,
}

/// On-disk form of a built graph, consumed by the query side. Edges are
/// sorted so identical inputs produce identical files.
#[derive(Debug, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub generated_at: DateTime<Utc>,
    pub members: Vec<Member>,
    pub edges: Vec<(i64, i64)>,
    pub links_pages: HashMap<i64, String>,
}

impl RingGraph {
    /// Build the graph from a registry snapshot and a full record log.
    /// Deterministic and idempotent: the same inputs always produce the
    /// same graph.
    pub fn build(members: Vec<Member>, records: &[ClassificationRecord]) -> Result<Self> {
        let host_map = member_host_map(&members)?;

        let mut graph: DiGraphMap<i64, ()> = DiGraphMap::new();
        for member in &members {
            graph.add_node(member.id);
        }

        let mut links_pages: HashMap<i64, String> = HashMap::new();
        for record in records {
            match record {
                ClassificationRecord::LinkFound { start, target, .. } => {
                    let source_host = simple_host(start);
                    let target_host = simple_host(target);
                    if source_host == target_host {
                        continue;
                    }
                    let (Some(source), Some(target)) =
                        (host_map.get(&source_host), host_map.get(&target_host))
                    else {
                        continue;
                    };
                    graph.add_edge(source.id, target.id, ());
                }
                ClassificationRecord::DirectoryFound { start, target } => {
                    if let Some(member) = host_map.get(&simple_host(start)) {
                        links_pages.insert(member.id, target.clone());
                    }
                }
                _ => {}
            }
        }

        info!(
            "Graph built: {} members, {} links",
            graph.node_count(),
            graph.edge_count()
        );

        let by_id = members.iter().map(|m| (m.id, m.clone())).collect();
        Ok(Self {
            graph,
            members,
            by_id,
            links_pages,
            generated_at: Utc::now(),
        })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member(&self, id: i64) -> Option<&Member> {
        self.by_id.get(&id)
    }

    pub fn contains_edge(&self, source: i64, target: i64) -> bool {
        self.graph.contains_edge(source, target)
    }

    /// Directory page recorded for a member, when discovery found one.
    pub fn links_page(&self, id: i64) -> Option<&str> {
        self.links_pages.get(&id).map(String::as_str)
    }

    pub fn node_ids(&self) -> Vec<i64> {
        self.members.iter().map(|m| m.id).collect()
    }

    pub fn neighbors_directed(&self, id: i64, direction: Direction) -> impl Iterator<Item = i64> + '_ {
        self.graph.neighbors_directed(id, direction)
    }

    pub fn neighbors(&self, id: i64, direction: Direction) -> Vec<i64> {
        if !self.by_id.contains_key(&id) {
            return Vec::new();
        }
        let mut neighbors: Vec<i64> = self.graph.neighbors_directed(id, direction).collect();
        neighbors.sort_unstable();
        neighbors
    }

    pub fn successors(&self, id: i64) -> Vec<i64> {
        self.neighbors(id, Direction::Outgoing)
    }

    pub fn predecessors(&self, id: i64) -> Vec<i64> {
        self.neighbors(id, Direction::Incoming)
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        let mut edges: Vec<(i64, i64)> = self.graph.all_edges().map(|(s, t, _)| (s, t)).collect();
        edges.sort_unstable();
        GraphSnapshot {
            generated_at: self.generated_at,
            members: self.members.clone(),
            edges,
            links_pages: self.links_pages.clone(),
        }
    }

    pub fn from_snapshot(snapshot: GraphSnapshot) -> Result<Self> {
        let mut graph: DiGraphMap<i64, ()> = DiGraphMap::new();
        for member in &snapshot.members {
            graph.add_node(member.id);
        }
        for (source, target) in &snapshot.edges {
            if !graph.contains_node(*source) || !graph.contains_node(*target) {
                return Err(CoreError::InvalidRegistry(format!(
                    "snapshot edge ({}, {}) references an unknown member",
                    source, target
                )));
            }
            graph.add_edge(*source, *target, ());
        }
        let by_id = snapshot.members.iter().map(|m| (m.id, m.clone())).collect();
        Ok(Self {
            graph,
            members: snapshot.members,
            by_id,
            links_pages: snapshot.links_pages,
            generated_at: snapshot.generated_at,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        crate::records::write_atomic(path, &json)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::MissingArtifact(format!(
                "{} (run `ringmap analyze` first)",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        let snapshot: GraphSnapshot = serde_json::from_str(&content)?;
        Self::from_snapshot(snapshot)
    }
}
