use chrono::{DateTime, Utc};
use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{round_to, WindowedTagGraph};

/// Degree statistics of the current window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegreeStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub min_degree: usize,
    pub max_degree: usize,
    pub average_degree: f64,
}

impl DegreeStats {
    pub fn from_window(graph: &WindowedTagGraph, precision: u32) -> Self {
        let degrees: Vec<usize> = graph.iter().map(|(_, neighbors)| neighbors.len()).collect();
        let total: usize = degrees.iter().sum();

        Self {
            node_count: degrees.len(),
            edge_count: total / 2,
            min_degree: degrees.iter().copied().min().unwrap_or(0),
            max_degree: degrees.iter().copied().max().unwrap_or(0),
            average_degree: if degrees.is_empty() {
                0.0
            } else {
                round_to(total as f64 / degrees.len() as f64, precision)
            },
        }
    }
}

/// Immutable petgraph copy of a window, for analysis outside the hot path
pub struct GraphSnapshot {
    graph: UnGraph<String, DateTime<Utc>>,
    node_map: HashMap<String, NodeIndex>,
}

impl GraphSnapshot {
    pub fn from_window(window: &WindowedTagGraph) -> Self {
        let mut graph = UnGraph::with_capacity(window.node_count(), window.edge_count());
        let mut node_map = HashMap::with_capacity(window.node_count());

        for (tag, _) in window.iter() {
            let idx = graph.add_node(tag.clone());
            node_map.insert(tag.clone(), idx);
        }

        for (source, neighbors) in window.iter() {
            for (target, stamp) in neighbors {
                // One petgraph edge per undirected pair
                if source < target {
                    if let (Some(&a), Some(&b)) = (node_map.get(source), node_map.get(target)) {
                        graph.add_edge(a, b, *stamp);
                    }
                }
            }
        }

        Self { graph, node_map }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn degree(&self, tag: &str) -> usize {
        self.node_map
            .get(tag)
            .map_or(0, |idx| self.graph.edges(*idx).count())
    }

    /// Number of disconnected hashtag clusters in the window
    pub fn connected_components(&self) -> usize {
        connected_components(&self.graph)
    }

    /// Oldest surviving edge stamp, i.e. the next edge to leave the window
    pub fn oldest_edge(&self) -> Option<DateTime<Utc>> {
        self.graph.edge_weights().min().copied()
    }

    pub fn graph(&self) -> &UnGraph<String, DateTime<Utc>> {
        &self.graph
    }
}

impl WindowedTagGraph {
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::from_window(self)
    }

    pub fn stats(&self, precision: u32) -> DegreeStats {
        DegreeStats::from_window(self, precision)
    }
}
