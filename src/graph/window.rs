use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{round_to, Adjacency, HashtagSet};
use crate::config::defaults::{DEFAULT_PRECISION, DEFAULT_WINDOW_SECONDS, MAX_WINDOW_SECONDS};
use crate::config::WindowConfig;

const SECONDS_PER_DAY: i64 = 86_400;

/// How the age of an edge is measured against the window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionPolicy {
    /// Whole seconds of `at - stamp`, truncated toward zero. A negative age never evicts.
    #[default]
    Truncated,
    /// Exact age measured from the latest timestamp seen so far.
    Watermark,
    /// Seconds component of a day-normalized duration (0..86400). Negative ages
    /// wrap to nearly a full day and multi-day gaps wrap back toward zero.
    SecondsComponent,
}

impl EvictionPolicy {
    fn is_expired(self, reference: DateTime<Utc>, stamp: DateTime<Utc>, window_seconds: i64) -> bool {
        let age = reference - stamp;
        match self {
            EvictionPolicy::Truncated => age.num_seconds() >= window_seconds,
            EvictionPolicy::Watermark => age >= Duration::seconds(window_seconds),
            EvictionPolicy::SecondsComponent => {
                let floored = age
                    .num_microseconds()
                    .map_or_else(|| age.num_milliseconds().div_euclid(1000), |us| us.div_euclid(1_000_000));
                floored.rem_euclid(SECONDS_PER_DAY) >= window_seconds
            }
        }
    }
}

/// Hashtag co-occurrence graph restricted to a sliding time window.
///
/// Every edge is stored as two half-edges carrying the same timestamp. After each
/// call to [`WindowedTagGraph::ingest`] no node is left without neighbors.
#[derive(Debug, Clone)]
pub struct WindowedTagGraph {
    adjacency: IndexMap<String, Adjacency>,
    window_seconds: i64,
    policy: EvictionPolicy,
    precision: u32,
    watermark: Option<DateTime<Utc>>,
}

impl WindowedTagGraph {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_WINDOW_SECONDS, EvictionPolicy::default())
    }

    /// Windows longer than [`MAX_WINDOW_SECONDS`] are clamped to it.
    pub fn with_window(window_seconds: u64, policy: EvictionPolicy) -> Self {
        let window_seconds = i64::try_from(window_seconds.min(MAX_WINDOW_SECONDS)).unwrap_or(i64::MAX / 1000);
        Self {
            adjacency: IndexMap::new(),
            window_seconds,
            policy,
            precision: DEFAULT_PRECISION,
            watermark: None,
        }
    }

    pub fn from_config(config: &WindowConfig) -> Self {
        let mut graph = Self::with_window(config.window_seconds, config.eviction);
        graph.precision = config.precision;
        graph
    }

    /// Apply one record: insert its clique, evict stale edges relative to `at`,
    /// drop isolated nodes and return the rounded average degree.
    ///
    /// An empty graph measures `0.0`.
    pub fn ingest(&mut self, tags: &HashtagSet, at: DateTime<Utc>) -> f64 {
        let inserted = self.insert_clique(tags, at);
        let evicted = self.evict_expired(at);
        let pruned = self.prune_isolated();
        let average = self.average_degree();

        debug!(
            "Ingested {} tags at {}: +{} half-edges, -{} edges, -{} nodes, avg degree {}",
            tags.len(),
            at,
            inserted,
            evicted,
            pruned,
            average
        );
        average
    }

    /// Stamp every ordered pair of distinct tags with `at`. Returns the number of
    /// half-edges written (new or re-stamped).
    pub fn insert_clique(&mut self, tags: &HashtagSet, at: DateTime<Utc>) -> usize {
        if tags.len() < 2 {
            return 0;
        }

        let mut written = 0;
        for source in tags {
            let neighbors = self.adjacency.entry(source.clone()).or_default();
            for target in tags {
                if target != source {
                    neighbors.insert(target.clone(), at);
                    written += 1;
                }
            }
        }
        written
    }

    /// Remove every edge that has aged out of the window relative to `at`.
    /// Returns the number of undirected edges removed.
    pub fn evict_expired(&mut self, at: DateTime<Utc>) -> usize {
        let latest = self.watermark.map_or(at, |seen| seen.max(at));
        self.watermark = Some(latest);
        let reference = match self.policy {
            EvictionPolicy::Watermark => latest,
            _ => at,
        };

        // Collect first, delete second. Symmetry means the `source < target`
        // half is enough to find every expired edge once.
        let policy = self.policy;
        let window_seconds = self.window_seconds;
        let mut expired = Vec::new();
        for (source, neighbors) in &self.adjacency {
            for (target, stamp) in neighbors {
                if source < target && policy.is_expired(reference, *stamp, window_seconds) {
                    expired.push((source.clone(), target.clone()));
                }
            }
        }

        for (source, target) in &expired {
            trace!("Evicting edge {} <-> {}", source, target);
            self.remove_half_edge(source, target);
            self.remove_half_edge(target, source);
        }
        expired.len()
    }

    /// Drop nodes whose neighbor mapping is empty. Returns the number removed.
    pub fn prune_isolated(&mut self) -> usize {
        let before = self.adjacency.len();
        self.adjacency.retain(|_, neighbors| !neighbors.is_empty());
        before - self.adjacency.len()
    }

    /// Sum of node degrees over node count, rounded to the configured precision.
    pub fn average_degree(&self) -> f64 {
        if self.adjacency.is_empty() {
            return 0.0;
        }
        let degree_sum = self.half_edge_count();
        round_to(degree_sum as f64 / self.adjacency.len() as f64, self.precision)
    }

    fn remove_half_edge(&mut self, source: &str, target: &str) {
        if let Some(neighbors) = self.adjacency.get_mut(source) {
            neighbors.swap_remove(target);
        }
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.half_edge_count() / 2
    }

    pub fn half_edge_count(&self) -> usize {
        self.adjacency.values().map(|neighbors| neighbors.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn degree(&self, tag: &str) -> usize {
        self.adjacency.get(tag).map_or(0, |neighbors| neighbors.len())
    }

    pub fn contains_node(&self, tag: &str) -> bool {
        self.adjacency.contains_key(tag)
    }

    pub fn contains_edge(&self, a: &str, b: &str) -> bool {
        self.edge_timestamp(a, b).is_some()
    }

    pub fn edge_timestamp(&self, a: &str, b: &str) -> Option<DateTime<Utc>> {
        self.adjacency.get(a).and_then(|neighbors| neighbors.get(b)).copied()
    }

    pub fn neighbors(&self, tag: &str) -> Option<&Adjacency> {
        self.adjacency.get(tag)
    }

    /// Iterate nodes with their neighbor mappings in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Adjacency)> {
        self.adjacency.iter()
    }

    /// Latest timestamp observed by eviction so far
    pub fn watermark(&self) -> Option<DateTime<Utc>> {
        self.watermark
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    pub fn window_seconds(&self) -> u64 {
        self.window_seconds as u64
    }

    pub fn clear(&mut self) {
        self.adjacency.clear();
        self.watermark = None;
    }
}

impl Default for WindowedTagGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::hashtag_set;
    use chrono::TimeZone;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_446_141_061 + seconds, 0).unwrap()
    }

    fn assert_symmetric(graph: &WindowedTagGraph) {
        for (source, neighbors) in graph.iter() {
            assert!(!neighbors.is_empty(), "{} has no neighbors", source);
            assert!(!neighbors.contains_key(source), "{} loops to itself", source);
            for (target, stamp) in neighbors {
                assert_eq!(graph.edge_timestamp(target, source), Some(*stamp));
            }
        }
    }

    #[test]
    fn test_clique_insertion() {
        let mut graph = WindowedTagGraph::new();
        let tags = hashtag_set(["#A", "#B", "#C"]);

        assert_eq!(graph.insert_clique(&tags, at(0)), 6);
        assert_eq!(graph.half_edge_count(), 6);
        assert_eq!(graph.edge_count(), 3);
        for (a, b) in [("#A", "#B"), ("#A", "#C"), ("#B", "#C")] {
            assert_eq!(graph.edge_timestamp(a, b), Some(at(0)));
            assert_eq!(graph.edge_timestamp(b, a), Some(at(0)));
        }
        assert_symmetric(&graph);
    }

    #[test]
    fn test_singleton_and_empty_insert_nothing() {
        let mut graph = WindowedTagGraph::new();

        assert_eq!(graph.ingest(&hashtag_set(["#Solo"]), at(0)), 0.0);
        assert_eq!(graph.ingest(&HashtagSet::new(), at(1)), 0.0);
        assert!(graph.is_empty());
    }

    #[test]
    fn test_degree_computation() {
        let mut graph = WindowedTagGraph::new();
        graph.ingest(&hashtag_set(["#A", "#B"]), at(0));

        assert_eq!(graph.ingest(&hashtag_set(["#A", "#C"]), at(1)), 1.33);
        assert_eq!(graph.degree("#A"), 2);
        assert_eq!(graph.degree("#B"), 1);
        assert_eq!(graph.degree("#C"), 1);
    }

    #[test]
    fn test_restamping_is_idempotent() {
        let mut graph = WindowedTagGraph::new();
        let tags = hashtag_set(["#A", "#B", "#C"]);

        let first = graph.ingest(&tags, at(5));
        let snapshot: Vec<_> = graph.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        let second = graph.ingest(&tags, at(5));
        let again: Vec<_> = graph.iter().map(|(k, v)| (k.clone(), v.clone())).collect();

        assert_eq!(first, second);
        assert_eq!(snapshot, again);
    }

    #[test]
    fn test_restamp_keeps_edge_alive() {
        let mut graph = WindowedTagGraph::new();
        graph.ingest(&hashtag_set(["#A", "#B"]), at(0));
        graph.ingest(&hashtag_set(["#A", "#B"]), at(50));

        assert_eq!(graph.ingest(&HashtagSet::new(), at(100)), 1.0);
        assert_eq!(graph.edge_timestamp("#A", "#B"), Some(at(50)));
        assert_eq!(graph.ingest(&HashtagSet::new(), at(110)), 0.0);
    }

    #[test]
    fn test_window_boundary() {
        let mut graph = WindowedTagGraph::new();
        graph.ingest(&hashtag_set(["#A", "#B"]), at(0));

        assert_eq!(graph.ingest(&HashtagSet::new(), at(59)), 1.0);
        assert!(graph.contains_edge("#A", "#B"));

        assert_eq!(graph.ingest(&HashtagSet::new(), at(60)), 0.0);
        assert!(!graph.contains_edge("#A", "#B"));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_truncation_ignores_fractional_seconds() {
        let mut graph = WindowedTagGraph::new();
        graph.ingest(&hashtag_set(["#A", "#B"]), at(0));

        let almost = at(59) + Duration::milliseconds(999);
        assert_eq!(graph.ingest(&HashtagSet::new(), almost), 1.0);
    }

    #[test]
    fn test_eviction_prunes_only_isolated_nodes() {
        let mut graph = WindowedTagGraph::new();
        graph.ingest(&hashtag_set(["#A", "#B"]), at(0));
        graph.ingest(&hashtag_set(["#A", "#C"]), at(30));

        // A-B expires, A stays because of A-C
        assert_eq!(graph.ingest(&HashtagSet::new(), at(65)), 1.0);
        assert!(graph.contains_node("#A"));
        assert!(!graph.contains_node("#B"));
        assert_symmetric(&graph);
    }

    #[test]
    fn test_out_of_order_record_is_not_evicted_by_truncation() {
        let mut graph = WindowedTagGraph::new();
        graph.ingest(&hashtag_set(["#New", "#Edge"]), at(100));

        // Older record: its own edge has age zero, the newer one has negative age
        assert_eq!(graph.ingest(&hashtag_set(["#Old", "#Edge"]), at(10)), 1.33);
        assert!(graph.contains_edge("#New", "#Edge"));
        assert_eq!(graph.watermark(), Some(at(100)));
    }

    #[test]
    fn test_watermark_policy_evicts_late_edges() {
        let mut graph = WindowedTagGraph::with_window(60, EvictionPolicy::Watermark);
        graph.ingest(&hashtag_set(["#New", "#Edge"]), at(100));

        // Late record older than the window relative to the watermark
        assert_eq!(graph.ingest(&hashtag_set(["#Old", "#Late"]), at(10)), 1.0);
        assert!(!graph.contains_node("#Old"));
        assert!(graph.contains_edge("#New", "#Edge"));
    }

    #[test]
    fn test_watermark_policy_counts_fractional_seconds() {
        let mut graph = WindowedTagGraph::with_window(60, EvictionPolicy::Watermark);
        graph.ingest(&hashtag_set(["#A", "#B"]), at(0));

        assert_eq!(graph.ingest(&HashtagSet::new(), at(59) + Duration::milliseconds(999)), 1.0);
        assert_eq!(graph.ingest(&HashtagSet::new(), at(60)), 0.0);
    }

    #[test]
    fn test_seconds_component_wraps() {
        let mut graph = WindowedTagGraph::with_window(60, EvictionPolicy::SecondsComponent);
        graph.ingest(&hashtag_set(["#A", "#B"]), at(100));

        // Negative age wraps to 86399 seconds
        assert_eq!(graph.ingest(&HashtagSet::new(), at(99)), 0.0);

        graph.ingest(&hashtag_set(["#A", "#B"]), at(0));
        // A day and ten seconds later the seconds component is 10
        assert_eq!(graph.ingest(&HashtagSet::new(), at(86_410)), 1.0);
    }

    #[test]
    fn test_seconds_component_wraps_sub_millisecond_negative_age() {
        let mut graph = WindowedTagGraph::with_window(60, EvictionPolicy::SecondsComponent);
        graph.ingest(&hashtag_set(["#A", "#B"]), at(0) + Duration::microseconds(500));

        // -500us floors to -1s, which wraps to 86399
        assert_eq!(graph.ingest(&HashtagSet::new(), at(0)), 0.0);

        let mut truncated = WindowedTagGraph::new();
        truncated.ingest(&hashtag_set(["#A", "#B"]), at(0) + Duration::microseconds(500));
        assert_eq!(truncated.ingest(&HashtagSet::new(), at(0)), 1.0);
    }

    #[test]
    fn test_huge_window_is_clamped() {
        for policy in [EvictionPolicy::Truncated, EvictionPolicy::Watermark, EvictionPolicy::SecondsComponent] {
            let mut graph = WindowedTagGraph::with_window(u64::MAX, policy);
            assert_eq!(graph.window_seconds(), MAX_WINDOW_SECONDS);

            assert_eq!(graph.ingest(&hashtag_set(["#A", "#B"]), at(0)), 1.0);
            assert_eq!(graph.ingest(&HashtagSet::new(), at(86_400 * 365)), 1.0);
        }

        let mut graph = WindowedTagGraph::with_window(100_000_000_000_000_000, EvictionPolicy::Watermark);
        assert_eq!(graph.ingest(&hashtag_set(["#A", "#B"]), at(0)), 1.0);
    }

    #[test]
    fn test_custom_window() {
        let mut graph = WindowedTagGraph::with_window(10, EvictionPolicy::Truncated);
        graph.ingest(&hashtag_set(["#A", "#B"]), at(0));

        assert_eq!(graph.ingest(&HashtagSet::new(), at(9)), 1.0);
        assert_eq!(graph.ingest(&HashtagSet::new(), at(10)), 0.0);
        assert_eq!(graph.window_seconds(), 10);
    }

    #[test]
    fn test_invariants_hold_across_mixed_stream() {
        let mut graph = WindowedTagGraph::new();
        let stream = [
            (vec!["#A", "#B", "#C"], 0),
            (vec!["#C", "#D"], 20),
            (vec![], 45),
            (vec!["#E", "#A"], 70),
            (vec!["#B", "#D", "#E"], 95),
            (vec!["#F"], 130),
        ];

        for (tags, offset) in stream {
            graph.ingest(&hashtag_set(tags), at(offset));
            assert_symmetric(&graph);
            for (_, neighbors) in graph.iter() {
                for stamp in neighbors.values() {
                    assert!((at(offset) - *stamp).num_seconds() < 60);
                }
            }
        }
    }
}
