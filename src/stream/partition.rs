use rayon::prelude::*;
use tracing::debug;

use super::record::Record;
use crate::config::WindowConfig;
use crate::graph::WindowedTagGraph;

/// Run each partition through its own window graph, in parallel. Partitions
/// share no state; each result series lines up with its input records.
pub fn average_degree_by_partition(partitions: &[Vec<Record>], config: &WindowConfig) -> Vec<Vec<f64>> {
    partitions
        .par_iter()
        .enumerate()
        .map(|(index, records)| {
            let mut graph = WindowedTagGraph::from_config(config);
            let series: Vec<f64> = records
                .iter()
                .map(|record| graph.ingest(&record.hashtags, record.created_at))
                .collect();
            debug!("Partition {} produced {} values", index, series.len());
            series
        })
        .collect()
}
