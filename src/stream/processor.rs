use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use tracing::{debug, info};

use super::record::{RawPost, RecordParser};
use crate::config::defaults::UNICODE_SUMMARY_SUFFIX;
use crate::config::{AppConfig, EmptyGraphOutput, OutputConfig, TextConfig};
use crate::graph::WindowedTagGraph;
use crate::text::TextCleaner;

/// Counters for one pass over an input stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSummary {
    pub lines_read: usize,
    pub records_accepted: usize,
    pub records_skipped: usize,
    pub values_written: usize,
    pub empty_omitted: usize,
    pub with_unicode: usize,
    pub skip_reasons: BTreeMap<String, usize>,
}

impl StreamSummary {
    fn record_skip(&mut self, kind: &str) {
        self.records_skipped += 1;
        *self.skip_reasons.entry(kind.to_string()).or_insert(0) += 1;
    }
}

/// Rolling average degree over a stream of JSON posts, one value per accepted post
pub struct DegreeStream {
    graph: WindowedTagGraph,
    parser: RecordParser,
    output: OutputConfig,
    precision: u32,
    summary: StreamSummary,
}

impl DegreeStream {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            graph: WindowedTagGraph::from_config(&config.window),
            parser: RecordParser::new(&config.text)?,
            output: config.output.clone(),
            precision: config.window.precision,
            summary: StreamSummary::default(),
        })
    }

    /// Feed one raw line. Returns the value to emit, or `None` when the line is
    /// skipped or the empty-graph value is omitted.
    pub fn process_line(&mut self, line: &str) -> Option<f64> {
        self.summary.lines_read += 1;

        let record = match self.parser.parse(line) {
            Ok(record) => record,
            Err(e) => {
                debug!("Skipping line {}: {}", self.summary.lines_read, e);
                self.summary.record_skip(e.kind());
                return None;
            }
        };

        self.summary.records_accepted += 1;
        if record.had_unicode {
            self.summary.with_unicode += 1;
        }

        let average = self.graph.ingest(&record.hashtags, record.created_at);
        if self.graph.is_empty() && self.output.empty_graph == EmptyGraphOutput::Omit {
            self.summary.empty_omitted += 1;
            return None;
        }
        Some(average)
    }

    /// Process every line of `reader`, writing one formatted value per line to `writer`
    pub fn run<R: BufRead, W: Write>(&mut self, reader: R, mut writer: W) -> Result<StreamSummary> {
        for line in reader.lines() {
            let line = line.context("Failed to read input line")?;
            if let Some(average) = self.process_line(&line) {
                writeln!(writer, "{}", self.format_value(average))
                    .context("Failed to write average degree")?;
                self.summary.values_written += 1;
            }
        }
        writer.flush().context("Failed to flush output")?;

        let stats = self.graph.stats(self.precision);
        info!(
            "Processed {} lines: {} records, {} skipped, {} values written",
            self.summary.lines_read,
            self.summary.records_accepted,
            self.summary.records_skipped,
            self.summary.values_written
        );
        info!(
            "Final window: {} nodes, {} edges, {} clusters, avg degree {}",
            stats.node_count,
            stats.edge_count,
            self.graph.snapshot().connected_components(),
            stats.average_degree
        );

        Ok(self.summary.clone())
    }

    /// Shortest round-trip form with at least one decimal (`1.0`, `1.67`), or a
    /// fixed number of places when configured
    pub fn format_value(&self, value: f64) -> String {
        match self.output.fixed_precision {
            Some(places) => format!("{:.*}", places, value),
            None => format!("{:?}", value),
        }
    }

    pub fn graph(&self) -> &WindowedTagGraph {
        &self.graph
    }

    pub fn summary(&self) -> &StreamSummary {
        &self.summary
    }
}

/// Writes each post body cleaned, tagged with its raw creation time, followed
/// by a count of bodies that contained unicode
pub struct CleanStream {
    cleaner: TextCleaner,
}

impl CleanStream {
    pub fn new(config: &TextConfig) -> Result<Self> {
        Ok(Self {
            cleaner: TextCleaner::new(config.clone())?,
        })
    }

    pub fn run<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> Result<StreamSummary> {
        let mut summary = StreamSummary::default();

        for line in reader.lines() {
            let line = line.context("Failed to read input line")?;
            summary.lines_read += 1;

            let post = match RawPost::from_line(&line) {
                Ok(post) => post,
                Err(e) => {
                    debug!("Skipping line {}: {}", summary.lines_read, e);
                    summary.record_skip(e.kind());
                    continue;
                }
            };

            summary.records_accepted += 1;
            let cleaned = self.cleaner.clean(&post.text);
            if cleaned.had_unicode {
                summary.with_unicode += 1;
            }

            writeln!(writer, "{} (timestamp: {})", cleaned.text, post.created_at)
                .context("Failed to write cleaned post")?;
            summary.values_written += 1;
        }

        writeln!(writer)?;
        writeln!(writer, "{} {}", summary.with_unicode, UNICODE_SUMMARY_SUFFIX)?;
        writer.flush().context("Failed to flush output")?;

        info!(
            "Cleaned {} posts, {} contained unicode, {} lines skipped",
            summary.records_accepted, summary.with_unicode, summary.records_skipped
        );
        Ok(summary)
    }
}
