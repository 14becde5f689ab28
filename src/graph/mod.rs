pub mod metrics;
pub mod window;

// Re-export window graph components
pub use metrics::{DegreeStats, GraphSnapshot};
pub use window::{EvictionPolicy, WindowedTagGraph};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// Set of normalized hashtags asserted by a single post
pub type HashtagSet = BTreeSet<String>;

/// Neighbor hashtag mapped to the creation time of the post that last asserted the edge
pub type Adjacency = IndexMap<String, DateTime<Utc>>;

/// Round to a fixed number of decimal places, halves away from zero
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

/// Build a hashtag set from anything string-like. Handy for tests and callers
/// that already hold normalized tags.
pub fn hashtag_set<I, S>(tags: I) -> HashtagSet
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    tags.into_iter().map(Into::into).collect()
}
