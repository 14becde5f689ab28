pub mod config;
pub mod graph;
pub mod stream;
pub mod text;

// Re-export commonly used types
pub use config::{AppConfig, EmptyGraphOutput};
pub use graph::{hashtag_set, DegreeStats, EvictionPolicy, GraphSnapshot, HashtagSet, WindowedTagGraph};
pub use stream::{CleanStream, DegreeStream, Record, RecordError, RecordParser, StreamSummary};
pub use text::{HashtagExtractor, TextCleaner};
