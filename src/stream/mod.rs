pub mod errors;
pub mod partition;
pub mod processor;
pub mod record;

pub use errors::RecordError;
pub use partition::average_degree_by_partition;
pub use processor::{CleanStream, DegreeStream, StreamSummary};
pub use record::{parse_timestamp, RawPost, Record, RecordParser};
