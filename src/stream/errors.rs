use thiserror::Error;

/// Reasons an input line does not become a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("Blank line")]
    Blank,

    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },

    #[error("Expected a JSON object")]
    NotAnObject,

    #[error("Control message: {kind}")]
    ControlMessage { kind: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid type for {field}: expected {expected}")]
    InvalidType { field: String, expected: String },

    #[error("Invalid timestamp: {value}")]
    InvalidTimestamp { value: String },
}

impl RecordError {
    /// Short stable label, used to tally skipped lines
    pub fn kind(&self) -> &'static str {
        match self {
            RecordError::Blank => "blank",
            RecordError::InvalidJson { .. } => "invalid_json",
            RecordError::NotAnObject => "not_an_object",
            RecordError::ControlMessage { .. } => "control_message",
            RecordError::MissingField { .. } => "missing_field",
            RecordError::InvalidType { .. } => "invalid_type",
            RecordError::InvalidTimestamp { .. } => "invalid_timestamp",
        }
    }
}
