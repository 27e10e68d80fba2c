// ⚠️ Errors - single error type for the sequence matching core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SequenceError {
    /// Date did not match MM/DD/YYYY
    #[error("Invalid transaction date '{value}': {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Both compared sequences had no shared positions to score
    #[error("Cannot compare sequences with no overlapping elements")]
    EmptyComparison,

    /// Parser threshold outside its accepted range
    #[error("Invalid parser config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, SequenceError>;
