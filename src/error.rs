//! Error types for the FX pipeline

use thiserror::Error;

/// Main error type for the FX pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Rate source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
