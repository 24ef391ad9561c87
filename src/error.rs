//! Error handling for the netsweep scanner

use thiserror::Error;

/// Main error type for scan operations
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Expansion cancelled: {spec} expands to {requested} addresses (limit {limit})")]
    ExpansionCancelled {
        spec: String,
        requested: u64,
        limit: u64,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for scan operations
pub type ScanResult<T> = Result<T, ScanError>;
