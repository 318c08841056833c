//! Error types shared across the IPR workspace

use thiserror::Error;

/// Result type alias for IPR operations
pub type Result<T> = std::result::Result<T, IprError>;

/// Main error type for IPR
#[derive(Error, Debug)]
pub enum IprError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Report not found: {0}")]
    ReportNotFound(String),

    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    #[error("Invalid report state: {0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
