//! Loader error types

use std::path::PathBuf;

use uuid::Uuid;

/// Result alias for loader operations
pub type Result<T> = std::result::Result<T, LoaderError>;

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("No report for patient '{patient}' with biopsy '{biopsy}'")]
    ReportNotFound { patient: String, biopsy: String },

    #[error("Report '{0}' not found")]
    ReportIdentNotFound(Uuid),

    #[error("File '{0}' contains no data rows")]
    EmptyFile(PathBuf),

    #[error("Invalid value '{value}' in column '{column}' at line {line}")]
    InvalidValue {
        column: String,
        value: String,
        line: u64,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not parse delimited file: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
