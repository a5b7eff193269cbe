// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error: {0}")]
    Http(reqwest::StatusCode),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid version key: {0}")]
    InvalidKey(String),

    #[error("Failed to parse version listing: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
pub enum ExtractError {
    /// The strategy cannot handle this input; the next strategy should be tried.
    #[error("Extractor '{0}' unavailable for this document")]
    Unavailable(&'static str),

    #[error("Extractor '{extractor}' failed: {message}")]
    Failed {
        extractor: &'static str,
        message: String,
    },

    #[error("No extraction strategy produced text")]
    NoStrategy,

    #[error("Extraction timed out after {0}s")]
    Timeout(u64),

    #[error("Document bytes unavailable for {0}")]
    Missing(String),

    #[error("Extraction task aborted: {0}")]
    Aborted(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Unsupported output format: {0}")]
    UnsupportedOutputFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result-level comparison failures. These are rendered to callers as
/// `{"error": "..."}` rather than propagated as a crash path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompareError {
    #[error("No versions provided for comparison")]
    NoVersions,

    #[error("Need at least 2 valid versions to compare")]
    InsufficientVersions { usable: usize },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Version source failed: {0}")]
    Source(#[from] SourceError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Report rendering failed: {0}")]
    Report(#[from] ReportError),

    /// A result-level `{"error": ...}` response surfaced at the CLI boundary.
    #[error("Comparison failed: {0}")]
    Comparison(String),
}
