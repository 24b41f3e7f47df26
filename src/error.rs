use thiserror::Error;

/// Main error type for patchrank
#[derive(Error, Debug)]
pub enum PatchrankError {
    /// Label outside {0, 1}
    #[error("Invalid label: {0} (expected 0 or 1)")]
    InvalidLabel(i64),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed prediction file contents
    #[error("Parse error: {0}")]
    Parse(String),

    /// JSON report serialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using PatchrankError
pub type Result<T> = std::result::Result<T, PatchrankError>;
