use std::path::PathBuf;

/// Errors that can occur while loading or saving reference spectra
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    /// I/O error reading the library directory or a file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File parsed but its content is inconsistent
    #[error("Malformed reference data in {path}: {reason}")]
    Malformed {
        /// Offending file
        path: PathBuf,
        /// What is wrong with it
        reason: String,
    },
}
