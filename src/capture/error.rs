use std::path::PathBuf;

/// Errors that can occur while reading or writing capture files
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Wavelength and intensity arrays differ in length
    #[error("Capture {path} has {wavelengths} wavelengths but {intensities} intensities")]
    LengthMismatch {
        /// Offending file
        path: PathBuf,
        /// Number of wavelengths
        wavelengths: usize,
        /// Number of intensities
        intensities: usize,
    },

    /// No capture with the given identifier
    #[error("No capture with id {0}")]
    NotFound(uuid::Uuid),
}
