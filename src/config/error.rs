/// Errors that can occur while loading, validating or saving settings
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing the settings file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The settings file is not valid TOML or has wrongly typed fields
    #[error("TOML parsing error: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Settings could not be serialized
    #[error("TOML serialization error: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// A field holds a value outside its allowed range
    #[error("Invalid setting: {0}")]
    Invalid(String),
}
