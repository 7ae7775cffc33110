//! Error types for Dolly

use thiserror::Error;

/// The main error type for Dolly operations
#[derive(Debug, Error)]
pub enum DollyError {
    #[error("Keyframe {index} out of range (path has {count} keyframes)")]
    KeyframeOutOfRange { index: usize, count: usize },

    #[error("Invalid path file: {0}")]
    InvalidPathFile(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),
}

/// Result type alias for Dolly operations
pub type Result<T> = std::result::Result<T, DollyError>;

impl From<toml::de::Error> for DollyError {
    fn from(err: toml::de::Error) -> Self {
        DollyError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for DollyError {
    fn from(err: toml::ser::Error) -> Self {
        DollyError::TomlSerError(err.to_string())
    }
}
