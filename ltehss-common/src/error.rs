//! Error types for the ltehss workspace

use thiserror::Error;

/// Error types shared across the ltehss crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors.
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// A hex-encoded field with the wrong width or bad digits.
    #[error("Hex field error: {0}")]
    HexField(String),
}
