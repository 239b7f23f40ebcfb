//! # Error Types
//!
//! Custom error types for the LoRa bridge using `thiserror`.

use thiserror::Error;

/// Main error type for the LoRa bridge
#[derive(Debug, Error)]
pub enum LoraBridgeError {
    /// Serial channel errors (open/read/write)
    #[error("serial error: {0}")]
    Serial(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Wire packet encoding errors
    #[error("packet encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the LoRa bridge
pub type Result<T> = std::result::Result<T, LoraBridgeError>;
