//! Error types for the story-threads system.

use thiserror::Error;

/// Unified error type for thread operations.
#[derive(Debug, Error)]
pub enum ThreadError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Thread not found
    #[error("Thread not found: {0}")]
    NotFound(String),

    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persistence hook error
    #[error("Persistence error: {0}")]
    Persistence(String),
}
