use std::io;
use thiserror::Error;

/// Custom error types for the ipleak-geo crate
#[derive(Error, Debug)]
pub enum AppError {
    /// Error when a configuration value cannot be used
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error when every attempt to reach the provider failed
    #[error("Provider request failed after {attempts} attempt(s): {source}")]
    TransportFailed {
        attempts: usize,
        #[source]
        source: reqwest::Error,
    },

    /// Wrapper for reqwest errors
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Wrapper for I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Wrapper for JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
