// src/error.rs

use thiserror::Error;

/// Core error types for the Omnitruck client
#[derive(Error, Debug)]
pub enum Error {
    /// A required filter is missing or a supplied value is invalid
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Response text or a package URL does not have the expected shape
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A key is absent from parsed metadata or a catalog
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// The fetch failed (network, HTTP status, timeout)
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Malformed base or request URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using the client's Error type
pub type Result<T> = std::result::Result<T, Error>;
