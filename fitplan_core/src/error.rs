//! Error types for the fitplan_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for fitplan_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller supplied a value the computation cannot accept
    /// (non-positive weight or calorie target, malformed exercise)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Catalog entry violates a numeric invariant (zero pace, non-positive MET)
    #[error("Arithmetic error: {0}")]
    Arithmetic(String),

    /// A backing store (catalog, weight log) could not be read
    #[error("Collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),

    /// Exercise rejected by catalog validation
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// Requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}
