//! Error types for the form schema engine

use thiserror::Error;

/// Result type for schema form operations
pub type Result<T> = std::result::Result<T, SchemaFormError>;

/// Schema form errors
///
/// Validation *failures* are not errors; they are [`CheckResult`] values
/// returned by checkers. This enum covers boundary faults only: fetching,
/// parsing, configuration.
///
/// [`CheckResult`]: crate::validator::CheckResult
#[derive(Error, Debug)]
pub enum SchemaFormError {
    #[error("Schema fetch failed for {entity}: {reason}")]
    FetchFailed { entity: String, reason: String },

    #[error("Unknown entity kind: {0}")]
    UnknownEntity(String),

    #[error("Invalid schema format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),
}
