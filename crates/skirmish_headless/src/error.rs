//! Errors for the headless host.

use thiserror::Error;

/// Result type alias using [`HeadlessError`].
pub type Result<T> = std::result::Result<T, HeadlessError>;

/// Anything that stops a headless session.
#[derive(Debug, Error)]
pub enum HeadlessError {
    /// The simulation config could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] skirmish_core::error::GameError),

    /// Reading commands or writing responses failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A summary could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
