//! Tool error types.

use thiserror::Error;
use warpfleet_core::error::GameError;

/// Result type for tool commands.
pub type ToolResult<T> = std::result::Result<T, ToolError>;

/// Errors surfaced by the command-line tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Error from the movement core.
    #[error(transparent)]
    Game(#[from] GameError),

    /// Malformed command-line argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// One or more scenario files failed validation.
    #[error("{0} scenario(s) failed validation")]
    ValidationFailed(usize),

    /// Filesystem error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
