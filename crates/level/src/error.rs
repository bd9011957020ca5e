//! Level error types.

use thiserror::Error;

/// Errors that abort loading a level.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("Level is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("Level size {width}x{height} is not usable")]
    InvalidSize { width: u32, height: u32 },

    #[error("Malformed wall data: {0}")]
    MalformedWalls(String),

    #[error("Invalid level JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read level: {0}")]
    Io(#[from] std::io::Error),
}
