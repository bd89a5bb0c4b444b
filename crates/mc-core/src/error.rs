//! Error taxonomy for the canvas engine.
//!
//! Only construction and data ingestion return errors. The per-frame
//! render and hit-test paths skip bad items instead (see `Scene`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CanvasError {
    /// The drawing surface or its 2D context could not be acquired.
    #[error("rendering context unavailable: {0}")]
    ContextUnavailable(String),

    #[error("failed to decode snapshot: {0}")]
    Decode(String),

    #[error("failed to encode snapshot: {0}")]
    Encode(String),

    #[error("invalid color `{input}`")]
    InvalidColor { input: String },

    #[error("invalid engine config: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for CanvasError {
    fn from(e: serde_json::Error) -> Self {
        CanvasError::Decode(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for CanvasError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        CanvasError::Decode(e.to_string())
    }
}

impl From<rmp_serde::encode::Error> for CanvasError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        CanvasError::Encode(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CanvasError>;
