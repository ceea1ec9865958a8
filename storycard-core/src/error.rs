//! Error types for story card operations.

use thiserror::Error;

/// Result type for editor operations.
pub type CardResult<T> = Result<T, CardError>;

/// Errors that can occur in editor operations.
///
/// Gesture-stream anomalies never surface here: they are recovered inside the
/// classifier. These variants cover configuration and serialization only.
#[derive(Debug, Error)]
pub enum CardError {
    /// Editor configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Snapshot or config serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors reported by a card capture.
///
/// All variants are recoverable: the editor state is restored before the
/// error reaches the caller.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// A capture is already running; the new request was dropped.
    #[error("A capture is already in progress")]
    AlreadyCapturing,

    /// The rasterizer refused or failed to produce an image.
    #[error("Rasterization failed: {0}")]
    Rasterize(String),

    /// The rasterizer returned without any pixel data.
    #[error("Rasterizer produced an empty artifact")]
    EmptyArtifact,
}
