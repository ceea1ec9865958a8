//! Renderer error types.

use storycard_core::CaptureError;
use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while rasterizing a card.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The generated SVG could not be parsed.
    #[error("SVG parsing failed: {0}")]
    Svg(String),

    /// Requested output size cannot be allocated.
    #[error("Invalid output size: {width}x{height}")]
    InvalidSize {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// Encoding the raster failed.
    #[error("Export failed: {0}")]
    Export(String),
}

impl From<RenderError> for CaptureError {
    fn from(err: RenderError) -> Self {
        Self::Rasterize(err.to_string())
    }
}
