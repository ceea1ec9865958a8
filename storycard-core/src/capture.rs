//! # Card Capture
//!
//! Rasterizes the card without editor chrome.
//!
//! ```text
//! idle ──capture()──► capturing ──(render tick)──► rasterize ──► idle
//!                         │                            │
//!                 selection/edit saved          selection/edit restored
//! ```
//!
//! While capturing, touches, selection changes and background taps are
//! dropped. State is restored whether rasterization succeeds, fails, or the
//! capture future is dropped early.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CaptureError;
use crate::snapshot::CardSnapshot;
use crate::state::{CaptureRestore, EditorSession, EditorState};

/// Encoding of a captured image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG image.
    Png,
    /// JPEG image.
    Jpeg,
}

impl ImageFormat {
    /// MIME type of the encoding.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Conventional file extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

/// A flat, fixed-size bitmap of the card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Encoding of `bytes`.
    pub format: ImageFormat,
    /// Encoded image data.
    pub bytes: Vec<u8>,
}

/// The platform capability that turns a card snapshot into pixels.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Rasterize the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::Rasterize`] if the platform refuses or fails.
    async fn rasterize(&self, snapshot: &CardSnapshot) -> Result<RasterImage, CaptureError>;
}

/// Restores the editor when dropped, so every exit path un-freezes input.
struct RestoreGuard<'a> {
    session: &'a EditorSession,
    restore: Option<CaptureRestore>,
}

impl Drop for RestoreGuard<'_> {
    fn drop(&mut self) {
        if let Some(restore) = self.restore.take() {
            self.session.write(|state| state.finish_capture(restore));
        }
    }
}

/// Runs captures against a shared editor session.
pub struct CaptureExporter<R> {
    session: EditorSession,
    rasterizer: R,
    render_tick: Duration,
}

impl<R: Rasterizer> CaptureExporter<R> {
    /// Create an exporter.
    ///
    /// `render_tick` is how long to wait after hiding chrome so the host has
    /// drawn a clean frame before rasterizing.
    #[must_use]
    pub fn new(session: EditorSession, rasterizer: R, render_tick: Duration) -> Self {
        Self {
            session,
            rasterizer,
            render_tick,
        }
    }

    /// The session this exporter captures.
    #[must_use]
    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    /// Capture the card.
    ///
    /// # Errors
    ///
    /// - [`CaptureError::AlreadyCapturing`] if another capture is running;
    ///   that capture is unaffected.
    /// - [`CaptureError::Rasterize`] or [`CaptureError::EmptyArtifact`] if no
    ///   usable image was produced.
    pub async fn capture(&self) -> Result<RasterImage, CaptureError> {
        let restore = self.session.write(EditorState::begin_capture)?;
        let _guard = RestoreGuard {
            session: &self.session,
            restore: Some(restore),
        };
        tracing::info!("Capture started");

        tokio::time::sleep(self.render_tick).await;

        let snapshot = self.session.read(EditorState::snapshot);
        let result = self
            .rasterizer
            .rasterize(&snapshot)
            .await
            .and_then(|image| {
                if image.bytes.is_empty() || image.width == 0 || image.height == 0 {
                    Err(CaptureError::EmptyArtifact)
                } else {
                    Ok(image)
                }
            });

        match &result {
            Ok(image) => tracing::info!(
                "Captured {}x{} {} ({} bytes)",
                image.width,
                image.height,
                image.format.extension(),
                image.bytes.len()
            ),
            Err(e) => tracing::warn!("Capture failed: {e}"),
        }
        result
    }
}
