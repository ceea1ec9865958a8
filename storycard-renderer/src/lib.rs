//! # Story Card Renderer
//!
//! Software rasterizer for story cards. A [`storycard_core::CardSnapshot`]
//! is rendered to SVG, rasterized with resvg, and encoded as PNG or JPEG.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌─────────┐   ┌──────────────┐   ┌────────────┐
//! │ CardSnapshot │ → │   SVG   │ → │ tiny-skia    │ → │ PNG / JPEG │
//! │ (chrome-free)│   │ string  │   │ Pixmap       │   │ bytes      │
//! └──────────────┘   └─────────┘   └──────────────┘   └────────────┘
//! ```
//!
//! [`CardExporter`] implements [`storycard_core::Rasterizer`], so it plugs
//! straight into [`storycard_core::CaptureExporter`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;

pub use error::{RenderError, RenderResult};
pub use export::{data_uri, CardExporter, ExportConfig};
