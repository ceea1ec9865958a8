//! # Story Card Core
//!
//! Editor logic for composing a shareable study "story card": a fixed-size
//! canvas of seeded stat elements plus user-added text, each independently
//! dragged, pinch-scaled, selected, edited, hidden or deleted, then
//! rasterized for export.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               storycard-core                │
//! ├─────────────────────────────────────────────┤
//! │  Gesture Classifier │  Element Registry     │
//! │  - Tap / drag       │  - Fixed + custom     │
//! │  - Pinch scale      │  - Commit / cancel    │
//! ├─────────────────────────────────────────────┤
//! │  Selection          │  Capture Exporter     │
//! │  - Single select    │  - Chrome-free frame  │
//! │  - Background spawn │  - Rasterizer seam    │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod capture;
pub mod config;
pub mod coords;
pub mod element;
pub mod error;
pub mod event;
pub mod gesture;
pub mod registry;
pub mod selection;
pub mod snapshot;
pub mod state;

pub use capture::{CaptureExporter, ImageFormat, RasterImage, Rasterizer};
pub use config::EditorConfig;
pub use coords::{CoordinateSpace, MenuPlacement};
pub use element::{
    clamp_scale, Background, CanvasElement, CardSeed, CustomId, CustomTextElement, ElementId,
    FixedElement, FixedKind, StylePatch, TextStyle, Transform, Vec2, MAX_SCALE, MIN_SCALE,
};
pub use error::{CaptureError, CardError, CardResult};
pub use event::{TouchEvent, TouchPhase, TouchPoint};
pub use gesture::{GestureClassifier, GestureConfig, GestureIntent, GestureMode, GestureSession};
pub use registry::ElementRegistry;
pub use selection::SelectionController;
pub use snapshot::{CardSnapshot, SnapshotElement};
pub use state::{EditorChrome, EditorSession, EditorState};

/// Story card core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
