//! Editor scripts: a recorded sequence of user input replayed headlessly.
//!
//! ```json
//! {
//!   "seed": { "main_stat": "3h 05m" },
//!   "steps": [
//!     { "op": "background_tap", "x": 180, "y": 500 },
//!     { "op": "text", "id_index": 0, "text": "Exam week" },
//!     { "op": "touch", "element": "date", "phase": "start", "touches": [{ "id": 0, "x": 0, "y": 0 }] },
//!     { "op": "capture" }
//!   ]
//! }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use storycard_core::{
    CaptureError, CaptureExporter, CardSeed, CustomId, EditorSession, EditorState, ElementId,
    FixedKind, RasterImage, Rasterizer, StylePatch, TouchEvent, TouchPhase, TouchPoint, Vec2,
};
use thiserror::Error;

/// Errors raised while replaying a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The script document is malformed.
    #[error("Invalid script: {0}")]
    Parse(#[from] serde_json::Error),

    /// A step referred to a custom text that was never created.
    #[error("No custom text #{index} (only {known} created)")]
    UnknownCustom {
        /// Requested index.
        index: usize,
        /// Number of custom texts created so far.
        known: usize,
    },

    /// A capture step failed.
    #[error("Capture failed: {0}")]
    Capture(#[from] CaptureError),
}

/// An element reference inside a script.
///
/// Fixed elements are named by kind; custom texts by creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementRef {
    /// A fixed element, e.g. `"mainStat"`.
    Fixed(FixedKind),
    /// The n-th custom text created by this script, e.g. `{"custom": 0}`.
    Custom {
        /// Creation index.
        custom: usize,
    },
}

/// One recorded input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptStep {
    /// Raw touch event on an element.
    Touch {
        /// Target element.
        element: ElementRef,
        /// Touch phase.
        phase: TouchPhase,
        /// Active touch points.
        #[serde(default)]
        touches: Vec<TouchPoint>,
    },
    /// Tap on empty canvas, in screen coordinates.
    BackgroundTap {
        /// Screen X.
        x: f32,
        /// Screen Y.
        y: f32,
    },
    /// Replace a custom text's content.
    Text {
        /// Creation index of the custom text.
        id_index: usize,
        /// New content.
        text: String,
    },
    /// Patch an element's style.
    Style {
        /// Target element.
        element: ElementRef,
        /// Fields to change.
        #[serde(default)]
        patch: StylePatch,
    },
    /// Select an element.
    Select {
        /// Target element.
        element: ElementRef,
    },
    /// Clear the selection.
    Deselect,
    /// Finish inline editing.
    EndEdit,
    /// Hide a fixed element.
    Hide {
        /// Element kind.
        kind: FixedKind,
    },
    /// Show a hidden fixed element.
    Show {
        /// Element kind.
        kind: FixedKind,
    },
    /// Show every hidden fixed element.
    ShowAll,
    /// Delete a custom text.
    Remove {
        /// Creation index of the custom text.
        id_index: usize,
    },
    /// Rasterize the card.
    Capture,
}

/// A script document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Script {
    /// Seed values for the fixed elements.
    pub seed: CardSeed,
    /// Steps in replay order.
    pub steps: Vec<ScriptStep>,
}

impl Script {
    /// Parse a script from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether any step captures the card.
    #[must_use]
    pub fn has_capture(&self) -> bool {
        self.steps.iter().any(|s| matches!(s, ScriptStep::Capture))
    }
}

/// Replays script steps against an editor session.
pub struct ScriptRunner<R> {
    exporter: CaptureExporter<R>,
    customs: Vec<CustomId>,
    captures: Vec<RasterImage>,
}

impl<R: Rasterizer> ScriptRunner<R> {
    /// Create a runner driving `session`.
    #[must_use]
    pub fn new(session: EditorSession, rasterizer: R, render_tick: Duration) -> Self {
        Self {
            exporter: CaptureExporter::new(session, rasterizer, render_tick),
            customs: Vec::new(),
            captures: Vec::new(),
        }
    }

    /// The session being driven.
    #[must_use]
    pub fn session(&self) -> &EditorSession {
        self.exporter.session()
    }

    /// Custom texts created so far, in creation order.
    #[must_use]
    pub fn customs(&self) -> &[CustomId] {
        &self.customs
    }

    /// Images captured so far.
    #[must_use]
    pub fn captures(&self) -> &[RasterImage] {
        &self.captures
    }

    /// Replay every step, then return the captured images.
    ///
    /// # Errors
    ///
    /// Stops at the first step that fails.
    pub async fn run(mut self, steps: &[ScriptStep]) -> Result<Vec<RasterImage>, ScriptError> {
        for (index, step) in steps.iter().enumerate() {
            tracing::debug!("Step {index}: {step:?}");
            self.apply(step).await?;
        }
        Ok(self.captures)
    }

    /// Capture the card now.
    ///
    /// # Errors
    ///
    /// Returns an error if the capture fails.
    pub async fn capture(&mut self) -> Result<&RasterImage, ScriptError> {
        let image = self.exporter.capture().await?;
        self.captures.push(image);
        Ok(&self.captures[self.captures.len() - 1])
    }

    /// Apply a single step.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown custom references or failed captures.
    pub async fn apply(&mut self, step: &ScriptStep) -> Result<(), ScriptError> {
        let session = self.exporter.session().clone();
        match step {
            ScriptStep::Touch {
                element,
                phase,
                touches,
            } => {
                let id = self.resolve(*element)?;
                let event = TouchEvent::new(*phase, touches.clone());
                if let Some(intent) = session.write(|state| state.handle_touch(id, &event)) {
                    tracing::debug!("{id}: {intent:?}");
                }
            }
            ScriptStep::BackgroundTap { x, y } => {
                if let Some(id) = session.write(|state| state.on_background_tap(Vec2::new(*x, *y)))
                {
                    self.customs.push(id);
                }
            }
            ScriptStep::Text { id_index, text } => {
                let id = self.custom(*id_index)?;
                if !session.write(|state| state.update_content(id, text.as_str())) {
                    tracing::warn!("Custom text #{id_index} no longer exists");
                }
            }
            ScriptStep::Style { element, patch } => {
                let id = self.resolve(*element)?;
                if !session.write(|state| state.update_style(id, patch)) {
                    tracing::warn!("Style not applied to {id}");
                }
            }
            ScriptStep::Select { element } => {
                let id = self.resolve(*element)?;
                session.write(|state| state.select(id));
            }
            ScriptStep::Deselect => session.write(EditorState::deselect),
            ScriptStep::EndEdit => {
                session.write(EditorState::end_edit);
            }
            ScriptStep::Hide { kind } => {
                session.write(|state| state.set_visible(*kind, false));
            }
            ScriptStep::Show { kind } => {
                session.write(|state| state.set_visible(*kind, true));
            }
            ScriptStep::ShowAll => {
                session.write(EditorState::show_all);
            }
            ScriptStep::Remove { id_index } => {
                let id = self.custom(*id_index)?;
                session.write(|state| state.remove(ElementId::Custom(id)));
            }
            ScriptStep::Capture => {
                self.capture().await?;
            }
        }
        Ok(())
    }

    fn custom(&self, index: usize) -> Result<CustomId, ScriptError> {
        self.customs
            .get(index)
            .copied()
            .ok_or(ScriptError::UnknownCustom {
                index,
                known: self.customs.len(),
            })
    }

    fn resolve(&self, element: ElementRef) -> Result<ElementId, ScriptError> {
        match element {
            ElementRef::Fixed(kind) => Ok(ElementId::Fixed(kind)),
            ElementRef::Custom { custom } => self.custom(custom).map(ElementId::Custom),
        }
    }
}
