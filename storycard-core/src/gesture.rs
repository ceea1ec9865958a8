//! # Gesture Classification
//!
//! Turns one element's raw multi-touch stream into discrete intents.
//!
//! ```text
//! start ──► Candidate ──(moved > threshold)──► Dragging ──end──► GestureCommitted
//!   │           │                                   ▲
//!   │           └──────────────end──────────────────┼──────────► Tap
//!   │                                               │
//!   └─(2 touches)─► Pinching ──(1 touch left)──► Candidate (pinched)
//!                      │
//!                      └──────────end───────────────────────────► GestureCommitted
//! ```
//!
//! A gesture that reaches `end` yields exactly one of `Tap` or
//! `GestureCommitted`, never both.

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::element::{Transform, Vec2};
use crate::event::{TouchEvent, TouchPhase, TouchPoint};

/// Classifier state for the current touch interaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureMode {
    /// No touch active.
    #[default]
    Idle,
    /// Touch down, not yet moved past the drag threshold.
    Candidate,
    /// Single-finger drag in progress.
    Dragging,
    /// Two-finger pinch in progress.
    Pinching,
}

/// A discrete outcome of the touch stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "camelCase")]
pub enum GestureIntent {
    /// The element was tapped without moving.
    Tap,
    /// Pinch produced a new (clamped) scale.
    ScaleChanged {
        /// The new scale.
        scale: f32,
    },
    /// Drag moved by `(dx, dy)` relative to the baseline offset.
    PositionDelta {
        /// Horizontal delta.
        dx: f32,
        /// Vertical delta.
        dy: f32,
    },
    /// The gesture ended; pending progress should be flattened.
    GestureCommitted,
    /// The gesture was interrupted; pending progress should be dropped.
    Cancelled,
}

/// Transient per-element state. Exists meaningfully only while a touch is down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GestureSession {
    /// Current mode.
    pub mode: GestureMode,
    /// Distance between the two fingers when the pinch began.
    pub initial_pinch_distance: f32,
    /// Element scale when the pinch began.
    pub initial_scale: f32,
    /// Element position the drag delta is added to.
    pub baseline_offset: Option<Vec2>,
    /// Whether the drag threshold was crossed.
    pub movement_detected: bool,
    /// Screen point single-finger movement is measured from.
    pub origin: Vec2,
    /// Whether this gesture included a pinch at any point.
    pub pinched: bool,
}

impl GestureSession {
    fn begin(origin: Vec2) -> Self {
        Self {
            mode: GestureMode::Candidate,
            origin,
            ..Self::default()
        }
    }

    /// Whether a touch interaction is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.mode != GestureMode::Idle
    }
}

/// Thresholds used by a classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    /// Per-axis movement that turns a touch into a drag.
    pub drag_threshold: f32,
    /// Lower scale bound.
    pub min_scale: f32,
    /// Upper scale bound.
    pub max_scale: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self::from(&EditorConfig::default())
    }
}

impl From<&EditorConfig> for GestureConfig {
    fn from(config: &EditorConfig) -> Self {
        let (min_scale, max_scale) = config.scale_bounds();
        Self {
            drag_threshold: config.drag_threshold,
            min_scale,
            max_scale,
        }
    }
}

/// Classifies one element's touch stream. Instances share no state.
#[derive(Debug, Clone, Default)]
pub struct GestureClassifier {
    session: GestureSession,
    config: GestureConfig,
}

impl GestureClassifier {
    /// Create a classifier with the given thresholds.
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            session: GestureSession::default(),
            config,
        }
    }

    /// The current session.
    #[must_use]
    pub fn session(&self) -> &GestureSession {
        &self.session
    }

    /// The offset drag deltas are relative to, once a drag has started.
    #[must_use]
    pub fn baseline_offset(&self) -> Option<Vec2> {
        self.session.baseline_offset
    }

    /// Forget any in-progress gesture.
    pub fn reset(&mut self) {
        self.session = GestureSession::default();
    }

    /// Feed one touch event. `transform` is the element's current transform.
    pub fn process(&mut self, event: &TouchEvent, transform: &Transform) -> Option<GestureIntent> {
        match event.phase {
            TouchPhase::Start => self.on_start(event, transform),
            TouchPhase::Move => self.on_move(event, transform),
            TouchPhase::End => self.on_end(),
            TouchPhase::Cancel => self.interrupt(),
        }
    }

    fn on_start(&mut self, event: &TouchEvent, transform: &Transform) -> Option<GestureIntent> {
        if !Self::usable(event) {
            tracing::warn!("Touch start with non-finite coordinates, resetting gesture");
            return self.interrupt();
        }

        if let Some((a, b)) = event.pinch_pair() {
            // A second finger landing mid-gesture joins the current session.
            if !self.session.is_active() {
                self.session = GestureSession::begin(a.position());
            }
            self.enter_pinch(a, b, transform);
            return None;
        }

        let Some(point) = event.primary_touch() else {
            tracing::warn!("Touch start without touch points, resetting gesture");
            return self.interrupt();
        };

        let interrupted = self.session.is_active();
        if interrupted {
            tracing::debug!("Touch start during active gesture, restarting");
        }
        self.session = GestureSession::begin(point.position());
        interrupted.then_some(GestureIntent::Cancelled)
    }

    fn on_move(&mut self, event: &TouchEvent, transform: &Transform) -> Option<GestureIntent> {
        if !self.session.is_active() {
            tracing::debug!("Touch move without start, ignoring");
            return None;
        }

        if !Self::usable(event) {
            tracing::warn!("Touch move with non-finite coordinates, resetting gesture");
            return self.interrupt();
        }

        if let Some((a, b)) = event.pinch_pair() {
            if self.session.mode != GestureMode::Pinching {
                self.enter_pinch(a, b, transform);
                return None;
            }
            return self.pinch_scale(a, b);
        }

        let Some(point) = event.primary_touch() else {
            tracing::warn!("Touch move without touch points, resetting gesture");
            return self.interrupt();
        };
        let point = point.position();

        if self.session.mode == GestureMode::Pinching {
            // Rebase on the remaining finger so the element does not jump.
            tracing::debug!("Pinch reduced to single touch, rebasing drag");
            self.session.mode = GestureMode::Candidate;
            self.session.origin = point;
            self.session.baseline_offset = Some(transform.effective_position());
            return None;
        }

        let delta = point - self.session.origin;
        if self.session.mode == GestureMode::Candidate && self.exceeds_threshold(delta) {
            self.session.mode = GestureMode::Dragging;
            self.session.movement_detected = true;
            self.session
                .baseline_offset
                .get_or_insert_with(|| transform.effective_position());
            tracing::debug!("Drag threshold crossed at ({}, {})", delta.x, delta.y);
        }

        (self.session.mode == GestureMode::Dragging).then_some(GestureIntent::PositionDelta {
            dx: delta.x,
            dy: delta.y,
        })
    }

    fn on_end(&mut self) -> Option<GestureIntent> {
        let session = std::mem::take(&mut self.session);
        match session.mode {
            GestureMode::Idle => {
                tracing::debug!("Touch end without start, ignoring");
                None
            }
            GestureMode::Dragging | GestureMode::Pinching => Some(GestureIntent::GestureCommitted),
            GestureMode::Candidate if session.pinched => Some(GestureIntent::GestureCommitted),
            GestureMode::Candidate => Some(GestureIntent::Tap),
        }
    }

    fn interrupt(&mut self) -> Option<GestureIntent> {
        let was_active = self.session.is_active();
        self.reset();
        was_active.then_some(GestureIntent::Cancelled)
    }

    fn enter_pinch(&mut self, a: TouchPoint, b: TouchPoint, transform: &Transform) {
        self.session.mode = GestureMode::Pinching;
        self.session.pinched = true;
        self.session.initial_pinch_distance = a.position().distance(b.position());
        self.session.initial_scale = transform.effective_scale();
        tracing::debug!(
            "Pinch started at distance {}",
            self.session.initial_pinch_distance
        );
    }

    fn pinch_scale(&self, a: TouchPoint, b: TouchPoint) -> Option<GestureIntent> {
        let initial = self.session.initial_pinch_distance;
        if initial <= 0.0 || !initial.is_finite() {
            return None;
        }
        let distance = a.position().distance(b.position());
        let scale = (distance / initial * self.session.initial_scale)
            .clamp(self.config.min_scale, self.config.max_scale);
        Some(GestureIntent::ScaleChanged { scale })
    }

    /// The touch points a gesture reads (first two at most) are all finite.
    fn usable(event: &TouchEvent) -> bool {
        event.touches.iter().take(2).all(TouchPoint::is_finite)
    }

    fn exceeds_threshold(&self, delta: Vec2) -> bool {
        delta.x.abs() > self.config.drag_threshold || delta.y.abs() > self.config.drag_threshold
    }
}
