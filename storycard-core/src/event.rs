//! Raw touch input delivered to a single element's hit region.

use serde::{Deserialize, Serialize};

use crate::element::Vec2;

/// Phase of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    /// Touch started (finger down).
    Start,
    /// Touch moved (finger dragging).
    Move,
    /// Touch ended (all fingers up).
    End,
    /// Touch sequence interrupted by the platform (e.g. a system gesture).
    Cancel,
}

/// A single touch point in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    /// Touch identifier (for multi-touch).
    pub id: u32,
    /// X position in screen coordinates.
    pub x: f32,
    /// Y position in screen coordinates.
    pub y: f32,
}

impl TouchPoint {
    /// Create a touch point.
    #[must_use]
    pub const fn new(id: u32, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }

    /// Whether both coordinates are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// The point as a vector.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// A touch event with zero or more touch points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    /// Phase of this touch event.
    pub phase: TouchPhase,
    /// All current touch points.
    #[serde(default)]
    pub touches: Vec<TouchPoint>,
}

impl TouchEvent {
    /// Create a new touch event.
    #[must_use]
    pub fn new(phase: TouchPhase, touches: Vec<TouchPoint>) -> Self {
        Self { phase, touches }
    }

    /// Single-finger event at `(x, y)`.
    #[must_use]
    pub fn single(phase: TouchPhase, x: f32, y: f32) -> Self {
        Self::new(phase, vec![TouchPoint::new(0, x, y)])
    }

    /// Two-finger event.
    #[must_use]
    pub fn pair(phase: TouchPhase, a: (f32, f32), b: (f32, f32)) -> Self {
        Self::new(
            phase,
            vec![TouchPoint::new(0, a.0, a.1), TouchPoint::new(1, b.0, b.1)],
        )
    }

    /// Get the primary (first) touch point.
    #[must_use]
    pub fn primary_touch(&self) -> Option<&TouchPoint> {
        self.touches.first()
    }

    /// Check if this is a multi-touch event.
    #[must_use]
    pub fn is_multi_touch(&self) -> bool {
        self.touches.len() > 1
    }

    /// The first two touch points, if at least two are down.
    ///
    /// Extra fingers beyond the second are ignored.
    #[must_use]
    pub fn pinch_pair(&self) -> Option<(TouchPoint, TouchPoint)> {
        match self.touches.as_slice() {
            [a, b, ..] => Some((*a, *b)),
            _ => None,
        }
    }
}
