//! Screen ↔ canvas-local coordinate conversion.
//!
//! Element positions are stored relative to the canvas *center* so a card
//! composed on one canvas size stays centered on another.

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::element::{CanvasElement, Vec2};

/// Where the contextual action menu is drawn relative to its element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuPlacement {
    /// Menu above the element.
    Above,
    /// Menu below the element.
    Below,
}

/// Fixed-size canvas placed somewhere on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSpace {
    width: f32,
    height: f32,
    top_left: Vec2,
}

impl CoordinateSpace {
    /// Canvas of `width` x `height` whose top-left corner sits at `top_left` on screen.
    #[must_use]
    pub const fn new(width: f32, height: f32, top_left: Vec2) -> Self {
        Self {
            width,
            height,
            top_left,
        }
    }

    /// Canvas width.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Canvas height.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Canvas center in canvas (top-left origin) coordinates.
    #[must_use]
    pub fn half_size(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Convert a screen point to a center-relative canvas point.
    #[must_use]
    pub fn to_local(&self, screen: Vec2) -> Vec2 {
        screen - self.top_left - self.half_size()
    }

    /// Convert a center-relative canvas point back to screen space.
    #[must_use]
    pub fn to_screen(&self, local: Vec2) -> Vec2 {
        local + self.top_left + self.half_size()
    }

    /// Side on which to open the action menu for an element at `offset_y`.
    ///
    /// Elements in the upper half get the menu below them, elements in the
    /// lower half get it above, so it never clips off the canvas edge.
    #[must_use]
    pub fn placement_for(&self, offset_y: f32, half_extent: f32) -> MenuPlacement {
        let center = self.height / 2.0;
        let absolute_y = center + offset_y + half_extent;
        if absolute_y < center {
            MenuPlacement::Below
        } else {
            MenuPlacement::Above
        }
    }

    /// Menu placement for an element, using its live vertical offset.
    #[must_use]
    pub fn menu_placement(&self, element: &CanvasElement) -> MenuPlacement {
        self.placement_for(element.transform().current_offset_y, element.half_extent())
    }
}

impl From<&EditorConfig> for CoordinateSpace {
    fn from(config: &EditorConfig) -> Self {
        Self::new(config.canvas_width, config.canvas_height, config.canvas_origin)
    }
}
