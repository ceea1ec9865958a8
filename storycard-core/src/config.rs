//! Editor configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::element::{clamp_scale, TextStyle, Vec2, MAX_SCALE, MIN_SCALE};
use crate::error::{CardError, CardResult};

/// Default canvas width in logical units.
const DEFAULT_WIDTH: f32 = 360.0;

/// Default canvas height in logical units.
const DEFAULT_HEIGHT: f32 = 640.0;

/// Tunables for one editing session.
///
/// Every field has a default, so a partial JSON document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Canvas width in logical units.
    pub canvas_width: f32,
    /// Canvas height in logical units.
    pub canvas_height: f32,
    /// Canvas top-left corner in screen coordinates.
    pub canvas_origin: Vec2,
    /// Movement (per axis) a single touch must exceed to become a drag.
    pub drag_threshold: f32,
    /// Lower pinch bound, never below the global minimum.
    pub min_scale: f32,
    /// Upper pinch bound, never above the global maximum.
    pub max_scale: f32,
    /// Delay between hiding editor chrome and rasterizing, in milliseconds.
    pub render_tick_ms: u64,
    /// Color of newly added text.
    pub default_text_color: String,
    /// Font size of newly added text.
    pub default_font_size: f32,
    /// Content of newly added text.
    pub placeholder_text: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_WIDTH,
            canvas_height: DEFAULT_HEIGHT,
            canvas_origin: Vec2::ZERO,
            drag_threshold: 5.0,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            render_tick_ms: 50,
            default_text_color: "#FFFFFF".to_string(),
            default_font_size: 24.0,
            placeholder_text: "Tap to edit".to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the values are unusable.
    pub fn from_json(json: &str) -> CardResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the values describe a usable editor.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::InvalidConfig`] describing the first bad field.
    pub fn validate(&self) -> CardResult<()> {
        if !is_positive(self.canvas_width) || !is_positive(self.canvas_height) {
            return Err(CardError::InvalidConfig(format!(
                "canvas size must be positive, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        if self.drag_threshold.is_nan() || self.drag_threshold < 0.0 {
            return Err(CardError::InvalidConfig(format!(
                "drag threshold must be non-negative, got {}",
                self.drag_threshold
            )));
        }
        if self.min_scale.is_nan() || self.max_scale.is_nan() || self.min_scale > self.max_scale {
            return Err(CardError::InvalidConfig(format!(
                "scale bounds inverted: {} > {}",
                self.min_scale, self.max_scale
            )));
        }
        if !is_positive(self.default_font_size) {
            return Err(CardError::InvalidConfig(format!(
                "font size must be positive, got {}",
                self.default_font_size
            )));
        }
        Ok(())
    }

    /// Pinch bounds, intersected with the global scale range.
    #[must_use]
    pub fn scale_bounds(&self) -> (f32, f32) {
        let min = clamp_scale(self.min_scale);
        let max = clamp_scale(self.max_scale).max(min);
        (min, max)
    }

    /// The render tick as a duration.
    #[must_use]
    pub fn render_tick(&self) -> Duration {
        Duration::from_millis(self.render_tick_ms)
    }

    /// Style applied to newly added text.
    #[must_use]
    pub fn default_style(&self) -> TextStyle {
        TextStyle {
            color: self.default_text_color.clone(),
            font_size: self.default_font_size,
        }
    }
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}
