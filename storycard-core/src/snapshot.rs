//! Render-ready view of the card, free of editor chrome.

use serde::{Deserialize, Serialize};

use crate::element::{Background, CanvasElement, ElementId, FixedKind, Vec2};
use crate::error::{CardError, CardResult};

/// Default text color of fixed elements.
const FIXED_TEXT_COLOR: &str = "#FFFFFF";

/// One drawable element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotElement {
    /// Source element.
    pub id: ElementId,
    /// Text to draw.
    pub text: String,
    /// Text color as hex.
    pub color: String,
    /// Font size before scaling.
    pub font_size: f32,
    /// Offset from the canvas center.
    pub position: Vec2,
    /// Scale factor.
    pub scale: f32,
}

impl SnapshotElement {
    /// Font size after scaling.
    #[must_use]
    pub fn scaled_font_size(&self) -> f32 {
        self.font_size * self.scale
    }

    /// Whether this is the headline stat, drawn bold.
    #[must_use]
    pub fn is_headline(&self) -> bool {
        self.id == ElementId::Fixed(FixedKind::MainStat)
    }

    fn from_element(element: &CanvasElement) -> Self {
        let transform = element.transform();
        let color = match element {
            CanvasElement::Fixed(_) => FIXED_TEXT_COLOR.to_string(),
            CanvasElement::Custom(custom) => custom.style.color.clone(),
        };
        Self {
            id: element.id(),
            text: element.text().to_string(),
            color,
            font_size: element.font_size(),
            position: transform.effective_position(),
            scale: transform.effective_scale(),
        }
    }
}

/// Everything a renderer needs to draw the card, and nothing else.
///
/// Hidden elements are omitted. Selection outlines, action menus and the
/// tap-to-add overlay are never part of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSnapshot {
    /// Canvas width in logical units.
    pub width: f32,
    /// Canvas height in logical units.
    pub height: f32,
    /// Card background.
    pub background: Background,
    /// Visible elements in draw order.
    pub elements: Vec<SnapshotElement>,
}

impl CardSnapshot {
    /// Build a snapshot from elements in draw order.
    #[must_use]
    pub fn new<'a>(
        width: f32,
        height: f32,
        background: Background,
        elements: impl IntoIterator<Item = &'a CanvasElement>,
    ) -> Self {
        Self {
            width,
            height,
            background,
            elements: elements
                .into_iter()
                .filter(|e| e.is_visible())
                .map(SnapshotElement::from_element)
                .collect(),
        }
    }

    /// Canvas center in top-left-origin coordinates.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Number of drawable elements.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Serialize the snapshot to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CardResult<String> {
        serde_json::to_string(self).map_err(CardError::Serialization)
    }

    /// Deserialize a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> CardResult<Self> {
        serde_json::from_str(json).map_err(CardError::Serialization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{CustomId, CustomTextElement, FixedElement, TextStyle, Transform};

    fn fixed(kind: FixedKind, visible: bool) -> CanvasElement {
        CanvasElement::Fixed(FixedElement {
            kind,
            visible,
            text: kind.name().to_string(),
            transform: Transform::at(kind.default_position()),
        })
    }

    #[test]
    fn test_hidden_elements_are_omitted() {
        let elements = [
            fixed(FixedKind::Date, true),
            fixed(FixedKind::Message, false),
        ];
        let snapshot = CardSnapshot::new(360.0, 640.0, Background::default(), &elements);
        assert_eq!(snapshot.element_count(), 1);
        assert_eq!(snapshot.elements[0].id, ElementId::Fixed(FixedKind::Date));
    }

    #[test]
    fn test_custom_style_carried_over() {
        let mut transform = Transform::at(Vec2::new(5.0, 6.0));
        transform.set_scale(2.0);
        let custom = CanvasElement::Custom(CustomTextElement {
            id: CustomId::new(),
            text: "hi".to_string(),
            style: TextStyle {
                color: "#00FF00".to_string(),
                font_size: 20.0,
            },
            transform,
        });
        let snapshot = CardSnapshot::new(100.0, 100.0, Background::default(), [&custom]);
        let element = &snapshot.elements[0];
        assert_eq!(element.color, "#00FF00");
        assert!((element.scaled_font_size() - 40.0).abs() < f32::EPSILON);
        assert_eq!(element.position, Vec2::new(5.0, 6.0));
    }

    #[test]
    fn test_json_roundtrip() {
        let elements = [fixed(FixedKind::MainStat, true)];
        let snapshot = CardSnapshot::new(360.0, 640.0, Background::default(), &elements);
        let json = snapshot.to_json().expect("serialize");
        let restored = CardSnapshot::from_json(&json).expect("deserialize");
        assert_eq!(restored, snapshot);
        assert!(restored.elements[0].is_headline());
    }
}
