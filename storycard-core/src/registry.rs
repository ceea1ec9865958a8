//! Element registry: the card's elements and one gesture classifier per element.

use std::collections::HashMap;

use crate::config::EditorConfig;
use crate::element::{
    CanvasElement, CardSeed, CustomId, CustomTextElement, ElementId, FixedElement, FixedKind,
    StylePatch, TextStyle, Transform, Vec2,
};
use crate::event::TouchEvent;
use crate::gesture::{GestureClassifier, GestureConfig, GestureIntent};

/// Owns every element on the card and its gesture state.
///
/// Fixed elements are created once from the seed and only ever hidden.
/// Custom text elements are appended in creation order, which is also their
/// draw order.
#[derive(Debug, Clone)]
pub struct ElementRegistry {
    elements: Vec<CanvasElement>,
    gestures: HashMap<ElementId, GestureClassifier>,
    gesture_config: GestureConfig,
    default_style: TextStyle,
    placeholder: String,
}

impl ElementRegistry {
    /// Create a registry holding the seeded fixed elements.
    #[must_use]
    pub fn new(config: &EditorConfig, seed: &CardSeed) -> Self {
        let gesture_config = GestureConfig::from(config);
        let mut registry = Self {
            elements: Vec::with_capacity(FixedKind::ALL.len()),
            gestures: HashMap::new(),
            gesture_config,
            default_style: config.default_style(),
            placeholder: config.placeholder_text.clone(),
        };

        for kind in FixedKind::ALL {
            registry.insert(CanvasElement::Fixed(FixedElement {
                kind,
                visible: true,
                text: seed.text_for(kind).to_string(),
                transform: Transform::at(kind.default_position()),
            }));
        }
        registry
    }

    fn insert(&mut self, element: CanvasElement) {
        self.gestures
            .insert(element.id(), GestureClassifier::new(self.gesture_config));
        self.elements.push(element);
    }

    fn index_of(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id() == id)
    }

    fn custom_mut(&mut self, id: CustomId) -> Option<&mut CustomTextElement> {
        self.elements.iter_mut().find_map(|e| match e {
            CanvasElement::Custom(custom) if custom.id == id => Some(custom),
            _ => None,
        })
    }

    fn fixed_mut(&mut self, kind: FixedKind) -> Option<&mut FixedElement> {
        self.elements.iter_mut().find_map(|e| match e {
            CanvasElement::Fixed(fixed) if fixed.kind == kind => Some(fixed),
            _ => None,
        })
    }

    /// Append a custom text element at a canvas-local position.
    ///
    /// The element starts with the default style and placeholder text.
    pub fn add_custom_text(&mut self, local_position: Vec2) -> CustomId {
        let id = CustomId::new();
        self.insert(CanvasElement::Custom(CustomTextElement {
            id,
            text: self.placeholder.clone(),
            style: self.default_style.clone(),
            transform: Transform::at(local_position),
        }));
        tracing::debug!(
            "Added custom text {id} at ({}, {})",
            local_position.x,
            local_position.y
        );
        id
    }

    /// Merge a partial style update. Returns `false` for unknown ids.
    ///
    /// Color and font size only apply to custom text; scale applies to any
    /// element and is clamped.
    pub fn update_style(&mut self, id: ElementId, patch: &StylePatch) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let element = &mut self.elements[index];
        if let CanvasElement::Custom(custom) = element {
            if let Some(color) = &patch.color {
                custom.style.color.clone_from(color);
            }
            if let Some(font_size) = patch.font_size {
                custom.style.font_size = font_size;
            }
        }
        if let Some(scale) = patch.scale {
            element.transform_mut().set_scale(scale);
        }
        true
    }

    /// Replace a custom element's text. Empty text is allowed.
    pub fn update_content(&mut self, id: CustomId, text: impl Into<String>) -> bool {
        match self.custom_mut(id) {
            Some(custom) => {
                custom.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Remove a custom element and its classifier.
    ///
    /// Unknown ids and fixed elements are left alone; returns whether anything
    /// was removed.
    pub fn remove(&mut self, id: ElementId) -> bool {
        if matches!(id, ElementId::Fixed(_)) {
            return false;
        }
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.elements.remove(index);
        self.gestures.remove(&id);
        tracing::debug!("Removed {id}");
        true
    }

    /// Show or hide a fixed element. Returns whether visibility changed.
    ///
    /// Hiding drops any gesture in progress on the element.
    pub fn set_visible(&mut self, kind: FixedKind, visible: bool) -> bool {
        let Some(fixed) = self.fixed_mut(kind) else {
            return false;
        };
        if fixed.visible == visible {
            return false;
        }
        fixed.visible = visible;
        if !visible {
            fixed.transform.discard_pending();
            if let Some(gesture) = self.gestures.get_mut(&ElementId::Fixed(kind)) {
                gesture.reset();
            }
        }
        true
    }

    /// Feed a touch event to an element's classifier and apply the result.
    ///
    /// In-flight drag and pinch progress is written to the element's pending
    /// transform; commit and cancel are applied immediately. The intent is
    /// returned so the caller can react to taps and commits. Touches on
    /// unknown or hidden elements yield `None`.
    pub fn handle_touch(&mut self, id: ElementId, event: &TouchEvent) -> Option<GestureIntent> {
        let index = self.index_of(id)?;
        if !self.elements[index].is_visible() {
            return None;
        }
        let classifier = self.gestures.get_mut(&id)?;
        let transform = self.elements[index].transform_mut();
        let intent = classifier.process(event, transform)?;

        match intent {
            GestureIntent::ScaleChanged { scale } => transform.set_pending_scale(scale),
            GestureIntent::PositionDelta { dx, dy } => {
                if let Some(baseline) = classifier.baseline_offset() {
                    transform.set_pending_target(baseline + Vec2::new(dx, dy));
                }
            }
            GestureIntent::GestureCommitted => {
                transform.flatten();
                tracing::debug!(
                    "Committed {id} at ({}, {}) scale {}",
                    transform.position.x,
                    transform.position.y,
                    transform.scale
                );
            }
            GestureIntent::Cancelled => transform.discard_pending(),
            GestureIntent::Tap => {}
        }
        Some(intent)
    }

    /// Flatten any pending drag/pinch into the committed transform.
    pub fn commit_gesture(&mut self, id: ElementId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.elements[index].transform_mut().flatten();
        true
    }

    /// Drop an element's in-flight gesture and restore its committed transform.
    pub fn cancel_gesture(&mut self, id: ElementId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.elements[index].transform_mut().discard_pending();
        if let Some(gesture) = self.gestures.get_mut(&id) {
            gesture.reset();
        }
        true
    }

    /// Drop every in-flight gesture.
    pub fn cancel_all_gestures(&mut self) {
        for element in &mut self.elements {
            element.transform_mut().discard_pending();
        }
        for gesture in self.gestures.values_mut() {
            gesture.reset();
        }
    }

    /// Look up an element.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&CanvasElement> {
        self.elements.iter().find(|e| e.id() == id)
    }

    /// Whether an element with this id exists.
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.index_of(id).is_some()
    }

    /// Current position of an element, including any drag in progress.
    #[must_use]
    pub fn position(&self, id: ElementId) -> Option<Vec2> {
        self.get(id).map(|e| e.transform().effective_position())
    }

    /// Current scale of an element, including any pinch in progress.
    #[must_use]
    pub fn scale(&self, id: ElementId) -> Option<f32> {
        self.get(id).map(|e| e.transform().effective_scale())
    }

    /// The gesture classifier paired with an element.
    #[must_use]
    pub fn gesture(&self, id: ElementId) -> Option<&GestureClassifier> {
        self.gestures.get(&id)
    }

    /// All elements in draw order.
    pub fn elements(&self) -> impl Iterator<Item = &CanvasElement> {
        self.elements.iter()
    }

    /// Elements that are currently drawn.
    pub fn visible_elements(&self) -> impl Iterator<Item = &CanvasElement> {
        self.elements.iter().filter(|e| e.is_visible())
    }

    /// Fixed elements that have been hidden.
    #[must_use]
    pub fn hidden_kinds(&self) -> Vec<FixedKind> {
        self.elements
            .iter()
            .filter_map(|e| match e {
                CanvasElement::Fixed(fixed) if !fixed.visible => Some(fixed.kind),
                _ => None,
            })
            .collect()
    }

    /// Number of user-added text elements.
    #[must_use]
    pub fn custom_count(&self) -> usize {
        self.elements
            .iter()
            .filter(|e| matches!(e, CanvasElement::Custom(_)))
            .count()
    }

    /// Total number of elements, hidden ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the registry has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
