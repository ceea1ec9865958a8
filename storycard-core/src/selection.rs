//! Single-selection tracking across fixed and custom elements.

use serde::{Deserialize, Serialize};

use crate::element::ElementId;

/// At most one selected element, ever.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionController {
    selected: Option<ElementId>,
}

impl SelectionController {
    /// Nothing selected.
    #[must_use]
    pub const fn new() -> Self {
        Self { selected: None }
    }

    /// The selected element, if any.
    #[must_use]
    pub const fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    /// Whether `id` is the selected element.
    #[must_use]
    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selected == Some(id)
    }

    /// Select `id`, replacing any previous selection.
    pub fn select(&mut self, id: ElementId) {
        self.selected = Some(id);
    }

    /// Clear the selection. Returns the element that was selected.
    pub fn deselect(&mut self) -> Option<ElementId> {
        self.selected.take()
    }

    /// Tap toggles: the selected element deselects, any other becomes selected.
    pub fn on_tap(&mut self, id: ElementId) {
        if self.is_selected(id) {
            self.selected = None;
        } else {
            self.selected = Some(id);
        }
    }

    /// Clear the selection only if it points at `id`.
    pub fn forget(&mut self, id: ElementId) {
        if self.is_selected(id) {
            self.selected = None;
        }
    }
}
