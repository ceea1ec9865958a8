//! Editor state for one story card editing session.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::coords::{CoordinateSpace, MenuPlacement};
use crate::element::{
    Background, CanvasElement, CardSeed, CustomId, ElementId, FixedKind, StylePatch, Vec2,
};
use crate::error::{CaptureError, CardResult};
use crate::event::TouchEvent;
use crate::gesture::GestureIntent;
use crate::registry::ElementRegistry;
use crate::selection::SelectionController;
use crate::snapshot::CardSnapshot;

/// Editor decorations drawn over the card while editing.
///
/// None of this ever reaches a [`CardSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EditorChrome {
    /// Element drawn with a selection outline.
    pub selected: Option<ElementId>,
    /// Custom text with its inline editor open.
    pub editing: Option<CustomId>,
    /// Action menu (edit/delete/confirm) for the selected element.
    pub menu: Option<MenuPlacement>,
    /// Whether the background tap-to-add overlay is active.
    pub tap_overlay: bool,
}

/// Selection and inline edit saved across a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRestore {
    selected: Option<ElementId>,
    editing: Option<CustomId>,
}

/// The complete editor state.
///
/// Created when the editor opens and dropped when it closes; never persisted.
/// While a capture runs, every input method is a silent no-op.
#[derive(Debug, Clone)]
pub struct EditorState {
    registry: ElementRegistry,
    selection: SelectionController,
    coords: CoordinateSpace,
    background: Background,
    editing: Option<CustomId>,
    capturing: bool,
}

impl EditorState {
    /// Open an editor with the given configuration and seed values.
    #[must_use]
    pub fn new(config: &EditorConfig, seed: CardSeed) -> Self {
        Self {
            registry: ElementRegistry::new(config, &seed),
            selection: SelectionController::new(),
            coords: CoordinateSpace::from(config),
            background: seed.background,
            editing: None,
            capturing: false,
        }
    }

    /// Validate `config`, then open an editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn open(config: &EditorConfig, seed: CardSeed) -> CardResult<Self> {
        config.validate()?;
        tracing::info!(
            "Opening story card editor {}x{}",
            config.canvas_width,
            config.canvas_height
        );
        Ok(Self::new(config, seed))
    }

    /// The element registry.
    #[must_use]
    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    /// The canvas coordinate space.
    #[must_use]
    pub fn coords(&self) -> &CoordinateSpace {
        &self.coords
    }

    /// The selected element, if any.
    #[must_use]
    pub fn selected(&self) -> Option<ElementId> {
        self.selection.selected()
    }

    /// The custom text being edited inline, if any.
    #[must_use]
    pub fn editing(&self) -> Option<CustomId> {
        self.editing
    }

    /// Whether a capture is running.
    #[must_use]
    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    /// Route a touch event to an element.
    ///
    /// Taps toggle selection. Everything else only moves or scales the element.
    pub fn handle_touch(&mut self, id: ElementId, event: &TouchEvent) -> Option<GestureIntent> {
        if self.capturing {
            return None;
        }
        let intent = self.registry.handle_touch(id, event)?;
        if intent == GestureIntent::Tap {
            self.on_tap(id);
        }
        Some(intent)
    }

    /// Select an element. Unknown or hidden elements are ignored.
    pub fn select(&mut self, id: ElementId) {
        if self.capturing || !self.is_selectable(id) {
            return;
        }
        self.close_edit_unless(id);
        self.selection.select(id);
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        if self.capturing {
            return;
        }
        self.selection.deselect();
    }

    /// Toggle selection of a tapped element.
    pub fn on_tap(&mut self, id: ElementId) {
        if self.capturing || !self.is_selectable(id) {
            return;
        }
        self.close_edit_unless(id);
        self.selection.on_tap(id);
    }

    /// Tap on empty canvas: clear the selection and add a text element there.
    ///
    /// The new element opens for inline editing straight away and is left
    /// unselected. Returns `None` while capturing.
    pub fn on_background_tap(&mut self, screen_position: Vec2) -> Option<CustomId> {
        if self.capturing {
            return None;
        }
        self.selection.deselect();
        let local = self.coords.to_local(screen_position);
        let id = self.registry.add_custom_text(local);
        self.editing = Some(id);
        Some(id)
    }

    /// Add a custom text at a canvas-local position.
    pub fn add_custom_text(&mut self, local_position: Vec2) -> Option<CustomId> {
        if self.capturing {
            return None;
        }
        Some(self.registry.add_custom_text(local_position))
    }

    /// Merge a style update into an element.
    pub fn update_style(&mut self, id: ElementId, patch: &StylePatch) -> bool {
        !self.capturing && self.registry.update_style(id, patch)
    }

    /// Set a custom element's text.
    pub fn update_content(&mut self, id: CustomId, text: impl Into<String>) -> bool {
        !self.capturing && self.registry.update_content(id, text)
    }

    /// Delete a custom element. Unknown ids and fixed elements are ignored.
    pub fn remove(&mut self, id: ElementId) -> bool {
        if self.capturing || !self.registry.remove(id) {
            return false;
        }
        self.selection.forget(id);
        if let ElementId::Custom(custom) = id {
            if self.editing == Some(custom) {
                self.editing = None;
            }
        }
        true
    }

    /// Show or hide a fixed element. Hiding the selected element deselects it.
    pub fn set_visible(&mut self, kind: FixedKind, visible: bool) -> bool {
        if self.capturing {
            return false;
        }
        let changed = self.registry.set_visible(kind, visible);
        if !visible {
            self.selection.forget(kind.into());
        }
        changed
    }

    /// Show every hidden fixed element again. Returns how many came back.
    pub fn show_all(&mut self) -> usize {
        if self.capturing {
            return 0;
        }
        self.registry
            .hidden_kinds()
            .into_iter()
            .filter(|&kind| self.registry.set_visible(kind, true))
            .count()
    }

    /// Delete the selected element: custom text is removed, fixed elements hidden.
    pub fn delete_selected(&mut self) -> bool {
        match self.selected() {
            Some(ElementId::Fixed(kind)) => self.set_visible(kind, false),
            Some(id @ ElementId::Custom(_)) => self.remove(id),
            None => false,
        }
    }

    /// Open the inline text editor for a custom element and select it.
    pub fn begin_edit(&mut self, id: CustomId) -> bool {
        if self.capturing || !self.registry.contains(id.into()) {
            return false;
        }
        self.editing = Some(id);
        self.selection.select(id.into());
        true
    }

    /// Close the inline text editor.
    pub fn end_edit(&mut self) -> Option<CustomId> {
        self.editing.take()
    }

    /// Where to open the action menu for an element.
    #[must_use]
    pub fn menu_placement(&self, id: ElementId) -> Option<MenuPlacement> {
        self.registry
            .get(id)
            .map(|element| self.coords.menu_placement(element))
    }

    /// Decorations the host should draw over the card right now.
    #[must_use]
    pub fn chrome(&self) -> EditorChrome {
        let selected = self.selection.selected();
        EditorChrome {
            selected,
            editing: self.editing,
            menu: selected.and_then(|id| self.menu_placement(id)),
            tap_overlay: !self.capturing,
        }
    }

    /// Render-ready view of the visible elements.
    #[must_use]
    pub fn snapshot(&self) -> CardSnapshot {
        CardSnapshot::new(
            self.coords.width(),
            self.coords.height(),
            self.background.clone(),
            self.registry.elements(),
        )
    }

    /// Freeze input and strip chrome for a capture.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::AlreadyCapturing`] if a capture is running.
    pub fn begin_capture(&mut self) -> Result<CaptureRestore, CaptureError> {
        if self.capturing {
            return Err(CaptureError::AlreadyCapturing);
        }
        self.capturing = true;
        self.registry.cancel_all_gestures();
        Ok(CaptureRestore {
            selected: self.selection.deselect(),
            editing: self.editing.take(),
        })
    }

    /// Restore the selection and inline edit saved by [`Self::begin_capture`].
    pub fn finish_capture(&mut self, restore: CaptureRestore) {
        if let Some(id) = restore.selected.filter(|&id| self.is_selectable(id)) {
            self.selection.select(id);
        }
        self.editing = restore
            .editing
            .filter(|&id| self.registry.contains(id.into()));
        self.capturing = false;
    }

    fn is_selectable(&self, id: ElementId) -> bool {
        self.registry.get(id).is_some_and(CanvasElement::is_visible)
    }

    fn close_edit_unless(&mut self, id: ElementId) {
        if self.editing.is_some_and(|editing| ElementId::Custom(editing) != id) {
            self.editing = None;
        }
    }
}

/// Shared handle to an [`EditorState`].
///
/// The UI thread and the capture pipeline hold clones of the same handle.
/// Locks are only taken inside the closures, never across an await.
#[derive(Debug, Clone)]
pub struct EditorSession {
    state: Arc<RwLock<EditorState>>,
}

impl EditorSession {
    /// Wrap an editor state.
    #[must_use]
    pub fn new(state: EditorState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Read the state.
    pub fn read<T>(&self, f: impl FnOnce(&EditorState) -> T) -> T {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Mutate the state.
    pub fn write<T>(&self, f: impl FnOnce(&mut EditorState) -> T) -> T {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }
}
