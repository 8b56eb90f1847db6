#![allow(dead_code)]

//! Drag-and-drop and selection state for the page designer.
//!
//! Mouse and touch feed the same `PointerSession`:
//! `Idle → Dragging { source, input } → Dropped(command) | Cancelled`.
//! The session never touches the photobook. A drop yields an `EditCommand` that the
//! caller applies; anything else leaves the model alone.

use serde::{Deserialize, Serialize};

use crate::layout::editor::{EditCommand, PhotobookEditor};
use crate::layout::error::LayoutError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotRef {
    pub page: usize,
    pub slot: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "from", rename_all = "snake_case")]
pub enum DragSource {
    Pool { photo_id: String },
    Slot { at: SlotRef },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PointerState {
    #[default]
    Idle,
    Dragging {
        source: DragSource,
        input: PointerKind,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DropResult {
    /// Gesture completed on a valid target.
    Dropped(EditCommand),
    /// Gesture ended without an effect.
    Cancelled,
    /// Event did not belong to the active gesture.
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct PointerSession {
    state: PointerState,
}

impl PointerSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PointerState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, PointerState::Dragging { .. })
    }

    /// Starts a drag. Returns false (and changes nothing) if one is already active.
    pub fn press(&mut self, input: PointerKind, source: DragSource) -> bool {
        if self.is_dragging() {
            return false;
        }
        self.state = PointerState::Dragging { source, input };
        true
    }

    /// Ends the drag over `target` (`None` = outside every slot).
    pub fn release(&mut self, input: PointerKind, target: Option<SlotRef>) -> DropResult {
        let source = match &self.state {
            PointerState::Dragging { source, input: owner } if *owner == input => source.clone(),
            _ => return DropResult::Ignored,
        };
        self.state = PointerState::Idle;

        let Some(target) = target else {
            return DropResult::Cancelled;
        };

        match source {
            DragSource::Pool { photo_id } => DropResult::Dropped(EditCommand::AssignPhoto {
                page: target.page,
                slot: target.slot,
                photo_id,
            }),
            DragSource::Slot { at } if at == target || at.page != target.page => {
                DropResult::Cancelled
            }
            DragSource::Slot { at } => DropResult::Dropped(EditCommand::SwapPhotos {
                page: at.page,
                slot_a: at.slot,
                slot_b: target.slot,
            }),
        }
    }

    /// Abandons the active drag, e.g. on Escape or `touchcancel`.
    pub fn cancel(&mut self, input: PointerKind) -> DropResult {
        match &self.state {
            PointerState::Dragging { input: owner, .. } if *owner == input => {
                self.state = PointerState::Idle;
                DropResult::Cancelled
            }
            _ => DropResult::Ignored,
        }
    }
}

/// Designer UI state kept outside the editor: pointer, selection, hover and the
/// adjusting flag.
#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    pub pointer: PointerSession,
    selected: Option<SlotRef>,
    hovered: Option<SlotRef>,
    adjusting: bool,
}

impl InteractionState {
    pub fn selected(&self) -> Option<SlotRef> {
        self.selected
    }

    pub fn hovered(&self) -> Option<SlotRef> {
        self.hovered
    }

    pub fn is_adjusting(&self) -> bool {
        self.adjusting
    }

    pub fn select(&mut self, slot: SlotRef) {
        if self.selected != Some(slot) {
            self.adjusting = false;
        }
        self.selected = Some(slot);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.adjusting = false;
    }

    pub fn hover(&mut self, slot: Option<SlotRef>) {
        self.hovered = slot;
    }

    /// Enters pan/zoom mode for the selected slot. Returns false with no selection.
    pub fn begin_adjusting(&mut self, editor: &PhotobookEditor) -> Result<bool, LayoutError> {
        let Some(at) = self.selected else {
            return Ok(false);
        };
        let page = editor.page(at.page)?;
        let slot = page
            .slots
            .get(at.slot)
            .ok_or(LayoutError::SlotIndexOutOfRange {
                page: at.page,
                index: at.slot,
                capacity: page.slots.len(),
            })?;
        if slot.is_empty() {
            return Err(LayoutError::EmptySlot {
                page: at.page,
                slot: at.slot,
            });
        }
        self.adjusting = true;
        Ok(true)
    }

    pub fn end_adjusting(&mut self) {
        self.adjusting = false;
    }

    /// Drops references that no longer point at an existing slot after an edit.
    pub fn reconcile(&mut self, editor: &PhotobookEditor) {
        let exists = |r: &SlotRef| {
            editor
                .pages()
                .get(r.page)
                .is_some_and(|p| r.slot < p.slots.len())
        };
        if !self.selected.as_ref().is_some_and(exists) {
            self.clear_selection();
        }
        if !self.hovered.as_ref().is_some_and(exists) {
            self.hovered = None;
        }
    }
}
