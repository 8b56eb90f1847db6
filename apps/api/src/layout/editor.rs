//! Photobook editor: the ordered page list, the unplaced photo pool, and every edit
//! that moves photos between them.
//!
//! # Exclusivity
//! Every gallery photo lives in exactly one place: the pool, or one slot of one page.
//! Each operation validates its arguments before touching state, so a failed call
//! leaves pages and pool exactly as they were.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::layout::catalog::{FitMode, TemplateCatalog, DEFAULT_TEMPLATE};
use crate::layout::error::LayoutError;
use crate::layout::model::{clamp_zoom, empty_slots, ensure_finite, Page, PhotoItem, Placement};

// ────────────────────────────────────────────────────────────────────────────
// Commands
// ────────────────────────────────────────────────────────────────────────────

/// Partial update of a slot's presentation. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotAdjustment {
    #[serde(default)]
    pub rotation: Option<f32>,
    #[serde(default)]
    pub zoom: Option<f32>,
    #[serde(default)]
    pub pan_x: Option<f32>,
    #[serde(default)]
    pub pan_y: Option<f32>,
    #[serde(default)]
    pub fit: Option<FitMode>,
    /// An empty string clears the caption.
    #[serde(default)]
    pub caption: Option<String>,
}

impl SlotAdjustment {
    /// True if any field other than the caption is set.
    pub fn is_visual(&self) -> bool {
        self.rotation.is_some()
            || self.zoom.is_some()
            || self.pan_x.is_some()
            || self.pan_y.is_some()
            || self.fit.is_some()
    }
}

/// One editor operation in serializable form. Page and slot indices are 0-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditCommand {
    AddPage {
        #[serde(default)]
        template_id: Option<String>,
    },
    InsertPage {
        index: usize,
        #[serde(default)]
        template_id: Option<String>,
    },
    DeletePage {
        page: usize,
    },
    MovePage {
        from: usize,
        to: usize,
    },
    ChangeTemplate {
        page: usize,
        template_id: String,
    },
    AssignPhoto {
        page: usize,
        slot: usize,
        photo_id: String,
    },
    RemovePhoto {
        page: usize,
        slot: usize,
    },
    SwapPhotos {
        page: usize,
        slot_a: usize,
        slot_b: usize,
    },
    Adjust {
        page: usize,
        slot: usize,
        adjustment: SlotAdjustment,
    },
    ResetAdjustments {
        page: usize,
        slot: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EditOutcome {
    PageCreated { index: usize },
    Applied,
}

// ────────────────────────────────────────────────────────────────────────────
// Editor
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PhotobookEditor {
    catalog: Arc<TemplateCatalog>,
    pages: Vec<Page>,
    pool: Vec<PhotoItem>,
}

impl PhotobookEditor {
    /// An empty photobook with the whole gallery in the pool.
    pub fn new(catalog: Arc<TemplateCatalog>, gallery: Vec<PhotoItem>) -> Self {
        let mut seen = HashSet::new();
        let pool = gallery
            .into_iter()
            .filter(|p| seen.insert(p.id.clone()))
            .collect();
        PhotobookEditor {
            catalog,
            pages: Vec::new(),
            pool,
        }
    }

    /// Rebuilds an editor from persisted pages.
    ///
    /// Slots are re-derived from each page's template; stored slot state is copied
    /// over by position. Placed photos must belong to the gallery and are replaced by
    /// the gallery's own record. The pool becomes the gallery minus every assigned
    /// photo, in gallery order.
    pub fn restore(
        catalog: Arc<TemplateCatalog>,
        pages: Vec<Page>,
        gallery: Vec<PhotoItem>,
    ) -> Result<Self, LayoutError> {
        let known: HashMap<&str, &PhotoItem> =
            gallery.iter().map(|p| (p.id.as_str(), p)).collect();
        let mut assigned: HashSet<String> = HashSet::new();
        let mut restored = Vec::with_capacity(pages.len());

        for stored in pages {
            let template = catalog.get(stored.template_id.as_str())?;
            let capacity = template.capacity();

            let overflow = stored.slots.iter().skip(capacity).any(|s| !s.is_empty());
            if overflow {
                return Err(LayoutError::SlotCapacityExceeded {
                    template: template.id.to_string(),
                    capacity,
                    requested: stored.slots.len(),
                });
            }

            let mut slots = empty_slots(template);
            for (slot, old) in slots.iter_mut().zip(stored.slots) {
                if let Some(mut placement) = old.placement {
                    let id = placement.photo.id.as_str();
                    let Some(&photo) = known.get(id) else {
                        return Err(LayoutError::PhotoNotAvailable(id.to_string()));
                    };
                    if !assigned.insert(photo.id.clone()) {
                        return Err(LayoutError::DuplicatePhoto(photo.id.clone()));
                    }
                    placement.check_finite()?;
                    placement.photo = photo.clone();
                    placement.zoom = clamp_zoom(placement.zoom);
                    slot.placement = Some(placement);
                }
                slot.fit = old.fit;
                slot.caption = old.caption;
            }

            restored.push(Page {
                page_number: 0,
                template_id: template.id.clone(),
                slots,
            });
        }

        let mut editor = PhotobookEditor::new(catalog, gallery);
        editor.pool.retain(|p| !assigned.contains(&p.id));
        editor.pages = restored;
        editor.renumber();
        Ok(editor)
    }

    // ── accessors ───────────────────────────────────────────────────────────

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Result<&Page, LayoutError> {
        self.check_page(index)?;
        Ok(&self.pages[index])
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Photos not assigned to any slot, in pool order.
    pub fn pool(&self) -> &[PhotoItem] {
        &self.pool
    }

    // ── structural operations ───────────────────────────────────────────────

    /// Appends an empty page and returns its index.
    pub fn add_page(&mut self, template_id: Option<&str>) -> Result<usize, LayoutError> {
        let index = self.pages.len();
        self.insert_page(index, template_id)
    }

    /// Inserts an empty page before `index` (`index == page_count` appends).
    pub fn insert_page(
        &mut self,
        index: usize,
        template_id: Option<&str>,
    ) -> Result<usize, LayoutError> {
        if index > self.pages.len() {
            return Err(LayoutError::PageIndexOutOfRange {
                index,
                len: self.pages.len(),
            });
        }
        let template = self.catalog.get(template_id.unwrap_or(DEFAULT_TEMPLATE))?;
        let page = Page::with_template(template);
        self.pages.insert(index, page);
        self.renumber();
        Ok(index)
    }

    /// Removes a page, returning its photos to the pool.
    pub fn delete_page(&mut self, index: usize) -> Result<(), LayoutError> {
        self.check_page(index)?;
        let page = self.pages.remove(index);
        self.pool.extend(
            page.slots
                .into_iter()
                .filter_map(|s| s.placement.map(|p| p.photo)),
        );
        self.renumber();
        Ok(())
    }

    pub fn move_page(&mut self, from: usize, to: usize) -> Result<(), LayoutError> {
        self.check_page(from)?;
        self.check_page(to)?;
        if from != to {
            let page = self.pages.remove(from);
            self.pages.insert(to, page);
            self.renumber();
        }
        Ok(())
    }

    /// Switches a page to another template.
    ///
    /// Assigned photos keep their slot order and fill the new template from the first
    /// slot. When the new template is smaller, the head of that order is kept and the
    /// tail goes back to the pool. Adjustments and captions reset with the new slots.
    pub fn change_template(&mut self, index: usize, template_id: &str) -> Result<(), LayoutError> {
        self.check_page(index)?;
        let template = self.catalog.get(template_id)?;
        let page = &mut self.pages[index];
        if page.template_id == template.id {
            return Ok(());
        }

        let mut photos = std::mem::take(&mut page.slots)
            .into_iter()
            .filter_map(|s| s.placement.map(|p| p.photo));

        let mut slots = empty_slots(template);
        for slot in slots.iter_mut() {
            match photos.next() {
                Some(photo) => slot.placement = Some(Placement::new(photo)),
                None => break,
            }
        }
        let overflow: Vec<PhotoItem> = photos.collect();

        page.slots = slots;
        page.template_id = template.id.clone();
        self.pool.extend(overflow);
        Ok(())
    }

    // ── slot operations ─────────────────────────────────────────────────────

    /// Moves a pool photo into a slot. A photo already in the slot goes back to the pool.
    pub fn assign_photo(
        &mut self,
        page: usize,
        slot: usize,
        photo_id: &str,
    ) -> Result<(), LayoutError> {
        self.check_slot(page, slot)?;
        let pos = self
            .pool
            .iter()
            .position(|p| p.id == photo_id)
            .ok_or_else(|| LayoutError::PhotoNotAvailable(photo_id.to_string()))?;

        let photo = self.pool.remove(pos);
        let target = &mut self.pages[page].slots[slot];
        let displaced = target.placement.replace(Placement::new(photo));
        if let Some(old) = displaced {
            self.pool.push(old.photo);
        }
        Ok(())
    }

    /// Empties a slot. Already-empty slots are left alone.
    pub fn remove_photo(&mut self, page: usize, slot: usize) -> Result<(), LayoutError> {
        self.check_slot(page, slot)?;
        if let Some(old) = self.pages[page].slots[slot].placement.take() {
            self.pool.push(old.photo);
        }
        Ok(())
    }

    /// Exchanges two slots' placements on one page.
    ///
    /// With exactly one side occupied this is a move: the photo lands in the empty slot
    /// with default adjustments.
    pub fn swap_photos(
        &mut self,
        page: usize,
        slot_a: usize,
        slot_b: usize,
    ) -> Result<(), LayoutError> {
        self.check_slot(page, slot_a)?;
        self.check_slot(page, slot_b)?;
        if slot_a == slot_b {
            return Ok(());
        }

        let slots = &mut self.pages[page].slots;
        let a = slots[slot_a].placement.take();
        let b = slots[slot_b].placement.take();
        match (a, b) {
            (Some(x), Some(y)) => {
                slots[slot_a].placement = Some(y);
                slots[slot_b].placement = Some(x);
            }
            (Some(x), None) => slots[slot_b].placement = Some(Placement::new(x.photo)),
            (None, Some(y)) => slots[slot_a].placement = Some(Placement::new(y.photo)),
            (None, None) => {}
        }
        Ok(())
    }

    /// Applies a partial presentation update. Zoom is clamped; everything else is
    /// stored as given.
    pub fn adjust(
        &mut self,
        page: usize,
        slot: usize,
        adjustment: SlotAdjustment,
    ) -> Result<(), LayoutError> {
        self.check_slot(page, slot)?;
        let target = &mut self.pages[page].slots[slot];

        if adjustment.is_visual() && target.is_empty() {
            return Err(LayoutError::EmptySlot { page, slot });
        }
        let rotation = adjustment.rotation.map(|v| ensure_finite("rotation", v)).transpose()?;
        let pan_x = adjustment.pan_x.map(|v| ensure_finite("pan_x", v)).transpose()?;
        let pan_y = adjustment.pan_y.map(|v| ensure_finite("pan_y", v)).transpose()?;

        if let Some(caption) = adjustment.caption {
            target.caption = if caption.trim().is_empty() {
                None
            } else {
                Some(caption)
            };
        }
        if let Some(fit) = adjustment.fit {
            target.fit = fit;
        }
        if let Some(p) = target.placement.as_mut() {
            if let Some(rotation) = rotation {
                p.rotation = rotation;
            }
            if let Some(zoom) = adjustment.zoom {
                p.zoom = clamp_zoom(zoom);
            }
            if let Some(x) = pan_x {
                p.pan_x = x;
            }
            if let Some(y) = pan_y {
                p.pan_y = y;
            }
        }
        Ok(())
    }

    pub fn reset_adjustments(&mut self, page: usize, slot: usize) -> Result<(), LayoutError> {
        self.check_slot(page, slot)?;
        match self.pages[page].slots[slot].placement.as_mut() {
            Some(p) => {
                p.reset();
                Ok(())
            }
            None => Err(LayoutError::EmptySlot { page, slot }),
        }
    }

    /// Dispatches a serialized command to the matching operation.
    pub fn apply(&mut self, command: EditCommand) -> Result<EditOutcome, LayoutError> {
        match command {
            EditCommand::AddPage { template_id } => self
                .add_page(template_id.as_deref())
                .map(|index| EditOutcome::PageCreated { index }),
            EditCommand::InsertPage { index, template_id } => self
                .insert_page(index, template_id.as_deref())
                .map(|index| EditOutcome::PageCreated { index }),
            EditCommand::DeletePage { page } => self.delete_page(page).map(|_| EditOutcome::Applied),
            EditCommand::MovePage { from, to } => {
                self.move_page(from, to).map(|_| EditOutcome::Applied)
            }
            EditCommand::ChangeTemplate { page, template_id } => self
                .change_template(page, &template_id)
                .map(|_| EditOutcome::Applied),
            EditCommand::AssignPhoto {
                page,
                slot,
                photo_id,
            } => self
                .assign_photo(page, slot, &photo_id)
                .map(|_| EditOutcome::Applied),
            EditCommand::RemovePhoto { page, slot } => {
                self.remove_photo(page, slot).map(|_| EditOutcome::Applied)
            }
            EditCommand::SwapPhotos {
                page,
                slot_a,
                slot_b,
            } => self
                .swap_photos(page, slot_a, slot_b)
                .map(|_| EditOutcome::Applied),
            EditCommand::Adjust {
                page,
                slot,
                adjustment,
            } => self
                .adjust(page, slot, adjustment)
                .map(|_| EditOutcome::Applied),
            EditCommand::ResetAdjustments { page, slot } => self
                .reset_adjustments(page, slot)
                .map(|_| EditOutcome::Applied),
        }
    }

    // ── crate-internal hooks for auto-layout ────────────────────────────────

    /// Drops the given photos from the pool, keeping the rest in order.
    pub(crate) fn remove_from_pool(&mut self, ids: &HashSet<String>) {
        self.pool.retain(|p| !ids.contains(&p.id));
    }

    /// Appends a fully built page and renumbers.
    pub(crate) fn push_page(&mut self, page: Page) {
        self.pages.push(page);
        self.renumber();
    }

    // ── helpers ─────────────────────────────────────────────────────────────

    fn check_page(&self, index: usize) -> Result<(), LayoutError> {
        if index < self.pages.len() {
            Ok(())
        } else {
            Err(LayoutError::PageIndexOutOfRange {
                index,
                len: self.pages.len(),
            })
        }
    }

    fn check_slot(&self, page: usize, slot: usize) -> Result<(), LayoutError> {
        self.check_page(page)?;
        let capacity = self.pages[page].slots.len();
        if slot < capacity {
            Ok(())
        } else {
            Err(LayoutError::SlotIndexOutOfRange {
                page,
                index: slot,
                capacity,
            })
        }
    }

    fn renumber(&mut self) {
        for (i, page) in self.pages.iter_mut().enumerate() {
            page.page_number = i as u32 + 1;
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
