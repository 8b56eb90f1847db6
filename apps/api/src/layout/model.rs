//! Photobook data model: photos, slots, pages and the aggregate document.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::layout::catalog::{FitMode, Template, TemplateId};
use crate::layout::error::LayoutError;

pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 3.0;
pub const DEFAULT_ZOOM: f32 = 1.0;

// ────────────────────────────────────────────────────────────────────────────
// Photos
// ────────────────────────────────────────────────────────────────────────────

/// Reference to an uploaded gallery image. The engine never owns the asset itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoItem {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub title: Option<String>,
}

impl PhotoItem {
    /// `width / height`, or 1.0 when either dimension is unknown or zero.
    pub fn aspect_ratio(&self) -> f64 {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => w as f64 / h as f64,
            _ => 1.0,
        }
    }
}

/// A photo placed in a slot together with its presentation adjustments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub photo: PhotoItem,
    /// Degrees, stored as given.
    pub rotation: f32,
    /// Always within `MIN_ZOOM..=MAX_ZOOM`.
    pub zoom: f32,
    pub pan_x: f32,
    pub pan_y: f32,
}

impl Placement {
    /// Places `photo` with default adjustments.
    pub fn new(photo: PhotoItem) -> Self {
        Placement {
            photo,
            rotation: 0.0,
            zoom: DEFAULT_ZOOM,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.rotation = 0.0;
        self.zoom = DEFAULT_ZOOM;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
    }

    /// Rotation and pan must be finite; JSON has no encoding for infinity or NaN.
    pub fn check_finite(&self) -> Result<(), LayoutError> {
        ensure_finite("rotation", self.rotation)?;
        ensure_finite("pan_x", self.pan_x)?;
        ensure_finite("pan_y", self.pan_y)?;
        Ok(())
    }
}

pub fn ensure_finite(field: &'static str, value: f32) -> Result<f32, LayoutError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(LayoutError::NonFiniteValue { field })
    }
}

pub fn clamp_zoom(zoom: f32) -> f32 {
    if zoom.is_nan() {
        return DEFAULT_ZOOM;
    }
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

// ────────────────────────────────────────────────────────────────────────────
// Slots and pages
// ────────────────────────────────────────────────────────────────────────────

/// One photo-holding region of one page. Empty when `placement` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoSlot {
    pub slot_id: String,
    pub fit: FitMode,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub placement: Option<Placement>,
}

impl PhotoSlot {
    pub fn is_empty(&self) -> bool {
        self.placement.is_none()
    }

    pub fn photo(&self) -> Option<&PhotoItem> {
        self.placement.as_ref().map(|p| &p.photo)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based, contiguous across the book.
    pub page_number: u32,
    pub template_id: TemplateId,
    pub slots: Vec<PhotoSlot>,
}

impl Page {
    /// A page with one empty slot per template descriptor. Numbered by the editor.
    pub fn with_template(template: &Template) -> Self {
        Page {
            page_number: 0,
            template_id: template.id.clone(),
            slots: empty_slots(template),
        }
    }

    /// Photos on this page in slot order.
    pub fn photos(&self) -> impl Iterator<Item = &PhotoItem> {
        self.slots.iter().filter_map(PhotoSlot::photo)
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(|s| !s.is_empty())
    }
}

pub(crate) fn empty_slots(template: &Template) -> Vec<PhotoSlot> {
    template
        .slots
        .iter()
        .map(|d| PhotoSlot {
            slot_id: d.id.clone(),
            fit: d.fit,
            caption: None,
            placement: None,
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Photobook aggregate
// ────────────────────────────────────────────────────────────────────────────

/// Printed format. Fixes the page aspect ratio used for rendering only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PhotobookFormat {
    #[serde(rename = "20x20")]
    Square20,
    #[default]
    #[serde(rename = "20x30")]
    Portrait20x30,
    #[serde(rename = "30x20")]
    Landscape30x20,
    #[serde(rename = "30x30")]
    Square30,
}

impl PhotobookFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotobookFormat::Square20 => "20x20",
            PhotobookFormat::Portrait20x30 => "20x30",
            PhotobookFormat::Landscape30x20 => "30x20",
            PhotobookFormat::Square30 => "30x30",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "20x20" => Some(PhotobookFormat::Square20),
            "20x30" => Some(PhotobookFormat::Portrait20x30),
            "30x20" => Some(PhotobookFormat::Landscape30x20),
            "30x30" => Some(PhotobookFormat::Square30),
            _ => None,
        }
    }

    /// Page `width / height` in centimetres.
    pub fn page_aspect_ratio(&self) -> f64 {
        let (w, h) = match self {
            PhotobookFormat::Square20 => (20.0, 20.0),
            PhotobookFormat::Portrait20x30 => (20.0, 30.0),
            PhotobookFormat::Landscape30x20 => (30.0, 20.0),
            PhotobookFormat::Square30 => (30.0, 30.0),
        };
        w / h
    }
}

/// Review lifecycle: draft → submitted → approved | rejected → printing → completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotobookStatus {
    #[default]
    Draft,
    Submitted,
    Approved,
    Rejected,
    Printing,
    Completed,
}

impl PhotobookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotobookStatus::Draft => "draft",
            PhotobookStatus::Submitted => "submitted",
            PhotobookStatus::Approved => "approved",
            PhotobookStatus::Rejected => "rejected",
            PhotobookStatus::Printing => "printing",
            PhotobookStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(PhotobookStatus::Draft),
            "submitted" => Some(PhotobookStatus::Submitted),
            "approved" => Some(PhotobookStatus::Approved),
            "rejected" => Some(PhotobookStatus::Rejected),
            "printing" => Some(PhotobookStatus::Printing),
            "completed" => Some(PhotobookStatus::Completed),
            _ => None,
        }
    }

    /// Layout may be changed only before review or after a rejection.
    pub fn is_editable(&self) -> bool {
        matches!(self, PhotobookStatus::Draft | PhotobookStatus::Rejected)
    }
}

/// The photobook aggregate as exchanged with the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photobook {
    pub id: Uuid,
    pub gallery_id: Uuid,
    pub title: String,
    pub format: PhotobookFormat,
    pub notes: Option<String>,
    pub status: PhotobookStatus,
    pub pages: Vec<Page>,
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
