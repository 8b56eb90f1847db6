use thiserror::Error;

/// Errors reported by the layout engine.
///
/// Every operation either completes or returns one of these with the photobook
/// left exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Page index {index} out of range (page count {len})")]
    PageIndexOutOfRange { index: usize, len: usize },

    #[error("Slot index {index} out of range on page {page} (template capacity {capacity})")]
    SlotIndexOutOfRange {
        page: usize,
        index: usize,
        capacity: usize,
    },

    #[error("Template {template} holds {capacity} photos, {requested} were given")]
    SlotCapacityExceeded {
        template: String,
        capacity: usize,
        requested: usize,
    },

    #[error("Slot {slot} on page {page} has no photo")]
    EmptySlot { page: usize, slot: usize },

    #[error("Photo {0} is not in the available pool")]
    PhotoNotAvailable(String),

    #[error("Photo {0} is assigned to more than one slot")]
    DuplicatePhoto(String),

    #[error("{field} must be a finite number")]
    NonFiniteValue { field: &'static str },

    #[error("A photobook needs at least one page")]
    EmptyPhotobook,
}
