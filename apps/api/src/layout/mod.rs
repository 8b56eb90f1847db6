// Photobook Layout Engine
// Implements: template catalog, page/slot state, auto-layout, drag-and-drop sessions.
// Pure and synchronous: no I/O here. Persistence lives in crate::photobook.

pub mod auto_layout;
pub mod catalog;
pub mod editor;
pub mod error;
pub mod model;
pub mod pointer;
pub mod session;

// Re-export the public API consumed by handlers and the store.
pub use auto_layout::{AutoLayoutConfig, AutoLayoutReport, Orientation, TemplateTable};
pub use catalog::{Template, TemplateCatalog};
pub use editor::{EditCommand, EditOutcome};
pub use error::LayoutError;
pub use model::{Page, PhotoItem, Photobook, PhotobookFormat, PhotobookStatus};
pub use session::{EditSession, SaveOutcome, SaveReceipt};
