//! Edit session: a photobook's metadata plus its editor, with save sequencing.
//!
//! Every successful mutation bumps `generation`. A save sends a snapshot tagged with
//! the generation it was taken at. When the receipt comes back it is applied only if
//! no edit happened in between; an older receipt is reported as stale and ignored, so
//! a late response can never overwrite newer local edits. A failed save touches
//! nothing and the session stays dirty.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::layout::auto_layout::{auto_layout, AutoLayoutConfig, AutoLayoutReport, TemplateTable};
use crate::layout::catalog::TemplateCatalog;
use crate::layout::editor::{EditCommand, EditOutcome, PhotobookEditor};
use crate::layout::error::LayoutError;
use crate::layout::model::{Page, PhotoItem, Photobook, PhotobookFormat, PhotobookStatus};

/// State handed to the persistence layer, tagged with its generation.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveSnapshot {
    pub generation: u64,
    pub book: Photobook,
}

/// What the persistence layer reports back for a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveReceipt {
    pub generation: u64,
    pub status: PhotobookStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveOutcome {
    Applied,
    Stale,
}

#[derive(Debug, Clone)]
pub struct EditSession {
    id: Uuid,
    gallery_id: Uuid,
    title: String,
    format: PhotobookFormat,
    notes: Option<String>,
    status: PhotobookStatus,
    catalog: Arc<TemplateCatalog>,
    gallery: Vec<PhotoItem>,
    editor: PhotobookEditor,
    generation: u64,
    saved_generation: u64,
}

impl EditSession {
    /// Opens a persisted photobook against its gallery.
    pub fn open(
        catalog: Arc<TemplateCatalog>,
        book: Photobook,
        gallery: Vec<PhotoItem>,
    ) -> Result<Self, LayoutError> {
        let editor = PhotobookEditor::restore(Arc::clone(&catalog), book.pages, gallery.clone())?;
        Ok(EditSession {
            id: book.id,
            gallery_id: book.gallery_id,
            title: book.title,
            format: book.format,
            notes: book.notes,
            status: book.status,
            catalog,
            gallery,
            editor,
            generation: 0,
            saved_generation: 0,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn editor(&self) -> &PhotobookEditor {
        &self.editor
    }

    pub fn status(&self) -> PhotobookStatus {
        self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_dirty(&self) -> bool {
        self.generation != self.saved_generation
    }

    /// Applies all commands or none. One generation step for the whole batch.
    pub fn apply_all(
        &mut self,
        commands: Vec<EditCommand>,
    ) -> Result<Vec<EditOutcome>, LayoutError> {
        if commands.is_empty() {
            return Ok(Vec::new());
        }
        let mut draft = self.editor.clone();
        let outcomes = commands
            .into_iter()
            .map(|c| draft.apply(c))
            .collect::<Result<Vec<_>, _>>()?;
        self.editor = draft;
        self.generation += 1;
        Ok(outcomes)
    }

    pub fn auto_layout(
        &mut self,
        table: &TemplateTable,
        config: &AutoLayoutConfig,
    ) -> AutoLayoutReport {
        let report = auto_layout(&mut self.editor, table, config);
        if report.pages_created > 0 {
            self.generation += 1;
        }
        report
    }

    /// Swaps in a whole page list, validated the same way as opening a book.
    pub fn replace_pages(&mut self, pages: Vec<Page>) -> Result<(), LayoutError> {
        let editor =
            PhotobookEditor::restore(Arc::clone(&self.catalog), pages, self.gallery.clone())?;
        if editor.pages() != self.editor.pages() {
            self.editor = editor;
            self.generation += 1;
        }
        Ok(())
    }

    pub fn set_details(&mut self, title: Option<String>, notes: Option<Option<String>>) {
        let mut changed = false;
        if let Some(title) = title {
            changed |= title != self.title;
            self.title = title;
        }
        if let Some(notes) = notes {
            changed |= notes != self.notes;
            self.notes = notes;
        }
        if changed {
            self.generation += 1;
        }
    }

    /// The current aggregate.
    pub fn document(&self) -> Photobook {
        Photobook {
            id: self.id,
            gallery_id: self.gallery_id,
            title: self.title.clone(),
            format: self.format,
            notes: self.notes.clone(),
            status: self.status,
            pages: self.editor.pages().to_vec(),
        }
    }

    pub fn begin_save(&self) -> SaveSnapshot {
        SaveSnapshot {
            generation: self.generation,
            book: self.document(),
        }
    }

    /// Like `begin_save`, but refuses a book without pages.
    pub fn begin_submit(&self) -> Result<SaveSnapshot, LayoutError> {
        if self.editor.page_count() == 0 {
            return Err(LayoutError::EmptyPhotobook);
        }
        Ok(self.begin_save())
    }

    pub fn complete_save(&mut self, receipt: SaveReceipt) -> SaveOutcome {
        if receipt.generation != self.generation {
            debug!(
                "photobook {}: ignoring save receipt for generation {} (current {})",
                self.id, receipt.generation, self.generation
            );
            return SaveOutcome::Stale;
        }
        self.saved_generation = receipt.generation;
        self.status = receipt.status;
        SaveOutcome::Applied
    }
}
