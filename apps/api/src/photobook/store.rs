//! Photobook persistence — pluggable, trait-based store for the photobook aggregate.
//!
//! Default: `PgPhotobookStore` (PostgreSQL, pages as JSONB).
//! Alternative: `MemoryPhotobookStore` (process-local, for dev runs and tests).
//!
//! `AppState` holds an `Arc<dyn PhotobookStore>`, chosen at startup via config.
//! Concurrent editors of one photobook are not coordinated: the last save wins.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::{LayoutError, Page, PhotoItem, Photobook, PhotobookFormat, PhotobookStatus};
use crate::models::photobook::{GalleryPhotoRow, PhotobookRow};

// ────────────────────────────────────────────────────────────────────────────
// Inputs
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPhotobook {
    pub title: String,
    #[serde(default)]
    pub format: PhotobookFormat,
    #[serde(default)]
    pub notes: Option<String>,
}

/// The editable part of a photobook, as written by save and submit.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotobookUpdate {
    pub title: String,
    pub notes: Option<String>,
    pub pages: Vec<Page>,
}

impl From<&Photobook> for PhotobookUpdate {
    fn from(book: &Photobook) -> Self {
        PhotobookUpdate {
            title: book.title.clone(),
            notes: book.notes.clone(),
            pages: book.pages.clone(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Storage for photobooks and the gallery photo lists they draw from.
///
/// Save and submit are accepted only while the book is `draft` or `rejected`;
/// otherwise they fail with `AppError::Conflict`. Submit also refuses a book
/// without pages and moves it to `submitted`.
#[async_trait]
pub trait PhotobookStore: Send + Sync {
    /// Creates the draft photobook for a gallery. One photobook per gallery.
    async fn create(&self, gallery_id: Uuid, new: NewPhotobook) -> Result<Photobook, AppError>;

    async fn load(&self, id: Uuid) -> Result<Option<Photobook>, AppError>;

    async fn load_by_gallery(&self, gallery_id: Uuid) -> Result<Option<Photobook>, AppError>;

    /// Gallery photos in display order.
    async fn gallery_photos(&self, gallery_id: Uuid) -> Result<Vec<PhotoItem>, AppError>;

    /// Replaces a gallery's photo references.
    async fn replace_gallery_photos(
        &self,
        gallery_id: Uuid,
        photos: &[PhotoItem],
    ) -> Result<(), AppError>;

    async fn save(&self, id: Uuid, update: &PhotobookUpdate) -> Result<Photobook, AppError>;

    async fn submit(&self, id: Uuid, update: &PhotobookUpdate) -> Result<Photobook, AppError>;
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Photobook {id} not found"))
}

fn not_editable(id: Uuid, status: PhotobookStatus) -> AppError {
    AppError::Conflict(format!(
        "Photobook {id} is {} and can no longer be changed",
        status.as_str()
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// PgPhotobookStore — default implementation
// ────────────────────────────────────────────────────────────────────────────

pub struct PgPhotobookStore {
    pool: PgPool,
}

impl PgPhotobookStore {
    pub fn new(pool: PgPool) -> Self {
        PgPhotobookStore { pool }
    }

    /// Distinguishes "missing" from "locked" after a guarded UPDATE matched nothing.
    async fn explain_rejected_write(&self, id: Uuid) -> AppError {
        match self.load(id).await {
            Ok(Some(book)) => not_editable(id, book.status),
            Ok(None) => not_found(id),
            Err(e) => e,
        }
    }

    async fn write(
        &self,
        id: Uuid,
        update: &PhotobookUpdate,
        new_status: Option<PhotobookStatus>,
    ) -> Result<Photobook, AppError> {
        let pages = serde_json::to_value(&update.pages)?;
        let row = sqlx::query_as::<_, PhotobookRow>(
            r#"
            UPDATE photobooks
            SET title = $2,
                notes = $3,
                pages = $4,
                status = COALESCE($5, status),
                updated_at = NOW()
            WHERE id = $1 AND status IN ('draft', 'rejected')
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.notes)
        .bind(pages)
        .bind(new_status.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Photobook::try_from(row),
            None => Err(self.explain_rejected_write(id).await),
        }
    }
}

#[async_trait]
impl PhotobookStore for PgPhotobookStore {
    async fn create(&self, gallery_id: Uuid, new: NewPhotobook) -> Result<Photobook, AppError> {
        if self.load_by_gallery(gallery_id).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Gallery {gallery_id} already has a photobook"
            )));
        }

        let row = sqlx::query_as::<_, PhotobookRow>(
            r#"
            INSERT INTO photobooks (id, gallery_id, title, format, notes, status, pages)
            VALUES ($1, $2, $3, $4, $5, 'draft', '[]'::jsonb)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(gallery_id)
        .bind(&new.title)
        .bind(new.format.as_str())
        .bind(&new.notes)
        .fetch_one(&self.pool)
        .await?;

        info!("Created photobook {} for gallery {gallery_id}", row.id);
        Photobook::try_from(row)
    }

    async fn load(&self, id: Uuid) -> Result<Option<Photobook>, AppError> {
        sqlx::query_as::<_, PhotobookRow>("SELECT * FROM photobooks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Photobook::try_from)
            .transpose()
    }

    async fn load_by_gallery(&self, gallery_id: Uuid) -> Result<Option<Photobook>, AppError> {
        sqlx::query_as::<_, PhotobookRow>("SELECT * FROM photobooks WHERE gallery_id = $1")
            .bind(gallery_id)
            .fetch_optional(&self.pool)
            .await?
            .map(Photobook::try_from)
            .transpose()
    }

    async fn gallery_photos(&self, gallery_id: Uuid) -> Result<Vec<PhotoItem>, AppError> {
        let rows = sqlx::query_as::<_, GalleryPhotoRow>(
            "SELECT * FROM gallery_photos WHERE gallery_id = $1 ORDER BY sort_order, id",
        )
        .bind(gallery_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(PhotoItem::from).collect())
    }

    async fn replace_gallery_photos(
        &self,
        gallery_id: Uuid,
        photos: &[PhotoItem],
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM gallery_photos WHERE gallery_id = $1")
            .bind(gallery_id)
            .execute(&mut *tx)
            .await?;

        for (order, photo) in photos.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO gallery_photos
                    (gallery_id, id, url, thumbnail_url, width, height, title, sort_order)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(gallery_id)
            .bind(&photo.id)
            .bind(&photo.url)
            .bind(&photo.thumbnail_url)
            .bind(photo.width.and_then(|w| i32::try_from(w).ok()))
            .bind(photo.height.and_then(|h| i32::try_from(h).ok()))
            .bind(&photo.title)
            .bind(order as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(
            "Replaced gallery {gallery_id} photo list ({} photos)",
            photos.len()
        );
        Ok(())
    }

    async fn save(&self, id: Uuid, update: &PhotobookUpdate) -> Result<Photobook, AppError> {
        self.write(id, update, None).await
    }

    async fn submit(&self, id: Uuid, update: &PhotobookUpdate) -> Result<Photobook, AppError> {
        if update.pages.is_empty() {
            return Err(LayoutError::EmptyPhotobook.into());
        }
        let book = self
            .write(id, update, Some(PhotobookStatus::Submitted))
            .await?;
        info!("Photobook {id} submitted for review");
        Ok(book)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MemoryPhotobookStore
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct MemoryInner {
    books: HashMap<Uuid, Photobook>,
    galleries: HashMap<Uuid, Vec<PhotoItem>>,
}

/// Process-local store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryPhotobookStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryPhotobookStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn write(
        &self,
        id: Uuid,
        update: &PhotobookUpdate,
        new_status: Option<PhotobookStatus>,
    ) -> Result<Photobook, AppError> {
        let mut inner = self.inner.write().await;
        let book = inner.books.get_mut(&id).ok_or_else(|| not_found(id))?;
        if !book.status.is_editable() {
            return Err(not_editable(id, book.status));
        }
        book.title = update.title.clone();
        book.notes = update.notes.clone();
        book.pages = update.pages.clone();
        if let Some(status) = new_status {
            book.status = status;
        }
        Ok(book.clone())
    }
}

#[async_trait]
impl PhotobookStore for MemoryPhotobookStore {
    async fn create(&self, gallery_id: Uuid, new: NewPhotobook) -> Result<Photobook, AppError> {
        let mut inner = self.inner.write().await;
        if inner.books.values().any(|b| b.gallery_id == gallery_id) {
            return Err(AppError::Conflict(format!(
                "Gallery {gallery_id} already has a photobook"
            )));
        }
        let book = Photobook {
            id: Uuid::new_v4(),
            gallery_id,
            title: new.title,
            format: new.format,
            notes: new.notes,
            status: PhotobookStatus::Draft,
            pages: Vec::new(),
        };
        inner.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn load(&self, id: Uuid) -> Result<Option<Photobook>, AppError> {
        Ok(self.inner.read().await.books.get(&id).cloned())
    }

    async fn load_by_gallery(&self, gallery_id: Uuid) -> Result<Option<Photobook>, AppError> {
        Ok(self
            .inner
            .read()
            .await
            .books
            .values()
            .find(|b| b.gallery_id == gallery_id)
            .cloned())
    }

    async fn gallery_photos(&self, gallery_id: Uuid) -> Result<Vec<PhotoItem>, AppError> {
        Ok(self
            .inner
            .read()
            .await
            .galleries
            .get(&gallery_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn replace_gallery_photos(
        &self,
        gallery_id: Uuid,
        photos: &[PhotoItem],
    ) -> Result<(), AppError> {
        self.inner
            .write()
            .await
            .galleries
            .insert(gallery_id, photos.to_vec());
        Ok(())
    }

    async fn save(&self, id: Uuid, update: &PhotobookUpdate) -> Result<Photobook, AppError> {
        self.write(id, update, None).await
    }

    async fn submit(&self, id: Uuid, update: &PhotobookUpdate) -> Result<Photobook, AppError> {
        if update.pages.is_empty() {
            return Err(LayoutError::EmptyPhotobook.into());
        }
        self.write(id, update, Some(PhotobookStatus::Submitted))
            .await
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::catalog::{TemplateCatalog, FULL_BLEED};

    fn new_book() -> NewPhotobook {
        NewPhotobook {
            title: "Smith wedding".to_string(),
            format: PhotobookFormat::Square30,
            notes: None,
        }
    }

    fn one_page() -> Vec<Page> {
        let catalog = TemplateCatalog::builtin();
        let mut page = Page::with_template(catalog.get(FULL_BLEED).unwrap());
        page.page_number = 1;
        vec![page]
    }

    #[tokio::test]
    async fn test_create_is_one_per_gallery() {
        let store = MemoryPhotobookStore::new();
        let gallery = Uuid::new_v4();
        let book = store.create(gallery, new_book()).await.unwrap();
        assert_eq!(book.status, PhotobookStatus::Draft);
        assert!(matches!(
            store.create(gallery, new_book()).await,
            Err(AppError::Conflict(_))
        ));
        let found = store.load_by_gallery(gallery).await.unwrap().unwrap();
        assert_eq!(found.id, book.id);
    }

    #[tokio::test]
    async fn test_submit_locks_further_saves() {
        let store = MemoryPhotobookStore::new();
        let book = store.create(Uuid::new_v4(), new_book()).await.unwrap();
        let update = PhotobookUpdate {
            title: book.title.clone(),
            notes: None,
            pages: one_page(),
        };

        let submitted = store.submit(book.id, &update).await.unwrap();
        assert_eq!(submitted.status, PhotobookStatus::Submitted);

        assert!(matches!(
            store.save(book.id, &update).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_submit_refuses_empty_pages() {
        let store = MemoryPhotobookStore::new();
        let book = store.create(Uuid::new_v4(), new_book()).await.unwrap();
        let update = PhotobookUpdate::from(&book);
        assert!(matches!(
            store.submit(book.id, &update).await,
            Err(AppError::UnprocessableEntity(_))
        ));
        let reloaded = store.load(book.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, PhotobookStatus::Draft);
    }

    #[tokio::test]
    async fn test_save_unknown_book_is_not_found() {
        let store = MemoryPhotobookStore::new();
        let update = PhotobookUpdate {
            title: "x".into(),
            notes: None,
            pages: vec![],
        };
        assert!(matches!(
            store.save(Uuid::new_v4(), &update).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_gallery_photos_round_trip_in_order() {
        let store = MemoryPhotobookStore::new();
        let gallery = Uuid::new_v4();
        assert!(store.gallery_photos(gallery).await.unwrap().is_empty());
        let photos = vec![
            PhotoItem {
                id: "b".into(),
                url: "https://cdn.example/b.jpg".into(),
                thumbnail_url: None,
                width: Some(600),
                height: Some(900),
                title: None,
            },
            PhotoItem {
                id: "a".into(),
                url: "https://cdn.example/a.jpg".into(),
                thumbnail_url: None,
                width: None,
                height: None,
                title: Some("Rings".into()),
            },
        ];
        store.replace_gallery_photos(gallery, &photos).await.unwrap();
        assert_eq!(store.gallery_photos(gallery).await.unwrap(), photos);
    }
}
