use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::{Page, PhotoItem, Photobook, PhotobookFormat, PhotobookStatus};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PhotobookRow {
    pub id: Uuid,
    pub gallery_id: Uuid,
    pub title: String,
    pub format: String,
    pub notes: Option<String>,
    pub status: String,
    /// `Vec<Page>` as JSONB.
    pub pages: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PhotobookRow> for Photobook {
    type Error = AppError;

    fn try_from(row: PhotobookRow) -> Result<Self, Self::Error> {
        let format = PhotobookFormat::parse(&row.format)
            .ok_or_else(|| anyhow!("photobook {} has unknown format '{}'", row.id, row.format))?;
        let status = PhotobookStatus::parse(&row.status)
            .ok_or_else(|| anyhow!("photobook {} has unknown status '{}'", row.id, row.status))?;
        let pages: Vec<Page> = serde_json::from_value(row.pages)?;

        Ok(Photobook {
            id: row.id,
            gallery_id: row.gallery_id,
            title: row.title,
            format,
            notes: row.notes,
            status,
            pages,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GalleryPhotoRow {
    pub id: String,
    pub gallery_id: Uuid,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub title: Option<String>,
    pub sort_order: i32,
}

impl From<GalleryPhotoRow> for PhotoItem {
    fn from(row: GalleryPhotoRow) -> Self {
        PhotoItem {
            id: row.id,
            url: row.url,
            thumbnail_url: row.thumbnail_url,
            width: row.width.and_then(|w| u32::try_from(w).ok()),
            height: row.height.and_then(|h| u32::try_from(h).ok()),
            title: row.title,
        }
    }
}
