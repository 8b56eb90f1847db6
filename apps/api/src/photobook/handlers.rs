//! Axum route handlers for the Template and Photobook APIs.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::{
    AutoLayoutReport, EditCommand, EditOutcome, EditSession, Page, PhotoItem, Photobook,
    SaveOutcome, SaveReceipt, Template,
};
use crate::photobook::store::{NewPhotobook, PhotobookUpdate};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// A photobook together with the gallery photos not yet placed on any page.
#[derive(Debug, Serialize, Deserialize)]
pub struct PhotobookView {
    pub photobook: Photobook,
    pub available: Vec<PhotoItem>,
    /// Page `width / height` of the printed format, for rendering.
    pub page_aspect_ratio: f64,
}

impl From<&EditSession> for PhotobookView {
    fn from(session: &EditSession) -> Self {
        let photobook = session.document();
        PhotobookView {
            page_aspect_ratio: photobook.format.page_aspect_ratio(),
            photobook,
            available: session.editor().pool().to_vec(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SavePhotobookRequest {
    pub title: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub commands: Vec<EditCommand>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EditResponse {
    pub outcomes: Vec<EditOutcome>,
    #[serde(flatten)]
    pub view: PhotobookView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AutoLayoutResponse {
    pub report: AutoLayoutReport,
    #[serde(flatten)]
    pub view: PhotobookView,
}

#[derive(Debug, Deserialize)]
pub struct GalleryPhotosRequest {
    pub photos: Vec<PhotoItem>,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn load_book(state: &AppState, id: Uuid) -> Result<Photobook, AppError> {
    state
        .store
        .load(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Photobook {id} not found")))
}

async fn open_session(state: &AppState, book: Photobook) -> Result<EditSession, AppError> {
    let gallery = state.store.gallery_photos(book.gallery_id).await?;
    Ok(EditSession::open(Arc::clone(&state.catalog), book, gallery)?)
}

/// Opens a session for editing; rejects books that are under review or later.
async fn open_editable(state: &AppState, id: Uuid) -> Result<EditSession, AppError> {
    let book = load_book(state, id).await?;
    let session = open_session(state, book).await?;
    if !session.status().is_editable() {
        return Err(AppError::Conflict(format!(
            "Photobook {id} is {} and can no longer be changed",
            session.status().as_str()
        )));
    }
    Ok(session)
}

/// Hands a store receipt back to the session.
fn acknowledge(session: &mut EditSession, generation: u64, saved: &Photobook) {
    let receipt = SaveReceipt {
        generation,
        status: saved.status,
    };
    if session.complete_save(receipt) == SaveOutcome::Stale {
        debug!(
            "Photobook {}: receipt for generation {generation} arrived after generation {}",
            session.id(),
            session.generation()
        );
    }
}

/// Writes the session's current state if it has unsaved changes.
async fn persist(state: &AppState, session: &mut EditSession) -> Result<(), AppError> {
    if !session.is_dirty() {
        return Ok(());
    }
    let snapshot = session.begin_save();
    let saved = state
        .store
        .save(session.id(), &PhotobookUpdate::from(&snapshot.book))
        .await?;
    acknowledge(session, snapshot.generation, &saved);
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Template handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/templates
pub async fn handle_list_templates(State(state): State<AppState>) -> Json<Vec<Template>> {
    Json(state.catalog.list().to_vec())
}

/// GET /api/v1/templates/:id
pub async fn handle_get_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Template>, AppError> {
    Ok(Json(state.catalog.get(&id)?.clone()))
}

// ────────────────────────────────────────────────────────────────────────────
// Gallery handlers
// ────────────────────────────────────────────────────────────────────────────

/// PUT /api/v1/galleries/:gallery_id/photos
///
/// Registers the photo references a gallery's photobook may use. Photos already
/// placed in the gallery's photobook cannot be dropped.
pub async fn handle_replace_gallery_photos(
    State(state): State<AppState>,
    Path(gallery_id): Path<Uuid>,
    Json(req): Json<GalleryPhotosRequest>,
) -> Result<StatusCode, AppError> {
    let mut seen = std::collections::HashSet::new();
    for photo in &req.photos {
        if photo.id.trim().is_empty() || photo.url.trim().is_empty() {
            return Err(AppError::Validation(
                "every photo needs an id and a url".to_string(),
            ));
        }
        if !seen.insert(photo.id.as_str()) {
            return Err(AppError::Validation(format!(
                "photo id '{}' appears more than once",
                photo.id
            )));
        }
    }
    if let Some(book) = state.store.load_by_gallery(gallery_id).await? {
        if let Some(placed) = book
            .pages
            .iter()
            .flat_map(Page::photos)
            .find(|p| !seen.contains(p.id.as_str()))
        {
            return Err(AppError::Conflict(format!(
                "photo '{}' is placed in photobook {} and cannot be removed",
                placed.id, book.id
            )));
        }
    }
    state
        .store
        .replace_gallery_photos(gallery_id, &req.photos)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/galleries/:gallery_id/photobook
pub async fn handle_create_photobook(
    State(state): State<AppState>,
    Path(gallery_id): Path<Uuid>,
    Json(req): Json<NewPhotobook>,
) -> Result<(StatusCode, Json<PhotobookView>), AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    let book = state.store.create(gallery_id, req).await?;
    let session = open_session(&state, book).await?;
    Ok((StatusCode::CREATED, Json(PhotobookView::from(&session))))
}

/// GET /api/v1/galleries/:gallery_id/photobook
pub async fn handle_get_gallery_photobook(
    State(state): State<AppState>,
    Path(gallery_id): Path<Uuid>,
) -> Result<Json<PhotobookView>, AppError> {
    let book = state
        .store
        .load_by_gallery(gallery_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Gallery {gallery_id} has no photobook"))
        })?;
    let session = open_session(&state, book).await?;
    Ok(Json(PhotobookView::from(&session)))
}

// ────────────────────────────────────────────────────────────────────────────
// Photobook handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/photobooks/:id
pub async fn handle_get_photobook(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PhotobookView>, AppError> {
    let book = load_book(&state, id).await?;
    let session = open_session(&state, book).await?;
    Ok(Json(PhotobookView::from(&session)))
}

/// PUT /api/v1/photobooks/:id
///
/// Replaces title, notes and the full page list. Pages are validated against the
/// template catalog and the gallery before anything is written.
pub async fn handle_save_photobook(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SavePhotobookRequest>,
) -> Result<Json<PhotobookView>, AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    let mut session = open_editable(&state, id).await?;
    session.set_details(Some(req.title), Some(req.notes));
    session.replace_pages(req.pages)?;
    persist(&state, &mut session).await?;

    debug!(
        "Saved photobook {id} ({} pages)",
        session.editor().page_count()
    );
    Ok(Json(PhotobookView::from(&session)))
}

/// POST /api/v1/photobooks/:id/edits
///
/// Applies a batch of edit commands. Either every command succeeds and the result
/// is saved, or nothing changes.
pub async fn handle_apply_edits(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EditRequest>,
) -> Result<Json<EditResponse>, AppError> {
    let mut session = open_editable(&state, id).await?;
    let count = req.commands.len();
    let outcomes = session.apply_all(req.commands)?;
    persist(&state, &mut session).await?;

    debug!("Applied {count} edits to photobook {id}");
    Ok(Json(EditResponse {
        outcomes,
        view: PhotobookView::from(&session),
    }))
}

/// POST /api/v1/photobooks/:id/auto-layout
///
/// Places every unplaced gallery photo onto new pages.
pub async fn handle_auto_layout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AutoLayoutResponse>, AppError> {
    let mut session = open_editable(&state, id).await?;
    let report = session.auto_layout(&state.layout_table, &state.config.auto_layout);
    persist(&state, &mut session).await?;

    info!(
        "Auto-layout on photobook {id}: {} pages, {} photos placed, {} skipped",
        report.pages_created, report.photos_placed, report.photos_skipped
    );
    Ok(Json(AutoLayoutResponse {
        report,
        view: PhotobookView::from(&session),
    }))
}

/// POST /api/v1/photobooks/:id/submit
///
/// Sends the photobook for review. Refused while it has no pages.
pub async fn handle_submit_photobook(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PhotobookView>, AppError> {
    let mut session = open_editable(&state, id).await?;
    let snapshot = session.begin_submit()?;
    let saved = state
        .store
        .submit(id, &PhotobookUpdate::from(&snapshot.book))
        .await?;
    acknowledge(&mut session, snapshot.generation, &saved);

    info!("Photobook {id} submitted ({} pages)", saved.pages.len());
    Ok(Json(PhotobookView::from(&session)))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::layout::catalog::{FULL_BLEED, GRID_3X2, SPLIT_SIDE};
    use crate::layout::{PhotobookStatus, TemplateCatalog, TemplateTable};
    use crate::photobook::store::MemoryPhotobookStore;
    use crate::routes::build_router;

    fn test_state() -> AppState {
        let config = Config::from_lookup(|k| match k {
            "PHOTOBOOK_STORE" => Some("memory".to_string()),
            _ => None,
        })
        .unwrap();
        AppState {
            store: Arc::new(MemoryPhotobookStore::new()),
            catalog: Arc::new(TemplateCatalog::builtin()),
            layout_table: Arc::new(TemplateTable::builtin()),
            config,
        }
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(v) => Body::from(v.to_string()),
                None => Body::empty(),
            })
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn landscape(id: &str) -> Value {
        json!({ "id": id, "url": format!("https://cdn.example/{id}.jpg"), "width": 1500, "height": 1000 })
    }

    /// Registers `n` landscape photos and creates the gallery's photobook.
    async fn seeded(app: &Router, n: usize) -> Uuid {
        let gallery = Uuid::new_v4();
        let photos: Vec<Value> = (0..n).map(|i| landscape(&format!("img-{i}"))).collect();
        let (status, _) = call(
            app,
            Method::PUT,
            &format!("/api/v1/galleries/{gallery}/photos"),
            Some(json!({ "photos": photos })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = call(
            app,
            Method::POST,
            &format!("/api/v1/galleries/{gallery}/photobook"),
            Some(json!({ "title": "Lakeside", "format": "30x30" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["available"].as_array().unwrap().len(), n);
        body["photobook"]["id"].as_str().unwrap().parse().unwrap()
    }

    // ── templates ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_list_and_get_templates() {
        let app = build_router(test_state());
        let (status, body) = call(&app, Method::GET, "/api/v1/templates", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"], FULL_BLEED);

        let (status, body) = call(&app, Method::GET, "/api/v1/templates/grid-3x2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["slots"].as_array().unwrap().len(), 6);

        let (status, body) = call(&app, Method::GET, "/api/v1/templates/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    // ── auto-layout ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_auto_layout_end_to_end() {
        let app = build_router(test_state());
        let id = seeded(&app, 7).await;

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/v1/photobooks/{id}/auto-layout"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["report"]["pages_created"], 2);
        let pages = body["photobook"]["pages"].as_array().unwrap();
        assert_eq!(pages[0]["template_id"], GRID_3X2);
        assert_eq!(pages[1]["template_id"], FULL_BLEED);
        assert_eq!(pages[1]["page_number"], 2);
        assert!(body["available"].as_array().unwrap().is_empty());

        // Persisted, and a second run adds nothing.
        let (_, body) = call(
            &app,
            Method::POST,
            &format!("/api/v1/photobooks/{id}/auto-layout"),
            None,
        )
        .await;
        assert_eq!(body["report"]["pages_created"], 0);
        assert_eq!(body["photobook"]["pages"].as_array().unwrap().len(), 2);
    }

    // ── edits ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_edit_batch_is_applied_and_persisted() {
        let app = build_router(test_state());
        let id = seeded(&app, 3).await;

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/v1/photobooks/{id}/edits"),
            Some(json!({ "commands": [
                { "op": "add_page", "template_id": SPLIT_SIDE },
                { "op": "assign_photo", "page": 0, "slot": 0, "photo_id": "img-2" },
                { "op": "adjust", "page": 0, "slot": 0, "adjustment": { "zoom": 9.0 } }
            ]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcomes"][0]["outcome"], "page_created");
        let slot = &body["photobook"]["pages"][0]["slots"][0];
        assert_eq!(slot["placement"]["photo"]["id"], "img-2");
        assert_eq!(slot["placement"]["zoom"], 3.0);
        assert_eq!(body["available"].as_array().unwrap().len(), 2);

        let (_, reloaded) = call(&app, Method::GET, &format!("/api/v1/photobooks/{id}"), None).await;
        assert_eq!(reloaded["photobook"], body["photobook"]);
    }

    #[tokio::test]
    async fn test_failing_edit_batch_changes_nothing() {
        let app = build_router(test_state());
        let id = seeded(&app, 1).await;

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/v1/photobooks/{id}/edits"),
            Some(json!({ "commands": [
                { "op": "add_page" },
                { "op": "assign_photo", "page": 0, "slot": 4, "photo_id": "img-0" }
            ]})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");

        let (_, reloaded) = call(&app, Method::GET, &format!("/api/v1/photobooks/{id}"), None).await;
        assert!(reloaded["photobook"]["pages"].as_array().unwrap().is_empty());
    }

    // ── save ────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_save_rejects_photo_used_twice() {
        let app = build_router(test_state());
        let id = seeded(&app, 1).await;
        let placed = json!({
            "photo": landscape("img-0"),
            "rotation": 0.0, "zoom": 1.0, "pan_x": 0.0, "pan_y": 0.0
        });
        let page = json!({
            "page_number": 1,
            "template_id": SPLIT_SIDE,
            "slots": [
                { "slot_id": "split-side/1", "fit": "cover", "placement": placed },
                { "slot_id": "split-side/2", "fit": "cover", "placement": placed }
            ]
        });

        let (status, _) = call(
            &app,
            Method::PUT,
            &format!("/api/v1/photobooks/{id}"),
            Some(json!({ "title": "Lakeside", "pages": [page] })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_save_replaces_title_and_pages() {
        let app = build_router(test_state());
        let id = seeded(&app, 2).await;
        let page = json!({
            "page_number": 7,
            "template_id": FULL_BLEED,
            "slots": [{ "slot_id": "full-bleed/1", "fit": "contain", "caption": "Dusk" }]
        });

        let (status, body) = call(
            &app,
            Method::PUT,
            &format!("/api/v1/photobooks/{id}"),
            Some(json!({ "title": "Lakeside, 2026", "notes": "gloss", "pages": [page] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["photobook"]["title"], "Lakeside, 2026");
        assert_eq!(body["photobook"]["pages"][0]["page_number"], 1);
        assert_eq!(body["photobook"]["pages"][0]["slots"][0]["caption"], "Dusk");
        assert_eq!(body["available"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_save_rejects_photo_outside_gallery() {
        let app = build_router(test_state());
        let id = seeded(&app, 1).await;
        let page = json!({
            "page_number": 1,
            "template_id": FULL_BLEED,
            "slots": [{
                "slot_id": "full-bleed/1",
                "fit": "cover",
                "placement": {
                    "photo": { "id": "zzz", "url": "https://elsewhere.example/x.jpg" },
                    "rotation": 0.0, "zoom": 1.0, "pan_x": 0.0, "pan_y": 0.0
                }
            }]
        });

        let (status, body) = call(
            &app,
            Method::PUT,
            &format!("/api/v1/photobooks/{id}"),
            Some(json!({ "title": "Lakeside", "pages": [page] })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"]["message"].as_str().unwrap().contains("zzz"));

        let (_, reloaded) = call(&app, Method::GET, &format!("/api/v1/photobooks/{id}"), None).await;
        assert!(reloaded["photobook"]["pages"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_keeps_gallery_record_for_placed_photo() {
        let app = build_router(test_state());
        let id = seeded(&app, 1).await;
        let page = json!({
            "page_number": 1,
            "template_id": FULL_BLEED,
            "slots": [{
                "slot_id": "full-bleed/1",
                "fit": "cover",
                "placement": {
                    "photo": { "id": "img-0", "url": "https://elsewhere.example/img-0.jpg" },
                    "rotation": 90.0, "zoom": 1.0, "pan_x": 0.0, "pan_y": 0.0
                }
            }]
        });

        let (status, body) = call(
            &app,
            Method::PUT,
            &format!("/api/v1/photobooks/{id}"),
            Some(json!({ "title": "Lakeside", "pages": [page] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let placement = &body["photobook"]["pages"][0]["slots"][0]["placement"];
        assert_eq!(placement["photo"]["url"], "https://cdn.example/img-0.jpg");
        assert_eq!(placement["photo"]["width"], 1500);
        assert_eq!(placement["rotation"], 90.0);
        assert!(body["available"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_adjustment_is_rejected_and_book_stays_loadable() {
        let app = build_router(test_state());
        let id = seeded(&app, 1).await;
        let edits = format!("/api/v1/photobooks/{id}/edits");

        let (status, body) = call(
            &app,
            Method::POST,
            &edits,
            Some(json!({ "commands": [
                { "op": "add_page" },
                { "op": "assign_photo", "page": 0, "slot": 0, "photo_id": "img-0" },
                { "op": "adjust", "page": 0, "slot": 0, "adjustment": { "pan_x": 1e39 } }
            ]})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"]["message"].as_str().unwrap().contains("pan_x"));

        let (status, body) = call(
            &app,
            Method::POST,
            &edits,
            Some(json!({ "commands": [
                { "op": "add_page" },
                { "op": "assign_photo", "page": 0, "slot": 0, "photo_id": "img-0" },
                { "op": "adjust", "page": 0, "slot": 0, "adjustment": { "pan_x": -0.5, "rotation": 15.0 } }
            ]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // The returned pages deserialize and can be saved back unchanged.
        let pages: Vec<Page> = serde_json::from_value(body["photobook"]["pages"].clone()).unwrap();
        assert_eq!(pages[0].slots[0].placement.as_ref().unwrap().pan_x, -0.5);
        let (status, saved) = call(
            &app,
            Method::PUT,
            &format!("/api/v1/photobooks/{id}"),
            Some(json!({ "title": "Lakeside", "pages": body["photobook"]["pages"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["photobook"]["pages"], body["photobook"]["pages"]);
    }

    // ── submit ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_submit_requires_pages_then_locks_book() {
        let app = build_router(test_state());
        let id = seeded(&app, 2).await;
        let submit = format!("/api/v1/photobooks/{id}/submit");

        let (status, _) = call(&app, Method::POST, &submit, None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        call(
            &app,
            Method::POST,
            &format!("/api/v1/photobooks/{id}/auto-layout"),
            None,
        )
        .await;
        let (status, body) = call(&app, Method::POST, &submit, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["photobook"]["status"],
            PhotobookStatus::Submitted.as_str()
        );

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/v1/photobooks/{id}/edits"),
            Some(json!({ "commands": [{ "op": "add_page" }] })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");
    }

    // ── galleries ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_gallery_lookup_and_duplicate_create() {
        let app = build_router(test_state());
        let gallery = Uuid::new_v4();
        let uri = format!("/api/v1/galleries/{gallery}/photobook");

        let (status, _) = call(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&app, Method::POST, &uri, Some(json!({ "title": "A" }))).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = call(&app, Method::POST, &uri, Some(json!({ "title": "B" }))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = call(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["photobook"]["title"], "A");
        assert_eq!(body["photobook"]["format"], "20x30");
    }

    #[tokio::test]
    async fn test_gallery_photos_cannot_drop_placed_photo() {
        let app = build_router(test_state());
        let id = seeded(&app, 2).await;
        call(
            &app,
            Method::POST,
            &format!("/api/v1/photobooks/{id}/edits"),
            Some(json!({ "commands": [
                { "op": "add_page" },
                { "op": "assign_photo", "page": 0, "slot": 0, "photo_id": "img-1" }
            ]})),
        )
        .await;
        let (_, view) = call(&app, Method::GET, &format!("/api/v1/photobooks/{id}"), None).await;
        let gallery = view["photobook"]["gallery_id"].as_str().unwrap().to_string();
        let uri = format!("/api/v1/galleries/{gallery}/photos");

        let (status, _) = call(
            &app,
            Method::PUT,
            &uri,
            Some(json!({ "photos": [landscape("img-0")] })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = call(
            &app,
            Method::PUT,
            &uri,
            Some(json!({ "photos": [landscape("img-1"), landscape("img-9")] })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, view) = call(&app, Method::GET, &format!("/api/v1/photobooks/{id}"), None).await;
        assert_eq!(view["available"][0]["id"], "img-9");
        assert_eq!(view["page_aspect_ratio"], 1.0);
    }

    #[tokio::test]
    async fn test_gallery_photos_reject_duplicate_ids() {
        let app = build_router(test_state());
        let (status, _) = call(
            &app,
            Method::PUT,
            &format!("/api/v1/galleries/{}/photos", Uuid::new_v4()),
            Some(json!({ "photos": [landscape("x"), landscape("x")] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
