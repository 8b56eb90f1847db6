pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::photobook::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Template catalog
        .route("/api/v1/templates", get(handlers::handle_list_templates))
        .route("/api/v1/templates/:id", get(handlers::handle_get_template))
        // Galleries
        .route(
            "/api/v1/galleries/:gallery_id/photos",
            put(handlers::handle_replace_gallery_photos),
        )
        .route(
            "/api/v1/galleries/:gallery_id/photobook",
            get(handlers::handle_get_gallery_photobook).post(handlers::handle_create_photobook),
        )
        // Photobooks
        .route(
            "/api/v1/photobooks/:id",
            get(handlers::handle_get_photobook).put(handlers::handle_save_photobook),
        )
        .route(
            "/api/v1/photobooks/:id/edits",
            post(handlers::handle_apply_edits),
        )
        .route(
            "/api/v1/photobooks/:id/auto-layout",
            post(handlers::handle_auto_layout),
        )
        .route(
            "/api/v1/photobooks/:id/submit",
            post(handlers::handle_submit_photobook),
        )
        .with_state(state)
}
