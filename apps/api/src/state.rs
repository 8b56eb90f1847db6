use std::sync::Arc;

use crate::config::Config;
use crate::layout::{TemplateCatalog, TemplateTable};
use crate::photobook::store::PhotobookStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable persistence. Default: PgPhotobookStore. Swap via PHOTOBOOK_STORE env.
    pub store: Arc<dyn PhotobookStore>,
    /// Read-only template registry, built once at startup.
    pub catalog: Arc<TemplateCatalog>,
    /// `(orientation, count) → template` table for auto-layout.
    pub layout_table: Arc<TemplateTable>,
    pub config: Config,
}
