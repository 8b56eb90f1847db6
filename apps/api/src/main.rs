mod config;
mod db;
mod errors;
mod layout;
mod models;
mod photobook;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, StoreBackend};
use crate::db::create_pool;
use crate::layout::{TemplateCatalog, TemplateTable};
use crate::photobook::store::{MemoryPhotobookStore, PgPhotobookStore, PhotobookStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Photobook API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize persistence (PostgreSQL by default; swap via PHOTOBOOK_STORE)
    let store: Arc<dyn PhotobookStore> = match config.store {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres store")?;
            let db = create_pool(url, config.database_max_connections).await?;
            sqlx::migrate!("./migrations").run(&db).await?;
            info!("Database migrations applied");
            Arc::new(PgPhotobookStore::new(db))
        }
        StoreBackend::Memory => {
            info!("Using in-memory photobook store; data is lost on restart");
            Arc::new(MemoryPhotobookStore::new())
        }
    };

    let catalog = Arc::new(TemplateCatalog::builtin());
    info!("Template catalog loaded ({} templates)", catalog.list().len());

    let layout_table = Arc::new(TemplateTable::builtin());
    info!(
        "Auto-layout: batch max {}, order {:?}",
        config.auto_layout.batch_max, config.auto_layout.order
    );

    // Build app state
    let state = AppState {
        store,
        catalog,
        layout_table,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the storefront domain

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
