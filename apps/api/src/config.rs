use anyhow::{bail, Context, Result};

use crate::layout::auto_layout::DEFAULT_BATCH_MAX;
use crate::layout::{AutoLayoutConfig, Orientation};

/// Which `PhotobookStore` backend to run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreBackend,
    /// Required for the Postgres backend.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub port: u16,
    pub rust_log: String,
    pub auto_layout: AutoLayoutConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let store = match get("PHOTOBOOK_STORE").as_deref().unwrap_or("postgres") {
            "postgres" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            other => bail!("PHOTOBOOK_STORE must be 'postgres' or 'memory', got '{other}'"),
        };

        let database_url = get("DATABASE_URL");
        if store == StoreBackend::Postgres && database_url.is_none() {
            bail!("Required environment variable 'DATABASE_URL' is not set");
        }

        let batch_max = match get("AUTO_LAYOUT_BATCH_MAX") {
            Some(v) => v
                .parse::<usize>()
                .context("AUTO_LAYOUT_BATCH_MAX must be a positive integer")?,
            None => DEFAULT_BATCH_MAX,
        };
        if batch_max == 0 {
            bail!("AUTO_LAYOUT_BATCH_MAX must be at least 1");
        }

        let order = match get("AUTO_LAYOUT_ORDER") {
            Some(v) => parse_order(&v)?,
            None => Orientation::ALL.to_vec(),
        };

        Ok(Config {
            store,
            database_url,
            database_max_connections: get("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|| "10".to_string())
                .parse::<u32>()
                .context("DATABASE_MAX_CONNECTIONS must be a number")?,
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            auto_layout: AutoLayoutConfig { batch_max, order },
        })
    }
}

/// Parses `landscape,portrait,square` in any order; each orientation exactly once.
fn parse_order(value: &str) -> Result<Vec<Orientation>> {
    let mut order = Vec::with_capacity(3);
    for part in value.split(',') {
        let o = Orientation::parse(part)
            .with_context(|| format!("AUTO_LAYOUT_ORDER: unknown orientation '{}'", part.trim()))?;
        if order.contains(&o) {
            bail!("AUTO_LAYOUT_ORDER: '{o}' listed twice");
        }
        order.push(o);
    }
    if order.len() != Orientation::ALL.len() {
        bail!("AUTO_LAYOUT_ORDER must list landscape, portrait and square");
    }
    Ok(order)
}
