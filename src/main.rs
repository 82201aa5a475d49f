//! Application entry point for the `melbourne-forecast-accuracy` service.
//!
//! Evaluates the Bureau of Meteorology 6 day maximum temperature forecast
//! for Melbourne. Forecasts are compared with the same-day forecast made
//! once their target date arrives, and with a naive persistence model.
//! Startup sequence:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Establishing a PostgreSQL connection pool
//! - Optionally creating the forecast table (`CREATE_SCHEMA`)
//! - Mounting all API routes via the `routes` gateway
//! - Binding the Axum HTTP server and serving requests
//!
//! # Environment Variables
//! - `DATABASE_URL` (**required**) – PostgreSQL connection string
//! - `DB_POOL_MAX`, `FORECAST_TABLE`, `LISTEN_PORT`, `RECORD_CACHE_SECS`,
//!   `CREATE_SCHEMA` (optional) – see [`config::load_from_env`]
//! - `APP_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `APP_SPAN_EVENTS` (optional) – span event mode for tracing
use std::{env, net::SocketAddr};

use axum::Router;
use dotenvy::dotenv;
use is_terminal::IsTerminal;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use anyhow::Result;

mod analysis;
mod config;
mod models;
mod routes;
mod schema;
mod store;

pub use config::Config;

// Re-exported so routes/*.rs and store.rs only depend on their parent module
pub use models::{ForecastRecord, RawForecastRow};
pub use store::RecordStore;

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    dotenv().ok();
    init_tracing();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    tracing::info!(
        "Attempting to connect to database: {}",
        config::mask_db_url(&cfg.db_url)
    );

    let pool = PgPoolOptions::new()
        .max_connections(cfg.db_pool_max)
        .connect(&cfg.db_url)
        .await
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to connect to database '{}': {}",
                config::mask_db_url(&cfg.db_url),
                e
            )
        })?;

    tracing::info!("Successfully connected to database");

    if cfg.create_schema {
        schema::create_schema(&pool, &cfg.quoted_table()).await?;
    }

    let store = RecordStore::new(pool, &cfg);
    let app: Router = routes::router(store);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.listen_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ---

/// Install the global tracing subscriber. Call once, after `.env` is loaded.
///
/// `RUST_LOG` wins over `APP_LOG_LEVEL`; `FORCE_COLOR` overrides TTY
/// detection; `APP_SPAN_EVENTS` picks which span events are emitted.
fn init_tracing() {
    // ---
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(filter_directive(env::var("APP_LOG_LEVEL").ok().as_deref()))
    };
    let use_color = color_override(env::var("FORCE_COLOR").ok().as_deref())
        .unwrap_or_else(|| std::io::stdout().is_terminal());

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events(env::var("APP_SPAN_EVENTS").ok().as_deref()))
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}

/// Filter for our own crate at `level` (default `debug`); per-query sqlx
/// logging stays at `warn`.
fn filter_directive(level: Option<&str>) -> String {
    let level = match level {
        Some(l @ ("trace" | "debug" | "info" | "warn" | "error")) => l,
        _ => "debug",
    };
    format!("{level},sqlx::query=warn")
}

fn color_override(value: Option<&str>) -> Option<bool> {
    match value {
        Some("1" | "true" | "yes") => Some(true),
        Some("0" | "false" | "no") => Some(false),
        _ => None,
    }
}

fn span_events(mode: Option<&str>) -> FmtSpan {
    match mode {
        Some("full") => FmtSpan::FULL,
        Some("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    }
}
