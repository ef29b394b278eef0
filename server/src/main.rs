//! Gather Server - paged activity listing, activity CRUD and photo uploads.
//!
//! Activities live in PostgreSQL. The list endpoint pages through them with
//! the gather-engine paginator and reports page metadata in a `Pagination`
//! response header, which the gather-client HTTP remote follows to load
//! everything.

mod config;
mod db;
mod error;
mod handlers;
mod media;
mod routes;

use crate::config::Config;
use crate::db::Pool;
use crate::media::{MemoryPhotoStore, PhotoStore};
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: Pool,
    pub photos: Arc<dyn PhotoStore>,
}

/// Build the router with middleware applied.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::create_routes())
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any)
                    .expose_headers([routes::PAGINATION]),
            ),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gather_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Starting Gather Server on {}", config.addr());

    let pool = db::create_pool(&config.database_url, config.max_connections).await?;

    tracing::info!("Running database migrations...");
    db::run_migrations(&pool).await?;

    let photos = Arc::new(MemoryPhotoStore::new(format!(
        "http://{}/photos",
        config.addr()
    )));
    let addr = config.addr();
    let state = AppState { pool, photos };

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
