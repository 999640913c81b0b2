//! cellar-api: wine-cellar inventory backend
//!
//! GraphQL API over SQLite with filesystem photo storage, plus REST
//! endpoints for uploads, media serving, import/export files, health
//! and SSE change events.

pub mod api;
pub mod db;
pub mod error;
pub mod export;
pub mod graphql;
pub mod import;
pub mod storage;
pub mod types;

use async_graphql_axum::GraphQL;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use cellar_common::config::CellarConfig;
use cellar_common::events::EventBus;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::storage::LocalPhotoStore;

/// Uploads stay under 5 MB; the body limit leaves headroom for
/// multipart framing
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<CellarConfig>,
    pub store: Arc<LocalPhotoStore>,
    pub event_bus: EventBus,
}

impl AppState {
    /// Open the database and photo store described by the config
    pub async fn new(config: CellarConfig) -> anyhow::Result<Self> {
        config.ensure_directories()?;
        let db = db::init_database_pool(&config.database_path()).await?;
        let store = Arc::new(LocalPhotoStore::new(
            config.storage_root(),
            config.storage.bucket.clone(),
            config.storage.base_url.clone(),
            config.storage.secret.clone(),
        ));

        Ok(AppState {
            db,
            config: Arc::new(config),
            store,
            event_bus: EventBus::new(100),
        })
    }
}

/// Build the HTTP router with all routes configured
pub fn build_router(state: AppState) -> Router {
    let schema = graphql::build_schema(state.clone());

    Router::new()
        .route(
            "/graphql",
            get(graphql::graphiql).post_service(GraphQL::new(schema)),
        )
        .route("/health", get(api::health::health_check))
        .route("/api/events", get(api::sse::event_stream))
        .route("/api/storage/upload", post(api::upload::upload_photo))
        .route("/api/storage/*key", delete(api::upload::delete_object))
        .route("/media/*key", get(api::media::serve_media))
        .route("/api/export/collection", get(api::transfer::export_collection_json))
        .route("/api/export/wines", get(api::transfer::export_wines_json))
        .route("/api/export/wineries", get(api::transfer::export_wineries_json))
        .route("/api/export/varietals", get(api::transfer::export_varietals_json))
        .route("/api/export/wines.csv", get(api::transfer::export_wines_csv_file))
        .route("/api/import/collection", post(api::transfer::import_collection_file))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
