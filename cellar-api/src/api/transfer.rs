//! Import/export file endpoints
//!
//! JSON exports reuse the collection file shape the import endpoint
//! consumes; a file downloaded from one instance uploads unchanged
//! into another.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cellar_common::events::CellarEvent;
use chrono::Utc;

use crate::export::{
    export_collection, export_varietals, export_wineries, export_wines, export_wines_csv,
    CollectionFile,
};
use crate::error::ApiResult;
use crate::import::{import_collection, CollectionImportResult};
use crate::AppState;

/// GET /api/export/collection
pub async fn export_collection_json(
    State(state): State<AppState>,
) -> ApiResult<Json<CollectionFile>> {
    Ok(Json(export_collection(&state.db).await?))
}

/// GET /api/export/wines
pub async fn export_wines_json(State(state): State<AppState>) -> ApiResult<Json<CollectionFile>> {
    Ok(Json(export_wines(&state.db).await?))
}

/// GET /api/export/wineries
pub async fn export_wineries_json(
    State(state): State<AppState>,
) -> ApiResult<Json<CollectionFile>> {
    Ok(Json(export_wineries(&state.db).await?))
}

/// GET /api/export/varietals
pub async fn export_varietals_json(
    State(state): State<AppState>,
) -> ApiResult<Json<CollectionFile>> {
    Ok(Json(export_varietals(&state.db).await?))
}

/// GET /api/export/wines.csv
pub async fn export_wines_csv_file(State(state): State<AppState>) -> ApiResult<Response> {
    let csv = export_wines_csv(&state.db).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"wines.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

/// POST /api/import/collection
///
/// Accepts a collection file; entity arrays may be partially present.
pub async fn import_collection_file(
    State(state): State<AppState>,
    Json(file): Json<CollectionFile>,
) -> ApiResult<Json<CollectionImportResult>> {
    let result = import_collection(
        &state.db,
        file.wineries.as_deref().unwrap_or(&[]),
        file.varietals.as_deref().unwrap_or(&[]),
        file.wines.as_deref().unwrap_or(&[]),
    )
    .await;

    state.event_bus.emit_lossy(CellarEvent::ImportCompleted {
        wineries_imported: result.wineries.imported,
        varietals_imported: result.varietals.imported,
        wines_imported: result.wines.imported,
        error_count: result.error_count() as i64,
        timestamp: Utc::now(),
    });

    Ok(Json(result))
}
