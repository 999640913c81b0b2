//! Signed media serving
//!
//! Serves stored photo objects back to clients. Requests must carry
//! the expiry and signature issued by the store's signed-URL path.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MediaQuery {
    pub expires: u64,
    pub sig: String,
}

fn content_type_for(key: &str) -> &'static str {
    match key.rsplit('.').next() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}

/// GET /media/{key}?expires=...&sig=...
pub async fn serve_media(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<MediaQuery>,
) -> ApiResult<Response> {
    if !state.store.verify(&key, query.expires, &query.sig) {
        return Err(ApiError::BadRequest(
            "invalid or expired signature".to_string(),
        ));
    }

    let path = state
        .store
        .existing_path(&key)?
        .ok_or_else(|| ApiError::NotFound(format!("object {}", key)))?;
    let bytes = tokio::fs::read(&path).await?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&key)),
            (header::CACHE_CONTROL, "private, max-age=3600"),
        ],
        bytes,
    )
        .into_response())
}
