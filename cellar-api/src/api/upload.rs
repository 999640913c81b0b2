//! Photo upload and delete-by-key endpoints

use axum::extract::{Multipart, Path, State};
use axum::Json;
use cellar_common::events::CellarEvent;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::storage::PhotoStore;
use crate::{AppState, MAX_UPLOAD_BYTES};

const ALLOWED_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/heic"];

fn extension_for(mimetype: &str) -> &'static str {
    match mimetype {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/heic" => "heic",
        _ => "bin",
    }
}

/// POST /api/storage/upload
///
/// Single multipart `file` field. MIME type and size are validated
/// before anything touches the store.
pub async fn upload_photo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let mimetype = field
            .content_type()
            .ok_or_else(|| ApiError::BadRequest("file field has no content type".to_string()))?
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed reading upload: {}", e)))?;
        file = Some((mimetype, bytes.to_vec()));
    }

    let Some((mimetype, bytes)) = file else {
        return Err(ApiError::BadRequest("missing file field".to_string()));
    };

    if !ALLOWED_TYPES.contains(&mimetype.as_str()) {
        return Err(ApiError::BadRequest(format!(
            "unsupported file type: {}",
            mimetype
        )));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(ApiError::BadRequest(format!(
            "file too large: {} bytes (limit {})",
            bytes.len(),
            MAX_UPLOAD_BYTES
        )));
    }

    let key = format!("photos/{}.{}", Uuid::new_v4(), extension_for(&mimetype));
    state.store.put(&key, &bytes).await?;
    let url = state.store.signed_url(&key)?;

    state.event_bus.emit_lossy(CellarEvent::PhotoUploaded {
        key: key.clone(),
        size: bytes.len() as u64,
        timestamp: Utc::now(),
    });
    tracing::info!("Uploaded {} ({} bytes, {})", key, bytes.len(), mimetype);

    Ok(Json(json!({
        "success": true,
        "url": url,
        "key": key,
        "size": bytes.len(),
        "mimetype": mimetype,
    })))
}

/// DELETE /api/storage/{key}
pub async fn delete_object(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<Value>> {
    state.store.delete(&key).await?;
    Ok(Json(json!({ "success": true, "key": key })))
}
