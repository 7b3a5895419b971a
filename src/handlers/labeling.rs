use axum::extract::{Path, State};
use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::db::models::Label;
use crate::error::SnowgateError;
use crate::middleware::OperatorSession;
use crate::router::SnowgateState;

/// GET /api/next-image — the next image awaiting a label, in upload order.
/// Returns a URL for the bytes, not the bytes themselves; `complete` when
/// nothing is left.
pub async fn next_image_handler(
    State(state): State<SnowgateState>,
    _session: OperatorSession,
) -> Result<Json<serde_json::Value>, SnowgateError> {
    match state.records.first_unlabeled().await? {
        Some(image) => Ok(Json(json!({
            "status": "success",
            "image_id": image.id,
            "image_url": format!("/uploads/{}", image.filename),
        }))),
        None => Ok(Json(json!({
            "status": "complete",
            "message": "No more images to label!",
        }))),
    }
}

#[derive(Deserialize)]
pub struct LabelRequest {
    pub label: String,
}

/// POST /api/label-image/{id} — record an operator's decision. Only the two
/// terminal label values are accepted; relabeling overwrites in place.
pub async fn label_image_handler(
    State(state): State<SnowgateState>,
    _session: OperatorSession,
    Path(image_id): Path<i64>,
    Json(request): Json<LabelRequest>,
) -> Result<Json<serde_json::Value>, SnowgateError> {
    let Some(label) = Label::parse_decision(&request.label) else {
        return Err(SnowgateError::BadRequest("Invalid label".to_string()));
    };

    if !state.records.set_label(image_id, label).await? {
        return Err(SnowgateError::ImageNotFound(image_id));
    }

    info!(image_id, label = %label, "image labeled");

    Ok(Json(json!({
        "status": "success",
        "message": format!("Image {} labeled as {}", image_id, label),
    })))
}

/// GET /uploads/{filename} — raw image bytes from the blob store.
/// The name is matched literally against stored blobs; anything that does
/// not survive sanitization unchanged cannot name a stored blob and is
/// reported as missing.
pub async fn serve_image_handler(
    State(state): State<SnowgateState>,
    _session: OperatorSession,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, SnowgateError> {
    match crate::blob::BlobStore::sanitize_filename(&filename) {
        Some(safe) if safe == filename => {}
        _ => return Err(SnowgateError::FileNotFound(filename)),
    }

    let Some(bytes) = state.blobs.read(&filename)? else {
        return Err(SnowgateError::FileNotFound(filename));
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(content_type_for(&filename)),
    );
    Ok((headers, bytes))
}

fn content_type_for(filename: &str) -> &'static str {
    match filename.rsplit('.').next() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
