use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;
use tracing::info;

use crate::blob::BlobStore;
use crate::error::SnowgateError;
use crate::middleware::RequireDeviceKey;
use crate::router::SnowgateState;

/// POST /api/upload — receives an image from a device.
///
/// The multipart payload must contain a `file` part with a filename; an
/// optional `device_id` text part tags the originating camera. The blob is
/// written first, then the row inserted; the two are not transactional, so
/// a crash in between can orphan a file on disk.
pub async fn upload_handler(
    State(state): State<SnowgateState>,
    _key: RequireDeviceKey,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, SnowgateError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut device_id: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_owned();
                let bytes = field.bytes().await?;
                upload = Some((filename, bytes.to_vec()));
            }
            Some("device_id") => {
                device_id = Some(field.text().await?);
            }
            _ => {}
        }
    }

    let Some((raw_filename, bytes)) = upload else {
        return Err(SnowgateError::BadRequest(
            "No file part in request".to_string(),
        ));
    };
    if raw_filename.is_empty() {
        return Err(SnowgateError::BadRequest("No selected file".to_string()));
    }
    let Some(filename) = BlobStore::sanitize_filename(&raw_filename) else {
        return Err(SnowgateError::BadRequest(format!(
            "Unusable filename {:?}",
            raw_filename
        )));
    };

    state.blobs.write(&filename, &bytes)?;

    let device_id = device_id.unwrap_or_else(|| "unknown".to_string());
    let image_id = state
        .records
        .insert_image(&filename, &device_id, Utc::now())
        .await?;

    info!(image_id, %filename, %device_id, size = bytes.len(), "stored upload");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "File uploaded successfully",
            "filename": filename,
        })),
    ))
}
