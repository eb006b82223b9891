//! Media upload endpoint.
//!
//! Accepts multipart form data and proxies each photo or video straight to
//! the CDN. Per-file failures are reported in the response body instead of
//! failing the whole batch.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use serde::Serialize;

use crate::AppState;
use crate::api::require_couple;
use crate::media::{MAX_FILE_SIZE, MAX_FILES, MAX_TOTAL_SIZE, ResourceKind, UploadedMedia};
use crate::security::UserContext;

/// Response for the media upload endpoint.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Successfully stored files.
    pub files: Vec<UploadedMedia>,
    /// Any errors encountered during upload.
    pub errors: Vec<String>,
}

struct StagedFile {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// `POST /api/uploads` - Store photos and videos on the CDN.
pub async fn upload_media(
    State(state): State<AppState>,
    user: UserContext,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, (StatusCode, String)> {
    require_couple(&state, &user).await?;

    if !state.media.is_configured() {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "Media storage not configured".to_string(),
        ));
    }

    let mut staged: Vec<StagedFile> = Vec::new();
    let mut errors: Vec<String> = Vec::new();
    let mut total_size: usize = 0;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Failed to read multipart field: {e}")))?
    {
        if staged.len() >= MAX_FILES {
            errors.push(format!("Maximum file count ({MAX_FILES}) exceeded"));
            break;
        }

        let filename = field
            .file_name()
            .map(ToString::to_string)
            .unwrap_or_else(|| format!("file_{}", uuid::Uuid::new_v4()));

        // Declared type first, filename sniff as a fallback.
        let content_type = field.content_type().map_or_else(
            || {
                mime_guess::from_path(&filename)
                    .first_or_octet_stream()
                    .to_string()
            },
            ToString::to_string,
        );

        if ResourceKind::from_content_type(&content_type).is_err() {
            errors.push(format!(
                "File '{filename}' has unsupported type: {content_type}"
            ));
            continue;
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("Failed to read file '{filename}': {e}")))?;
        let size = data.len();

        if size > MAX_FILE_SIZE {
            errors.push(format!(
                "File '{}' exceeds max size ({}MB > {}MB)",
                filename,
                size / (1024 * 1024),
                MAX_FILE_SIZE / (1024 * 1024)
            ));
            continue;
        }
        if total_size + size > MAX_TOTAL_SIZE {
            errors.push(format!(
                "Total upload size would exceed limit ({}MB)",
                MAX_TOTAL_SIZE / (1024 * 1024)
            ));
            break;
        }
        total_size += size;

        staged.push(StagedFile {
            filename,
            content_type,
            bytes: data.to_vec(),
        });
    }

    let uploads = staged.into_iter().map(|file| {
        let media = Arc::clone(&state.media);
        async move {
            let result = media
                .upload(&file.filename, &file.content_type, file.bytes)
                .await;
            (file.filename, result)
        }
    });

    let mut files = Vec::new();
    for (filename, result) in futures::future::join_all(uploads).await {
        match result {
            Ok(stored) => {
                tracing::info!(
                    filename = %filename,
                    public_id = %stored.public_id,
                    "media stored"
                );
                files.push(stored);
            }
            Err(e) => errors.push(format!("File '{filename}': {e}")),
        }
    }

    Ok(Json(UploadResponse { files, errors }))
}
