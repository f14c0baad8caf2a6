//! Upload handler.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::debug;

use vboost_models::{normalize_broll, ProcessResponse};

use crate::auth::BearerToken;
use crate::error::{ApiError, ApiResult};
use crate::services::{UploadInput, UploadService};
use crate::state::AppState;

/// `POST /api/process` (multipart: `file`, optional `broll`)
pub async fn process_video(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ProcessResponse>> {
    let multipart =
        multipart.map_err(|e| ApiError::missing_input(format!("Invalid upload: {}", e.body_text())))?;
    let input = read_upload(multipart).await?;

    let response = UploadService::new(&state)
        .process_upload(input, token.as_deref())
        .await?;

    Ok(Json(response))
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::missing_input(format!("Invalid upload: {}", e.body_text()))
    }
}

/// Read the `file` and `broll` fields; other fields are ignored.
pub async fn read_upload(mut multipart: Multipart) -> ApiResult<UploadInput> {
    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;
    let mut broll: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some((file_name, content_type, bytes.to_vec()));
            }
            Some("broll") => {
                broll = Some(field.text().await.map_err(multipart_error)?);
            }
            other => debug!(field = ?other, "Ignoring multipart field"),
        }
    }

    let (file_name, content_type, bytes) =
        file.ok_or_else(|| ApiError::missing_input("No file uploaded"))?;

    if file_name.is_empty() && bytes.is_empty() {
        return Err(ApiError::missing_input("No file uploaded"));
    }

    Ok(UploadInput {
        file_name,
        content_type,
        bytes,
        broll: normalize_broll(broll.as_deref()),
    })
}
