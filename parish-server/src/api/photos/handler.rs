use axum::{
    Json,
    body::Bytes,
    extract::{Extension, Multipart, Path, State},
    response::IntoResponse,
};
use http::{StatusCode, header};
use serde::Serialize;
use shared::ApiResponse;

use crate::api::convert::photo_url;
use crate::auth::AdminSession;
use crate::core::ServerState;
use crate::utils::{AppError, AppResult, blocking, ok};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Value to put in a member's `photo` field
    pub reference: String,
    pub original_name: String,
    pub size: usize,
    pub url: String,
}

/// POST /api/photos
pub async fn upload(
    State(state): State<ServerState>,
    Extension(session): Extension<AdminSession>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<UploadResponse>>> {
    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let original_name = field.file_name().unwrap_or_default().to_string();
            upload = Some((original_name, field.bytes().await?));
            break;
        }
    }

    let (original_name, data) =
        upload.ok_or_else(|| AppError::invalid("Missing multipart field 'file'"))?;
    let size = data.len();

    let name = original_name.clone();
    let reference = blocking(move || Ok(state.photos.store(&data, &name)?)).await?;

    tracing::info!(
        reference = %reference,
        operator = %session.subject,
        size,
        "Photo uploaded"
    );

    Ok(ok(UploadResponse {
        url: photo_url(&reference),
        reference,
        original_name,
        size,
    }))
}

/// GET /api/photos/{reference}
pub async fn serve(
    State(state): State<ServerState>,
    Path(reference): Path<String>,
) -> AppResult<impl IntoResponse> {
    let lookup = reference.clone();
    let content = blocking(move || Ok(state.photos.read(&lookup)?))
        .await?
        .ok_or_else(|| AppError::not_found(format!("Photo {}", reference)))?;

    let mime = mime_guess::from_path(&reference).first_or_octet_stream();
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, mime.to_string())],
        content,
    ))
}
