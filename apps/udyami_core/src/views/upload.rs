use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::errors::ApiError;
use crate::serializers::common::DataResp;
use crate::serializers::upload::{UploadOut, UploadQuery};
use crate::uploads::{accept_file, UploadKind};
use crate::views::user_auth::current_user;
use crate::AppState;

/// Generic authenticated upload; the stored path comes back to the client.
pub async fn upload(
    State(state): State<AppState>,
    Query(q): Query<UploadQuery>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<DataResp<UploadOut>>), ApiError> {
    current_user(&state, &headers).await?;

    let kind = match q.kind.as_deref() {
        None => UploadKind::Image,
        Some(s) => UploadKind::parse(s)
            .ok_or_else(|| ApiError::validation(format!("Unknown upload kind '{s}'")))?,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("malformed multipart body: {e}")))?
    {
        let Some(filename) = field.file_name().map(|s| s.to_string()) else {
            continue;
        };
        let content_type = field.content_type().map(|s| s.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(format!("failed to read file: {e}")))?;

        let path = accept_file(
            &state.upload_cfg,
            kind,
            &filename,
            content_type.as_deref(),
            &data,
        )
        .await?;
        return Ok((StatusCode::CREATED, Json(DataResp::new(UploadOut { path }))));
    }

    Err(ApiError::validation("No file was provided"))
}

fn content_type_for(name: &str) -> &'static str {
    match name.rsplit('.').next() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("csv") => "text/csv",
        _ => "application/octet-stream",
    }
}

/// Serves a stored file back. The filename is a single path segment; any
/// traversal characters are rejected outright.
pub async fn serve(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if file.contains('/') || file.contains('\\') || file.contains("..") {
        return Err(ApiError::not_found("File not found"));
    }

    let bytes = tokio::fs::read(state.upload_cfg.dir.join(&file))
        .await
        .map_err(|_| ApiError::not_found("File not found"))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type_for(&file))],
        bytes,
    ))
}
