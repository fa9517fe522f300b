use axum::{
    extract::{Multipart, Path, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, Set};

use crate::errors::ApiError;
use crate::models::user::Entity as User;
use crate::serializers::common::DataResp;
use crate::serializers::user_auth::{UpdateProfileReq, UserPublic};
use crate::uploads::{accept_file, UploadKind};
use crate::views::{require_owner_or_admin, user_auth::current_user};
use crate::AppState;

pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DataResp<UserPublic>>, ApiError> {
    let found = User::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(DataResp::new(found.into())))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<UpdateProfileReq>,
) -> Result<Json<DataResp<UserPublic>>, ApiError> {
    let requester = current_user(&state, &headers).await?;
    require_owner_or_admin(&requester, id, "profile")?;

    let found = User::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let mut am = found.into_active_model();
    if let Some(name) = req.name {
        let name = name.trim().to_string();
        if name.is_empty() || name.len() > 50 {
            return Err(ApiError::validation("Name must be 1-50 characters"));
        }
        am.name = Set(name);
    }
    if let Some(phone) = req.phone {
        am.phone = Set(Some(phone));
    }
    if let Some(v) = req.business_name {
        am.business_name = Set(Some(v));
    }
    if let Some(v) = req.business_type {
        am.business_type = Set(Some(v));
    }
    if let Some(v) = req.location {
        am.location = Set(Some(v));
    }
    if let Some(v) = req.business_size {
        am.business_size = Set(Some(v));
    }
    if let Some(v) = req.language {
        am.language = Set(v);
    }
    am.updated_at = Set(Utc::now());

    let updated = am.update(&state.db).await?;
    Ok(Json(DataResp::new(updated.into())))
}

/// Replaces the caller's profile picture with an uploaded image.
pub async fn upload_photo(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<DataResp<UserPublic>>, ApiError> {
    let requester = current_user(&state, &headers).await?;

    let mut stored: Option<String> = None;
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
        stored = Some(
            accept_file(
                &state.upload_cfg,
                UploadKind::ProfilePicture,
                &filename,
                content_type.as_deref(),
                &data,
            )
            .await?,
        );
        break;
    }

    let path = stored.ok_or_else(|| ApiError::validation("No file was provided"))?;

    let mut am = requester.into_active_model();
    am.profile_picture = Set(Some(path));
    am.updated_at = Set(Utc::now());
    let updated = am.update(&state.db).await?;
    Ok(Json(DataResp::new(updated.into())))
}
