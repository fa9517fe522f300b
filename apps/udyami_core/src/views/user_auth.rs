use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, Set};

use crate::errors::{on_unique_violation, ApiError};
use crate::models::user::{self, Entity as User, Role};
use crate::serializers::common::DataResp;
use crate::serializers::user_auth::{
    AuthResp, Claims, LoginReq, RegisterReq, UpdatePasswordReq, UserPublic,
};
use crate::AppState;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

// ---------- handlers ----------
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterReq>,
) -> Result<(StatusCode, Json<AuthResp>), ApiError> {
    let name = req.name.trim();
    if name.is_empty() || name.len() > 50 {
        return Err(ApiError::validation("Name must be 1-50 characters"));
    }
    if !req.email.contains('@') || req.email.trim().is_empty() {
        return Err(ApiError::validation("A valid email is required"));
    }
    if req.password.len() < 6 {
        return Err(ApiError::validation(
            "Password must be at least 6 characters",
        ));
    }

    let now = Utc::now();
    let hash = hash_password(&req.password)?;

    let created = user::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
        email: Set(req.email.trim().to_lowercase()),
        password_hash: Set(hash),
        phone: Set(req.phone),
        role: Set(Role::User),
        business_name: Set(req.business_name),
        business_type: Set(req.business_type),
        location: Set(req.location),
        business_size: Set(req.business_size),
        profile_picture: Set(None),
        language: Set(req.language.unwrap_or_else(|| "en".to_string())),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await
    .map_err(|e| {
        on_unique_violation(
            e,
            ApiError::conflict("An account with this email already exists"),
        )
    })?;

    let token = issue_token(&created, &state)?;
    Ok((StatusCode::CREATED, Json(AuthResp::new(created, token))))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginReq>,
) -> Result<Json<AuthResp>, ApiError> {
    let Some(found) = User::find()
        .filter(user::Column::Email.eq(req.email.trim().to_lowercase()))
        .one(&state.db)
        .await?
    else {
        return Err(ApiError::unauthorized("Invalid credentials"));
    };

    if !verify_password(&found.password_hash, &req.password)? {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = issue_token(&found, &state)?;
    Ok(Json(AuthResp::new(found, token)))
}

pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DataResp<UserPublic>>, ApiError> {
    let found = current_user(&state, &headers).await?;
    Ok(Json(DataResp::new(found.into())))
}

pub async fn update_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<UpdatePasswordReq>,
) -> Result<Json<AuthResp>, ApiError> {
    let found = current_user(&state, &headers).await?;

    if !verify_password(&found.password_hash, &req.current_password)? {
        return Err(ApiError::unauthorized("Current password is incorrect"));
    }
    if req.new_password.len() < 6 {
        return Err(ApiError::validation(
            "Password must be at least 6 characters",
        ));
    }

    let mut am = found.into_active_model();
    am.password_hash = Set(hash_password(&req.new_password)?);
    am.updated_at = Set(Utc::now());
    let updated = am.update(&state.db).await?;

    let token = issue_token(&updated, &state)?;
    Ok(Json(AuthResp::new(updated, token)))
}

// ---------- password hashing ----------
pub(crate) fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;
    Ok(phc.to_string())
}

pub(crate) fn verify_password(phc: &str, password: &str) -> Result<bool, ApiError> {
    let parsed =
        PasswordHash::new(phc).map_err(|e| anyhow::anyhow!("stored hash is malformed: {e}"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

// ---------- jwt helpers ----------
const ISSUER: &str = "udyami";
const AUDIENCE: &str = "udyami-app";

pub(crate) fn issue_token(user: &user::Model, state: &AppState) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id,
        role: user.role,
        token_type: "access".to_string(),
        iat: now.timestamp(),
        exp: (now + state.jwt_cfg.token_ttl).timestamp(),
        iss: ISSUER.to_string(),
        aud: AUDIENCE.to_string(),
    };
    jsonwebtoken::encode(&JwtHeader::new(Algorithm::HS256), &claims, &state.jwt_enc)
        .map_err(|e| anyhow::Error::from(e).into())
}

fn decode_validated(token: &str, state: &AppState) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut v = Validation::new(Algorithm::HS256);
    v.validate_exp = true;
    v.set_audience(&[AUDIENCE]);
    v.set_issuer(&[ISSUER]);
    jsonwebtoken::decode::<Claims>(token, &state.jwt_dec, &v).map(|d| d.claims)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Resolves the Authorization header to a live user row.
pub(crate) async fn current_user(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<user::Model, ApiError> {
    let token = bearer_token(headers).ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;
    let claims = decode_validated(token, state).map_err(|e| {
        if matches!(e.kind(), jsonwebtoken::errors::ErrorKind::ExpiredSignature) {
            ApiError::unauthorized("Token has expired")
        } else {
            ApiError::unauthorized("Invalid token")
        }
    })?;

    User::find_by_id(claims.sub)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User no longer exists"))
}
