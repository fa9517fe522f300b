use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::Json;
use chrono::Duration as ChronoDuration;
use sea_orm::{ConnectOptions, Database};
use uuid::Uuid;

use udyami_core::serializers::user_auth::RegisterReq;
use udyami_core::uploads::UploadCfg;
use udyami_core::views::user_auth::register;
use udyami_core::{ensure_schema, AppState, JwtCfg};

/// Fresh in-memory database plus a throwaway upload directory. A single
/// connection keeps every query on the same sqlite memory instance.
pub async fn test_state() -> AppState {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await.unwrap();
    ensure_schema(&db).await.unwrap();

    let dir = std::env::temp_dir().join(format!("udyami-test-{}", Uuid::new_v4().simple()));
    let upload_cfg = UploadCfg { dir };

    AppState::new(
        db,
        "test-secret",
        JwtCfg {
            token_ttl: ChronoDuration::hours(1),
        },
        upload_cfg,
    )
}

/// Registers a user and returns (id, bearer token).
pub async fn register_user(state: &AppState, name: &str, email: &str) -> (i64, String) {
    let (_, Json(resp)) = register(
        State(state.clone()),
        Json(RegisterReq {
            name: name.to_string(),
            email: email.to_string(),
            password: "secret123".to_string(),
            phone: None,
            business_name: None,
            business_type: None,
            location: None,
            business_size: None,
            language: None,
        }),
    )
    .await
    .unwrap();
    (resp.user.id, resp.token)
}

pub fn auth_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    headers
}
