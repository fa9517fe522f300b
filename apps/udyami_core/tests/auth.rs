mod common;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use udyami_core::errors::ApiError;
use udyami_core::models::user::Role;
use udyami_core::serializers::user_auth::{LoginReq, RegisterReq, UpdatePasswordReq};
use udyami_core::views::user_auth::{login, me, register, update_password};

use common::{auth_headers, register_user, test_state};

fn register_req(name: &str, email: &str, password: &str) -> RegisterReq {
    serde_json::from_value(serde_json::json!({
        "name": name,
        "email": email,
        "password": password,
    }))
    .unwrap()
}

#[tokio::test]
async fn register_login_me_roundtrip() {
    let state = test_state().await;

    let (status, Json(resp)) = register(
        State(state.clone()),
        Json(register_req("Asha", "asha@example.com", "secret123")),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(resp.user.role, Role::User);

    let Json(login_resp) = login(
        State(state.clone()),
        Json(LoginReq {
            email: "asha@example.com".to_string(),
            password: "secret123".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(login_resp.user.email, "asha@example.com");

    let Json(me_resp) = me(State(state.clone()), auth_headers(&login_resp.token))
        .await
        .unwrap();
    assert_eq!(me_resp.data.id, resp.user.id);
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let state = test_state().await;
    register_user(&state, "First", "dup@example.com").await;

    let err = register(
        State(state.clone()),
        Json(register_req("Second", "dup@example.com", "secret123")),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));
}

#[tokio::test]
async fn emails_are_matched_case_insensitively() {
    let state = test_state().await;
    register_user(&state, "Casey", "casey@example.com").await;

    let err = register(
        State(state.clone()),
        Json(register_req("Casey Again", "CASEY@example.com", "secret123")),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let state = test_state().await;
    register_user(&state, "Bolu", "bolu@example.com").await;

    let err = login(
        State(state.clone()),
        Json(LoginReq {
            email: "bolu@example.com".to_string(),
            password: "wrongpass".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
}

#[tokio::test]
async fn short_passwords_are_rejected() {
    let state = test_state().await;
    let err = register(
        State(state.clone()),
        Json(register_req("Tiny", "tiny@example.com", "12345")),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn password_change_invalidates_the_old_one() {
    let state = test_state().await;
    let (_, token) = register_user(&state, "Rotate", "rotate@example.com").await;

    let Json(resp) = update_password(
        State(state.clone()),
        auth_headers(&token),
        Json(UpdatePasswordReq {
            current_password: "secret123".to_string(),
            new_password: "evenmoresecret".to_string(),
        }),
    )
    .await
    .unwrap();
    assert!(!resp.token.is_empty());

    let err = login(
        State(state.clone()),
        Json(LoginReq {
            email: "rotate@example.com".to_string(),
            password: "secret123".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));

    login(
        State(state.clone()),
        Json(LoginReq {
            email: "rotate@example.com".to_string(),
            password: "evenmoresecret".to_string(),
        }),
    )
    .await
    .unwrap();

    // there is no revocation list: a token issued before the change
    // keeps working until it expires
    let Json(me_resp) = me(State(state), auth_headers(&token)).await.unwrap();
    assert_eq!(me_resp.data.email, "rotate@example.com");
}

#[tokio::test]
async fn me_requires_a_token() {
    let state = test_state().await;
    let err = me(State(state), axum::http::HeaderMap::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
}
