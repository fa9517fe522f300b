mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use udyami_core::urls::router;

use common::{register_user, test_state};

const BOUNDARY: &str = "XUDYAMIBOUNDARY";

fn multipart_text(name: &str, value: &str) -> String {
    format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
    )
}

fn multipart_file(name: &str, filename: &str, mime: &str, data: &[u8]) -> Vec<u8> {
    let mut out = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {mime}\r\n\r\n"
    )
    .into_bytes();
    out.extend_from_slice(data);
    out.extend_from_slice(b"\r\n");
    out
}

fn multipart_close() -> String {
    format!("--{BOUNDARY}--\r\n")
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_answers() {
    let state = test_state().await;
    let app = router(state);

    let resp = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn register_then_me_over_http() {
    let state = test_state().await;
    let app = router(state);

    let resp = app
        .clone()
        .oneshot(
            Request::post("/api/auth/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "name": "Wire",
                        "email": "wire@example.com",
                        "password": "secret123",
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    let token = body["token"].as_str().unwrap().to_string();
    assert!(body["user"].get("passwordHash").is_none());

    let resp = app
        .oneshot(
            Request::get("/api/auth/me")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["email"], "wire@example.com");
}

#[tokio::test]
async fn protected_routes_reject_missing_tokens() {
    let state = test_state().await;
    let app = router(state);

    let resp = app
        .oneshot(
            Request::get("/api/auth/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn product_create_over_multipart_stores_the_image() {
    let state = test_state().await;
    let (_, token) = register_user(&state, "Maker", "maker@example.com").await;
    let app = router(state);

    let mut body = Vec::new();
    body.extend_from_slice(multipart_text("name", "Bag").as_bytes());
    body.extend_from_slice(multipart_text("description", "Handwoven bag").as_bytes());
    body.extend_from_slice(multipart_text("price", "100").as_bytes());
    body.extend_from_slice(multipart_text("category", "Handcraft").as_bytes());
    body.extend(multipart_file("images", "bag.png", "image/png", b"fake png"));
    body.extend_from_slice(multipart_close().as_bytes());

    let resp = app
        .clone()
        .oneshot(
            Request::post("/api/products")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["name"], "Bag");
    let image = body["data"]["images"][0].as_str().unwrap().to_string();
    assert!(image.starts_with("/uploads/image-"));

    // the stored file is served back
    let resp = app
        .oneshot(Request::get(image.as_str()).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"fake png");
}

#[tokio::test]
async fn multipart_create_without_required_fields_is_rejected() {
    let state = test_state().await;
    let (_, token) = register_user(&state, "Maker", "maker@example.com").await;
    let app = router(state);

    let mut body = Vec::new();
    body.extend_from_slice(multipart_text("name", "Bag").as_bytes());
    body.extend_from_slice(multipart_close().as_bytes());

    let resp = app
        .oneshot(
            Request::post("/api/products")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_endpoint_rejects_disallowed_extensions() {
    let state = test_state().await;
    let (_, token) = register_user(&state, "Maker", "maker@example.com").await;
    let app = router(state);

    let mut body = Vec::new();
    body.extend(multipart_file("file", "script.exe", "image/png", b"nope"));
    body.extend_from_slice(multipart_close().as_bytes());

    let resp = app
        .oneshot(
            Request::post("/api/uploads")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn file_serving_rejects_traversal() {
    let state = test_state().await;
    let app = router(state);

    let resp = app
        .oneshot(
            Request::get("/uploads/..%2F..%2Fetc%2Fpasswd")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn public_profile_is_readable_without_auth() {
    let state = test_state().await;
    let (id, _) = register_user(&state, "Public", "public@example.com").await;
    let app = router(state);

    let resp = app
        .oneshot(
            Request::get(format!("/api/users/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["name"], "Public");
}
