use axum::{
    routing::{get, post, put},
    Json, Router,
};

use crate::views::{community, course, product, upload, user_auth, users};
use crate::AppState;

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // auth
        .route("/api/auth/register", post(user_auth::register))
        .route("/api/auth/login", post(user_auth::login))
        .route("/api/auth/me", get(user_auth::me))
        .route("/api/auth/updatepassword", put(user_auth::update_password))
        // users
        .route("/api/users/me/photo", post(users::upload_photo))
        .route("/api/users/:id", get(users::get_profile).put(users::update_profile))
        // marketplace
        .route("/api/products", get(product::list).post(product::create))
        .route(
            "/api/products/:id",
            get(product::get).put(product::update).delete(product::remove),
        )
        .route("/api/products/:id/reviews", post(product::add_review))
        // learning
        .route("/api/learning/courses", get(course::list).post(course::create))
        .route(
            "/api/learning/courses/:id",
            get(course::get).put(course::update).delete(course::remove),
        )
        .route("/api/learning/courses/:id/enroll", post(course::enroll))
        .route("/api/learning/courses/:id/progress", get(course::progress))
        .route(
            "/api/learning/courses/:id/lessons/:lesson_id/complete",
            post(course::complete_lesson),
        )
        // community
        .route(
            "/api/community/posts",
            get(community::list).post(community::create),
        )
        .route(
            "/api/community/posts/:id",
            get(community::get)
                .put(community::update)
                .delete(community::remove),
        )
        .route("/api/community/posts/:id/like", post(community::like))
        .route(
            "/api/community/posts/:id/comments",
            post(community::add_comment),
        )
        // files
        .route("/api/uploads", post(upload::upload))
        .route("/uploads/:file", get(upload::serve))
        .with_state(state)
}
