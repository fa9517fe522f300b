mod common;

use axum::extract::{Path, Query, State};
use axum::Json;

use udyami_core::errors::ApiError;
use udyami_core::serializers::community::{
    CreateCommentReq, CreatePostReq, PostListQuery, UpdatePostReq,
};
use udyami_core::views::community::{add_comment, create, get, like, list, remove, update};
use udyami_core::AppState;

use common::{auth_headers, register_user, test_state};

async fn seed_post(state: &AppState, token: &str, title: &str) -> i64 {
    let req: CreatePostReq = serde_json::from_value(serde_json::json!({
        "title": title,
        "content": "some content",
        "category": "Networking",
    }))
    .unwrap();
    let (_, Json(resp)) = create(State(state.clone()), auth_headers(token), Json(req))
        .await
        .unwrap();
    resp.data.id
}

#[tokio::test]
async fn post_crud_roundtrip() {
    let state = test_state().await;
    let (_, token) = register_user(&state, "Poster", "poster@example.com").await;
    let pid = seed_post(&state, &token, "Looking for suppliers").await;

    let req: UpdatePostReq =
        serde_json::from_value(serde_json::json!({ "title": "Found suppliers" })).unwrap();
    let Json(updated) = update(
        State(state.clone()),
        Path(pid),
        auth_headers(&token),
        Json(req),
    )
    .await
    .unwrap();
    assert_eq!(updated.data.title, "Found suppliers");

    remove(State(state.clone()), Path(pid), auth_headers(&token))
        .await
        .unwrap();
    let err = get(State(state.clone()), Path(pid)).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn listing_filters_by_category_and_counts() {
    let state = test_state().await;
    let (author_id, token) = register_user(&state, "Poster", "poster@example.com").await;
    seed_post(&state, &token, "First").await;
    seed_post(&state, &token, "Second").await;

    let q: PostListQuery =
        serde_json::from_value(serde_json::json!({ "author": author_id })).unwrap();
    let Json(page) = list(State(state.clone()), Query(q)).await.unwrap();
    assert_eq!(page.count, 2);
    assert_eq!(page.data[0].author.as_ref().unwrap().name, "Poster");
}

#[tokio::test]
async fn like_toggles_and_never_double_counts() {
    let state = test_state().await;
    let (_, author) = register_user(&state, "Poster", "poster@example.com").await;
    let (_, fan) = register_user(&state, "Fan", "fan@example.com").await;
    let pid = seed_post(&state, &author, "Like me").await;

    let Json(first) = like(State(state.clone()), Path(pid), auth_headers(&fan))
        .await
        .unwrap();
    assert!(first.data.liked);
    assert_eq!(first.data.likes, 1);

    let Json(second) = like(State(state.clone()), Path(pid), auth_headers(&fan))
        .await
        .unwrap();
    assert!(!second.data.liked);
    assert_eq!(second.data.likes, 0);

    let Json(third) = like(State(state.clone()), Path(pid), auth_headers(&fan))
        .await
        .unwrap();
    assert!(third.data.liked);
    assert_eq!(third.data.likes, 1);
}

#[tokio::test]
async fn comments_carry_their_author() {
    let state = test_state().await;
    let (_, author) = register_user(&state, "Poster", "poster@example.com").await;
    let (_, commenter) = register_user(&state, "Commenter", "c@example.com").await;
    let pid = seed_post(&state, &author, "Discuss").await;

    add_comment(
        State(state.clone()),
        Path(pid),
        auth_headers(&commenter),
        Json(CreateCommentReq {
            content: "Great question".to_string(),
        }),
    )
    .await
    .unwrap();

    let Json(detail) = get(State(state.clone()), Path(pid)).await.unwrap();
    assert_eq!(detail.data.post.comments, 1);
    assert_eq!(detail.data.comment_list.len(), 1);
    assert_eq!(
        detail.data.comment_list[0].author.as_ref().unwrap().name,
        "Commenter"
    );
}

#[tokio::test]
async fn strangers_cannot_edit_posts() {
    let state = test_state().await;
    let (_, author) = register_user(&state, "Poster", "poster@example.com").await;
    let (_, stranger) = register_user(&state, "Stranger", "s@example.com").await;
    let pid = seed_post(&state, &author, "Mine").await;

    let req: UpdatePostReq =
        serde_json::from_value(serde_json::json!({ "title": "Hijacked" })).unwrap();
    let err = update(
        State(state.clone()),
        Path(pid),
        auth_headers(&stranger),
        Json(req),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[tokio::test]
async fn empty_comment_is_rejected() {
    let state = test_state().await;
    let (_, author) = register_user(&state, "Poster", "poster@example.com").await;
    let pid = seed_post(&state, &author, "Discuss").await;

    let err = add_comment(
        State(state.clone()),
        Path(pid),
        auth_headers(&author),
        Json(CreateCommentReq {
            content: "   ".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}
