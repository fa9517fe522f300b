mod common;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

use udyami_core::errors::ApiError;
use udyami_core::models::product::{self, Category, Entity as Product};
use udyami_core::serializers::product::{CreateReviewReq, ProductListQuery};
use udyami_core::views::product::{add_review, get, list, remove};
use udyami_core::AppState;

use common::{auth_headers, register_user, test_state};

async fn seed_product(state: &AppState, seller_id: i64, name: &str, price: f64, cat: Category) -> i64 {
    let now = Utc::now();
    let created = product::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
        description: Set(format!("{name} description")),
        price: Set(price),
        category: Set(cat),
        images: Set(serde_json::json!([])),
        seller_id: Set(seller_id),
        stock: Set(5),
        num_reviews: Set(0),
        average_rating: Set(0.0),
        is_featured: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await
    .unwrap();
    created.id
}

fn query(v: serde_json::Value) -> Query<ProductListQuery> {
    Query(serde_json::from_value(v).unwrap())
}

#[tokio::test]
async fn category_filter_includes_seller_details() {
    let state = test_state().await;
    let (seller, _) = register_user(&state, "Maker", "maker@example.com").await;
    seed_product(&state, seller, "Bag", 100.0, Category::Handcraft).await;
    seed_product(&state, seller, "Laptop", 900.0, Category::Technology).await;

    let Json(page) = list(
        State(state.clone()),
        query(serde_json::json!({ "category": "Handcraft" })),
    )
    .await
    .unwrap();

    assert_eq!(page.count, 1);
    assert_eq!(page.data[0].name, "Bag");
    let s = page.data[0].seller.as_ref().unwrap();
    assert_eq!(s.name, "Maker");
}

#[tokio::test]
async fn price_range_and_keyword_narrow_the_listing() {
    let state = test_state().await;
    let (seller, _) = register_user(&state, "Maker", "maker@example.com").await;
    seed_product(&state, seller, "Woven basket", 40.0, Category::Handcraft).await;
    seed_product(&state, seller, "Woven rug", 250.0, Category::Handcraft).await;
    seed_product(&state, seller, "Honey jar", 60.0, Category::Food).await;

    let Json(page) = list(
        State(state.clone()),
        query(serde_json::json!({ "keyword": "WOVEN", "minPrice": 30, "maxPrice": 100 })),
    )
    .await
    .unwrap();

    assert_eq!(page.count, 1);
    assert_eq!(page.data[0].name, "Woven basket");
}

#[tokio::test]
async fn pagination_reports_totals_and_clamps_pages() {
    let state = test_state().await;
    let (seller, _) = register_user(&state, "Maker", "maker@example.com").await;
    for i in 0..25 {
        seed_product(&state, seller, &format!("Item {i}"), 10.0, Category::Other).await;
    }

    let Json(page) = list(
        State(state.clone()),
        query(serde_json::json!({ "page": 3, "limit": 10 })),
    )
    .await
    .unwrap();
    assert_eq!(page.total, 25);
    assert_eq!(page.count, 5);
    assert_eq!(page.pagination.current, 3);
    assert_eq!(page.pagination.total, 3);

    // page 0 is treated as page 1
    let Json(first) = list(
        State(state.clone()),
        query(serde_json::json!({ "page": 0, "limit": 10 })),
    )
    .await
    .unwrap();
    assert_eq!(first.pagination.current, 1);
    assert_eq!(first.count, 10);
}

#[tokio::test]
async fn extreme_page_numbers_return_an_empty_page() {
    let state = test_state().await;
    let (seller, _) = register_user(&state, "Maker", "maker@example.com").await;
    for i in 0..3 {
        seed_product(&state, seller, &format!("Item {i}"), 10.0, Category::Other).await;
    }

    let Json(page) = list(
        State(state.clone()),
        query(serde_json::json!({ "page": u64::MAX, "limit": 10 })),
    )
    .await
    .unwrap();
    assert_eq!(page.count, 0);
    assert_eq!(page.total, 3);
    assert_eq!(page.pagination.current, u64::MAX);
}

#[tokio::test]
async fn keyword_wildcards_match_literally() {
    let state = test_state().await;
    let (seller, _) = register_user(&state, "Maker", "maker@example.com").await;
    seed_product(&state, seller, "50% wool scarf", 30.0, Category::Textiles).await;
    seed_product(&state, seller, "Laptop", 900.0, Category::Technology).await;

    let Json(page) = list(
        State(state.clone()),
        query(serde_json::json!({ "keyword": "50%" })),
    )
    .await
    .unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.data[0].name, "50% wool scarf");

    // "_" must not act as a single-character wildcard
    let Json(page) = list(
        State(state.clone()),
        query(serde_json::json!({ "keyword": "L_ptop" })),
    )
    .await
    .unwrap();
    assert_eq!(page.count, 0);
}

#[tokio::test]
async fn sorting_by_price_ascending() {
    let state = test_state().await;
    let (seller, _) = register_user(&state, "Maker", "maker@example.com").await;
    seed_product(&state, seller, "Mid", 50.0, Category::Other).await;
    seed_product(&state, seller, "Cheap", 10.0, Category::Other).await;
    seed_product(&state, seller, "Dear", 90.0, Category::Other).await;

    let Json(page) = list(
        State(state.clone()),
        query(serde_json::json!({ "sortBy": "price", "sortDir": "asc" })),
    )
    .await
    .unwrap();
    let prices: Vec<f64> = page.data.iter().map(|p| p.price).collect();
    assert_eq!(prices, vec![10.0, 50.0, 90.0]);
}

#[tokio::test]
async fn review_updates_the_running_average() {
    let state = test_state().await;
    let (seller, _) = register_user(&state, "Maker", "maker@example.com").await;
    let (_, buyer_a) = register_user(&state, "Buyer A", "a@example.com").await;
    let (_, buyer_b) = register_user(&state, "Buyer B", "b@example.com").await;
    let pid = seed_product(&state, seller, "Bag", 100.0, Category::Handcraft).await;

    add_review(
        State(state.clone()),
        Path(pid),
        auth_headers(&buyer_a),
        Json(CreateReviewReq { rating: 5, comment: "great".into() }),
    )
    .await
    .unwrap();
    add_review(
        State(state.clone()),
        Path(pid),
        auth_headers(&buyer_b),
        Json(CreateReviewReq { rating: 2, comment: "okay".into() }),
    )
    .await
    .unwrap();

    let Json(detail) = get(State(state.clone()), Path(pid)).await.unwrap();
    assert_eq!(detail.data.product.num_reviews, 2);
    assert!((detail.data.product.average_rating - 3.5).abs() < f64::EPSILON);
    assert_eq!(detail.data.reviews.len(), 2);
}

#[tokio::test]
async fn second_review_from_the_same_user_conflicts() {
    let state = test_state().await;
    let (seller, _) = register_user(&state, "Maker", "maker@example.com").await;
    let (_, buyer) = register_user(&state, "Buyer", "buyer@example.com").await;
    let pid = seed_product(&state, seller, "Bag", 100.0, Category::Handcraft).await;

    add_review(
        State(state.clone()),
        Path(pid),
        auth_headers(&buyer),
        Json(CreateReviewReq { rating: 4, comment: "nice".into() }),
    )
    .await
    .unwrap();

    let err = add_review(
        State(state.clone()),
        Path(pid),
        auth_headers(&buyer),
        Json(CreateReviewReq { rating: 1, comment: "changed my mind".into() }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));

    // the failed attempt must not touch the aggregates
    let Json(detail) = get(State(state.clone()), Path(pid)).await.unwrap();
    assert_eq!(detail.data.product.num_reviews, 1);
    assert!((detail.data.product.average_rating - 4.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn out_of_range_rating_is_rejected() {
    let state = test_state().await;
    let (seller, _) = register_user(&state, "Maker", "maker@example.com").await;
    let (_, buyer) = register_user(&state, "Buyer", "buyer@example.com").await;
    let pid = seed_product(&state, seller, "Bag", 100.0, Category::Handcraft).await;

    let err = add_review(
        State(state.clone()),
        Path(pid),
        auth_headers(&buyer),
        Json(CreateReviewReq { rating: 6, comment: "!".into() }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn only_the_owner_or_admin_may_delete() {
    let state = test_state().await;
    let (seller, seller_token) = register_user(&state, "Maker", "maker@example.com").await;
    let (_, stranger) = register_user(&state, "Stranger", "x@example.com").await;
    let pid = seed_product(&state, seller, "Bag", 100.0, Category::Handcraft).await;

    let err = remove(State(state.clone()), Path(pid), auth_headers(&stranger))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
    assert!(Product::find_by_id(pid).one(&state.db).await.unwrap().is_some());

    remove(State(state.clone()), Path(pid), auth_headers(&seller_token))
        .await
        .unwrap();
    assert!(Product::find_by_id(pid).one(&state.db).await.unwrap().is_none());
}

#[tokio::test]
async fn missing_product_is_a_404() {
    let state = test_state().await;
    let err = get(State(state.clone()), Path(999)).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}
