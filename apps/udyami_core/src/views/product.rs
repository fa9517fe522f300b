use axum::{
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::errors::{on_unique_violation, ApiError};
use crate::models::{
    product::{self, Category, Entity as Product},
    review::{self, Entity as Review},
    user::Entity as User,
};
use crate::serializers::common::{DataResp, MessageResp, Paginated};
use crate::serializers::product::{
    CreateReviewReq, ProductDetailOut, ProductForm, ProductListQuery, ProductOut, ReviewOut,
};
use crate::uploads::{accept_file, UploadKind};
use crate::views::{like_pattern, page_offset, require_owner_or_admin, user_auth::current_user};
use crate::AppState;

const MAX_PAGE_SIZE: u64 = 100;

// ---------- listing ----------

fn list_filter(q: &ProductListQuery) -> Condition {
    let mut cond = Condition::all();
    if let Some(cat) = q.category {
        cond = cond.add(product::Column::Category.eq(cat));
    }
    if let Some(min) = q.min_price {
        cond = cond.add(product::Column::Price.gte(min));
    }
    if let Some(max) = q.max_price {
        cond = cond.add(product::Column::Price.lte(max));
    }
    if let Some(seller) = q.seller {
        cond = cond.add(product::Column::SellerId.eq(seller));
    }
    if let Some(kw) = q.keyword.as_deref().filter(|s| !s.trim().is_empty()) {
        let needle = like_pattern(kw.trim());
        // LOWER() on both sides keeps the match case-insensitive on
        // sqlite and postgres alike
        cond = cond.add(
            Condition::any()
                .add(
                    Expr::expr(Func::lower(Expr::col((
                        product::Entity,
                        product::Column::Name,
                    ))))
                    .like(needle.clone()),
                )
                .add(
                    Expr::expr(Func::lower(Expr::col((
                        product::Entity,
                        product::Column::Description,
                    ))))
                        .like(needle),
                ),
        );
    }
    cond
}

fn order_column(sort_by: Option<&str>) -> product::Column {
    // whitelist: anything unrecognized falls back to newest-first
    match sort_by {
        Some("price") => product::Column::Price,
        Some("name") => product::Column::Name,
        Some("averageRating") => product::Column::AverageRating,
        _ => product::Column::CreatedAt,
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<ProductListQuery>,
) -> Result<Json<Paginated<ProductOut>>, ApiError> {
    let page = q.page.unwrap_or(1).max(1);
    let limit = q.limit.unwrap_or(10).clamp(1, MAX_PAGE_SIZE);
    let cond = list_filter(&q);

    let order = if q.sort_dir.as_deref() == Some("asc") {
        Order::Asc
    } else {
        Order::Desc
    };

    let total = Product::find().filter(cond.clone()).count(&state.db).await?;

    let rows = Product::find()
        .filter(cond)
        .find_also_related(User)
        .order_by(order_column(q.sort_by.as_deref()), order)
        .offset(page_offset(page, limit))
        .limit(limit)
        .all(&state.db)
        .await?;

    let data = rows
        .into_iter()
        .map(|(p, seller)| ProductOut::from_model(p, seller))
        .collect();

    Ok(Json(Paginated::new(data, total, page, limit)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DataResp<ProductDetailOut>>, ApiError> {
    let Some((found, seller)) = Product::find_by_id(id)
        .find_also_related(User)
        .one(&state.db)
        .await?
    else {
        return Err(ApiError::not_found("Product not found"));
    };

    let review_rows = Review::find()
        .filter(review::Column::ProductId.eq(id))
        .find_also_related(User)
        .all(&state.db)
        .await?;
    let reviews = review_rows
        .into_iter()
        .map(|(r, author)| ReviewOut::from_model(r, author))
        .collect();

    Ok(Json(DataResp::new(ProductDetailOut {
        product: ProductOut::from_model(found, seller),
        reviews,
    })))
}

// ---------- create / update / delete ----------

async fn read_product_form(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<ProductForm, ApiError> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(filename) = field.file_name().map(|s| s.to_string()) {
            let content_type = field.content_type().map(|s| s.to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::validation(format!("failed to read file: {e}")))?;
            let path = accept_file(
                &state.upload_cfg,
                UploadKind::Image,
                &filename,
                content_type.as_deref(),
                &data,
            )
            .await?;
            form.images.push(path);
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::validation(format!("failed to read field {name}: {e}")))?;
        match name.as_str() {
            "name" => form.name = Some(value),
            "description" => form.description = Some(value),
            "price" => {
                form.price = Some(
                    value
                        .parse()
                        .map_err(|_| ApiError::validation("price must be a number"))?,
                )
            }
            "category" => {
                form.category = Some(
                    Category::try_from_value(&value)
                        .map_err(|_| ApiError::validation("unknown category"))?,
                )
            }
            "stock" => {
                form.stock = Some(
                    value
                        .parse()
                        .map_err(|_| ApiError::validation("stock must be an integer"))?,
                )
            }
            "isFeatured" => {
                form.is_featured = Some(
                    value
                        .parse()
                        .map_err(|_| ApiError::validation("isFeatured must be true or false"))?,
                )
            }
            _ => {}
        }
    }

    Ok(form)
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<(StatusCode, Json<DataResp<ProductOut>>), ApiError> {
    let requester = current_user(&state, &headers).await?;
    let form = read_product_form(&state, multipart).await?;

    let name = form
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::validation("name is required"))?;
    let description = form
        .description
        .ok_or_else(|| ApiError::validation("description is required"))?;
    let price = form
        .price
        .ok_or_else(|| ApiError::validation("price is required"))?;
    if price < 0.0 {
        return Err(ApiError::validation("price cannot be negative"));
    }
    let category = form
        .category
        .ok_or_else(|| ApiError::validation("category is required"))?;

    let now = Utc::now();
    let created = product::ActiveModel {
        id: NotSet,
        name: Set(name.trim().to_string()),
        description: Set(description),
        price: Set(price),
        category: Set(category),
        images: Set(serde_json::json!(form.images)),
        seller_id: Set(requester.id),
        stock: Set(form.stock.unwrap_or(0).max(0)),
        num_reviews: Set(0),
        average_rating: Set(0.0),
        is_featured: Set(form.is_featured.unwrap_or(false)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResp::new(ProductOut::from_model(created, Some(requester)))),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<DataResp<ProductOut>>, ApiError> {
    let requester = current_user(&state, &headers).await?;
    let found = Product::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    require_owner_or_admin(&requester, found.seller_id, "product")?;

    let form = read_product_form(&state, multipart).await?;

    let mut images: Vec<String> = serde_json::from_value(found.images.clone()).unwrap_or_default();
    images.extend(form.images);

    let mut am = found.into_active_model();
    if let Some(name) = form.name {
        if name.trim().is_empty() {
            return Err(ApiError::validation("name cannot be empty"));
        }
        am.name = Set(name.trim().to_string());
    }
    if let Some(description) = form.description {
        am.description = Set(description);
    }
    if let Some(price) = form.price {
        if price < 0.0 {
            return Err(ApiError::validation("price cannot be negative"));
        }
        am.price = Set(price);
    }
    if let Some(category) = form.category {
        am.category = Set(category);
    }
    if let Some(stock) = form.stock {
        am.stock = Set(stock.max(0));
    }
    if let Some(featured) = form.is_featured {
        am.is_featured = Set(featured);
    }
    am.images = Set(serde_json::json!(images));
    am.updated_at = Set(Utc::now());

    let updated = am.update(&state.db).await?;
    let seller = User::find_by_id(updated.seller_id).one(&state.db).await?;
    Ok(Json(DataResp::new(ProductOut::from_model(updated, seller))))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<DataResp<serde_json::Value>>, ApiError> {
    let requester = current_user(&state, &headers).await?;
    let found = Product::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;
    require_owner_or_admin(&requester, found.seller_id, "product")?;

    Product::delete_by_id(id).exec(&state.db).await?;
    Ok(Json(DataResp::new(serde_json::json!({}))))
}

// ---------- reviews ----------

pub async fn add_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<CreateReviewReq>,
) -> Result<(StatusCode, Json<MessageResp>), ApiError> {
    let requester = current_user(&state, &headers).await?;

    if !(1..=5).contains(&req.rating) {
        return Err(ApiError::validation("Rating must be between 1 and 5"));
    }
    if req.comment.trim().is_empty() {
        return Err(ApiError::validation("Comment cannot be empty"));
    }

    let found = Product::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    review::ActiveModel {
        id: NotSet,
        product_id: Set(found.id),
        user_id: Set(requester.id),
        rating: Set(req.rating),
        comment: Set(req.comment.trim().to_string()),
        created_at: Set(Utc::now()),
    }
    .insert(&state.db)
    .await
    .map_err(|e| on_unique_violation(e, ApiError::conflict("Product already reviewed")))?;

    recompute_rating(&state, found).await?;

    Ok((StatusCode::CREATED, Json(MessageResp::new("Review added"))))
}

/// Rewrites the denormalized rating fields from the reviews table.
async fn recompute_rating(state: &AppState, found: product::Model) -> Result<(), ApiError> {
    let ratings: Vec<i32> = Review::find()
        .filter(review::Column::ProductId.eq(found.id))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|r| r.rating)
        .collect();

    let count = ratings.len();
    let average = if count == 0 {
        0.0
    } else {
        ratings.iter().sum::<i32>() as f64 / count as f64
    };

    let mut am = found.into_active_model();
    am.num_reviews = Set(count as i32);
    am.average_rating = Set(average);
    am.updated_at = Set(Utc::now());
    am.update(&state.db).await?;
    Ok(())
}
