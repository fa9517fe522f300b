use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::errors::{is_unique_violation, ApiError};
use crate::models::{
    comment::{self, Entity as Comment},
    post::{self, Entity as Post},
    post_like::{self, Entity as PostLike},
    user::Entity as User,
};
use crate::serializers::common::{DataResp, Paginated};
use crate::serializers::community::{
    CommentOut, CreateCommentReq, CreatePostReq, LikeOut, PostDetailOut, PostListQuery, PostOut,
    UpdatePostReq,
};
use crate::views::{like_pattern, page_offset, require_owner_or_admin, user_auth::current_user};
use crate::AppState;

const MAX_PAGE_SIZE: u64 = 100;

// ---------- posts ----------

fn list_filter(q: &PostListQuery) -> Condition {
    let mut cond = Condition::all();
    if let Some(cat) = q.category {
        cond = cond.add(post::Column::Category.eq(cat));
    }
    if let Some(author) = q.author {
        cond = cond.add(post::Column::AuthorId.eq(author));
    }
    if let Some(kw) = q.keyword.as_deref().filter(|s| !s.trim().is_empty()) {
        let needle = like_pattern(kw.trim());
        cond = cond.add(
            Condition::any()
                .add(Expr::expr(Func::lower(Expr::col(post::Column::Title))).like(needle.clone()))
                .add(Expr::expr(Func::lower(Expr::col(post::Column::Content))).like(needle)),
        );
    }
    cond
}

async fn counts_for(state: &AppState, post_id: i64) -> Result<(u64, u64), ApiError> {
    let likes = PostLike::find()
        .filter(post_like::Column::PostId.eq(post_id))
        .count(&state.db)
        .await?;
    let comments = Comment::find()
        .filter(comment::Column::PostId.eq(post_id))
        .count(&state.db)
        .await?;
    Ok((likes, comments))
}

pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<PostListQuery>,
) -> Result<Json<Paginated<PostOut>>, ApiError> {
    let page = q.page.unwrap_or(1).max(1);
    let limit = q.limit.unwrap_or(10).clamp(1, MAX_PAGE_SIZE);
    let cond = list_filter(&q);

    let total = Post::find().filter(cond.clone()).count(&state.db).await?;

    let rows = Post::find()
        .filter(cond)
        .find_also_related(User)
        .order_by(post::Column::CreatedAt, Order::Desc)
        .offset(page_offset(page, limit))
        .limit(limit)
        .all(&state.db)
        .await?;

    let mut data = Vec::with_capacity(rows.len());
    for (p, author) in rows {
        let (likes, comments) = counts_for(&state, p.id).await?;
        data.push(PostOut::from_model(p, author, likes, comments));
    }

    Ok(Json(Paginated::new(data, total, page, limit)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DataResp<PostDetailOut>>, ApiError> {
    let Some((found, author)) = Post::find_by_id(id)
        .find_also_related(User)
        .one(&state.db)
        .await?
    else {
        return Err(ApiError::not_found("Post not found"));
    };

    let (likes, comments) = counts_for(&state, id).await?;

    let comment_list = Comment::find()
        .filter(comment::Column::PostId.eq(id))
        .find_also_related(User)
        .order_by(comment::Column::CreatedAt, Order::Asc)
        .all(&state.db)
        .await?
        .into_iter()
        .map(|(c, u)| CommentOut::from_model(c, u))
        .collect();

    Ok(Json(DataResp::new(PostDetailOut {
        post: PostOut::from_model(found, author, likes, comments),
        comment_list,
    })))
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreatePostReq>,
) -> Result<(StatusCode, Json<DataResp<PostOut>>), ApiError> {
    let requester = current_user(&state, &headers).await?;

    if req.title.trim().is_empty() {
        return Err(ApiError::validation("Title is required"));
    }
    if req.content.trim().is_empty() {
        return Err(ApiError::validation("Content is required"));
    }

    let now = Utc::now();
    let created = post::ActiveModel {
        id: NotSet,
        title: Set(req.title.trim().to_string()),
        content: Set(req.content),
        author_id: Set(requester.id),
        category: Set(req.category),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResp::new(PostOut::from_model(created, Some(requester), 0, 0))),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<UpdatePostReq>,
) -> Result<Json<DataResp<PostOut>>, ApiError> {
    let requester = current_user(&state, &headers).await?;
    let found = Post::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;
    require_owner_or_admin(&requester, found.author_id, "post")?;

    let mut am = found.into_active_model();
    if let Some(title) = req.title {
        if title.trim().is_empty() {
            return Err(ApiError::validation("Title cannot be empty"));
        }
        am.title = Set(title.trim().to_string());
    }
    if let Some(content) = req.content {
        am.content = Set(content);
    }
    if let Some(category) = req.category {
        am.category = Set(category);
    }
    am.updated_at = Set(Utc::now());
    let updated = am.update(&state.db).await?;

    let author = User::find_by_id(updated.author_id).one(&state.db).await?;
    let (likes, comments) = counts_for(&state, updated.id).await?;
    Ok(Json(DataResp::new(PostOut::from_model(
        updated, author, likes, comments,
    ))))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<DataResp<serde_json::Value>>, ApiError> {
    let requester = current_user(&state, &headers).await?;
    let found = Post::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;
    require_owner_or_admin(&requester, found.author_id, "post")?;

    Post::delete_by_id(id).exec(&state.db).await?;
    Ok(Json(DataResp::new(serde_json::json!({}))))
}

// ---------- likes & comments ----------

/// Toggles the caller's like and reports the resulting state.
pub async fn like(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<DataResp<LikeOut>>, ApiError> {
    let requester = current_user(&state, &headers).await?;
    Post::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    let existing = PostLike::find()
        .filter(post_like::Column::PostId.eq(id))
        .filter(post_like::Column::UserId.eq(requester.id))
        .one(&state.db)
        .await?;

    let liked = match existing {
        Some(row) => {
            PostLike::delete_by_id(row.id).exec(&state.db).await?;
            false
        }
        None => {
            let res = post_like::ActiveModel {
                id: NotSet,
                post_id: Set(id),
                user_id: Set(requester.id),
                created_at: Set(Utc::now()),
            }
            .insert(&state.db)
            .await;
            match res {
                Ok(_) => true,
                // raced with another toggle of ours; the like exists
                Err(e) if is_unique_violation(&e) => true,
                Err(e) => return Err(e.into()),
            }
        }
    };

    let likes = PostLike::find()
        .filter(post_like::Column::PostId.eq(id))
        .count(&state.db)
        .await?;

    Ok(Json(DataResp::new(LikeOut { liked, likes })))
}

pub async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<CreateCommentReq>,
) -> Result<(StatusCode, Json<DataResp<CommentOut>>), ApiError> {
    let requester = current_user(&state, &headers).await?;
    Post::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    if req.content.trim().is_empty() {
        return Err(ApiError::validation("Comment cannot be empty"));
    }

    let created = comment::ActiveModel {
        id: NotSet,
        post_id: Set(id),
        author_id: Set(requester.id),
        content: Set(req.content.trim().to_string()),
        created_at: Set(Utc::now()),
    }
    .insert(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResp::new(CommentOut::from_model(created, Some(requester)))),
    ))
}
