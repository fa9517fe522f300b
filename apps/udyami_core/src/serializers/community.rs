use sea_orm::prelude::DateTimeUtc;
use serde::{Deserialize, Serialize};

use crate::models::{
    comment,
    post::{self, Category},
    user,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListQuery {
    pub category: Option<Category>,
    pub author: Option<i64>,
    pub keyword: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostReq {
    pub title: String,
    pub content: String,
    pub category: Category,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostReq {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<Category>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentReq {
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorBrief {
    pub id: i64,
    pub name: String,
    pub profile_picture: Option<String>,
}

impl From<user::Model> for AuthorBrief {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            name: u.name,
            profile_picture: u.profile_picture,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentOut {
    pub id: i64,
    pub content: String,
    pub author: Option<AuthorBrief>,
    pub created_at: DateTimeUtc,
}

impl CommentOut {
    pub fn from_model(c: comment::Model, author: Option<user::Model>) -> Self {
        Self {
            id: c.id,
            content: c.content,
            author: author.map(AuthorBrief::from),
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostOut {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category: Category,
    pub author: Option<AuthorBrief>,
    pub likes: u64,
    pub comments: u64,
    pub created_at: DateTimeUtc,
}

impl PostOut {
    pub fn from_model(p: post::Model, author: Option<user::Model>, likes: u64, comments: u64) -> Self {
        Self {
            id: p.id,
            title: p.title,
            content: p.content,
            category: p.category,
            author: author.map(AuthorBrief::from),
            likes,
            comments,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailOut {
    #[serde(flatten)]
    pub post: PostOut,
    pub comment_list: Vec<CommentOut>,
}

/// Result of toggling a like: the caller's new state plus the fresh count.
#[derive(Debug, Serialize)]
pub struct LikeOut {
    pub liked: bool,
    pub likes: u64,
}
