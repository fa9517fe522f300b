use sea_orm::prelude::DateTimeUtc;
use serde::{Deserialize, Serialize};

use crate::models::{
    product::{self, Category},
    review, user,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    pub category: Option<Category>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub seller: Option<i64>,
    pub keyword: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

/// The seller fields embedded in product listings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerBrief {
    pub id: i64,
    pub name: String,
    pub business_name: Option<String>,
    pub location: Option<String>,
}

impl From<user::Model> for SellerBrief {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            name: u.name,
            business_name: u.business_name,
            location: u.location,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOut {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: Category,
    pub images: Vec<String>,
    pub seller: Option<SellerBrief>,
    pub stock: i32,
    pub num_reviews: i32,
    pub average_rating: f64,
    pub is_featured: bool,
    pub created_at: DateTimeUtc,
}

impl ProductOut {
    pub fn from_model(m: product::Model, seller: Option<user::Model>) -> Self {
        let images = serde_json::from_value(m.images).unwrap_or_default();
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            price: m.price,
            category: m.category,
            images,
            seller: seller.map(SellerBrief::from),
            stock: m.stock,
            num_reviews: m.num_reviews,
            average_rating: m.average_rating,
            is_featured: m.is_featured,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOut {
    pub id: i64,
    pub user_id: i64,
    pub user_name: Option<String>,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTimeUtc,
}

impl ReviewOut {
    pub fn from_model(r: review::Model, author: Option<user::Model>) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            user_name: author.map(|u| u.name),
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetailOut {
    #[serde(flatten)]
    pub product: ProductOut,
    pub reviews: Vec<ReviewOut>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewReq {
    pub rating: i32,
    pub comment: String,
}

/// Multipart form fields collected while reading a product create/update
/// request. All optional; the create handler validates required ones.
#[derive(Debug, Default)]
pub struct ProductForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<Category>,
    pub stock: Option<i32>,
    pub is_featured: Option<bool>,
    pub images: Vec<String>,
}
