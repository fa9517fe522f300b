use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum Category {
    #[sea_orm(string_value = "Handcraft")]
    Handcraft,
    #[sea_orm(string_value = "Textiles")]
    Textiles,
    #[sea_orm(string_value = "Food")]
    Food,
    #[sea_orm(string_value = "Agriculture")]
    Agriculture,
    #[sea_orm(string_value = "Beauty")]
    Beauty,
    #[sea_orm(string_value = "Technology")]
    Technology,
    #[sea_orm(string_value = "Services")]
    Services,
    #[sea_orm(string_value = "Other")]
    Other,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i64,

    pub name: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub price: f64,
    pub category: Category,

    /// JSON array of `/uploads/...` paths.
    pub images: Json,

    pub seller_id: i64,
    pub stock: i32,

    // derived from the reviews table, recomputed on every new review
    pub num_reviews: i32,
    pub average_rating: f64,

    pub is_featured: bool,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SellerId",
        to = "super::user::Column::Id"
    )]
    Seller,
    #[sea_orm(has_many = "super::review::Entity")]
    Reviews,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Seller.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
