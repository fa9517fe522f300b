use sea_orm::prelude::DateTimeUtc;
use serde::{Deserialize, Serialize};

use crate::models::user::{self, BusinessSize, Role};

/// JWT claims carried by access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub role: Role,
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterReq {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub business_name: Option<String>,
    pub business_type: Option<String>,
    pub location: Option<String>,
    pub business_size: Option<BusinessSize>,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginReq {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordReq {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileReq {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub business_name: Option<String>,
    pub business_type: Option<String>,
    pub location: Option<String>,
    pub business_size: Option<BusinessSize>,
    pub language: Option<String>,
}

/// The user shape served to clients. Deliberately omits the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPublic {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub business_name: Option<String>,
    pub business_type: Option<String>,
    pub location: Option<String>,
    pub business_size: Option<BusinessSize>,
    pub profile_picture: Option<String>,
    pub language: String,
    pub created_at: DateTimeUtc,
}

impl From<user::Model> for UserPublic {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            phone: m.phone,
            role: m.role,
            business_name: m.business_name,
            business_type: m.business_type,
            location: m.location,
            business_size: m.business_size,
            profile_picture: m.profile_picture,
            language: m.language,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResp {
    pub success: bool,
    pub user: UserPublic,
    pub token: String,
}

impl AuthResp {
    pub fn new(user: user::Model, token: String) -> Self {
        Self {
            success: true,
            user: user.into(),
            token,
        }
    }
}
