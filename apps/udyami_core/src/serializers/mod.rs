pub mod common;
pub mod community;
pub mod course;
pub mod product;
pub mod upload;
pub mod user_auth;
