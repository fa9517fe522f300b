pub mod errors;
pub mod models;
pub mod serializers;
pub mod uploads;
pub mod urls;
pub mod views;

use std::sync::Arc;

use anyhow::Result;
use chrono::Duration as ChronoDuration;
use jsonwebtoken::{DecodingKey, EncodingKey};
use sea_orm::DatabaseConnection;

use crate::uploads::UploadCfg;

#[derive(Clone)]
pub struct JwtCfg {
    /// Access token TTL (default 7 days). Override with JWT_EXPIRE_SECS.
    pub token_ttl: ChronoDuration,
}

impl JwtCfg {
    pub fn from_env() -> Self {
        let secs = std::env::var("JWT_EXPIRE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(7 * 24 * 3600);
        Self {
            token_ttl: ChronoDuration::seconds(secs),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_enc: Arc<EncodingKey>,
    pub jwt_dec: Arc<DecodingKey>,
    pub jwt_cfg: JwtCfg,
    pub upload_cfg: Arc<UploadCfg>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        jwt_secret: &str,
        jwt_cfg: JwtCfg,
        upload_cfg: UploadCfg,
    ) -> Self {
        Self {
            db,
            jwt_enc: Arc::new(EncodingKey::from_secret(jwt_secret.as_bytes())),
            jwt_dec: Arc::new(DecodingKey::from_secret(jwt_secret.as_bytes())),
            jwt_cfg,
            upload_cfg: Arc::new(upload_cfg),
        }
    }
}

/// Ensure DB schema is up-to-date (calls migration crate).
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<()> {
    use migration::Migrator;
    use sea_orm_migration::migrator::MigratorTrait; // bring the trait into scope
    Migrator::up(db, None).await?;
    Ok(())
}
