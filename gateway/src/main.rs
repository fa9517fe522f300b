use std::net::SocketAddr;

use axum::extract::DefaultBodyLimit;
use dotenvy::dotenv;
use sea_orm::{ConnectOptions, Database};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use udyami_core::uploads::UploadCfg;
use udyami_core::{ensure_schema, urls, AppState, JwtCfg};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).compact().init();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(5000);

    let db_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://udyami.db?mode=rwc".to_string());
    let mut opts = ConnectOptions::new(db_url);
    opts.sqlx_logging(false);
    let db = Database::connect(opts).await?;
    ensure_schema(&db).await?;

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        warn!("JWT_SECRET not set, using an insecure fallback");
        "fallbacksecret".to_string()
    });

    let upload_cfg = UploadCfg::from_env();
    tokio::fs::create_dir_all(&upload_cfg.dir).await?;

    let state = AppState::new(db, &jwt_secret, JwtCfg::from_env(), upload_cfg);

    // body limit sits above the largest per-file ceiling (10 MB)
    let app = urls::router(state).layer(DefaultBodyLimit::max(12 * 1024 * 1024));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("listening on http://{}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}
