use std::net::SocketAddr;

use axum::Router;
use common::utils::logging::init_logging_default;
use configs::AppConfig;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, auth::ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

/// Router over an already-migrated database. Used by `run` and by the HTTP tests.
pub fn build_app(state: ServerState) -> Router {
    routes::build_router(state, build_cors())
}

/// Public entry: load config from `config.toml` or the environment, then serve.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_default();
    let cfg = AppConfig::load_or_env()?;
    serve(cfg).await
}

/// Prepare storage, migrate, and serve until Ctrl+C.
pub async fn serve(cfg: AppConfig) -> anyhow::Result<()> {
    // 上传文件目录（media/documents）
    common::env::ensure_env(&cfg.media.root).await?;

    let db = models::db::connect_with_config(&cfg.database).await?;
    // 启动时执行待应用的迁移
    migration::Migrator::up(&db, None).await?;
    info!(event = "migrations_applied");

    let state = ServerState::new(db, &cfg.auth, &cfg.access);
    let app = build_app(state);

    let addr = bind_addr(&cfg)?;
    info!(%addr, restrict_message_mutation = cfg.access.restrict_message_mutation, "starting cras digital api");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!(event = "server_stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(event = "signal_listener_failed", error = %e);
        std::future::pending::<()>().await;
    }
    info!(event = "shutdown_signal", "received Ctrl+C, draining connections");
}
