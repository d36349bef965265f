//! Host-side Backup API
//!
//! Serves the two endpoints a containerized deployment delegates to:
//! `POST /api/backup/create` and `GET /api/backup/stats`. Both always act
//! locally; this server never forwards to another Backup API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use portfolio_core::{BackupCreationResult, BackupStats, HealthStatus, PortfolioContext};
use tracing::{error, info};

use super::get_context;

type AppState = Arc<PortfolioContext>;

pub fn run(bind: &str) -> Result<()> {
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("Invalid bind address: {}", bind))?;

    // The core holds a blocking HTTP client, which must be created and
    // dropped outside the async runtime.
    let state: AppState = Arc::new(get_context()?);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(serve(addr, Arc::clone(&state)))?;
    drop(runtime);
    drop(state);
    Ok(())
}

async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "backup API listening");
    println!("Backup API listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("Backup API server failed")
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/backup/create", post(create_backup))
        .route("/api/backup/stats", get(backup_stats))
        .with_state(state)
}

async fn create_backup(State(ctx): State<AppState>) -> (StatusCode, Json<BackupCreationResult>) {
    let result = tokio::task::spawn_blocking(move || ctx.report_service.create_local_backup())
        .await
        .unwrap_or_else(|e| {
            error!(error = %e, "backup task panicked");
            BackupCreationResult::failed(format!("Backup creation failed: {}", e))
        });
    (creation_status(&result), Json(result))
}

async fn backup_stats(State(ctx): State<AppState>) -> (StatusCode, Json<BackupStats>) {
    let stats = tokio::task::spawn_blocking(move || ctx.report_service.local_backup_stats(Utc::now()).stats)
        .await
        .unwrap_or_else(|e| {
            error!(error = %e, "stats task panicked");
            BackupStats::failed(e.to_string())
        });
    (stats_status(&stats), Json(stats))
}

fn creation_status(result: &BackupCreationResult) -> StatusCode {
    if result.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn stats_status(stats: &BackupStats) -> StatusCode {
    if stats.backup_health == HealthStatus::Error {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    }
}
