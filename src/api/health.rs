//! Health check endpoints

use axum::{http::StatusCode, response::IntoResponse, Extension, Json};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check endpoint. Test routers run without a pool and are
/// always ready.
pub async fn ready(pool: Option<Extension<MySqlPool>>) -> impl IntoResponse {
    let db_ok = match pool {
        Some(Extension(pool)) => sqlx::query("SELECT 1").execute(&pool).await.is_ok(),
        None => true,
    };

    if db_ok {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    }
}
