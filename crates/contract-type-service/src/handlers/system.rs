//! 服务信息与健康检查

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde_json::{Value, json};
use tracing::error;

use crate::state::AppState;

const SERVICE_NAME: &str = "Contract Forge API";
const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// GET /
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to Contract Forge API",
        "version": SERVICE_VERSION,
        "status": "running"
    }))
}

/// 健康检查：进程存活且数据库可达时返回 200，否则 503
///
/// GET /health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "timestamp": Utc::now().to_rfc3339(),
                "service": SERVICE_NAME,
                "database": "connected"
            })),
        ),
        Err(e) => {
            error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "timestamp": Utc::now().to_rfc3339(),
                    "service": SERVICE_NAME,
                    "database": "disconnected",
                    "error": e.to_string()
                })),
            )
        }
    }
}

/// GET /api/info
pub async fn api_info(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "name": SERVICE_NAME,
        "version": SERVICE_VERSION,
        "environment": state.environment,
        "endpoints": {
            "contract_types": "/api/contract-type"
        }
    }))
}
