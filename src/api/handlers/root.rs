use axum::{http::StatusCode, Json, response::IntoResponse};
use serde_json::json;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "ClubGrid API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Club management: members, teams, events and invites",
        "status": "operational",
        "endpoints": {
            "health": "/health",
            "auth": "/auth/login",
            "public": "/public/invites/:token",
            "api": "/api"
        }
    }))
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
