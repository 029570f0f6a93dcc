//! Health check endpoint.

use std::sync::Arc;
use axum::{Router, Json, routing::get};
use serde_json::{json, Value};
use crate::state::AppState;

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "inkdash-backend",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_body() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "inkdash-backend");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
