//! Chain TVL snapshot.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde_json::Value;
use tracing::warn;

use inkdash_core::build_snapshot;

use crate::state::AppState;

/// GET /api/tvl
async fn tvl(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let chain = state.chain();
    match build_snapshot(state.upstream.as_ref(), &chain).await {
        Ok(snapshot) => match serde_json::to_value(&snapshot) {
            Ok(body) => (StatusCode::OK, Json(body)),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "ok": false, "chain": chain.name, "error": e.to_string() })),
            ),
        },
        Err(e) => {
            warn!(error = %e, "chain tvl snapshot failed");
            let mut body = e.to_json(&chain.name);
            body["tvl"] = Value::Null;
            body["tvl_change_24h_pct"] = Value::Null;
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body))
        }
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/tvl", get(tvl))
}
