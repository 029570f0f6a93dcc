//! Protocol rankings for the target chain.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use inkdash_core::columns::{ProtocolTable, TableView};
use inkdash_core::probe::probe_protocol;
use inkdash_core::{build_rankings, RankingsOptions};

use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RankingsQuery {
    /// Protocol slug whose raw fee/revenue payloads should be returned
    /// instead of the rankings.
    pub debug: Option<String>,
}

type JsonResponse = (StatusCode, Json<Value>);

fn to_body<T: serde::Serialize>(value: &T) -> JsonResponse {
    match serde_json::to_value(value) {
        Ok(body) => (StatusCode::OK, Json(body)),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "ok": false, "error": format!("serialization failed: {e}") })),
        ),
    }
}

/// GET /api/protocol-rankings
async fn rankings(State(state): State<Arc<AppState>>, Query(q): Query<RankingsQuery>) -> JsonResponse {
    let chain = state.chain();

    if let Some(slug) = q.debug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        return match probe_protocol(state.upstream.as_ref(), slug).await {
            Ok(report) => to_body(&report),
            Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Json(e.to_json(&chain.name))),
        };
    }

    let opts = RankingsOptions::from(&state.config);
    match build_rankings(state.upstream.as_ref(), &opts).await {
        Ok(report) => to_body(&report),
        Err(e) => {
            warn!(error = %e, "protocol rankings failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(e.to_json(&chain.name)))
        }
    }
}

/// GET /api/protocol-rankings/table?advanced=&sort=&desc=
async fn rankings_table(State(state): State<Arc<AppState>>, Query(view): Query<TableView>) -> JsonResponse {
    let chain = state.chain();
    let opts = RankingsOptions::from(&state.config);
    match build_rankings(state.upstream.as_ref(), &opts).await {
        Ok(report) => to_body(&ProtocolTable::for_view(&report.chain, report.rows, view)),
        Err(e) => {
            warn!(error = %e, "protocol table failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(e.to_json(&chain.name)))
        }
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/protocol-rankings", get(rankings))
        .route("/protocol-rankings/table", get(rankings_table))
}
