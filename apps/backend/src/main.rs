//! inkdash backend: JSON API for the chain dashboard.
//!
//! Routes (under `/api`):
//! - `GET /health`
//! - `GET /protocol-rankings` (`?debug=<slug>` dumps raw fee payloads)
//! - `GET /protocol-rankings/table`
//! - `GET /tvl`

mod routes;
mod state;

use std::any::Any as PanicPayload;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

use inkdash_common::error::InkError;
use state::AppState;

/// A handler panic becomes the usual failure envelope with status 500.
fn panic_response(chain: &str, payload: Box<dyn PanicPayload + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "request handler panicked".to_string()
    };
    tracing::error!(%message, "request handler panicked");
    let body = InkError::Internal(message).to_json(chain);
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let chain = state.config.chain.name.clone();
    let catch_panic = CatchPanicLayer::custom(move |payload: Box<dyn PanicPayload + Send + 'static>| {
        panic_response(&chain, payload)
    });

    Router::new()
        .nest("/api", routes::api_router())
        .layer(catch_panic)
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    inkdash_core::init_workspace()?;
    let config = inkdash_core::load_config()?;

    let default_level = if config.system.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_target(false)
        .init();

    tracing::info!(chain = %config.chain.name, upstream = %config.upstream.base_url, "inkdash backend starting...");

    let bind = config.server.bind.clone();
    let state = Arc::new(AppState::from_config(config)?);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app(state)).await?;

    Ok(())
}
