//! API routes for the inkdash backend.

pub mod health;
pub mod rankings;
pub mod tvl;

use std::sync::Arc;
use axum::Router;
use crate::state::AppState;

/// Build the API router with all routes.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health::router())
        .merge(rankings::router())
        .merge(tvl::router())
}
