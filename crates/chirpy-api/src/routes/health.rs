//! Health check endpoint

use axum::{Router, routing::get};

use crate::state::AppState;

/// GET /api/healthz
async fn healthz() -> &'static str {
    metrics::counter!("chirpy_health_checks_total").increment(1);
    "OK"
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/healthz", get(healthz))
}
