//! API routes

mod admin;
pub mod auth;
mod chirps;
mod health;
pub mod metrics;
pub mod types;
mod users;
mod webhooks;

use axum::Router;
use std::path::Path;
use std::sync::Arc;

use crate::state::{AppState, MetricsHandle};

pub use auth::RequireAuth;
pub use webhooks::RequirePolkaKey;

/// Create the main router
pub fn create_router(
    state: AppState,
    static_dir: &Path,
    metrics_handle: Option<Arc<MetricsHandle>>,
) -> Router {
    let mut router = Router::new()
        .merge(health::routes())
        .merge(users::routes())
        .merge(auth::routes())
        .merge(chirps::routes())
        .merge(webhooks::routes())
        .merge(admin::routes())
        .merge(admin::file_server(static_dir, state.hits.clone()))
        .with_state(state);

    // Add metrics endpoint if handle is provided
    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router
}
