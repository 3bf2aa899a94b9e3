//! Admin routes and the counted file server

use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderValue, header::CACHE_CONTROL},
    middleware::{self, Next},
    response::{Html, Response},
    routing::{get, post},
};
use chirpy_core::HitCounter;
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /admin/metrics
async fn admin_metrics(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        r#"<html>
  <body>
    <h1>Welcome, Chirpy Admin</h1>
    <p>Chirpy has been visited {} times!</p>
  </body>
</html>
"#,
        state.hits.get()
    ))
}

/// POST /admin/reset (dev platform only)
async fn reset(State(state): State<AppState>) -> Result<&'static str, ApiError> {
    if !state.platform.is_dev() {
        warn!("Reset refused on platform: {}", state.platform);
        return Err(ApiError::Forbidden);
    }

    let sessions = state.auth.clear_sessions().await?;
    let users = state.db.delete_all_users().await?;
    let hits = state.hits.reset();

    info!(
        "Reset: removed {} users and {} sessions, cleared {} hits",
        users, sessions, hits
    );

    Ok("OK")
}

/// Count every file server request and disable client caching of the response
async fn count_hits(State(hits): State<Arc<HitCounter>>, request: Request, next: Next) -> Response {
    hits.increment();
    metrics::counter!("chirpy_app_hits_total").increment(1);

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

/// Create admin routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/metrics", get(admin_metrics))
        .route("/admin/reset", post(reset))
}

/// Serve `static_dir` under `/app`
pub fn file_server(static_dir: &Path, hits: Arc<HitCounter>) -> Router<AppState> {
    Router::new()
        .nest_service("/app", ServeDir::new(static_dir))
        .layer(middleware::from_fn_with_state(hits, count_hits))
}
