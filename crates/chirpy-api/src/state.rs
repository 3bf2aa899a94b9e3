//! Application state

use chirpy_auth::AuthService;
use chirpy_core::{HitCounter, Platform, ProfanityFilter};
use chirpy_db::Database;
use std::sync::Arc;

/// Prometheus render handle for the `/metrics` endpoint
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub auth: Arc<AuthService>,
    pub hits: Arc<HitCounter>,
    pub profanity: Arc<ProfanityFilter>,
    /// Key the Polka webhook must present
    pub polka_key: Arc<str>,
    pub platform: Platform,
}

impl AppState {
    pub fn new(db: Database, auth: Arc<AuthService>, polka_key: &str, platform: Platform) -> Self {
        Self {
            db,
            auth,
            hits: Arc::new(HitCounter::new()),
            profanity: Arc::new(ProfanityFilter::default()),
            polka_key: Arc::from(polka_key),
            platform,
        }
    }
}
