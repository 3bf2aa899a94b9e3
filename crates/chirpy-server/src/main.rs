//! Chirpy - a small social posting REST backend

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use chirpy_api::{AppState, create_router};
use chirpy_auth::AuthService;
use chirpy_core::Platform;
use chirpy_db::Database;
use crate::config::{Config, LogFormat, LoggingConfig};

/// Chirpy - users, chirps and sessions over HTTP
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "CHIRPY_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "CHIRPY_PORT")]
    port: Option<u16>,

    /// Database URL
    #[arg(long, env = "DB_URL")]
    database_url: Option<String>,

    /// Access token signing secret
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    /// Polka webhook API key
    #[arg(long, env = "POLKA_KEY", hide_env_values = true)]
    polka_key: Option<String>,

    /// Deployment platform (dev enables /admin/reset)
    #[arg(long, env = "PLATFORM")]
    platform: Option<Platform>,
}

impl Args {
    /// Apply flags on top of the loaded configuration
    fn apply(self, config: &mut Config) {
        if let Some(bind) = self.bind {
            config.server.bind_address = bind;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = self.database_url {
            config.database.url = url;
        }
        if let Some(secret) = self.jwt_secret {
            config.auth.jwt_secret = secret;
        }
        if let Some(key) = self.polka_key {
            config.webhooks.polka_key = key;
        }
        if let Some(platform) = self.platform {
            config.platform = platform;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;
    args.apply(&mut config);

    // Initialize logging
    init_logging(&config.logging);

    info!("Starting Chirpy v{}", env!("CARGO_PKG_VERSION"));

    config.validate()?;

    // Install the Prometheus recorder before any counter is touched
    let metrics_handle = if config.metrics.enabled {
        Some(Arc::new(PrometheusBuilder::new().install_recorder()?))
    } else {
        None
    };

    // Create data directory
    if let Some(parent) = config.database.sqlite_file().and_then(|f| f.parent())
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    // Initialize database
    let db = Database::new(&config.database.url).await?;

    // Initialize authentication
    let auth = AuthService::new(Arc::new(db.clone()), &config.auth.settings()?)?;

    // Create application state
    let state = AppState::new(
        db,
        Arc::new(auth),
        &config.webhooks.polka_key,
        config.platform,
    );

    // Create router
    let app = create_router(state, &config.server.static_dir, metrics_handle)
        .layer(TraceLayer::new_for_http());

    // Determine bind address
    let addr: SocketAddr =
        format!("{}:{}", config.server.bind_address, config.server.port).parse()?;

    info!("Listening on {}", addr);
    info!("Platform: {}", config.platform);
    info!("Serving /app from {}", config.server.static_dir.display());

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
