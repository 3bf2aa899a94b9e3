//! Configuration loading and management
//!
//! Sources, lowest precedence first: built-in defaults, the TOML file,
//! `CHIRPY_*` environment variables (`__` separates sections, so
//! `CHIRPY_AUTH__JWT_SECRET` sets `auth.jwt_secret`), then command-line
//! flags applied by `main`.

use anyhow::{Context, Result, bail};
use chirpy_auth::{AuthSettings, HashingParams};
use chirpy_core::Platform;
use chrono::{Duration, Utc};
use config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Secret shipped in the defaults; usable locally, never in production
pub const PLACEHOLDER_JWT_SECRET: &str = "change-me-in-production";

const ENV_PREFIX: &str = "CHIRPY";

/// Longest accepted access token lifetime (30 days)
pub const MAX_ACCESS_TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;
/// Longest accepted refresh session lifetime (10 years)
pub const MAX_REFRESH_TOKEN_TTL_DAYS: i64 = 3650;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub webhooks: WebhooksConfig,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory served under `/app`
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_db_url(),
        }
    }
}

impl DatabaseConfig {
    /// File backing a `sqlite:` URL, if any
    pub fn sqlite_file(&self) -> Option<&Path> {
        let rest = self
            .url
            .strip_prefix("sqlite://")
            .or_else(|| self.url.strip_prefix("sqlite:"))?;
        let path = rest.split('?').next().unwrap_or_default();
        if path.is_empty() || path == ":memory:" {
            return None;
        }
        Some(Path::new(path))
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_access_token_ttl_secs")]
    pub access_token_ttl_secs: i64,
    #[serde(default = "default_refresh_token_ttl_days")]
    pub refresh_token_ttl_days: i64,
    #[serde(default = "default_hash_memory_kib")]
    pub hash_memory_kib: u32,
    #[serde(default = "default_hash_iterations")]
    pub hash_iterations: u32,
    #[serde(default = "default_hash_parallelism")]
    pub hash_parallelism: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            access_token_ttl_secs: default_access_token_ttl_secs(),
            refresh_token_ttl_days: default_refresh_token_ttl_days(),
            hash_memory_kib: default_hash_memory_kib(),
            hash_iterations: default_hash_iterations(),
            hash_parallelism: default_hash_parallelism(),
        }
    }
}

impl AuthConfig {
    /// Settings for the authentication service
    pub fn settings(&self) -> Result<AuthSettings> {
        let access_token_ttl = Duration::try_seconds(self.access_token_ttl_secs)
            .with_context(|| {
                format!("auth.access_token_ttl_secs out of range: {}", self.access_token_ttl_secs)
            })?;
        let refresh_token_ttl = Duration::try_days(self.refresh_token_ttl_days)
            .with_context(|| {
                format!("auth.refresh_token_ttl_days out of range: {}", self.refresh_token_ttl_days)
            })?;

        Ok(AuthSettings {
            jwt_secret: self.jwt_secret.clone(),
            access_token_ttl,
            refresh_token_ttl,
            hashing: HashingParams {
                memory_kib: self.hash_memory_kib,
                iterations: self.hash_iterations,
                parallelism: self.hash_parallelism,
            },
        })
    }
}

/// Third-party webhook configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhooksConfig {
    /// API key Polka presents on its webhook calls
    #[serde(default)]
    pub polka_key: String,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Prometheus exporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
        }
    }
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_static_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_db_url() -> String {
    "sqlite:./data/chirpy.db?mode=rwc".to_string()
}

fn default_jwt_secret() -> String {
    PLACEHOLDER_JWT_SECRET.to_string()
}

fn default_access_token_ttl_secs() -> i64 {
    3600
}

fn default_refresh_token_ttl_days() -> i64 {
    60
}

fn default_hash_memory_kib() -> u32 {
    HashingParams::default().memory_kib
}

fn default_hash_iterations() -> u32 {
    HashingParams::default().iterations
}

fn default_hash_parallelism() -> u32 {
    HashingParams::default().parallelism
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

impl Config {
    /// Load configuration from a file and the process environment
    pub fn load(path: &str) -> Result<Self> {
        Self::load_with_env(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(path: &str, env: Environment) -> Result<Self> {
        let mut builder = config::Config::builder();

        if Path::new(path).exists() {
            info!("Loading configuration from {}", path);
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        } else {
            info!("Config file not found at {}, using defaults", path);
        }

        let env = env
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true);

        let config: Config = builder
            .add_source(env)
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?
            .try_deserialize()
            .with_context(|| format!("Failed to parse configuration from {}", path))?;

        Ok(config)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.trim().is_empty() {
            bail!("auth.jwt_secret must not be empty");
        }
        if self.auth.jwt_secret == PLACEHOLDER_JWT_SECRET {
            warn!("auth.jwt_secret is the built-in placeholder; set JWT_SECRET before deploying");
        }
        if !(1..=MAX_ACCESS_TOKEN_TTL_SECS).contains(&self.auth.access_token_ttl_secs) {
            bail!(
                "auth.access_token_ttl_secs must be between 1 and {}, got {}",
                MAX_ACCESS_TOKEN_TTL_SECS,
                self.auth.access_token_ttl_secs
            );
        }
        if !(1..=MAX_REFRESH_TOKEN_TTL_DAYS).contains(&self.auth.refresh_token_ttl_days) {
            bail!(
                "auth.refresh_token_ttl_days must be between 1 and {}, got {}",
                MAX_REFRESH_TOKEN_TTL_DAYS,
                self.auth.refresh_token_ttl_days
            );
        }
        let settings = self.auth.settings()?;
        let now = Utc::now();
        for ttl in [settings.access_token_ttl, settings.refresh_token_ttl] {
            if now.checked_add_signed(ttl).is_none() {
                bail!("token lifetime {} runs past the representable date range", ttl);
            }
        }
        if self.webhooks.polka_key.is_empty() {
            warn!("webhooks.polka_key is empty; every Polka webhook call will be rejected");
        }
        Ok(())
    }
}
