//! Chirpy REST API
//!
//! This crate provides the Axum-based HTTP API for Chirpy: users,
//! authentication, chirps, the Polka webhook, and the admin and
//! file server endpoints.

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
