//! Chirpy Authentication
//!
//! This crate provides password hashing, JWT access tokens, bearer-header
//! extraction and the refresh-token session lifecycle, composed into the
//! [`AuthService`] facade used by the HTTP layer.

pub mod bearer;
pub mod error;
pub mod jwt;
pub mod password;
pub mod service;
pub mod session;

pub use bearer::{api_key, api_key_matches, bearer_token};
pub use error::AuthError;
pub use jwt::{Claims, JwtManager, TOKEN_ISSUER};
pub use password::{CredentialHasher, HashingParams};
pub use service::{AuthService, AuthSettings, LoginSession};
pub use session::{SessionState, SessionStore, generate_refresh_token};
