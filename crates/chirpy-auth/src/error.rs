//! Authentication error types
//!
//! Every variant collapses to one of two client-visible shapes: 401 for
//! credential and token problems, 500 for store and hashing failures.
//! [`AuthError::kind`] keeps the precise cause for server-side logs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chirpy_db::DbError;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing authorization header")]
    MissingAuthHeader,

    #[error("Invalid authorization header format")]
    InvalidAuthHeader,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Session is not active")]
    SessionNotActive,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token signing error: {0}")]
    TokenSigning(String),

    #[error("Expiry out of range: {0}")]
    ExpiryOutOfRange(String),

    #[error("Store error: {0}")]
    Store(#[from] DbError),
}

impl AuthError {
    /// Outward HTTP status
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::PasswordHash(_)
            | AuthError::TokenSigning(_)
            | AuthError::ExpiryOutOfRange(_)
            | AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Outward error message; never names the check that failed
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "Incorrect email or password",
            AuthError::PasswordHash(_)
            | AuthError::TokenSigning(_)
            | AuthError::ExpiryOutOfRange(_)
            | AuthError::Store(_) => "Something went wrong",
            _ => "Unauthorized",
        }
    }

    /// Internal tag for logging
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::InvalidToken => "invalid_token",
            AuthError::SessionNotActive => "session_not_active",
            AuthError::PasswordHash(_) => "password_hash",
            AuthError::TokenSigning(_) => "token_signing",
            AuthError::ExpiryOutOfRange(_) => "expiry_out_of_range",
            AuthError::Store(_) => "store",
        }
    }

    /// Log this error with its internal cause
    pub fn log(&self) {
        if self.status().is_server_error() {
            error!(kind = self.kind(), "Auth failure: {}", self);
        } else {
            debug!(kind = self.kind(), "Auth rejected: {}", self);
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();

        let body = axum::Json(json!({
            "error": self.public_message()
        }));

        (self.status(), body).into_response()
    }
}
