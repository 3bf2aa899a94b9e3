//! API error types

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chirpy_auth::AuthError;
use chirpy_core::CoreError;
use chirpy_db::DbError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

const INTERNAL_MESSAGE: &str = "Something went wrong";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}

impl ApiError {
    /// Outward status and message
    fn parts(&self) -> (StatusCode, String) {
        match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_MESSAGE.to_string(),
            ),
            ApiError::Core(e) => match e {
                CoreError::ChirpTooLong { .. } => {
                    (StatusCode::BAD_REQUEST, "Chirp is too long".to_string())
                }
            },
            ApiError::Database(e) => match e {
                DbError::NotFound(msg) => (StatusCode::NOT_FOUND, format!("{} not found", msg)),
                DbError::Duplicate(msg) => (StatusCode::CONFLICT, msg.clone()),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_MESSAGE.to_string(),
                ),
            },
            ApiError::Auth(e) => (e.status(), e.public_message().to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.parts().0
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.parts();

        match &self {
            ApiError::Auth(e) => e.log(),
            _ if status.is_server_error() => error!("Request failed: {}", self),
            _ => {}
        }

        let body = axum::Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
