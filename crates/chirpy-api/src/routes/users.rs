//! User routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use chirpy_db::{DbError, NewUser};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

use super::auth::RequireAuth;
use super::types::{CredentialsRequest, UserResponse};

// ==================== Input Validation ====================

/// Maximum allowed email length
const MAX_EMAIL_LENGTH: usize = 254;
/// Maximum allowed password length (prevent DoS with very large passwords)
pub(crate) const MAX_PASSWORD_LENGTH: usize = 256;

fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.trim().is_empty() {
        return Err(ApiError::BadRequest("Email cannot be empty".to_string()));
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Email exceeds maximum length of {} characters",
            MAX_EMAIL_LENGTH
        )));
    }
    if !email.contains('@') {
        return Err(ApiError::BadRequest("Email must contain '@'".to_string()));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.is_empty() {
        return Err(ApiError::BadRequest("Password cannot be empty".to_string()));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

fn duplicate_email(err: DbError, email: &str) -> ApiError {
    match err {
        DbError::Duplicate(_) => ApiError::Conflict(format!("Email already in use: {}", email)),
        other => other.into(),
    }
}

// ==================== User Routes ====================

/// POST /api/users
async fn create_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CredentialsRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    validate_email(&request.email)?;
    validate_password(&request.password)?;

    debug!("Creating user: {}", request.email);

    let password_hash = state.auth.hash_password(&request.password)?;

    let user = state
        .db
        .insert_user(NewUser {
            email: request.email.clone(),
            password_hash,
        })
        .await
        .map_err(|e| duplicate_email(e, &request.email))?;

    info!("Created user: {}", user.id);

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// PUT /api/users
async fn update_user(
    RequireAuth(user_id): RequireAuth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CredentialsRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    validate_email(&request.email)?;
    validate_password(&request.password)?;

    let password_hash = state.auth.hash_password(&request.password)?;

    let user = state
        .db
        .update_user_credentials(user_id, &request.email, &password_hash)
        .await
        .map_err(|e| duplicate_email(e, &request.email))?;

    info!("Updated user: {}", user.id);

    Ok(Json(user.into()))
}

/// Create user routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/users", post(create_user).put(update_user))
}
