//! Authentication extractor and session routes

use axum::{
    Json, Router,
    extract::{FromRef, FromRequestParts, State},
    http::{HeaderMap, StatusCode, request::Parts},
    routing::post,
};
use chirpy_auth::AuthError;
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

use super::types::{CredentialsRequest, LoginResponse, TokenResponse};
use super::users::MAX_PASSWORD_LENGTH;

// ==================== Auth Extractor ====================

/// Extractor for the user behind a valid access token
pub struct RequireAuth(pub Uuid);

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let user_id = app_state.auth.authorize(&parts.headers)?;

        debug!("Authenticated user: {}", user_id);
        Ok(RequireAuth(user_id))
    }
}

// ==================== Auth Routes ====================

/// POST /api/login
async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CredentialsRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if request.password.len() > MAX_PASSWORD_LENGTH {
        return Err(AuthError::InvalidCredentials.into());
    }

    let session = match state.auth.login(&request.email, &request.password).await {
        Ok(session) => session,
        Err(e) => {
            let outcome = if e.status().is_server_error() { "error" } else { "rejected" };
            metrics::counter!("chirpy_logins_total", "outcome" => outcome).increment(1);
            return Err(e.into());
        }
    };
    metrics::counter!("chirpy_logins_total", "outcome" => "success").increment(1);

    Ok(Json(LoginResponse {
        user: session.user.into(),
        token: session.access_token,
        refresh_token: session.refresh_token,
    }))
}

/// POST /api/refresh
async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state.auth.refresh(&headers).await?;
    Ok(Json(TokenResponse { token }))
}

/// POST /api/revoke
async fn revoke(State(state): State<AppState>, headers: HeaderMap) -> Result<StatusCode, ApiError> {
    state.auth.revoke(&headers).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/refresh", post(refresh))
        .route("/api/revoke", post(revoke))
}
