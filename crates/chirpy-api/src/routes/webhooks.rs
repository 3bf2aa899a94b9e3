//! Polka payment webhook

use axum::{
    Router,
    extract::{FromRef, FromRequestParts, State},
    http::{StatusCode, request::Parts},
    routing::post,
};
use chirpy_auth::{api_key, api_key_matches};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

use super::types::PolkaWebhookRequest;

/// Event that upgrades a user to Chirpy Red; everything else is acknowledged and ignored
const USER_UPGRADED: &str = "user.upgraded";

/// Extractor that admits only callers presenting the Polka API key
pub struct RequirePolkaKey;

impl<S> FromRequestParts<S> for RequirePolkaKey
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let provided = api_key(&parts.headers)?;
        if !api_key_matches(provided, &app_state.polka_key) {
            debug!("Webhook call with wrong API key");
            return Err(ApiError::Unauthorized);
        }

        Ok(RequirePolkaKey)
    }
}

/// POST /api/polka/webhooks
async fn polka_webhook(
    _key: RequirePolkaKey,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PolkaWebhookRequest>,
) -> Result<StatusCode, ApiError> {
    if request.event != USER_UPGRADED {
        debug!("Ignoring webhook event: {}", request.event);
        return Ok(StatusCode::NO_CONTENT);
    }

    let raw = request
        .data
        .user_id
        .ok_or_else(|| ApiError::BadRequest("Missing data.user_id".to_string()))?;
    let user_id = Uuid::parse_str(&raw)
        .map_err(|_| ApiError::BadRequest(format!("Invalid user_id: {}", raw)))?;

    if !state.db.upgrade_user_to_chirpy_red(user_id).await? {
        return Err(ApiError::NotFound(format!("User not found: {}", user_id)));
    }

    info!("User {} upgraded to Chirpy Red", user_id);

    Ok(StatusCode::NO_CONTENT)
}

/// Create webhook routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/polka/webhooks", post(polka_webhook))
}
