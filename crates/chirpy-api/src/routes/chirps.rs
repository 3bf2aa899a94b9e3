//! Chirp routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use chirpy_core::validate_chirp;
use chirpy_db::{Chirp, ChirpQuery, NewChirp, SortOrder};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

use super::auth::RequireAuth;
use super::types::{ChirpRequest, ChirpResponse, ListChirpsParams};

fn parse_query(params: ListChirpsParams) -> Result<ChirpQuery, ApiError> {
    let author_id = match params.author_id.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => Some(
            Uuid::parse_str(raw)
                .map_err(|_| ApiError::BadRequest(format!("Invalid author_id: {}", raw)))?,
        ),
        None => None,
    };

    let sort = match params.sort.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => raw
            .parse::<SortOrder>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => SortOrder::default(),
    };

    Ok(ChirpQuery { author_id, sort })
}

/// Load a chirp and check the caller owns it
async fn owned_chirp(state: &AppState, id: Uuid, user_id: Uuid) -> Result<Chirp, ApiError> {
    let chirp = state
        .db
        .get_chirp(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Chirp not found: {}", id)))?;

    if chirp.user_id != user_id {
        debug!("User {} is not the author of chirp {}", user_id, id);
        return Err(ApiError::Forbidden);
    }
    Ok(chirp)
}

// ==================== Chirp Routes ====================

/// POST /api/chirps
async fn create_chirp(
    RequireAuth(user_id): RequireAuth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ChirpRequest>,
) -> Result<(StatusCode, Json<ChirpResponse>), ApiError> {
    let body = validate_chirp(&request.body, &state.profanity)?;

    let chirp = state.db.insert_chirp(NewChirp { user_id, body }).await?;

    info!("User {} posted chirp {}", user_id, chirp.id);

    Ok((StatusCode::CREATED, Json(chirp.into())))
}

/// GET /api/chirps
async fn list_chirps(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListChirpsParams>,
) -> Result<Json<Vec<ChirpResponse>>, ApiError> {
    let query = parse_query(params)?;
    let chirps = state.db.list_chirps(&query).await?;

    Ok(Json(chirps.into_iter().map(ChirpResponse::from).collect()))
}

/// GET /api/chirps/{id}
async fn get_chirp(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ChirpResponse>, ApiError> {
    let chirp = state
        .db
        .get_chirp(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Chirp not found: {}", id)))?;

    Ok(Json(chirp.into()))
}

/// PUT /api/chirps/{id}
async fn update_chirp(
    RequireAuth(user_id): RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<ChirpRequest>,
) -> Result<Json<ChirpResponse>, ApiError> {
    owned_chirp(&state, id, user_id).await?;
    let body = validate_chirp(&request.body, &state.profanity)?;

    let chirp = state
        .db
        .update_chirp_body(id, &body)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Chirp not found: {}", id)))?;

    info!("User {} edited chirp {}", user_id, id);

    Ok(Json(chirp.into()))
}

/// DELETE /api/chirps/{id}
async fn delete_chirp(
    RequireAuth(user_id): RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    owned_chirp(&state, id, user_id).await?;

    if !state.db.delete_chirp(id, user_id).await? {
        return Err(ApiError::NotFound(format!("Chirp not found: {}", id)));
    }

    info!("User {} deleted chirp {}", user_id, id);

    Ok(StatusCode::NO_CONTENT)
}

/// Create chirp routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/chirps", get(list_chirps).post(create_chirp))
        .route(
            "/api/chirps/{id}",
            get(get_chirp).put(update_chirp).delete(delete_chirp),
        )
}
