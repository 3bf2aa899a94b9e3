//! Request/Response DTOs

use chirpy_db::{Chirp, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==================== User Types ====================

/// Registration, profile update and login request
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// User response (without password)
#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_chirpy_red: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
            is_chirpy_red: user.is_chirpy_red,
        }
    }
}

// ==================== Auth Types ====================

/// Login response: the user plus both tokens
#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
    pub refresh_token: String,
}

/// Refresh response
#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

// ==================== Chirp Types ====================

/// Create or edit a chirp
#[derive(Deserialize)]
pub struct ChirpRequest {
    pub body: String,
}

/// Chirp listing filters, kept as raw strings so bad values get a readable 400
#[derive(Deserialize, Default)]
pub struct ListChirpsParams {
    pub author_id: Option<String>,
    pub sort: Option<String>,
}

#[derive(Serialize)]
pub struct ChirpResponse {
    pub id: Uuid,
    pub body: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Chirp> for ChirpResponse {
    fn from(chirp: Chirp) -> Self {
        Self {
            id: chirp.id,
            body: chirp.body,
            user_id: chirp.user_id,
            created_at: chirp.created_at,
            updated_at: chirp.updated_at,
        }
    }
}

// ==================== Webhook Types ====================

/// Polka webhook payload
#[derive(Deserialize)]
pub struct PolkaWebhookRequest {
    pub event: String,
    #[serde(default)]
    pub data: PolkaWebhookData,
}

#[derive(Deserialize, Default)]
pub struct PolkaWebhookData {
    #[serde(default)]
    pub user_id: Option<String>,
}
