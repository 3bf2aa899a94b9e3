//! Authentication facade
//!
//! Composes the password hasher, the JWT signer, the bearer extractor and
//! the session store into the login, refresh, revoke and authorize flows
//! the HTTP handlers call.

use axum::http::HeaderMap;
use chirpy_db::{DbError, User};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::bearer::bearer_token;
use crate::error::AuthError;
use crate::jwt::{JwtManager, checked_expiry};
use crate::password::{CredentialHasher, HashingParams};
use crate::session::{SessionState, SessionStore, generate_refresh_token};

/// Settings the facade is built from, resolved once at startup
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// HS256 signing secret for access tokens
    pub jwt_secret: String,
    /// Access token lifetime
    pub access_token_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_token_ttl: Duration,
    /// Password hashing work factor
    pub hashing: HashingParams,
}

impl AuthSettings {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            access_token_ttl: Duration::hours(1),
            refresh_token_ttl: Duration::days(60),
            hashing: HashingParams::default(),
        }
    }
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn SessionStore>,
    jwt: JwtManager,
    hasher: CredentialHasher,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
}

impl AuthService {
    /// Create the service over a session store
    pub fn new(store: Arc<dyn SessionStore>, settings: &AuthSettings) -> Result<Self, AuthError> {
        Ok(Self {
            store,
            jwt: JwtManager::new(&settings.jwt_secret),
            hasher: CredentialHasher::new(settings.hashing)?,
            access_token_ttl: settings.access_token_ttl,
            refresh_token_ttl: settings.refresh_token_ttl,
        })
    }

    /// Hash a password for storage
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        self.hasher.hash(password)
    }

    /// Issue an access token for a user
    pub fn issue_access_token(&self, user_id: Uuid) -> Result<String, AuthError> {
        self.jwt.issue(user_id, self.access_token_ttl)
    }

    // ==================== Flows ====================

    /// Check credentials and open a new session
    ///
    /// Unknown email and wrong password are indistinguishable to the caller,
    /// in result and in the work performed.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginSession, AuthError> {
        debug!("Login attempt for: {}", email);

        let user = match self.store.find_user_by_email(email).await? {
            Some(user) => {
                self.hasher.verify(password, &user.password_hash)?;
                user
            }
            None => return Err(self.hasher.verify_absent(password)),
        };

        let access_token = self.issue_access_token(user.id)?;

        let refresh_token = generate_refresh_token();
        let expires_at = checked_expiry(Utc::now(), self.refresh_token_ttl)?;
        self.store
            .create_refresh_token(user.id, &refresh_token, expires_at)
            .await?;

        info!("User {} logged in", user.id);

        Ok(LoginSession {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Exchange the bearer refresh token for a new access token
    pub async fn refresh(&self, headers: &HeaderMap) -> Result<String, AuthError> {
        let token = bearer_token(headers)?;
        self.refresh_token(token).await
    }

    /// Exchange a refresh token for a new access token
    ///
    /// The refresh token itself is not rotated.
    pub async fn refresh_token(&self, token: &str) -> Result<String, AuthError> {
        let session = match self.store.find_refresh_token(token).await {
            Ok(session) => session,
            Err(DbError::NotFound(_)) => {
                debug!("Refresh with unknown token");
                return Err(AuthError::SessionNotActive);
            }
            Err(e) => return Err(e.into()),
        };

        let state = SessionState::of(&session, Utc::now());
        if !state.is_active() {
            debug!("Refresh with {} session of user {}", state.as_str(), session.user_id);
            return Err(AuthError::SessionNotActive);
        }

        self.issue_access_token(session.user_id)
    }

    /// Revoke the bearer refresh token
    pub async fn revoke(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let token = bearer_token(headers)?;
        self.revoke_token(token).await
    }

    /// Revoke a refresh token; already revoked, expired or unknown tokens succeed
    pub async fn revoke_token(&self, token: &str) -> Result<(), AuthError> {
        self.store.revoke_refresh_token(token).await?;
        debug!("Refresh token revoked");
        Ok(())
    }

    /// Resolve the user behind the bearer access token
    pub fn authorize(&self, headers: &HeaderMap) -> Result<Uuid, AuthError> {
        let token = bearer_token(headers)?;
        self.jwt.validate(token)
    }

    /// Drop every session
    pub async fn clear_sessions(&self) -> Result<u64, AuthError> {
        let removed = self.store.delete_all_refresh_tokens().await?;
        info!("Cleared {} refresh token sessions", removed);
        Ok(removed)
    }
}
