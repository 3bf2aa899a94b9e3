//! Refresh token sessions
//!
//! A refresh token is an opaque random string persisted with an expiry and
//! an optional revocation time. Its lifecycle:
//!
//! ```text
//! Active ──(now >= expires_at)──> Expired
//!    └────────(revoke)──────────> Revoked
//! ```
//!
//! Both end states are terminal.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use async_trait::async_trait;
use chirpy_db::{Database, DbError, NewRefreshToken, RefreshToken, User};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Number of random bytes in a refresh token (hex-encoded to twice as many chars)
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Generate a new refresh token from the OS random source
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Lifecycle state of a refresh token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Expired,
    Revoked,
}

impl SessionState {
    /// State of a stored session at `now`
    pub fn of(session: &RefreshToken, now: DateTime<Utc>) -> Self {
        if session.revoked_at.is_some() {
            SessionState::Revoked
        } else if now >= session.expires_at {
            SessionState::Expired
        } else {
            SessionState::Active
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Active => "active",
            SessionState::Expired => "expired",
            SessionState::Revoked => "revoked",
        }
    }
}

/// Persistence the auth flows depend on
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Look up the account a login attempt names
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError>;

    /// Persist a new session
    async fn create_refresh_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, DbError>;

    /// Load a session; `DbError::NotFound` if the token is unknown
    async fn find_refresh_token(&self, token: &str) -> Result<RefreshToken, DbError>;

    /// Mark a session revoked; revoking twice or revoking an unknown token is not an error
    async fn revoke_refresh_token(&self, token: &str) -> Result<(), DbError>;

    /// Remove every session
    async fn delete_all_refresh_tokens(&self) -> Result<u64, DbError>;
}

#[async_trait]
impl SessionStore for Database {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        self.get_user_by_email(email).await
    }

    async fn create_refresh_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, DbError> {
        Database::create_refresh_token(
            self,
            NewRefreshToken {
                token: token.to_string(),
                user_id,
                expires_at,
            },
        )
        .await
    }

    async fn find_refresh_token(&self, token: &str) -> Result<RefreshToken, DbError> {
        self.get_refresh_token(token)
            .await?
            .ok_or_else(|| DbError::NotFound("Refresh token".to_string()))
    }

    async fn revoke_refresh_token(&self, token: &str) -> Result<(), DbError> {
        Database::revoke_refresh_token(self, token).await.map(|_| ())
    }

    async fn delete_all_refresh_tokens(&self) -> Result<u64, DbError> {
        Database::delete_all_refresh_tokens(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(expires_at: DateTime<Utc>, revoked_at: Option<DateTime<Utc>>) -> RefreshToken {
        let now = Utc::now();
        RefreshToken {
            token: generate_refresh_token(),
            user_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            expires_at,
            revoked_at,
        }
    }

    #[test]
    fn test_refresh_token_format() {
        let token = generate_refresh_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_refresh_token_uniqueness() {
        assert_ne!(generate_refresh_token(), generate_refresh_token());
    }

    #[test]
    fn test_session_state_transitions() {
        let now = Utc::now();
        let expires_at = now + Duration::days(60);
        let fresh = session(expires_at, None);

        assert_eq!(SessionState::of(&fresh, now), SessionState::Active);
        assert_eq!(SessionState::of(&fresh, expires_at - Duration::seconds(1)), SessionState::Active);
        assert_eq!(SessionState::of(&fresh, expires_at), SessionState::Expired);
        assert_eq!(SessionState::of(&fresh, expires_at + Duration::days(1)), SessionState::Expired);

        let revoked = session(expires_at, Some(now));
        assert_eq!(SessionState::of(&revoked, now), SessionState::Revoked);
        // Revocation wins over expiry
        assert_eq!(SessionState::of(&revoked, expires_at), SessionState::Revoked);
        assert!(!SessionState::Revoked.is_active());
    }

    #[tokio::test]
    async fn test_database_store_not_found() {
        let db = Database::in_memory().await.unwrap();
        let result = SessionStore::find_refresh_token(&db, "nope").await;
        assert!(matches!(result, Err(DbError::NotFound(_))));
        assert!(SessionStore::revoke_refresh_token(&db, "nope").await.is_ok());
    }
}
