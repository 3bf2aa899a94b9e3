//! Refresh token session operations

use chrono::Utc;

use crate::error::DbError;
use crate::models::{NewRefreshToken, RefreshToken};
use crate::utils::format_datetime;

use super::Database;

impl Database {
    /// Store a new refresh token session
    pub async fn create_refresh_token(&self, token: NewRefreshToken) -> Result<RefreshToken, DbError> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (token, user_id, created_at, updated_at, expires_at, revoked_at)
            VALUES (?, ?, ?, ?, ?, NULL)
            "#,
        )
        .bind(&token.token)
        .bind(token.user_id.to_string())
        .bind(format_datetime(&now))
        .bind(format_datetime(&now))
        .bind(format_datetime(&token.expires_at))
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from_insert(e, "Refresh token already exists"))?;

        Ok(RefreshToken {
            token: token.token,
            user_id: token.user_id,
            created_at: now,
            updated_at: now,
            expires_at: token.expires_at,
            revoked_at: None,
        })
    }

    /// Get a refresh token session by its token string
    pub async fn get_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT token, user_id, created_at, updated_at, expires_at, revoked_at
            FROM refresh_tokens
            WHERE token = ?
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| RefreshToken::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Revoke a refresh token
    ///
    /// Keeps the first revocation time if the token was already revoked.
    /// Returns whether a session with this token exists.
    pub async fn revoke_refresh_token(&self, token: &str) -> Result<bool, DbError> {
        let now = format_datetime(&Utc::now());
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = COALESCE(revoked_at, ?), updated_at = ?
            WHERE token = ?
            "#,
        )
        .bind(&now)
        .bind(&now)
        .bind(token)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every refresh token session
    pub async fn delete_all_refresh_tokens(&self) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM refresh_tokens")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use chrono::Duration;
    use uuid::Uuid;

    async fn seed_user(db: &Database) -> Uuid {
        db.insert_user(NewUser {
            email: "gus@lospolloshermanos.com".to_string(),
            password_hash: "hash".to_string(),
        })
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_create_and_get_refresh_token() {
        let db = Database::in_memory().await.unwrap();
        let user_id = seed_user(&db).await;
        let expires_at = Utc::now() + Duration::days(60);

        db.create_refresh_token(NewRefreshToken {
            token: "abc".to_string(),
            user_id,
            expires_at,
        })
        .await
        .unwrap();

        let stored = db.get_refresh_token("abc").await.unwrap().unwrap();
        assert_eq!(stored.user_id, user_id);
        assert_eq!(
            format_datetime(&stored.expires_at),
            format_datetime(&expires_at)
        );
        assert!(stored.revoked_at.is_none());

        assert!(db.get_refresh_token("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let db = Database::in_memory().await.unwrap();
        let user_id = seed_user(&db).await;
        db.create_refresh_token(NewRefreshToken {
            token: "abc".to_string(),
            user_id,
            expires_at: Utc::now() + Duration::days(60),
        })
        .await
        .unwrap();

        assert!(db.revoke_refresh_token("abc").await.unwrap());
        let first = db.get_refresh_token("abc").await.unwrap().unwrap().revoked_at.unwrap();

        assert!(db.revoke_refresh_token("abc").await.unwrap());
        let second = db.get_refresh_token("abc").await.unwrap().unwrap().revoked_at.unwrap();
        assert_eq!(first, second);

        assert!(!db.revoke_refresh_token("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_all_refresh_tokens() {
        let db = Database::in_memory().await.unwrap();
        let user_id = seed_user(&db).await;
        for token in ["a", "b"] {
            db.create_refresh_token(NewRefreshToken {
                token: token.to_string(),
                user_id,
                expires_at: Utc::now(),
            })
            .await
            .unwrap();
        }

        assert_eq!(db.delete_all_refresh_tokens().await.unwrap(), 2);
        assert!(db.get_refresh_token("a").await.unwrap().is_none());
    }
}
