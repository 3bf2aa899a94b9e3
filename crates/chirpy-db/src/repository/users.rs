//! User operations

use chrono::Utc;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{NewUser, User};
use crate::repository::Database;
use crate::utils::format_datetime;

impl Database {
    // ==================== User Operations ====================

    /// Insert a new user
    pub async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        let now = Utc::now();
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, is_chirpy_red, created_at, updated_at)
            VALUES (?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(format_datetime(&now))
        .bind(format_datetime(&now))
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from_insert(e, format!("User '{}' already exists", user.email)))?;

        Ok(User {
            id,
            email: user.email,
            password_hash: user.password_hash,
            is_chirpy_red: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a user by email
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, email, password_hash, is_chirpy_red, created_at, updated_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get a user by ID
    pub async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, email, password_hash, is_chirpy_red, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Update a user's email and password hash
    pub async fn update_user_credentials(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<User, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = ?, password_hash = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(format_datetime(&now))
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from_insert(e, format!("User '{}' already exists", email)))?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("User: {}", id)));
        }

        self.get_user_by_id(id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("User: {}", id)))
    }

    /// Mark a user as a Chirpy Red subscriber
    pub async fn upgrade_user_to_chirpy_red(&self, id: Uuid) -> Result<bool, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_chirpy_red = 1, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(format_datetime(&now))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every user; chirps and refresh tokens go with them
    pub async fn delete_all_users(&self) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM users")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup_user() {
        let db = Database::in_memory().await.unwrap();

        let user = db.insert_user(new_user("saul@bettercall.com")).await.unwrap();
        assert!(!user.is_chirpy_red);

        let by_email = db.get_user_by_email("saul@bettercall.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);

        let by_id = db.get_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "saul@bettercall.com");

        assert!(db.get_user_by_email("kim@wexler.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = Database::in_memory().await.unwrap();

        db.insert_user(new_user("saul@bettercall.com")).await.unwrap();
        let result = db.insert_user(new_user("saul@bettercall.com")).await;
        assert!(matches!(result, Err(DbError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_update_credentials_and_upgrade() {
        let db = Database::in_memory().await.unwrap();
        let user = db.insert_user(new_user("saul@bettercall.com")).await.unwrap();

        let updated = db
            .update_user_credentials(user.id, "jimmy@mcgill.com", "new-hash")
            .await
            .unwrap();
        assert_eq!(updated.email, "jimmy@mcgill.com");
        assert_eq!(updated.password_hash, "new-hash");
        assert!(updated.updated_at >= user.updated_at);

        assert!(db.upgrade_user_to_chirpy_red(user.id).await.unwrap());
        assert!(db.get_user_by_id(user.id).await.unwrap().unwrap().is_chirpy_red);

        assert!(!db.upgrade_user_to_chirpy_red(Uuid::new_v4()).await.unwrap());
        let missing = db.update_user_credentials(Uuid::new_v4(), "a@b.c", "h").await;
        assert!(matches!(missing, Err(DbError::NotFound(_))));
    }
}
