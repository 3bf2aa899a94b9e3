//! Chirp operations

use chrono::Utc;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{Chirp, ChirpQuery, NewChirp};
use crate::repository::Database;
use crate::utils::format_datetime;

impl Database {
    /// Insert a new chirp
    pub async fn insert_chirp(&self, chirp: NewChirp) -> Result<Chirp, DbError> {
        let now = Utc::now();
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO chirps (id, user_id, body, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(chirp.user_id.to_string())
        .bind(&chirp.body)
        .bind(format_datetime(&now))
        .bind(format_datetime(&now))
        .execute(&self.pool)
        .await?;

        Ok(Chirp {
            id,
            user_id: chirp.user_id,
            body: chirp.body,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a chirp by ID
    pub async fn get_chirp(&self, id: Uuid) -> Result<Option<Chirp>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, user_id, body, created_at, updated_at
            FROM chirps
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Chirp::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// List chirps, optionally filtered by author, ordered by creation time
    pub async fn list_chirps(&self, query: &ChirpQuery) -> Result<Vec<Chirp>, DbError> {
        // Only the fixed ASC/DESC keyword is interpolated; values are bound
        let sql = format!(
            r#"
            SELECT id, user_id, body, created_at, updated_at
            FROM chirps
            WHERE (? IS NULL OR user_id = ?)
            ORDER BY created_at {order}, rowid {order}
            "#,
            order = query.sort.as_sql()
        );

        let author = query.author_id.map(|id| id.to_string());
        let rows = sqlx::query(&sql)
            .bind(author.clone())
            .bind(author)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| Chirp::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Replace the body of a chirp
    pub async fn update_chirp_body(&self, id: Uuid, body: &str) -> Result<Option<Chirp>, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE chirps
            SET body = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(body)
        .bind(format_datetime(&now))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_chirp(id).await
    }

    /// Delete a chirp owned by the given user
    pub async fn delete_chirp(&self, id: Uuid, user_id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM chirps WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewUser, SortOrder};

    async fn seed_user(db: &Database, email: &str) -> Uuid {
        db.insert_user(NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
        })
        .await
        .unwrap()
        .id
    }

    async fn post(db: &Database, user_id: Uuid, body: &str) -> Chirp {
        db.insert_chirp(NewChirp {
            user_id,
            body: body.to_string(),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_chirps_filter_and_sort() {
        let db = Database::in_memory().await.unwrap();
        let walt = seed_user(&db, "walt@breakingbad.com").await;
        let jesse = seed_user(&db, "jesse@breakingbad.com").await;

        let first = post(&db, walt, "I'm the one who knocks!").await;
        let second = post(&db, jesse, "Yeah science!").await;
        let third = post(&db, walt, "Say my name").await;

        let all = db.list_chirps(&ChirpQuery::default()).await.unwrap();
        let ids: Vec<Uuid> = all.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![first.id, second.id, third.id]);

        let desc = db
            .list_chirps(&ChirpQuery {
                author_id: None,
                sort: SortOrder::Desc,
            })
            .await
            .unwrap();
        assert_eq!(desc.first().unwrap().id, third.id);

        let walts = db
            .list_chirps(&ChirpQuery {
                author_id: Some(walt),
                sort: SortOrder::Asc,
            })
            .await
            .unwrap();
        assert_eq!(walts.len(), 2);
        assert!(walts.iter().all(|c| c.user_id == walt));
    }

    #[tokio::test]
    async fn test_update_and_delete_chirp() {
        let db = Database::in_memory().await.unwrap();
        let walt = seed_user(&db, "walt@breakingbad.com").await;
        let jesse = seed_user(&db, "jesse@breakingbad.com").await;
        let chirp = post(&db, walt, "draft").await;

        let updated = db.update_chirp_body(chirp.id, "final").await.unwrap().unwrap();
        assert_eq!(updated.body, "final");
        assert!(db.update_chirp_body(Uuid::new_v4(), "x").await.unwrap().is_none());

        // Only the owner's delete matches a row
        assert!(!db.delete_chirp(chirp.id, jesse).await.unwrap());
        assert!(db.delete_chirp(chirp.id, walt).await.unwrap());
        assert!(db.get_chirp(chirp.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_chirps_removed_with_users() {
        let db = Database::in_memory().await.unwrap();
        let walt = seed_user(&db, "walt@breakingbad.com").await;
        post(&db, walt, "gone soon").await;

        assert_eq!(db.delete_all_users().await.unwrap(), 1);
        assert!(db.list_chirps(&ChirpQuery::default()).await.unwrap().is_empty());
    }
}
