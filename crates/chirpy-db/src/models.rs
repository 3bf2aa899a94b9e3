//! Database models

use crate::utils::{parse_datetime_or_now, parse_uuid};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Error type for parsing models from strings
#[derive(Debug, Clone)]
pub enum ParseError {
    InvalidSortOrder(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidSortOrder(s) => write!(f, "Invalid sort order: {}", s),
        }
    }
}

impl std::error::Error for ParseError {}

/// User model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_chirpy_red: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New user (for insertion)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
}

/// Chirp model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chirp {
    pub id: Uuid,
    pub user_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New chirp (for insertion)
#[derive(Debug, Clone)]
pub struct NewChirp {
    pub user_id: Uuid,
    pub body: String,
}

/// Ordering of chirp listings by creation time
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ParseError::InvalidSortOrder(s.to_string())),
        }
    }
}

/// Chirp listing filter
#[derive(Debug, Clone, Default)]
pub struct ChirpQuery {
    pub author_id: Option<Uuid>,
    pub sort: SortOrder,
}

/// Refresh token session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshToken {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// New refresh token (for insertion)
#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: parse_uuid(&row.try_get::<String, _>("id")?)?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            is_chirpy_red: row.try_get("is_chirpy_red")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Chirp {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(Chirp {
            id: parse_uuid(&row.try_get::<String, _>("id")?)?,
            user_id: parse_uuid(&row.try_get::<String, _>("user_id")?)?,
            body: row.try_get("body")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for RefreshToken {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(RefreshToken {
            token: row.try_get("token")?,
            user_id: parse_uuid(&row.try_get::<String, _>("user_id")?)?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
            // An unreadable expiry parses as "now", which reads as expired
            expires_at: parse_datetime_or_now(&row.try_get::<String, _>("expires_at")?),
            revoked_at: row
                .try_get::<Option<String>, _>("revoked_at")?
                .map(|s| parse_datetime_or_now(&s)),
        })
    }
}
