//! JWT access token management

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::AuthError;

/// Issuer written into and required from every access token
pub const TOKEN_ISSUER: &str = "chirpy";

/// `now + ttl`, or [`AuthError::ExpiryOutOfRange`] past the representable range
pub(crate) fn checked_expiry(
    now: DateTime<Utc>,
    ttl: Duration,
) -> Result<DateTime<Utc>, AuthError> {
    now.checked_add_signed(ttl)
        .ok_or_else(|| AuthError::ExpiryOutOfRange(format!("now + {}", ttl)))
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Issuer
    pub iss: String,
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Unique token ID
    pub jti: String,
}

/// JWT manager for token generation and validation
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtManager {
    /// Create a new JWT manager with a symmetric HS256 secret
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue an access token for a user, valid for `ttl`
    pub fn issue(&self, user_id: Uuid, ttl: Duration) -> Result<String, AuthError> {
        self.issue_at(user_id, ttl, Utc::now())
    }

    fn issue_at(&self, user_id: Uuid, ttl: Duration, now: DateTime<Utc>) -> Result<String, AuthError> {
        let exp = checked_expiry(now, ttl)?;

        let claims = Claims {
            iss: TOKEN_ISSUER.to_string(),
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        debug!("Issuing access token for user: {}", user_id);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenSigning(e.to_string()))
    }

    /// Validate an access token and return the user it was issued to
    pub fn validate(&self, token: &str) -> Result<Uuid, AuthError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate an access token against an explicit clock
    ///
    /// A token is rejected once `now >= exp`. Every failure reports
    /// [`AuthError::InvalidToken`]; the cause is only logged.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid, AuthError> {
        let claims = self.claims_at(token, now)?;

        Uuid::parse_str(&claims.sub).map_err(|e| {
            debug!("Rejected access token: bad subject: {}", e);
            AuthError::InvalidToken
        })
    }

    /// Verify an access token and return its claims
    pub fn claims(&self, token: &str) -> Result<Claims, AuthError> {
        self.claims_at(token, Utc::now())
    }

    fn claims_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            debug!("Rejected access token: {}", e);
            AuthError::InvalidToken
        })?;

        // jsonwebtoken accepts exp == now; the boundary belongs to "expired"
        if token_data.claims.exp <= now.timestamp() {
            debug!("Rejected access token: expired at {}", token_data.claims.exp);
            return Err(AuthError::InvalidToken);
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key";

    #[test]
    fn test_token_generation_and_validation() {
        let manager = JwtManager::new(SECRET);
        let user_id = Uuid::parse_str("c9e88594-f26f-496f-bb20-192ed5cc80ba").unwrap();

        let token = manager.issue(user_id, Duration::hours(1)).unwrap();
        assert_eq!(manager.validate(&token).unwrap(), user_id);
    }

    #[test]
    fn test_invalid_token() {
        let manager = JwtManager::new(SECRET);

        assert!(matches!(
            manager.validate("invalid-token"),
            Err(AuthError::InvalidToken)
        ));
        assert!(manager.validate("").is_err());
    }

    #[test]
    fn test_wrong_secret_fails() {
        let token = JwtManager::new("secret-1")
            .issue(Uuid::new_v4(), Duration::hours(1))
            .unwrap();

        assert!(matches!(
            JwtManager::new("secret-2").validate(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expiry_boundary() {
        let manager = JwtManager::new(SECRET);
        let user_id = Uuid::new_v4();
        let token = manager.issue(user_id, Duration::hours(1)).unwrap();
        let issued = Utc::now();

        assert_eq!(
            manager.validate_at(&token, issued + Duration::minutes(59)).unwrap(),
            user_id
        );
        assert!(manager.validate_at(&token, issued + Duration::hours(2)).is_err());
    }

    #[test]
    fn test_rejected_exactly_at_expiry() {
        let manager = JwtManager::new(SECRET);
        let now = Utc::now();
        let token = manager
            .issue_at(Uuid::new_v4(), Duration::hours(1), now)
            .unwrap();

        let exp = DateTime::from_timestamp((now + Duration::hours(1)).timestamp(), 0).unwrap();
        assert!(manager.validate_at(&token, exp - Duration::seconds(1)).is_ok());
        assert!(manager.validate_at(&token, exp).is_err());
    }

    #[test]
    fn test_zero_ttl_is_already_expired() {
        let manager = JwtManager::new(SECRET);
        let token = manager.issue(Uuid::new_v4(), Duration::zero()).unwrap();
        assert!(manager.validate(&token).is_err());
    }

    #[test]
    fn test_claims_carry_ttl_and_subject() {
        let manager = JwtManager::new(SECRET);
        let user_id = Uuid::new_v4();
        let token = manager.issue(user_id, Duration::hours(1)).unwrap();

        let claims = manager.claims(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.iss, TOKEN_ISSUER);
    }

    #[test]
    fn test_unrepresentable_expiry_is_an_error() {
        let manager = JwtManager::new(SECRET);
        let result = manager.issue(Uuid::new_v4(), Duration::days(100_000_000));
        assert!(matches!(result, Err(AuthError::ExpiryOutOfRange(_))));
    }

    #[test]
    fn test_tokens_are_unique() {
        let manager = JwtManager::new(SECRET);
        let user_id = Uuid::new_v4();
        let a = manager.issue(user_id, Duration::hours(1)).unwrap();
        let b = manager.issue(user_id, Duration::hours(1)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let claims = Claims {
            iss: "someone-else".to_string(),
            sub: Uuid::new_v4().to_string(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(JwtManager::new(SECRET).validate(&token).is_err());
    }

    #[test]
    fn test_non_uuid_subject_rejected() {
        let claims = Claims {
            iss: TOKEN_ISSUER.to_string(),
            sub: "42".to_string(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            JwtManager::new(SECRET).validate(&token),
            Err(AuthError::InvalidToken)
        ));
    }
}
