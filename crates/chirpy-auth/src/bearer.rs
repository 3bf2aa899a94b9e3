//! Authorization header extraction
//!
//! Two independent schemes share the `Authorization` header: `Bearer` for
//! access and refresh tokens, `ApiKey` for the Polka webhook.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use subtle::ConstantTimeEq;

use crate::error::AuthError;

const BEARER_PREFIX: &str = "Bearer ";
const API_KEY_PREFIX: &str = "ApiKey ";

/// Extract the bearer token from the authorization header
///
/// Only a leading, case-sensitive `Bearer ` is stripped; a value without
/// that scheme is rejected rather than passed through.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    credential(headers, BEARER_PREFIX)
}

/// Extract the webhook API key from the authorization header
pub fn api_key(headers: &HeaderMap) -> Result<&str, AuthError> {
    credential(headers, API_KEY_PREFIX)
}

/// Compare a presented API key with the configured one in constant time
pub fn api_key_matches(provided: &str, expected: &str) -> bool {
    !expected.is_empty() && bool::from(provided.as_bytes().ct_eq(expected.as_bytes()))
}

fn credential<'a>(headers: &'a HeaderMap, scheme: &str) -> Result<&'a str, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let value = header
        .strip_prefix(scheme)
        .ok_or(AuthError::InvalidAuthHeader)?
        .trim();

    if value.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extracted() {
        let headers = headers("Bearer abc123");
        assert_eq!(bearer_token(&headers).unwrap(), "abc123");
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(AuthError::MissingAuthHeader)
        ));
        assert!(matches!(
            api_key(&HeaderMap::new()),
            Err(AuthError::MissingAuthHeader)
        ));
    }

    #[test]
    fn test_scheme_required() {
        for value in ["abc123", "bearer abc123", "Basic dXNlcjpwYXNz", "Bearer", "Bearer    "] {
            assert!(
                matches!(bearer_token(&headers(value)), Err(AuthError::InvalidAuthHeader)),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_only_leading_prefix_is_stripped() {
        let headers = headers("Bearer abcBearer 123");
        assert_eq!(bearer_token(&headers).unwrap(), "abcBearer 123");
    }

    #[test]
    fn test_non_ascii_header_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xfftoken").unwrap(),
        );
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::InvalidAuthHeader)
        ));
    }

    #[test]
    fn test_api_key_is_separate_scheme() {
        let with_key = headers("ApiKey f271c81ff7084ee5b99a5091b42d486e");
        assert_eq!(api_key(&with_key).unwrap(), "f271c81ff7084ee5b99a5091b42d486e");
        assert!(bearer_token(&with_key).is_err());

        let with_bearer = headers("Bearer f271c81ff7084ee5b99a5091b42d486e");
        assert!(api_key(&with_bearer).is_err());
    }

    #[test]
    fn test_api_key_matches() {
        assert!(api_key_matches("secret", "secret"));
        assert!(!api_key_matches("secret", "Secret"));
        assert!(!api_key_matches("secret", "secret-longer"));
        assert!(!api_key_matches("", ""));
    }
}
