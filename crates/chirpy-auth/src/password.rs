//! Password hashing
//!
//! Argon2id with a random salt per hash and a fixed, configurable work
//! factor. Verification failures of any kind collapse into
//! [`AuthError::InvalidCredentials`].

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::debug;

use crate::error::AuthError;

/// Argon2 work factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashingParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// One-way password hasher
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    /// Hash of a random secret, verified against when the account is unknown
    dummy_hash: String,
}

impl CredentialHasher {
    /// Create a hasher with the given work factor
    pub fn new(params: HashingParams) -> Result<Self, AuthError> {
        let params = Params::new(params.memory_kib, params.iterations, params.parallelism, None)
            .map_err(|e| AuthError::PasswordHash(format!("Invalid hashing parameters: {}", e)))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let dummy_salt = SaltString::generate(&mut OsRng);
        let dummy_hash = argon2
            .hash_password(dummy_salt.as_str().as_bytes(), &SaltString::generate(&mut OsRng))
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?
            .to_string();

        Ok(Self { argon2, dummy_hash })
    }

    /// Hash a password for storage
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash
    pub fn verify(&self, password: &str, hash: &str) -> Result<(), AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            debug!("Stored password hash is unreadable: {}", e);
            AuthError::InvalidCredentials
        })?;

        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| AuthError::InvalidCredentials)
    }

    /// Spend the same effort as [`verify`](Self::verify) for an unknown account, then fail
    pub fn verify_absent(&self, password: &str) -> AuthError {
        let _ = self.verify(password, &self.dummy_hash);
        AuthError::InvalidCredentials
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> CredentialHasher {
        CredentialHasher::new(HashingParams {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_password_hash_and_verify_correct() {
        let hasher = fast_hasher();
        let hash = hasher.hash("04234").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("04234", &hash).is_ok());
    }

    #[test]
    fn test_password_verify_wrong() {
        let hasher = fast_hasher();
        let hash = hasher.hash("correct-password").unwrap();
        assert!(matches!(
            hasher.verify("wrong-password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_password_different_salts() {
        let hasher = fast_hasher();
        let hash1 = hasher.hash("same-password").unwrap();
        let hash2 = hasher.hash("same-password").unwrap();
        assert_ne!(hash1, hash2);
        assert!(hasher.verify("same-password", &hash1).is_ok());
        assert!(hasher.verify("same-password", &hash2).is_ok());
    }

    #[test]
    fn test_hash_from_other_params_still_verifies() {
        let hash = fast_hasher().hash("portable").unwrap();
        let stronger = CredentialHasher::new(HashingParams {
            memory_kib: 128,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();
        assert!(stronger.verify("portable", &hash).is_ok());
    }

    #[test]
    fn test_malformed_hash_is_invalid_credentials() {
        let hasher = fast_hasher();
        assert!(matches!(
            hasher.verify("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_absent_always_fails() {
        let hasher = fast_hasher();
        assert!(matches!(
            hasher.verify_absent(""),
            AuthError::InvalidCredentials
        ));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let result = CredentialHasher::new(HashingParams {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        });
        assert!(matches!(result, Err(AuthError::PasswordHash(_))));
    }
}
