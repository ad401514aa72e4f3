//! Password hashing and verification using Argon2id

use crate::error::AppError;
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use once_cell::sync::OnceCell;
use std::sync::Arc;

const DUMMY_PASSWORD: &str = "dummy-password-for-unknown-accounts";

/// Password hasher with configurable parameters
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    // 首次需要时用本实例参数生成
    dummy_hash: Arc<OnceCell<String>>,
}

impl PasswordHasher {
    /// Create hasher with default parameters (OWASP recommended)
    pub fn new() -> Self {
        // m=64MiB, t=3 iterations, p=4 lanes
        let params = Params::new(65536, 3, 4, None).expect("Invalid Argon2 params");

        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            dummy_hash: Arc::default(),
        }
    }

    /// Create hasher with explicit cost parameters
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, AppError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| AppError::Config(format!("Invalid Argon2 params: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            dummy_hash: Arc::default(),
        })
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AppError::Internal(format!("Failed to hash password: {}", e))
            })?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a stored hash. Malformed hashes never verify.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Failed to parse stored password hash: {:?}", e);
                return false;
            }
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Spend one full verification when there is no stored hash to check,
    /// so a missing account costs the same as a wrong password
    pub fn verify_dummy(&self, password: &str) {
        match self.dummy_hash.get_or_try_init(|| self.hash(DUMMY_PASSWORD)) {
            Ok(hash) => {
                let _ = self.verify(password, hash);
            }
            Err(e) => tracing::warn!("Failed to prepare dummy hash: {}", e),
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::with_params(1024, 1, 1).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let password = "TestPassword123!";

        let hash = hasher.hash(password).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify(password, &hash));
    }

    #[test]
    fn test_verify_fails_with_wrong_password() {
        let hasher = fast_hasher();
        let hash = hasher.hash("TestPassword123!").unwrap();

        assert!(!hasher.verify("WrongPassword", &hash));
        assert!(!hasher.verify("TestPassword123", &hash));
    }

    #[test]
    fn test_hash_is_different_each_time() {
        let hasher = fast_hasher();
        let password = "TestPassword123!";

        let hash1 = hasher.hash(password).unwrap();
        let hash2 = hasher.hash(password).unwrap();

        assert_ne!(hash1, hash2);
        assert_ne!(hash1, password);
        assert!(hasher.verify(password, &hash1));
        assert!(hasher.verify(password, &hash2));
    }

    #[test]
    fn test_verify_with_malformed_hash() {
        let hasher = fast_hasher();

        assert!(!hasher.verify("TestPassword123!", "invalid_hash"));
        assert!(!hasher.verify("TestPassword123!", "$argon2id$v=19$invalid"));
        assert!(!hasher.verify("", ""));
    }

    #[test]
    fn test_hash_from_other_params_still_verifies() {
        // parameters are encoded in the PHC string
        let hash = fast_hasher().hash("TestPassword123!").unwrap();
        assert!(PasswordHasher::new().verify("TestPassword123!", &hash));
    }

    #[test]
    fn test_verify_dummy_uses_own_params() {
        let hasher = fast_hasher();
        assert!(hasher.dummy_hash.get().is_none());

        hasher.verify_dummy("whatever");
        let first = hasher.dummy_hash.get().cloned().unwrap();
        assert!(first.starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));

        // clones share the cached hash
        hasher.clone().verify_dummy("other");
        assert_eq!(hasher.dummy_hash.get(), Some(&first));
        assert!(!hasher.verify("whatever", &first));
    }

    #[test]
    fn test_invalid_params_rejected() {
        assert!(PasswordHasher::with_params(1, 1, 1).is_err());
    }
}
