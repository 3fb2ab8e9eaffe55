use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use std::sync::{Arc, OnceLock};

use super::AuthError;

/// One-way salted password hashing with a tunable cost.
///
/// Each hash carries its own salt and parameters in PHC format, so hashes
/// produced under different costs all verify.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
    /// Hash checked when there is no stored hash to compare against
    dummy_hash: Arc<OnceLock<String>>,
}

impl CredentialHasher {
    /// Build a hasher with an explicit memory cost (KiB) and iteration count
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, AuthError> {
        let params = Params::new(memory_kib, iterations, Params::DEFAULT_P_COST, None)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        Ok(Self::with_params(params))
    }

    fn with_params(params: Params) -> Self {
        Self {
            params,
            dummy_hash: Arc::new(OnceLock::new()),
        }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password using Argon2id with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash.
    ///
    /// A malformed stored hash never verifies.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };
        self.argon2()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Spend the same work as a real verification and always fail.
    ///
    /// Used when the account does not exist, so the response time does not
    /// reveal that.
    pub fn verify_dummy(&self, password: &str) -> bool {
        let hash = self
            .dummy_hash
            .get_or_init(|| self.hash("planboard-dummy-password").unwrap_or_default());
        self.verify(password, hash);
        false
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::with_params(Params::default())
    }
}
