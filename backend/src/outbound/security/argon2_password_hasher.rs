//! Argon2id password hashing.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=...`), so the parameters and
//! salt travel with the hash and verification needs no extra state.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use thiserror::Error;
use tracing::warn;

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Rejected Argon2 cost parameters.
#[derive(Debug, Error)]
#[error("invalid argon2 parameters: {0}")]
pub struct HasherConfigError(String);

/// [`PasswordHasher`] backed by Argon2id.
#[derive(Debug, Clone)]
pub struct Argon2PasswordHasher {
    params: Params,
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl Argon2PasswordHasher {
    /// Build a hasher with explicit costs: memory in KiB, iterations and
    /// lanes.
    pub fn with_costs(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, HasherConfigError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|err| HasherConfigError(err.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| PasswordHashError::hashing(err.to_string()))
    }

    fn verify(&self, password: &str, stored_hash: &str) -> bool {
        let parsed = match PasswordHash::new(stored_hash) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(error = %err, "stored password hash is malformed");
                return false;
            }
        };
        self.argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
