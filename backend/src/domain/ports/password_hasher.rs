//! Driven port for salted password hashing.

use super::define_port_error;

define_port_error! {
    /// Errors raised while hashing a password.
    pub enum PasswordHashError {
        /// The hasher rejected its input or parameters.
        Hashing { message: String } => "password hashing failed: {message}",
    }
}

/// Produces and checks self-describing password hashes.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash `password` with a fresh salt.
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Check `password` against a stored hash. Malformed hashes never match.
    fn verify(&self, password: &str, stored_hash: &str) -> bool;
}
