//! Session key fingerprints for startup logs.
//!
//! Operators compare fingerprints across replicas to confirm they share a
//! signing key after rotation. Only a truncated digest is ever printed.

use actix_web::cookie::Key;
use sha2::{Digest, Sha256};

/// Digest bytes kept before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Truncated SHA-256 of the key's signing half, as lowercase hex.
///
/// # Examples
///
/// ```rust
/// use actix_web::cookie::Key;
/// use biblioteka::inbound::http::session_config::fingerprint::key_fingerprint;
///
/// let fp = key_fingerprint(&Key::generate());
/// assert_eq!(fp.len(), 16);
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}
