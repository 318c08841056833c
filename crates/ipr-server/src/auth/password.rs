//! Password hashing and token digests

use sha2::{Digest, Sha256};

use super::models::AuthError;

/// Hash a plaintext password for storage on a local account
pub fn hash_password(plaintext: &str) -> Result<String, AuthError> {
    Ok(bcrypt::hash(plaintext, bcrypt::DEFAULT_COST)?)
}

/// Verify a plaintext password against a stored bcrypt hash
pub fn verify_password(plaintext: &str, hash: &str) -> Result<bool, AuthError> {
    Ok(bcrypt::verify(plaintext, hash)?)
}

/// Compute the sha256 digest of a bearer token, hex-encoded
///
/// Only digests are stored; a leaked `user_tokens` table does not yield
/// usable credentials.
pub fn token_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
