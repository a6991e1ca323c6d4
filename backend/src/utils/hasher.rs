//! Salted bcrypt hashing for stored passwords.

use bcrypt::{Version, hash_with_salt, verify};
use rand::RngCore;

use crate::errors::HashError;

const SALT_LEN: usize = 16;

/// Hashes and checks secrets with an adaptive-cost bcrypt hash.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Generates a fresh random salt, hex encoded.
    pub fn salt(&self) -> String {
        let mut bytes = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Hashes `secret` with a salt produced by [`PasswordHasher::salt`].
    ///
    /// The result is a standard `$2b$` string embedding cost and salt.
    pub fn hash(&self, secret: &str, salt: &str) -> Result<String, HashError> {
        let salt: [u8; SALT_LEN] = hex::decode(salt)
            .ok()
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or(HashError::MalformedSalt)?;

        hash_with_salt(secret, self.cost, salt)
            .map(|parts| parts.format_for_version(Version::TwoB))
            .map_err(|e| HashError::Hashing(e.to_string()))
    }

    /// Returns whether `candidate` matches `hash`. A mismatch is `Ok(false)`;
    /// only an unreadable hash is an error.
    pub fn check_hash(&self, hash: &str, candidate: &str) -> Result<bool, HashError> {
        verify(candidate, hash).map_err(|_| HashError::MalformedHash)
    }
}
