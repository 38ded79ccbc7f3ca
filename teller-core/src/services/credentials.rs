//! Credential service - password hashing and verification
//!
//! Passwords are hashed with Argon2id and stored as PHC strings, which embed
//! the algorithm, cost parameters and a random per-password salt.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;

use crate::domain::result::{Error, Result};
use crate::domain::HashParams;

/// One-way password hashing
#[derive(Debug, Clone)]
pub struct CredentialService {
    params: HashParams,
}

impl CredentialService {
    pub fn new(params: HashParams) -> Self {
        Self { params }
    }

    fn hasher(&self) -> Result<Argon2<'static>> {
        let params = Params::new(
            self.params.memory_cost_kib,
            self.params.time_cost,
            self.params.parallelism,
            None,
        )
        .map_err(|e| Error::Config(format!("invalid argon2 parameters: {e}")))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hash a plaintext secret into a storable PHC string
    pub fn hash(&self, secret: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .hasher()?
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| Error::Other(format!("password hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    /// Check a candidate against a stored hash
    ///
    /// Returns `Ok(false)` on mismatch. Only a stored hash that cannot be
    /// parsed is an error (`Error::Integrity`). The comparison itself is
    /// constant-time, and uses the parameters recorded in the stored hash.
    pub fn verify(&self, stored_hash: &str, candidate: &str) -> Result<bool> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|e| Error::integrity(format!("stored password hash is malformed: {e}")))?;

        match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(Error::integrity(format!("stored password hash is unusable: {e}"))),
        }
    }
}
