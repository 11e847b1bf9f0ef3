//! Login credentials stored as Argon2id PHC strings.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, Version};
use investa_shared::AppError;
use thiserror::Error;

/// Failure inside the password primitives. Never caused by a wrong password.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Hashing a new password failed.
    #[error("failed to hash password: {0}")]
    Hash(String),

    /// A stored `password_hash` is not a PHC string Argon2 can read.
    #[error("stored password hash is corrupt")]
    CorruptHash,
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Hashes passwords on registration and checks them on login.
#[derive(Clone)]
pub struct Credentials {
    argon2: Argon2<'static>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").finish_non_exhaustive()
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default()),
        }
    }
}

impl Credentials {
    /// Produces the `password_hash` stored on a user record.
    ///
    /// # Errors
    ///
    /// `PasswordError::Hash` if Argon2 rejects the input.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Hash(e.to_string()))
    }

    /// Checks `plaintext` against a stored hash.
    ///
    /// With no stored hash (unknown username) a throwaway hash is computed
    /// so the response takes about as long as a real check, and `false` is
    /// returned.
    ///
    /// # Errors
    ///
    /// `PasswordError::CorruptHash` for an unreadable stored hash.
    pub fn check(&self, plaintext: &str, stored: Option<&str>) -> Result<bool, PasswordError> {
        let Some(stored) = stored else {
            self.hash(plaintext)?;
            return Ok(false);
        };

        let parsed = PasswordHash::new(stored).map_err(|_| PasswordError::CorruptHash)?;
        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(_) => Err(PasswordError::CorruptHash),
        }
    }
}
