//! Argon2id password hashing.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), so
//! verification reads the cost parameters back out of the stored value and keeps
//! working after the configured parameters change.
//!
//! Both operations are CPU-bound and run on Tokio's blocking pool.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(argon2::password_hash::Error),
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(argon2::password_hash::Error),
    #[error("password hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Default)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    pub fn with_params(params: Params) -> Self {
        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash_blocking(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(PasswordError::Hash)?;
        Ok(hash.to_string())
    }

    pub fn verify_blocking(&self, plaintext: &str, stored: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(stored).map_err(PasswordError::MalformedHash)?;
        match self.argon2().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(other) => Err(PasswordError::MalformedHash(other)),
        }
    }

    pub async fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let hasher = self.clone();
        let plaintext = plaintext.to_string();
        tokio::task::spawn_blocking(move || hasher.hash_blocking(&plaintext)).await?
    }

    pub async fn verify(&self, plaintext: &str, stored: &str) -> Result<bool, PasswordError> {
        let hasher = self.clone();
        let plaintext = plaintext.to_string();
        let stored = stored.to_string();
        tokio::task::spawn_blocking(move || hasher.verify_blocking(&plaintext, &stored)).await?
    }
}

#[cfg(test)]
pub(crate) fn fast_hasher() -> PasswordHasher {
    match Params::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST, None) {
        Ok(params) => PasswordHasher::with_params(params),
        Err(err) => panic!("minimum argon2 params rejected: {err}"),
    }
}
