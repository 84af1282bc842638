use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("stored password hash is malformed: {0}")]
    Malformed(String),
    #[error("hashing task panicked: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// One-way password hashing service.
pub trait Hashing: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, HashError>;
    fn verify(&self, password: &str, hash: &str) -> Result<bool, HashError>;
}

/// Argon2id with the crate's default parameters.
#[derive(Default)]
pub struct Argon2Hashing {
    argon2: Argon2<'static>,
}

impl Hashing for Argon2Hashing {
    fn hash(&self, password: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| HashError::Hash(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, HashError> {
        let parsed = PasswordHash::new(hash).map_err(|e| HashError::Malformed(e.to_string()))?;
        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

/// Hash on the blocking pool; Argon2 is deliberately CPU-heavy.
pub async fn hash_blocking(hasher: Arc<dyn Hashing>, password: String) -> Result<String, HashError> {
    tokio::task::spawn_blocking(move || hasher.hash(&password)).await?
}

/// Verify on the blocking pool.
pub async fn verify_blocking(
    hasher: Arc<dyn Hashing>,
    password: String,
    hash: String,
) -> Result<bool, HashError> {
    tokio::task::spawn_blocking(move || hasher.verify(&password, &hash)).await?
}
