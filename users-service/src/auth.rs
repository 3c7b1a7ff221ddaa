//! Credential service: Argon2id password hashing and token issuance.
//! Hashing is CPU and memory bound, so it runs on the blocking pool.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use async_trait::async_trait;
use bookstore_common::{auth::TokenIssuer, AppError};
use tokio::task;

/// Memory cost in KiB.
pub const ARGON2_MEMORY_KIB: u32 = 19_456;
pub const ARGON2_TIME_COST: u32 = 2;
pub const ARGON2_PARALLELISM: u32 = 1;
pub const ARGON2_OUTPUT_LEN: usize = 32;

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn hash_password(&self, password: String) -> Result<String, AppError>;
    async fn verify_password(&self, password: String, hash: String) -> Result<bool, AppError>;
    async fn generate_token(&self, user_id: i64) -> Result<String, AppError>;
}

/// Parameter set shared with hashes already stored by earlier deployments.
pub fn hasher() -> Result<Argon2<'static>, AppError> {
    let params = Params::new(ARGON2_MEMORY_KIB, ARGON2_TIME_COST, ARGON2_PARALLELISM, Some(ARGON2_OUTPUT_LEN))
        .map_err(|e| AppError::PasswordHash(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

#[derive(Clone)]
pub struct Argon2AuthService {
    issuer: TokenIssuer,
}

impl Argon2AuthService {
    pub fn new(issuer: TokenIssuer) -> Self { Self { issuer } }
}

#[async_trait]
impl AuthService for Argon2AuthService {
    async fn hash_password(&self, password: String) -> Result<String, AppError> {
        task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            hasher()?
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| AppError::PasswordHash(e.to_string()))
        })
        .await?
    }

    async fn verify_password(&self, password: String, hash_value: String) -> Result<bool, AppError> {
        task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&hash_value).map_err(|e| AppError::PasswordHash(e.to_string()))?;
            // Cost parameters come from the stored hash itself.
            match hasher()?.verify_password(password.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(e) => Err(AppError::PasswordHash(e.to_string())),
            }
        })
        .await?
    }

    async fn generate_token(&self, user_id: i64) -> Result<String, AppError> {
        Ok(self.issuer.issue(user_id)?)
    }
}
