//! Password hashing and verification using Argon2id
//!
//! Stored format is `base64(salt):base64(digest)` with standard base64.
//! Parameters are not embedded in the stored string, so every hash is
//! produced and checked with [`PasswordConfig::default`]:
//! - Algorithm: Argon2id v0x13
//! - Memory: 64 MiB
//! - Iterations: 1
//! - Parallelism: 4 lanes
//! - Salt: 16 bytes from the OS RNG
//! - Output: 32 bytes

use argon2::{Algorithm, Argon2, Params, Version};
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::{rngs::OsRng, RngCore};
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Salt length in bytes
pub const SALT_LEN: usize = 16;

/// Well-formed stored value that no password matches. Checking against it
/// costs the same Argon2 work as checking a real account.
pub const DUMMY_HASH: &str = "Zm9saW8tZHVtbXktc2FsdA==:AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";

/// Password hashing errors
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashingFailed(String),

    #[error("Password task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

/// Argon2 cost parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordConfig {
    /// Memory cost in KiB (default: 65536 = 64 MiB)
    pub memory_cost: u32,
    /// Time cost (iterations, default: 1)
    pub time_cost: u32,
    /// Parallelism (lanes, default: 4)
    pub parallelism: u32,
    /// Digest length in bytes (default: 32)
    pub output_len: usize,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_cost: 64 * 1024,
            time_cost: 1,
            parallelism: 4,
            output_len: 32,
        }
    }
}

impl PasswordConfig {
    fn argon2(&self) -> Result<Argon2<'static>, PasswordError> {
        let params = Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            Some(self.output_len),
        )
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    fn derive(&self, password: &str, salt: &[u8]) -> Result<Vec<u8>, PasswordError> {
        let mut digest = vec![0u8; self.output_len];
        self.argon2()?
            .hash_password_into(password.as_bytes(), salt, &mut digest)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;
        Ok(digest)
    }
}

/// Hash a plaintext password with a fresh random salt
///
/// # Example
///
/// ```no_run
/// use folio_api::auth::password::{hash_password, verify_password};
///
/// let hash = hash_password("pw1").expect("Failed to hash password");
/// assert!(verify_password("pw1", &hash));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash_password_with_config(password, &PasswordConfig::default())
}

/// Hash a password with explicit parameters
pub fn hash_password_with_config(
    password: &str,
    config: &PasswordConfig,
) -> Result<String, PasswordError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let digest = config.derive(password, &salt)?;

    Ok(format!("{}:{}", STANDARD.encode(salt), STANDARD.encode(digest)))
}

/// Verify a plaintext password against a stored `salt:digest` string
///
/// Any malformed stored value simply fails verification.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    verify_password_with_config(password, encoded, &PasswordConfig::default())
}

/// Verify with explicit parameters (must match the ones used to hash)
pub fn verify_password_with_config(password: &str, encoded: &str, config: &PasswordConfig) -> bool {
    let Some((salt_b64, digest_b64)) = encoded.split_once(':') else {
        return false;
    };

    let (Ok(salt), Ok(expected)) = (STANDARD.decode(salt_b64), STANDARD.decode(digest_b64)) else {
        return false;
    };

    // Lengths are fixed by the KDF, not secret
    if expected.len() != config.output_len {
        return false;
    }

    match config.derive(password, &salt) {
        Ok(candidate) => candidate.ct_eq(&expected).into(),
        Err(_) => false,
    }
}

/// [`hash_password`] on the blocking thread pool
pub async fn hash_password_async(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password)).await?
}

/// [`verify_password`] on the blocking thread pool
pub async fn verify_password_async(password: String, encoded: String) -> Result<bool, PasswordError> {
    Ok(tokio::task::spawn_blocking(move || verify_password(&password, &encoded)).await?)
}
