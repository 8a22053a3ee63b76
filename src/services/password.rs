//! Password hashing
//!
//! Argon2id hashes in PHC string format. Accounts created without a
//! password (fixtures, seeded users) carry an unusable marker instead of a
//! hash and can only be signed in through `UserService::force_login`.

use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use uuid::Uuid;

/// Prefix that marks a stored value as "no password set"
const UNUSABLE_PASSWORD_PREFIX: char = '!';

/// Hash a password using Argon2id with the crate defaults.
///
/// ```ignore
/// let hash = hash_password("my_secure_password")?;
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
        .context("Password hashing failed")?;

    Ok(password_hash.to_string())
}

/// A stored value that never matches any password
pub fn make_unusable_password() -> String {
    format!("{}{}", UNUSABLE_PASSWORD_PREFIX, Uuid::new_v4().simple())
}

/// Whether `hash` can ever verify a password
pub fn has_usable_password(hash: &str) -> bool {
    !hash.starts_with(UNUSABLE_PASSWORD_PREFIX)
}

/// Verify a password against a stored hash.
///
/// Returns `Ok(false)` on mismatch and for unusable passwords; a hash that
/// is neither unusable nor valid PHC is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    if !has_usable_password(hash) {
        return Ok(false);
    }

    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {}", e))
        .context("Failed to parse password hash")?;

    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow::anyhow!("Password verification failed: {}", e))
            .context("Password verification error"),
    }
}
