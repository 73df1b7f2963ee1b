//! Argon2id password hashing and the account password policy

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use mart_core::DomainError;

use crate::error::AppError;

const MIN_LEN: usize = 8;
const MAX_LEN: usize = 128;

/// # Errors
/// Returns an error if hashing fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::internal(anyhow::anyhow!("password hashing failed: {e}")))
}

/// `Ok(false)` on mismatch
///
/// # Errors
/// Returns an error if the stored hash cannot be parsed
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::internal(anyhow::anyhow!("stored password hash is malformed: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// 8 to 128 characters with at least one letter and one digit
///
/// # Errors
/// Returns `WeakPassword` naming the first rule that failed
pub fn validate_password_strength(password: &str) -> Result<(), DomainError> {
    let len = password.chars().count();
    if len < MIN_LEN {
        return Err(DomainError::WeakPassword(format!(
            "must be at least {MIN_LEN} characters long"
        )));
    }
    if len > MAX_LEN {
        return Err(DomainError::WeakPassword(format!(
            "must be at most {MAX_LEN} characters long"
        )));
    }
    if !password.chars().any(char::is_alphabetic) {
        return Err(DomainError::WeakPassword("must contain a letter".to_string()));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(DomainError::WeakPassword("must contain a digit".to_string()));
    }
    Ok(())
}
