//! Password hashing with Argon2

use std::sync::OnceLock;

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};

/// Hash a plaintext password into a PHC string
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Verify a plaintext password against a stored hash
pub fn verify_password(password_hash: &str, password: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Hash checked when no account matches, so unknown emails cost the same as wrong passwords
static DUMMY_HASH: OnceLock<String> = OnceLock::new();

fn dummy_password_hash() -> Result<&'static str> {
    if let Some(hash) = DUMMY_HASH.get() {
        return Ok(hash);
    }

    let hash = hash_password("dummy-password-for-missing-accounts")?;
    Ok(DUMMY_HASH.get_or_init(|| hash))
}

/// Verify `password` against the stored hash, or against a dummy hash when
/// there is no account
///
/// A missing account always yields `false`.
pub fn verify_password_or_dummy(password_hash: Option<&str>, password: &str) -> Result<bool> {
    match password_hash {
        Some(hash) => verify_password(hash, password),
        None => {
            verify_password(dummy_password_hash()?, password)?;
            Ok(false)
        }
    }
}

#[cfg(test)]
pub(crate) fn dummy_hash_is_initialized() -> bool {
    DUMMY_HASH.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_never_contains_plaintext() {
        let hash = hash_password("pass12").unwrap();
        assert!(!hash.contains("pass12"));
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("pass12").unwrap();
        assert!(verify_password(&hash, "pass12").unwrap());
        assert!(!verify_password(&hash, "pass13").unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        assert_ne!(
            hash_password("pass12").unwrap(),
            hash_password("pass12").unwrap()
        );
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(verify_password("not-a-hash", "pass12").is_err());
    }

    #[test]
    fn test_missing_account_runs_verifier_and_fails() {
        assert!(!verify_password_or_dummy(None, "pass12").unwrap());
        assert!(!verify_password_or_dummy(None, "dummy-password-for-missing-accounts").unwrap());

        let hash = dummy_password_hash().unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(PasswordHash::new(hash).is_ok());
        assert_eq!(dummy_password_hash().unwrap(), hash);
    }

    #[test]
    fn test_existing_account_uses_stored_hash() {
        let hash = hash_password("pass12").unwrap();
        assert!(verify_password_or_dummy(Some(&hash), "pass12").unwrap());
        assert!(!verify_password_or_dummy(Some(&hash), "pass13").unwrap());
    }
}
