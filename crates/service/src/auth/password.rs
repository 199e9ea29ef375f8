//! Argon2 password hashing (PHC string format).
use std::sync::OnceLock;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use rand::rngs::OsRng;

use super::errors::AuthError;

pub const ALGORITHM: &str = "argon2";
pub const MIN_LENGTH: usize = 8;

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::HashError(e.to_string()))?
        .to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::HashError(e.to_string()))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

fn dummy_hash() -> Option<&'static str> {
    DUMMY_HASH.get_or_init(|| hash_password("cras-unused-password").ok()).as_deref()
}

/// Runs one verification against a throwaway hash so that logins without a
/// stored hash cost the same as a wrong password.
pub fn verify_dummy(password: &str) {
    if let Some(hash) = dummy_hash() {
        let _ = verify_password(password, hash);
    }
}

/// Length rule applied before hashing.
pub fn check_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_LENGTH {
        return Err(format!("Ensure this field has at least {MIN_LENGTH} characters."));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_salted_and_verifiable() {
        let h1 = hash_password("Passw0rd!").unwrap();
        let h2 = hash_password("Passw0rd!").unwrap();
        assert_ne!(h1, h2);
        assert!(h1.starts_with("$argon2"));
        assert!(verify_password("Passw0rd!", &h1).unwrap());
        assert!(!verify_password("wrong", &h1).unwrap());
    }

    #[test]
    fn short_passwords_rejected() {
        assert!(check_strength("1234567").is_err());
        assert!(check_strength("12345678").is_ok());
    }

    #[test]
    fn dummy_hash_is_a_real_argon2_hash() {
        let h = dummy_hash().unwrap();
        assert!(h.starts_with("$argon2"));
        assert!(!verify_password("whatever1", h).unwrap());
        assert_eq!(dummy_hash(), Some(h));
        verify_dummy("whatever1");
    }
}
