// Password hashing and verification

use crate::auth::error::AuthError;
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Password service wrapping Argon2id
///
/// Hashing happens exactly where a plaintext password enters the system
/// (registration, or a profile update that includes a password); nothing
/// else ever touches the stored hash.
pub struct PasswordService;

impl PasswordService {
    /// Hash a password with a fresh random salt
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| AuthError::PasswordHash)
    }

    /// Verify a password against a stored PHC hash (constant-time)
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHash)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = PasswordService::hash_password("difference engine").unwrap();
        assert!(PasswordService::verify_password("difference engine", &hash).unwrap());
        assert!(!PasswordService::verify_password("analytical engine", &hash).unwrap());
    }

    #[test]
    fn test_hash_is_salted() {
        let first = PasswordService::hash_password("difference engine").unwrap();
        let second = PasswordService::hash_password("difference engine").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_hash_is_phc_encoded() {
        let hash = PasswordService::hash_password("difference engine").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("difference engine"));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(PasswordService::verify_password("whatever", "not-a-hash").is_err());
    }
}
