//! Password hashing and generation

use rand::Rng;

use crate::error::Result;

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(Into::into)
}

/// Verify a password against a bcrypt hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Generate a secure random password
pub fn generate_secure_password(length: usize) -> String {
    const CHARSET: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("caja-chica").unwrap();
        assert_ne!(hash, "caja-chica");
        assert!(verify_password("caja-chica", &hash));
        assert!(!verify_password("otra", &hash));
    }

    #[test]
    fn test_verify_password_rejects_garbage_hash() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }

    #[test]
    fn test_generate_secure_password_length_and_variety() {
        let a = generate_secure_password(20);
        let b = generate_secure_password(20);
        assert_eq!(a.chars().count(), 20);
        assert_ne!(a, b);
    }
}
