//! Salted password hashing with constant-time verification.
//!
//! Stored format is `base64(salt)$base64(sha256(salt || password))`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use constant_time_eq::constant_time_eq;
use rand::RngCore;
use sha2::{Digest, Sha256};

pub fn hash(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);

    let digest = digest_with_salt(&salt, password);
    format!("{}${}", STANDARD.encode(salt), STANDARD.encode(digest))
}

/// Returns false for malformed stored hashes rather than erroring; a
/// corrupt hash is indistinguishable from a wrong password to the caller.
pub fn verify(password: &str, stored: &str) -> bool {
    let Some((salt_b64, digest_b64)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = STANDARD.decode(salt_b64) else {
        return false;
    };
    let Ok(expected) = STANDARD.decode(digest_b64) else {
        return false;
    };

    let digest = digest_with_salt(&salt, password);
    constant_time_eq(&digest, &expected)
}

fn digest_with_salt(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_the_original_password() {
        let stored = hash("rahasia-123");
        assert!(verify("rahasia-123", &stored));
        assert!(!verify("rahasia-124", &stored));
    }

    #[test]
    fn hashes_are_salted() {
        assert_ne!(hash("same-password"), hash("same-password"));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify("anything", "not-a-hash"));
        assert!(!verify("anything", "xx$yy"));
        assert!(!verify("anything", ""));
    }
}
