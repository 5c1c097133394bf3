//! The encrypt/decrypt seam used by the dispatcher
//!
//! A [`CipherPrimitive`] turns text into a self-describing ciphertext
//! string and back. The dispatcher only sees this trait; the concrete
//! construction lives in [`SecretboxPrimitive`].

use crate::error::Result;
use crate::secretcrypt;
use crate::varmor;

/// Password-based symmetric encryption over text.
pub trait CipherPrimitive {
    /// Encrypt `plaintext`, returning an armored ciphertext string that
    /// carries everything needed for decryption except the password.
    fn encrypt(&self, plaintext: &str, password: &[u8]) -> Result<String>;

    /// Decrypt an armored ciphertext string, returning the raw plaintext bytes.
    fn decrypt(&self, ciphertext: &str, password: &[u8]) -> Result<Vec<u8>>;
}

/// scrypt key derivation + NaCl secretbox, armored as `textlock1:...`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SecretboxPrimitive;

impl CipherPrimitive for SecretboxPrimitive {
    fn encrypt(&self, plaintext: &str, password: &[u8]) -> Result<String> {
        let ciphertext = secretcrypt::encrypt(password, plaintext.as_bytes())
            .map_err(|e| e.with_context("encryption failed"))?;
        Ok(varmor::wrap(&ciphertext))
    }

    fn decrypt(&self, ciphertext: &str, password: &[u8]) -> Result<Vec<u8>> {
        let body = varmor::unwrap(ciphertext).map_err(|e| e.with_context("failed to unarmor"))?;
        secretcrypt::decrypt(password, &body).map_err(|e| e.with_context("failed to decrypt"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_roundtrip() {
        let primitive = SecretboxPrimitive;
        let armored = primitive.encrypt("hello world", b"pw123").unwrap();
        assert!(armored.starts_with(varmor::V1_MAGIC));
        assert_eq!(primitive.decrypt(&armored, b"pw123").unwrap(), b"hello world");
    }

    #[test]
    fn test_known_armored_ciphertext() {
        let armored = "textlock1:QkJCQkJCQkIkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQAAAAAAAAAHESH_s1vzxB1e0y5xlnag2Eo_PQwOYVKZs-1z9Q";
        let plaintext = SecretboxPrimitive.decrypt(armored, b"test").unwrap();
        assert_eq!(plaintext, b"test payload");
    }

    #[test]
    fn test_errors_keep_their_kind() {
        let err = SecretboxPrimitive
            .decrypt("not-a-real-ciphertext", b"pw123")
            .unwrap_err();
        assert_eq!(err.kind, Some(ErrorKind::ArmoringInvalid));
        assert_eq!(err.message(), "failed to unarmor");

        let armored = SecretboxPrimitive.encrypt("secret", b"one").unwrap();
        let err = SecretboxPrimitive.decrypt(&armored, b"two").unwrap_err();
        assert_eq!(err.kind, Some(ErrorKind::AuthenticationFailed));
    }
}
