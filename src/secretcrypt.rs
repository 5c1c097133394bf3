//! Encryption/decryption using scrypt + XSalsa20Poly1305
//!
//! This module implements password-based encryption using:
//! - scrypt for key derivation from the password
//! - NaCl secretbox (XSalsa20Poly1305) for authenticated encryption
//!
//! The binary format is:
//! - salt: 8 bytes
//! - nonce: 24 bytes
//! - length: 8 bytes (big-endian signed int64)
//! - sealed box: variable length (includes 16-byte Poly1305 MAC)

use crate::error::{ErrorCategory, ErrorKind, Result, TextlockError};
use crypto_secretbox::aead::{Aead, KeyInit};
use crypto_secretbox::{Nonce, XSalsa20Poly1305};
use rand::RngCore;
use rand::rngs::OsRng;
use scrypt::{Params, scrypt};
use std::mem::{size_of, size_of_val};
use zeroize::Zeroizing;

/// Length of salt in bytes
pub const SALT_LEN: usize = 8;

/// Length of nonce in bytes
pub const NONCE_LEN: usize = 24;

/// Length of derived key in bytes
const KEY_LEN: usize = 32;

/// scrypt N parameter (CPU/memory cost)
const SCRYPT_N: u32 = 32768;

/// scrypt r parameter (block size)
const SCRYPT_R: u32 = 8;

/// scrypt p parameter (parallelization)
const SCRYPT_P: u32 = 1;

/// Derive a 32-byte key from a password and salt using scrypt
fn derive_key(password: &[u8], salt: &[u8; SALT_LEN]) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let params = Params::new(SCRYPT_N.ilog2() as u8, SCRYPT_R, SCRYPT_P, KEY_LEN).map_err(|e| {
        TextlockError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::ScryptFailure,
            "failed to create scrypt params",
            e,
        )
    })?;

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    scrypt(password, salt, &params, key.as_mut_slice()).map_err(|e| {
        TextlockError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::ScryptFailure,
            "scrypt key derivation failed",
            e,
        )
    })?;

    Ok(key)
}

fn truncated(msg: &str) -> TextlockError {
    TextlockError::with_kind(ErrorCategory::User, ErrorKind::TruncatedInput, msg)
}

fn malformed(msg: &str) -> TextlockError {
    TextlockError::with_kind(ErrorCategory::User, ErrorKind::BinaryFormat, msg)
}

/// Encrypt plaintext with a password using random salt and nonce
///
/// Returns the binary format: salt(8) + nonce(24) + length(8) + sealedbox(variable)
pub fn encrypt(password: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    encrypt_deterministic(password, plaintext, &salt, &nonce)
}

/// Encrypt plaintext with a password using provided salt and nonce
///
/// This function is ONLY for known-answer tests that need deterministic
/// output. Everything else goes through [`encrypt`], which generates a
/// random salt and nonce.
pub fn encrypt_deterministic(
    password: &[u8],
    plaintext: &[u8],
    salt: &[u8; SALT_LEN],
    nonce: &[u8; NONCE_LEN],
) -> Result<Vec<u8>> {
    let key = derive_key(password, salt)?;

    let cipher = XSalsa20Poly1305::new(&(*key).into());

    let nonce_obj = Nonce::from(*nonce);
    let sealed_box = cipher.encrypt(&nonce_obj, plaintext).map_err(|e| {
        TextlockError::with_kind(
            ErrorCategory::Internal,
            ErrorKind::SecretboxFailure,
            format!("encryption failed: {}", e),
        )
    })?;

    let sealed_box_len = sealed_box.len() as i64;
    let mut output =
        Vec::with_capacity(SALT_LEN + NONCE_LEN + size_of_val(&sealed_box_len) + sealed_box.len());
    output.extend_from_slice(salt);
    output.extend_from_slice(nonce);
    output.extend_from_slice(&sealed_box_len.to_be_bytes()); // big-endian i64
    output.extend_from_slice(&sealed_box);

    Ok(output)
}

/// Decrypt ciphertext with a password
pub fn decrypt(password: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    let mut pos = 0;

    let salt: [u8; SALT_LEN] = ciphertext
        .get(pos..pos + SALT_LEN)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| truncated("input likely truncated while reading salt"))?;
    pos += SALT_LEN;

    let nonce: [u8; NONCE_LEN] = ciphertext
        .get(pos..pos + NONCE_LEN)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| truncated("input likely truncated while reading nonce"))?;
    pos += NONCE_LEN;

    let length_bytes: [u8; 8] = ciphertext
        .get(pos..pos + size_of::<i64>())
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| truncated("input likely truncated while reading sealed box"))?;
    let sealed_box_len = i64::from_be_bytes(length_bytes);
    pos += size_of::<i64>();

    if sealed_box_len < 0 {
        return Err(malformed(
            "negative sealed box length (when interpreted as a big-endian i64)",
        ));
    }

    // *Valid* input can fail this check if the platform's isize is small.
    if sealed_box_len > isize::MAX as i64 {
        return Err(malformed("sealed box length exceeds this system's max isize"));
    }

    let sealed_box_len = sealed_box_len as usize;

    if sealed_box_len > ciphertext.len() {
        return Err(truncated(
            "truncated or corrupt input; claimed length greater than available input",
        ));
    }

    let sealed_box = ciphertext
        .get(pos..pos + sealed_box_len)
        .ok_or_else(|| truncated("truncated or corrupt input (while reading sealed box)"))?;
    pos += sealed_box_len;

    if pos < ciphertext.len() {
        return Err(TextlockError::with_kind(
            ErrorCategory::User,
            ErrorKind::TrailingData,
            "invalid input: unexpected data after sealed box",
        ));
    }

    let key = derive_key(password, &salt)?;
    let cipher = XSalsa20Poly1305::new(&(*key).into());
    let nonce_obj = Nonce::from(nonce);
    let plaintext = cipher.decrypt(&nonce_obj, sealed_box).map_err(|_| {
        TextlockError::with_kind(
            ErrorCategory::User,
            ErrorKind::AuthenticationFailed,
            "corrupt input, tampered-with data, or bad password",
        )
    })?;

    Ok(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(result: Result<Vec<u8>>) -> Option<ErrorKind> {
        result.expect_err("expected decryption to fail").kind
    }

    #[test]
    fn test_small_plaintext() {
        let ciphertext = encrypt(b"test", b"hello").unwrap();
        let decrypted = decrypt(b"test", &ciphertext).unwrap();
        assert_eq!(b"hello", &decrypted[..]);
    }

    #[test]
    fn test_empty_plaintext() {
        let ciphertext = encrypt(b"test", b"").unwrap();
        assert!(decrypt(b"test", &ciphertext).unwrap().is_empty());
    }

    #[test]
    fn test_random_salt_and_nonce() {
        let ct1 = encrypt(b"test", b"hello world").unwrap();
        let ct2 = encrypt(b"test", b"hello world").unwrap();
        assert_ne!(ct1[..SALT_LEN + NONCE_LEN], ct2[..SALT_LEN + NONCE_LEN]);
    }

    #[test]
    fn test_different_nonce_different_ciphertext() {
        let salt = [1u8; SALT_LEN];
        let ct1 = encrypt_deterministic(b"test", b"hello world", &salt, &[2u8; NONCE_LEN]).unwrap();
        let ct2 = encrypt_deterministic(b"test", b"hello world", &salt, &[3u8; NONCE_LEN]).unwrap();

        assert_ne!(ct1, ct2);
        assert_eq!(decrypt(b"test", &ct1).unwrap(), b"hello world");
        assert_eq!(decrypt(b"test", &ct2).unwrap(), b"hello world");
    }

    #[test]
    fn test_wrong_password() {
        let ciphertext = encrypt(b"correct", b"secret data").unwrap();
        let err = decrypt(b"wrong", &ciphertext).unwrap_err();

        assert_eq!(err.kind, Some(ErrorKind::AuthenticationFailed));
        assert_eq!(err.category, ErrorCategory::User);
        assert!(err.to_string().contains("bad password"));
    }

    #[test]
    fn test_truncated_salt() {
        assert_eq!(kind_of(decrypt(b"test", &[1, 2, 3])), Some(ErrorKind::TruncatedInput));
    }

    #[test]
    fn test_truncated_nonce() {
        let ciphertext = vec![0u8; SALT_LEN + 3];
        let err = decrypt(b"test", &ciphertext).unwrap_err();
        assert_eq!(err.kind, Some(ErrorKind::TruncatedInput));
        assert!(err.to_string().contains("while reading nonce"));
    }

    #[test]
    fn test_truncated_length() {
        let ciphertext = vec![0u8; SALT_LEN + NONCE_LEN + 3];
        let err = decrypt(b"test", &ciphertext).unwrap_err();
        assert!(err.to_string().contains("while reading sealed box"));
    }

    #[test]
    fn test_negative_length() {
        let mut ciphertext = vec![0u8; SALT_LEN + NONCE_LEN + 8];
        ciphertext[SALT_LEN + NONCE_LEN..].copy_from_slice(&(-1i64).to_be_bytes());

        assert_eq!(kind_of(decrypt(b"test", &ciphertext)), Some(ErrorKind::BinaryFormat));
    }

    #[test]
    fn test_length_exceeds_available() {
        let mut ciphertext = encrypt(b"test", b"hello").unwrap();
        ciphertext[SALT_LEN + NONCE_LEN..SALT_LEN + NONCE_LEN + 8]
            .copy_from_slice(&1_000_000i64.to_be_bytes());

        let err = decrypt(b"test", &ciphertext).unwrap_err();
        assert_eq!(err.kind, Some(ErrorKind::TruncatedInput));
        assert!(err.to_string().contains("claimed length greater than available input"));
    }

    #[test]
    fn test_trailing_data() {
        let mut ciphertext = encrypt(b"test", b"hello").unwrap();
        ciphertext.push(0xFF);

        assert_eq!(kind_of(decrypt(b"test", &ciphertext)), Some(ErrorKind::TrailingData));
    }

    #[test]
    fn test_tampered_sealed_box() {
        let mut ciphertext = encrypt(b"test", b"hello").unwrap();
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0x01;

        assert_eq!(
            kind_of(decrypt(b"test", &ciphertext)),
            Some(ErrorKind::AuthenticationFailed)
        );
    }

    #[test]
    fn test_all_byte_values() {
        let plaintext: Vec<u8> = (0..=255).collect();
        let ciphertext = encrypt(b"test", &plaintext).unwrap();
        assert_eq!(decrypt(b"test", &ciphertext).unwrap(), plaintext);
    }

    #[test]
    fn test_known_answer() {
        // Fixed salt and nonce; the expected bytes must never change or
        // previously saved results stop decrypting.
        let salt = [0x42u8; SALT_LEN];
        let nonce = [0x24u8; NONCE_LEN];

        let ciphertext = encrypt_deterministic(b"test", b"test payload", &salt, &nonce).unwrap();

        #[rustfmt::skip]
        let expected: Vec<u8> = vec![
            0x42, 0x42, 0x42, 0x42, 0x42, 0x42, 0x42, 0x42,
            0x24, 0x24, 0x24, 0x24, 0x24, 0x24, 0x24, 0x24,
            0x24, 0x24, 0x24, 0x24, 0x24, 0x24, 0x24, 0x24,
            0x24, 0x24, 0x24, 0x24, 0x24, 0x24, 0x24, 0x24,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1c,
            0x44, 0x87, 0xfe, 0xcd, 0x6f, 0xcf, 0x10, 0x75,
            0x7b, 0x4c, 0xb9, 0xc6, 0x59, 0xda, 0x83, 0x61,
            0x28, 0xfc, 0xf4, 0x30, 0x39, 0x85, 0x4a, 0x66,
            0xcf, 0xb5, 0xcf, 0xd4,
        ];

        assert_eq!(ciphertext, expected);
        assert_eq!(decrypt(b"test", &ciphertext).unwrap(), b"test payload");
    }
}
