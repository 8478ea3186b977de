//! # Cipher Module
//!
//! Password-based encryption of arbitrary byte buffers, independent of images.
//!
//! - Key derivation: PBKDF2-HMAC-SHA256, 65 536 iterations, 256-bit key,
//!   fresh 16-byte random salt per call.
//! - Cipher: AES-256-CBC with PKCS#7 padding and a fresh 16-byte random IV.
//!
//! Encrypted blob layout:
//!
//! ```text
//! [16 bytes] PBKDF2 salt
//! [16 bytes] AES-CBC IV
//! [N bytes ] ciphertext (multiple of 16)
//! ```
//!
//! CBC offers no authentication; a wrong password is usually caught by the
//! padding check, and callers that need a reliable answer compare
//! [`hash_key`] first.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::Zeroizing;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// PBKDF2 salt length in bytes.
pub const SALT_LEN: usize = 16;
/// AES-CBC IV length in bytes.
pub const IV_LEN: usize = 16;
/// Derived key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;
/// PBKDF2 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 65_536;

/// Errors reported by the cipher module.
#[derive(Debug, Error)]
pub enum CipherError {
    /// Missing or empty password.
    #[error("invalid key: {0}")]
    KeyInvalid(String),

    /// Malformed ciphertext, padding failure or primitive error.
    #[error("cipher operation failed: {0}")]
    CipherOperationFailed(String),
}

fn check_password(password: &str) -> Result<(), CipherError> {
    if password.is_empty() {
        return Err(CipherError::KeyInvalid("password must not be empty".to_string()));
    }
    Ok(())
}

/// Derive the AES-256 key from `password` and `salt`.
fn derive_key(password: &str, salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut *key);
    key
}

/// Encrypt `plain` under `password`, returning `salt || iv || ciphertext`.
///
/// # Errors
/// - [`CipherError::KeyInvalid`] if `password` is empty.
/// - [`CipherError::CipherOperationFailed`] if the cipher cannot be set up.
pub fn encrypt(plain: &[u8], password: &str) -> Result<Vec<u8>, CipherError> {
    check_password(password)?;

    let mut rng = rand::thread_rng();
    let mut salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut salt);
    let mut iv = [0u8; IV_LEN];
    rng.fill_bytes(&mut iv);

    let key = derive_key(password, &salt);
    let cipher = Aes256CbcEnc::new_from_slices(&*key, &iv)
        .map_err(|e| CipherError::CipherOperationFailed(e.to_string()))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plain);

    let mut blob = Vec::with_capacity(SALT_LEN + IV_LEN + ciphertext.len());
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&iv);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Decrypt a blob produced by [`encrypt`].
///
/// # Errors
/// - [`CipherError::KeyInvalid`] if `password` is empty.
/// - [`CipherError::CipherOperationFailed`] if the blob is shorter than
///   salt + IV, or the padding is invalid after decryption (typically a
///   wrong password).
pub fn decrypt(blob: &[u8], password: &str) -> Result<Vec<u8>, CipherError> {
    check_password(password)?;

    if blob.len() < SALT_LEN + IV_LEN {
        return Err(CipherError::CipherOperationFailed(format!(
            "encrypted blob is {} bytes, shorter than salt and IV",
            blob.len()
        )));
    }
    let (salt, rest) = blob.split_at(SALT_LEN);
    let (iv, ciphertext) = rest.split_at(IV_LEN);

    let key = derive_key(password, salt);
    let cipher = Aes256CbcDec::new_from_slices(&*key, iv)
        .map_err(|e| CipherError::CipherOperationFailed(e.to_string()))?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| {
            CipherError::CipherOperationFailed(
                "decryption failed (wrong password or corrupted data)".to_string(),
            )
        })
}

/// Lowercase hex SHA-256 of `password`.
///
/// Stored in the carrier metadata so a decoder can reject a wrong password
/// before attempting decryption.
pub fn hash_key(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let msg = b"Hello, steganography!";
        let blob = encrypt(msg, "pw1").unwrap();
        assert_eq!(decrypt(&blob, "pw1").unwrap(), msg);
    }

    #[test]
    fn test_blob_layout() {
        // 20 bytes of plaintext pad to two AES blocks.
        let blob = encrypt(&[7u8; 20], "pw").unwrap();
        assert_eq!(blob.len(), SALT_LEN + IV_LEN + 32);

        let blob = encrypt(&[7u8; 16], "pw").unwrap();
        assert_eq!(blob.len(), SALT_LEN + IV_LEN + 32);
    }

    #[test]
    fn test_empty_plaintext() {
        let blob = encrypt(b"", "pw").unwrap();
        assert_eq!(blob.len(), SALT_LEN + IV_LEN + 16);
        assert!(decrypt(&blob, "pw").unwrap().is_empty());
    }

    #[test]
    fn test_wrong_password_never_yields_plaintext() {
        let msg = b"attack at dawn, bring snacks";
        let blob = encrypt(msg, "pw1").unwrap();
        let result = decrypt(&blob, "pw2");
        assert!(!matches!(result, Ok(ref plain) if plain == msg));
    }

    #[test]
    fn test_fresh_salt_and_iv() {
        let a = encrypt(b"same message", "pass").unwrap();
        let b = encrypt(b"same message", "pass").unwrap();
        assert_ne!(a[..SALT_LEN], b[..SALT_LEN]);
        assert_ne!(a[SALT_LEN..SALT_LEN + IV_LEN], b[SALT_LEN..SALT_LEN + IV_LEN]);
        assert_ne!(a[SALT_LEN + IV_LEN..], b[SALT_LEN + IV_LEN..]);
    }

    #[test]
    fn test_empty_password_rejected() {
        assert!(matches!(encrypt(b"x", ""), Err(CipherError::KeyInvalid(_))));
        assert!(matches!(decrypt(&[0u8; 48], ""), Err(CipherError::KeyInvalid(_))));
    }

    #[test]
    fn test_short_blob_rejected() {
        assert!(matches!(
            decrypt(&[0u8; 31], "pw"),
            Err(CipherError::CipherOperationFailed(_))
        ));
        // Salt and IV only, no ciphertext block.
        assert!(matches!(
            decrypt(&[0u8; 32], "pw"),
            Err(CipherError::CipherOperationFailed(_))
        ));
    }

    #[test]
    fn test_unaligned_ciphertext_rejected() {
        let mut blob = encrypt(b"hello", "pw").unwrap();
        blob.pop();
        assert!(matches!(
            decrypt(&blob, "pw"),
            Err(CipherError::CipherOperationFailed(_))
        ));
    }

    #[test]
    fn test_hash_key() {
        // SHA-256("abc")
        assert_eq!(
            hash_key("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_ne!(hash_key("pw1"), hash_key("pw2"));
    }

    #[test]
    fn test_derived_key_depends_on_salt() {
        let a = derive_key("pass", &[0u8; SALT_LEN]);
        let b = derive_key("pass", &[1u8; SALT_LEN]);
        assert_ne!(*a, *b);
    }
}
