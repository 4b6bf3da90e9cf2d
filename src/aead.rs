//! AEAD Codec: XChaCha20-Poly1305 encrypt/decrypt of field blobs.
//!
//! Follows the teacher's `vault::save_with_key`/`load_with_password` shape
//! (fresh nonce per call, `chacha20poly1305::aead::Aead`) but generalized
//! to a single field at a time and to binding associated data, since this
//! codec is reused both by the schema migrator (re-encrypting legacy
//! per-field blobs) and by anything layered on top of the SQLCipher store
//! that still needs field-level AEAD (e.g. a future Strategy-2 backend).
//!
//! Wire format: `nonce(24) || ciphertext || tag(16)`, base64-encoded
//! (no padding newlines) for storage in a text column.

use crate::csprng;
use crate::error::VaultError;
use crate::secret::SecretKey;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use chacha20poly1305::aead::{Aead, Payload};
use chacha20poly1305::{KeyInit, XChaCha20Poly1305, XNonce};

const NONCE_LEN: usize = 24;

/// Encrypts `plaintext` under `key`, binding `associated_data`.
///
/// A fresh random nonce is drawn for every call; nonce reuse under the same
/// key is the one mistake this format cannot detect, so the caller must
/// never supply its own nonce.
pub fn encrypt(key: &SecretKey, plaintext: &[u8], associated_data: &[u8]) -> Result<String, VaultError> {
  let cipher = XChaCha20Poly1305::new(key.as_bytes().into());

  let mut nonce_bytes = [0u8; NONCE_LEN];
  csprng::fill(&mut nonce_bytes)?;
  let nonce = XNonce::from_slice(&nonce_bytes);

  let ciphertext = cipher
    .encrypt(
      nonce,
      Payload {
        msg: plaintext,
        aad: associated_data,
      },
    )
    .map_err(|_| VaultError::Corrupt)?;

  let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
  blob.extend_from_slice(&nonce_bytes);
  blob.extend_from_slice(&ciphertext);

  Ok(STANDARD_NO_PAD.encode(blob))
}

/// Decrypts a blob produced by [`encrypt`] under `key`, with the same
/// `associated_data` used at encryption time.
///
/// Returns `AuthFailed` both for a wrong key and for a tampered/truncated
/// blob — the two are indistinguishable by design.
pub fn decrypt(key: &SecretKey, blob: &str, associated_data: &[u8]) -> Result<Vec<u8>, VaultError> {
  let raw = STANDARD_NO_PAD
    .decode(blob)
    .map_err(|_| VaultError::AuthFailed)?;
  if raw.len() < NONCE_LEN {
    return Err(VaultError::AuthFailed);
  }

  let (nonce_bytes, ciphertext) = raw.split_at(NONCE_LEN);
  let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
  let nonce = XNonce::from_slice(nonce_bytes);

  cipher
    .decrypt(
      nonce,
      Payload {
        msg: ciphertext,
        aad: associated_data,
      },
    )
    .map_err(|_| VaultError::AuthFailed)
}

/// Builds the associated-data tag this crate binds to field ciphertexts:
/// `"{id}:{field}"` as ASCII bytes, so a blob copied between fields or
/// records fails authentication instead of silently decrypting.
pub fn field_ad(id: i64, field: &str) -> Vec<u8> {
  format!("{id}:{field}").into_bytes()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn key(byte: u8) -> SecretKey {
    SecretKey::new([byte; 32])
  }

  #[test]
  fn round_trips_under_matching_key_and_ad() {
    let k = key(7);
    let ad = field_ad(1, "password");
    let blob = encrypt(&k, b"hunter2", &ad).unwrap();
    let plaintext = decrypt(&k, &blob, &ad).unwrap();
    assert_eq!(plaintext, b"hunter2");
  }

  #[test]
  fn wrong_key_fails_auth() {
    let ad = field_ad(1, "password");
    let blob = encrypt(&key(1), b"hunter2", &ad).unwrap();
    let err = decrypt(&key(2), &blob, &ad).unwrap_err();
    assert!(matches!(err, VaultError::AuthFailed));
  }

  #[test]
  fn wrong_associated_data_fails_auth() {
    let k = key(3);
    let blob = encrypt(&k, b"hunter2", &field_ad(1, "password")).unwrap();
    let err = decrypt(&k, &blob, &field_ad(2, "password")).unwrap_err();
    assert!(matches!(err, VaultError::AuthFailed));
  }

  #[test]
  fn tampered_ciphertext_fails_auth() {
    let k = key(4);
    let ad = field_ad(1, "password");
    let mut blob = STANDARD_NO_PAD
      .decode(encrypt(&k, b"hunter2", &ad).unwrap())
      .unwrap();
    let last = blob.len() - 1;
    blob[last] ^= 0x01;
    let tampered = STANDARD_NO_PAD.encode(blob);
    assert!(decrypt(&k, &tampered, &ad).is_err());
  }

  #[test]
  fn nonces_differ_across_calls() {
    let k = key(5);
    let ad = field_ad(1, "password");
    let a = encrypt(&k, b"same", &ad).unwrap();
    let b = encrypt(&k, b"same", &ad).unwrap();
    assert_ne!(a, b);
  }
}
