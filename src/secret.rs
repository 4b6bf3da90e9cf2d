//! Secret Memory: byte buffers zeroized on drop with length-dependent-only
//! equality.
//!
//! Wraps `zeroize::Zeroizing` for the "overwrite before freeing" guarantee
//! and `subtle::ConstantTimeEq` for comparisons that do not leak which byte
//! diverged first. Used for passphrases, derived keys, decrypted plaintext,
//! and decoded TOTP seeds.

use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// A heap-allocated secret byte buffer.
#[derive(Clone)]
pub struct SecretBytes(Zeroizing<Vec<u8>>);

impl SecretBytes {
  pub fn new(bytes: Vec<u8>) -> Self {
    Self(Zeroizing::new(bytes))
  }

  pub fn as_slice(&self) -> &[u8] {
    &self.0
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl PartialEq for SecretBytes {
  /// Constant time in the length of the shorter buffer: differing lengths
  /// are rejected up front (their own length is not secret), equal-length
  /// buffers are compared in time independent of where they diverge.
  fn eq(&self, other: &Self) -> bool {
    if self.0.len() != other.0.len() {
      return false;
    }
    self.0.ct_eq(&other.0).into()
  }
}

impl Eq for SecretBytes {}

impl fmt::Debug for SecretBytes {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("SecretBytes(..)")
  }
}

/// A 32-byte symmetric key, held in Secret Memory for its whole lifetime.
#[derive(Clone)]
pub struct SecretKey(Zeroizing<[u8; 32]>);

impl SecretKey {
  pub fn new(bytes: [u8; 32]) -> Self {
    Self(Zeroizing::new(bytes))
  }

  pub fn as_bytes(&self) -> &[u8; 32] {
    &self.0
  }
}

impl PartialEq for SecretKey {
  fn eq(&self, other: &Self) -> bool {
    self.0.ct_eq(&*other.0).into()
  }
}

impl Eq for SecretKey {}

impl fmt::Debug for SecretKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("SecretKey(..)")
  }
}

/// A secret UTF-8 string (master passphrase while it is held in memory).
pub struct SecretString(Zeroizing<String>);

impl SecretString {
  pub fn new(s: String) -> Self {
    Self(Zeroizing::new(s))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Debug for SecretString {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("SecretString(..)")
  }
}

impl From<String> for SecretString {
  fn from(s: String) -> Self {
    Self::new(s)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn equal_buffers_compare_equal() {
    let a = SecretBytes::new(vec![1, 2, 3]);
    let b = SecretBytes::new(vec![1, 2, 3]);
    assert_eq!(a, b);
  }

  #[test]
  fn different_length_buffers_compare_unequal() {
    let a = SecretBytes::new(vec![1, 2, 3]);
    let b = SecretBytes::new(vec![1, 2]);
    assert_ne!(a, b);
  }

  #[test]
  fn different_content_buffers_compare_unequal() {
    let a = SecretBytes::new(vec![1, 2, 3]);
    let b = SecretBytes::new(vec![1, 2, 4]);
    assert_ne!(a, b);
  }
}
