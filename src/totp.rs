//! TOTP Engine: RFC 6238 time-based one-time codes over RFC 4226 HOTP.
//!
//! Matches `core/totp.c`: base32-decoded secret, HMAC-SHA1, dynamic
//! truncation, modulo 10^6, fixed 30-second step, zero-padded 6 digits.

use crate::error::VaultError;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha1 = Hmac<Sha1>;

const STEP_SECS: u64 = 30;
const DIGITS: u32 = 6;

/// Decodes a base32 (RFC 4648, no padding required) TOTP secret.
///
/// Accepts upper- or lowercase input and ignores surrounding whitespace,
/// the same leniency the original parser applied to secrets typed in by
/// hand.
fn decode_secret(secret_b32: &str) -> Result<Vec<u8>, VaultError> {
  let cleaned: String = secret_b32.chars().filter(|c| !c.is_whitespace()).collect();
  if cleaned.is_empty() {
    return Err(VaultError::InvalidSecret);
  }
  base32::decode(base32::Alphabet::Rfc4648 { padding: false }, &cleaned.to_uppercase())
    .ok_or(VaultError::InvalidSecret)
}

/// Computes the 6-digit code for `secret_b32` at Unix time `unix_time`.
pub fn code_at(secret_b32: &str, unix_time: u64) -> Result<String, VaultError> {
  let key = decode_secret(secret_b32)?;
  let counter = unix_time / STEP_SECS;
  Ok(hotp(&key, counter))
}

/// Computes the 6-digit code for `secret_b32` at the current wall-clock
/// time.
pub fn code(secret_b32: &str) -> Result<String, VaultError> {
  let now = SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map_err(|_| VaultError::InvalidInput("system clock before epoch".into()))?
    .as_secs();
  code_at(secret_b32, now)
}

fn hotp(key: &[u8], counter: u64) -> String {
  let mut mac = HmacSha1::new_from_slice(key).expect("HMAC accepts keys of any length");
  mac.update(&counter.to_be_bytes());
  let hash = mac.finalize().into_bytes();

  let offset = (hash[hash.len() - 1] & 0x0f) as usize;
  let truncated = ((hash[offset] as u32 & 0x7f) << 24)
    | ((hash[offset + 1] as u32) << 16)
    | ((hash[offset + 2] as u32) << 8)
    | (hash[offset + 3] as u32);

  let code = truncated % 10u32.pow(DIGITS);
  format!("{code:0width$}", width = DIGITS as usize)
}

#[cfg(test)]
mod tests {
  use super::*;

  // RFC 6238 Appendix B test vector for the SHA1 case: secret "12345678901234567890"
  // (ASCII), base32 "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ", T=59s -> 287082.
  #[test]
  fn matches_rfc6238_vector() {
    let secret = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";
    assert_eq!(code_at(secret, 59).unwrap(), "287082");
  }

  #[test]
  fn code_changes_across_steps() {
    let secret = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";
    let a = code_at(secret, 0).unwrap();
    let b = code_at(secret, STEP_SECS).unwrap();
    assert_ne!(a, b);
  }

  #[test]
  fn lowercase_and_whitespace_are_tolerated() {
    let secret = "gezd gnbv gy3t qojq gezd gnbv gy3t qojq";
    assert_eq!(code_at(secret, 59).unwrap(), "287082");
  }

  #[test]
  fn invalid_base32_is_rejected() {
    assert!(code_at("not-base32!!", 59).is_err());
  }

  #[test]
  fn empty_secret_is_rejected() {
    assert!(matches!(code_at("", 59), Err(VaultError::InvalidSecret)));
    assert!(matches!(code_at("   ", 59), Err(VaultError::InvalidSecret)));
  }

  #[test]
  fn output_is_always_six_digits() {
    let secret = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";
    for t in [0, 29, 30, 59, 60, 1_000_000] {
      let code = code_at(secret, t).unwrap();
      assert_eq!(code.len(), 6);
      assert!(code.chars().all(|c| c.is_ascii_digit()));
    }
  }
}
