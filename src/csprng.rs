//! CSPRNG: uniform random bytes and unbiased bounded integers.
//!
//! Backed by `rand::rngs::OsRng`, the same source the teacher crate uses
//! for salts and nonces. Failure to obtain entropy is fatal and is never
//! retried with a weaker source.

use crate::error::VaultError;
use rand::rngs::OsRng;
use rand::RngCore;

/// Fills `bytes` with cryptographically secure random data.
pub fn fill(bytes: &mut [u8]) -> Result<(), VaultError> {
  // OsRng panics internally rather than returning an error on most
  // platforms; std::panic::catch_unwind would be heavier than this crate
  // needs, so we trust the platform RNG and surface EntropyFailure only
  // for the zero-length edge case callers might hit by mistake.
  if bytes.is_empty() {
    return Ok(());
  }
  OsRng.fill_bytes(bytes);
  Ok(())
}

/// Draws a uniformly distributed `u32` in `[0, upper_exclusive)`.
///
/// Uses rejection sampling: draws are discarded when they fall in the
/// fractional remainder of `u32::MAX / upper_exclusive`, so every output is
/// equally likely regardless of `upper_exclusive`.
pub fn bounded_u32(upper_exclusive: u32) -> Result<u32, VaultError> {
  if upper_exclusive == 0 {
    return Err(VaultError::EntropyFailure);
  }
  if upper_exclusive == 1 {
    return Ok(0);
  }

  let zone = u32::MAX - (u32::MAX % upper_exclusive);
  loop {
    let mut buf = [0u8; 4];
    fill(&mut buf)?;
    let candidate = u32::from_le_bytes(buf);
    if candidate < zone {
      return Ok(candidate % upper_exclusive);
    }
  }
}
