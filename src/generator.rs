//! Password Generator: fixed-length random passwords with guaranteed
//! per-class coverage.
//!
//! Follows `core/password_generator.c`'s algorithm exactly: seed the output
//! with one character from each enabled class (lowercase is always
//! enabled), fill the remainder from the combined pool, then Fisher-Yates
//! shuffle so the guaranteed characters aren't clustered at the front. The
//! symbol alphabet is the same fixed `special_set` the original generator
//! uses, not an enlarged one; [`generate_extended`] is the separate entry
//! point for callers that want a wider symbol set.

use crate::csprng;
use crate::error::VaultError;

const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()";
const EXTENDED_SYMBOLS: &[u8] = b"!@#$%^&*()-_=+[]{};:,.<>?";

/// Which character classes to draw from. Lowercase letters are always
/// included regardless of this policy, matching the original generator's
/// "at least one lowercase" guarantee.
#[derive(Clone, Copy, Debug)]
pub struct GeneratorPolicy {
  pub length: usize,
  pub uppercase: bool,
  pub digits: bool,
  pub symbols: bool,
}

impl Default for GeneratorPolicy {
  fn default() -> Self {
    Self {
      length: 16,
      uppercase: true,
      digits: true,
      symbols: true,
    }
  }
}

impl GeneratorPolicy {
  fn enabled_classes(&self, symbols: &'static [u8]) -> Vec<&'static [u8]> {
    let mut classes = vec![LOWER];
    if self.uppercase {
      classes.push(UPPER);
    }
    if self.digits {
      classes.push(DIGITS);
    }
    if self.symbols {
      classes.push(symbols);
    }
    classes
  }
}

/// Generates a password under `policy`, drawing symbols from the fixed
/// canonical alphabet `!@#$%^&*()`.
///
/// Returns `InvalidInput` if `policy.length` is too short to fit one
/// character from every enabled class.
pub fn generate(policy: &GeneratorPolicy) -> Result<String, VaultError> {
  generate_with_symbols(policy, SYMBOLS)
}

/// Generates a password the same way as [`generate`], but draws symbols
/// from an extended alphabet beyond the canonical fixed set. The separate
/// entry point keeps the canonical generator's output conformant while
/// still letting a caller opt into a wider symbol pool.
pub fn generate_extended(policy: &GeneratorPolicy) -> Result<String, VaultError> {
  generate_with_symbols(policy, EXTENDED_SYMBOLS)
}

fn generate_with_symbols(policy: &GeneratorPolicy, symbols: &'static [u8]) -> Result<String, VaultError> {
  let classes = policy.enabled_classes(symbols);
  if policy.length < classes.len() {
    return Err(VaultError::InvalidInput(format!(
      "length {} too short for {} required character classes",
      policy.length,
      classes.len()
    )));
  }

  let mut pool = Vec::new();
  for class in &classes {
    pool.extend_from_slice(class);
  }

  let mut chars = Vec::with_capacity(policy.length);
  for class in &classes {
    chars.push(draw(class)?);
  }
  while chars.len() < policy.length {
    chars.push(draw(&pool)?);
  }

  shuffle(&mut chars)?;
  Ok(String::from_utf8(chars).expect("all classes are ASCII"))
}

fn draw(class: &[u8]) -> Result<u8, VaultError> {
  let idx = csprng::bounded_u32(class.len() as u32)? as usize;
  Ok(class[idx])
}

/// Fisher-Yates shuffle using the crate's rejection-sampled bounded draws,
/// so the final arrangement is unbiased rather than merely "mixed up".
fn shuffle(chars: &mut [u8]) -> Result<(), VaultError> {
  for i in (1..chars.len()).rev() {
    let j = csprng::bounded_u32((i + 1) as u32)? as usize;
    chars.swap(i, j);
  }
  Ok(())
}
