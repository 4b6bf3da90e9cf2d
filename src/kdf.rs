//! Key Derivation: Argon2id(passphrase, salt) -> 32-byte key.
//!
//! Mirrors the teacher's `vault::derive_key`, generalized to carry explicit
//! `KdfParams` instead of a hardcoded cost, and to persist/parse the
//! reference textual form from the spec's external-interfaces section
//! (`t=<T>,m=<M_KIB>,p=<P>` plus a hex salt), the same shape the original
//! C implementation wrote to its master-key sidecar file.

use crate::csprng;
use crate::error::VaultError;
use crate::secret::SecretKey;
use argon2::{Algorithm, Argon2, Params, Version};

pub const SALT_LEN: usize = 16;
pub const KEY_LEN: usize = 32;

/// Interactive-use defaults: 64 MiB memory, 3 iterations, single lane.
pub const DEFAULT_T_COST: u32 = 3;
pub const DEFAULT_M_COST_KIB: u32 = 64 * 1024;
pub const DEFAULT_PARALLELISM: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KdfParams {
  pub t_cost: u32,
  pub m_cost_kib: u32,
  pub parallelism: u32,
  pub salt: [u8; SALT_LEN],
}

impl KdfParams {
  /// Generates a fresh parameter block with the interactive defaults and a
  /// random salt, for first-time vault creation.
  pub fn generate() -> Result<Self, VaultError> {
    let mut salt = [0u8; SALT_LEN];
    csprng::fill(&mut salt)?;
    Ok(Self {
      t_cost: DEFAULT_T_COST,
      m_cost_kib: DEFAULT_M_COST_KIB,
      parallelism: DEFAULT_PARALLELISM,
      salt,
    })
  }

  /// Serializes to the reference textual form: `t=..,m=..,p=..` on the
  /// first line, the salt hex-encoded on the second.
  pub fn to_text(&self) -> String {
    format!(
      "t={},m={},p={}\n{}\n",
      self.t_cost,
      self.m_cost_kib,
      self.parallelism,
      hex::encode(self.salt)
    )
  }

  /// Parses the reference textual form. Any deviation is `Corrupt`, not a
  /// panic: this text comes from a file on disk.
  pub fn from_text(text: &str) -> Result<Self, VaultError> {
    let mut lines = text.lines();
    let header = lines.next().ok_or(VaultError::Corrupt)?;
    let salt_line = lines.next().ok_or(VaultError::Corrupt)?;

    let mut t_cost = None;
    let mut m_cost_kib = None;
    let mut parallelism = None;
    for field in header.split(',') {
      let (key, value) = field.split_once('=').ok_or(VaultError::Corrupt)?;
      let value: u32 = value.trim().parse().map_err(|_| VaultError::Corrupt)?;
      match key.trim() {
        "t" => t_cost = Some(value),
        "m" => m_cost_kib = Some(value),
        "p" => parallelism = Some(value),
        _ => return Err(VaultError::Corrupt),
      }
    }

    let salt_bytes = hex::decode(salt_line.trim()).map_err(|_| VaultError::Corrupt)?;
    if salt_bytes.len() != SALT_LEN {
      return Err(VaultError::Corrupt);
    }
    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&salt_bytes);

    Ok(Self {
      t_cost: t_cost.ok_or(VaultError::Corrupt)?,
      m_cost_kib: m_cost_kib.ok_or(VaultError::Corrupt)?,
      parallelism: parallelism.ok_or(VaultError::Corrupt)?,
      salt,
    })
  }
}

/// Derives a 32-byte key from `passphrase` under `params` using Argon2id.
///
/// Deterministic for a fixed `(passphrase, params)` pair; never logs or
/// returns anything that depends on the passphrase besides the key itself.
pub fn derive(passphrase: &str, params: &KdfParams) -> Result<SecretKey, VaultError> {
  let argon2_params = Params::new(
    params.m_cost_kib,
    params.t_cost,
    params.parallelism,
    Some(KEY_LEN),
  )
  .map_err(|_| VaultError::Corrupt)?;
  let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

  let mut key = [0u8; KEY_LEN];
  argon2
    .hash_password_into(passphrase.as_bytes(), &params.salt, &mut key)
    .map_err(|_| VaultError::Corrupt)?;

  Ok(SecretKey::new(key))
}
