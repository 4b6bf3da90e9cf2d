//! Record types: credential entries and the input shape used to create or
//! update one.
//!
//! Mirrors the teacher's `models::Entry` (zeroized on drop, `Drop` impl
//! delegating to `Zeroize`) but with the field set and length limits this
//! vault's schema actually defines, and no UI-facing `id: String` UUID —
//! ids here are the store's monotonic integer primary key.

use crate::error::VaultError;
use zeroize::Zeroize;

pub const MAX_SERVICE_LEN: usize = 256;
pub const MAX_USERNAME_LEN: usize = 256;
pub const MAX_PASSWORD_LEN: usize = 256;
pub const MAX_TOTP_SECRET_LEN: usize = 256;
pub const MAX_RECOVERY_CODES_LEN: usize = 2048;

/// The fields a caller supplies to create or update a record.
#[derive(Clone, Debug, Default)]
pub struct RecordFields {
  pub service: String,
  pub username: String,
  pub password: String,
  pub totp_secret: String,
  pub recovery_codes: String,
}

impl RecordFields {
  /// Validates field presence and length per the schema's external limits.
  /// Called by the store before every insert/update.
  pub fn validate(&self) -> Result<(), VaultError> {
    if self.service.is_empty() {
      return Err(VaultError::InvalidInput("service must not be empty".into()));
    }
    if self.service.len() > MAX_SERVICE_LEN {
      return Err(VaultError::InvalidInput("service exceeds 256 bytes".into()));
    }
    if self.username.len() > MAX_USERNAME_LEN {
      return Err(VaultError::InvalidInput("username exceeds 256 bytes".into()));
    }
    if self.password.len() > MAX_PASSWORD_LEN {
      return Err(VaultError::InvalidInput("password exceeds 256 bytes".into()));
    }
    if self.totp_secret.len() > MAX_TOTP_SECRET_LEN {
      return Err(VaultError::InvalidInput("totp_secret exceeds 256 bytes".into()));
    }
    if self.recovery_codes.len() > MAX_RECOVERY_CODES_LEN {
      return Err(VaultError::InvalidInput(
        "recovery_codes exceeds 2048 bytes".into(),
      ));
    }
    Ok(())
  }
}

impl Zeroize for RecordFields {
  fn zeroize(&mut self) {
    self.service.zeroize();
    self.username.zeroize();
    self.password.zeroize();
    self.totp_secret.zeroize();
    self.recovery_codes.zeroize();
  }
}

impl Drop for RecordFields {
  fn drop(&mut self) {
    self.zeroize();
  }
}

/// A credential entry as read back from the vault.
#[derive(Clone, Debug)]
pub struct Record {
  pub id: i64,
  pub fields: RecordFields,
}

impl Zeroize for Record {
  fn zeroize(&mut self) {
    self.fields.zeroize();
  }
}

impl Drop for Record {
  fn drop(&mut self) {
    self.zeroize();
  }
}

/// Newline-separated recovery codes, with a leading `*` marking a used
/// code. A thin convenience wrapper over the textual convention the spec
/// defines; the on-disk/in-memory representation stays the plain string.
pub struct RecoveryCodes<'a>(pub &'a str);

impl<'a> RecoveryCodes<'a> {
  pub fn codes(&self) -> impl Iterator<Item = (&'a str, bool)> {
    self.0.lines().map(|line| match line.strip_prefix('*') {
      Some(rest) => (rest, true),
      None => (line, false),
    })
  }

  /// Marks the code at `index` (in line order) as used, returning the new
  /// joined string. Out-of-range indices leave the text unchanged.
  pub fn mark_used(&self, index: usize) -> String {
    self
      .0
      .lines()
      .enumerate()
      .map(|(i, line)| {
        if i == index && !line.starts_with('*') {
          format!("*{line}")
        } else {
          line.to_string()
        }
      })
      .collect::<Vec<_>>()
      .join("\n")
  }
}
