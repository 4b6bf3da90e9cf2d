//! Unified error taxonomy for the vault core.
//!
//! Every public entry point returns `Result<T, VaultError>`. Lower layers
//! never log secret material; the facade is the only place that converts
//! storage/crypto internals into this external taxonomy.

use thiserror::Error;

/// The vault's tagged error taxonomy.
///
/// `AuthFailed` and `Corrupt` are kept deliberately uninformative: a wrong
/// passphrase and a damaged file must look identical to a caller, so
/// neither variant carries a reason string sourced from the failure site.
#[derive(Error, Debug)]
pub enum VaultError {
  /// Wrong passphrase or tampered verifier.
  #[error("authentication failed")]
  AuthFailed,

  /// Unparseable KDF params, truncated blob, bad base64, or a database
  /// file that is not a vault at all.
  #[error("vault data is corrupt")]
  Corrupt,

  /// Underlying file or network I/O failure.
  #[error("i/o error: {0}")]
  Io(String),

  /// No record with the supplied id.
  #[error("record not found")]
  NotFound,

  /// Empty service, oversize field, or a password-generator policy that
  /// cannot be satisfied at the requested length.
  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// Base32 decode failure or a zero-length TOTP seed.
  #[error("invalid totp secret")]
  InvalidSecret,

  /// The CSPRNG refused to produce bytes.
  #[error("entropy source failed")]
  EntropyFailure,

  /// Per-record pwned-check HTTP error. Non-fatal: the audit continues for
  /// every other record.
  #[error("network error checking record {id}")]
  NetworkError {
    /// The record whose breach check failed.
    id: i64,
  },

  /// Allocation failure. Treated as fatal by the facade.
  #[error("allocation failed")]
  Alloc,
}

impl From<std::io::Error> for VaultError {
  fn from(e: std::io::Error) -> Self {
    VaultError::Io(e.to_string())
  }
}

impl From<rusqlite::Error> for VaultError {
  fn from(e: rusqlite::Error) -> Self {
    match e {
      rusqlite::Error::SqliteFailure(err, _)
        if err.code == rusqlite::ErrorCode::NotADatabase =>
      {
        VaultError::AuthFailed
      }
      rusqlite::Error::QueryReturnedNoRows => VaultError::NotFound,
      other => VaultError::Corrupt.with_source(other),
    }
  }
}

impl From<argon2::password_hash::Error> for VaultError {
  fn from(_: argon2::password_hash::Error) -> Self {
    VaultError::Corrupt
  }
}

impl VaultError {
  /// Attaches a debug-only source for `tracing`, while keeping the
  /// user-visible taxonomy unchanged (no source text leaks into `Display`).
  fn with_source(self, source: impl std::fmt::Debug) -> Self {
    tracing::debug!(?source, "mapped internal error to taxonomy");
    self
  }
}
