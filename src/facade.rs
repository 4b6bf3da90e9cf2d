//! Core API Facade: the single entry point callers outside this crate are
//! meant to use.
//!
//! Everything below this module (store, migrate, generator, totp, health)
//! is usable on its own, but `Session` is what a CLI, GUI, or test harness
//! should actually hold: it owns the open store, serializes access to it
//! behind the store's own `&mut self` methods, and exposes the vault's
//! operations as one flat, stable surface so those callers never need to
//! import the lower modules directly.

use crate::error::VaultError;
use crate::generator::{self, GeneratorPolicy};
use crate::health::{self, HealthConfig, HealthIssue};
use crate::record::{Record, RecordFields};
use crate::store::VaultStore;
use crate::totp;
use std::path::Path;

/// Tunables that vary per deployment rather than per call: the HIBP
/// worker-pool width and endpoint, primarily so tests can point the
/// health auditor at a mock server without touching call sites.
#[derive(Clone, Debug)]
pub struct VaultConfig {
  pub health: HealthConfig,
}

impl Default for VaultConfig {
  fn default() -> Self {
    Self {
      health: HealthConfig::default(),
    }
  }
}

/// A single open vault session. Not `Sync`: this crate is single-threaded
/// per session by design, with the sole exception of the health auditor's
/// internal worker pool, which is scoped to a single call and never
/// outlives it.
#[derive(Debug)]
pub struct Session {
  store: VaultStore,
  config: VaultConfig,
}

impl Session {
  /// Creates a brand-new vault at `path`.
  pub fn create(path: impl AsRef<Path>, passphrase: &str, config: VaultConfig) -> Result<Self, VaultError> {
    let store = VaultStore::create(path, passphrase)?;
    Ok(Self { store, config })
  }

  /// Opens an existing vault at `path`.
  ///
  /// A legacy per-field-AEAD vault does not open this way: it is not a
  /// valid SQLCipher file, so this call reports `AuthFailed` on one.
  /// Migrate it first with [`Session::migrate_legacy`].
  pub fn open(path: impl AsRef<Path>, passphrase: &str, config: VaultConfig) -> Result<Self, VaultError> {
    let store = VaultStore::open(path, passphrase)?;
    Ok(Self { store, config })
  }

  /// Migrates a legacy whole-file, per-field-AEAD vault at `legacy_path`
  /// into a fresh SQLCipher vault at `new_path`, then opens it.
  ///
  /// `decode` knows the legacy file's exact layout and turns it into
  /// plaintext records; the vault's own schema migration (missing
  /// columns on an already-SQLCipher vault) happens automatically inside
  /// `open` and needs no separate call.
  pub fn migrate_legacy(
    legacy_path: impl AsRef<Path>,
    new_path: impl AsRef<Path>,
    passphrase: &str,
    decode: impl FnOnce(&[u8]) -> Result<Vec<crate::migrate::LegacyRecord>, VaultError>,
    config: VaultConfig,
  ) -> Result<Self, VaultError> {
    crate::migrate::migrate_legacy_vault(legacy_path, new_path.as_ref(), passphrase, decode)?;
    Self::open(new_path, passphrase, config)
  }

  pub fn close(self) -> Result<(), VaultError> {
    self.store.close()
  }

  pub fn add(&mut self, fields: &RecordFields) -> Result<i64, VaultError> {
    self.store.add(fields)
  }

  pub fn list(&self) -> Result<Vec<Record>, VaultError> {
    self.store.list()
  }

  pub fn update(&mut self, id: i64, fields: &RecordFields) -> Result<(), VaultError> {
    self.store.update(id, fields)
  }

  pub fn delete(&mut self, id: i64) -> Result<(), VaultError> {
    self.store.delete(id)
  }

  /// Generates a password under `policy` without storing it anywhere.
  pub fn generate_password(&self, policy: &GeneratorPolicy) -> Result<String, VaultError> {
    generator::generate(policy)
  }

  /// Computes the current TOTP code for record `id`, if it has a secret
  /// configured.
  pub fn totp_code(&self, id: i64) -> Result<String, VaultError> {
    let records = self.store.list()?;
    let record = records.into_iter().find(|r| r.id == id).ok_or(VaultError::NotFound)?;
    if record.fields.totp_secret.is_empty() {
      return Err(VaultError::InvalidInput("record has no totp secret".into()));
    }
    totp::code(&record.fields.totp_secret)
  }

  /// Runs the password health audit over every record in the vault, as a
  /// flat stream of issues rather than one report per record — a reused
  /// password spanning several records yields a single `Reused` entry.
  pub fn health_check(&self) -> Result<Vec<HealthIssue>, VaultError> {
    let records = self.store.list()?;
    Ok(health::audit(&records, &self.config.health))
  }

  /// Imports every record in `entries`, skipping (not aborting on) ones
  /// that fail validation or insertion, and returns `(inserted, skipped)`
  /// counts.
  pub fn bulk_import(&mut self, entries: &[RecordFields]) -> (usize, usize) {
    let mut inserted = 0;
    let mut skipped = 0;
    for fields in entries {
      match self.store.add(fields) {
        Ok(_) => inserted += 1,
        Err(err) => {
          tracing::warn!(%err, "bulk import skipped a record");
          skipped += 1;
        }
      }
    }
    (inserted, skipped)
  }

  /// Exports every record currently in the vault, ordered by id.
  pub fn bulk_export(&self) -> Result<Vec<Record>, VaultError> {
    self.store.list()
  }
}
