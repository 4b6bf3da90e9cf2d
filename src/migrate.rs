//! Schema Migrator: brings an older vault file up to the current schema
//! and encryption format.
//!
//! Two legacy shapes are handled, both found in the original C
//! implementation's history: (1) a `passwords` table missing columns this
//! crate's schema added later (`totp_secret`, `recovery_codes`), fixed
//! in place with `ALTER TABLE`; (2) a whole-file, per-field AEAD vault
//! predating the SQLCipher store, which is decrypted with the legacy key
//! and re-written as a fresh SQLCipher vault via [`VaultStore::create`].
//!
//! Migration of the second kind writes to a sibling temp file and renames
//! it into place only after every record has been re-encrypted, the same
//! atomic-replace shape `0M3REXE-passman`'s vault module uses for its
//! saves, so a crash mid-migration leaves the original vault untouched.

use crate::error::VaultError;
use crate::record::RecordFields;
use crate::store::VaultStore;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Adds any columns the current schema expects but an older vault's table
/// lacks. A no-op on an already-current vault.
pub fn migrate_schema(conn: &Connection) -> Result<(), VaultError> {
  let mut existing = std::collections::HashSet::new();
  {
    let mut stmt = conn.prepare("PRAGMA table_info(passwords)")?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
      let name: String = row.get(1)?;
      existing.insert(name);
    }
  }

  for (column, ddl) in [
    ("totp_secret", "ALTER TABLE passwords ADD COLUMN totp_secret TEXT"),
    ("recovery_codes", "ALTER TABLE passwords ADD COLUMN recovery_codes TEXT"),
  ] {
    if !existing.contains(column) {
      conn.execute(ddl, [])?;
      tracing::debug!(column, "schema migration added column");
    }
  }
  Ok(())
}

/// One record read out of a legacy whole-file, per-field-AEAD vault.
pub struct LegacyRecord {
  pub fields: RecordFields,
}

/// Migrates a legacy per-field-AEAD vault at `legacy_path` into a new
/// SQLCipher vault at `new_path`, re-keying under `passphrase`.
///
/// `decode` is supplied by the caller: it knows the legacy file's exact
/// layout (this crate no longer writes that format, only reads it during
/// migration) and turns it into plaintext records using [`crate::aead`].
pub fn migrate_legacy_vault(
  legacy_path: impl AsRef<Path>,
  new_path: impl AsRef<Path>,
  passphrase: &str,
  decode: impl FnOnce(&[u8]) -> Result<Vec<LegacyRecord>, VaultError>,
) -> Result<(), VaultError> {
  let legacy_path = legacy_path.as_ref();
  let new_path = new_path.as_ref();

  let raw = std::fs::read(legacy_path)?;
  let records = decode(&raw)?;

  let tmp_path = sibling_temp_path(new_path);
  if tmp_path.exists() {
    std::fs::remove_file(&tmp_path)?;
  }

  {
    let store = VaultStore::create(&tmp_path, passphrase)?;
    for record in &records {
      store.add(&record.fields)?;
    }
  }

  std::fs::rename(&tmp_path, new_path)?;
  tracing::debug!(
    from = %legacy_path.display(),
    to = %new_path.display(),
    count = records.len(),
    "legacy vault migrated"
  );
  Ok(())
}

fn sibling_temp_path(path: &Path) -> PathBuf {
  let mut p = path.as_os_str().to_owned();
  p.push(".migrating");
  PathBuf::from(p)
}
