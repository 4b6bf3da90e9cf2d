//! Vault Store: a page-encrypted SQL database holding credential records.
//!
//! Grounded in the original implementation's `core/database.c`, which keys
//! SQLite itself via `sqlite3_key()` rather than encrypting individual
//! fields — this crate follows that lineage using `rusqlite` built with
//! `bundled-sqlcipher-vendored-openssl`. The derived Argon2id key is
//! hex-encoded and handed to `PRAGMA key`; a bad passphrase does not error
//! immediately (SQLCipher can't tell a wrong key from a corrupt page on its
//! own), so every open runs a cheap verifying query afterward.
//!
//! KDF parameters cannot live inside the encrypted pages — they're needed
//! to produce the key that unlocks those pages — so they're kept in a
//! plaintext sidecar file `<path>.kdf`, mirroring the sidecar salt file the
//! original C implementation wrote next to the vault.

use crate::error::VaultError;
use crate::kdf::{self, KdfParams};
use crate::migrate;
use crate::record::{Record, RecordFields};
use crate::secret::SecretKey;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

fn kdf_sidecar_path(vault_path: &Path) -> PathBuf {
  let mut p = vault_path.as_os_str().to_owned();
  p.push(".kdf");
  PathBuf::from(p)
}

/// An open vault: a live encrypted connection plus the key that opened it.
#[derive(Debug)]
pub struct VaultStore {
  conn: Connection,
  key: SecretKey,
  path: PathBuf,
}

impl VaultStore {
  /// Creates a new vault at `path` if none exists, deriving a fresh key
  /// from `passphrase` and a freshly generated [`KdfParams`].
  pub fn create(path: impl AsRef<Path>, passphrase: &str) -> Result<Self, VaultError> {
    let path = path.as_ref();
    if path.exists() {
      return Err(VaultError::InvalidInput("vault already exists".into()));
    }

    let params = KdfParams::generate()?;
    let key = kdf::derive(passphrase, &params)?;
    std::fs::write(kdf_sidecar_path(path), params.to_text())?;

    let conn = Connection::open(path)?;
    apply_key(&conn, &key)?;
    create_schema(&conn)?;
    verify_key(&conn)?;

    tracing::debug!(path = %path.display(), "vault created");
    Ok(Self {
      conn,
      key,
      path: path.to_path_buf(),
    })
  }

  /// Opens an existing vault at `path`, deriving the key from `passphrase`
  /// and the sidecar [`KdfParams`].
  ///
  /// Runs the schema migrator before the verifying query, so every
  /// caller-visible operation after `open` sees a current-schema vault
  /// regardless of how old the file on disk is.
  ///
  /// A wrong passphrase and a corrupted vault file are both reported as
  /// [`VaultError::AuthFailed`] — SQLCipher cannot distinguish them, and
  /// neither can this API, by design.
  pub fn open(path: impl AsRef<Path>, passphrase: &str) -> Result<Self, VaultError> {
    let path = path.as_ref();
    let kdf_text = std::fs::read_to_string(kdf_sidecar_path(path)).map_err(|_| VaultError::AuthFailed)?;
    let params = KdfParams::from_text(&kdf_text)?;
    let key = kdf::derive(passphrase, &params)?;

    let conn = Connection::open(path)?;
    apply_key(&conn, &key)?;
    migrate::migrate_schema(&conn).map_err(|_| VaultError::AuthFailed)?;
    verify_key(&conn).map_err(|_| VaultError::AuthFailed)?;

    tracing::debug!(path = %path.display(), "vault opened");
    Ok(Self {
      conn,
      key,
      path: path.to_path_buf(),
    })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub(crate) fn key(&self) -> &SecretKey {
    &self.key
  }

  pub(crate) fn connection(&self) -> &Connection {
    &self.conn
  }

  /// Inserts a new record and returns its assigned id.
  pub fn add(&self, fields: &RecordFields) -> Result<i64, VaultError> {
    fields.validate()?;
    self.conn.execute(
      "INSERT INTO passwords (service, username, password, totp_secret, recovery_codes) \
       VALUES (?1, ?2, ?3, ?4, ?5)",
      (
        &fields.service,
        &fields.username,
        &fields.password,
        &fields.totp_secret,
        &fields.recovery_codes,
      ),
    )?;
    let id = self.conn.last_insert_rowid();
    tracing::debug!(id, "record added");
    Ok(id)
  }

  /// Lists all records, ordered by id ascending.
  pub fn list(&self) -> Result<Vec<Record>, VaultError> {
    let mut stmt = self.conn.prepare(
      "SELECT id, service, username, password, totp_secret, recovery_codes \
       FROM passwords ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([], |row| {
      Ok(Record {
        id: row.get(0)?,
        fields: RecordFields {
          service: row.get(1)?,
          username: row.get(2)?,
          password: row.get(3)?,
          totp_secret: row.get(4)?,
          recovery_codes: row.get(5)?,
        },
      })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(VaultError::from)
  }

  /// Replaces the fields of an existing record. The whole update runs in a
  /// transaction so a validation failure never leaves a partial write.
  pub fn update(&mut self, id: i64, fields: &RecordFields) -> Result<(), VaultError> {
    fields.validate()?;
    let tx = self.conn.transaction()?;
    let changed = tx.execute(
      "UPDATE passwords SET service = ?1, username = ?2, password = ?3, \
       totp_secret = ?4, recovery_codes = ?5 WHERE id = ?6",
      (
        &fields.service,
        &fields.username,
        &fields.password,
        &fields.totp_secret,
        &fields.recovery_codes,
        id,
      ),
    )?;
    if changed == 0 {
      return Err(VaultError::NotFound);
    }
    tx.commit()?;
    tracing::debug!(id, "record updated");
    Ok(())
  }

  /// Deletes a record by id.
  pub fn delete(&mut self, id: i64) -> Result<(), VaultError> {
    let tx = self.conn.transaction()?;
    let changed = tx.execute("DELETE FROM passwords WHERE id = ?1", [id])?;
    if changed == 0 {
      return Err(VaultError::NotFound);
    }
    tx.commit()?;
    tracing::debug!(id, "record deleted");
    Ok(())
  }

  /// Closes the vault. Dropping a [`VaultStore`] has the same effect; this
  /// exists so callers can observe and propagate a close-time error, and so
  /// the key is zeroized at a deterministic point rather than whenever the
  /// value happens to go out of scope.
  pub fn close(self) -> Result<(), VaultError> {
    tracing::debug!(path = %self.path.display(), "vault closed");
    Ok(())
  }
}

fn apply_key(conn: &Connection, key: &SecretKey) -> Result<(), VaultError> {
  let hex_key = hex::encode(key.as_bytes());
  conn.pragma_update(None, "key", format!("\"x'{hex_key}'\""))?;
  Ok(())
}

/// SQLCipher accepts any key without error; the only way to tell a correct
/// key from a wrong one is to try reading encrypted pages and see whether
/// they parse as SQLite at all.
fn verify_key(conn: &Connection) -> Result<(), VaultError> {
  conn
    .query_row("SELECT count(*) FROM sqlite_master", [], |row| row.get::<_, i64>(0))
    .map(|_| ())
    .map_err(|_| VaultError::AuthFailed)
}

fn create_schema(conn: &Connection) -> Result<(), VaultError> {
  conn.execute(
    "CREATE TABLE IF NOT EXISTS passwords (
       id INTEGER PRIMARY KEY AUTOINCREMENT,
       service TEXT NOT NULL,
       username TEXT NOT NULL,
       password TEXT NOT NULL,
       totp_secret TEXT,
       recovery_codes TEXT
     )",
    [],
  )?;
  Ok(())
}
