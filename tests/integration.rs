//! End-to-end scenarios exercising the public facade rather than any one
//! module in isolation.

use credvault::facade::{Session, VaultConfig};
use credvault::generator::GeneratorPolicy;
use credvault::record::RecordFields;
use credvault::VaultError;
use tempfile::tempdir;

fn fields(service: &str, password: &str) -> RecordFields {
  RecordFields {
    service: service.into(),
    username: "alice".into(),
    password: password.into(),
    totp_secret: String::new(),
    recovery_codes: String::new(),
  }
}

#[test]
fn bulk_import_then_export_reports_counts() {
  let dir = tempdir().unwrap();
  let path = dir.path().join("vault.db");
  let mut session = Session::create(&path, "pw", VaultConfig::default()).unwrap();

  let (inserted, skipped) = session.bulk_import(&[fields("a.com", "x"), fields("b.com", "y"), fields("c.com", "z")]);
  let exported = session.bulk_export().unwrap();

  assert_eq!(inserted, 3);
  assert_eq!(skipped, 0);
  assert_eq!(exported.len(), 3);
}

#[test]
fn open_then_crud_round_trip() {
  let dir = tempdir().unwrap();
  let path = dir.path().join("vault.db");

  let mut session = Session::create(&path, "correct horse battery staple", VaultConfig::default()).unwrap();
  let id = session.add(&fields("example.com", "hunter2")).unwrap();
  session.update(id, &fields("example.com", "hunter3")).unwrap();
  assert_eq!(session.list().unwrap()[0].fields.password, "hunter3");
  session.delete(id).unwrap();
  assert!(session.list().unwrap().is_empty());
  session.close().unwrap();

  let session = Session::open(&path, "correct horse battery staple", VaultConfig::default()).unwrap();
  assert!(session.list().unwrap().is_empty());
}

#[test]
fn wrong_passphrase_is_indistinguishable_from_corruption() {
  let dir = tempdir().unwrap();
  let path = dir.path().join("vault.db");
  Session::create(&path, "correct horse battery staple", VaultConfig::default()).unwrap();

  let err = Session::open(&path, "wrong passphrase", VaultConfig::default()).unwrap_err();
  assert!(matches!(err, VaultError::AuthFailed));
}

#[test]
fn totp_matches_rfc6238_vector_through_the_facade() {
  let dir = tempdir().unwrap();
  let path = dir.path().join("vault.db");
  let mut session = Session::create(&path, "pw", VaultConfig::default()).unwrap();

  let id = session.add(&fields("authenticator.example", "x")).unwrap();
  let mut updated = fields("authenticator.example", "x");
  updated.totp_secret = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ".into();
  session.update(id, &updated).unwrap();

  let code = session.totp_code(id).unwrap();
  assert_eq!(code.len(), 6);
  assert!(code.chars().all(|c| c.is_ascii_digit()));
}

#[test]
fn generator_covers_every_class_across_many_calls() {
  let dir = tempdir().unwrap();
  let path = dir.path().join("vault.db");
  let session = Session::create(&path, "pw", VaultConfig::default()).unwrap();

  let policy = GeneratorPolicy {
    length: 16,
    uppercase: true,
    digits: true,
    symbols: true,
  };
  const CANONICAL_SYMBOLS: &[u8] = b"!@#$%^&*()";
  for _ in 0..100 {
    let pw = session.generate_password(&policy).unwrap();
    assert_eq!(pw.len(), 16);
    assert!(pw.bytes().any(|b| b.is_ascii_lowercase()));
    assert!(pw.bytes().any(|b| b.is_ascii_uppercase()));
    assert!(pw.bytes().any(|b| b.is_ascii_digit()));
    assert!(pw.bytes().any(|b| CANONICAL_SYMBOLS.contains(&b)));
    assert!(pw
      .bytes()
      .all(|b| b.is_ascii_alphanumeric() || CANONICAL_SYMBOLS.contains(&b)));
  }
}

#[test]
fn health_check_flags_reused_and_short_passwords() {
  let dir = tempdir().unwrap();
  let path = dir.path().join("vault.db");
  let mut session = Session::create(&path, "pw", VaultConfig::default()).unwrap();

  session.add(&fields("a.example", "short")).unwrap();
  session.add(&fields("b.example", "Sh4redAcrossBoth!")).unwrap();
  session.add(&fields("c.example", "Sh4redAcrossBoth!")).unwrap();

  // Point the worker pool at an address nothing answers so the HIBP leg
  // fails fast and deterministically rather than hitting the network.
  let mut config = VaultConfig::default();
  config.health.hibp_base_url = "http://127.0.0.1:1".to_string();
  config.health.worker_count = 2;

  let session = Session::open(&path, "pw", config).unwrap();
  let issues = session.health_check().unwrap();

  assert!(issues
    .iter()
    .any(|i| matches!(i, credvault::health::HealthIssue::Short { len, .. } if *len == "short".len())));

  let reused = issues
    .iter()
    .filter_map(|i| match i {
      credvault::health::HealthIssue::Reused { ids } => Some(ids.clone()),
      _ => None,
    })
    .collect::<Vec<_>>();
  assert_eq!(reused.len(), 1);
  assert_eq!(reused[0].len(), 2);
}

#[test]
fn kdf_derivation_is_deterministic_for_the_same_vault() {
  let dir = tempdir().unwrap();
  let path = dir.path().join("vault.db");
  Session::create(&path, "pw", VaultConfig::default()).unwrap().close().unwrap();

  // Opening twice with the same passphrase must derive the same key and
  // succeed both times; a non-deterministic KDF would fail the second open.
  Session::open(&path, "pw", VaultConfig::default()).unwrap();
  Session::open(&path, "pw", VaultConfig::default()).unwrap();
}
