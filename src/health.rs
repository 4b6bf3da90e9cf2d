//! Password Health Auditor: length/class/reuse checks plus an HIBP
//! k-anonymity breach lookup.
//!
//! The breach check is the one place this crate talks to the network.
//! Grounded in `core/pwned_check.c` for the SHA1-prefix/suffix split and
//! request shape, and in the teacher's background-thread pattern
//! (`main.rs`'s inactivity monitor, `extension.rs`'s server thread) for
//! using plain `std::thread` rather than an async runtime: a bounded pool
//! of blocking worker threads fans out across records and funnels results
//! back over an `mpsc` channel.

use crate::error::VaultError;
use crate::record::Record;
use sha1::{Digest, Sha1};
use std::collections::HashMap;
use std::sync::mpsc;
use std::thread;

const DEFAULT_WORKERS: usize = 4;
const HIBP_DEFAULT_BASE_URL: &str = "https://api.pwnedpasswords.com/range";
const USER_AGENT: &str = "credvault/1.0";

/// The fixed length below which a password is flagged `Short`. Not a
/// tunable: the threshold is part of the check's definition, not a
/// deployment knob.
const SHORT_THRESHOLD: usize = 16;

/// Which character classes a password is missing. A password with every
/// class present carries no flags set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MissingClassFlags {
  pub missing_upper: bool,
  pub missing_lower: bool,
  pub missing_digit: bool,
  pub missing_other: bool,
}

impl MissingClassFlags {
  fn any(&self) -> bool {
    self.missing_upper || self.missing_lower || self.missing_digit || self.missing_other
  }
}

/// One finding from a health audit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HealthIssue {
  Short { id: i64, len: usize },
  MissingClasses { id: i64, flags: MissingClassFlags },
  /// One entry per distinct reused password, carrying every id that
  /// shares it, in insertion order — not one entry per record.
  Reused { ids: Vec<i64> },
  Pwned { id: i64, count: u64 },
}

/// Configuration for the auditor, split out so tests can point the HIBP
/// client at a mock server and shrink the worker pool.
#[derive(Clone, Debug)]
pub struct HealthConfig {
  pub worker_count: usize,
  pub hibp_base_url: String,
}

impl Default for HealthConfig {
  fn default() -> Self {
    Self {
      worker_count: DEFAULT_WORKERS,
      hibp_base_url: HIBP_DEFAULT_BASE_URL.to_string(),
    }
  }
}

/// Runs every local (non-network) check against `records`: minimum
/// length, character-class coverage, and password reuse across the set.
fn local_checks(records: &[Record]) -> Vec<HealthIssue> {
  let mut issues = Vec::new();
  let mut group_order: Vec<Vec<i64>> = Vec::new();
  let mut group_index: HashMap<&str, usize> = HashMap::new();

  for r in records {
    let pw = r.fields.password.as_str();

    if pw.len() < SHORT_THRESHOLD {
      issues.push(HealthIssue::Short { id: r.id, len: pw.len() });
    }

    let flags = MissingClassFlags {
      missing_upper: !pw.bytes().any(|b| b.is_ascii_uppercase()),
      missing_lower: !pw.bytes().any(|b| b.is_ascii_lowercase()),
      missing_digit: !pw.bytes().any(|b| b.is_ascii_digit()),
      missing_other: !pw.bytes().any(|b| !b.is_ascii_alphanumeric()),
    };
    if flags.any() {
      issues.push(HealthIssue::MissingClasses { id: r.id, flags });
    }

    match group_index.get(pw) {
      Some(&idx) => group_order[idx].push(r.id),
      None => {
        group_index.insert(pw, group_order.len());
        group_order.push(vec![r.id]);
      }
    }
  }

  for ids in group_order {
    if ids.len() > 1 {
      issues.push(HealthIssue::Reused { ids });
    }
  }

  issues
}

/// SHA1 the password, split into the 5-char hex prefix sent to HIBP and the
/// 35-char suffix matched against the response lines.
fn sha1_prefix_suffix(password: &str) -> (String, String) {
  let digest = Sha1::digest(password.as_bytes());
  let hex = hex::encode_upper(digest);
  (hex[..5].to_string(), hex[5..].to_string())
}

/// Queries the HIBP range endpoint for `prefix` and returns the breach
/// count for `suffix`, or 0 if the suffix isn't present in the response.
fn query_hibp(base_url: &str, prefix: &str, suffix: &str) -> Result<u64, VaultError> {
  let url = format!("{base_url}/{prefix}");
  let response = reqwest::blocking::Client::new()
    .get(&url)
    .header("User-Agent", USER_AGENT)
    .send()
    .map_err(|_| VaultError::NetworkError { id: 0 })?
    .text()
    .map_err(|_| VaultError::NetworkError { id: 0 })?;

  for line in response.lines() {
    if let Some((line_suffix, count)) = line.split_once(':') {
      if line_suffix.eq_ignore_ascii_case(suffix) {
        return Ok(count.trim().parse().unwrap_or(0));
      }
    }
  }
  Ok(0)
}

/// Runs the full health audit: local checks plus an HIBP lookup for every
/// record, fanned out across a bounded worker pool.
///
/// A network failure for one record never aborts the audit for the
/// others: that record simply comes back with no `Pwned` finding, and the
/// failure is logged rather than propagated.
pub fn audit(records: &[Record], config: &HealthConfig) -> Vec<HealthIssue> {
  let mut issues = local_checks(records);

  let pwned_results = run_pwned_workers(records, config);
  for r in records {
    if let Some(Ok(count)) = pwned_results.get(&r.id) {
      if *count > 0 {
        issues.push(HealthIssue::Pwned { id: r.id, count: *count });
      }
    }
  }

  issues
}

fn run_pwned_workers(records: &[Record], config: &HealthConfig) -> HashMap<i64, Result<u64, VaultError>> {
  let worker_count = config.worker_count.max(1);
  let (tx, rx) = mpsc::channel();

  thread::scope(|scope| {
    let chunks = split_round_robin(records, worker_count);
    for chunk in chunks {
      let tx = tx.clone();
      let base_url = config.hibp_base_url.clone();
      scope.spawn(move || {
        for record in chunk {
          let (prefix, suffix) = sha1_prefix_suffix(&record.fields.password);
          let result = query_hibp(&base_url, &prefix, &suffix).map_err(|_| VaultError::NetworkError { id: record.id });
          if result.is_err() {
            tracing::warn!(id = record.id, "pwned lookup failed");
          } else {
            tracing::debug!(id = record.id, "pwned lookup complete");
          }
          let _ = tx.send((record.id, result));
        }
      });
    }
    drop(tx);
  });

  rx.into_iter().collect()
}

/// Splits `records` into up to `worker_count` chunks by round-robin
/// assignment, so work is spread evenly without needing to know in advance
/// how expensive each lookup will be.
fn split_round_robin<'a>(records: &'a [Record], worker_count: usize) -> Vec<Vec<&'a Record>> {
  let mut chunks: Vec<Vec<&Record>> = vec![Vec::new(); worker_count];
  for (i, record) in records.iter().enumerate() {
    chunks[i % worker_count].push(record);
  }
  chunks
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::record::RecordFields;

  fn record(id: i64, password: &str) -> Record {
    Record {
      id,
      fields: RecordFields {
        service: "svc".into(),
        username: "user".into(),
        password: password.into(),
        totp_secret: String::new(),
        recovery_codes: String::new(),
      },
    }
  }

  #[test]
  fn sha1_split_has_hibp_prefix_suffix_shape() {
    let (prefix, suffix) = sha1_prefix_suffix("password123");
    assert_eq!(prefix.len(), 5);
    assert_eq!(suffix.len(), 35);
    assert!(prefix.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
  }

  #[test]
  fn fifteen_char_password_is_short_but_sixteen_is_not() {
    let records = vec![record(1, &"a".repeat(15)), record(2, &"a".repeat(16))];
    let issues = local_checks(&records);
    assert!(issues.contains(&HealthIssue::Short { id: 1, len: 15 }));
    assert!(!issues.iter().any(|i| matches!(i, HealthIssue::Short { id: 2, .. })));
  }

  #[test]
  fn reused_password_emits_a_single_issue_with_every_id() {
    let records = vec![record(1, "Sh4red!Pw"), record(2, "Sh4red!Pw"), record(3, "Un1que!Pw")];
    let issues = local_checks(&records);
    assert!(issues.contains(&HealthIssue::Reused { ids: vec![1, 2] }));
    assert_eq!(issues.iter().filter(|i| matches!(i, HealthIssue::Reused { .. })).count(), 1);
  }

  #[test]
  fn missing_classes_is_flagged_for_all_lowercase() {
    let records = vec![record(1, "alllowercase")];
    let issues = local_checks(&records);
    assert!(issues.iter().any(|i| matches!(
      i,
      HealthIssue::MissingClasses { id: 1, flags } if flags.missing_upper && flags.missing_digit && flags.missing_other
    )));
  }

  #[test]
  fn fully_compliant_password_has_no_missing_classes_issue() {
    let records = vec![record(1, "Str0ng!Passphrase")];
    let issues = local_checks(&records);
    assert!(!issues.iter().any(|i| matches!(i, HealthIssue::MissingClasses { .. })));
  }

  #[test]
  fn round_robin_split_covers_every_record_exactly_once() {
    let records: Vec<Record> = (0..7).map(|i| record(i, "x")).collect();
    let chunks = split_round_robin(&records, 3);
    let total: usize = chunks.iter().map(|c| c.len()).sum();
    assert_eq!(total, 7);
  }
}
