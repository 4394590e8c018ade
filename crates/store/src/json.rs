//! JSON file store for ledger snapshots.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::warn;

use tally_core::LedgerSnapshot;

/// File name of the snapshot document inside the data directory.
const DATA_FILE: &str = "ledger.json";

/// Storage error.
///
/// Only `save` can fail; `load` recovers to an empty snapshot by contract.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Single-file JSON snapshot store.
///
/// `load`/`save` have no locking of their own; mutating callers must hold
/// the [`guard`](Self::guard) across the whole load-mutate-save cycle so
/// that two concurrent mutations cannot overwrite each other's effect.
/// Read-only loads may skip the guard (a stale read is acceptable).
#[derive(Debug)]
pub struct JsonLedgerStore {
    dir: PathBuf,
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonLedgerStore {
    /// Store backed by `<dir>/ledger.json`. The directory is created lazily
    /// on the first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let path = dir.join(DATA_FILE);
        Self {
            dir,
            path,
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquire the process-wide mutation guard.
    ///
    /// A poisoned lock is recovered rather than propagated: the snapshot on
    /// disk is always a complete document, so a panicked holder cannot have
    /// left it half-mutated.
    pub fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load the current snapshot.
    ///
    /// A missing file is an empty ledger, not an error. An unreadable or
    /// malformed file is logged and also treated as empty; this call never
    /// fails.
    pub fn load(&self) -> LedgerSnapshot {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return LedgerSnapshot::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read ledger file");
                return LedgerSnapshot::default();
            }
        };

        match parse_snapshot(&text) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "malformed ledger file, starting empty");
                LedgerSnapshot::default()
            }
        }
    }

    /// Persist the full snapshot, creating the data directory if needed.
    ///
    /// The document is written to a sibling temp file and renamed into
    /// place, so a crash mid-write cannot corrupt the previous snapshot.
    pub fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(snapshot)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Parse a snapshot document, matching field names case-insensitively.
///
/// External edits to the file are tolerated: keys are normalized to
/// lowercase before deserializing, and the model types accept the
/// lowercase spellings alongside the canonical ones.
fn parse_snapshot(text: &str) -> Result<LedgerSnapshot, serde_json::Error> {
    let value: Value = serde_json::from_str(text)?;
    serde_json::from_value(lowercase_keys(value))
}

fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k.to_lowercase(), lowercase_keys(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tally_core::{Transaction, TransactionKind, User, UserId};
    use tempfile::tempdir;

    fn sample_snapshot() -> LedgerSnapshot {
        let user = User::new("Ana", "ana@example.com", "hash-token");
        let user_id = user.id;
        LedgerSnapshot {
            users: vec![user],
            transactions: vec![
                Transaction::cleared(
                    TransactionKind::Credit,
                    user_id,
                    "Ana",
                    "salary",
                    Some("march".to_string()),
                    dec!(1200.50),
                ),
                Transaction::debt(user_id, "Ana", dec!(80), "loan", None),
            ],
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = JsonLedgerStore::new(dir.path().join("data"));
        assert_eq!(store.load(), LedgerSnapshot::default());
    }

    #[test]
    fn malformed_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = JsonLedgerStore::new(dir.path());
        fs::write(store.path(), "{ not json at all").unwrap();
        assert_eq!(store.load(), LedgerSnapshot::default());
    }

    #[test]
    fn save_creates_directory_and_round_trips() {
        let dir = tempdir().unwrap();
        let store = JsonLedgerStore::new(dir.path().join("nested").join("data"));
        let snapshot = sample_snapshot();

        store.save(&snapshot).unwrap();
        assert_eq!(store.load(), snapshot);
    }

    #[test]
    fn reserializing_an_unmodified_snapshot_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = JsonLedgerStore::new(dir.path());
        store.save(&sample_snapshot()).unwrap();

        let first = store.load();
        store.save(&first).unwrap();
        let second = store.load();
        assert_eq!(first, second);
    }

    #[test]
    fn field_name_matching_is_case_insensitive() {
        let dir = tempdir().unwrap();
        let store = JsonLedgerStore::new(dir.path());
        let user_id = UserId::new();
        let doc = format!(
            r#"{{
                "USERS": [
                    {{ "USERID": "{user_id}", "userName": "Ana",
                       "EMAIL": "ana@example.com", "password": "tok" }}
                ],
                "transactions": [
                    {{ "TRANSACTIONID": "{}", "AMOUNT": 25,
                       "label": "groceries", "TransactionTYPE": "Debit",
                       "transactionDateTime": "2026-02-01T08:30:00Z",
                       "USERID": "{user_id}", "UserName": "Ana" }}
                ]
            }}"#,
            tally_core::TransactionId::new(),
        );
        fs::write(store.path(), doc).unwrap();

        let snapshot = store.load();
        assert_eq!(snapshot.users.len(), 1);
        assert_eq!(snapshot.users[0].name, "Ana");
        assert_eq!(snapshot.transactions.len(), 1);
        assert_eq!(snapshot.transactions[0].amount, dec!(25));
        assert_eq!(snapshot.transactions[0].kind, TransactionKind::Debit);
        assert!(snapshot.transactions[0].is_cleared);
    }

    #[test]
    fn no_temp_file_left_behind_after_save() {
        let dir = tempdir().unwrap();
        let store = JsonLedgerStore::new(dir.path());
        store.save(&sample_snapshot()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("ledger.json")]);
    }

    #[test]
    fn guarded_appends_from_many_threads_all_land() {
        let dir = tempdir().unwrap();
        let store = std::sync::Arc::new(JsonLedgerStore::new(dir.path()));
        let user_id = UserId::new();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let store = std::sync::Arc::clone(&store);
                scope.spawn(move || {
                    let _guard = store.guard();
                    let mut snapshot = store.load();
                    snapshot.transactions.push(Transaction::cleared(
                        TransactionKind::Debit,
                        user_id,
                        "Ana",
                        "coffee",
                        None,
                        dec!(3.20),
                    ));
                    store.save(&snapshot).unwrap();
                });
            }
        });

        assert_eq!(store.load().transactions.len(), 8);
    }
}
