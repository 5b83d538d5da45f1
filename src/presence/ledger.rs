use super::LedgerKey;
use anyhow::Result;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

#[derive(Default)]
struct Entries {
    /// Credits whose sheet row has been written. Only these are snapshotted.
    credited: HashSet<LedgerKey>,
    /// Reservations whose sheet write is still in flight.
    pending: HashSet<LedgerKey>,
}

impl Entries {
    fn holds(&self, key: &LedgerKey) -> bool {
        self.credited.contains(key) || self.pending.contains(key)
    }
}

/// Set of credits granted since the last daily reset, snapshotted to a JSON file.
///
/// All mutations go through one lock, so `try_reserve` is a single check-and-insert
/// even when several message tasks race on the same key. Writes to disk are serialized
/// by a second lock held from snapshot to rename.
pub struct Ledger {
    entries: Mutex<Entries>,
    write_lock: tokio::sync::Mutex<()>,
    path: PathBuf,
}

impl Ledger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_keys(path.into(), HashSet::new())
    }

    fn with_keys(path: PathBuf, credited: HashSet<LedgerKey>) -> Self {
        Self {
            entries: Mutex::new(Entries {
                credited,
                pending: HashSet::new(),
            }),
            write_lock: tokio::sync::Mutex::new(()),
            path,
        }
    }

    /// Loads the snapshot at `path`. A missing or unreadable snapshot yields an empty ledger.
    pub async fn restore(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let keys = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => match serde_json::from_str::<Vec<LedgerKey>>(&raw) {
                Ok(keys) => {
                    info!("Restored {} ledger entries from {}", keys.len(), path.display());
                    keys.into_iter().collect()
                }
                Err(e) => {
                    warn!("Ledger snapshot {} is corrupt, starting empty: {}", path.display(), e);
                    HashSet::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No ledger snapshot at {}, starting empty", path.display());
                HashSet::new()
            }
            Err(e) => {
                warn!("Could not read ledger snapshot {}, starting empty: {}", path.display(), e);
                HashSet::new()
            }
        };

        Self::with_keys(path, keys)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True for credited keys and for reservations still in flight.
    pub fn contains(&self, key: &LedgerKey) -> bool {
        self.entries.lock().holds(key)
    }

    pub fn record(&self, key: LedgerKey) {
        let mut entries = self.entries.lock();
        entries.pending.remove(&key);
        entries.credited.insert(key);
    }

    /// Reserves `key` unless it is already credited or reserved. Returns `false` for a
    /// duplicate. The reservation is not persisted until `confirm`.
    pub fn try_reserve(&self, key: &LedgerKey) -> bool {
        let mut entries = self.entries.lock();
        if entries.holds(key) {
            return false;
        }
        entries.pending.insert(key.clone());
        true
    }

    /// Turns a reservation into a credit. A reservation dropped by `clear` in the
    /// meantime stays dropped.
    pub fn confirm(&self, key: &LedgerKey) {
        let mut entries = self.entries.lock();
        if entries.pending.remove(key) {
            entries.credited.insert(key.clone());
        }
    }

    /// Drops a reservation whose registration could not be completed.
    pub fn release(&self, key: &LedgerKey) {
        self.entries.lock().pending.remove(key);
    }

    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        entries.credited.clear();
        entries.pending.clear();
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.lock();
        entries.credited.len() + entries.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Credited keys only; in-flight reservations are left out.
    pub fn snapshot(&self) -> Vec<LedgerKey> {
        self.entries.lock().credited.iter().cloned().collect()
    }

    /// Writes the current keys to disk through a temporary file and a rename.
    pub async fn persist(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let body = serde_json::to_vec(&self.snapshot())?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// `persist` with failures logged instead of returned.
    pub async fn persist_logged(&self) {
        if let Err(e) = self.persist().await {
            error!("Failed to save ledger snapshot to {}: {}", self.path.display(), e);
        }
    }
}
