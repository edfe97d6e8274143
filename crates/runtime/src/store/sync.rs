//! Cache-aside sync decorator.
//!
//! [`SyncedStore`] wraps a local store and an optional remote store behind
//! the same [`RecordStore`] contract:
//!
//! - **Reads** go to the remote while online and refresh the local copy. A
//!   failed remote read flips the store offline and serves the local copy.
//! - **Writes** and **removals** always land locally first, then go through
//!   to the remote. A failed remote call flips the store offline and records
//!   the collection as pending.
//! - **Reconnect** pushes every local collection to the remote and replays
//!   pending removals. Local state wins; whatever the remote held is
//!   overwritten.
//!
//! Pending changes are journaled in the local store under
//! [`SYNC_JOURNAL`], so they survive a restart. A store opened over a
//! non-empty journal starts offline and reconnects before serving reads.
//!
//! Ids come from the local store. Flags are local and mirrored best-effort.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use super::{Record, RecordStore, Result, StoreError};

/// Local collection holding changes the remote has not seen yet.
pub const SYNC_JOURNAL: &str = "sync_journal";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum PendingOp {
    Write,
    Remove,
}

#[derive(Debug, Serialize, Deserialize)]
struct JournalEntry {
    collection: String,
    op: PendingOp,
}

pub struct SyncedStore {
    local: Arc<dyn RecordStore>,
    remote: Option<Arc<dyn RecordStore>>,
    online: AtomicBool,
    pending: Mutex<BTreeMap<String, PendingOp>>,
}

impl SyncedStore {
    /// Local store with no remote attached; behaves exactly like `local`.
    pub fn local_only(local: Arc<dyn RecordStore>) -> Self {
        Self {
            local,
            remote: None,
            online: AtomicBool::new(false),
            pending: Mutex::new(BTreeMap::new()),
        }
    }

    /// Local store mirrored to `remote`.
    ///
    /// Changes journaled by an earlier session are pushed first. If that
    /// push fails the store starts offline and keeps the journal.
    pub fn new(local: Arc<dyn RecordStore>, remote: Arc<dyn RecordStore>) -> Result<Self> {
        let pending = load_journal(local.as_ref())?;
        let store = Self {
            online: AtomicBool::new(pending.is_empty()),
            local,
            remote: Some(remote),
            pending: Mutex::new(pending),
        };

        if !store.is_online() {
            tracing::info!("Found unsynced local changes; reconnecting");
            if let Err(e) = store.reconnect() {
                tracing::warn!("Starting offline, remote unreachable: {}", e);
            }
        }
        Ok(store)
    }

    pub fn is_online(&self) -> bool {
        self.remote.is_some() && self.online.load(Ordering::SeqCst)
    }

    /// Collections changed while the remote was unreachable.
    pub fn dirty_collections(&self) -> Result<Vec<String>> {
        let pending = self.pending.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(pending.keys().cloned().collect())
    }

    /// Push all local state to the remote, replay pending removals and go
    /// back online.
    ///
    /// Returns the number of collections pushed or removed. On failure the
    /// store stays offline and the journal is kept.
    pub fn reconnect(&self) -> Result<usize> {
        let Some(remote) = &self.remote else {
            return Ok(0);
        };

        let mut pending = self.pending.lock().map_err(|_| StoreError::LockPoisoned)?;

        let names = self.collections()?;
        for name in &names {
            let records = self.local.get(name)?.unwrap_or_default();
            remote.set(name, records).inspect_err(|e| {
                tracing::warn!("Reconnect push of '{}' failed: {}", name, e);
            })?;
        }

        let removals: Vec<&String> = pending
            .iter()
            .filter(|(_, op)| **op == PendingOp::Remove)
            .map(|(name, _)| name)
            .collect();
        for name in &removals {
            remote.remove(name).inspect_err(|e| {
                tracing::warn!("Reconnect removal of '{}' failed: {}", name, e);
            })?;
        }
        let synced = names.len() + removals.len();

        pending.clear();
        self.local.remove(SYNC_JOURNAL)?;
        self.online.store(true, Ordering::SeqCst);

        tracing::info!("Reconnected; synced {} collection(s)", synced);

        Ok(synced)
    }

    fn online_remote(&self) -> Option<&Arc<dyn RecordStore>> {
        self.remote.as_ref().filter(|_| self.is_online())
    }

    fn go_offline(&self, collection: &str, error: &StoreError) {
        if self.online.swap(false, Ordering::SeqCst) {
            tracing::warn!(
                "Remote store unreachable while syncing '{}': {}; continuing offline",
                collection,
                error
            );
        }
    }

    /// Record a change the remote missed and persist the journal.
    fn mark_pending(&self, collection: &str, op: PendingOp) -> Result<()> {
        let mut pending = self.pending.lock().map_err(|_| StoreError::LockPoisoned)?;
        pending.insert(collection.to_owned(), op);

        let journal = pending
            .iter()
            .map(|(name, op)| -> Result<Record> {
                let entry = JournalEntry {
                    collection: name.clone(),
                    op: *op,
                };
                match serde_json::to_value(entry)? {
                    serde_json::Value::Object(record) => Ok(record),
                    other => Err(StoreError::Json(format!(
                        "journal entry is not an object: {other}"
                    ))),
                }
            })
            .collect::<Result<Vec<_>>>()?;
        self.local.set(SYNC_JOURNAL, journal)
    }
}

fn load_journal(local: &dyn RecordStore) -> Result<BTreeMap<String, PendingOp>> {
    local
        .get(SYNC_JOURNAL)?
        .unwrap_or_default()
        .into_iter()
        .map(|record| -> Result<(String, PendingOp)> {
            let entry: JournalEntry = serde_json::from_value(serde_json::Value::Object(record))
                .map_err(|e| StoreError::CorruptedRecord {
                    collection: SYNC_JOURNAL.to_owned(),
                    reason: e.to_string(),
                })?;
            Ok((entry.collection, entry.op))
        })
        .collect()
}

impl RecordStore for SyncedStore {
    fn get(&self, collection: &str) -> Result<Option<Vec<Record>>> {
        if let Some(remote) = self.online_remote() {
            match remote.get(collection) {
                Ok(Some(records)) => {
                    self.local.set(collection, records.clone())?;
                    return Ok(Some(records));
                }
                Ok(None) => {}
                Err(e) => self.go_offline(collection, &e),
            }
        }
        self.local.get(collection)
    }

    fn set(&self, collection: &str, records: Vec<Record>) -> Result<()> {
        match self.online_remote() {
            Some(remote) => {
                self.local.set(collection, records.clone())?;
                if let Err(e) = remote.set(collection, records) {
                    self.go_offline(collection, &e);
                    self.mark_pending(collection, PendingOp::Write)?;
                }
            }
            None => {
                self.local.set(collection, records)?;
                if self.remote.is_some() {
                    self.mark_pending(collection, PendingOp::Write)?;
                }
            }
        }
        Ok(())
    }

    fn remove(&self, collection: &str) -> Result<()> {
        self.local.remove(collection)?;
        match self.online_remote() {
            Some(remote) => {
                if let Err(e) = remote.remove(collection) {
                    self.go_offline(collection, &e);
                    self.mark_pending(collection, PendingOp::Remove)?;
                }
            }
            None => {
                if self.remote.is_some() {
                    self.mark_pending(collection, PendingOp::Remove)?;
                }
            }
        }
        Ok(())
    }

    fn collections(&self) -> Result<Vec<String>> {
        let mut names = self.local.collections()?;
        names.retain(|name| name != SYNC_JOURNAL);
        Ok(names)
    }

    fn flag(&self, name: &str) -> Result<bool> {
        self.local.flag(name)
    }

    fn set_flag(&self, name: &str, value: bool) -> Result<()> {
        self.local.set_flag(name, value)?;
        if let Some(remote) = self.online_remote()
            && let Err(e) = remote.set_flag(name, value)
        {
            tracing::debug!("Flag '{}' not mirrored to remote: {}", name, e);
        }
        Ok(())
    }

    fn next_id(&self) -> Result<String> {
        self.local.next_id()
    }
}
