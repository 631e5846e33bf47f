use crate::{database::SqliteStore, error::StorageError, memory::MemoryStore};
use ethers::types::{Address, U256};
use pylon_primitives::{CanonicalUserOperation, UserOperation};
use serde::{Deserialize, Serialize};
use std::{
    path::Path,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

/// Ledger key of a pending operation: the sender account and the
/// operation's own nonce. The relayer account's chain nonce plays no part
/// here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PendingOpId {
    pub sender: Address,
    pub nonce: U256,
}

/// One pending operation as durably recorded before submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRecord {
    pub sender: Address,
    pub nonce: U256,
    pub op: CanonicalUserOperation,
    /// Unix seconds of the first insert under this key. A replacement
    /// keeps it.
    pub created_at: u64,
    /// Submission attempts made for this key, counting the one in flight.
    pub attempts: u32,
}

impl PendingRecord {
    pub fn new(uo: &UserOperation) -> Self {
        Self {
            sender: uo.sender,
            nonce: uo.nonce,
            op: CanonicalUserOperation::from(uo),
            created_at: unix_now(),
            attempts: 1,
        }
    }

    pub fn id(&self) -> PendingOpId {
        PendingOpId { sender: self.sender, nonce: self.nonce }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Storage backend for the pending ledger. One record per
/// `(sender, nonce)`; an upsert under an existing key replaces the
/// payload, keeps `created_at` and bumps `attempts`.
pub trait PendingOpStore: Send + Sync {
    fn upsert(&self, record: PendingRecord) -> Result<(), StorageError>;
    fn get(&self, id: &PendingOpId) -> Result<Option<PendingRecord>, StorageError>;
    /// Removes the record if present. Returns whether one was removed;
    /// removing an absent key is not an error.
    fn remove(&self, id: &PendingOpId) -> Result<bool, StorageError>;
    fn all(&self) -> Result<Vec<PendingRecord>, StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// Handle to the pending ledger, cheap to clone.
#[derive(Clone)]
pub struct PendingLedger {
    store: Arc<dyn PendingOpStore>,
}

impl PendingLedger {
    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(MemoryStore::default()))
    }

    pub fn sqlite<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        Ok(Self::with_store(Arc::new(SqliteStore::open(path)?)))
    }

    /// Wraps a custom backend.
    pub fn with_store(store: Arc<dyn PendingOpStore>) -> Self {
        Self { store }
    }

    pub fn upsert(&self, record: PendingRecord) -> Result<(), StorageError> {
        self.store.upsert(record)
    }

    pub fn get(&self, id: &PendingOpId) -> Result<Option<PendingRecord>, StorageError> {
        self.store.get(id)
    }

    pub fn remove(&self, id: &PendingOpId) -> Result<bool, StorageError> {
        self.store.remove(id)
    }

    pub fn all(&self) -> Result<Vec<PendingRecord>, StorageError> {
        self.store.all()
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::Bytes;
    use tempfile::TempDir;

    fn op(sender_byte: u8, nonce: u64) -> UserOperation {
        UserOperation::default()
            .sender(Address::from([sender_byte; 20]))
            .nonce(U256::from(nonce))
            .call_data(Bytes::from(vec![0xb6, 0x1d, 0x27, 0xf6]))
    }

    fn backends() -> Vec<(PendingLedger, Option<TempDir>)> {
        let dir = TempDir::new().unwrap();
        let sqlite = PendingLedger::sqlite(dir.path().join("pending.db")).unwrap();
        vec![(PendingLedger::in_memory(), None), (sqlite, Some(dir))]
    }

    #[test]
    fn upsert_then_get_round_trips_the_record() {
        for (ledger, _guard) in backends() {
            let record = PendingRecord::new(&op(0xaa, 1));
            ledger.upsert(record.clone()).unwrap();
            assert_eq!(ledger.get(&record.id()).unwrap(), Some(record));
        }
    }

    #[test]
    fn one_record_per_sender_and_nonce() {
        for (ledger, _guard) in backends() {
            ledger.upsert(PendingRecord::new(&op(0xaa, 1))).unwrap();
            ledger.upsert(PendingRecord::new(&op(0xaa, 1))).unwrap();
            ledger.upsert(PendingRecord::new(&op(0xaa, 2))).unwrap();
            ledger.upsert(PendingRecord::new(&op(0xbb, 1))).unwrap();
            assert_eq!(ledger.all().unwrap().len(), 3);
        }
    }

    #[test]
    fn replacement_keeps_created_at_and_bumps_attempts() {
        for (ledger, _guard) in backends() {
            let mut first = PendingRecord::new(&op(0xaa, 1));
            first.created_at = 1_700_000_000;
            ledger.upsert(first.clone()).unwrap();

            let mut replacement = PendingRecord::new(&op(0xaa, 1));
            replacement.op.signature = "deadbeef".into();
            ledger.upsert(replacement).unwrap();

            let stored = ledger.get(&first.id()).unwrap().unwrap();
            assert_eq!(stored.created_at, 1_700_000_000);
            assert_eq!(stored.attempts, 2);
            assert_eq!(stored.op.signature, "deadbeef");
        }
    }

    #[test]
    fn racing_upserts_under_one_key_leave_one_record() {
        use std::{sync::Barrier, thread};

        const WRITERS: usize = 8;
        for (ledger, _guard) in backends() {
            let barrier = Arc::new(Barrier::new(WRITERS));
            let handles: Vec<_> = (0..WRITERS)
                .map(|_| {
                    let ledger = ledger.clone();
                    let barrier = barrier.clone();
                    thread::spawn(move || {
                        barrier.wait();
                        ledger.upsert(PendingRecord::new(&op(0xaa, 1))).unwrap();
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }

            let records = ledger.all().unwrap();
            assert_eq!(records.len(), 1);
            // Each writer either inserted or bumped; none of the eight
            // writes was lost.
            assert_eq!(records[0].attempts, WRITERS as u32);
        }
    }

    #[test]
    fn remove_is_idempotent() {
        for (ledger, _guard) in backends() {
            let record = PendingRecord::new(&op(0xaa, 1));
            ledger.upsert(record.clone()).unwrap();
            assert!(ledger.remove(&record.id()).unwrap());
            assert!(!ledger.remove(&record.id()).unwrap());
            assert_eq!(ledger.get(&record.id()).unwrap(), None);
        }
    }

    #[test]
    fn sqlite_ledger_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pending.db");
        let record = PendingRecord::new(&op(0xaa, 7));

        {
            let ledger = PendingLedger::sqlite(&path).unwrap();
            ledger.upsert(record.clone()).unwrap();
        }

        let reopened = PendingLedger::sqlite(&path).unwrap();
        assert_eq!(reopened.get(&record.id()).unwrap(), Some(record));
    }
}
