use crate::{
    error::StorageError,
    ledger::{PendingOpId, PendingOpStore, PendingRecord},
};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Non-durable ledger backend. Suitable for tests and for running
/// without a ledger path; pending records do not survive a restart.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<PendingOpId, PendingRecord>>,
}

impl PendingOpStore for MemoryStore {
    fn upsert(&self, mut record: PendingRecord) -> Result<(), StorageError> {
        let mut records = self.records.write();
        if let Some(existing) = records.get(&record.id()) {
            record.created_at = existing.created_at;
            record.attempts = existing.attempts + 1;
        }
        records.insert(record.id(), record);
        Ok(())
    }

    fn get(&self, id: &PendingOpId) -> Result<Option<PendingRecord>, StorageError> {
        Ok(self.records.read().get(id).cloned())
    }

    fn remove(&self, id: &PendingOpId) -> Result<bool, StorageError> {
        Ok(self.records.write().remove(id).is_some())
    }

    fn all(&self) -> Result<Vec<PendingRecord>, StorageError> {
        Ok(self.records.read().values().cloned().collect())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.records.write().clear();
        Ok(())
    }
}
