use crate::{
    error::StorageError,
    ledger::{PendingOpId, PendingOpStore, PendingRecord},
};
use ethers::types::{Address, U256};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Durable ledger backend on sqlite. The `(sender, nonce)` primary key
/// enforces ledger uniqueness in the database itself; an upsert under an
/// existing key replaces the payload, keeps `created_at` and bumps
/// `attempts`.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(unavailable)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS pending_ops (
                sender      TEXT    NOT NULL,
                nonce       TEXT    NOT NULL,
                op          TEXT    NOT NULL,
                created_at  INTEGER NOT NULL,
                attempts    INTEGER NOT NULL,
                PRIMARY KEY (sender, nonce)
            );",
        )
        .map_err(unavailable)?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

// Key columns are canonical text: lower-case hex for the sender, the
// nonce zero-padded to 64 digits so lexicographic order matches numeric
// order.
fn sender_key(sender: &Address) -> String {
    hex::encode(sender.as_bytes())
}

fn nonce_key(nonce: &U256) -> String {
    format!("{nonce:064x}")
}

fn unavailable(e: rusqlite::Error) -> StorageError {
    StorageError::Unavailable { inner: e.to_string() }
}

fn corrupt(e: impl ToString) -> StorageError {
    StorageError::Corrupt { inner: e.to_string() }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, String, String, u64, u32)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn decode_record(
    (sender, nonce, op, created_at, attempts): (String, String, String, u64, u32),
) -> Result<PendingRecord, StorageError> {
    let sender_bytes: Vec<u8> = hex::decode(&sender).map_err(corrupt)?;
    if sender_bytes.len() != 20 {
        return Err(corrupt(format!("sender key has {} bytes", sender_bytes.len())));
    }
    Ok(PendingRecord {
        sender: Address::from_slice(&sender_bytes),
        nonce: U256::from_str_radix(&nonce, 16).map_err(corrupt)?,
        op: serde_json::from_str(&op).map_err(corrupt)?,
        created_at,
        attempts,
    })
}

impl PendingOpStore for SqliteStore {
    fn upsert(&self, record: PendingRecord) -> Result<(), StorageError> {
        let op = serde_json::to_string(&record.op).map_err(corrupt)?;
        self.conn
            .lock()
            .execute(
                "INSERT INTO pending_ops (sender, nonce, op, created_at, attempts)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (sender, nonce) DO UPDATE SET
                     op = excluded.op,
                     attempts = pending_ops.attempts + 1",
                params![
                    sender_key(&record.sender),
                    nonce_key(&record.nonce),
                    op,
                    record.created_at,
                    record.attempts,
                ],
            )
            .map_err(unavailable)?;
        Ok(())
    }

    fn get(&self, id: &PendingOpId) -> Result<Option<PendingRecord>, StorageError> {
        let row = self
            .conn
            .lock()
            .query_row(
                "SELECT sender, nonce, op, created_at, attempts
                 FROM pending_ops WHERE sender = ?1 AND nonce = ?2",
                params![sender_key(&id.sender), nonce_key(&id.nonce)],
                row_to_record,
            )
            .optional()
            .map_err(unavailable)?;
        row.map(decode_record).transpose()
    }

    fn remove(&self, id: &PendingOpId) -> Result<bool, StorageError> {
        let removed = self
            .conn
            .lock()
            .execute(
                "DELETE FROM pending_ops WHERE sender = ?1 AND nonce = ?2",
                params![sender_key(&id.sender), nonce_key(&id.nonce)],
            )
            .map_err(unavailable)?;
        Ok(removed > 0)
    }

    fn all(&self) -> Result<Vec<PendingRecord>, StorageError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT sender, nonce, op, created_at, attempts
                 FROM pending_ops ORDER BY created_at, sender, nonce",
            )
            .map_err(unavailable)?;
        let rows = stmt
            .query_map([], row_to_record)
            .map_err(unavailable)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(unavailable)?;
        rows.into_iter().map(decode_record).collect()
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.conn.lock().execute("DELETE FROM pending_ops", []).map_err(unavailable)?;
        Ok(())
    }
}
