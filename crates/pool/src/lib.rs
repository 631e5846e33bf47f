//! Pending operation ledger and the pipeline that drives each accepted
//! user operation through validate, persist, submit and clear.

mod database;
mod error;
mod ledger;
mod memory;
mod pipeline;

pub use database::SqliteStore;
pub use error::{PipelineError, StorageError};
pub use ledger::{PendingLedger, PendingOpId, PendingOpStore, PendingRecord};
pub use memory::MemoryStore;
pub use pipeline::{OpStage, Pipeline};
