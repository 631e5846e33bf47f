use crate::{
    error::PipelineError,
    ledger::{PendingLedger, PendingRecord},
};
use ethers::types::H256;
use pylon_primitives::UserOperationRequest;
use pylon_relayer::LaneHandle;
use std::fmt;
use tracing::{debug, warn};

/// Lifecycle stage of an operation moving through the pipeline, used in
/// logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpStage {
    Received,
    Validated,
    Pending,
    Submitted,
    Cleared,
    Rejected,
    Failed,
}

impl fmt::Display for OpStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OpStage::Received => "received",
            OpStage::Validated => "validated",
            OpStage::Pending => "pending",
            OpStage::Submitted => "submitted",
            OpStage::Cleared => "cleared",
            OpStage::Rejected => "rejected",
            OpStage::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Drives one accepted wire request end to end: validate, record in the
/// pending ledger, hand to the submission lane, and clear the record once
/// the broadcast is acknowledged. On submission failure the record stays
/// in the ledger.
#[derive(Clone)]
pub struct Pipeline {
    ledger: PendingLedger,
    lane: LaneHandle,
}

impl Pipeline {
    pub fn new(ledger: PendingLedger, lane: LaneHandle) -> Self {
        Self { ledger, lane }
    }

    pub fn ledger(&self) -> &PendingLedger {
        &self.ledger
    }

    pub async fn handle(&self, request: &UserOperationRequest) -> Result<H256, PipelineError> {
        debug!(stage = %OpStage::Received, "user operation received");
        let uo = match request.decode() {
            Ok(uo) => uo,
            Err(err) => {
                debug!(stage = %OpStage::Rejected, %err, "user operation rejected");
                return Err(err.into());
            }
        };
        debug!(stage = %OpStage::Validated, sender = ?uo.sender, nonce = ?uo.nonce, "decoded");

        let record = PendingRecord::new(&uo);
        let id = record.id();
        if let Err(err) = self.ledger.upsert(record) {
            warn!(stage = %OpStage::Failed, %err, sender = ?id.sender, nonce = ?id.nonce, "failed to record pending operation");
            return Err(err.into());
        }
        debug!(stage = %OpStage::Pending, sender = ?id.sender, nonce = ?id.nonce, "recorded");

        match self.lane.submit(uo).await {
            Ok(hash) => {
                debug!(stage = %OpStage::Submitted, tx_hash = ?hash, "broadcast acknowledged");
                // The operation is on the wire; a failed clear is a
                // leftover record, not a failed submission.
                if let Err(err) = self.ledger.remove(&id) {
                    warn!(%err, sender = ?id.sender, nonce = ?id.nonce, "failed to clear record");
                } else {
                    debug!(stage = %OpStage::Cleared, sender = ?id.sender, nonce = ?id.nonce, "cleared");
                }
                Ok(hash)
            }
            Err(err) => {
                warn!(stage = %OpStage::Failed, %err, sender = ?id.sender, nonce = ?id.nonce, "submission failed, record retained");
                Err(err.into())
            }
        }
    }
}
