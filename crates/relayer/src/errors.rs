use thiserror::Error;

/// Failure of one submission attempt. None of these are retried
/// automatically; the pending record stays in the ledger for inspection
/// or a later resubmission.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    /// Nonce or fee query against the execution client failed.
    #[error("provider error during {call}: {inner}")]
    Provider { call: &'static str, inner: String },

    /// Signing the relay transaction failed.
    #[error("signing failed: {inner}")]
    Signature { inner: String },

    /// The node rejected the broadcast (insufficient relayer balance,
    /// failed pre-checks, ...).
    #[error("broadcast rejected: {inner}")]
    Broadcast { inner: String },

    /// A network round-trip exceeded its deadline. Retrying is safe when
    /// the timeout hit before the broadcast step; after a broadcast whose
    /// acknowledgment was lost, chain state for the allocated nonce must be
    /// checked before resubmitting.
    #[error("{call} timed out")]
    Timeout { call: &'static str },

    /// The submission lane has shut down.
    #[error("submission lane closed")]
    LaneClosed,
}
