use pylon_primitives::ValidationError;
use pylon_relayer::SubmissionError;
use thiserror::Error;

/// Ledger backend failure.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing store could not be reached or written.
    #[error("ledger unavailable: {inner}")]
    Unavailable { inner: String },

    /// A stored record could not be read back into a user operation.
    #[error("ledger record corrupt: {inner}")]
    Corrupt { inner: String },
}

/// Failure of one pipeline run, tagged by the stage that produced it.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}
