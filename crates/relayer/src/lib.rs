//! User operation submission
//!
//! Each accepted user operation is wrapped in one `handleOps` transaction
//! and broadcast by the relayer account. Chain-nonce acquisition and
//! signing are serialized through a single-owner submission lane so that
//! concurrent requests can never produce two transactions with the same
//! relayer nonce.

mod errors;
mod ethereum;
mod lane;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
mod relayer;

pub use errors::SubmissionError;
pub use ethereum::{ChainRpc, EthereumRpc};
pub use lane::{LaneHandle, SubmissionLane, SubmitRequest};
pub use relayer::Relayer;
