use crate::errors::SubmissionError;
use async_trait::async_trait;
use ethers::{
    providers::Middleware,
    types::{Address, BlockNumber, Bytes, H256, U256},
};

/// The slice of execution-client RPC the relayer needs. Kept behind a
/// trait so submission logic can run against an in-process double.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Transaction count of `address` including pending transactions.
    async fn pending_nonce(&self, address: Address) -> Result<U256, SubmissionError>;

    /// `(max_fee_per_gas, max_priority_fee_per_gas)` estimate.
    async fn estimate_fees(&self) -> Result<(U256, U256), SubmissionError>;

    /// Broadcasts a signed raw transaction and returns its hash. The hash
    /// is the node's acknowledgment of the broadcast, not a receipt.
    async fn send_raw_transaction(&self, raw: Bytes) -> Result<H256, SubmissionError>;
}

/// Production [`ChainRpc`] backed by an ethers middleware.
#[derive(Clone, Debug)]
pub struct EthereumRpc<M: Middleware>(pub M);

#[async_trait]
impl<M: Middleware + 'static> ChainRpc for EthereumRpc<M> {
    async fn pending_nonce(&self, address: Address) -> Result<U256, SubmissionError> {
        self.0
            .get_transaction_count(address, Some(BlockNumber::Pending.into()))
            .await
            .map_err(|e| SubmissionError::Provider {
                call: "eth_getTransactionCount",
                inner: e.to_string(),
            })
    }

    async fn estimate_fees(&self) -> Result<(U256, U256), SubmissionError> {
        self.0
            .estimate_eip1559_fees(None)
            .await
            .map_err(|e| SubmissionError::Provider {
                call: "eth_feeHistory",
                inner: e.to_string(),
            })
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<H256, SubmissionError> {
        let pending = self
            .0
            .send_raw_transaction(raw)
            .await
            .map_err(|e| SubmissionError::Broadcast { inner: e.to_string() })?;
        Ok(pending.tx_hash())
    }
}
