//! In-process chain double for exercising the submission path without a
//! node.

use crate::{errors::SubmissionError, ethereum::ChainRpc};
use async_trait::async_trait;
use ethers::{
    types::{transaction::eip2718::TypedTransaction, Address, Bytes, H256, U256},
    utils::{keccak256, rlp::Rlp},
};
use parking_lot::Mutex;
use std::time::Duration;

/// Mock [`ChainRpc`]. The pending nonce only advances when a broadcast is
/// accepted, mirroring how a node counts pending transactions.
#[derive(Default)]
pub struct MockChainRpc {
    nonce: Mutex<U256>,
    sent: Mutex<Vec<Bytes>>,
    fail_broadcasts: Mutex<u32>,
    broadcast_delay: Mutex<Option<Duration>>,
}

impl MockChainRpc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects the next `n` broadcasts.
    pub fn fail_next_broadcasts(&self, n: u32) {
        *self.fail_broadcasts.lock() = n;
    }

    /// Stalls every broadcast by `delay` before accepting it.
    pub fn set_broadcast_delay(&self, delay: Duration) {
        *self.broadcast_delay.lock() = Some(delay);
    }

    /// Raw transactions accepted so far, in broadcast order.
    pub fn sent(&self) -> Vec<Bytes> {
        self.sent.lock().clone()
    }

    /// Relayer nonces of the accepted transactions, in broadcast order.
    pub fn decoded_nonces(&self) -> Vec<U256> {
        self.sent()
            .iter()
            .map(|raw| {
                let (tx, _sig) = TypedTransaction::decode_signed(&Rlp::new(raw))
                    .expect("accepted raw transaction must decode");
                *tx.nonce().expect("relay transaction carries a nonce")
            })
            .collect()
    }
}

#[async_trait]
impl ChainRpc for MockChainRpc {
    async fn pending_nonce(&self, _address: Address) -> Result<U256, SubmissionError> {
        Ok(*self.nonce.lock())
    }

    async fn estimate_fees(&self) -> Result<(U256, U256), SubmissionError> {
        Ok((U256::from(2_000_000_000u64), U256::from(1_000_000_000u64)))
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<H256, SubmissionError> {
        let delay = *self.broadcast_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        {
            let mut failures = self.fail_broadcasts.lock();
            if *failures > 0 {
                *failures -= 1;
                return Err(SubmissionError::Broadcast {
                    inner: "insufficient funds for gas * price + value".into(),
                });
            }
        }
        let hash = H256::from(keccak256(&raw));
        self.sent.lock().push(raw);
        *self.nonce.lock() += U256::one();
        Ok(hash)
    }
}
