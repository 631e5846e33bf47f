use crate::{errors::SubmissionError, ethereum::ChainRpc, relayer::Relayer};
use ethers::types::H256;
use pylon_primitives::UserOperation;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{info, warn};

/// One queued submission and the channel its outcome is reported on.
pub struct SubmitRequest {
    pub uo: UserOperation,
    pub respond_to: oneshot::Sender<Result<H256, SubmissionError>>,
}

/// Cloneable front door to the submission lane.
#[derive(Clone)]
pub struct LaneHandle {
    tx: mpsc::Sender<SubmitRequest>,
}

impl LaneHandle {
    /// Queues a user operation and waits for its submission outcome.
    pub async fn submit(&self, uo: UserOperation) -> Result<H256, SubmissionError> {
        let (respond_to, rx) = oneshot::channel();
        self.tx
            .send(SubmitRequest { uo, respond_to })
            .await
            .map_err(|_| SubmissionError::LaneClosed)?;
        rx.await.map_err(|_| SubmissionError::LaneClosed)?
    }
}

/// Single owner of the relayer account. Requests are drained one at a
/// time, so nonce acquisition, signing and broadcast of one operation
/// complete before the next begins; the relayer nonce can never be
/// handed to two transactions.
pub struct SubmissionLane<C: ChainRpc> {
    rx: mpsc::Receiver<SubmitRequest>,
    relayer: Relayer<C>,
}

impl<C: ChainRpc + 'static> SubmissionLane<C> {
    pub fn new(relayer: Relayer<C>, capacity: usize) -> (LaneHandle, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (LaneHandle { tx }, Self { rx, relayer })
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        info!(relayer = ?self.relayer.address(), "submission lane running");
        while let Some(req) = self.rx.recv().await {
            // A failed submission only fails its own request; the lane
            // moves on to the next one.
            let res = self.relayer.submit(req.uo).await;
            if let Err(ref err) = res {
                warn!(%err, "submission failed");
            }
            let _ = req.respond_to.send(res);
        }
        info!("submission lane drained, shutting down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockChainRpc;
    use ethers::types::{U256, U64};
    use pylon_contracts::EntryPoint;
    use pylon_primitives::Wallet;
    use std::{sync::Arc, time::Duration};

    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn lane_with(chain: Arc<MockChainRpc>) -> (LaneHandle, JoinHandle<()>) {
        let relayer = Relayer::new(
            Wallet::from_private_key(TEST_KEY, 1337).unwrap(),
            None,
            EntryPoint::new("0x5FF137D4b0FDCD49DcA30c7CF57E578a026d2789".parse().unwrap()),
            U64::from(1337),
            U256::from(1_000_000u64),
            Duration::from_millis(500),
            chain,
        );
        let (handle, lane) = SubmissionLane::new(relayer, 16);
        (handle, lane.spawn())
    }

    fn op_with_nonce(n: u64) -> UserOperation {
        UserOperation::default().nonce(U256::from(n))
    }

    #[tokio::test]
    async fn concurrent_submissions_get_strictly_increasing_relayer_nonces() {
        let chain = Arc::new(MockChainRpc::new());
        let (handle, _worker) = lane_with(chain.clone());

        let mut joins = Vec::new();
        for i in 0..8 {
            let h = handle.clone();
            joins.push(tokio::spawn(async move { h.submit(op_with_nonce(i)).await }));
        }
        for join in joins {
            join.await.unwrap().unwrap();
        }

        let nonces = chain.decoded_nonces();
        assert_eq!(nonces.len(), 8);
        for (i, nonce) in nonces.iter().enumerate() {
            assert_eq!(*nonce, U256::from(i));
        }
    }

    #[tokio::test]
    async fn one_failure_does_not_stall_the_queue() {
        let chain = Arc::new(MockChainRpc::new());
        chain.fail_next_broadcasts(1);
        let (handle, _worker) = lane_with(chain.clone());

        let err = handle.submit(op_with_nonce(0)).await.unwrap_err();
        assert!(matches!(err, SubmissionError::Broadcast { .. }));

        let hash = handle.submit(op_with_nonce(1)).await.unwrap();
        assert_ne!(hash, H256::zero());
        // The failed attempt never consumed a chain nonce.
        assert_eq!(chain.decoded_nonces(), vec![U256::zero()]);
    }

    #[tokio::test]
    async fn submit_after_shutdown_reports_lane_closed() {
        let chain = Arc::new(MockChainRpc::new());
        let (handle, worker) = lane_with(chain);
        worker.abort();
        let _ = worker.await;

        let err = handle.submit(op_with_nonce(0)).await.unwrap_err();
        assert_eq!(err, SubmissionError::LaneClosed);
    }
}
