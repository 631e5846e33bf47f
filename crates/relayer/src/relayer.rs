use crate::{errors::SubmissionError, ethereum::ChainRpc};
use ethers::{
    signers::Signer,
    types::{
        transaction::eip2718::TypedTransaction, Address, Eip1559TransactionRequest, H256, U256,
        U64,
    },
};
use pylon_contracts::EntryPoint;
use pylon_primitives::{UserOperation, Wallet};
use std::{future::Future, sync::Arc, time::Duration};
use tracing::{info, trace};

/// Builds, signs and broadcasts one `handleOps` transaction per user
/// operation. Not safe to drive concurrently against the same relayer
/// account; see [`crate::SubmissionLane`].
pub struct Relayer<C: ChainRpc> {
    wallet: Wallet,
    beneficiary: Address,
    entry_point: EntryPoint,
    chain_id: U64,
    gas_limit: U256,
    call_timeout: Duration,
    chain: Arc<C>,
}

impl<C: ChainRpc> Relayer<C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        wallet: Wallet,
        beneficiary: Option<Address>,
        entry_point: EntryPoint,
        chain_id: U64,
        gas_limit: U256,
        call_timeout: Duration,
        chain: Arc<C>,
    ) -> Self {
        let beneficiary = beneficiary.unwrap_or_else(|| wallet.address());
        Self { wallet, beneficiary, entry_point, chain_id, gas_limit, call_timeout, chain }
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    /// Submits one user operation: encode `handleOps`, take the next
    /// relayer nonce, sign and broadcast. Returns the transaction hash
    /// acknowledged by the node.
    pub async fn submit(&self, uo: UserOperation) -> Result<H256, SubmissionError> {
        let calldata = self
            .entry_point
            .handle_ops_calldata(vec![uo.into()], self.beneficiary);

        let nonce = self
            .with_deadline("eth_getTransactionCount", self.chain.pending_nonce(self.address()))
            .await?;
        let (max_fee, max_priority_fee) =
            self.with_deadline("eth_feeHistory", self.chain.estimate_fees()).await?;

        let tx: TypedTransaction = Eip1559TransactionRequest::new()
            .from(self.address())
            .to(self.entry_point.address())
            .data(calldata)
            .nonce(nonce)
            .gas(self.gas_limit)
            .max_fee_per_gas(max_fee)
            .max_priority_fee_per_gas(max_priority_fee)
            .chain_id(self.chain_id)
            .into();
        trace!(?nonce, gas = ?self.gas_limit, "built relay transaction");

        let signature = self
            .wallet
            .signer
            .sign_transaction(&tx)
            .await
            .map_err(|e| SubmissionError::Signature { inner: e.to_string() })?;
        let raw = tx.rlp_signed(&signature);

        let hash = self
            .with_deadline("eth_sendRawTransaction", self.chain.send_raw_transaction(raw))
            .await?;
        info!(tx_hash = ?hash, ?nonce, "relay transaction broadcast");
        Ok(hash)
    }

    async fn with_deadline<T>(
        &self,
        call: &'static str,
        fut: impl Future<Output = Result<T, SubmissionError>>,
    ) -> Result<T, SubmissionError> {
        match tokio::time::timeout(self.call_timeout, fut).await {
            Ok(res) => res,
            Err(_) => Err(SubmissionError::Timeout { call }),
        }
    }
}
