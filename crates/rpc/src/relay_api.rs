use ethers::types::{H256, U64};
use jsonrpsee::{core::RpcResult, proc_macros::rpc};
use pylon_pool::PendingRecord;
use pylon_primitives::UserOperationRequest;
use serde::{Deserialize, Serialize};

/// Result of an accepted submission: the hash of the broadcast relay
/// transaction.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendUserOperationResponse {
    pub transaction_hash: H256,
}

#[rpc(server, namespace = "eth")]
pub trait RelayApi {
    /// Chain id the relay is wired to.
    #[method(name = "chainId")]
    async fn chain_id(&self) -> RpcResult<U64>;

    /// Validates, records and relays one user operation. Returns once the
    /// node has acknowledged the broadcast.
    #[method(name = "sendUserOperation")]
    async fn send_user_operation(
        &self,
        user_operation: UserOperationRequest,
    ) -> RpcResult<SendUserOperationResponse>;

    /// Pending ledger contents: operations recorded but not yet cleared
    /// by a broadcast acknowledgment.
    #[method(name = "pendingUserOperations")]
    async fn pending_user_operations(&self) -> RpcResult<Vec<PendingRecord>>;
}
