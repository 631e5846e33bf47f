use crate::{
    error::JsonRpcError,
    relay_api::{RelayApiServer, SendUserOperationResponse},
};
use async_trait::async_trait;
use ethers::types::U64;
use jsonrpsee::core::RpcResult;
use pylon_pool::{PendingRecord, Pipeline, PipelineError};
use pylon_primitives::UserOperationRequest;
use tracing::debug;

/// `eth` namespace handler backed by the submission pipeline.
pub struct RelayApiServerImpl {
    chain_id: U64,
    pipeline: Pipeline,
}

impl RelayApiServerImpl {
    pub fn new(chain_id: U64, pipeline: Pipeline) -> Self {
        Self { chain_id, pipeline }
    }
}

#[async_trait]
impl RelayApiServer for RelayApiServerImpl {
    async fn chain_id(&self) -> RpcResult<U64> {
        Ok(self.chain_id)
    }

    async fn send_user_operation(
        &self,
        user_operation: UserOperationRequest,
    ) -> RpcResult<SendUserOperationResponse> {
        debug!(sender = %user_operation.sender, "eth_sendUserOperation");
        let transaction_hash = self
            .pipeline
            .handle(&user_operation)
            .await
            .map_err(|err| JsonRpcError::from(err).0)?;
        Ok(SendUserOperationResponse { transaction_hash })
    }

    async fn pending_user_operations(&self) -> RpcResult<Vec<PendingRecord>> {
        self.pipeline
            .ledger()
            .all()
            .map_err(|err| JsonRpcError::from(PipelineError::from(err)).0)
    }
}
