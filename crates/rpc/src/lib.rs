//! JSON-RPC front door. Exposes the `eth` namespace methods callers use
//! to submit user operations and inspect the pending ledger.

mod error;
mod relay;
mod relay_api;
mod rpc;

pub use error::JsonRpcError;
pub use relay::RelayApiServerImpl;
pub use relay_api::{RelayApiServer, SendUserOperationResponse};
pub use rpc::JsonRpcServer;
