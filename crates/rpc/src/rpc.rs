use eyre::eyre;
use jsonrpsee::server::{ServerBuilder, ServerHandle};
use jsonrpsee::RpcModule;
use std::net::SocketAddr;
use tracing::info;

/// JSON-RPC server over HTTP.
pub struct JsonRpcServer {
    listen_address: SocketAddr,
    methods: RpcModule<()>,
}

impl JsonRpcServer {
    pub fn new(listen_address: SocketAddr) -> Self {
        Self { listen_address, methods: RpcModule::new(()) }
    }

    /// Merges an API implementation's methods into the server.
    pub fn add_methods(
        &mut self,
        methods: impl Into<jsonrpsee::Methods>,
    ) -> eyre::Result<&mut Self> {
        self.methods
            .merge(methods)
            .map_err(|e| eyre!("failed to register rpc methods: {e}"))?;
        Ok(self)
    }

    pub async fn start(&self) -> eyre::Result<ServerHandle> {
        let server = ServerBuilder::default().build(self.listen_address).await?;
        info!(address = %self.listen_address, "json-rpc server listening");
        Ok(server.start(self.methods.clone()))
    }
}
