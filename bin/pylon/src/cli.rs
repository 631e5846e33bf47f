use clap::Parser;
use ethers::types::{Address, U256};
use eyre::{bail, WrapErr};
use pylon_contracts::EntryPoint;
use pylon_pool::{PendingLedger, Pipeline};
use pylon_primitives::{
    constants::gas::{DEFAULT_HANDLE_OPS_GAS, MIN_HANDLE_OPS_GAS},
    provider::create_http_provider,
    Wallet,
};
use pylon_relayer::{EthereumRpc, Relayer, SubmissionLane};
use pylon_rpc::{JsonRpcServer, RelayApiServer, RelayApiServerImpl};
use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "pylon", about = "User operation relay")]
pub struct Args {
    /// Execution client HTTP endpoint
    #[arg(long, env = "RPC_URL", default_value = "http://127.0.0.1:8545")]
    pub eth_client_address: String,

    /// Relayer account private key, hex
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,

    /// Entry point contract address
    #[arg(long, env = "ENTRY_POINT")]
    pub entry_point: Address,

    /// Gas refund recipient; defaults to the relayer account
    #[arg(long)]
    pub beneficiary: Option<Address>,

    /// Fixed gas ceiling for every handleOps transaction
    #[arg(long, default_value_t = DEFAULT_HANDLE_OPS_GAS)]
    pub gas_limit: u64,

    /// Per-call deadline for execution client round trips, milliseconds
    #[arg(long, default_value_t = 10_000)]
    pub call_timeout_ms: u64,

    /// Pending ledger sqlite path; in-memory when omitted
    #[arg(long, env = "LEDGER_PATH")]
    pub ledger_path: Option<PathBuf>,

    /// JSON-RPC listen address
    #[arg(long, default_value = "127.0.0.1:3000")]
    pub listen_address: SocketAddr,

    /// Submission queue depth
    #[arg(long, default_value_t = 64)]
    pub lane_capacity: usize,
}

pub async fn run(args: Args) -> eyre::Result<()> {
    if args.gas_limit < MIN_HANDLE_OPS_GAS {
        bail!(
            "gas limit {} is below the {} floor needed for a handleOps call",
            args.gas_limit,
            MIN_HANDLE_OPS_GAS
        );
    }

    let (provider, chain_id) = create_http_provider(&args.eth_client_address)
        .await
        .wrap_err("failed to connect to the execution client")?;
    info!(chain_id = %chain_id, endpoint = %args.eth_client_address, "connected");

    let wallet = Wallet::from_private_key(&args.private_key, chain_id.as_u64())?;
    info!(relayer = ?wallet.address(), entry_point = ?args.entry_point, "relay account loaded");

    let ledger = match &args.ledger_path {
        Some(path) => PendingLedger::sqlite(path)?,
        None => PendingLedger::in_memory(),
    };
    let recovered = ledger.all()?;
    if !recovered.is_empty() {
        warn!(count = recovered.len(), "pending operations recovered from a previous run");
    }

    let relayer = Relayer::new(
        wallet,
        args.beneficiary,
        EntryPoint::new(args.entry_point),
        chain_id.as_u64().into(),
        U256::from(args.gas_limit),
        Duration::from_millis(args.call_timeout_ms),
        Arc::new(EthereumRpc(provider)),
    );
    let (lane_handle, lane) = SubmissionLane::new(relayer, args.lane_capacity);
    lane.spawn();

    let pipeline = Pipeline::new(ledger, lane_handle);

    let mut server = JsonRpcServer::new(args.listen_address);
    server.add_methods(
        RelayApiServerImpl::new(chain_id.as_u64().into(), pipeline).into_rpc(),
    )?;
    let _handle = server.start().await?;

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    Ok(())
}
