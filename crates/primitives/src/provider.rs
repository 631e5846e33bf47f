//! Utils for creating ethers providers

use ethers::{
    providers::{Http, Middleware, Provider},
    types::U256,
};
use std::time::Duration;

const DEV_CHAIN_ID: u64 = 1337;

/// Creates an ethers provider with HTTP connection, tuning the polling
/// interval down for local dev chains. The chain id learned while tuning
/// is returned so callers don't repeat the round trip.
pub async fn create_http_provider(addr: &str) -> eyre::Result<(Provider<Http>, U256)> {
    let provider = Provider::<Http>::try_from(addr)?;

    let chain_id = provider.get_chainid().await?;

    let interval = if chain_id.as_u64() == DEV_CHAIN_ID {
        Duration::from_millis(5u64)
    } else {
        Duration::from_millis(500u64)
    };
    Ok((provider.interval(interval), chain_id))
}
