//! The relayer signing account, loaded from a configured private key.

use ethers::{
    signers::{LocalWallet, Signer},
    types::Address,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    /// The configured private key could not be parsed.
    #[error("invalid relayer private key: {inner}")]
    KeyParse { inner: String },
}

/// Wrapper around the relayer signing key. Owned exclusively by the
/// submission lane once the process is wired up.
#[derive(Clone, Debug)]
pub struct Wallet {
    /// Signing key of the wallet
    pub signer: LocalWallet,
}

impl Wallet {
    /// Builds a `Wallet` from a hex-encoded private key (with or without
    /// `0x` prefix) and binds the signer to the given chain id.
    pub fn from_private_key(key: &str, chain_id: u64) -> Result<Self, WalletError> {
        let signer = key
            .trim()
            .parse::<LocalWallet>()
            .map_err(|err| WalletError::KeyParse { inner: err.to_string() })?;
        Ok(Self { signer: signer.with_chain_id(chain_id) })
    }

    /// The relayer account address derived from the signing key.
    pub fn address(&self) -> Address {
        self.signer.address()
    }
}
