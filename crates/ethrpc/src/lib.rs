//! Construction of the JSON-RPC providers the binding library talks through.
//!
//! All callers work with an erased [`AlloyProvider`] so the concrete
//! transport and filler stack stays an implementation detail of this crate.

use alloy::{
    network::{EthereumWallet, TxSigner},
    primitives::Signature,
    providers::{Provider, ProviderBuilder},
    rpc::client::ClientBuilder,
};

pub type AlloyProvider = alloy::providers::DynProvider;

/// Creates a read-only provider for the given node URL.
pub fn provider(url: &str) -> anyhow::Result<AlloyProvider> {
    let rpc = ClientBuilder::default().http(url.parse()?);
    Ok(ProviderBuilder::new().connect_client(rpc).erased())
}

/// Creates a provider that signs outgoing transactions with the given
/// signer. Required for any state-changing operation unless the node
/// manages the sender account itself.
pub fn provider_with_signer(
    url: &str,
    signer: Box<dyn TxSigner<Signature> + Send + Sync + 'static>,
) -> anyhow::Result<AlloyProvider> {
    let rpc = ClientBuilder::default().http(url.parse()?);
    let wallet = EthereumWallet::new(signer);
    Ok(ProviderBuilder::new()
        .wallet(wallet)
        .connect_client(rpc)
        .erased())
}

/// A provider that answers with pre-recorded responses. Useful for tests
/// that need a provider but never touch the network.
#[cfg(any(test, feature = "test-util"))]
pub fn dummy_provider() -> AlloyProvider {
    let asserter = alloy::providers::mock::Asserter::new();
    ProviderBuilder::new()
        .connect_mocked_client(asserter)
        .erased()
}
