//! Typed client library over a staking-pool contract suite.
//!
//! Domain modules ([`deposit`], [`node`], [`settings`], [`tokens`]) expose
//! accessor and transaction-submission functions over the deployed
//! contracts. They all follow the same path: resolve the named contract
//! through the memoizing handle cache, invoke the wrapper's call or
//! transact primitive, and annotate any failure with the attempted
//! operation.

pub mod batching;
pub mod contract;
pub mod deposit;
pub mod error;
pub mod node;
pub mod registry;
pub mod settings;
pub mod tokens;
pub mod units;
pub mod values;

pub use crate::{
    contract::{CallOpts, Contract, GasConfig, TransactOpts},
    error::{Error, ResolveError},
    registry::{ContractResolving, Deployment, Deployments},
};
use {ethrpc::AlloyProvider, registry::Contracts, std::sync::Arc};

/// The top-level handle: a provider plus the contract registry. Cheap to
/// share; all state is behind [`Arc`]s.
pub struct StakePool {
    provider: AlloyProvider,
    contracts: Contracts,
}

impl StakePool {
    /// Creates a client with the default gas configuration. The provider
    /// must be able to sign transactions (see
    /// [`ethrpc::provider_with_signer`]) for any state-changing operation.
    pub fn new(provider: AlloyProvider, resolver: Arc<dyn ContractResolving>) -> Self {
        Self::with_gas_config(provider, resolver, GasConfig::default())
    }

    pub fn with_gas_config(
        provider: AlloyProvider,
        resolver: Arc<dyn ContractResolving>,
        gas: GasConfig,
    ) -> Self {
        Self {
            contracts: Contracts::with_gas_config(provider.clone(), resolver, gas),
            provider,
        }
    }

    pub fn provider(&self) -> &AlloyProvider {
        &self.provider
    }

    /// Resolves a named contract, reusing the cached handle after the
    /// first use.
    pub async fn contract(&self, name: &str) -> Result<Arc<Contract>, ResolveError> {
        self.contracts.get(name).await
    }
}
