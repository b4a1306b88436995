//! Resolution of contract names to bound contracts.
//!
//! The registry itself is an external collaborator behind
//! [`ContractResolving`]; this module adds the memoizing handle cache so a
//! contract is resolved once per process and shared by all callers.

use {
    crate::{
        contract::{Contract, GasConfig},
        error::ResolveError,
    },
    alloy::{json_abi::JsonAbi, primitives::Address},
    async_trait::async_trait,
    ethrpc::AlloyProvider,
    futures::{
        FutureExt,
        future::{BoxFuture, Shared},
    },
    std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    },
};

/// Address and interface descriptor of a deployed contract, as handed back
/// by the registry.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct Deployment {
    pub address: Address,
    pub abi: JsonAbi,
}

/// The name → deployment registry boundary.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait]
pub trait ContractResolving: Send + Sync {
    /// Looks up the deployment for a named contract. Failures propagate
    /// verbatim to the caller.
    async fn resolve(&self, name: &str) -> Result<Deployment, ResolveError>;
}

/// A registry backed by a static deployment manifest.
#[derive(Clone, Debug, Default)]
pub struct Deployments {
    entries: HashMap<String, Deployment>,
}

impl Deployments {
    pub fn new(entries: HashMap<String, Deployment>) -> Self {
        Self { entries }
    }

    /// Parses a manifest mapping contract names to `{address, abi}`.
    pub fn from_json(manifest: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(manifest)?))
    }
}

#[async_trait]
impl ContractResolving for Deployments {
    async fn resolve(&self, name: &str) -> Result<Deployment, ResolveError> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| ResolveError::new(name, "unknown contract name"))
    }
}

type SharedResolution = Shared<BoxFuture<'static, Result<Arc<Contract>, ResolveError>>>;

/// Memoizing handle cache. Concurrent requests for the same name share a
/// single in-flight registry lookup; different names resolve independently.
pub struct Contracts {
    provider: AlloyProvider,
    resolver: Arc<dyn ContractResolving>,
    gas: GasConfig,
    cache: Mutex<HashMap<String, SharedResolution>>,
}

impl Contracts {
    pub fn new(provider: AlloyProvider, resolver: Arc<dyn ContractResolving>) -> Self {
        Self::with_gas_config(provider, resolver, GasConfig::default())
    }

    pub fn with_gas_config(
        provider: AlloyProvider,
        resolver: Arc<dyn ContractResolving>,
        gas: GasConfig,
    ) -> Self {
        Self {
            provider,
            resolver,
            gas,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the bound contract for `name`, resolving it on first use.
    /// Successful handles are stable for the process lifetime; a failed
    /// resolution is dropped so the next request retries.
    pub async fn get(&self, name: &str) -> Result<Arc<Contract>, ResolveError> {
        let fetch = {
            let mut cache = self.cache.lock().unwrap();
            cache
                .entry(name.to_string())
                .or_insert_with(|| {
                    let resolver = self.resolver.clone();
                    let provider = self.provider.clone();
                    let gas = self.gas.clone();
                    let name = name.to_string();
                    async move {
                        let deployment = resolver.resolve(&name).await?;
                        tracing::debug!(%name, address = %deployment.address, "resolved contract");
                        Ok(Arc::new(Contract::new(
                            deployment.address,
                            deployment.abi,
                            provider,
                            gas,
                        )))
                    }
                    .boxed()
                    .shared()
                })
                .clone()
        };

        let contract = fetch.await;
        if contract.is_err() {
            let mut cache = self.cache.lock().unwrap();
            if let Some(Err(_)) = cache.get(name).and_then(|fetch| fetch.peek()) {
                cache.remove(name);
            }
        }

        contract
    }
}
