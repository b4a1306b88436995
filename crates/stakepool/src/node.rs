//! Node registration and enumeration.

use {
    crate::{
        StakePool,
        batching::try_join_batched,
        contract::{CallOpts, TransactOpts},
        units,
    },
    alloy::{
        dyn_abi::DynSolValue,
        primitives::{Address, U256},
        rpc::types::TransactionReceipt,
    },
    anyhow::{Context, Result},
};

const NODE_MANAGER: &str = "nodeManager";
const NODE_DEPOSIT: &str = "nodeDeposit";

/// Width of one enumeration batch when listing all node addresses.
const ADDRESS_BATCH_SIZE: usize = 50;

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDetails {
    pub exists: bool,
    pub trusted: bool,
    pub timezone_location: String,
}

/// All of a node's details, fetched concurrently and joining on the first
/// error.
pub async fn details(pool: &StakePool, node: Address, opts: &CallOpts) -> Result<NodeDetails> {
    let (exists, trusted, timezone_location) = futures::try_join!(
        exists(pool, node, opts),
        trusted(pool, node, opts),
        timezone_location(pool, node, opts),
    )?;
    Ok(NodeDetails {
        exists,
        trusted,
        timezone_location,
    })
}

/// Whether a node is registered.
pub async fn exists(pool: &StakePool, node: Address, opts: &CallOpts) -> Result<bool> {
    let manager = pool.contract(NODE_MANAGER).await?;
    manager
        .call(opts, "getNodeExists", &[DynSolValue::Address(node)])
        .await
        .with_context(|| format!("could not get node {node} exists status"))
}

/// Whether a node is trusted.
pub async fn trusted(pool: &StakePool, node: Address, opts: &CallOpts) -> Result<bool> {
    let manager = pool.contract(NODE_MANAGER).await?;
    manager
        .call(opts, "getNodeTrusted", &[DynSolValue::Address(node)])
        .await
        .with_context(|| format!("could not get node {node} trusted status"))
}

/// A node's timezone location.
pub async fn timezone_location(pool: &StakePool, node: Address, opts: &CallOpts) -> Result<String> {
    let manager = pool.contract(NODE_MANAGER).await?;
    manager
        .call(opts, "getNodeTimezoneLocation", &[DynSolValue::Address(node)])
        .await
        .with_context(|| format!("could not get node {node} timezone location"))
}

/// Registers the sender as a node.
pub async fn register(
    pool: &StakePool,
    timezone_location: &str,
    opts: &TransactOpts,
) -> Result<TransactionReceipt> {
    let manager = pool.contract(NODE_MANAGER).await?;
    manager
        .transact(
            opts,
            "registerNode",
            &[DynSolValue::String(timezone_location.to_string())],
        )
        .await
        .context("could not register node")
}

/// Updates the sender node's timezone location.
pub async fn set_timezone_location(
    pool: &StakePool,
    timezone_location: &str,
    opts: &TransactOpts,
) -> Result<TransactionReceipt> {
    let manager = pool.contract(NODE_MANAGER).await?;
    manager
        .transact(
            opts,
            "setTimezoneLocation",
            &[DynSolValue::String(timezone_location.to_string())],
        )
        .await
        .context("could not set node timezone location")
}

/// Makes a node deposit. `minimum_fee` is the minimum acceptable node fee
/// in ether.
pub async fn deposit(
    pool: &StakePool,
    minimum_fee: f64,
    opts: &TransactOpts,
) -> Result<TransactionReceipt> {
    let minimum_fee = units::ether(minimum_fee)?;
    let node_deposit = pool.contract(NODE_DEPOSIT).await?;
    node_deposit
        .transact(opts, "deposit", &[DynSolValue::Uint(minimum_fee, 256)])
        .await
        .context("could not make node deposit")
}

/// The number of registered nodes.
pub async fn count(pool: &StakePool, opts: &CallOpts) -> Result<u64> {
    let manager = pool.contract(NODE_MANAGER).await?;
    manager
        .call(opts, "getNodeCount", &[])
        .await
        .context("could not get node count")
}

/// The node address at a registry index.
pub async fn address_at(pool: &StakePool, index: u64, opts: &CallOpts) -> Result<Address> {
    let manager = pool.contract(NODE_MANAGER).await?;
    manager
        .call(opts, "getNodeAt", &[DynSolValue::Uint(U256::from(index), 256)])
        .await
        .with_context(|| format!("could not get node {index} address"))
}

/// All registered node addresses, in registry order, loaded in batches of
/// [`ADDRESS_BATCH_SIZE`].
pub async fn addresses(pool: &StakePool, opts: &CallOpts) -> Result<Vec<Address>> {
    let count = count(pool, opts).await?;
    try_join_batched(count, ADDRESS_BATCH_SIZE, |index| {
        address_at(pool, index, opts)
    })
    .await
}
