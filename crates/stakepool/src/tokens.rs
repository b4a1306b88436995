//! Native and pool-token balances, and pool-token transfers.

use {
    crate::{
        StakePool,
        contract::{CallOpts, TransactOpts},
    },
    alloy::{
        dyn_abi::DynSolValue,
        primitives::{Address, U256},
        providers::Provider,
        rpc::types::TransactionReceipt,
    },
    anyhow::{Context, Result},
};

const POOL_TOKEN: &str = "poolToken";

/// An address's balances as of one block.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balances {
    pub eth: U256,
    pub token: U256,
}

/// The native and pool-token balances of an address, fetched concurrently
/// and joining on the first error. Both honor the options' block number.
pub async fn balances(pool: &StakePool, address: Address, opts: &CallOpts) -> Result<Balances> {
    let native = async {
        let mut query = pool.provider().get_balance(address);
        if let Some(block) = opts.block {
            query = query.block_id(block);
        }
        query
            .await
            .with_context(|| format!("could not get ETH balance of {address}"))
    };
    let (eth, token) = futures::try_join!(native, balance_of(pool, address, opts))?;
    Ok(Balances { eth, token })
}

/// The pool-token balance of an address.
pub async fn balance_of(pool: &StakePool, address: Address, opts: &CallOpts) -> Result<U256> {
    let token = pool.contract(POOL_TOKEN).await?;
    token
        .call(opts, "balanceOf", &[DynSolValue::Address(address)])
        .await
        .with_context(|| format!("could not get pool token balance of {address}"))
}

/// The pool token's total supply.
pub async fn total_supply(pool: &StakePool, opts: &CallOpts) -> Result<U256> {
    let token = pool.contract(POOL_TOKEN).await?;
    token
        .call(opts, "totalSupply", &[])
        .await
        .context("could not get pool token total supply")
}

/// Transfers pool tokens to an address.
pub async fn transfer(
    pool: &StakePool,
    to: Address,
    amount: U256,
    opts: &TransactOpts,
) -> Result<TransactionReceipt> {
    let token = pool.contract(POOL_TOKEN).await?;
    token
        .transact(
            opts,
            "transfer",
            &[DynSolValue::Address(to), DynSolValue::Uint(amount, 256)],
        )
        .await
        .with_context(|| format!("could not transfer pool tokens to {to}"))
}
