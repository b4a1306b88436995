//! Deposit pool balances and deposit assignment.

use {
    crate::{StakePool, contract::{CallOpts, TransactOpts}},
    alloy::{primitives::U256, rpc::types::TransactionReceipt},
    anyhow::{Context, Result},
};

const DEPOSIT_POOL: &str = "depositPool";

/// The current deposit pool balance.
pub async fn balance(pool: &StakePool, opts: &CallOpts) -> Result<U256> {
    let deposit_pool = pool.contract(DEPOSIT_POOL).await?;
    deposit_pool
        .call(opts, "getBalance", &[])
        .await
        .context("could not get deposit pool balance")
}

/// Deposit pool balance in excess of the assignment queue's capacity.
pub async fn excess_balance(pool: &StakePool, opts: &CallOpts) -> Result<U256> {
    let deposit_pool = pool.contract(DEPOSIT_POOL).await?;
    deposit_pool
        .call(opts, "getExcessBalance", &[])
        .await
        .context("could not get deposit pool excess balance")
}

/// Assigns queued deposits.
pub async fn assign_deposits(pool: &StakePool, opts: &TransactOpts) -> Result<TransactionReceipt> {
    let deposit_pool = pool.contract(DEPOSIT_POOL).await?;
    deposit_pool
        .transact(opts, "assignDeposits", &[])
        .await
        .context("could not assign deposits")
}
