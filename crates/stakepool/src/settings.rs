//! Protocol deposit settings.

use {
    crate::{StakePool, contract::CallOpts},
    alloy::primitives::U256,
    anyhow::{Context, Result},
};

const DEPOSIT_SETTINGS: &str = "depositSettings";

/// Whether deposits are currently enabled.
pub async fn deposit_enabled(pool: &StakePool, opts: &CallOpts) -> Result<bool> {
    let settings = pool.contract(DEPOSIT_SETTINGS).await?;
    settings
        .call(opts, "getDepositEnabled", &[])
        .await
        .context("could not get deposit enabled status")
}

/// Whether deposit assignments are currently enabled.
pub async fn assign_deposits_enabled(pool: &StakePool, opts: &CallOpts) -> Result<bool> {
    let settings = pool.contract(DEPOSIT_SETTINGS).await?;
    settings
        .call(opts, "getAssignDepositsEnabled", &[])
        .await
        .context("could not get deposit assignments enabled status")
}

/// The minimum deposit size.
pub async fn minimum_deposit(pool: &StakePool, opts: &CallOpts) -> Result<U256> {
    let settings = pool.contract(DEPOSIT_SETTINGS).await?;
    settings
        .call(opts, "getMinimumDeposit", &[])
        .await
        .context("could not get minimum deposit")
}

/// The maximum size of the deposit pool.
pub async fn maximum_deposit_pool_size(pool: &StakePool, opts: &CallOpts) -> Result<U256> {
    let settings = pool.contract(DEPOSIT_SETTINGS).await?;
    settings
        .call(opts, "getMaximumDepositPoolSize", &[])
        .await
        .context("could not get maximum deposit pool size")
}

/// The maximum number of deposit assignments per transaction.
pub async fn maximum_deposit_assignments(pool: &StakePool, opts: &CallOpts) -> Result<u64> {
    let settings = pool.contract(DEPOSIT_SETTINGS).await?;
    settings
        .call(opts, "getMaximumDepositAssignments", &[])
        .await
        .context("could not get maximum deposit assignments")
}
