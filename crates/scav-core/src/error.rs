//! Error types for Scavenge reward pools.
use thiserror::Error;

use crate::types::{AccountId, Amount, AssetId, BlockNumber};

/// Rejections raised by pool operations. Each aborts the whole operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("level limit: no staked item at level {minimum_level} or above")] NotEligible { minimum_level: u32 },
    #[error("stake locked until block {expiry} (now {now})")] StillLocked { expiry: BlockNumber, now: BlockNumber },
    #[error("withdrawal is disabled for consumable-entry pools")] WithdrawalDisabled,
    #[error("insufficient stake: have {have}, need {need}")] InsufficientStake { have: Amount, need: Amount },
    #[error("reward period still active until block {period_finish}")] PeriodActive { period_finish: BlockNumber },
    #[error("unauthorized caller: {0}")] Unauthorized(AccountId),
    #[error("pool is paused")] Paused,
    #[error("amount must be greater than zero")] ZeroAmount,
    #[error("reward duration must be greater than zero")] ZeroDuration,
    #[error("no reward schedule has been set")] NoSchedule,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountingError {
    #[error("arithmetic overflow")] ArithmeticOverflow,
    #[error("tax percent out of range: {0}")] InvalidTaxPercent(u8),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("insufficient {asset} balance for {account}: have {have}, need {need}")] InsufficientBalance { asset: AssetId, account: AccountId, have: Amount, need: Amount },
    #[error("{asset} balance overflow for {account}")] BalanceOverflow { asset: AssetId, account: AccountId },
    #[error("frozen account: {0}")] AccountFrozen(AccountId),
}

/// Failures reported by the attribute store or the staking registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExternalError {
    #[error("staking registry: {0}")] Registry(String),
    #[error("attribute store: {0}")] Attributes(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid account id: {0}")] InvalidAccountId(String),
    #[error("tax percent must be at most 100, got {0}")] InvalidTaxPercent(u8),
    #[error("consumable-entry pools need a burn sink")] MissingBurnSink,
    #[error("time-locked pools need a non-zero lock duration")] ZeroLockDuration,
    #[error("at least one admin account is required")] NoAdmins,
    #[error("stake and reward assets must differ: {0}")] SameAssets(AssetId),
    #[error("load: {0}")] Load(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScavError {
    #[error(transparent)] Pool(#[from] PoolError),
    #[error(transparent)] Accounting(#[from] AccountingError),
    #[error(transparent)] Token(#[from] TokenError),
    #[error(transparent)] External(#[from] ExternalError),
    #[error(transparent)] Config(#[from] ConfigError),
}
