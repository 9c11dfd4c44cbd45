//! Trait interfaces between the pool engine and its collaborators.
//!
//! - [`Clock`]: the execution environment's block counter
//! - [`TokenLedger`]: fungible token balances and atomic transfer batches
//! - [`AttributeStore`]: per-item string metadata (read for `Level`)
//! - [`StakingRegistry`]: which non-fungible items are staked, and by whom
//! - [`EligibilityOracle`]: the stake-time gate built on the two above
//! - [`Authority`]: who may call administrative operations

use crate::error::{ExternalError, TokenError};
use crate::types::{AccountId, Amount, AssetId, BlockNumber, ItemId, StakingInfo, Transfer};

/// Monotonically non-decreasing discrete time source.
pub trait Clock: Send + Sync {
    /// Current block number.
    fn now(&self) -> BlockNumber;
}

/// Fungible token balances.
///
/// Implementations must apply a batch atomically: either every leg lands or
/// none does.
pub trait TokenLedger: Send + Sync {
    /// Balance of `account` in `asset`. Unknown accounts hold zero.
    fn balance_of(&self, asset: &AssetId, account: &AccountId) -> Amount;

    /// Apply every transfer in order, or none of them.
    ///
    /// # Errors
    ///
    /// - [`TokenError::InsufficientBalance`] if any sender runs short at its leg
    /// - [`TokenError::BalanceOverflow`] if any receiver would overflow
    fn transfer_batch(&self, transfers: &[Transfer]) -> Result<(), TokenError>;

    /// Apply a single transfer.
    ///
    /// Default implementation delegates to [`transfer_batch`](Self::transfer_batch).
    fn transfer(&self, transfer: Transfer) -> Result<(), TokenError> {
        self.transfer_batch(std::slice::from_ref(&transfer))
    }
}

/// Arbitrary string-keyed metadata attached to non-fungible items.
pub trait AttributeStore: Send + Sync {
    /// Value stored under `key` for `item`, or `None` if unset.
    fn get_attribute(&self, item: ItemId, key: &str) -> Result<Option<String>, ExternalError>;
}

/// Registry of non-fungible items staked outside the pool.
pub trait StakingRegistry: Send + Sync {
    /// Staking record for `item`. `exists == false` when it is not staked.
    fn staking_info(&self, item: ItemId) -> Result<StakingInfo, ExternalError>;

    /// Items currently staked by `owner`.
    fn staked_items(&self, owner: &AccountId) -> Result<Vec<ItemId>, ExternalError>;
}

/// Stake-time admission check against external state.
pub trait EligibilityOracle: Send + Sync {
    /// Whether `account` currently qualifies for a pool gated at `minimum_level`.
    fn is_eligible(&self, account: &AccountId, minimum_level: u32) -> Result<bool, ExternalError>;
}

/// Authorization capability for administrative operations.
pub trait Authority: Send + Sync {
    /// Whether `caller` may configure emission and pause the pool.
    fn is_authorized(&self, caller: &AccountId) -> bool;
}
