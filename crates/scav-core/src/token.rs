//! In-memory fungible token ledger.
//!
//! [`MemoryTokenLedger`] backs tests and the simulator. It applies transfer
//! batches atomically by staging every touched balance before committing,
//! and supports freezing accounts so callers can exercise failed payouts.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

use crate::error::TokenError;
use crate::traits::TokenLedger;
use crate::types::{AccountId, Amount, AssetId, Transfer};

type BalanceKey = (AssetId, AccountId);

#[derive(Debug, Default)]
struct LedgerState {
    balances: HashMap<BalanceKey, Amount>,
    frozen: HashSet<AccountId>,
}

/// Thread-safe in-memory token balances keyed by `(asset, account)`.
#[derive(Debug, Default)]
pub struct MemoryTokenLedger {
    state: RwLock<LedgerState>,
}

impl MemoryTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` of `asset` to `account` out of thin air.
    pub fn mint(&self, asset: &AssetId, account: AccountId, amount: Amount) -> Result<(), TokenError> {
        let mut state = self.state.write();
        let entry = state
            .balances
            .entry((asset.clone(), account))
            .or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or_else(|| TokenError::BalanceOverflow {
                asset: asset.clone(),
                account,
            })?;
        Ok(())
    }

    /// Freeze or unfreeze `account`. Frozen accounts can neither send nor receive.
    pub fn set_frozen(&self, account: AccountId, frozen: bool) {
        let mut state = self.state.write();
        if frozen {
            state.frozen.insert(account);
        } else {
            state.frozen.remove(&account);
        }
    }

    /// Sum of all balances held in `asset`.
    pub fn total_supply(&self, asset: &AssetId) -> Amount {
        self.state
            .read()
            .balances
            .iter()
            .filter(|((a, _), _)| a == asset)
            .map(|(_, v)| *v)
            .sum()
    }
}

impl TokenLedger for MemoryTokenLedger {
    fn balance_of(&self, asset: &AssetId, account: &AccountId) -> Amount {
        self.state
            .read()
            .balances
            .get(&(asset.clone(), *account))
            .copied()
            .unwrap_or(0)
    }

    fn transfer_batch(&self, transfers: &[Transfer]) -> Result<(), TokenError> {
        let mut state = self.state.write();

        // Stage every touched balance, apply legs in order, commit only if all pass.
        let mut staged: HashMap<BalanceKey, Amount> = HashMap::new();
        for t in transfers {
            for account in [t.from, t.to] {
                if state.frozen.contains(&account) {
                    return Err(TokenError::AccountFrozen(account));
                }
            }

            let from_key = (t.asset.clone(), t.from);
            let have = staged
                .get(&from_key)
                .copied()
                .unwrap_or_else(|| state.balances.get(&from_key).copied().unwrap_or(0));
            let remaining = have
                .checked_sub(t.amount)
                .ok_or_else(|| TokenError::InsufficientBalance {
                    asset: t.asset.clone(),
                    account: t.from,
                    have,
                    need: t.amount,
                })?;
            staged.insert(from_key, remaining);

            let to_key = (t.asset.clone(), t.to);
            let current = staged
                .get(&to_key)
                .copied()
                .unwrap_or_else(|| state.balances.get(&to_key).copied().unwrap_or(0));
            let credited = current
                .checked_add(t.amount)
                .ok_or_else(|| TokenError::BalanceOverflow {
                    asset: t.asset.clone(),
                    account: t.to,
                })?;
            staged.insert(to_key, credited);
        }

        state.balances.extend(staged);
        Ok(())
    }
}
