//! Per-participant stake balances and variant admission rules.
//!
//! [`StakeLedger`] keeps `total_staked == Σ staked` by routing every balance
//! change through [`credit`](StakeLedger::credit) and
//! [`debit`](StakeLedger::debit). Admission checks are separate so the
//! controller can reject an operation before touching anything.

use std::collections::BTreeMap;

use serde::Serialize;

use scav_core::error::{AccountingError, PoolError, ScavError};
use scav_core::types::{AccountId, Amount, BlockNumber, PoolVariant};
use scav_rewards::RewardCheckpoint;

/// One participant's position. Created lazily on first touch; never removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ParticipantAccount {
    pub staked: Amount,
    pub checkpoint: RewardCheckpoint,
    /// Block from which a time-locked stake is free. Zero when never locked.
    pub lock_expiry: BlockNumber,
}

/// Lock state of a time-locked position at a given block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LockState {
    Free,
    Locked { expiry: BlockNumber },
}

/// Undo data for an operation that touches a single position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedgerSavepoint {
    account: AccountId,
    position: Option<ParticipantAccount>,
    total_staked: Amount,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StakeLedger {
    variant: PoolVariant,
    lock_duration: u64,
    accounts: BTreeMap<AccountId, ParticipantAccount>,
    total_staked: Amount,
}

impl StakeLedger {
    pub fn new(variant: PoolVariant, lock_duration: u64) -> Self {
        Self {
            variant,
            lock_duration,
            accounts: BTreeMap::new(),
            total_staked: 0,
        }
    }

    pub fn variant(&self) -> PoolVariant {
        self.variant
    }

    pub fn lock_duration(&self) -> u64 {
        self.lock_duration
    }

    pub fn total_staked(&self) -> Amount {
        self.total_staked
    }

    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.accounts.get(account).map_or(0, |a| a.staked)
    }

    /// Snapshot of `account`, or an empty position if it never staked.
    pub fn account(&self, account: &AccountId) -> ParticipantAccount {
        self.accounts.get(account).copied().unwrap_or_default()
    }

    /// Mutable position of `account`, if it ever staked.
    pub fn get_mut(&mut self, account: &AccountId) -> Option<&mut ParticipantAccount> {
        self.accounts.get_mut(account)
    }

    /// Position of `account`, opened empty if it has none.
    pub fn open(&mut self, account: AccountId) -> &mut ParticipantAccount {
        self.accounts.entry(account).or_default()
    }

    /// Record `account`'s position and the pool total before mutating them.
    pub fn savepoint(&self, account: &AccountId) -> LedgerSavepoint {
        LedgerSavepoint {
            account: *account,
            position: self.accounts.get(account).copied(),
            total_staked: self.total_staked,
        }
    }

    /// Restore the state captured by [`savepoint`](Self::savepoint).
    ///
    /// Only sound when nothing but the savepoint's account changed since.
    pub fn rollback(&mut self, savepoint: LedgerSavepoint) {
        match savepoint.position {
            Some(position) => {
                self.accounts.insert(savepoint.account, position);
            }
            None => {
                self.accounts.remove(&savepoint.account);
            }
        }
        self.total_staked = savepoint.total_staked;
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, &ParticipantAccount)> {
        self.accounts.iter()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Lock state of `account` at `now`.
    ///
    /// Only time-locked pools lock. A lock is lifted early once a scheduled
    /// reward period has ended.
    pub fn lock_state(
        &self,
        account: &AccountId,
        now: BlockNumber,
        period_finish: BlockNumber,
    ) -> LockState {
        if !self.variant.is_locking() {
            return LockState::Free;
        }
        let expiry = self.account(account).lock_expiry;
        let period_over = period_finish > 0 && now >= period_finish;
        if now < expiry && !period_over {
            LockState::Locked { expiry }
        } else {
            LockState::Free
        }
    }

    /// Blocks until `account`'s lock lifts on its own; zero when free.
    pub fn remaining_lock(
        &self,
        account: &AccountId,
        now: BlockNumber,
        period_finish: BlockNumber,
    ) -> u64 {
        match self.lock_state(account, now, period_finish) {
            LockState::Free => 0,
            LockState::Locked { expiry } => expiry - now,
        }
    }

    fn ensure_unlocked(
        &self,
        account: &AccountId,
        now: BlockNumber,
        period_finish: BlockNumber,
    ) -> Result<(), PoolError> {
        match self.lock_state(account, now, period_finish) {
            LockState::Free => Ok(()),
            LockState::Locked { expiry } => Err(PoolError::StillLocked { expiry, now }),
        }
    }

    /// Whether `account` may take `units` out at `now`.
    ///
    /// # Errors
    ///
    /// - [`PoolError::WithdrawalDisabled`] for consumable-entry pools
    /// - [`PoolError::StillLocked`] while a time lock holds
    /// - [`PoolError::InsufficientStake`] if `units` exceeds the balance
    pub fn check_withdraw(
        &self,
        account: &AccountId,
        units: Amount,
        now: BlockNumber,
        period_finish: BlockNumber,
    ) -> Result<(), PoolError> {
        if !self.variant.allows_withdrawal() {
            return Err(PoolError::WithdrawalDisabled);
        }
        self.ensure_unlocked(account, now, period_finish)?;
        let have = self.balance_of(account);
        if units > have {
            return Err(PoolError::InsufficientStake { have, need: units });
        }
        Ok(())
    }

    /// Whether `account` may claim rewards at `now`.
    ///
    /// # Errors
    ///
    /// [`PoolError::StillLocked`] while a time lock holds.
    pub fn check_claim(
        &self,
        account: &AccountId,
        now: BlockNumber,
        period_finish: BlockNumber,
    ) -> Result<(), PoolError> {
        self.ensure_unlocked(account, now, period_finish)
    }

    /// Add `units` to `account` and, for time-locked pools, push its lock
    /// out to at least `now + lock_duration`. Returns the new balance.
    pub fn credit(
        &mut self,
        account: AccountId,
        units: Amount,
        now: BlockNumber,
    ) -> Result<Amount, ScavError> {
        let total = self
            .total_staked
            .checked_add(units)
            .ok_or(AccountingError::ArithmeticOverflow)?;
        let lock_until = if self.variant.is_locking() {
            Some(
                now.checked_add(self.lock_duration)
                    .ok_or(AccountingError::ArithmeticOverflow)?,
            )
        } else {
            None
        };

        let position = self.open(account);
        position.staked = position
            .staked
            .checked_add(units)
            .ok_or(AccountingError::ArithmeticOverflow)?;
        if let Some(until) = lock_until {
            position.lock_expiry = position.lock_expiry.max(until);
        }
        let balance = position.staked;
        self.total_staked = total;
        Ok(balance)
    }

    /// Remove `units` from `account`. Returns the new balance.
    pub fn debit(&mut self, account: AccountId, units: Amount) -> Result<Amount, ScavError> {
        let have = self.balance_of(&account);
        let balance = have
            .checked_sub(units)
            .ok_or(PoolError::InsufficientStake { have, need: units })?;
        let total = self
            .total_staked
            .checked_sub(units)
            .ok_or(AccountingError::ArithmeticOverflow)?;
        if let Some(position) = self.accounts.get_mut(&account) {
            position.staked = balance;
        }
        self.total_staked = total;
        Ok(balance)
    }
}
