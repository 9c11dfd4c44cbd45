//! Reward accountant: the pro-rata, time-weighted accrual core.
//!
//! The accountant owns the emission schedule (`period_start`,
//! `period_finish`, `reward_rate`) and the global reward-per-unit
//! accumulator. Participants carry a [`RewardCheckpoint`]; settling a
//! checkpoint moves everything owed since the last settlement into
//! `accrued` and snaps `reward_per_unit_paid` to the stored accumulator.
//!
//! Callers must settle the accumulator with the pre-mutation `total_staked`
//! and then settle the affected checkpoint before changing any stake.

use serde::Serialize;
use tracing::{trace, warn};

use scav_core::error::{AccountingError, PoolError, ScavError};
use scav_core::types::{Amount, BlockNumber};

use crate::fixed::RewardPerUnit;

/// Per-participant accrual state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct RewardCheckpoint {
    /// Accumulator value at the last settlement.
    pub reward_per_unit_paid: RewardPerUnit,
    /// Settled but unclaimed reward.
    pub accrued: Amount,
}

/// Result of funding the schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct NotifyOutcome {
    /// New emission rate in reward units per block.
    pub reward_rate: Amount,
    /// Unspent emission of the previous rate folded into this one.
    pub rolled_over: Amount,
    pub period_start: BlockNumber,
    pub period_finish: BlockNumber,
}

/// Global accrual state of one pool.
///
/// # Invariants
///
/// * `period_start <= period_finish`
/// * `period_start <= last_update_time <= period_finish` once scheduled
/// * `reward_per_unit_stored` never decreases
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct RewardAccountant {
    reward_per_unit_stored: RewardPerUnit,
    last_update_time: BlockNumber,
    reward_rate: Amount,
    period_start: BlockNumber,
    period_finish: BlockNumber,
    rewards_duration: u64,
}

impl RewardAccountant {
    /// An unscheduled accountant: no emission until
    /// [`schedule`](Self::schedule) and [`notify`](Self::notify).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reward_per_unit_stored(&self) -> RewardPerUnit {
        self.reward_per_unit_stored
    }

    pub fn last_update_time(&self) -> BlockNumber {
        self.last_update_time
    }

    pub fn reward_rate(&self) -> Amount {
        self.reward_rate
    }

    pub fn period_start(&self) -> BlockNumber {
        self.period_start
    }

    pub fn period_finish(&self) -> BlockNumber {
        self.period_finish
    }

    pub fn rewards_duration(&self) -> u64 {
        self.rewards_duration
    }

    /// Whether a schedule has ever been set.
    pub fn is_scheduled(&self) -> bool {
        self.period_finish > 0
    }

    /// Whether a funded period is still emitting (or about to).
    pub fn is_active(&self, now: BlockNumber) -> bool {
        self.reward_rate > 0 && now < self.period_finish
    }

    /// Whether the scheduled period has run out.
    pub fn has_ended(&self, now: BlockNumber) -> bool {
        self.is_scheduled() && now >= self.period_finish
    }

    /// `now` clamped into `[period_start, period_finish]`: accrual never
    /// counts time outside the scheduled period.
    pub fn last_applicable_time(&self, now: BlockNumber) -> BlockNumber {
        now.max(self.period_start).min(self.period_finish)
    }

    /// Total emission of the current schedule at the current rate.
    pub fn reward_for_duration(&self) -> Result<Amount, AccountingError> {
        let duration = (self.period_finish - self.period_start) as u128;
        self.reward_rate
            .checked_mul(duration)
            .ok_or(AccountingError::ArithmeticOverflow)
    }

    /// The accumulator as it would read after settling at `now`, without
    /// mutating anything.
    pub fn reward_per_unit(
        &self,
        now: BlockNumber,
        total_staked: Amount,
    ) -> Result<RewardPerUnit, AccountingError> {
        let elapsed = self
            .last_applicable_time(now)
            .saturating_sub(self.last_update_time);
        let delta = RewardPerUnit::accrual(elapsed, self.reward_rate, total_staked)?;
        self.reward_per_unit_stored.checked_add(delta)
    }

    /// Advance the accumulator to `now`.
    ///
    /// `last_update_time` moves even when nothing is staked, so emission
    /// during an empty stretch is forfeited rather than back-paid.
    pub fn settle(
        &mut self,
        now: BlockNumber,
        total_staked: Amount,
    ) -> Result<RewardPerUnit, AccountingError> {
        let stored = self.reward_per_unit(now, total_staked)?;
        let applicable = self.last_applicable_time(now);
        trace!(
            now,
            applicable,
            total_staked,
            reward_per_unit = %stored,
            "settled reward accumulator"
        );
        self.reward_per_unit_stored = stored;
        self.last_update_time = applicable;
        Ok(stored)
    }

    /// Move everything `staked` units earned since the checkpoint into
    /// `accrued`. Returns the amount added.
    ///
    /// Uses the stored accumulator: call [`settle`](Self::settle) first.
    pub fn settle_account(
        &self,
        checkpoint: &mut RewardCheckpoint,
        staked: Amount,
    ) -> Result<Amount, AccountingError> {
        let owed = self
            .reward_per_unit_stored
            .checked_sub(checkpoint.reward_per_unit_paid)?
            .owed(staked)?;
        checkpoint.accrued = checkpoint
            .accrued
            .checked_add(owed)
            .ok_or(AccountingError::ArithmeticOverflow)?;
        checkpoint.reward_per_unit_paid = self.reward_per_unit_stored;
        Ok(owed)
    }

    /// Earned-but-unpaid reward of a checkpoint at `now`. Pure.
    pub fn earned(
        &self,
        now: BlockNumber,
        total_staked: Amount,
        checkpoint: &RewardCheckpoint,
        staked: Amount,
    ) -> Result<Amount, AccountingError> {
        let unsettled = self
            .reward_per_unit(now, total_staked)?
            .checked_sub(checkpoint.reward_per_unit_paid)?
            .owed(staked)?;
        checkpoint
            .accrued
            .checked_add(unsettled)
            .ok_or(AccountingError::ArithmeticOverflow)
    }

    /// Replace the schedule with `[start, start + duration)`.
    ///
    /// The new period is unfunded until [`notify`](Self::notify); the rate
    /// drops to zero so no emission leaks from the old schedule.
    ///
    /// # Errors
    ///
    /// - [`PoolError::ZeroDuration`] if `duration == 0`
    /// - [`PoolError::PeriodActive`] if a funded period is still running
    /// - [`AccountingError::ArithmeticOverflow`] if `start + duration` overflows
    pub fn schedule(
        &mut self,
        now: BlockNumber,
        start: BlockNumber,
        duration: u64,
        total_staked: Amount,
    ) -> Result<(), ScavError> {
        if duration == 0 {
            return Err(PoolError::ZeroDuration.into());
        }
        if self.is_active(now) {
            return Err(PoolError::PeriodActive {
                period_finish: self.period_finish,
            }
            .into());
        }
        let finish = start
            .checked_add(duration)
            .ok_or(AccountingError::ArithmeticOverflow)?;

        self.settle(now, total_staked)?;

        self.period_start = start;
        self.period_finish = finish;
        self.rewards_duration = duration;
        self.reward_rate = 0;
        self.last_update_time = self.last_applicable_time(now);
        Ok(())
    }

    /// Fund the schedule with `amount` reward units.
    ///
    /// - Unfunded period: the rate spreads `amount` over the full duration.
    /// - Funded period still running: the unspent remainder of the old rate
    ///   is added and the sum spread over what is left of the period.
    /// - Period over: a fresh period of the last duration starts at `now`.
    ///
    /// A rate that truncates to zero is accepted and logged.
    pub fn notify(
        &mut self,
        now: BlockNumber,
        amount: Amount,
        total_staked: Amount,
    ) -> Result<NotifyOutcome, ScavError> {
        if !self.is_scheduled() {
            return Err(PoolError::NoSchedule.into());
        }

        self.settle(now, total_staked)?;

        let mut rolled_over = 0;
        if self.has_ended(now) {
            self.period_start = now;
            self.period_finish = now
                .checked_add(self.rewards_duration)
                .ok_or(AccountingError::ArithmeticOverflow)?;
            self.last_update_time = now;
            self.reward_rate = amount / self.rewards_duration as u128;
        } else if self.reward_rate == 0 {
            self.reward_rate = amount / self.rewards_duration as u128;
        } else {
            let remaining = (self.period_finish - now.max(self.period_start)) as u128;
            rolled_over = remaining
                .checked_mul(self.reward_rate)
                .ok_or(AccountingError::ArithmeticOverflow)?;
            let funded = amount
                .checked_add(rolled_over)
                .ok_or(AccountingError::ArithmeticOverflow)?;
            self.reward_rate = funded / remaining;
        }

        if self.reward_rate == 0 && amount > 0 {
            warn!(
                amount,
                duration = self.rewards_duration,
                "reward rate truncated to zero; period will emit nothing"
            );
        }

        Ok(NotifyOutcome {
            reward_rate: self.reward_rate,
            rolled_over,
            period_start: self.period_start,
            period_finish: self.period_finish,
        })
    }
}
