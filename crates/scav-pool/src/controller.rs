//! Pool controller: orchestrates accrual, stake bookkeeping and payouts.
//!
//! Every mutating operation runs under the pool lock in the same order:
//! validate admission, settle the global accumulator and the caller's
//! checkpoint, mutate the stake ledger, then hand the resulting token legs to
//! the [`TokenLedger`] as one batch. If the batch fails, the accountant and
//! the touched position are rolled back and the error is returned.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info};

use scav_core::error::{PoolError, ScavError};
use scav_core::traits::{Authority, Clock, EligibilityOracle, TokenLedger};
use scav_core::types::{AccountId, Amount, BlockNumber, PoolVariant, Transfer};
use scav_rewards::{Payout, PayoutSplitter, RewardAccountant, RewardPerUnit};

use crate::config::PoolConfig;
use crate::events::PoolEvent;
use crate::ledger::StakeLedger;

/// Mutable pool state guarded by the controller lock.
#[derive(Debug)]
struct PoolState {
    accountant: RewardAccountant,
    ledger: StakeLedger,
    paused: bool,
    events: Vec<PoolEvent>,
}

/// What an [`exit`](PoolController::exit) moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ExitOutcome {
    pub withdrawn: Amount,
    pub payout: Payout,
}

/// Read-only view of one participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AccountInfo {
    pub account: AccountId,
    pub staked: Amount,
    /// Settled plus unsettled reward at the time of the query.
    pub earned: Amount,
    /// Settled reward only.
    pub accrued: Amount,
    pub lock_expiry: BlockNumber,
    /// Blocks until the lock lifts; zero when withdrawable.
    pub remaining_lock: u64,
}

/// Full pool state at one block, for inspection and export.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PoolSnapshot {
    pub now: BlockNumber,
    pub variant: PoolVariant,
    pub paused: bool,
    pub total_staked: Amount,
    pub reward_rate: Amount,
    pub period_start: BlockNumber,
    pub period_finish: BlockNumber,
    pub rewards_duration: u64,
    pub last_update_time: BlockNumber,
    /// Decimal rendering of the 1e18-scaled accumulator.
    pub reward_per_unit_stored: String,
    pub reward_for_duration: Amount,
    pub accounts: Vec<AccountInfo>,
}

/// One reward pool and its collaborators.
pub struct PoolController {
    config: PoolConfig,
    splitter: PayoutSplitter,
    clock: Arc<dyn Clock>,
    tokens: Arc<dyn TokenLedger>,
    eligibility: Arc<dyn EligibilityOracle>,
    authority: Arc<dyn Authority>,
    state: Mutex<PoolState>,
}

impl PoolController {
    /// Build a pool from validated parameters. The pool starts unscheduled
    /// and unpaused.
    pub fn new(
        config: PoolConfig,
        clock: Arc<dyn Clock>,
        tokens: Arc<dyn TokenLedger>,
        eligibility: Arc<dyn EligibilityOracle>,
        authority: Arc<dyn Authority>,
    ) -> Result<Self, ScavError> {
        config.validate()?;
        let splitter = PayoutSplitter::new(config.tax_percent)?;
        let ledger = StakeLedger::new(config.variant, config.lock_duration);
        info!(
            variant = %config.variant,
            stake_asset = %config.stake_asset,
            reward_asset = %config.reward_asset,
            tax_percent = config.tax_percent,
            minimum_level = config.minimum_level,
            "pool created"
        );
        Ok(Self {
            config,
            splitter,
            clock,
            tokens,
            eligibility,
            authority,
            state: Mutex::new(PoolState {
                accountant: RewardAccountant::new(),
                ledger,
                paused: false,
                events: Vec::new(),
            }),
        })
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Participant operations
    // ------------------------------------------------------------------

    /// Deposit `units` of the stake asset. Returns the new balance.
    ///
    /// # Errors
    ///
    /// - [`PoolError::ZeroAmount`] if `units == 0`
    /// - [`PoolError::Paused`] while the pool is paused
    /// - [`PoolError::NotEligible`] if the caller fails the level gate
    /// - token errors if the caller cannot cover the deposit (and, for
    ///   consumable-entry pools, the matching burn)
    pub fn stake(&self, caller: &AccountId, units: Amount) -> Result<Amount, ScavError> {
        if units == 0 {
            return Err(PoolError::ZeroAmount.into());
        }
        let now = self.clock.now();
        let mut state = self.state.lock();
        if state.paused {
            return Err(PoolError::Paused.into());
        }
        self.ensure_eligible(caller)?;

        let balance = self.transact(&mut state, caller, |state| {
            state.ledger.open(*caller);
            settle(state, caller, now)?;
            let balance = state.ledger.credit(*caller, units, now)?;
            let mut legs = vec![Transfer::new(
                &self.config.stake_asset,
                *caller,
                self.config.pool_account,
                units,
            )];
            if let Some(sink) = self.burn_sink() {
                legs.push(Transfer::new(&self.config.stake_asset, *caller, sink, units));
            }
            Ok((legs, balance))
        })?;

        info!(account = %caller, amount = units, balance, now, "staked");
        emit(
            &mut state,
            PoolEvent::Staked {
                account: *caller,
                amount: units,
                balance,
            },
        );
        Ok(balance)
    }

    /// Take `units` of stake back out. Allowed while paused.
    ///
    /// # Errors
    ///
    /// - [`PoolError::ZeroAmount`] if `units == 0`
    /// - [`PoolError::WithdrawalDisabled`] for consumable-entry pools
    /// - [`PoolError::StillLocked`] while a time lock holds
    /// - [`PoolError::InsufficientStake`] if `units` exceeds the balance
    pub fn withdraw(&self, caller: &AccountId, units: Amount) -> Result<Amount, ScavError> {
        if units == 0 {
            return Err(PoolError::ZeroAmount.into());
        }
        let now = self.clock.now();
        let mut state = self.state.lock();
        let period_finish = state.accountant.period_finish();
        state
            .ledger
            .check_withdraw(caller, units, now, period_finish)?;

        let balance = self.transact(&mut state, caller, |state| {
            settle(state, caller, now)?;
            let balance = state.ledger.debit(*caller, units)?;
            let legs = vec![Transfer::new(
                &self.config.stake_asset,
                self.config.pool_account,
                *caller,
                units,
            )];
            Ok((legs, balance))
        })?;

        info!(account = %caller, amount = units, balance, now, "withdrawn");
        emit(
            &mut state,
            PoolEvent::Withdrawn {
                account: *caller,
                amount: units,
            },
        );
        Ok(balance)
    }

    /// Pay out everything the caller has earned, minus tax.
    ///
    /// Nothing earned is a successful no-op: no transfer and no event.
    ///
    /// # Errors
    ///
    /// - [`PoolError::StillLocked`] while a time lock holds
    /// - token errors if custody cannot cover the payout
    pub fn get_reward(&self, caller: &AccountId) -> Result<Payout, ScavError> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        let period_finish = state.accountant.period_finish();
        state.ledger.check_claim(caller, now, period_finish)?;

        let payout = self.transact(&mut state, caller, |state| {
            settle(state, caller, now)?;
            let payout = self.take_reward(state, caller);
            Ok((self.reward_legs(caller, &payout), payout))
        })?;

        self.record_payout(&mut state, caller, &payout);
        Ok(payout)
    }

    /// Withdraw the whole stake and claim, as one operation.
    ///
    /// # Errors
    ///
    /// - [`PoolError::WithdrawalDisabled`] for consumable-entry pools, even
    ///   with nothing staked
    /// - [`PoolError::StillLocked`] while a time lock holds
    /// - token errors from either leg; neither lands if one fails
    pub fn exit(&self, caller: &AccountId) -> Result<ExitOutcome, ScavError> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        let period_finish = state.accountant.period_finish();
        let staked = state.ledger.balance_of(caller);
        state
            .ledger
            .check_withdraw(caller, staked, now, period_finish)?;
        state.ledger.check_claim(caller, now, period_finish)?;

        let payout = self.transact(&mut state, caller, |state| {
            settle(state, caller, now)?;
            let mut legs = Vec::new();
            if staked > 0 {
                state.ledger.debit(*caller, staked)?;
                legs.push(Transfer::new(
                    &self.config.stake_asset,
                    self.config.pool_account,
                    *caller,
                    staked,
                ));
            }
            let payout = self.take_reward(state, caller);
            legs.extend(self.reward_legs(caller, &payout));
            Ok((legs, payout))
        })?;

        if staked > 0 {
            info!(account = %caller, amount = staked, balance = 0u128, now, "withdrawn");
            emit(
                &mut state,
                PoolEvent::Withdrawn {
                    account: *caller,
                    amount: staked,
                },
            );
        }
        self.record_payout(&mut state, caller, &payout);
        Ok(ExitOutcome {
            withdrawn: staked,
            payout,
        })
    }

    // ------------------------------------------------------------------
    // Administrative operations
    // ------------------------------------------------------------------

    /// Schedule the reward period `[start, start + duration)`.
    ///
    /// The period is unfunded until [`notify_reward_amount`](Self::notify_reward_amount).
    ///
    /// # Errors
    ///
    /// - [`PoolError::Unauthorized`] for non-admin callers
    /// - [`PoolError::ZeroDuration`] if `duration == 0`
    /// - [`PoolError::PeriodActive`] while a funded period is running
    pub fn set_rewards_duration(
        &self,
        caller: &AccountId,
        start: BlockNumber,
        duration: u64,
    ) -> Result<(), ScavError> {
        self.authorize(caller)?;
        let now = self.clock.now();
        let mut state = self.state.lock();
        let mut accountant = state.accountant;
        accountant.schedule(now, start, duration, state.ledger.total_staked())?;
        state.accountant = accountant;

        info!(
            start,
            duration,
            period_finish = accountant.period_finish(),
            now,
            "reward period scheduled"
        );
        emit(&mut state, PoolEvent::RewardsDurationUpdated { start, duration });
        Ok(())
    }

    /// Fund the scheduled period with `amount` reward units. Returns the new
    /// emission rate.
    ///
    /// Funds are not pulled: custody must already hold them.
    ///
    /// # Errors
    ///
    /// - [`PoolError::Unauthorized`] for non-admin callers
    /// - [`PoolError::NoSchedule`] before the first
    ///   [`set_rewards_duration`](Self::set_rewards_duration)
    pub fn notify_reward_amount(
        &self,
        caller: &AccountId,
        amount: Amount,
    ) -> Result<Amount, ScavError> {
        self.authorize(caller)?;
        let now = self.clock.now();
        let mut state = self.state.lock();
        let mut accountant = state.accountant;
        let outcome = accountant.notify(now, amount, state.ledger.total_staked())?;
        state.accountant = accountant;

        info!(
            amount,
            reward_rate = outcome.reward_rate,
            rolled_over = outcome.rolled_over,
            period_start = outcome.period_start,
            period_finish = outcome.period_finish,
            now,
            "reward added"
        );
        emit(
            &mut state,
            PoolEvent::RewardAdded {
                amount,
                reward_rate: outcome.reward_rate,
            },
        );
        Ok(outcome.reward_rate)
    }

    /// Block new stakes. Returns `false` if the pool was already paused.
    pub fn pause(&self, caller: &AccountId) -> Result<bool, ScavError> {
        self.set_paused(caller, true)
    }

    /// Allow stakes again. Returns `false` if the pool was not paused.
    pub fn unpause(&self, caller: &AccountId) -> Result<bool, ScavError> {
        self.set_paused(caller, false)
    }

    fn set_paused(&self, caller: &AccountId, paused: bool) -> Result<bool, ScavError> {
        self.authorize(caller)?;
        let mut state = self.state.lock();
        if state.paused == paused {
            return Ok(false);
        }
        state.paused = paused;
        info!(by = %caller, paused, "pause state changed");
        let event = if paused {
            PoolEvent::Paused { by: *caller }
        } else {
            PoolEvent::Unpaused { by: *caller }
        };
        emit(&mut state, event);
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// Reward `account` could claim right now, before tax.
    pub fn earned(&self, account: &AccountId) -> Result<Amount, ScavError> {
        let now = self.clock.now();
        let state = self.state.lock();
        earned_at(&state, account, now)
    }

    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.state.lock().ledger.balance_of(account)
    }

    pub fn total_staked(&self) -> Amount {
        self.state.lock().ledger.total_staked()
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    pub fn last_applicable_time(&self) -> BlockNumber {
        let now = self.clock.now();
        self.state.lock().accountant.last_applicable_time(now)
    }

    /// The accumulator as it would read if settled now.
    pub fn reward_per_unit(&self) -> Result<RewardPerUnit, ScavError> {
        let now = self.clock.now();
        let state = self.state.lock();
        Ok(state
            .accountant
            .reward_per_unit(now, state.ledger.total_staked())?)
    }

    pub fn reward_rate(&self) -> Amount {
        self.state.lock().accountant.reward_rate()
    }

    pub fn period_finish(&self) -> BlockNumber {
        self.state.lock().accountant.period_finish()
    }

    /// Total emission of the current schedule at the current rate.
    pub fn reward_for_duration(&self) -> Result<Amount, ScavError> {
        Ok(self.state.lock().accountant.reward_for_duration()?)
    }

    pub fn account_info(&self, account: &AccountId) -> Result<AccountInfo, ScavError> {
        let now = self.clock.now();
        let state = self.state.lock();
        account_info_at(&state, account, now)
    }

    pub fn snapshot(&self) -> Result<PoolSnapshot, ScavError> {
        let now = self.clock.now();
        let state = self.state.lock();
        let accountant = &state.accountant;
        let accounts = state
            .ledger
            .iter()
            .map(|(account, _)| account_info_at(&state, account, now))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PoolSnapshot {
            now,
            variant: state.ledger.variant(),
            paused: state.paused,
            total_staked: state.ledger.total_staked(),
            reward_rate: accountant.reward_rate(),
            period_start: accountant.period_start(),
            period_finish: accountant.period_finish(),
            rewards_duration: accountant.rewards_duration(),
            last_update_time: accountant.last_update_time(),
            reward_per_unit_stored: accountant.reward_per_unit_stored().to_string(),
            reward_for_duration: accountant.reward_for_duration()?,
            accounts,
        })
    }

    /// Take every event recorded since the last drain, oldest first.
    pub fn drain_events(&self) -> Vec<PoolEvent> {
        std::mem::take(&mut self.state.lock().events)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn authorize(&self, caller: &AccountId) -> Result<(), PoolError> {
        if self.authority.is_authorized(caller) {
            Ok(())
        } else {
            Err(PoolError::Unauthorized(*caller))
        }
    }

    fn ensure_eligible(&self, caller: &AccountId) -> Result<(), ScavError> {
        let minimum_level = self.config.minimum_level;
        if minimum_level == 0 {
            return Ok(());
        }
        if self.eligibility.is_eligible(caller, minimum_level)? {
            Ok(())
        } else {
            Err(PoolError::NotEligible { minimum_level }.into())
        }
    }

    fn burn_sink(&self) -> Option<AccountId> {
        if self.config.variant.burns_on_entry() {
            self.config.burn_sink
        } else {
            None
        }
    }

    /// Run `apply` against the state, then settle its token legs. Restores
    /// the accountant and `caller`'s position if either step fails.
    fn transact<T>(
        &self,
        state: &mut PoolState,
        caller: &AccountId,
        apply: impl FnOnce(&mut PoolState) -> Result<(Vec<Transfer>, T), ScavError>,
    ) -> Result<T, ScavError> {
        let accountant = state.accountant;
        let savepoint = state.ledger.savepoint(caller);

        let result = apply(state).and_then(|(legs, out)| {
            if !legs.is_empty() {
                self.tokens.transfer_batch(&legs)?;
            }
            Ok(out)
        });

        if let Err(e) = &result {
            debug!(account = %caller, error = %e, "operation rolled back");
            state.accountant = accountant;
            state.ledger.rollback(savepoint);
        }
        result
    }

    /// Zero the caller's settled reward and split it.
    fn take_reward(&self, state: &mut PoolState, caller: &AccountId) -> Payout {
        let total = state
            .ledger
            .get_mut(caller)
            .map_or(0, |position| std::mem::take(&mut position.checkpoint.accrued));
        self.splitter.split(total)
    }

    fn reward_legs(&self, caller: &AccountId, payout: &Payout) -> Vec<Transfer> {
        let asset = &self.config.reward_asset;
        let custody = self.config.pool_account;
        let mut legs = Vec::with_capacity(2);
        if payout.user > 0 {
            legs.push(Transfer::new(asset, custody, *caller, payout.user));
        }
        if payout.tax > 0 {
            legs.push(Transfer::new(asset, custody, self.config.treasury, payout.tax));
        }
        legs
    }

    fn record_payout(&self, state: &mut PoolState, caller: &AccountId, payout: &Payout) {
        if payout.total() == 0 {
            return;
        }
        info!(
            account = %caller,
            user_amount = payout.user,
            tax_amount = payout.tax,
            "reward paid"
        );
        emit(
            state,
            PoolEvent::RewardPaid {
                account: *caller,
                user_amount: payout.user,
                tax_amount: payout.tax,
            },
        );
    }
}

/// Settle the global accumulator, then `account`'s checkpoint if it has a
/// position, at `now`.
fn settle(state: &mut PoolState, account: &AccountId, now: BlockNumber) -> Result<(), ScavError> {
    let total = state.ledger.total_staked();
    state.accountant.settle(now, total)?;
    if let Some(position) = state.ledger.get_mut(account) {
        state
            .accountant
            .settle_account(&mut position.checkpoint, position.staked)?;
    }
    Ok(())
}

fn emit(state: &mut PoolState, event: PoolEvent) {
    debug!(event = event.name(), seq = state.events.len(), "event recorded");
    state.events.push(event);
}

fn earned_at(
    state: &PoolState,
    account: &AccountId,
    now: BlockNumber,
) -> Result<Amount, ScavError> {
    let position = state.ledger.account(account);
    Ok(state.accountant.earned(
        now,
        state.ledger.total_staked(),
        &position.checkpoint,
        position.staked,
    )?)
}

fn account_info_at(
    state: &PoolState,
    account: &AccountId,
    now: BlockNumber,
) -> Result<AccountInfo, ScavError> {
    let position = state.ledger.account(account);
    let period_finish = state.accountant.period_finish();
    Ok(AccountInfo {
        account: *account,
        staked: position.staked,
        earned: earned_at(state, account, now)?,
        accrued: position.checkpoint.accrued,
        lock_expiry: position.lock_expiry,
        remaining_lock: state.ledger.remaining_lock(account, now, period_finish),
    })
}
