//! Operation scripts and their replay against an in-memory pool.
//!
//! A script is a JSON document. Each step is an object keyed by its
//! operation name:
//!
//! ```json
//! {
//!   "start_block": 1000,
//!   "steps": [
//!     { "mint": { "asset": "LAY", "account": "0x11..", "amount": 100 } },
//!     { "set-rewards-duration": { "caller": "0xad..", "start": 1010, "duration": 100 } },
//!     { "stake": { "account": "0x11..", "amount": 1 } },
//!     { "mine": { "blocks": 5 } },
//!     { "exit": { "account": "0x11.." } }
//!   ]
//! }
//! ```
//!
//! Amounts are plain JSON integers up to `u128::MAX`.
//!
//! Pool operations are each mined in a new block. Setup steps (`mint`,
//! `transfer`, `set-level`, `stake-item`, `unstake-item`) and `inspect` run
//! in the current block.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use scav_core::clock::ManualClock;
use scav_core::constants::LEVEL_ATTRIBUTE;
use scav_core::error::ScavError;
use scav_core::registry::{MemoryAttributeStore, MemoryStakingRegistry};
use scav_core::token::MemoryTokenLedger;
use scav_core::traits::{Clock, TokenLedger};
use scav_core::types::{AccountId, Amount, AssetId, BlockNumber, ItemId, Transfer};
use scav_pool::{
    AccountInfo, AdminRoles, EligibilityGate, PoolConfig, PoolController, PoolEvent, PoolSnapshot,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub start_block: BlockNumber,
    pub steps: Vec<Step>,
}

/// One script step, keyed by operation: `{ "<op>": { ..fields } }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    Mint { asset: AssetId, account: AccountId, amount: Amount },
    Transfer { asset: AssetId, from: AccountId, to: AccountId, amount: Amount },
    SetLevel { item: ItemId, level: u32 },
    StakeItem { item: ItemId, owner: AccountId },
    UnstakeItem { item: ItemId },
    Mine { blocks: u64 },
    Stake { account: AccountId, amount: Amount },
    Withdraw { account: AccountId, amount: Amount },
    GetReward { account: AccountId },
    Exit { account: AccountId },
    SetRewardsDuration { caller: AccountId, start: BlockNumber, duration: u64 },
    Notify { caller: AccountId, amount: Amount },
    Pause { caller: AccountId },
    Unpause { caller: AccountId },
    Inspect { account: AccountId },
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Self::Mint { .. } => "mint",
            Self::Transfer { .. } => "transfer",
            Self::SetLevel { .. } => "set-level",
            Self::StakeItem { .. } => "stake-item",
            Self::UnstakeItem { .. } => "unstake-item",
            Self::Mine { .. } => "mine",
            Self::Stake { .. } => "stake",
            Self::Withdraw { .. } => "withdraw",
            Self::GetReward { .. } => "get-reward",
            Self::Exit { .. } => "exit",
            Self::SetRewardsDuration { .. } => "set-rewards-duration",
            Self::Notify { .. } => "notify",
            Self::Pause { .. } => "pause",
            Self::Unpause { .. } => "unpause",
            Self::Inspect { .. } => "inspect",
        }
    }

    /// Whether the step is a pool transaction mined in its own block.
    fn is_transaction(&self) -> bool {
        matches!(
            self,
            Self::Stake { .. }
                | Self::Withdraw { .. }
                | Self::GetReward { .. }
                | Self::Exit { .. }
                | Self::SetRewardsDuration { .. }
                | Self::Notify { .. }
                | Self::Pause { .. }
                | Self::Unpause { .. }
        )
    }
}

/// A step the pool refused.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Rejection {
    pub step: usize,
    pub block: BlockNumber,
    pub op: &'static str,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub events: Vec<PoolEvent>,
    pub rejections: Vec<Rejection>,
    pub inspections: Vec<AccountInfo>,
    pub snapshot: PoolSnapshot,
}

/// A pool wired to in-memory collaborators.
pub struct Simulation {
    clock: ManualClock,
    tokens: Arc<MemoryTokenLedger>,
    registry: Arc<MemoryStakingRegistry>,
    attributes: Arc<MemoryAttributeStore>,
    pool: PoolController,
}

impl Simulation {
    pub fn new(config: PoolConfig, start_block: BlockNumber) -> Result<Self> {
        let clock = ManualClock::new(start_block);
        let tokens = Arc::new(MemoryTokenLedger::new());
        let registry = Arc::new(MemoryStakingRegistry::new());
        let attributes = Arc::new(MemoryAttributeStore::new());
        let gate = EligibilityGate::new(registry.clone(), attributes.clone());
        let admins = AdminRoles::from_config(&config).context("invalid admin list")?;
        let pool = PoolController::new(
            config,
            Arc::new(clock.clone()),
            tokens.clone(),
            Arc::new(gate),
            Arc::new(admins),
        )
        .context("failed to build pool")?;
        Ok(Self {
            clock,
            tokens,
            registry,
            attributes,
            pool,
        })
    }

    /// Replay every step. Pool rejections are collected, or abort the run
    /// when `strict` is set. Setup failures always abort.
    pub fn run(&self, script: &Script, strict: bool) -> Result<Report> {
        let mut rejections = Vec::new();
        let mut inspections = Vec::new();

        for (index, step) in script.steps.iter().enumerate() {
            if step.is_transaction() {
                self.clock.advance(1);
            }
            let block = self.clock.now();
            debug!(step = index, block, op = step.name(), "replaying step");

            match self.apply(step, &mut inspections) {
                Ok(()) => {}
                Err(StepError::Pool(e)) => {
                    if strict {
                        bail!("step {index} ({}) rejected at block {block}: {e}", step.name());
                    }
                    warn!(step = index, block, op = step.name(), error = %e, "step rejected");
                    rejections.push(Rejection {
                        step: index,
                        block,
                        op: step.name(),
                        error: e.to_string(),
                    });
                }
                Err(StepError::Setup(e)) => {
                    return Err(e).with_context(|| format!("step {index} ({}) failed", step.name()));
                }
            }
        }

        Ok(Report {
            events: self.pool.drain_events(),
            rejections,
            inspections,
            snapshot: self.pool.snapshot()?,
        })
    }

    fn apply(&self, step: &Step, inspections: &mut Vec<AccountInfo>) -> Result<(), StepError> {
        let pool = &self.pool;
        match step {
            Step::Mint {
                asset,
                account,
                amount,
            } => self
                .tokens
                .mint(asset, *account, *amount)
                .map_err(|e| StepError::Setup(e.into()))?,
            Step::Transfer {
                asset,
                from,
                to,
                amount,
            } => self
                .tokens
                .transfer(Transfer::new(asset, *from, *to, *amount))
                .map_err(|e| StepError::Setup(e.into()))?,
            Step::SetLevel { item, level } => {
                self.attributes
                    .set_attribute(*item, LEVEL_ATTRIBUTE, &level.to_string());
            }
            Step::StakeItem { item, owner } => {
                self.registry.stake(*item, *owner, self.clock.now());
            }
            Step::UnstakeItem { item } => {
                self.registry.unstake(*item);
            }
            Step::Mine { blocks } => {
                self.clock.advance(*blocks);
            }
            Step::Stake { account, amount } => {
                pool.stake(account, *amount)?;
            }
            Step::Withdraw { account, amount } => {
                pool.withdraw(account, *amount)?;
            }
            Step::GetReward { account } => {
                pool.get_reward(account)?;
            }
            Step::Exit { account } => {
                pool.exit(account)?;
            }
            Step::SetRewardsDuration {
                caller,
                start,
                duration,
            } => pool.set_rewards_duration(caller, *start, *duration)?,
            Step::Notify { caller, amount } => {
                pool.notify_reward_amount(caller, *amount)?;
            }
            Step::Pause { caller } => {
                pool.pause(caller)?;
            }
            Step::Unpause { caller } => {
                pool.unpause(caller)?;
            }
            Step::Inspect { account } => inspections.push(pool.account_info(account)?),
        }
        Ok(())
    }
}

enum StepError {
    /// The pool refused the operation; its state is unchanged.
    Pool(ScavError),
    /// The script itself is broken (e.g. an unfunded setup transfer).
    Setup(anyhow::Error),
}

impl From<ScavError> for StepError {
    fn from(e: ScavError) -> Self {
        Self::Pool(e)
    }
}

/// Parse a script from JSON text.
pub fn parse_script(json: &str) -> Result<Script> {
    serde_json::from_str(json).context("invalid script")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scav_core::types::PoolVariant;

    const ADMIN: &str = "0xadadadadadadadadadadadadadadadadadadadad";
    const ALICE: &str = "0xa1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1";
    const POOL: &str = "0x5050505050505050505050505050505050505050";

    fn config(variant: PoolVariant, lock_duration: u64, minimum_level: u32) -> PoolConfig {
        PoolConfig {
            variant,
            lock_duration,
            minimum_level,
            burn_sink: Some(AccountId::repeat_byte(0xDE)),
            ..PoolConfig::open(
                AssetId::new("ORB"),
                AssetId::new("LAY"),
                POOL.parse().unwrap(),
                AccountId::repeat_byte(0x7E),
                ADMIN.parse().unwrap(),
            )
        }
    }

    fn script(steps: &str) -> Script {
        parse_script(&format!(r#"{{ "start_block": 1000, "steps": [{steps}] }}"#)).unwrap()
    }

    fn funding() -> String {
        format!(
            r#"
            {{ "mint": {{ "asset": "ORB", "account": "{POOL}", "amount": 10000 }} }},
            {{ "mint": {{ "asset": "LAY", "account": "{ALICE}", "amount": 100 }} }},
            {{ "set-rewards-duration": {{ "caller": "{ADMIN}", "start": 1001, "duration": 100 }} }},
            {{ "notify": {{ "caller": "{ADMIN}", "amount": 10000 }} }}
            "#
        )
    }

    #[test]
    fn amount_steps_parse() {
        let s = script(&funding());
        assert_eq!(s.steps.len(), 4);
        assert!(matches!(s.steps[0], Step::Mint { amount: 10_000, .. }));
        assert!(matches!(s.steps[3], Step::Notify { amount: 10_000, .. }));
        assert_eq!(s.steps[2].name(), "set-rewards-duration");
    }

    #[test]
    fn amounts_beyond_u64_parse() {
        let s = script(&format!(
            r#"{{ "mint": {{ "asset": "ORB", "account": "{POOL}", "amount": 315000000000000000000000 }} }},
            {{ "stake": {{ "account": "{ALICE}", "amount": 340282366920938463463374607431768211455 }} }}"#
        ));
        let amounts: Vec<Amount> = s
            .steps
            .iter()
            .filter_map(|step| match step {
                Step::Mint { amount, .. } | Step::Stake { amount, .. } => Some(*amount),
                _ => None,
            })
            .collect();
        assert_eq!(amounts, vec![315_000 * 10u128.pow(18), Amount::MAX]);
    }

    #[test]
    fn time_locked_exit_after_lock() {
        let steps = format!(
            r#"{},
            {{ "stake": {{ "account": "{ALICE}", "amount": 1 }} }},
            {{ "exit": {{ "account": "{ALICE}" }} }},
            {{ "mine": {{ "blocks": 50 }} }},
            {{ "exit": {{ "account": "{ALICE}" }} }}"#,
            funding()
        );
        let sim = Simulation::new(config(PoolVariant::TimeLocked, 50, 0), 1000).unwrap();
        let report = sim.run(&script(&steps), false).unwrap();

        assert_eq!(report.rejections.len(), 1);
        assert_eq!(report.rejections[0].op, "exit");
        let alice: AccountId = ALICE.parse().unwrap();
        // Stake mined at 1003, exit at 1055: 52 blocks at 100.
        assert!(report.events.contains(&PoolEvent::RewardPaid {
            account: alice,
            user_amount: 4_420,
            tax_amount: 780,
        }));
        assert_eq!(report.snapshot.total_staked, 0);
    }

    #[test]
    fn strict_mode_aborts_on_rejection() {
        let steps = format!(
            r#"{},
            {{ "withdraw": {{ "account": "{ALICE}", "amount": 1 }} }}"#,
            funding()
        );
        let sim = Simulation::new(config(PoolVariant::Open, 0, 0), 1000).unwrap();
        let err = sim.run(&script(&steps), true).unwrap_err();
        assert!(err.to_string().contains("withdraw"));
    }

    #[test]
    fn level_gate_uses_registry_steps() {
        let steps = format!(
            r#"{},
            {{ "stake": {{ "account": "{ALICE}", "amount": 1 }} }},
            {{ "set-level": {{ "item": 7, "level": 2 }} }},
            {{ "stake-item": {{ "item": 7, "owner": "{ALICE}" }} }},
            {{ "stake": {{ "account": "{ALICE}", "amount": 1 }} }},
            {{ "inspect": {{ "account": "{ALICE}" }} }}"#,
            funding()
        );
        let sim = Simulation::new(config(PoolVariant::Open, 0, 2), 1000).unwrap();
        let report = sim.run(&script(&steps), false).unwrap();
        assert_eq!(report.rejections.len(), 1);
        assert!(report.rejections[0].error.starts_with("level limit"));
        assert_eq!(report.inspections.len(), 1);
        assert_eq!(report.inspections[0].staked, 1);
    }

    #[test]
    fn unfunded_setup_transfer_aborts() {
        let steps = format!(
            r#"{{ "transfer": {{ "asset": "ORB", "from": "{ALICE}", "to": "{POOL}", "amount": 1 }} }}"#
        );
        let sim = Simulation::new(config(PoolVariant::Open, 0, 0), 1000).unwrap();
        let err = sim.run(&script(&steps), false).unwrap_err();
        assert!(format!("{err:#}").contains("insufficient ORB balance"));
    }

    #[test]
    fn empty_admin_list_rejected() {
        let cfg = PoolConfig {
            admins: vec![],
            ..config(PoolVariant::Open, 0, 0)
        };
        assert!(Simulation::new(cfg, 0).is_err());
    }

    #[test]
    fn unknown_op_rejected() {
        assert!(parse_script(r#"{ "steps": [ { "teleport": {} } ] }"#).is_err());
    }
}
