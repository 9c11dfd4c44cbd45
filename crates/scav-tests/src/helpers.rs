//! Shared fixtures for scenario and adversarial tests.
//!
//! A [`Fixture`] wires one [`PoolController`] to in-memory collaborators
//! and a manual clock. Block numbers follow a simple chain model: every
//! state-changing call made through [`Fixture::send`] is mined in its own
//! new block, views read the current block, and [`Fixture::mine`] appends
//! empty blocks.

use std::sync::Arc;

use scav_core::clock::ManualClock;
use scav_core::constants::LEVEL_ATTRIBUTE;
use scav_core::error::ScavError;
use scav_core::registry::{MemoryAttributeStore, MemoryStakingRegistry};
use scav_core::token::MemoryTokenLedger;
use scav_core::traits::{Clock, TokenLedger};
use scav_core::types::{AccountId, Amount, AssetId, BlockNumber, ItemId, PoolVariant, Transfer};
use scav_pool::{AdminRoles, EligibilityGate, PoolConfig, PoolController};

pub const ADMIN: AccountId = AccountId::repeat_byte(0xAD);
pub const TREASURY: AccountId = AccountId::repeat_byte(0x7E);
pub const POOL: AccountId = AccountId::repeat_byte(0x50);
pub const BURN_POOL: AccountId = AccountId::repeat_byte(0xDE);

/// Starting stake-asset balance of every player.
pub const PLAYER_FUNDS: Amount = 10_000;

/// Reward asset.
pub fn orb() -> AssetId {
    AssetId::new("ORB")
}

/// Stake asset.
pub fn lay() -> AssetId {
    AssetId::new("LAY")
}

/// Player account `n` (0-based).
pub fn player(n: u8) -> AccountId {
    AccountId::repeat_byte(0x10 + n)
}

/// Pool parameters shared by every fixture; 15% tax.
pub fn pool_config(variant: PoolVariant, lock_duration: u64, minimum_level: u32) -> PoolConfig {
    PoolConfig {
        variant,
        lock_duration,
        minimum_level,
        burn_sink: Some(BURN_POOL),
        ..PoolConfig::open(orb(), lay(), POOL, TREASURY, ADMIN)
    }
}

pub struct Fixture {
    pub clock: ManualClock,
    pub tokens: Arc<MemoryTokenLedger>,
    pub registry: Arc<MemoryStakingRegistry>,
    pub attributes: Arc<MemoryAttributeStore>,
    pub pool: PoolController,
}

impl Fixture {
    /// A pool at block 1000 with three funded players and a funded admin.
    pub fn new(config: PoolConfig) -> Self {
        let clock = ManualClock::new(1_000);
        let tokens = Arc::new(MemoryTokenLedger::new());
        let registry = Arc::new(MemoryStakingRegistry::new());
        let attributes = Arc::new(MemoryAttributeStore::new());
        let gate = EligibilityGate::new(registry.clone(), attributes.clone());
        let admins = AdminRoles::from_config(&config).expect("admin list");
        let pool = PoolController::new(
            config,
            Arc::new(clock.clone()),
            tokens.clone(),
            Arc::new(gate),
            Arc::new(admins),
        )
        .expect("valid pool config");

        tokens.mint(&orb(), ADMIN, 1_000_000_000).expect("mint orb");
        for n in 0..3 {
            tokens.mint(&lay(), player(n), PLAYER_FUNDS).expect("mint lay");
        }

        Self {
            clock,
            tokens,
            registry,
            attributes,
            pool,
        }
    }

    pub fn open() -> Self {
        Self::new(pool_config(PoolVariant::Open, 0, 0))
    }

    pub fn time_locked(lock_duration: u64) -> Self {
        Self::new(pool_config(PoolVariant::TimeLocked, lock_duration, 0))
    }

    pub fn consumable() -> Self {
        Self::new(pool_config(PoolVariant::ConsumableEntry, 0, 0))
    }

    /// Current block.
    pub fn height(&self) -> BlockNumber {
        self.clock.now()
    }

    /// Append `blocks` empty blocks.
    pub fn mine(&self, blocks: u64) {
        self.clock.advance(blocks);
    }

    /// Mine one block and run `op` in it. Panics if `op` fails.
    pub fn send<T>(&self, op: impl FnOnce(&PoolController) -> Result<T, ScavError>) -> T {
        self.clock.advance(1);
        match op(&self.pool) {
            Ok(out) => out,
            Err(e) => panic!("operation failed at block {}: {e}", self.height()),
        }
    }

    /// Schedule `[start, start + duration)`, move `amount` into custody and
    /// fund the period: three transactions, three blocks.
    pub fn schedule_and_fund(&self, start: BlockNumber, duration: u64, amount: Amount) {
        self.send(|p| p.set_rewards_duration(&ADMIN, start, duration));
        self.clock.advance(1);
        self.tokens
            .transfer(Transfer::new(&orb(), ADMIN, POOL, amount))
            .expect("fund custody");
        self.send(|p| p.notify_reward_amount(&ADMIN, amount));
    }

    /// Stake `item` for `owner` in the registry with the given `Level`, in a
    /// new block.
    pub fn stake_item(&self, item: ItemId, owner: AccountId, level: u32) {
        self.clock.advance(1);
        self.attributes
            .set_attribute(item, LEVEL_ATTRIBUTE, &level.to_string());
        self.registry.stake(item, owner, self.height());
    }

    pub fn reward_balance(&self, account: &AccountId) -> Amount {
        self.tokens.balance_of(&orb(), account)
    }

    pub fn stake_balance(&self, account: &AccountId) -> Amount {
        self.tokens.balance_of(&lay(), account)
    }

    pub fn earned(&self, account: &AccountId) -> Amount {
        self.pool.earned(account).expect("earned")
    }
}
