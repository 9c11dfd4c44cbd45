//! Pool configuration.
//!
//! Loaded from a TOML file layered with `SCAV_`-prefixed environment
//! variables (`SCAV_TAX_PERCENT=20`, `SCAV_ADMINS=0xab..,0xcd..`). The
//! parameters are immutable once the pool is built.

use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use scav_core::constants::{DEFAULT_TAX_PERCENT, MAX_TAX_PERCENT};
use scav_core::error::ConfigError;
use scav_core::types::{AccountId, AssetId, PoolVariant};

/// Immutable parameters of one pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Asset paid out as reward.
    pub reward_asset: AssetId,
    /// Asset participants lock into the pool.
    pub stake_asset: AssetId,
    /// Custody account holding staked units and reward funds.
    pub pool_account: AccountId,
    /// Receives the tax leg of every payout.
    pub treasury: AccountId,
    /// Percent of every payout diverted to the treasury (0–100).
    #[serde(default = "default_tax_percent")]
    pub tax_percent: u8,
    #[serde(default)]
    pub variant: PoolVariant,
    /// Blocks a time-locked stake stays locked after its latest deposit.
    #[serde(default)]
    pub lock_duration: u64,
    /// Minimum item level required to stake; zero disables gating.
    #[serde(default)]
    pub minimum_level: u32,
    /// Destination of the entry cost in consumable-entry pools.
    #[serde(default)]
    pub burn_sink: Option<AccountId>,
    /// Accounts allowed to schedule, fund and pause the pool. Turned into
    /// an [`AdminRoles`](crate::authority::AdminRoles) by the embedder.
    pub admins: Vec<AccountId>,
}

fn default_tax_percent() -> u8 {
    DEFAULT_TAX_PERCENT
}

impl PoolConfig {
    /// An open, ungated pool with the default tax and a single admin.
    pub fn open(
        reward_asset: AssetId,
        stake_asset: AssetId,
        pool_account: AccountId,
        treasury: AccountId,
        admin: AccountId,
    ) -> Self {
        Self {
            reward_asset,
            stake_asset,
            pool_account,
            treasury,
            tax_percent: DEFAULT_TAX_PERCENT,
            variant: PoolVariant::Open,
            lock_duration: 0,
            minimum_level: 0,
            burn_sink: None,
            admins: vec![admin],
        }
    }

    /// Load `path` (format from its extension) with `SCAV_*` overrides, then
    /// validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_layered(path.as_ref(), Self::environment())
    }

    /// Parse a TOML document without environment overrides, then validate.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let cfg: Self = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| ConfigError::Load(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn environment() -> Environment {
        Environment::with_prefix("SCAV")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("admins")
    }

    fn load_layered(path: &Path, env: Environment) -> Result<Self, ConfigError> {
        let cfg: Self = Config::builder()
            .add_source(File::from(path))
            .add_source(env)
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject parameter combinations the pool cannot honour.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidTaxPercent`] if `tax_percent > 100`
    /// - [`ConfigError::MissingBurnSink`] for a consumable-entry pool without a sink
    /// - [`ConfigError::ZeroLockDuration`] for a time-locked pool with no lock
    /// - [`ConfigError::SameAssets`] if stake and reward share an asset
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tax_percent > MAX_TAX_PERCENT {
            return Err(ConfigError::InvalidTaxPercent(self.tax_percent));
        }
        if self.variant.burns_on_entry() && self.burn_sink.is_none() {
            return Err(ConfigError::MissingBurnSink);
        }
        if self.variant.is_locking() && self.lock_duration == 0 {
            return Err(ConfigError::ZeroLockDuration);
        }
        if self.reward_asset == self.stake_asset {
            return Err(ConfigError::SameAssets(self.stake_asset.clone()));
        }
        Ok(())
    }
}
