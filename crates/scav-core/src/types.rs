//! Core pool types: accounts, assets, variants, collaborator records.
//!
//! Token amounts are `u128` in the asset's smallest unit; time is a `u64`
//! block number.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::ACCOUNT_ID_LEN;
use crate::error::ConfigError;

/// Token amount in the asset's smallest unit.
pub type Amount = u128;

/// Discrete time: the block counter of the execution environment.
pub type BlockNumber = u64;

/// Identifier of a non-fungible item.
pub type ItemId = u64;

/// A 20-byte account identifier, rendered as `0x`-prefixed hex.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(pub [u8; ACCOUNT_ID_LEN]);

impl AccountId {
    /// The all-zero account.
    pub const ZERO: Self = Self([0u8; ACCOUNT_ID_LEN]);

    /// Account whose every byte is `byte`. Handy for fixtures.
    pub const fn repeat_byte(byte: u8) -> Self {
        Self([byte; ACCOUNT_ID_LEN])
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ACCOUNT_ID_LEN]
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for AccountId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes =
            hex::decode(digits).map_err(|_| ConfigError::InvalidAccountId(s.to_string()))?;
        let array: [u8; ACCOUNT_ID_LEN] = bytes
            .try_into()
            .map_err(|_| ConfigError::InvalidAccountId(s.to_string()))?;
        Ok(Self(array))
    }
}

impl TryFrom<String> for AccountId {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.to_string()
    }
}

impl From<[u8; ACCOUNT_ID_LEN]> for AccountId {
    fn from(bytes: [u8; ACCOUNT_ID_LEN]) -> Self {
        Self(bytes)
    }
}

/// Symbolic identifier of a fungible asset (e.g. `"ORB"`).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct AssetId(pub String);

impl AssetId {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(symbol: &str) -> Self {
        Self(symbol.to_string())
    }
}

/// Admission rules a pool applies to stake and withdraw.
///
/// | Variant           | Stake                               | Withdraw            |
/// |-------------------|-------------------------------------|---------------------|
/// | `Open`            | credit units                        | any time            |
/// | `TimeLocked`      | credit units, push lock expiry out  | after lock expiry   |
/// | `ConsumableEntry` | credit units, burn the same amount  | never               |
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PoolVariant {
    #[default]
    Open,
    TimeLocked,
    ConsumableEntry,
}

impl PoolVariant {
    /// Whether staked units can ever leave the pool.
    pub fn allows_withdrawal(&self) -> bool {
        !matches!(self, Self::ConsumableEntry)
    }

    /// Whether staking sets a withdrawal lock.
    pub fn is_locking(&self) -> bool {
        matches!(self, Self::TimeLocked)
    }

    /// Whether staking burns a matching amount of the stake asset.
    pub fn burns_on_entry(&self) -> bool {
        matches!(self, Self::ConsumableEntry)
    }
}

impl fmt::Display for PoolVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "open",
            Self::TimeLocked => "time-locked",
            Self::ConsumableEntry => "consumable-entry",
        };
        f.write_str(name)
    }
}

/// Registry record for a non-fungible item.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct StakingInfo {
    /// Block at which the item was staked.
    pub staked_block_number: BlockNumber,
    /// Block of the item's most recent play.
    pub play_block_number: BlockNumber,
    /// Account the item is staked by.
    pub owner: AccountId,
    /// False when the item is not currently staked.
    pub exists: bool,
}

/// One leg of an atomic token batch.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub asset: AssetId,
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Amount,
}

impl Transfer {
    pub fn new(asset: &AssetId, from: AccountId, to: AccountId, amount: Amount) -> Self {
        Self {
            asset: asset.clone(),
            from,
            to,
            amount,
        }
    }
}
