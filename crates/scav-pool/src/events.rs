//! Observable pool events, in commit order.

use serde::Serialize;

use scav_core::types::{AccountId, Amount, BlockNumber};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PoolEvent {
    /// `balance` is the participant's stake after the deposit.
    Staked {
        account: AccountId,
        amount: Amount,
        balance: Amount,
    },
    Withdrawn {
        account: AccountId,
        amount: Amount,
    },
    RewardPaid {
        account: AccountId,
        user_amount: Amount,
        tax_amount: Amount,
    },
    RewardsDurationUpdated {
        start: BlockNumber,
        duration: u64,
    },
    RewardAdded {
        amount: Amount,
        reward_rate: Amount,
    },
    Paused {
        by: AccountId,
    },
    Unpaused {
        by: AccountId,
    },
}

impl PoolEvent {
    /// Short event name, as used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Staked { .. } => "Staked",
            Self::Withdrawn { .. } => "Withdrawn",
            Self::RewardPaid { .. } => "RewardPaid",
            Self::RewardsDurationUpdated { .. } => "RewardsDurationUpdated",
            Self::RewardAdded { .. } => "RewardAdded",
            Self::Paused { .. } => "Paused",
            Self::Unpaused { .. } => "Unpaused",
        }
    }
}
