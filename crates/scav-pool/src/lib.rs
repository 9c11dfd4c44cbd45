//! Scavenge reward pool engine.
//!
//! [`PoolController`](controller::PoolController) composes the pieces:
//!
//! - [`eligibility`]: stake-time gate over the staking registry and item attributes
//! - [`ledger`]: per-participant stake balances and variant admission rules
//! - [`authority`]: admin allow-list for the administrative surface
//! - [`events`]: observable pool events
//! - [`config`]: pool parameters loaded from TOML and the environment
//!
//! Accrual arithmetic lives in `scav-rewards`; collaborator traits in
//! `scav-core`.

pub mod authority;
pub mod config;
pub mod controller;
pub mod eligibility;
pub mod events;
pub mod ledger;

pub use authority::AdminRoles;
pub use config::PoolConfig;
pub use controller::{AccountInfo, ExitOutcome, PoolController, PoolSnapshot};
pub use eligibility::EligibilityGate;
pub use events::PoolEvent;
pub use ledger::{LockState, ParticipantAccount, StakeLedger};
