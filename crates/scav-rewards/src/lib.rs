//! # scav-rewards - Time-weighted reward accrual.
//!
//! All calculations use integer arithmetic only for determinism.
//!
//! - **Reward-per-unit accumulator**: a 256-bit fixed-point value scaled by
//!   [`PRECISION`](scav_core::constants::PRECISION) that grows by
//!   `elapsed * rate * PRECISION / total_staked` on every settlement.
//! - **Per-account checkpoints**: each participant stores the accumulator
//!   value it was last settled at, so owed reward is
//!   `staked * (stored - paid) / PRECISION` without iterating over accounts.
//! - **Emission schedule**: a funded period `[start, finish)` at a constant
//!   rate, with mid-period top-ups rolling the unspent remainder forward.
//! - **Payout split**: a fixed tax percentage diverted to the treasury.

pub mod accountant;
pub mod fixed;
pub mod splitter;

pub use accountant::{NotifyOutcome, RewardAccountant, RewardCheckpoint};
pub use fixed::RewardPerUnit;
pub use splitter::{Payout, PayoutSplitter};
