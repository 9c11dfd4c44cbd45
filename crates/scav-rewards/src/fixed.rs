//! Fixed-point reward-per-unit values.
//!
//! A [`RewardPerUnit`] is reward units per staked unit, multiplied by
//! [`PRECISION`] (1e18) and held in a `U256`. 128-bit intermediates are not
//! enough: `elapsed * rate * PRECISION` for a 120-day period emitting
//! 315,000e18 units already exceeds `u128::MAX`.

use std::fmt;

use primitive_types::U256;
use scav_core::constants::PRECISION;
use scav_core::error::AccountingError;
use scav_core::types::{Amount, BlockNumber};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RewardPerUnit(U256);

impl RewardPerUnit {
    pub const ZERO: Self = Self(U256([0; 4]));

    /// The raw scaled value.
    pub fn raw(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Accumulator growth for `elapsed` blocks at `rate` reward units per
    /// block shared across `total_staked` units.
    ///
    /// Returns zero when nothing is staked: emission during an empty pool is
    /// never credited to anyone.
    pub fn accrual(
        elapsed: BlockNumber,
        rate: Amount,
        total_staked: Amount,
    ) -> Result<Self, AccountingError> {
        if total_staked == 0 || elapsed == 0 || rate == 0 {
            return Ok(Self::ZERO);
        }
        let scaled = U256::from(elapsed)
            .checked_mul(U256::from(rate))
            .and_then(|v| v.checked_mul(U256::from(PRECISION)))
            .ok_or(AccountingError::ArithmeticOverflow)?;
        Ok(Self(scaled / U256::from(total_staked)))
    }

    pub fn checked_add(self, other: Self) -> Result<Self, AccountingError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(AccountingError::ArithmeticOverflow)
    }

    /// `self - earlier`. Fails if `earlier` is ahead, which would mean a
    /// checkpoint was taken from a future accumulator.
    pub fn checked_sub(self, earlier: Self) -> Result<Self, AccountingError> {
        self.0
            .checked_sub(earlier.0)
            .map(Self)
            .ok_or(AccountingError::ArithmeticOverflow)
    }

    /// Reward owed to `staked` units over this accumulator delta,
    /// truncated toward zero.
    pub fn owed(self, staked: Amount) -> Result<Amount, AccountingError> {
        let scaled = U256::from(staked)
            .checked_mul(self.0)
            .ok_or(AccountingError::ArithmeticOverflow)?;
        to_amount(scaled / U256::from(PRECISION))
    }
}

impl fmt::Display for RewardPerUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn to_amount(value: U256) -> Result<Amount, AccountingError> {
    if value > U256::from(Amount::MAX) {
        return Err(AccountingError::ArithmeticOverflow);
    }
    Ok(value.low_u128())
}
