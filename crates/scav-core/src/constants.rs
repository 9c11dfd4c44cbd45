//! Protocol constants. Amounts are in the smallest unit of their asset.

/// Number of decimal digits carried by the reward-per-unit accumulator.
pub const PRECISION_DECIMALS: usize = 18;

/// Scale of the reward-per-unit accumulator (`10^PRECISION_DECIMALS`).
///
/// Fits in a `u128`; the accumulator itself is widened to 256 bits because
/// `elapsed * rate * PRECISION` overflows `u128` for realistic emissions.
///
/// # Examples
///
/// ```
/// use scav_core::constants::{PRECISION, PRECISION_DECIMALS};
/// assert_eq!(PRECISION, 10u128.pow(PRECISION_DECIMALS as u32));
/// ```
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

/// Denominator for tax percentages.
pub const PERCENT_DENOMINATOR: u128 = 100;

/// Largest accepted tax percentage.
pub const MAX_TAX_PERCENT: u8 = 100;

/// Tax taken from every payout by the deployed pools.
pub const DEFAULT_TAX_PERCENT: u8 = 15;

/// Attribute key holding an item's level in the attribute store.
pub const LEVEL_ATTRIBUTE: &str = "Level";

/// Byte length of an account identifier.
pub const ACCOUNT_ID_LEN: usize = 20;

/// Blocks per day on the reference chain (one block per second).
pub const BLOCKS_PER_DAY: u64 = 86_400;

/// Standard length of a funded reward period (120 days).
pub const DEFAULT_REWARDS_DURATION: u64 = 120 * BLOCKS_PER_DAY;
