//! Payout splitting between participant and treasury.

use serde::Serialize;

use scav_core::constants::{MAX_TAX_PERCENT, PERCENT_DENOMINATOR};
use scav_core::error::AccountingError;
use scav_core::types::Amount;

/// One claim, split. `user + tax` always equals the claimed total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Payout {
    pub user: Amount,
    pub tax: Amount,
}

impl Payout {
    pub fn total(&self) -> Amount {
        self.user + self.tax
    }
}

/// Diverts a fixed percentage of every payout to the treasury.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PayoutSplitter {
    tax_percent: u8,
}

impl PayoutSplitter {
    /// # Errors
    ///
    /// [`AccountingError::InvalidTaxPercent`] if `tax_percent > 100`.
    pub fn new(tax_percent: u8) -> Result<Self, AccountingError> {
        if tax_percent > MAX_TAX_PERCENT {
            return Err(AccountingError::InvalidTaxPercent(tax_percent));
        }
        Ok(Self { tax_percent })
    }

    pub fn tax_percent(&self) -> u8 {
        self.tax_percent
    }

    /// `tax = floor(total * tax_percent / 100)`, `user = total - tax`.
    ///
    /// Computed as quotient and remainder parts so it cannot overflow for
    /// any `u128` total.
    pub fn split(&self, total: Amount) -> Payout {
        let pct = self.tax_percent as u128;
        let tax = (total / PERCENT_DENOMINATOR) * pct
            + (total % PERCENT_DENOMINATOR) * pct / PERCENT_DENOMINATOR;
        Payout {
            user: total - tax,
            tax,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fifteen_percent_split() {
        let s = PayoutSplitter::new(15).unwrap();
        assert_eq!(s.split(5_100), Payout { user: 4_335, tax: 765 });
        assert_eq!(s.split(700), Payout { user: 595, tax: 105 });
        assert_eq!(s.split(600), Payout { user: 510, tax: 90 });
    }

    #[test]
    fn tax_rounds_down() {
        let s = PayoutSplitter::new(15).unwrap();
        // 15% of 7 = 1.05
        assert_eq!(s.split(7), Payout { user: 6, tax: 1 });
        assert_eq!(s.split(6), Payout { user: 6, tax: 0 });
    }

    #[test]
    fn zero_and_full_tax() {
        assert_eq!(
            PayoutSplitter::new(0).unwrap().split(999),
            Payout { user: 999, tax: 0 }
        );
        assert_eq!(
            PayoutSplitter::new(100).unwrap().split(999),
            Payout { user: 0, tax: 999 }
        );
    }

    #[test]
    fn rejects_tax_over_100() {
        assert_eq!(
            PayoutSplitter::new(101),
            Err(AccountingError::InvalidTaxPercent(101))
        );
    }

    #[test]
    fn max_amount_does_not_overflow() {
        let p = PayoutSplitter::new(99).unwrap().split(Amount::MAX);
        assert_eq!(p.total(), Amount::MAX);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn split_matches_naive_formula(total in 0u128..u64::MAX as u128, pct in 0u8..=100) {
            let p = PayoutSplitter::new(pct).unwrap().split(total);
            prop_assert_eq!(p.tax, total * pct as u128 / 100);
            prop_assert_eq!(p.total(), total);
        }
    }
}
