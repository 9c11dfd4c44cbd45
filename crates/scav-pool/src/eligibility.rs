//! Stake-time eligibility gate.
//!
//! An account qualifies for a pool gated at level `n` when it has at least
//! one item staked in the registry whose `Level` attribute parses to a
//! number `>= n`. Items with a missing or non-numeric level never qualify.

use std::sync::Arc;

use tracing::debug;

use scav_core::constants::LEVEL_ATTRIBUTE;
use scav_core::error::ExternalError;
use scav_core::traits::{AttributeStore, EligibilityOracle, StakingRegistry};
use scav_core::types::{AccountId, ItemId};

/// [`EligibilityOracle`] backed by a staking registry and an attribute store.
pub struct EligibilityGate {
    registry: Arc<dyn StakingRegistry>,
    attributes: Arc<dyn AttributeStore>,
}

impl EligibilityGate {
    pub fn new(registry: Arc<dyn StakingRegistry>, attributes: Arc<dyn AttributeStore>) -> Self {
        Self {
            registry,
            attributes,
        }
    }

    /// Parsed `Level` of `item`, if it has a numeric one.
    pub fn item_level(&self, item: ItemId) -> Result<Option<u32>, ExternalError> {
        let Some(raw) = self.attributes.get_attribute(item, LEVEL_ATTRIBUTE)? else {
            return Ok(None);
        };
        match raw.trim().parse::<u32>() {
            Ok(level) => Ok(Some(level)),
            Err(_) => {
                debug!(item, value = %raw, "ignoring non-numeric level attribute");
                Ok(None)
            }
        }
    }
}

impl EligibilityOracle for EligibilityGate {
    fn is_eligible(&self, account: &AccountId, minimum_level: u32) -> Result<bool, ExternalError> {
        if minimum_level == 0 {
            return Ok(true);
        }
        for item in self.registry.staked_items(account)? {
            let info = self.registry.staking_info(item)?;
            if !info.exists || info.owner != *account {
                continue;
            }
            if let Some(level) = self.item_level(item)? {
                if level >= minimum_level {
                    debug!(account = %account, item, level, minimum_level, "eligible");
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use mockall::predicate::eq;
    use scav_core::registry::{MemoryAttributeStore, MemoryStakingRegistry};
    use scav_core::types::StakingInfo;

    mock! {
        Registry {}
        impl StakingRegistry for Registry {
            fn staking_info(&self, item: ItemId) -> Result<StakingInfo, ExternalError>;
            fn staked_items(&self, owner: &AccountId) -> Result<Vec<ItemId>, ExternalError>;
        }
    }

    mock! {
        Attributes {}
        impl AttributeStore for Attributes {
            fn get_attribute(&self, item: ItemId, key: &str) -> Result<Option<String>, ExternalError>;
        }
    }

    const ALICE: AccountId = AccountId::repeat_byte(0xA1);
    const BOB: AccountId = AccountId::repeat_byte(0xB0);

    fn fixture() -> (Arc<MemoryStakingRegistry>, Arc<MemoryAttributeStore>, EligibilityGate) {
        let registry = Arc::new(MemoryStakingRegistry::new());
        let attributes = Arc::new(MemoryAttributeStore::new());
        let gate = EligibilityGate::new(registry.clone(), attributes.clone());
        (registry, attributes, gate)
    }

    #[test]
    fn level_zero_passes_without_items() {
        let (_, _, gate) = fixture();
        assert!(gate.is_eligible(&ALICE, 0).unwrap());
    }

    #[test]
    fn level_zero_skips_collaborators() {
        let mut registry = MockRegistry::new();
        registry.expect_staked_items().never();
        let mut attributes = MockAttributes::new();
        attributes.expect_get_attribute().never();
        let gate = EligibilityGate::new(Arc::new(registry), Arc::new(attributes));
        assert!(gate.is_eligible(&ALICE, 0).unwrap());
    }

    #[test]
    fn no_staked_items_not_eligible() {
        let (_, attributes, gate) = fixture();
        attributes.set_attribute(1, LEVEL_ATTRIBUTE, "5");
        assert!(!gate.is_eligible(&ALICE, 1).unwrap());
    }

    #[test]
    fn level_threshold() {
        let (registry, attributes, gate) = fixture();
        registry.stake(1, ALICE, 10);
        attributes.set_attribute(1, LEVEL_ATTRIBUTE, "1");
        assert!(gate.is_eligible(&ALICE, 1).unwrap());
        assert!(!gate.is_eligible(&ALICE, 2).unwrap());

        registry.stake(2, ALICE, 11);
        attributes.set_attribute(2, LEVEL_ATTRIBUTE, "2");
        assert!(gate.is_eligible(&ALICE, 2).unwrap());
    }

    #[test]
    fn other_owners_items_do_not_count() {
        let (registry, attributes, gate) = fixture();
        registry.stake(1, BOB, 10);
        attributes.set_attribute(1, LEVEL_ATTRIBUTE, "9");
        assert!(!gate.is_eligible(&ALICE, 1).unwrap());
        assert!(gate.is_eligible(&BOB, 9).unwrap());
    }

    #[test]
    fn unstaked_item_stops_counting() {
        let (registry, attributes, gate) = fixture();
        registry.stake(1, ALICE, 10);
        attributes.set_attribute(1, LEVEL_ATTRIBUTE, "3");
        assert!(gate.is_eligible(&ALICE, 3).unwrap());
        registry.unstake(1);
        assert!(!gate.is_eligible(&ALICE, 3).unwrap());
    }

    #[test]
    fn non_numeric_level_ignored() {
        let (registry, attributes, gate) = fixture();
        registry.stake(1, ALICE, 10);
        attributes.set_attribute(1, LEVEL_ATTRIBUTE, "high");
        assert_eq!(gate.item_level(1).unwrap(), None);
        assert!(!gate.is_eligible(&ALICE, 1).unwrap());
    }

    #[test]
    fn stale_registry_record_skipped() {
        let mut registry = MockRegistry::new();
        registry
            .expect_staked_items()
            .returning(|_| Ok(vec![4]));
        registry
            .expect_staking_info()
            .with(eq(4))
            .returning(|_| Ok(StakingInfo::default()));
        let mut attributes = MockAttributes::new();
        attributes.expect_get_attribute().never();
        let gate = EligibilityGate::new(Arc::new(registry), Arc::new(attributes));
        assert!(!gate.is_eligible(&ALICE, 1).unwrap());
    }

    #[test]
    fn registry_failure_propagates() {
        let mut registry = MockRegistry::new();
        registry
            .expect_staked_items()
            .returning(|_| Err(ExternalError::Registry("unreachable".into())));
        let gate = EligibilityGate::new(Arc::new(registry), Arc::new(MockAttributes::new()));
        assert_eq!(
            gate.is_eligible(&ALICE, 1),
            Err(ExternalError::Registry("unreachable".into()))
        );
    }
}
