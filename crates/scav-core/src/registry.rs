//! In-memory attribute store and non-fungible staking registry.
//!
//! Stand-ins for the external item metadata and item staking contracts.
//! Both are read-only from the pool's point of view; the mutators here exist
//! for fixtures and the simulator.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;

use crate::error::ExternalError;
use crate::traits::{AttributeStore, StakingRegistry};
use crate::types::{AccountId, BlockNumber, ItemId, StakingInfo};

/// String-keyed metadata per item.
#[derive(Debug, Default)]
pub struct MemoryAttributeStore {
    items: RwLock<HashMap<ItemId, HashMap<String, String>>>,
}

impl MemoryAttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single attribute, replacing any previous value.
    pub fn set_attribute(&self, item: ItemId, key: &str, value: &str) {
        self.items
            .write()
            .entry(item)
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    /// Set several attributes of one item at once.
    pub fn set_attributes(&self, item: ItemId, pairs: &[(&str, &str)]) {
        let mut items = self.items.write();
        let attrs = items.entry(item).or_default();
        for (key, value) in pairs {
            attrs.insert((*key).to_string(), (*value).to_string());
        }
    }
}

impl AttributeStore for MemoryAttributeStore {
    fn get_attribute(&self, item: ItemId, key: &str) -> Result<Option<String>, ExternalError> {
        Ok(self
            .items
            .read()
            .get(&item)
            .and_then(|attrs| attrs.get(key))
            .cloned())
    }
}

/// Which items are staked, by whom, and when.
#[derive(Debug, Default)]
pub struct MemoryStakingRegistry {
    records: RwLock<BTreeMap<ItemId, StakingInfo>>,
}

impl MemoryStakingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `item` as staked by `owner` at block `at`.
    pub fn stake(&self, item: ItemId, owner: AccountId, at: BlockNumber) {
        self.records.write().insert(
            item,
            StakingInfo {
                staked_block_number: at,
                play_block_number: at,
                owner,
                exists: true,
            },
        );
    }

    /// Remove `item` from the registry. Returns whether it was staked.
    pub fn unstake(&self, item: ItemId) -> bool {
        self.records.write().remove(&item).is_some()
    }
}

impl StakingRegistry for MemoryStakingRegistry {
    fn staking_info(&self, item: ItemId) -> Result<StakingInfo, ExternalError> {
        Ok(self.records.read().get(&item).cloned().unwrap_or_default())
    }

    fn staked_items(&self, owner: &AccountId) -> Result<Vec<ItemId>, ExternalError> {
        Ok(self
            .records
            .read()
            .iter()
            .filter(|(_, info)| info.exists && info.owner == *owner)
            .map(|(item, _)| *item)
            .collect())
    }
}
