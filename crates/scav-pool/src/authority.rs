//! Fixed admin allow-list.

use std::collections::BTreeSet;

use scav_core::error::ConfigError;
use scav_core::traits::Authority;
use scav_core::types::AccountId;

use crate::config::PoolConfig;

/// [`Authority`] granting admin rights to a fixed set of accounts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdminRoles {
    admins: BTreeSet<AccountId>,
}

impl AdminRoles {
    pub fn new(admins: impl IntoIterator<Item = AccountId>) -> Self {
        Self {
            admins: admins.into_iter().collect(),
        }
    }

    /// The allow-list named by `config.admins`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoAdmins`] if the list is empty.
    pub fn from_config(config: &PoolConfig) -> Result<Self, ConfigError> {
        if config.admins.is_empty() {
            return Err(ConfigError::NoAdmins);
        }
        Ok(Self::new(config.admins.iter().copied()))
    }

    pub fn admins(&self) -> impl Iterator<Item = &AccountId> {
        self.admins.iter()
    }

    pub fn len(&self) -> usize {
        self.admins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.admins.is_empty()
    }
}

impl Authority for AdminRoles {
    fn is_authorized(&self, caller: &AccountId) -> bool {
        self.admins.contains(caller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_listed_accounts_are_admins() {
        let admin = AccountId::repeat_byte(1);
        let roles = AdminRoles::new([admin, admin]);
        assert_eq!(roles.len(), 1);
        assert!(roles.is_authorized(&admin));
        assert!(!roles.is_authorized(&AccountId::repeat_byte(2)));
    }

    fn config_with(admins: Vec<AccountId>) -> PoolConfig {
        PoolConfig {
            admins,
            ..PoolConfig::open(
                "ORB".into(),
                "LAY".into(),
                AccountId::repeat_byte(0x50),
                AccountId::repeat_byte(0x7E),
                AccountId::ZERO,
            )
        }
    }

    #[test]
    fn roles_follow_config_admins() {
        let a = AccountId::repeat_byte(1);
        let b = AccountId::repeat_byte(2);
        let roles = AdminRoles::from_config(&config_with(vec![a, b])).unwrap();
        assert_eq!(roles.admins().copied().collect::<Vec<_>>(), vec![a, b]);
        assert!(roles.is_authorized(&b));
        assert!(!roles.is_authorized(&AccountId::ZERO));
    }

    #[test]
    fn config_without_admins_rejected() {
        assert_eq!(
            AdminRoles::from_config(&config_with(vec![])),
            Err(ConfigError::NoAdmins)
        );
    }

    #[test]
    fn empty_roles_authorize_nobody() {
        let roles = AdminRoles::default();
        assert!(roles.is_empty());
        assert!(!roles.is_authorized(&AccountId::ZERO));
    }
}
