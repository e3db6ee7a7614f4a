/*!
 * Pin Registry
 * Named, externally addressable stores that outlive program attachments
 */

use super::config::ConfigStore;
use super::membership::MembershipStore;
use crate::core::errors::{StoreError, StoreResult};
use ahash::RandomState;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{debug, info};
use std::sync::Arc;

/// A store pinned under a name
#[derive(Clone)]
enum PinnedMap {
    Membership(Arc<MembershipStore>),
    Config(Arc<ConfigStore>),
}

/// Store handles an evaluator receives at call time
#[derive(Clone, Debug)]
pub struct PolicyMaps {
    pub membership: Arc<MembershipStore>,
    pub config: Arc<ConfigStore>,
}

impl PolicyMaps {
    pub fn new(membership: Arc<MembershipStore>, config: Arc<ConfigStore>) -> Self {
        Self { membership, config }
    }

    /// Fresh, unpinned stores
    pub fn detached() -> Self {
        Self::new(
            Arc::new(MembershipStore::new()),
            Arc::new(ConfigStore::new()),
        )
    }
}

impl Default for PolicyMaps {
    fn default() -> Self {
        Self::detached()
    }
}

/// Registry of pinned stores, keyed by name
#[derive(Clone)]
pub struct PinRegistry {
    pins: Arc<DashMap<String, PinnedMap, RandomState>>,
}

impl PinRegistry {
    pub fn new() -> Self {
        Self {
            pins: Arc::new(DashMap::with_hasher(RandomState::new())),
        }
    }

    /// Get or create the membership table pinned at `name`
    pub fn membership(&self, name: &str) -> StoreResult<Arc<MembershipStore>> {
        match self.pins.entry(name.to_string()) {
            Entry::Occupied(entry) => match entry.get() {
                PinnedMap::Membership(store) => {
                    debug!("Reusing pinned membership map: {}", name);
                    Ok(Arc::clone(store))
                }
                PinnedMap::Config(_) => Err(StoreError::MapTypeMismatch {
                    name: name.to_string(),
                }),
            },
            Entry::Vacant(entry) => {
                let store = Arc::new(MembershipStore::new());
                entry.insert(PinnedMap::Membership(Arc::clone(&store)));
                info!("Pinned membership map: {}", name);
                Ok(store)
            }
        }
    }

    /// Get or create the configuration table pinned at `name`
    pub fn config(&self, name: &str) -> StoreResult<Arc<ConfigStore>> {
        match self.pins.entry(name.to_string()) {
            Entry::Occupied(entry) => match entry.get() {
                PinnedMap::Config(store) => {
                    debug!("Reusing pinned config map: {}", name);
                    Ok(Arc::clone(store))
                }
                PinnedMap::Membership(_) => Err(StoreError::MapTypeMismatch {
                    name: name.to_string(),
                }),
            },
            Entry::Vacant(entry) => {
                let store = Arc::new(ConfigStore::new());
                entry.insert(PinnedMap::Config(Arc::clone(&store)));
                info!("Pinned config map: {}", name);
                Ok(store)
            }
        }
    }

    /// Both stores an evaluator needs
    pub fn policy_maps(&self, membership: &str, config: &str) -> StoreResult<PolicyMaps> {
        Ok(PolicyMaps::new(self.membership(membership)?, self.config(config)?))
    }

    /// Remove a pin; holders of the handle keep their copy alive
    pub fn unpin(&self, name: &str) -> bool {
        let removed = self.pins.remove(name).is_some();
        if removed {
            info!("Unpinned map: {}", name);
        }
        removed
    }

    pub fn is_pinned(&self, name: &str) -> bool {
        self.pins.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.pins.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }
}

impl Default for PinRegistry {
    fn default() -> Self {
        Self::new()
    }
}
