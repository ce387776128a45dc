//! Subscription Registry — the bindings the Update Dispatcher scans.
//!
//! Bindings are appended at bind time and never mutated. Binding the same
//! capability object twice appends twice: every matching entry fires.
//! Entries are pruned explicitly when their capability is removed as stale
//! or their accessory is dropped.

use std::sync::Arc;

use hcbridge_domain::capability::Capability;
use hcbridge_domain::id::{HubId, IdentityKey};
use hcbridge_domain::subscription::{Subscription, WatchedProperty};

#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    entries: Vec<Subscription>,
}

impl SubscriptionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every subscribable facet of `capability`, owned by accessory
    /// `key`. Returns the number of entries appended.
    pub fn bind(&mut self, key: &IdentityKey, capability: &Arc<Capability>) -> usize {
        let Some(device_id) = capability.subtype().device_id() else {
            return 0;
        };
        let before = self.entries.len();
        for facet in capability.facets() {
            let Some(property) = WatchedProperty::for_facet(capability, facet.kind()) else {
                continue;
            };
            tracing::trace!(%device_id, %key, facet = %facet.kind(), %property, "bound facet");
            self.entries.push(Subscription {
                device_id,
                key: key.clone(),
                capability: Arc::clone(capability),
                facet: Arc::clone(facet),
                property,
            });
        }
        self.entries.len() - before
    }

    /// Drop every entry owned by accessory `key`. Returns how many went.
    pub fn prune_accessory(&mut self, key: &IdentityKey) -> usize {
        let before = self.entries.len();
        self.entries.retain(|s| &s.key != key);
        before - self.entries.len()
    }

    /// Drop every entry bound to this exact capability object.
    pub fn prune_capability(&mut self, capability: &Arc<Capability>) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|s| !Arc::ptr_eq(&s.capability, capability));
        before - self.entries.len()
    }

    /// Entries fired by a change of `property` on `device`, in bind order.
    #[must_use]
    pub fn matching_change(&self, device: HubId, property: WatchedProperty) -> Vec<Subscription> {
        self.entries
            .iter()
            .filter(|s| s.matches_change(device, property))
            .cloned()
            .collect()
    }

    /// Entries fired by a mode change of operating-mode device `mode_id`.
    #[must_use]
    pub fn matching_mode(&self, mode_id: HubId) -> Vec<Subscription> {
        self.entries
            .iter()
            .filter(|s| s.matches_mode(mode_id))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn entries(&self) -> &[Subscription] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
