//! Accessory Directory — identity key to live accessory.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use hcbridge_domain::accessory::Accessory;
use hcbridge_domain::capability::{Capability, CapabilityKind, CapabilitySubtype};
use hcbridge_domain::error::{BridgeError, NotFoundError};
use hcbridge_domain::facet::{Facet, FacetKind};
use hcbridge_domain::id::IdentityKey;

/// Every accessory the host currently knows about, keyed by identity.
///
/// One key maps to at most one accessory at any time.
#[derive(Debug, Default)]
pub struct AccessoryDirectory {
    accessories: HashMap<IdentityKey, Accessory>,
}

impl AccessoryDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the accessory stored under its key.
    pub fn insert(&mut self, accessory: Accessory) -> Option<Accessory> {
        self.accessories.insert(accessory.key().clone(), accessory)
    }

    #[must_use]
    pub fn get(&self, key: &IdentityKey) -> Option<&Accessory> {
        self.accessories.get(key)
    }

    pub fn get_mut(&mut self, key: &IdentityKey) -> Option<&mut Accessory> {
        self.accessories.get_mut(key)
    }

    pub fn remove(&mut self, key: &IdentityKey) -> Option<Accessory> {
        self.accessories.remove(key)
    }

    #[must_use]
    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.accessories.contains_key(key)
    }

    /// Snapshot of the current keys.
    #[must_use]
    pub fn keys(&self) -> HashSet<IdentityKey> {
        self.accessories.keys().cloned().collect()
    }

    /// Accessories sorted by key, for stable listings.
    #[must_use]
    pub fn sorted(&self) -> Vec<&Accessory> {
        let mut all: Vec<_> = self.accessories.values().collect();
        all.sort_by(|a, b| a.key().cmp(b.key()));
        all
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.accessories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accessories.is_empty()
    }

    /// Locate the capability `subtype` (optionally of `kind`) on `key`, and
    /// its facet of kind `facet`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] naming the first missing link.
    pub fn locate(
        &self,
        key: &IdentityKey,
        kind: Option<CapabilityKind>,
        subtype: &CapabilitySubtype,
        facet: FacetKind,
    ) -> Result<(Arc<Capability>, Arc<Facet>), BridgeError> {
        let accessory = self.get(key).ok_or_else(|| NotFoundError {
            entity: "Accessory",
            id: key.to_string(),
        })?;
        let capability = accessory
            .capability(kind, subtype)
            .ok_or_else(|| NotFoundError {
                entity: "Capability",
                id: format!("{key}/{subtype}"),
            })?;
        let found = capability.facet(facet).ok_or_else(|| NotFoundError {
            entity: "Facet",
            id: format!("{key}/{subtype}/{facet}"),
        })?;
        Ok((Arc::clone(capability), Arc::clone(found)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcbridge_domain::capability::CapabilityBlueprint;
    use hcbridge_domain::id::HubId;

    fn lamp() -> Accessory {
        let mut accessory = Accessory::new(IdentityKey::from_raw("Lamp1"), "Lamp").unwrap();
        accessory.add_missing(&[CapabilityBlueprint::new(
            CapabilityKind::Lightbulb,
            CapabilitySubtype::device(HubId::new(1)),
            &[FacetKind::On],
        )]);
        accessory
    }

    #[test]
    fn should_keep_one_accessory_per_key() {
        let mut directory = AccessoryDirectory::new();
        assert!(directory.insert(lamp()).is_none());
        assert!(directory.insert(lamp()).is_some());
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn should_locate_facet_through_accessory_and_capability() {
        let mut directory = AccessoryDirectory::new();
        directory.insert(lamp());
        let (capability, facet) = directory
            .locate(
                &IdentityKey::from_raw("Lamp1"),
                None,
                &CapabilitySubtype::device(HubId::new(1)),
                FacetKind::On,
            )
            .unwrap();
        assert_eq!(capability.kind(), CapabilityKind::Lightbulb);
        assert_eq!(facet.kind(), FacetKind::On);
    }

    #[test]
    fn should_return_not_found_when_accessory_is_unknown() {
        let directory = AccessoryDirectory::new();
        let result = directory.locate(
            &IdentityKey::from_raw("Ghost0"),
            None,
            &CapabilitySubtype::device(HubId::new(1)),
            FacetKind::On,
        );
        assert!(matches!(result, Err(BridgeError::NotFound(e)) if e.entity == "Accessory"));
    }

    #[test]
    fn should_return_not_found_when_facet_is_missing() {
        let mut directory = AccessoryDirectory::new();
        directory.insert(lamp());
        let result = directory.locate(
            &IdentityKey::from_raw("Lamp1"),
            None,
            &CapabilitySubtype::device(HubId::new(1)),
            FacetKind::Hue,
        );
        assert!(matches!(result, Err(BridgeError::NotFound(e)) if e.entity == "Facet"));
    }

    #[test]
    fn should_list_accessories_sorted_by_key() {
        let mut directory = AccessoryDirectory::new();
        directory.insert(Accessory::new(IdentityKey::from_raw("b"), "B").unwrap());
        directory.insert(Accessory::new(IdentityKey::from_raw("a"), "A").unwrap());
        let names: Vec<_> = directory.sorted().iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
