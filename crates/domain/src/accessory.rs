//! Accessory — the host-side unit identified by an [`IdentityKey`].
//!
//! ## Lifecycle
//! - Created the first time reconciliation sees its key, or rehydrated from
//!   the accessory cache at startup.
//! - Its capabilities are rebuilt on every reconciliation pass: stale ones
//!   are removed, missing ones added.
//! - Dropped when a pass completes without touching its key.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::capability::{Capability, CapabilityBlueprint, CapabilityKind, CapabilitySubtype};
use crate::error::ValidationError;
use crate::facet::FacetKind;
use crate::id::{IdentityKey, RoomId};

/// What the accessory factory produces for one hub device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessoryBundle {
    pub name: String,
    pub room: RoomId,
    pub capabilities: Vec<CapabilityBlueprint>,
}

impl AccessoryBundle {
    /// The identity key the bundle maps to.
    #[must_use]
    pub fn key(&self) -> IdentityKey {
        IdentityKey::from_parts(&self.name, self.room)
    }
}

/// A live accessory held in the directory.
#[derive(Debug, Clone)]
pub struct Accessory {
    key: IdentityKey,
    name: String,
    uuid: Uuid,
    capabilities: Vec<Arc<Capability>>,
}

impl Accessory {
    /// Create an accessory with no capabilities.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] if `name` is blank.
    pub fn new(key: IdentityKey, name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(Self {
            uuid: key.accessory_uuid(),
            key,
            name,
            capabilities: Vec::new(),
        })
    }

    #[must_use]
    pub fn key(&self) -> &IdentityKey {
        &self.key
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    #[must_use]
    pub fn capabilities(&self) -> &[Arc<Capability>] {
        &self.capabilities
    }

    /// Find a capability by kind and subtype.
    #[must_use]
    pub fn capability(
        &self,
        kind: Option<CapabilityKind>,
        subtype: &CapabilitySubtype,
    ) -> Option<&Arc<Capability>> {
        self.capabilities
            .iter()
            .find(|c| c.subtype() == subtype && kind.is_none_or(|k| c.kind() == k))
    }

    /// Remove capabilities absent from `wanted`, returning them.
    pub fn remove_stale(&mut self, wanted: &[CapabilityBlueprint]) -> Vec<Arc<Capability>> {
        let (kept, removed): (Vec<_>, Vec<_>) = std::mem::take(&mut self.capabilities)
            .into_iter()
            .partition(|c| wanted.iter().any(|b| c.matches(b)));
        self.capabilities = kept;
        removed
    }

    /// Add capabilities from `wanted` not yet present, returning the new ones.
    pub fn add_missing(&mut self, wanted: &[CapabilityBlueprint]) -> Vec<Arc<Capability>> {
        let mut added = Vec::new();
        for blueprint in wanted {
            if self.capabilities.iter().any(|c| c.matches(blueprint)) {
                continue;
            }
            let capability = Arc::new(blueprint.build());
            self.capabilities.push(Arc::clone(&capability));
            added.push(capability);
        }
        added
    }

    /// Persistable form for the accessory cache.
    #[must_use]
    pub fn to_record(&self) -> CachedAccessory {
        CachedAccessory {
            key: self.key.clone(),
            name: self.name.clone(),
            uuid: self.uuid,
            capabilities: self
                .capabilities
                .iter()
                .map(|c| CachedCapability {
                    kind: c.kind(),
                    subtype: c.subtype().to_string(),
                    facets: c.facets().iter().map(|f| f.kind()).collect(),
                })
                .collect(),
        }
    }

    /// Rehydrate from a cache record, parsing every subtype once.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the name is empty or a subtype is
    /// malformed.
    pub fn from_record(record: CachedAccessory) -> Result<Self, ValidationError> {
        let mut accessory = Self::new(record.key, record.name)?;
        accessory.uuid = record.uuid;
        for cached in record.capabilities {
            let subtype = CapabilitySubtype::parse(&cached.subtype)?;
            accessory
                .capabilities
                .push(Arc::new(Capability::new(cached.kind, subtype, &cached.facets)));
        }
        Ok(accessory)
    }
}

/// An accessory as stored in the external cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedAccessory {
    pub key: IdentityKey,
    pub name: String,
    pub uuid: Uuid,
    pub capabilities: Vec<CachedCapability>,
}

/// A capability as stored in the external cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedCapability {
    pub kind: CapabilityKind,
    pub subtype: String,
    pub facets: Vec<FacetKind>,
}
