//! Resolver ports — the per-facet-kind value logic the dispatch tables route to.
//!
//! Resolvers are synchronous and pure: the engine does the fetching before a
//! read and executes the returned [`HubCommand`]s after a write.

use hcbridge_domain::capability::Capability;
use hcbridge_domain::error::BridgeError;
use hcbridge_domain::facet::{Facet, FacetValue};
use hcbridge_domain::id::HubId;
use hcbridge_domain::snapshot::PropertySnapshot;

/// Input of a read resolver.
#[derive(Debug, Clone, Copy)]
pub struct ReadRequest<'a> {
    /// Owning capability (for subtype and cached auxiliary state).
    pub capability: &'a Capability,
    pub facet: &'a Facet,
    /// Fetched from the hub, or synthesized from a delta.
    pub snapshot: &'a PropertySnapshot,
}

/// Computes a facet value from a property snapshot.
pub trait ReadResolver: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`BridgeError`] if the snapshot cannot be turned into a
    /// value for this facet.
    fn resolve(&self, request: &ReadRequest<'_>) -> Result<FacetValue, BridgeError>;
}

impl<F> ReadResolver for F
where
    F: Fn(&ReadRequest<'_>) -> Result<FacetValue, BridgeError> + Send + Sync,
{
    fn resolve(&self, request: &ReadRequest<'_>) -> Result<FacetValue, BridgeError> {
        self(request)
    }
}

/// Input of a write resolver.
#[derive(Debug, Clone, Copy)]
pub struct WriteRequest<'a> {
    pub capability: &'a Capability,
    pub facet: &'a Facet,
    /// The raw value written by the host.
    pub value: &'a FacetValue,
}

/// Turns a host write into the hub commands that apply it.
pub trait WriteResolver: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`BridgeError`] if the value is not acceptable for this
    /// facet.
    fn resolve(&self, request: &WriteRequest<'_>) -> Result<Vec<HubCommand>, BridgeError>;
}

impl<F> WriteResolver for F
where
    F: Fn(&WriteRequest<'_>) -> Result<Vec<HubCommand>, BridgeError> + Send + Sync,
{
    fn resolve(&self, request: &WriteRequest<'_>) -> Result<Vec<HubCommand>, BridgeError> {
        self(request)
    }
}

/// A side effect on the hub.
#[derive(Debug, Clone, PartialEq)]
pub enum HubCommand {
    /// Invoke a device action (`turnOn`, `setValue`, …).
    Action {
        device: HubId,
        action: String,
        args: Vec<serde_json::Value>,
    },
    /// Overwrite a global variable.
    SetVariable { name: String, value: String },
    /// Start the scene with this name.
    StartScene { name: String },
}

impl HubCommand {
    /// Shorthand for an [`HubCommand::Action`].
    #[must_use]
    pub fn action(device: HubId, action: &str, args: Vec<serde_json::Value>) -> Self {
        Self::Action {
            device,
            action: action.to_string(),
            args,
        }
    }
}
