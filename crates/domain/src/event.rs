//! Facet change events — an immutable record that a facet's cached value
//! changed, published for observers of the host surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::facet::{FacetKind, FacetValue};
use crate::id::IdentityKey;

/// UTC timestamp attached to events.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Who caused a facet value to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOrigin {
    /// A delta or out-of-band refresh from the hub.
    Hub,
    /// A write issued by the host.
    Host,
}

/// A facet's cached value changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetChanged {
    pub id: Uuid,
    pub key: IdentityKey,
    /// Capability subtype in its string form.
    pub subtype: String,
    pub facet: FacetKind,
    pub value: FacetValue,
    pub origin: ChangeOrigin,
    pub timestamp: Timestamp,
}

impl FacetChanged {
    #[must_use]
    pub fn new(
        key: IdentityKey,
        subtype: String,
        facet: FacetKind,
        value: FacetValue,
        origin: ChangeOrigin,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            key,
            subtype,
            facet,
            value,
            origin,
            timestamp: now(),
        }
    }
}
