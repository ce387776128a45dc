//! Typed identifiers: numeric hub ids and the accessory identity key.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_hub_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw numeric id as reported by the hub.
            #[must_use]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Access the raw numeric id.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}

define_hub_id!(
    /// Identifier of a [`Device`](crate::device::Device) on the hub.
    HubId
);

define_hub_id!(
    /// Identifier of a room on the hub.
    RoomId
);

define_hub_id!(
    /// Identifier of a scene on the hub.
    SceneId
);

/// Namespace for accessory UUIDs derived from identity keys.
const ACCESSORY_NAMESPACE: uuid::Uuid = uuid::Uuid::from_u128(0x6c1f_5a4e_2b7d_4e0a_9c38_51d2_7a90_b3e1);

/// Stable identity of an accessory ("unique seed"): the display name
/// immediately followed by the room id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Derive the key for an accessory named `name` living in `room`.
    #[must_use]
    pub fn from_parts(name: &str, room: RoomId) -> Self {
        Self(format!("{name}{room}"))
    }

    /// Wrap an already-derived key (e.g. read back from the cache).
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Deterministic UUID presented to the host for this accessory.
    #[must_use]
    pub fn accessory_uuid(&self) -> uuid::Uuid {
        uuid::Uuid::new_v5(&ACCESSORY_NAMESPACE, self.0.as_bytes())
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
