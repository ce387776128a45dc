//! Hub-side read-only snapshots: devices, scenes and global variables.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::id::{HubId, RoomId, SceneId};
use crate::snapshot::PropertySnapshot;

/// Prefix marking a device as internal to the hub (never exposed).
pub const HIDDEN_PREFIX: char = '_';

/// A device as listed by the hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: HubId,
    /// Grouping key: devices sharing a parent are siblings.
    #[serde(rename = "parentId", default)]
    pub parent_id: HubId,
    #[serde(rename = "type", default)]
    pub type_tag: String,
    #[serde(default)]
    pub visible: bool,
    pub name: String,
    #[serde(rename = "roomID", default)]
    pub room_id: RoomId,
    #[serde(default)]
    pub properties: PropertySnapshot,
}

impl Device {
    /// Devices whose name starts with the hidden prefix are hub-internal.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.name.starts_with(HIDDEN_PREFIX)
    }

    /// Visible and not internal: the only devices that become accessories.
    #[must_use]
    pub fn is_exposed(&self) -> bool {
        self.visible && !self.is_internal()
    }
}

/// Sibling devices keyed by type tag. When two siblings share a tag the one
/// listed last by the hub wins.
pub type Siblings = HashMap<String, Device>;

/// Other exposed devices sharing `device`'s parent, excluding `device` itself.
#[must_use]
pub fn find_siblings(device: &Device, all: &[Device]) -> Siblings {
    all.iter()
        .filter(|other| other.is_exposed())
        .filter(|other| other.parent_id == device.parent_id && other.id != device.id)
        .map(|other| (other.type_tag.clone(), other.clone()))
        .collect()
}

/// A hub scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub id: SceneId,
    pub name: String,
}

/// Scene name to id lookup.
#[derive(Debug, Clone, Default)]
pub struct SceneDirectory(HashMap<String, SceneId>);

impl SceneDirectory {
    #[must_use]
    pub fn from_scenes(scenes: &[Scene]) -> Self {
        Self(scenes.iter().map(|s| (s.name.clone(), s.id)).collect())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<SceneId> {
        self.0.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A named hub variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalVariable {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl GlobalVariable {
    /// Interpret the variable as a bistable switch.
    #[must_use]
    pub fn as_bool(&self) -> bool {
        matches!(self.value.trim(), "true" | "1" | "on")
    }
}
