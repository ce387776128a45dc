//! Subscriptions: bindings from a hub-side property to a capability facet,
//! and the bind-phase rule table that picks the watched property.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::capability::{Capability, CapabilityKind};
use crate::facet::{Facet, FacetKind};
use crate::id::{HubId, IdentityKey};

/// The hub-side property a subscription listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WatchedProperty {
    /// The generic primary value.
    #[serde(rename = "value")]
    Value,
    /// The secondary value (tilt angles).
    #[serde(rename = "value2")]
    Secondary,
    /// Thermostat pending setpoint, carrying the current temperature.
    #[serde(rename = "heatingThermostatSetpointFuture")]
    PendingSetpoint,
    /// Thermostat target setpoint.
    #[serde(rename = "heatingThermostatSetpoint")]
    Setpoint,
    /// Operating mode; only fired by hub mode-change events.
    #[serde(rename = "mode")]
    Mode,
    /// Color string.
    #[serde(rename = "color")]
    Color,
}

impl WatchedProperty {
    /// Hub-side property name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::Secondary => "value2",
            Self::PendingSetpoint => "heatingThermostatSetpointFuture",
            Self::Setpoint => "heatingThermostatSetpoint",
            Self::Mode => "mode",
            Self::Color => "color",
        }
    }

    /// Pick the property `facet` of `capability` watches.
    ///
    /// Rules apply most specific first. Returns `None` for facets that are
    /// never subscribed: virtual capabilities, the security system and
    /// global-variable switches (both refreshed out-of-band every poll), and
    /// fire-and-forget facets.
    #[must_use]
    pub fn for_facet(capability: &Capability, facet: FacetKind) -> Option<Self> {
        let subtype = capability.subtype();
        if subtype.is_virtual()
            || subtype.is_security_system()
            || subtype.is_global_variable_switch()
            || facet.is_fire_and_forget()
        {
            return None;
        }
        let kind = capability.kind();
        let property = if kind == CapabilityKind::Thermostat && facet.is_current_temperature() {
            Self::PendingSetpoint
        } else if facet == FacetKind::TargetTemperature {
            Self::Setpoint
        } else if facet.is_heating_cooling_mode() {
            Self::Mode
        } else if kind == CapabilityKind::WindowCovering && facet.is_tilt_angle() {
            Self::Secondary
        } else if subtype.color_marker {
            Self::Color
        } else {
            Self::Value
        };
        Some(property)
    }
}

impl fmt::Display for WatchedProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One binding: when `property` of `device_id` changes, re-resolve `facet`.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub device_id: HubId,
    /// Owning accessory.
    pub key: IdentityKey,
    pub capability: Arc<Capability>,
    pub facet: Arc<Facet>,
    pub property: WatchedProperty,
}

impl Subscription {
    /// Whether a change of `property` on `device` fires this subscription.
    #[must_use]
    pub fn matches_change(&self, device: HubId, property: WatchedProperty) -> bool {
        self.device_id == device && self.property == property
    }

    /// Whether a mode-change event for operating-mode device `mode_id`
    /// fires this subscription.
    #[must_use]
    pub fn matches_mode(&self, mode_id: HubId) -> bool {
        self.property == WatchedProperty::Mode
            && self.capability.subtype().operating_mode_id == Some(mode_id)
    }
}
