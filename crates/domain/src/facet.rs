//! Facet — a single readable/writable trait of a capability
//! (on/off, brightness, current temperature, …).
//!
//! A facet's [`FacetKind`] is the key into both dispatch tables. The facet
//! itself caches the last value pushed to the host.

mod value;

pub use value::FacetValue;

use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

macro_rules! facet_kinds {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Closed set of facet kinds the engine knows how to route.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum FacetKind {
            $($variant,)+
        }

        impl FacetKind {
            /// Every facet kind, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Stable snake-case name used on the wire and in the cache.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }
    };
}

facet_kinds! {
    On => "on",
    Brightness => "brightness",
    Hue => "hue",
    Saturation => "saturation",
    OutletInUse => "outlet_in_use",
    CurrentTemperature => "current_temperature",
    TargetTemperature => "target_temperature",
    CurrentHeatingCoolingState => "current_heating_cooling_state",
    TargetHeatingCoolingState => "target_heating_cooling_state",
    TemperatureDisplayUnits => "temperature_display_units",
    CurrentRelativeHumidity => "current_relative_humidity",
    CurrentAmbientLightLevel => "current_ambient_light_level",
    MotionDetected => "motion_detected",
    ContactSensorState => "contact_sensor_state",
    LeakDetected => "leak_detected",
    SmokeDetected => "smoke_detected",
    CurrentPosition => "current_position",
    TargetPosition => "target_position",
    PositionState => "position_state",
    CurrentHorizontalTiltAngle => "current_horizontal_tilt_angle",
    TargetHorizontalTiltAngle => "target_horizontal_tilt_angle",
    LockCurrentState => "lock_current_state",
    LockTargetState => "lock_target_state",
    SecuritySystemCurrentState => "security_system_current_state",
    SecuritySystemTargetState => "security_system_target_state",
    ProgrammableSwitchEvent => "programmable_switch_event",
    BatteryLevel => "battery_level",
    StatusLowBattery => "status_low_battery",
}

impl FacetKind {
    /// Push-button events fire and forget; they are never subscribed.
    #[must_use]
    pub fn is_fire_and_forget(self) -> bool {
        matches!(self, Self::ProgrammableSwitchEvent)
    }

    /// Whether hub values for this facet are temperatures subject to unit
    /// conversion.
    #[must_use]
    pub fn is_current_temperature(self) -> bool {
        matches!(self, Self::CurrentTemperature)
    }

    /// Heating/cooling mode facets (current or target).
    #[must_use]
    pub fn is_heating_cooling_mode(self) -> bool {
        matches!(
            self,
            Self::CurrentHeatingCoolingState | Self::TargetHeatingCoolingState
        )
    }

    /// Tilt-angle facets (current or target).
    #[must_use]
    pub fn is_tilt_angle(self) -> bool {
        matches!(
            self,
            Self::CurrentHorizontalTiltAngle | Self::TargetHorizontalTiltAngle
        )
    }
}

impl fmt::Display for FacetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacetKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownFacet(s.to_string()))
    }
}

/// A facet instance owned by one capability.
#[derive(Debug)]
pub struct Facet {
    kind: FacetKind,
    value: Mutex<FacetValue>,
}

impl Facet {
    /// Create a facet with no known value yet.
    #[must_use]
    pub fn new(kind: FacetKind) -> Self {
        Self {
            kind,
            value: Mutex::new(FacetValue::Null),
        }
    }

    /// The facet kind.
    #[must_use]
    pub fn kind(&self) -> FacetKind {
        self.kind
    }

    /// The last value cached for the host.
    #[must_use]
    pub fn value(&self) -> FacetValue {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the cached value, returning `true` when it changed.
    pub fn update(&self, value: FacetValue) -> bool {
        let mut current = self.value.lock().unwrap_or_else(PoisonError::into_inner);
        if *current == value {
            return false;
        }
        *current = value;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_roundtrip_every_kind_through_name() {
        for kind in FacetKind::ALL {
            let parsed: FacetKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, *kind);
        }
    }

    #[test]
    fn should_serialize_kind_as_snake_case() {
        let json = serde_json::to_string(&FacetKind::CurrentTemperature).unwrap();
        assert_eq!(json, "\"current_temperature\"");
    }

    #[test]
    fn should_reject_unknown_kind_name() {
        let result = FacetKind::from_str("warp_drive");
        assert!(matches!(result, Err(ValidationError::UnknownFacet(_))));
    }

    #[test]
    fn should_start_with_null_value() {
        let facet = Facet::new(FacetKind::On);
        assert_eq!(facet.value(), FacetValue::Null);
    }

    #[test]
    fn should_report_change_only_when_value_differs() {
        let facet = Facet::new(FacetKind::On);
        assert!(facet.update(FacetValue::Bool(true)));
        assert!(!facet.update(FacetValue::Bool(true)));
        assert!(facet.update(FacetValue::Bool(false)));
        assert_eq!(facet.value(), FacetValue::Bool(false));
    }

    #[test]
    fn should_classify_mode_and_tilt_kinds() {
        assert!(FacetKind::TargetHeatingCoolingState.is_heating_cooling_mode());
        assert!(FacetKind::CurrentHorizontalTiltAngle.is_tilt_angle());
        assert!(!FacetKind::On.is_tilt_angle());
        assert!(FacetKind::ProgrammableSwitchEvent.is_fire_and_forget());
    }
}
