//! Capability — a functional unit of an accessory (a switch, a thermostat, …).
//!
//! Every capability carries a [`CapabilitySubtype`]: the structured identity
//! of the hub-side object it mirrors. The subtype is parsed once and never
//! changes for the lifetime of the capability.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::facet::{Facet, FacetKind};
use crate::id::HubId;

macro_rules! capability_kinds {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Closed set of capability kinds.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum CapabilityKind {
            $($variant,)+
        }

        impl CapabilityKind {
            /// Every capability kind, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Stable snake-case name.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }
    };
}

capability_kinds! {
    Switch => "switch",
    Outlet => "outlet",
    Lightbulb => "lightbulb",
    TemperatureSensor => "temperature_sensor",
    HumiditySensor => "humidity_sensor",
    LightSensor => "light_sensor",
    MotionSensor => "motion_sensor",
    ContactSensor => "contact_sensor",
    LeakSensor => "leak_sensor",
    SmokeSensor => "smoke_sensor",
    WindowCovering => "window_covering",
    Thermostat => "thermostat",
    LockMechanism => "lock_mechanism",
    SecuritySystem => "security_system",
    StatelessProgrammableSwitch => "stateless_programmable_switch",
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapabilityKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownCapability(s.to_string()))
    }
}

/// What hub-side object a capability is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceRef {
    /// A regular hub device.
    Device(HubId),
    /// The hub's security system (encoded as `0`).
    SecuritySystem,
    /// A named global variable acting as a switch (encoded as `G`).
    GlobalVariable,
}

impl fmt::Display for DeviceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device(id) => id.fmt(f),
            Self::SecuritySystem => f.write_str("0"),
            Self::GlobalVariable => f.write_str("G"),
        }
    }
}

const COLOR_MARKER: &str = "RGB";

/// Escape the segment separator (and the escape character itself) in a
/// free-text segment.
fn escape_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '%' => out.push_str("%25"),
            '-' => out.push_str("%2D"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(at) = rest.find('%') {
        out.push_str(&rest[..at]);
        let tail = &rest[at..];
        if let Some(after) = tail.strip_prefix("%2D").or_else(|| tail.strip_prefix("%2d")) {
            out.push('-');
            rest = after;
        } else if let Some(after) = tail.strip_prefix("%25") {
            out.push('%');
            rest = after;
        } else {
            out.push('%');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// Structured identity of a capability.
///
/// Its string form (`device-button-RGB-mode-secondary`) is the one stored in
/// the accessory cache; [`CapabilitySubtype::parse`] is the only place that
/// reads it. `-` and `%` inside the button and secondary segments are written
/// as `%2D` and `%25`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CapabilitySubtype {
    pub device: DeviceRef,
    /// Virtual button id; for global-variable switches, the variable name.
    pub virtual_button_id: Option<String>,
    pub color_marker: bool,
    pub operating_mode_id: Option<HubId>,
    pub secondary_device_id: Option<String>,
}

impl CapabilitySubtype {
    /// Subtype of a plain capability bound to `device`.
    #[must_use]
    pub fn device(device: HubId) -> Self {
        Self {
            device: DeviceRef::Device(device),
            virtual_button_id: None,
            color_marker: false,
            operating_mode_id: None,
            secondary_device_id: None,
        }
    }

    /// Subtype of the security-system capability.
    #[must_use]
    pub fn security_system() -> Self {
        Self {
            device: DeviceRef::SecuritySystem,
            ..Self::device(HubId::new(0))
        }
    }

    /// Subtype of the switch backed by global variable `name`.
    #[must_use]
    pub fn global_variable(name: &str) -> Self {
        Self {
            device: DeviceRef::GlobalVariable,
            virtual_button_id: Some(name.to_string()),
            ..Self::device(HubId::new(0))
        }
    }

    #[must_use]
    pub fn with_virtual_button(mut self, button: impl Into<String>) -> Self {
        self.virtual_button_id = Some(button.into());
        self
    }

    #[must_use]
    pub fn with_color_marker(mut self) -> Self {
        self.color_marker = true;
        self
    }

    #[must_use]
    pub fn with_operating_mode(mut self, id: HubId) -> Self {
        self.operating_mode_id = Some(id);
        self
    }

    #[must_use]
    pub fn with_secondary_device(mut self, id: impl Into<String>) -> Self {
        self.secondary_device_id = Some(id.into());
        self
    }

    /// Parse the cached string form.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MalformedSubtype`] if the device segment is
    /// neither `G` nor a numeric id, or the operating-mode segment is not
    /// numeric.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let malformed = || ValidationError::MalformedSubtype(raw.to_string());
        let mut parts = raw.splitn(5, '-');
        let device = match parts.next().unwrap_or_default() {
            "G" => DeviceRef::GlobalVariable,
            "0" => DeviceRef::SecuritySystem,
            id => DeviceRef::Device(id.parse().map_err(|_| malformed())?),
        };
        let non_empty = |part: Option<&str>| part.filter(|p| !p.is_empty()).map(unescape_segment);
        let virtual_button_id = non_empty(parts.next());
        let color_marker = parts.next() == Some(COLOR_MARKER);
        let operating_mode_id = match non_empty(parts.next()) {
            Some(id) => Some(id.parse().map_err(|_| malformed())?),
            None => None,
        };
        let secondary_device_id = non_empty(parts.next());
        Ok(Self {
            device,
            virtual_button_id,
            color_marker,
            operating_mode_id,
            secondary_device_id,
        })
    }

    /// The hub device id, if this capability mirrors a regular device.
    #[must_use]
    pub fn device_id(&self) -> Option<HubId> {
        match self.device {
            DeviceRef::Device(id) => Some(id),
            DeviceRef::SecuritySystem | DeviceRef::GlobalVariable => None,
        }
    }

    /// Momentary capabilities never receive push updates and read as inactive.
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.virtual_button_id.is_some()
    }

    #[must_use]
    pub fn is_security_system(&self) -> bool {
        self.device == DeviceRef::SecuritySystem
    }

    #[must_use]
    pub fn is_global_variable_switch(&self) -> bool {
        self.device == DeviceRef::GlobalVariable
    }

    /// The global variable backing this switch, if it is one.
    #[must_use]
    pub fn global_variable_name(&self) -> Option<&str> {
        if self.is_global_variable_switch() {
            self.virtual_button_id.as_deref()
        } else {
            None
        }
    }
}

impl fmt::Display for CapabilitySubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}-{}",
            self.device,
            escape_segment(self.virtual_button_id.as_deref().unwrap_or_default()),
            if self.color_marker { COLOR_MARKER } else { "" },
            self.operating_mode_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            escape_segment(self.secondary_device_id.as_deref().unwrap_or_default()),
        )
    }
}

impl FromStr for CapabilitySubtype {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A color in HSV space as presented to the host.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Hsv {
    /// Hue in degrees, `0..360`.
    pub hue: f64,
    /// Saturation in percent.
    pub saturation: f64,
    /// Value (brightness) in percent.
    pub value: f64,
}

/// Mutable per-capability state resolvers may rely on between calls.
#[derive(Debug, Clone, Default)]
pub struct AuxState {
    pub color: Option<Hsv>,
    /// Last hub code reported by the operating-mode device.
    pub operating_mode: Option<i64>,
}

/// What a factory asks for: kind, subtype and the facet kinds to expose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityBlueprint {
    pub kind: CapabilityKind,
    pub subtype: CapabilitySubtype,
    pub facets: Vec<FacetKind>,
}

impl CapabilityBlueprint {
    #[must_use]
    pub fn new(kind: CapabilityKind, subtype: CapabilitySubtype, facets: &[FacetKind]) -> Self {
        Self {
            kind,
            subtype,
            facets: facets.to_vec(),
        }
    }

    /// Materialize a fresh capability with empty facets.
    #[must_use]
    pub fn build(&self) -> Capability {
        Capability::new(self.kind, self.subtype.clone(), &self.facets)
    }
}

/// A live capability attached to an accessory.
#[derive(Debug)]
pub struct Capability {
    kind: CapabilityKind,
    subtype: CapabilitySubtype,
    facets: Vec<Arc<Facet>>,
    aux: Mutex<AuxState>,
}

impl Capability {
    #[must_use]
    pub fn new(kind: CapabilityKind, subtype: CapabilitySubtype, facets: &[FacetKind]) -> Self {
        let aux = AuxState {
            color: subtype.color_marker.then(Hsv::default),
            operating_mode: None,
        };
        Self {
            kind,
            subtype,
            facets: facets.iter().map(|k| Arc::new(Facet::new(*k))).collect(),
            aux: Mutex::new(aux),
        }
    }

    #[must_use]
    pub fn kind(&self) -> CapabilityKind {
        self.kind
    }

    #[must_use]
    pub fn subtype(&self) -> &CapabilitySubtype {
        &self.subtype
    }

    #[must_use]
    pub fn facets(&self) -> &[Arc<Facet>] {
        &self.facets
    }

    /// Find the facet of the given kind.
    #[must_use]
    pub fn facet(&self, kind: FacetKind) -> Option<&Arc<Facet>> {
        self.facets.iter().find(|f| f.kind() == kind)
    }

    /// Whether this capability has the same identity as `blueprint`.
    #[must_use]
    pub fn matches(&self, blueprint: &CapabilityBlueprint) -> bool {
        self.kind == blueprint.kind && self.subtype == blueprint.subtype
    }

    /// The cached HSV color, for color-marked capabilities.
    #[must_use]
    pub fn color(&self) -> Option<Hsv> {
        self.aux
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .color
    }

    pub fn set_color(&self, color: Hsv) {
        self.aux
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .color = Some(color);
    }

    /// The hub mode code last pushed for this capability's operating-mode
    /// device.
    #[must_use]
    pub fn operating_mode(&self) -> Option<i64> {
        self.aux
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .operating_mode
    }

    pub fn set_operating_mode(&self, mode: i64) {
        self.aux
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .operating_mode = Some(mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_plain_device_subtype() {
        let subtype = CapabilitySubtype::parse("42----").unwrap();
        assert_eq!(subtype, CapabilitySubtype::device(HubId::new(42)));
        assert!(!subtype.is_virtual());
    }

    #[test]
    fn should_parse_all_segments_when_present() {
        let subtype = CapabilitySubtype::parse("12-3-RGB-77-HP").unwrap();
        assert_eq!(subtype.device_id(), Some(HubId::new(12)));
        assert_eq!(subtype.virtual_button_id.as_deref(), Some("3"));
        assert!(subtype.color_marker);
        assert_eq!(subtype.operating_mode_id, Some(HubId::new(77)));
        assert_eq!(subtype.secondary_device_id.as_deref(), Some("HP"));
    }

    #[test]
    fn should_parse_short_legacy_subtype() {
        let subtype = CapabilitySubtype::parse("5").unwrap();
        assert_eq!(subtype, CapabilitySubtype::device(HubId::new(5)));
    }

    #[test]
    fn should_recognize_security_and_global_variable_subtypes() {
        assert!(CapabilitySubtype::parse("0----").unwrap().is_security_system());
        let switch = CapabilitySubtype::parse("G-Holiday---").unwrap();
        assert!(switch.is_global_variable_switch());
        assert!(switch.is_virtual());
        assert_eq!(switch.global_variable_name(), Some("Holiday"));
    }

    #[test]
    fn should_reject_subtype_when_device_segment_is_not_numeric() {
        let result = CapabilitySubtype::parse("lamp----");
        assert!(matches!(result, Err(ValidationError::MalformedSubtype(_))));
    }

    #[test]
    fn should_encode_subtype_in_cache_form() {
        let subtype = CapabilitySubtype::device(HubId::new(9))
            .with_color_marker()
            .with_operating_mode(HubId::new(4));
        assert_eq!(subtype.to_string(), "9--RGB-4-");
        assert_eq!(CapabilitySubtype::parse(&subtype.to_string()).unwrap(), subtype);
    }

    #[test]
    fn should_keep_hyphenated_variable_name_through_cache_form() {
        let subtype = CapabilitySubtype::global_variable("Away-Mode");

        let encoded = subtype.to_string();
        let parsed = CapabilitySubtype::parse(&encoded).unwrap();

        assert_eq!(encoded, "G-Away%2DMode---");
        assert_eq!(parsed, subtype);
        assert_eq!(parsed.global_variable_name(), Some("Away-Mode"));
        assert_eq!(parsed.secondary_device_id, None);
    }

    #[test]
    fn should_escape_percent_and_hyphen_in_secondary_segment() {
        let subtype = CapabilitySubtype::device(HubId::new(7)).with_secondary_device("a-50%");

        let parsed = CapabilitySubtype::parse(&subtype.to_string()).unwrap();

        assert_eq!(subtype.to_string(), "7----a%2D50%25");
        assert_eq!(parsed.secondary_device_id.as_deref(), Some("a-50%"));
    }

    #[test]
    fn should_keep_stray_percent_when_unescaping() {
        assert_eq!(unescape_segment("50%"), "50%");
        assert_eq!(unescape_segment("%2DX%zz"), "-X%zz");
    }

    #[test]
    fn should_seed_color_state_only_for_color_marked_capability() {
        let plain = Capability::new(
            CapabilityKind::Lightbulb,
            CapabilitySubtype::device(HubId::new(1)),
            &[FacetKind::On],
        );
        let colored = Capability::new(
            CapabilityKind::Lightbulb,
            CapabilitySubtype::device(HubId::new(1)).with_color_marker(),
            &[FacetKind::On, FacetKind::Hue],
        );
        assert_eq!(plain.color(), None);
        assert_eq!(colored.color(), Some(Hsv::default()));
    }

    #[test]
    fn should_remember_last_operating_mode() {
        let thermostat = Capability::new(
            CapabilityKind::Thermostat,
            CapabilitySubtype::device(HubId::new(30)).with_operating_mode(HubId::new(31)),
            &[FacetKind::TargetHeatingCoolingState],
        );
        assert_eq!(thermostat.operating_mode(), None);

        thermostat.set_operating_mode(2);

        assert_eq!(thermostat.operating_mode(), Some(2));
    }

    #[test]
    fn should_find_facet_by_kind() {
        let capability = Capability::new(
            CapabilityKind::Lightbulb,
            CapabilitySubtype::device(HubId::new(1)),
            &[FacetKind::On, FacetKind::Brightness],
        );
        assert!(capability.facet(FacetKind::Brightness).is_some());
        assert!(capability.facet(FacetKind::Hue).is_none());
    }

    #[test]
    fn should_match_blueprint_with_same_kind_and_subtype() {
        let blueprint = CapabilityBlueprint::new(
            CapabilityKind::Switch,
            CapabilitySubtype::device(HubId::new(3)),
            &[FacetKind::On],
        );
        let capability = blueprint.build();
        assert!(capability.matches(&blueprint));
        let other = CapabilityBlueprint::new(
            CapabilityKind::Outlet,
            CapabilitySubtype::device(HubId::new(3)),
            &[FacetKind::On],
        );
        assert!(!capability.matches(&other));
    }
}
