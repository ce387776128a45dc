//! Device classes recognized by the catalog.

const PREFIX: &str = "com.fibaro.";

/// Tag of the sibling device carrying a thermostat's operating mode.
pub(crate) const OPERATING_MODE_TAG: &str = "com.fibaro.operatingModeHorstmann";
pub(crate) const TEMPERATURE_SENSOR_TAG: &str = "com.fibaro.temperatureSensor";
pub(crate) const LIGHT_SENSOR_TAG: &str = "com.fibaro.lightSensor";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeviceClass {
    Switch,
    Outlet,
    Dimmer,
    ColorDimmer,
    TemperatureSensor,
    HumiditySensor,
    LightSensor,
    MotionSensor,
    ContactSensor,
    LeakSensor,
    SmokeSensor,
    RollerShutter { tilt: bool },
    DoorLock,
    Thermostat,
}

impl DeviceClass {
    pub(crate) fn from_type_tag(tag: &str) -> Option<Self> {
        let class = match tag.strip_prefix(PREFIX)? {
            "binarySwitch" => Self::Switch,
            "FGWP101" | "FGWP102" => Self::Outlet,
            "multilevelSwitch" | "FGD212" => Self::Dimmer,
            "FGRGBW441M" | "colorController" => Self::ColorDimmer,
            "temperatureSensor" => Self::TemperatureSensor,
            "humiditySensor" => Self::HumiditySensor,
            "lightSensor" => Self::LightSensor,
            "FGMS001" | "motionSensor" => Self::MotionSensor,
            "doorSensor" | "windowSensor" | "FGDW002" => Self::ContactSensor,
            "floodSensor" | "FGFS101" => Self::LeakSensor,
            "FGSS001" | "smokeSensor" => Self::SmokeSensor,
            "rollerShutter" | "FGRM222" | "FGR221" => Self::RollerShutter { tilt: false },
            "FGR223" => Self::RollerShutter { tilt: true },
            "doorLock" | "gerda" => Self::DoorLock,
            "thermostatDanfoss" | "thermostatHorstmann" => Self::Thermostat,
            _ => return None,
        };
        Some(class)
    }
}
