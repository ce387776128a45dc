//! Thermostats: setpoint, operating mode and display unit.
//!
//! Operating-mode reads triggered by a hub mode event arrive with an empty
//! snapshot; the readers then use the mode stored on the capability, or keep
//! the facet's cached value when no mode was ever reported.

use std::time::Duration;

use hcbridge_app::ports::{HubCommand, ReadRequest, ReadResolver, WriteRequest, WriteResolver};
use hcbridge_domain::error::BridgeError;
use hcbridge_domain::facet::{FacetKind, FacetValue};
use hcbridge_domain::snapshot;
use hcbridge_domain::temperature::TemperatureUnit;
use serde_json::json;

use super::switch::device;
use super::{clamped, invalid, missing, written_number};

const SETPOINT_PROPERTIES: &[&str] = &["heatingThermostatSetpoint", "targetLevel", snapshot::VALUE];
const MODE_PROPERTIES: &[&str] = &["mode", "thermostatMode"];

const OFF: i64 = 0;
const HEAT: i64 = 1;
const COOL: i64 = 2;
const AUTO: i64 = 3;

/// Hub-side operating mode codes.
const HUB_OFF: i64 = 0;
const HUB_HEAT: i64 = 1;
const HUB_COOL: i64 = 2;
const HUB_AUTO: i64 = 10;

pub(super) fn read_setpoint(request: &ReadRequest<'_>) -> Result<FacetValue, BridgeError> {
    SETPOINT_PROPERTIES
        .iter()
        .find_map(|p| request.snapshot.number(p))
        .map(FacetValue::Float)
        .ok_or_else(|| missing("heatingThermostatSetpoint"))
}

/// Reads the current and target heating/cooling state from the hub mode.
#[derive(Debug, Clone, Copy)]
pub(super) struct HeatingCoolingReader {
    cooling_management: bool,
}

impl HeatingCoolingReader {
    pub(super) fn new(cooling_management: bool) -> Self {
        Self { cooling_management }
    }

    fn map(self, facet: FacetKind, hub_mode: i64) -> i64 {
        match hub_mode {
            HUB_OFF => OFF,
            HUB_HEAT => HEAT,
            HUB_COOL if self.cooling_management => COOL,
            HUB_COOL => HEAT,
            _ if facet == FacetKind::TargetHeatingCoolingState && self.cooling_management => AUTO,
            _ => HEAT,
        }
    }
}

impl ReadResolver for HeatingCoolingReader {
    fn resolve(&self, request: &ReadRequest<'_>) -> Result<FacetValue, BridgeError> {
        let hub_mode = MODE_PROPERTIES
            .iter()
            .find_map(|p| request.snapshot.number(p))
            .map(|mode| clamped(mode, i64::MIN, i64::MAX))
            .or_else(|| request.capability.operating_mode());
        let Some(hub_mode) = hub_mode else {
            return Ok(match request.facet.value() {
                FacetValue::Null => FacetValue::Int(OFF),
                cached => cached,
            });
        };
        Ok(FacetValue::Int(self.map(request.facet.kind(), hub_mode)))
    }
}

/// Sends the host's target state to the operating-mode device.
#[derive(Debug, Clone, Copy)]
pub(super) struct HeatingCoolingWriter {
    cooling_management: bool,
}

impl HeatingCoolingWriter {
    pub(super) fn new(cooling_management: bool) -> Self {
        Self { cooling_management }
    }
}

impl WriteResolver for HeatingCoolingWriter {
    fn resolve(&self, request: &WriteRequest<'_>) -> Result<Vec<HubCommand>, BridgeError> {
        let target = clamped(written_number(request)?, i64::MIN, i64::MAX);
        let hub_mode = match target {
            OFF => HUB_OFF,
            HEAT => HUB_HEAT,
            COOL if self.cooling_management => HUB_COOL,
            AUTO if self.cooling_management => HUB_AUTO,
            COOL | AUTO => HUB_HEAT,
            _ => return Err(invalid(request.facet.kind(), "unknown heating/cooling state")),
        };
        let mode_device = match request.capability.subtype().operating_mode_id {
            Some(id) => id,
            None => device(request)?,
        };
        Ok(vec![HubCommand::action(
            mode_device,
            "setMode",
            vec![json!(hub_mode)],
        )])
    }
}

/// Sets the target temperature, holding it for `timeout` when non-zero.
#[derive(Debug, Clone, Copy)]
pub(super) struct SetpointWriter {
    timeout: Duration,
}

impl SetpointWriter {
    pub(super) fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl WriteResolver for SetpointWriter {
    fn resolve(&self, request: &WriteRequest<'_>) -> Result<Vec<HubCommand>, BridgeError> {
        let setpoint = written_number(request)?;
        let device = device(request)?;
        let mut commands = vec![HubCommand::action(
            device,
            "setTargetLevel",
            vec![json!(setpoint)],
        )];
        if !self.timeout.is_zero() {
            let seconds = i64::try_from(self.timeout.as_secs()).unwrap_or(i64::MAX);
            let until = chrono::Utc::now().timestamp().saturating_add(seconds);
            commands.push(HubCommand::action(device, "setTime", vec![json!(until)]));
        }
        Ok(commands)
    }
}

/// Reports the configured temperature unit.
#[derive(Debug, Clone, Copy)]
pub(super) struct DisplayUnitsReader {
    unit: TemperatureUnit,
}

impl DisplayUnitsReader {
    pub(super) fn new(unit: TemperatureUnit) -> Self {
        Self { unit }
    }
}

impl ReadResolver for DisplayUnitsReader {
    fn resolve(&self, _: &ReadRequest<'_>) -> Result<FacetValue, BridgeError> {
        Ok(FacetValue::Int(match self.unit {
            TemperatureUnit::Celsius => 0,
            TemperatureUnit::Fahrenheit => 1,
        }))
    }
}
