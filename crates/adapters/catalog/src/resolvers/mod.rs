//! Read and write resolvers for every facet kind the catalog creates.

mod color;
mod cover;
mod lock;
mod sensor;
mod switch;
mod thermostat;

use std::time::Duration;

use hcbridge_app::dispatch::DispatchRegistry;
use hcbridge_app::ports::{ReadRequest, WriteRequest};
use hcbridge_app::settings::BridgeSettings;
use hcbridge_domain::error::{BridgeError, ResolverError, ValidationError};
use hcbridge_domain::facet::{FacetKind, FacetValue};

use thermostat::{DisplayUnitsReader, HeatingCoolingReader, HeatingCoolingWriter, SetpointWriter};

/// Time given to slow actuators (shutters, thermostat valves) before a read.
const SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Populate both dispatch tables with the catalog's resolvers.
pub fn register_resolvers(registry: &mut DispatchRegistry, settings: &BridgeSettings) {
    registry
        .register_read(FacetKind::On, switch::read_on, Duration::ZERO)
        .register_read(FacetKind::Brightness, switch::read_brightness, Duration::ZERO)
        .register_read(FacetKind::OutletInUse, switch::read_outlet_in_use, Duration::ZERO)
        .register_read(FacetKind::Hue, color::read_hue, Duration::ZERO)
        .register_read(FacetKind::Saturation, color::read_saturation, Duration::ZERO)
        .register_read(FacetKind::CurrentTemperature, sensor::read_temperature, Duration::ZERO)
        .register_read(FacetKind::CurrentRelativeHumidity, sensor::read_humidity, Duration::ZERO)
        .register_read(FacetKind::CurrentAmbientLightLevel, sensor::read_light_level, Duration::ZERO)
        .register_read(FacetKind::MotionDetected, sensor::read_motion, Duration::ZERO)
        .register_read(FacetKind::ContactSensorState, sensor::read_contact, Duration::ZERO)
        .register_read(FacetKind::LeakDetected, sensor::read_leak, Duration::ZERO)
        .register_read(FacetKind::SmokeDetected, sensor::read_smoke, Duration::ZERO)
        .register_read(FacetKind::CurrentPosition, cover::read_position, SETTLE_DELAY)
        .register_read(FacetKind::TargetPosition, cover::read_position, SETTLE_DELAY)
        .register_read(FacetKind::PositionState, cover::read_position_state, Duration::ZERO)
        .register_read(FacetKind::CurrentHorizontalTiltAngle, cover::read_tilt, SETTLE_DELAY)
        .register_read(FacetKind::TargetHorizontalTiltAngle, cover::read_tilt, SETTLE_DELAY)
        .register_read(FacetKind::LockCurrentState, lock::read_lock, Duration::ZERO)
        .register_read(FacetKind::LockTargetState, lock::read_lock, Duration::ZERO)
        .register_read(FacetKind::TargetTemperature, thermostat::read_setpoint, SETTLE_DELAY)
        .register_read(
            FacetKind::CurrentHeatingCoolingState,
            HeatingCoolingReader::new(settings.cooling_management),
            SETTLE_DELAY,
        )
        .register_read(
            FacetKind::TargetHeatingCoolingState,
            HeatingCoolingReader::new(settings.cooling_management),
            SETTLE_DELAY,
        )
        .register_read(
            FacetKind::TemperatureDisplayUnits,
            DisplayUnitsReader::new(settings.temperature_unit),
            Duration::ZERO,
        );

    registry
        .register_write(FacetKind::On, switch::write_on)
        .register_write(FacetKind::Brightness, switch::write_brightness)
        .register_write(FacetKind::Hue, color::write_hue)
        .register_write(FacetKind::Saturation, color::write_saturation)
        .register_write(FacetKind::TargetPosition, cover::write_position)
        .register_write(FacetKind::TargetHorizontalTiltAngle, cover::write_tilt)
        .register_write(FacetKind::LockTargetState, lock::write_lock)
        .register_write(
            FacetKind::TargetTemperature,
            SetpointWriter::new(settings.thermostat_timeout),
        )
        .register_write(
            FacetKind::TargetHeatingCoolingState,
            HeatingCoolingWriter::new(settings.cooling_management),
        );

    tracing::debug!(?registry, "catalog resolvers registered");
}

fn missing(property: &'static str) -> BridgeError {
    ResolverError::MissingProperty(property).into()
}

fn invalid(facet: FacetKind, reason: &'static str) -> BridgeError {
    ValidationError::InvalidValue { facet, reason }.into()
}

/// The written value as a boolean.
fn written_bool(request: &WriteRequest<'_>) -> Result<bool, BridgeError> {
    request
        .value
        .as_bool()
        .ok_or_else(|| invalid(request.facet.kind(), "expected a boolean"))
}

/// The written value as a number.
fn written_number(request: &WriteRequest<'_>) -> Result<f64, BridgeError> {
    request
        .value
        .as_f64()
        .ok_or_else(|| invalid(request.facet.kind(), "expected a number"))
}

/// A snapshot property read as a number.
fn number(request: &ReadRequest<'_>, property: &'static str) -> Result<f64, BridgeError> {
    request
        .snapshot
        .number(property)
        .ok_or_else(|| missing(property))
}

/// A snapshot property read as a boolean.
fn boolean(request: &ReadRequest<'_>, property: &'static str) -> Result<bool, BridgeError> {
    request
        .snapshot
        .boolean(property)
        .ok_or_else(|| missing(property))
}

/// Round and clamp into an integer range.
#[allow(clippy::cast_possible_truncation)]
fn clamped(value: f64, min: i64, max: i64) -> i64 {
    (value.round() as i64).clamp(min, max)
}

fn int(flag: bool) -> FacetValue {
    FacetValue::Int(i64::from(flag))
}
