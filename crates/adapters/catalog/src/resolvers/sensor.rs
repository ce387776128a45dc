use hcbridge_app::ports::ReadRequest;
use hcbridge_domain::error::BridgeError;
use hcbridge_domain::facet::FacetValue;
use hcbridge_domain::snapshot;

use super::{boolean, int, number};

/// Lowest ambient light level a host accepts, in lux.
const MIN_LUX: f64 = 0.0001;

pub(super) fn read_temperature(request: &ReadRequest<'_>) -> Result<FacetValue, BridgeError> {
    let celsius = number(request, snapshot::VALUE)?;
    Ok(FacetValue::Float((celsius * 10.0).round() / 10.0))
}

pub(super) fn read_humidity(request: &ReadRequest<'_>) -> Result<FacetValue, BridgeError> {
    Ok(FacetValue::Float(
        number(request, snapshot::VALUE)?.clamp(0.0, 100.0),
    ))
}

pub(super) fn read_light_level(request: &ReadRequest<'_>) -> Result<FacetValue, BridgeError> {
    Ok(FacetValue::Float(number(request, snapshot::VALUE)?.max(MIN_LUX)))
}

pub(super) fn read_motion(request: &ReadRequest<'_>) -> Result<FacetValue, BridgeError> {
    Ok(FacetValue::Bool(boolean(request, snapshot::VALUE)?))
}

/// The hub reports `true` for an open door; hosts use `1` for "no contact".
pub(super) fn read_contact(request: &ReadRequest<'_>) -> Result<FacetValue, BridgeError> {
    Ok(int(boolean(request, snapshot::VALUE)?))
}

pub(super) fn read_leak(request: &ReadRequest<'_>) -> Result<FacetValue, BridgeError> {
    Ok(int(boolean(request, snapshot::VALUE)?))
}

pub(super) fn read_smoke(request: &ReadRequest<'_>) -> Result<FacetValue, BridgeError> {
    Ok(int(boolean(request, snapshot::VALUE)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcbridge_domain::capability::{CapabilityBlueprint, CapabilityKind, CapabilitySubtype};
    use hcbridge_domain::facet::FacetKind;
    use hcbridge_domain::id::HubId;
    use hcbridge_domain::snapshot::PropertySnapshot;

    fn resolve(
        kind: FacetKind,
        value: serde_json::Value,
        resolver: fn(&ReadRequest<'_>) -> Result<FacetValue, BridgeError>,
    ) -> FacetValue {
        let capability = CapabilityBlueprint::new(
            CapabilityKind::TemperatureSensor,
            CapabilitySubtype::device(HubId::new(1)),
            &[kind],
        )
        .build();
        let snapshot = PropertySnapshot::empty().with("value", value);
        resolver(&ReadRequest {
            capability: &capability,
            facet: capability.facet(kind).unwrap(),
            snapshot: &snapshot,
        })
        .unwrap()
    }

    #[test]
    fn should_round_temperature_to_one_decimal() {
        let value = resolve(
            FacetKind::CurrentTemperature,
            serde_json::json!("21.46"),
            read_temperature,
        );
        assert_eq!(value, FacetValue::Float(21.5));
    }

    #[test]
    fn should_raise_light_level_to_host_minimum() {
        let value = resolve(
            FacetKind::CurrentAmbientLightLevel,
            serde_json::json!(0),
            read_light_level,
        );
        assert_eq!(value, FacetValue::Float(MIN_LUX));
    }

    #[test]
    fn should_report_no_contact_when_door_open() {
        let open = resolve(
            FacetKind::ContactSensorState,
            serde_json::json!("1"),
            read_contact,
        );
        let closed = resolve(
            FacetKind::ContactSensorState,
            serde_json::json!(false),
            read_contact,
        );
        assert_eq!(open, FacetValue::Int(1));
        assert_eq!(closed, FacetValue::Int(0));
    }

    #[test]
    fn should_read_motion_as_boolean() {
        let value = resolve(FacetKind::MotionDetected, serde_json::json!("true"), read_motion);
        assert_eq!(value, FacetValue::Bool(true));
    }
}
