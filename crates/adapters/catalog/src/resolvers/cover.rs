//! Roller shutters. The hub drives positions over `0..=99` and the tilt over
//! the secondary value; hosts expect `0..=100` and `-90..=90` degrees.

use hcbridge_app::ports::{HubCommand, ReadRequest, WriteRequest};
use hcbridge_domain::error::BridgeError;
use hcbridge_domain::facet::FacetValue;
use hcbridge_domain::snapshot;
use serde_json::json;

use super::switch::device;
use super::{clamped, number, written_number};

const HUB_MAX: f64 = 99.0;
const STOPPED: i64 = 2;

pub(super) fn read_position(request: &ReadRequest<'_>) -> Result<FacetValue, BridgeError> {
    let level = number(request, snapshot::VALUE)?;
    let position = if level >= HUB_MAX { 100.0 } else { level };
    Ok(FacetValue::Int(clamped(position, 0, 100)))
}

pub(super) fn read_position_state(_: &ReadRequest<'_>) -> Result<FacetValue, BridgeError> {
    Ok(FacetValue::Int(STOPPED))
}

pub(super) fn read_tilt(request: &ReadRequest<'_>) -> Result<FacetValue, BridgeError> {
    let level = number(request, snapshot::VALUE2)?.clamp(0.0, HUB_MAX);
    Ok(FacetValue::Int(clamped(level * 180.0 / HUB_MAX - 90.0, -90, 90)))
}

pub(super) fn write_position(request: &WriteRequest<'_>) -> Result<Vec<HubCommand>, BridgeError> {
    let position = clamped(written_number(request)?, 0, 99);
    Ok(vec![HubCommand::action(
        device(request)?,
        "setValue",
        vec![json!(position)],
    )])
}

pub(super) fn write_tilt(request: &WriteRequest<'_>) -> Result<Vec<HubCommand>, BridgeError> {
    let angle = written_number(request)?.clamp(-90.0, 90.0);
    let level = clamped((angle + 90.0) * HUB_MAX / 180.0, 0, 99);
    Ok(vec![HubCommand::action(
        device(request)?,
        "setValue2",
        vec![json!(level)],
    )])
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcbridge_domain::capability::{
        Capability, CapabilityBlueprint, CapabilityKind, CapabilitySubtype,
    };
    use hcbridge_domain::facet::FacetKind;
    use hcbridge_domain::id::HubId;
    use hcbridge_domain::snapshot::PropertySnapshot;

    fn blinds() -> Capability {
        CapabilityBlueprint::new(
            CapabilityKind::WindowCovering,
            CapabilitySubtype::device(HubId::new(40)),
            &[
                FacetKind::CurrentPosition,
                FacetKind::TargetPosition,
                FacetKind::CurrentHorizontalTiltAngle,
                FacetKind::TargetHorizontalTiltAngle,
            ],
        )
        .build()
    }

    #[test]
    fn should_report_fully_open_when_hub_at_maximum() {
        let capability = blinds();
        let snapshot = PropertySnapshot::empty().with("value", "99");

        let value = read_position(&ReadRequest {
            capability: &capability,
            facet: capability.facet(FacetKind::CurrentPosition).unwrap(),
            snapshot: &snapshot,
        })
        .unwrap();

        assert_eq!(value, FacetValue::Int(100));
    }

    #[test]
    fn should_map_secondary_value_to_tilt_angle() {
        let capability = blinds();
        let snapshot = PropertySnapshot::empty().with("value2", 0);

        let value = read_tilt(&ReadRequest {
            capability: &capability,
            facet: capability.facet(FacetKind::CurrentHorizontalTiltAngle).unwrap(),
            snapshot: &snapshot,
        })
        .unwrap();

        assert_eq!(value, FacetValue::Int(-90));
    }

    #[test]
    fn should_cap_target_position_at_hub_maximum() {
        let capability = blinds();

        let commands = write_position(&WriteRequest {
            capability: &capability,
            facet: capability.facet(FacetKind::TargetPosition).unwrap(),
            value: &FacetValue::Int(100),
        })
        .unwrap();

        assert_eq!(
            commands,
            vec![HubCommand::action(HubId::new(40), "setValue", vec![json!(99)])]
        );
    }

    #[test]
    fn should_set_secondary_value_when_tilt_written() {
        let capability = blinds();

        let commands = write_tilt(&WriteRequest {
            capability: &capability,
            facet: capability.facet(FacetKind::TargetHorizontalTiltAngle).unwrap(),
            value: &FacetValue::Int(90),
        })
        .unwrap();

        assert_eq!(
            commands,
            vec![HubCommand::action(HubId::new(40), "setValue2", vec![json!(99)])]
        );
    }
}
