//! Switches, outlets and dimmers.

use hcbridge_app::ports::{HubCommand, ReadRequest, WriteRequest};
use hcbridge_domain::error::BridgeError;
use hcbridge_domain::facet::FacetValue;
use hcbridge_domain::id::HubId;
use hcbridge_domain::snapshot;
use serde_json::json;

use super::color::{apply_color, current_color};
use super::{boolean, clamped, missing, number, written_bool, written_number};

/// Wall plugs report their load here, in watts.
const POWER: &str = "power";

pub(super) fn device(request: &WriteRequest<'_>) -> Result<HubId, BridgeError> {
    request
        .capability
        .subtype()
        .device_id()
        .ok_or_else(|| missing("device"))
}

pub(super) fn read_on(request: &ReadRequest<'_>) -> Result<FacetValue, BridgeError> {
    if request.capability.subtype().color_marker {
        let hsv = current_color(request)?;
        return Ok(FacetValue::Bool(hsv.value > 0.0));
    }
    Ok(FacetValue::Bool(boolean(request, snapshot::VALUE)?))
}

pub(super) fn read_brightness(request: &ReadRequest<'_>) -> Result<FacetValue, BridgeError> {
    let level = if request.capability.subtype().color_marker {
        current_color(request)?.value
    } else {
        number(request, snapshot::VALUE)?
    };
    Ok(FacetValue::Int(clamped(level, 0, 100)))
}

pub(super) fn read_outlet_in_use(request: &ReadRequest<'_>) -> Result<FacetValue, BridgeError> {
    let in_use = match request.snapshot.number(POWER) {
        Some(watts) => watts > 0.0,
        None => boolean(request, snapshot::VALUE)?,
    };
    Ok(FacetValue::Bool(in_use))
}

/// Momentary buttons are pressed; everything else is turned on or off.
pub(super) fn write_on(request: &WriteRequest<'_>) -> Result<Vec<HubCommand>, BridgeError> {
    let on = written_bool(request)?;
    let device = device(request)?;
    if let Some(button) = &request.capability.subtype().virtual_button_id {
        if !on {
            return Ok(vec![]);
        }
        return Ok(vec![HubCommand::action(
            device,
            "pressButton",
            vec![json!(button)],
        )]);
    }
    let action = if on { "turnOn" } else { "turnOff" };
    Ok(vec![HubCommand::action(device, action, vec![])])
}

pub(super) fn write_brightness(request: &WriteRequest<'_>) -> Result<Vec<HubCommand>, BridgeError> {
    let level = clamped(written_number(request)?, 0, 100);
    if request.capability.subtype().color_marker {
        let mut hsv = request.capability.color().unwrap_or_default();
        #[allow(clippy::cast_precision_loss)]
        let value = level as f64;
        hsv.value = value;
        return apply_color(request.capability, hsv);
    }
    Ok(vec![HubCommand::action(
        device(request)?,
        "setValue",
        vec![json!(level)],
    )])
}
