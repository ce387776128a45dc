//! Values for the capabilities the engine owns itself: global-variable
//! switches and the security system. Both are backed by hub variables
//! rather than devices, are never subscribed, and are refreshed every poll.

use hcbridge_domain::accessory::AccessoryBundle;
use hcbridge_domain::capability::{CapabilityBlueprint, CapabilityKind, CapabilitySubtype};
use hcbridge_domain::device::GlobalVariable;
use hcbridge_domain::error::{BridgeError, ResolverError, ValidationError};
use hcbridge_domain::facet::{FacetKind, FacetValue};
use hcbridge_domain::id::{IdentityKey, RoomId};
use hcbridge_domain::security::{SECURITY_ACCESSORY_NAME, SecurityState};

use crate::ports::HubCommand;

/// Room of every synthesized accessory.
pub const SYNTHETIC_ROOM: RoomId = RoomId::new(0);

/// Bundle for the switch backed by global variable `name`.
#[must_use]
pub fn variable_switch_bundle(name: &str) -> AccessoryBundle {
    AccessoryBundle {
        name: name.to_string(),
        room: SYNTHETIC_ROOM,
        capabilities: vec![CapabilityBlueprint::new(
            CapabilityKind::Switch,
            CapabilitySubtype::global_variable(name),
            &[FacetKind::On],
        )],
    }
}

/// Identity key of the switch backed by global variable `name`.
#[must_use]
pub fn variable_switch_key(name: &str) -> IdentityKey {
    IdentityKey::from_parts(name, SYNTHETIC_ROOM)
}

/// Bundle for the security-system accessory.
#[must_use]
pub fn security_bundle() -> AccessoryBundle {
    AccessoryBundle {
        name: SECURITY_ACCESSORY_NAME.to_string(),
        room: SYNTHETIC_ROOM,
        capabilities: vec![CapabilityBlueprint::new(
            CapabilityKind::SecuritySystem,
            CapabilitySubtype::security_system(),
            &[
                FacetKind::SecuritySystemCurrentState,
                FacetKind::SecuritySystemTargetState,
            ],
        )],
    }
}

/// Identity key of the security-system accessory.
#[must_use]
pub fn security_key() -> IdentityKey {
    IdentityKey::from_parts(SECURITY_ACCESSORY_NAME, SYNTHETIC_ROOM)
}

/// Value of a global-variable switch facet.
#[must_use]
pub fn read_variable_switch(variable: &GlobalVariable) -> FacetValue {
    FacetValue::Bool(variable.as_bool())
}

/// Value of a security facet from the security variable.
///
/// A triggered alarm has no target code; the target facet then keeps
/// `cached`.
///
/// # Errors
///
/// Returns [`BridgeError::Validation`] for an unknown state name and
/// [`BridgeError::Resolver`] for a non-security facet.
pub fn read_security(
    facet: FacetKind,
    variable: &GlobalVariable,
    cached: FacetValue,
) -> Result<FacetValue, BridgeError> {
    let state: SecurityState = variable.value.parse()?;
    match facet {
        FacetKind::SecuritySystemCurrentState => Ok(FacetValue::Int(state.current_code())),
        FacetKind::SecuritySystemTargetState => {
            Ok(state.target_code().map_or(cached, FacetValue::Int))
        }
        other => Err(ResolverError::UnexpectedValue {
            facet: other,
            value: variable.value.clone(),
        }
        .into()),
    }
}

/// Commands for a host write to a global-variable switch.
///
/// # Errors
///
/// Returns [`BridgeError::Validation`] if `value` is not boolean-like.
pub fn write_variable_switch(
    name: &str,
    value: &FacetValue,
) -> Result<Vec<HubCommand>, BridgeError> {
    let on = value.as_bool().ok_or(ValidationError::InvalidValue {
        facet: FacetKind::On,
        reason: "expected a boolean",
    })?;
    Ok(vec![HubCommand::SetVariable {
        name: name.to_string(),
        value: on.to_string(),
    }])
}

/// Commands for a host write to the security target state: start the scene
/// entering the requested state.
///
/// # Errors
///
/// Returns [`BridgeError::Validation`] if `value` is not a target code.
pub fn write_security_target(value: &FacetValue) -> Result<Vec<HubCommand>, BridgeError> {
    let invalid = ValidationError::InvalidValue {
        facet: FacetKind::SecuritySystemTargetState,
        reason: "expected a target state code 0..=3",
    };
    #[allow(clippy::cast_possible_truncation)]
    let code = value.as_f64().map(|f| f as i64);
    let state = code
        .and_then(SecurityState::from_target_code)
        .ok_or(invalid)?;
    Ok(vec![HubCommand::StartScene {
        name: state.scene_name(),
    }])
}
