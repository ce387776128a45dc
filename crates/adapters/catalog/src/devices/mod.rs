//! The catalog's [`AccessoryFactory`].

mod class;

use hcbridge_app::ports::AccessoryFactory;
use hcbridge_domain::accessory::AccessoryBundle;
use hcbridge_domain::capability::{CapabilityBlueprint, CapabilityKind, CapabilitySubtype};
use hcbridge_domain::device::{Device, Siblings};
use hcbridge_domain::facet::FacetKind;

use class::{DeviceClass, LIGHT_SENSOR_TAG, OPERATING_MODE_TAG, TEMPERATURE_SENSOR_TAG};

const POSITION_FACETS: &[FacetKind] = &[
    FacetKind::CurrentPosition,
    FacetKind::TargetPosition,
    FacetKind::PositionState,
];

const TILT_FACETS: &[FacetKind] = &[
    FacetKind::CurrentPosition,
    FacetKind::TargetPosition,
    FacetKind::PositionState,
    FacetKind::CurrentHorizontalTiltAngle,
    FacetKind::TargetHorizontalTiltAngle,
];

const THERMOSTAT_FACETS: &[FacetKind] = &[
    FacetKind::CurrentTemperature,
    FacetKind::TargetTemperature,
    FacetKind::CurrentHeatingCoolingState,
    FacetKind::TargetHeatingCoolingState,
    FacetKind::TemperatureDisplayUnits,
];

/// Maps hub devices to accessory bundles by their type tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct CatalogFactory;

impl CatalogFactory {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl AccessoryFactory for CatalogFactory {
    fn build(&self, device: &Device, siblings: &Siblings) -> Option<AccessoryBundle> {
        let Some(class) = DeviceClass::from_type_tag(&device.type_tag) else {
            tracing::debug!(
                device_id = %device.id,
                type_tag = %device.type_tag,
                "no catalog entry for device type"
            );
            return None;
        };
        let capabilities = blueprints(class, device, siblings);
        Some(AccessoryBundle {
            name: device.name.clone(),
            room: device.room_id,
            capabilities,
        })
    }
}

fn blueprints(class: DeviceClass, device: &Device, siblings: &Siblings) -> Vec<CapabilityBlueprint> {
    let own = CapabilitySubtype::device(device.id);
    let single = |kind, facets: &[FacetKind]| vec![CapabilityBlueprint::new(kind, own.clone(), facets)];
    match class {
        DeviceClass::Switch => single(CapabilityKind::Switch, &[FacetKind::On]),
        DeviceClass::Outlet => single(
            CapabilityKind::Outlet,
            &[FacetKind::On, FacetKind::OutletInUse],
        ),
        DeviceClass::Dimmer => single(
            CapabilityKind::Lightbulb,
            &[FacetKind::On, FacetKind::Brightness],
        ),
        DeviceClass::ColorDimmer => vec![CapabilityBlueprint::new(
            CapabilityKind::Lightbulb,
            own.clone().with_color_marker(),
            &[
                FacetKind::On,
                FacetKind::Brightness,
                FacetKind::Hue,
                FacetKind::Saturation,
            ],
        )],
        DeviceClass::TemperatureSensor => single(
            CapabilityKind::TemperatureSensor,
            &[FacetKind::CurrentTemperature],
        ),
        DeviceClass::HumiditySensor => single(
            CapabilityKind::HumiditySensor,
            &[FacetKind::CurrentRelativeHumidity],
        ),
        DeviceClass::LightSensor => single(
            CapabilityKind::LightSensor,
            &[FacetKind::CurrentAmbientLightLevel],
        ),
        DeviceClass::MotionSensor => {
            let mut capabilities = single(CapabilityKind::MotionSensor, &[FacetKind::MotionDetected]);
            if let Some(sensor) = siblings.get(TEMPERATURE_SENSOR_TAG) {
                capabilities.push(CapabilityBlueprint::new(
                    CapabilityKind::TemperatureSensor,
                    CapabilitySubtype::device(sensor.id),
                    &[FacetKind::CurrentTemperature],
                ));
            }
            if let Some(sensor) = siblings.get(LIGHT_SENSOR_TAG) {
                capabilities.push(CapabilityBlueprint::new(
                    CapabilityKind::LightSensor,
                    CapabilitySubtype::device(sensor.id),
                    &[FacetKind::CurrentAmbientLightLevel],
                ));
            }
            capabilities
        }
        DeviceClass::ContactSensor => single(
            CapabilityKind::ContactSensor,
            &[FacetKind::ContactSensorState],
        ),
        DeviceClass::LeakSensor => single(CapabilityKind::LeakSensor, &[FacetKind::LeakDetected]),
        DeviceClass::SmokeSensor => single(CapabilityKind::SmokeSensor, &[FacetKind::SmokeDetected]),
        DeviceClass::RollerShutter { tilt } => single(
            CapabilityKind::WindowCovering,
            if tilt { TILT_FACETS } else { POSITION_FACETS },
        ),
        DeviceClass::DoorLock => single(
            CapabilityKind::LockMechanism,
            &[FacetKind::LockCurrentState, FacetKind::LockTargetState],
        ),
        DeviceClass::Thermostat => {
            let mode_id = siblings
                .get(OPERATING_MODE_TAG)
                .map_or(device.id, |sibling| sibling.id);
            vec![CapabilityBlueprint::new(
                CapabilityKind::Thermostat,
                own.clone().with_operating_mode(mode_id),
                THERMOSTAT_FACETS,
            )]
        }
    }
}
