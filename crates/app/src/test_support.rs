//! In-memory fakes of the ports, shared by the unit tests of this crate.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use hcbridge_domain::accessory::{Accessory, AccessoryBundle, CachedAccessory};
use hcbridge_domain::capability::{CapabilityBlueprint, CapabilityKind, CapabilitySubtype};
use hcbridge_domain::delta::RefreshResponse;
use hcbridge_domain::device::{Device, GlobalVariable, Scene, Siblings};
use hcbridge_domain::error::{BridgeError, HubError};
use hcbridge_domain::event::FacetChanged;
use hcbridge_domain::facet::{FacetKind, FacetValue};
use hcbridge_domain::id::{HubId, IdentityKey, RoomId, SceneId};
use hcbridge_domain::snapshot::{self, PropertySnapshot};

use crate::ports::{
    AccessoryCache, AccessoryFactory, AccessoryHost, EventPublisher, HubClient, HubCommand,
    ReadRequest, WriteRequest,
};

/// Read resolver returning the primary value (or color) of the snapshot.
pub fn echo_value(request: &ReadRequest<'_>) -> Result<FacetValue, BridgeError> {
    let raw = request
        .snapshot
        .value()
        .or_else(|| request.snapshot.get(snapshot::COLOR))
        .cloned()
        .unwrap_or(serde_json::Value::Null);
    Ok(serde_json::from_value(raw).unwrap_or_default())
}

/// Write resolver turning a boolean into `turnOn` / `turnOff`.
pub fn turn_on_off(request: &WriteRequest<'_>) -> Result<Vec<HubCommand>, BridgeError> {
    let device = request.capability.subtype().device_id().unwrap();
    let action = if request.value.as_bool().unwrap_or(false) {
        "turnOn"
    } else {
        "turnOff"
    };
    Ok(vec![HubCommand::action(device, action, vec![])])
}

pub fn thermostat_blueprint(device: u64, mode: u64) -> CapabilityBlueprint {
    CapabilityBlueprint::new(
        CapabilityKind::Thermostat,
        CapabilitySubtype::device(HubId::new(device)).with_operating_mode(HubId::new(mode)),
        &[
            FacetKind::CurrentTemperature,
            FacetKind::TargetTemperature,
            FacetKind::CurrentHeatingCoolingState,
            FacetKind::TargetHeatingCoolingState,
            FacetKind::TemperatureDisplayUnits,
        ],
    )
}

pub fn device(id: u64, name: &str, visible: bool, parent: u64) -> Device {
    Device {
        id: HubId::new(id),
        parent_id: HubId::new(parent),
        type_tag: "com.fibaro.binarySwitch".to_string(),
        visible,
        name: name.to_string(),
        room_id: RoomId::new(1),
        properties: PropertySnapshot::empty(),
    }
}

#[derive(Default)]
pub struct FakeHub {
    devices: Mutex<Vec<Device>>,
    scenes: Mutex<Vec<Scene>>,
    properties: Mutex<HashMap<HubId, PropertySnapshot>>,
    variables: Mutex<HashMap<String, String>>,
    deltas: Mutex<VecDeque<Result<RefreshResponse, HubError>>>,
    fail_devices: Mutex<u32>,
    refresh_delay: Mutex<Option<Duration>>,
    cursors: Mutex<Vec<u64>>,
    calls: Mutex<Vec<String>>,
    commands: Mutex<Vec<HubCommand>>,
}

impl FakeHub {
    pub fn set_devices(&self, devices: Vec<Device>) {
        *self.devices.lock().unwrap() = devices;
    }

    pub fn set_scenes(&self, scenes: Vec<Scene>) {
        *self.scenes.lock().unwrap() = scenes;
    }

    pub fn set_properties(&self, id: HubId, properties: PropertySnapshot) {
        self.properties.lock().unwrap().insert(id, properties);
    }

    pub fn set_variable(&self, name: &str, value: &str) {
        self.variables
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
    }

    pub fn variable(&self, name: &str) -> Option<String> {
        self.variables.lock().unwrap().get(name).cloned()
    }

    pub fn push_delta(&self, delta: Result<RefreshResponse, HubError>) {
        self.deltas.lock().unwrap().push_back(delta);
    }

    /// Fail the next `n` device listings.
    pub fn fail_devices(&self, n: u32) {
        *self.fail_devices.lock().unwrap() = n;
    }

    pub fn set_refresh_delay(&self, delay: Duration) {
        *self.refresh_delay.lock().unwrap() = Some(delay);
    }

    pub fn cursors(&self) -> Vec<u64> {
        self.cursors.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<HubCommand> {
        self.commands.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl HubClient for FakeHub {
    fn get_scenes(&self) -> impl Future<Output = Result<Vec<Scene>, HubError>> + Send {
        self.record("get_scenes".to_string());
        let scenes = self.scenes.lock().unwrap().clone();
        async { Ok(scenes) }
    }

    fn get_devices(&self) -> impl Future<Output = Result<Vec<Device>, HubError>> + Send {
        self.record("get_devices".to_string());
        let mut failures = self.fail_devices.lock().unwrap();
        let result = if *failures > 0 {
            *failures -= 1;
            Err(HubError::Status(503))
        } else {
            Ok(self.devices.lock().unwrap().clone())
        };
        async { result }
    }

    fn get_device_properties(
        &self,
        id: HubId,
    ) -> impl Future<Output = Result<PropertySnapshot, HubError>> + Send {
        self.record(format!("get_device_properties {id}"));
        let result = self
            .properties
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(HubError::Status(404));
        async { result }
    }

    fn get_global_variable(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<GlobalVariable, HubError>> + Send {
        self.record(format!("get_global_variable {name}"));
        let result = self
            .variable(name)
            .map(|value| GlobalVariable {
                name: name.to_string(),
                value,
            })
            .ok_or(HubError::Status(404));
        async { result }
    }

    fn refresh_states(
        &self,
        cursor: u64,
    ) -> impl Future<Output = Result<RefreshResponse, HubError>> + Send {
        self.record(format!("refresh_states {cursor}"));
        self.cursors.lock().unwrap().push(cursor);
        let delay = *self.refresh_delay.lock().unwrap();
        let result = self
            .deltas
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(RefreshResponse::default()));
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            result
        }
    }

    fn call_action(
        &self,
        device: HubId,
        action: &str,
        args: &[serde_json::Value],
    ) -> impl Future<Output = Result<(), HubError>> + Send {
        self.record(format!("call_action {device} {action}"));
        self.commands
            .lock()
            .unwrap()
            .push(HubCommand::action(device, action, args.to_vec()));
        async { Ok(()) }
    }

    fn set_global_variable(
        &self,
        name: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), HubError>> + Send {
        self.record(format!("set_global_variable {name}"));
        self.set_variable(name, value);
        self.commands.lock().unwrap().push(HubCommand::SetVariable {
            name: name.to_string(),
            value: value.to_string(),
        });
        async { Ok(()) }
    }

    fn start_scene(&self, id: SceneId) -> impl Future<Output = Result<(), HubError>> + Send {
        self.record(format!("start_scene {id}"));
        async { Ok(()) }
    }
}

/// Host recording every registration call.
#[derive(Default)]
pub struct RecordingHost {
    pub registered: Mutex<Vec<IdentityKey>>,
    pub updated: Mutex<Vec<IdentityKey>>,
    pub unregistered: Mutex<Vec<IdentityKey>>,
    pub cached: Mutex<Vec<CachedAccessory>>,
}

impl AccessoryHost for RecordingHost {
    fn register(&self, accessory: &Accessory) -> impl Future<Output = Result<(), BridgeError>> + Send {
        self.registered.lock().unwrap().push(accessory.key().clone());
        async { Ok(()) }
    }

    fn update(&self, accessory: &Accessory) -> impl Future<Output = Result<(), BridgeError>> + Send {
        self.updated.lock().unwrap().push(accessory.key().clone());
        async { Ok(()) }
    }

    fn unregister(
        &self,
        accessory: &Accessory,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        self.unregistered
            .lock()
            .unwrap()
            .push(accessory.key().clone());
        async { Ok(()) }
    }
}

impl AccessoryCache for RecordingHost {
    fn load_all(&self) -> impl Future<Output = Result<Vec<CachedAccessory>, BridgeError>> + Send {
        let cached = self.cached.lock().unwrap().clone();
        async { Ok(cached) }
    }
}

/// Factory exposing every device as a single switch.
pub struct SwitchFactory;

impl AccessoryFactory for SwitchFactory {
    fn build(&self, device: &Device, _siblings: &Siblings) -> Option<AccessoryBundle> {
        Some(AccessoryBundle {
            name: device.name.clone(),
            room: device.room_id,
            capabilities: vec![CapabilityBlueprint::new(
                CapabilityKind::Switch,
                CapabilitySubtype::device(device.id),
                &[FacetKind::On],
            )],
        })
    }
}

#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<FacetChanged>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<FacetChanged> {
        self.events.lock().unwrap().clone()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(
        &self,
        event: FacetChanged,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        self.events.lock().unwrap().push(event);
        async { Ok(()) }
    }
}
