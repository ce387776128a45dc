//! Stub ports and a prewired [`AppState`] for the handler tests.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::response::Response;
use http_body_util::BodyExt;

use hcbridge_app::bridge::Bridge;
use hcbridge_app::dispatch::DispatchRegistry;
use hcbridge_app::event_bus::InProcessEventBus;
use hcbridge_app::ports::{
    AccessoryFactory, AccessoryHost, HubClient, HubCommand, ReadRequest, WriteRequest,
};
use hcbridge_app::settings::BridgeSettings;
use hcbridge_domain::accessory::{Accessory, AccessoryBundle};
use hcbridge_domain::capability::{CapabilityBlueprint, CapabilityKind, CapabilitySubtype};
use hcbridge_domain::delta::RefreshResponse;
use hcbridge_domain::device::{Device, GlobalVariable, Scene, Siblings};
use hcbridge_domain::error::{BridgeError, HubError};
use hcbridge_domain::facet::{FacetKind, FacetValue};
use hcbridge_domain::id::{HubId, RoomId, SceneId};
use hcbridge_domain::snapshot::PropertySnapshot;

use crate::state::AppState;

/// Hub exposing a single switch, device 3 in room 1.
#[derive(Default)]
pub struct StubHub {
    failing: AtomicBool,
    empty: AtomicBool,
    actions: Mutex<Vec<String>>,
}

impl StubHub {
    /// Make every subsequent call fail with a 503.
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Report no devices from now on.
    pub fn clear_devices(&self) {
        self.empty.store(true, Ordering::SeqCst);
    }

    /// Actions received so far, as `"<device> <action>"`.
    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), HubError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(HubError::Status(503))
        } else {
            Ok(())
        }
    }
}

impl HubClient for StubHub {
    async fn get_scenes(&self) -> Result<Vec<Scene>, HubError> {
        self.check()?;
        Ok(vec![])
    }

    async fn get_devices(&self) -> Result<Vec<Device>, HubError> {
        self.check()?;
        if self.empty.load(Ordering::SeqCst) {
            return Ok(vec![]);
        }
        Ok(vec![Device {
            id: HubId::new(3),
            parent_id: HubId::new(2),
            type_tag: "com.fibaro.binarySwitch".to_string(),
            visible: true,
            name: "Lamp".to_string(),
            room_id: RoomId::new(1),
            properties: PropertySnapshot::empty(),
        }])
    }

    async fn get_device_properties(&self, _id: HubId) -> Result<PropertySnapshot, HubError> {
        self.check()?;
        Ok(PropertySnapshot::empty().with("value", "true"))
    }

    async fn get_global_variable(&self, name: &str) -> Result<GlobalVariable, HubError> {
        self.check()?;
        Ok(GlobalVariable {
            name: name.to_string(),
            value: "0".to_string(),
        })
    }

    async fn refresh_states(&self, _cursor: u64) -> Result<RefreshResponse, HubError> {
        self.check()?;
        Ok(RefreshResponse::default())
    }

    async fn call_action(
        &self,
        device: HubId,
        action: &str,
        _args: &[serde_json::Value],
    ) -> Result<(), HubError> {
        self.check()?;
        self.actions.lock().unwrap().push(format!("{device} {action}"));
        Ok(())
    }

    async fn set_global_variable(&self, _name: &str, _value: &str) -> Result<(), HubError> {
        self.check()
    }

    async fn start_scene(&self, _id: SceneId) -> Result<(), HubError> {
        self.check()
    }
}

/// Every device becomes a switch with an on and a brightness facet.
pub struct StubFactory;

impl AccessoryFactory for StubFactory {
    fn build(&self, device: &Device, _siblings: &Siblings) -> Option<AccessoryBundle> {
        Some(AccessoryBundle {
            name: device.name.clone(),
            room: device.room_id,
            capabilities: vec![CapabilityBlueprint::new(
                CapabilityKind::Switch,
                CapabilitySubtype::device(device.id),
                &[FacetKind::On, FacetKind::Brightness],
            )],
        })
    }
}

pub struct StubHost;

impl AccessoryHost for StubHost {
    async fn register(&self, _accessory: &Accessory) -> Result<(), BridgeError> {
        Ok(())
    }

    async fn update(&self, _accessory: &Accessory) -> Result<(), BridgeError> {
        Ok(())
    }

    async fn unregister(&self, _accessory: &Accessory) -> Result<(), BridgeError> {
        Ok(())
    }
}

fn read_on(request: &ReadRequest<'_>) -> Result<FacetValue, BridgeError> {
    Ok(request
        .snapshot
        .boolean("value")
        .map_or(FacetValue::Null, FacetValue::Bool))
}

fn write_on(request: &WriteRequest<'_>) -> Result<Vec<HubCommand>, BridgeError> {
    let device = request.capability.subtype().device_id().unwrap();
    let action = if request.value.as_bool().unwrap_or(false) {
        "turnOn"
    } else {
        "turnOff"
    };
    Ok(vec![HubCommand::action(device, action, vec![])])
}

pub type TestState = AppState<Arc<StubHub>, StubFactory, StubHost, Arc<InProcessEventBus>>;

/// Shared handles the tests poke at after building the state.
pub struct Handles {
    pub hub: Arc<StubHub>,
    pub event_bus: Arc<InProcessEventBus>,
}

/// Build an [`AppState`] over a reconciled bridge.
pub async fn test_state() -> (TestState, Handles) {
    test_state_with(BridgeSettings::default()).await
}

/// Same as [`test_state`], with custom bridge settings.
pub async fn test_state_with(settings: BridgeSettings) -> (TestState, Handles) {
    let hub = Arc::new(StubHub::default());
    let event_bus = Arc::new(InProcessEventBus::new(16));
    let mut dispatch = DispatchRegistry::new();
    dispatch
        .register_read(FacetKind::On, read_on, Duration::ZERO)
        .register_write(FacetKind::On, write_on);

    let bridge = Bridge::new(
        Arc::clone(&hub),
        StubFactory,
        StubHost,
        Arc::clone(&event_bus),
        dispatch,
        settings,
    );
    bridge.reconciler().reconcile().await.unwrap();

    let state = AppState::from_bridge(&bridge, Arc::clone(&event_bus));
    (state, Handles { hub, event_bus })
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
