//! Hub port — the remote controller's polling API.

use std::future::Future;

use hcbridge_domain::delta::RefreshResponse;
use hcbridge_domain::device::{Device, GlobalVariable, Scene};
use hcbridge_domain::error::HubError;
use hcbridge_domain::id::{HubId, SceneId};
use hcbridge_domain::snapshot::PropertySnapshot;

/// Client for the hub.
///
/// Read methods mirror the hub's polling endpoints; the write methods carry
/// the [`HubCommand`](crate::ports::HubCommand)s produced by write resolvers.
pub trait HubClient: Send + Sync {
    /// List scenes.
    fn get_scenes(&self) -> impl Future<Output = Result<Vec<Scene>, HubError>> + Send;

    /// List every device, in the hub's order.
    fn get_devices(&self) -> impl Future<Output = Result<Vec<Device>, HubError>> + Send;

    /// Fetch the full property snapshot of one device.
    fn get_device_properties(
        &self,
        id: HubId,
    ) -> impl Future<Output = Result<PropertySnapshot, HubError>> + Send;

    /// Fetch a named global variable.
    fn get_global_variable(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<GlobalVariable, HubError>> + Send;

    /// Fetch the delta since `cursor` (`0` means from the beginning).
    ///
    /// Fails with [`HubError::ExpiredCursor`] when the hub no longer knows
    /// the cursor.
    fn refresh_states(
        &self,
        cursor: u64,
    ) -> impl Future<Output = Result<RefreshResponse, HubError>> + Send;

    /// Invoke `action` on a device.
    fn call_action(
        &self,
        device: HubId,
        action: &str,
        args: &[serde_json::Value],
    ) -> impl Future<Output = Result<(), HubError>> + Send;

    /// Overwrite a global variable.
    fn set_global_variable(
        &self,
        name: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), HubError>> + Send;

    /// Start a scene.
    fn start_scene(&self, id: SceneId) -> impl Future<Output = Result<(), HubError>> + Send;
}

impl<T: HubClient> HubClient for std::sync::Arc<T> {
    fn get_scenes(&self) -> impl Future<Output = Result<Vec<Scene>, HubError>> + Send {
        (**self).get_scenes()
    }

    fn get_devices(&self) -> impl Future<Output = Result<Vec<Device>, HubError>> + Send {
        (**self).get_devices()
    }

    fn get_device_properties(
        &self,
        id: HubId,
    ) -> impl Future<Output = Result<PropertySnapshot, HubError>> + Send {
        (**self).get_device_properties(id)
    }

    fn get_global_variable(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<GlobalVariable, HubError>> + Send {
        (**self).get_global_variable(name)
    }

    fn refresh_states(
        &self,
        cursor: u64,
    ) -> impl Future<Output = Result<RefreshResponse, HubError>> + Send {
        (**self).refresh_states(cursor)
    }

    fn call_action(
        &self,
        device: HubId,
        action: &str,
        args: &[serde_json::Value],
    ) -> impl Future<Output = Result<(), HubError>> + Send {
        (**self).call_action(device, action, args)
    }

    fn set_global_variable(
        &self,
        name: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), HubError>> + Send {
        (**self).set_global_variable(name, value)
    }

    fn start_scene(&self, id: SceneId) -> impl Future<Output = Result<(), HubError>> + Send {
        (**self).start_scene(id)
    }
}
