//! Host ports — the accessory framework the engine feeds, and the cache it
//! rehydrates from at startup.

use std::future::Future;

use hcbridge_domain::accessory::{Accessory, CachedAccessory};
use hcbridge_domain::error::BridgeError;

/// The host capability framework.
///
/// Reconciliation registers new accessories, updates existing ones after
/// their capabilities were rebuilt, and unregisters the ones that vanished
/// from the hub.
pub trait AccessoryHost: Send + Sync {
    fn register(&self, accessory: &Accessory)
    -> impl Future<Output = Result<(), BridgeError>> + Send;

    fn update(&self, accessory: &Accessory) -> impl Future<Output = Result<(), BridgeError>> + Send;

    fn unregister(
        &self,
        accessory: &Accessory,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;
}

/// The externally owned accessory cache.
pub trait AccessoryCache: Send + Sync {
    /// Every cached accessory record.
    fn load_all(&self) -> impl Future<Output = Result<Vec<CachedAccessory>, BridgeError>> + Send;
}

impl<T: AccessoryHost> AccessoryHost for std::sync::Arc<T> {
    fn register(
        &self,
        accessory: &Accessory,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).register(accessory)
    }

    fn update(&self, accessory: &Accessory) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).update(accessory)
    }

    fn unregister(
        &self,
        accessory: &Accessory,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).unregister(accessory)
    }
}

impl<T: AccessoryCache> AccessoryCache for std::sync::Arc<T> {
    fn load_all(&self) -> impl Future<Output = Result<Vec<CachedAccessory>, BridgeError>> + Send {
        (**self).load_all()
    }
}
