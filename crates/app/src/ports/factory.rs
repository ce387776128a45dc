//! Accessory factory port — turns a hub device into a capability bundle.

use hcbridge_domain::accessory::AccessoryBundle;
use hcbridge_domain::device::{Device, Siblings};

/// Decides which capabilities and facets a hub device needs.
///
/// Returns `None` for devices that should not become accessories.
pub trait AccessoryFactory: Send + Sync {
    fn build(&self, device: &Device, siblings: &Siblings) -> Option<AccessoryBundle>;
}

impl<T: AccessoryFactory> AccessoryFactory for std::sync::Arc<T> {
    fn build(&self, device: &Device, siblings: &Siblings) -> Option<AccessoryBundle> {
        (**self).build(device, siblings)
    }
}
