//! Engine state shared by reconciliation, the facet service and the poller.
//!
//! Lock order is directory, then subscriptions, then scenes. Reconciliation
//! holds the directory and subscription write locks for its whole pass, so
//! poll dispatch never observes a half-reconciled registry.

use tokio::sync::RwLock;

use hcbridge_domain::device::SceneDirectory;

use crate::directory::AccessoryDirectory;
use crate::subscriptions::SubscriptionRegistry;

#[derive(Debug, Default)]
pub struct EngineState {
    pub directory: RwLock<AccessoryDirectory>,
    pub subscriptions: RwLock<SubscriptionRegistry>,
    pub scenes: RwLock<SceneDirectory>,
}

impl EngineState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
