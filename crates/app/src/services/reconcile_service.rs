//! Reconciliation — keeps the accessory directory and the subscription
//! registry consistent with the hub's current device list.
//!
//! A pass builds one bundle per exposed device (plus the synthesized
//! global-variable switches and security system), then applies them under
//! the directory and subscription write locks. Accessories present before
//! the pass and not touched by it are removed.

use std::collections::HashSet;
use std::sync::Arc;

use hcbridge_domain::accessory::{Accessory, AccessoryBundle};
use hcbridge_domain::device::{self, Device, SceneDirectory};
use hcbridge_domain::error::BridgeError;
use hcbridge_domain::id::IdentityKey;

use crate::out_of_band;
use crate::ports::{AccessoryCache, AccessoryFactory, AccessoryHost, HubClient};
use crate::settings::BridgeSettings;
use crate::state::EngineState;

/// Keys affected by one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: Vec<IdentityKey>,
    pub updated: Vec<IdentityKey>,
    pub removed: Vec<IdentityKey>,
}

pub struct ReconcileService<H, F, A> {
    hub: H,
    factory: F,
    host: A,
    state: Arc<EngineState>,
    settings: Arc<BridgeSettings>,
}

impl<H, F, A> ReconcileService<H, F, A>
where
    H: HubClient,
    F: AccessoryFactory,
    A: AccessoryHost,
{
    pub fn new(
        hub: H,
        factory: F,
        host: A,
        state: Arc<EngineState>,
        settings: Arc<BridgeSettings>,
    ) -> Self {
        Self {
            hub,
            factory,
            host,
            state,
            settings,
        }
    }

    /// Load cached accessories into the directory and bind their facets.
    ///
    /// Records that fail to parse are skipped with a warning. Rehydrated
    /// accessories count as "previous" for the next pass.
    ///
    /// # Errors
    ///
    /// Returns the cache's error if it cannot be read at all.
    #[tracing::instrument(skip_all)]
    pub async fn rehydrate(&self, cache: &impl AccessoryCache) -> Result<usize, BridgeError> {
        let records = cache.load_all().await?;
        let mut directory = self.state.directory.write().await;
        let mut subscriptions = self.state.subscriptions.write().await;
        let mut loaded = 0;
        for record in records {
            let key = record.key.clone();
            match Accessory::from_record(record) {
                Ok(accessory) => {
                    for capability in accessory.capabilities() {
                        subscriptions.bind(&key, capability);
                    }
                    directory.insert(accessory);
                    loaded += 1;
                }
                Err(err) => tracing::warn!(%err, %key, "skipping unreadable cached accessory"),
            }
        }
        tracing::info!(loaded, "rehydrated accessories from cache");
        Ok(loaded)
    }

    /// Run one full reconciliation pass.
    ///
    /// Host registration failures are logged and do not abort the pass.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Hub`] if the scene or device list cannot be
    /// fetched; the directory is left untouched in that case.
    #[tracing::instrument(skip(self))]
    pub async fn reconcile(&self) -> Result<ReconcileReport, BridgeError> {
        if self.settings.security_system {
            let scenes = self.hub.get_scenes().await?;
            *self.state.scenes.write().await = SceneDirectory::from_scenes(&scenes);
        }
        let devices = self.hub.get_devices().await?;
        let bundles = self.bundles(devices);

        let mut directory = self.state.directory.write().await;
        let mut subscriptions = self.state.subscriptions.write().await;
        let previous = directory.keys();
        let mut touched = HashSet::with_capacity(bundles.len());
        let mut report = ReconcileReport::default();

        for bundle in bundles {
            let key = bundle.key();
            let created = !directory.contains(&key);
            if created {
                match Accessory::new(key.clone(), bundle.name.clone()) {
                    Ok(accessory) => {
                        directory.insert(accessory);
                    }
                    Err(err) => {
                        tracing::warn!(%err, %key, "rejected accessory bundle");
                        continue;
                    }
                }
            }
            let Some(accessory) = directory.get_mut(&key) else {
                continue;
            };
            for stale in accessory.remove_stale(&bundle.capabilities) {
                subscriptions.prune_capability(&stale);
            }
            for added in accessory.add_missing(&bundle.capabilities) {
                subscriptions.bind(&key, &added);
            }
            touched.insert(key.clone());

            if created {
                if let Err(err) = self.host.register(accessory).await {
                    tracing::warn!(%err, %key, "failed to register accessory");
                }
                report.created.push(key);
            } else {
                if let Err(err) = self.host.update(accessory).await {
                    tracing::warn!(%err, %key, "failed to update accessory");
                }
                report.updated.push(key);
            }
        }

        let mut gone: Vec<_> = previous.difference(&touched).cloned().collect();
        gone.sort();
        for key in gone {
            let Some(accessory) = directory.remove(&key) else {
                continue;
            };
            subscriptions.prune_accessory(&key);
            if let Err(err) = self.host.unregister(&accessory).await {
                tracing::warn!(%err, %key, "failed to unregister accessory");
            }
            report.removed.push(key);
        }

        tracing::info!(
            created = report.created.len(),
            updated = report.updated.len(),
            removed = report.removed.len(),
            subscriptions = subscriptions.len(),
            "reconciliation complete"
        );
        Ok(report)
    }

    fn bundles(&self, devices: Vec<Device>) -> Vec<AccessoryBundle> {
        let exposed: Vec<Device> = devices.into_iter().filter(Device::is_exposed).collect();
        let mut bundles = Vec::with_capacity(exposed.len());
        for device in &exposed {
            let siblings = device::find_siblings(device, &exposed);
            match self.factory.build(device, &siblings) {
                Some(bundle) => bundles.push(bundle),
                None => tracing::debug!(
                    device_id = %device.id,
                    type_tag = %device.type_tag,
                    "no accessory for device"
                ),
            }
        }
        bundles.extend(
            self.settings
                .switch_global_variables
                .iter()
                .map(|name| out_of_band::variable_switch_bundle(name)),
        );
        if self.settings.security_system {
            bundles.push(out_of_band::security_bundle());
        }
        bundles
    }
}
