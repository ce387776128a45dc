//! Update Dispatcher — routes hub-reported changes to the read resolvers of
//! subscribed facets, using the change itself as the property snapshot.

use std::sync::Arc;

use hcbridge_domain::capability::Capability;
use hcbridge_domain::delta::Change;
use hcbridge_domain::event::{ChangeOrigin, FacetChanged};
use hcbridge_domain::facet::{Facet, FacetValue};
use hcbridge_domain::id::{HubId, IdentityKey};
use hcbridge_domain::snapshot::{self, PropertySnapshot};
use hcbridge_domain::subscription::Subscription;
use hcbridge_domain::temperature::TemperatureUnit;

use crate::dispatch::DispatchRegistry;
use crate::ports::{EventPublisher, ReadRequest};
use crate::state::EngineState;

pub struct UpdateDispatcher<P> {
    state: Arc<EngineState>,
    dispatch: Arc<DispatchRegistry>,
    publisher: P,
    unit: TemperatureUnit,
}

impl<P: EventPublisher + Send + Sync> UpdateDispatcher<P> {
    pub fn new(
        state: Arc<EngineState>,
        dispatch: Arc<DispatchRegistry>,
        publisher: P,
        unit: TemperatureUnit,
    ) -> Self {
        Self {
            state,
            dispatch,
            publisher,
            unit,
        }
    }

    /// Dispatch one delta change to every subscription it fires.
    ///
    /// Returns the number of resolver invocations.
    pub async fn dispatch_change(&self, change: &Change) -> usize {
        let mut fired = 0;
        for property in change.channels() {
            let matches = self
                .state
                .subscriptions
                .read()
                .await
                .matching_change(change.id, property);
            for subscription in &matches {
                tracing::debug!(
                    device_id = %change.id,
                    %property,
                    facet = %subscription.facet.kind(),
                    "dispatching change"
                );
                if self.apply(subscription, change.snapshot()).await {
                    fired += 1;
                }
            }
        }
        fired
    }

    /// Dispatch an operating-mode change. The reported mode, when present,
    /// is stored on every matched capability first; resolvers then get an
    /// empty snapshot and work from that cached state.
    pub async fn dispatch_mode_change(&self, mode_id: HubId, new_mode: Option<i64>) -> usize {
        let matches = self.state.subscriptions.read().await.matching_mode(mode_id);
        if let Some(mode) = new_mode {
            for subscription in &matches {
                subscription.capability.set_operating_mode(mode);
            }
        }
        let mut fired = 0;
        for subscription in &matches {
            tracing::debug!(
                %mode_id,
                ?new_mode,
                facet = %subscription.facet.kind(),
                "dispatching mode change"
            );
            if self.apply(subscription, PropertySnapshot::empty()).await {
                fired += 1;
            }
        }
        fired
    }

    /// Set a facet's value directly and announce it if it changed.
    pub async fn push_value(
        &self,
        key: &IdentityKey,
        capability: &Capability,
        facet: &Facet,
        value: FacetValue,
        origin: ChangeOrigin,
    ) -> bool {
        if !facet.update(value.clone()) {
            return false;
        }
        let event = FacetChanged::new(
            key.clone(),
            capability.subtype().to_string(),
            facet.kind(),
            value,
            origin,
        );
        if let Err(err) = self.publisher.publish(event).await {
            tracing::warn!(%err, %key, facet = %facet.kind(), "failed to publish facet change");
        }
        true
    }

    async fn apply(&self, subscription: &Subscription, mut snapshot: PropertySnapshot) -> bool {
        let facet = &subscription.facet;
        let Some(entry) = self.dispatch.read(facet.kind()) else {
            tracing::debug!(facet = %facet.kind(), "no read resolver for subscribed facet");
            return false;
        };
        if facet.kind().is_current_temperature() {
            let unit = self.unit;
            snapshot.map_number(snapshot::VALUE, |v| unit.to_celsius(v));
        }
        let request = ReadRequest {
            capability: &subscription.capability,
            facet,
            snapshot: &snapshot,
        };
        match entry.resolver.resolve(&request) {
            Ok(value) => {
                self.push_value(
                    &subscription.key,
                    &subscription.capability,
                    facet,
                    value,
                    ChangeOrigin::Hub,
                )
                .await;
                true
            }
            Err(err) => {
                tracing::warn!(
                    %err,
                    device_id = %subscription.device_id,
                    facet = %facet.kind(),
                    "resolver rejected pushed value"
                );
                false
            }
        }
    }
}
