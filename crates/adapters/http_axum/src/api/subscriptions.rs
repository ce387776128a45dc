//! Read-only view of the subscription registry.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use hcbridge_app::ports::{AccessoryFactory, AccessoryHost, EventPublisher, HubClient};
use hcbridge_domain::facet::FacetKind;
use hcbridge_domain::id::{HubId, IdentityKey};
use hcbridge_domain::subscription::{Subscription, WatchedProperty};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SubscriptionView {
    pub device_id: HubId,
    pub key: IdentityKey,
    pub subtype: String,
    pub facet: FacetKind,
    pub property: WatchedProperty,
}

impl From<&Subscription> for SubscriptionView {
    fn from(subscription: &Subscription) -> Self {
        Self {
            device_id: subscription.device_id,
            key: subscription.key.clone(),
            subtype: subscription.capability.subtype().to_string(),
            facet: subscription.facet.kind(),
            property: subscription.property,
        }
    }
}

/// `GET /api/subscriptions`
pub async fn list<H, F, A, P>(
    State(state): State<AppState<H, F, A, P>>,
) -> Json<Vec<SubscriptionView>>
where
    H: HubClient + 'static,
    F: AccessoryFactory + 'static,
    A: AccessoryHost + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let registry = state.engine.subscriptions.read().await;
    Json(registry.entries().iter().map(SubscriptionView::from).collect())
}
