//! Shared application state for axum handlers.

use std::sync::Arc;

use hcbridge_app::bridge::Bridge;
use hcbridge_app::event_bus::InProcessEventBus;
use hcbridge_app::ports::{AccessoryFactory, AccessoryHost, EventPublisher, HubClient};
use hcbridge_app::services::facet_service::FacetService;
use hcbridge_app::services::reconcile_service::ReconcileService;
use hcbridge_app::state::EngineState;

/// Application state shared across all axum handlers.
///
/// Generic over the hub client, accessory factory, host and event publisher
/// to avoid dynamic dispatch. `Clone` is implemented manually so the
/// underlying types do not need to be `Clone`; only the `Arc` wrappers are.
pub struct AppState<H, F, A, P> {
    /// Facet read/write routing.
    pub facets: Arc<FacetService<H, P>>,
    /// On-demand reconciliation.
    pub reconciler: Arc<ReconcileService<H, F, A>>,
    /// Directory and subscription registry.
    pub engine: Arc<EngineState>,
    /// Broadcast bus feeding the SSE stream.
    pub event_bus: Arc<InProcessEventBus>,
}

impl<H, F, A, P> Clone for AppState<H, F, A, P> {
    fn clone(&self) -> Self {
        Self {
            facets: Arc::clone(&self.facets),
            reconciler: Arc::clone(&self.reconciler),
            engine: Arc::clone(&self.engine),
            event_bus: Arc::clone(&self.event_bus),
        }
    }
}

impl<H, F, A, P> AppState<H, F, A, P>
where
    H: HubClient + Clone + 'static,
    F: AccessoryFactory + 'static,
    A: AccessoryHost + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    /// Share the services of a running [`Bridge`].
    #[must_use]
    pub fn from_bridge(bridge: &Bridge<H, F, A, P>, event_bus: Arc<InProcessEventBus>) -> Self {
        Self::from_arcs(
            Arc::clone(bridge.facets()),
            Arc::clone(bridge.reconciler()),
            Arc::clone(bridge.state()),
            event_bus,
        )
    }

    /// Create a new application state from pre-wrapped `Arc` services.
    #[must_use]
    pub fn from_arcs(
        facets: Arc<FacetService<H, P>>,
        reconciler: Arc<ReconcileService<H, F, A>>,
        engine: Arc<EngineState>,
        event_bus: Arc<InProcessEventBus>,
    ) -> Self {
        Self {
            facets,
            reconciler,
            engine,
            event_bus,
        }
    }
}
