//! Bridge — wires the engine components around one hub client and runs
//! startup: rehydrate, reconcile until it succeeds, then start polling.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::dispatch::DispatchRegistry;
use crate::dispatcher::UpdateDispatcher;
use crate::poller::Poller;
use crate::ports::{AccessoryCache, AccessoryFactory, AccessoryHost, EventPublisher, HubClient};
use crate::services::facet_service::FacetService;
use crate::services::reconcile_service::ReconcileService;
use crate::settings::BridgeSettings;
use crate::state::EngineState;

pub struct Bridge<H, F, A, P> {
    state: Arc<EngineState>,
    settings: Arc<BridgeSettings>,
    facets: Arc<FacetService<H, P>>,
    reconciler: Arc<ReconcileService<H, F, A>>,
    poller: Arc<Poller<H, P>>,
}

impl<H, F, A, P> Bridge<H, F, A, P>
where
    H: HubClient + Clone,
    F: AccessoryFactory,
    A: AccessoryHost,
    P: EventPublisher + Send + Sync,
{
    pub fn new(
        hub: H,
        factory: F,
        host: A,
        publisher: P,
        dispatch: DispatchRegistry,
        settings: BridgeSettings,
    ) -> Self {
        let state = Arc::new(EngineState::new());
        let settings = Arc::new(settings);
        let dispatch = Arc::new(dispatch);
        let unit = settings.temperature_unit;
        let dispatcher = Arc::new(UpdateDispatcher::new(
            Arc::clone(&state),
            Arc::clone(&dispatch),
            publisher,
            unit,
        ));
        let facets = Arc::new(FacetService::new(
            hub.clone(),
            Arc::clone(&state),
            dispatch,
            Arc::clone(&dispatcher),
            unit,
        ));
        let reconciler = Arc::new(ReconcileService::new(
            hub.clone(),
            factory,
            host,
            Arc::clone(&state),
            Arc::clone(&settings),
        ));
        let poller = Arc::new(Poller::new(
            hub,
            dispatcher,
            Arc::clone(&state),
            Arc::clone(&settings),
        ));
        Self {
            state,
            settings,
            facets,
            reconciler,
            poller,
        }
    }

    #[must_use]
    pub fn state(&self) -> &Arc<EngineState> {
        &self.state
    }

    #[must_use]
    pub fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    #[must_use]
    pub fn facets(&self) -> &Arc<FacetService<H, P>> {
        &self.facets
    }

    #[must_use]
    pub fn reconciler(&self) -> &Arc<ReconcileService<H, F, A>> {
        &self.reconciler
    }

    #[must_use]
    pub fn poller(&self) -> &Arc<Poller<H, P>> {
        &self.poller
    }

    /// Reconcile, retrying with a fixed delay until a pass succeeds.
    pub async fn reconcile_until_ready(&self) {
        let mut attempt = 1u32;
        loop {
            match self.reconciler.reconcile().await {
                Ok(_) => return,
                Err(err) => {
                    tracing::warn!(
                        %err,
                        attempt,
                        retry_in = ?self.settings.reconcile_retry,
                        "startup reconciliation failed"
                    );
                    attempt = attempt.saturating_add(1);
                    tokio::time::sleep(self.settings.reconcile_retry).await;
                }
            }
        }
    }
}

impl<H, F, A, P> Bridge<H, F, A, P>
where
    H: HubClient + Clone + 'static,
    F: AccessoryFactory,
    A: AccessoryHost,
    P: EventPublisher + Send + Sync + 'static,
{
    /// Rehydrate from `cache`, reconcile, then spawn the poller.
    ///
    /// Returns the poller task, or `None` when polling is disabled.
    pub async fn start(&self, cache: &impl AccessoryCache) -> Option<JoinHandle<()>> {
        if let Err(err) = self.reconciler.rehydrate(cache).await {
            tracing::warn!(%err, "accessory cache unavailable, starting empty");
        }
        self.reconcile_until_ready().await;
        if self.settings.poller_enabled() {
            Some(Arc::clone(&self.poller).spawn())
        } else {
            tracing::info!("poll interval is zero, poller disabled");
            None
        }
    }
}
