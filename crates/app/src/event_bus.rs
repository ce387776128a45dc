//! In-process fan-out of [`FacetChanged`] events to the host-facing streams.

use std::future::Future;

use tokio::sync::broadcast;

use hcbridge_domain::error::BridgeError;
use hcbridge_domain::event::FacetChanged;

use crate::ports::EventPublisher;

/// Facet change bus over a tokio [`broadcast`] channel.
///
/// Every open stream gets its own receiver. A receiver that falls more than
/// `capacity` events behind sees [`broadcast::error::RecvError::Lagged`] and
/// resumes from the oldest retained event. With no stream open, published
/// changes are dropped.
pub struct InProcessEventBus {
    sender: broadcast::Sender<FacetChanged>,
}

impl InProcessEventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Open a receiver for changes published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FacetChanged> {
        self.sender.subscribe()
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(
        &self,
        event: FacetChanged,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        let key = event.key.clone();
        let facet = event.facet;
        match self.sender.send(event) {
            Ok(streams) => tracing::trace!(%key, %facet, streams, "facet change fanned out"),
            Err(_) => tracing::trace!(%key, %facet, "no open stream, facet change dropped"),
        }
        async { Ok(()) }
    }
}
