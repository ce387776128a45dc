//! Event bus port — publish facet change events.

use std::future::Future;

use hcbridge_domain::error::BridgeError;
use hcbridge_domain::event::FacetChanged;

/// Publishes facet change events to interested subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: FacetChanged)
    -> impl Future<Output = Result<(), BridgeError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(
        &self,
        event: FacetChanged,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        (**self).publish(event)
    }
}
