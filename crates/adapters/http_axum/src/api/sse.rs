//! Server-Sent Events stream of facet changes.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use hcbridge_app::ports::{AccessoryFactory, AccessoryHost, EventPublisher, HubClient};

use crate::state::AppState;

/// `GET /api/events/stream`: one JSON `data:` frame per facet change.
///
/// Lagging subscribers skip the events they missed; the stream ends when
/// the client disconnects.
pub async fn stream<H, F, A, P>(
    State(state): State<AppState<H, F, A, P>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>
where
    H: HubClient + 'static,
    F: AccessoryFactory + 'static,
    A: AccessoryHost + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let events = BroadcastStream::new(state.event_bus.subscribe()).filter_map(|result| {
        match result {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => Some(Ok(Event::default().event("facet_changed").data(json))),
                Err(err) => {
                    tracing::warn!(%err, "failed to serialize facet change for SSE");
                    None
                }
            },
            Err(BroadcastStreamRecvError::Lagged(n)) => {
                tracing::warn!(skipped = n, "SSE subscriber lagged, events dropped");
                None
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
