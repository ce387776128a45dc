//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use hcbridge_app::ports::{AccessoryFactory, AccessoryHost, EventPublisher, HubClient};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests the API routes under `/api` and adds a [`TraceLayer`] that logs
/// each request and response through `tracing`.
pub fn build<H, F, A, P>(state: AppState<H, F, A, P>) -> Router
where
    H: HubClient + 'static,
    F: AccessoryFactory + 'static,
    A: AccessoryHost + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
