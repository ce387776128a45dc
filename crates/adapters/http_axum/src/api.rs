//! JSON REST handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod accessories;
#[allow(clippy::missing_errors_doc)]
pub mod facets;
#[allow(clippy::missing_errors_doc)]
pub mod reconcile;
pub mod sse;
pub mod subscriptions;

use axum::Router;
use axum::routing::{get, post};

use hcbridge_app::ports::{AccessoryFactory, AccessoryHost, EventPublisher, HubClient};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<H, F, A, P>() -> Router<AppState<H, F, A, P>>
where
    H: HubClient + 'static,
    F: AccessoryFactory + 'static,
    A: AccessoryHost + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    Router::new()
        // Accessories
        .route("/accessories", get(accessories::list::<H, F, A, P>))
        .route("/accessories/{key}", get(accessories::get::<H, F, A, P>))
        // Facets
        .route(
            "/accessories/{key}/capabilities/{subtype}/facets/{facet}",
            get(facets::read::<H, F, A, P>).put(facets::write::<H, F, A, P>),
        )
        // Engine
        .route("/reconcile", post(reconcile::run::<H, F, A, P>))
        .route("/subscriptions", get(subscriptions::list::<H, F, A, P>))
        .route("/events/stream", get(sse::stream::<H, F, A, P>))
}
