//! JSON REST handlers for reading and writing a single facet.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use hcbridge_app::ports::{AccessoryFactory, AccessoryHost, EventPublisher, HubClient};
use hcbridge_app::services::facet_service::{FacetTarget, WriteContext, WriteOutcome};
use hcbridge_domain::capability::{CapabilityKind, CapabilitySubtype};
use hcbridge_domain::facet::{FacetKind, FacetValue};
use hcbridge_domain::id::IdentityKey;

use crate::error::ApiError;
use crate::state::AppState;

/// Path segments addressing one facet.
#[derive(Deserialize)]
pub struct FacetPath {
    pub key: String,
    pub subtype: String,
    pub facet: String,
}

/// Optional capability kind, for accessories exposing two capabilities
/// with the same subtype.
#[derive(Deserialize)]
pub struct FacetQuery {
    pub kind: Option<CapabilityKind>,
}

/// Origin of a write as declared by the caller.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteSource {
    #[default]
    Host,
    HubPush,
    Internal,
}

impl From<WriteSource> for WriteContext {
    fn from(source: WriteSource) -> Self {
        match source {
            WriteSource::Host => Self::Host,
            WriteSource::HubPush => Self::HubPush,
            WriteSource::Internal => Self::Internal,
        }
    }
}

/// Request body for writing a facet.
#[derive(Deserialize)]
pub struct WriteFacetRequest {
    pub value: FacetValue,
    #[serde(default)]
    pub context: WriteSource,
}

#[derive(Debug, Serialize)]
pub struct FacetValueBody {
    pub value: FacetValue,
}

/// Possible responses from the read endpoint.
pub enum ReadResponse {
    Ok(Json<FacetValueBody>),
}

impl IntoResponse for ReadResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the write endpoint.
pub enum WriteResponse {
    /// Commands were sent to the hub.
    NoContent,
    /// The write was ignored or had no resolver.
    Accepted,
}

impl IntoResponse for WriteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
            Self::Accepted => StatusCode::ACCEPTED.into_response(),
        }
    }
}

fn target(path: FacetPath, query: FacetQuery) -> Result<FacetTarget, ApiError> {
    Ok(FacetTarget {
        key: IdentityKey::from_raw(path.key),
        kind: query.kind,
        subtype: CapabilitySubtype::parse(&path.subtype)?,
        facet: FacetKind::from_str(&path.facet)?,
    })
}

/// `GET /api/accessories/{key}/capabilities/{subtype}/facets/{facet}`
pub async fn read<H, F, A, P>(
    State(state): State<AppState<H, F, A, P>>,
    Path(path): Path<FacetPath>,
    Query(query): Query<FacetQuery>,
) -> Result<ReadResponse, ApiError>
where
    H: HubClient + 'static,
    F: AccessoryFactory + 'static,
    A: AccessoryHost + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let target = target(path, query)?;
    let value = state.facets.handle_read(&target).await?;
    Ok(ReadResponse::Ok(Json(FacetValueBody { value })))
}

/// `PUT /api/accessories/{key}/capabilities/{subtype}/facets/{facet}`
pub async fn write<H, F, A, P>(
    State(state): State<AppState<H, F, A, P>>,
    Path(path): Path<FacetPath>,
    Query(query): Query<FacetQuery>,
    Json(req): Json<WriteFacetRequest>,
) -> Result<WriteResponse, ApiError>
where
    H: HubClient + 'static,
    F: AccessoryFactory + 'static,
    A: AccessoryHost + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let target = target(path, query)?;
    let outcome = state
        .facets
        .handle_write(&target, req.value, req.context.into())
        .await?;
    Ok(match outcome {
        WriteOutcome::Applied => WriteResponse::NoContent,
        WriteOutcome::Ignored | WriteOutcome::Unhandled => WriteResponse::Accepted,
    })
}

#[cfg(test)]
mod tests {
    use crate::router;
    use crate::test_support::{body_json, test_state, test_state_with};
    use axum::body::Body;
    use hcbridge_app::settings::BridgeSettings;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    const ON_FACET: &str = "/api/accessories/Lamp1/capabilities/3----/facets/on";

    fn put(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn should_read_facet_value_from_hub() {
        let (state, _) = test_state().await;
        let response = router::build(state).oneshot(get(ON_FACET)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["value"], true);
    }

    #[tokio::test]
    async fn should_return_bad_request_when_facet_name_unknown() {
        let (state, _) = test_state().await;
        let response = router::build(state)
            .oneshot(get("/api/accessories/Lamp1/capabilities/3----/facets/warp"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_return_bad_request_when_subtype_malformed() {
        let (state, _) = test_state().await;
        let response = router::build(state)
            .oneshot(get("/api/accessories/Lamp1/capabilities/lamp----/facets/on"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_return_not_implemented_when_facet_has_no_read_resolver() {
        let (state, _) = test_state().await;
        let response = router::build(state)
            .oneshot(get(
                "/api/accessories/Lamp1/capabilities/3----/facets/brightness",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn should_return_bad_gateway_when_hub_fails() {
        let (state, handles) = test_state().await;
        handles.hub.fail();
        let response = router::build(state).oneshot(get(ON_FACET)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn should_send_command_and_publish_when_host_writes() {
        let (state, handles) = test_state().await;
        let mut rx = handles.event_bus.subscribe();
        let response = router::build(state)
            .oneshot(put(ON_FACET, r#"{"value": false}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(handles.hub.actions(), vec!["3 turnOff".to_string()]);
        let event = rx.recv().await.unwrap();
        assert_eq!(event.key.as_str(), "Lamp1");
        assert_eq!(event.value, false.into());
    }

    #[tokio::test]
    async fn should_accept_without_commands_when_write_is_a_hub_push() {
        let (state, handles) = test_state().await;
        let response = router::build(state)
            .oneshot(put(ON_FACET, r#"{"value": true, "context": "hub_push"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(handles.hub.actions().is_empty());
    }

    #[tokio::test]
    async fn should_accept_without_commands_when_facet_has_no_write_resolver() {
        let (state, handles) = test_state().await;
        let response = router::build(state)
            .oneshot(put(
                "/api/accessories/Lamp1/capabilities/3----/facets/brightness",
                r#"{"value": 40}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(handles.hub.actions().is_empty());
    }

    #[tokio::test]
    async fn should_return_not_found_when_capability_unknown() {
        let (state, _) = test_state().await;
        let response = router::build(state)
            .oneshot(put(
                "/api/accessories/Lamp1/capabilities/8----/facets/on",
                r#"{"value": true}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    /// `G-Away%2DMode---`, percent-encoded once more for the path.
    const AWAY_MODE_FACET: &str =
        "/api/accessories/Away-Mode0/capabilities/G-Away%252DMode---/facets/on";

    async fn away_mode_state() -> crate::test_support::TestState {
        let (state, _) = test_state_with(BridgeSettings {
            switch_global_variables: vec!["Away-Mode".to_string()],
            ..BridgeSettings::default()
        })
        .await;
        state
    }

    #[tokio::test]
    async fn should_read_hyphenated_variable_switch() {
        let response = router::build(away_mode_state().await)
            .oneshot(get(AWAY_MODE_FACET))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["value"], false);
    }

    #[tokio::test]
    async fn should_write_hyphenated_variable_switch() {
        let response = router::build(away_mode_state().await)
            .oneshot(put(AWAY_MODE_FACET, r#"{"value": true}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
