//! JSON REST handlers for accessories.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use hcbridge_app::ports::{AccessoryFactory, AccessoryHost, EventPublisher, HubClient};
use hcbridge_domain::accessory::Accessory;
use hcbridge_domain::capability::{Capability, CapabilityKind};
use hcbridge_domain::error::{BridgeError, NotFoundError};
use hcbridge_domain::facet::{FacetKind, FacetValue};
use hcbridge_domain::id::IdentityKey;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FacetView {
    pub facet: FacetKind,
    pub value: FacetValue,
}

#[derive(Debug, Serialize)]
pub struct CapabilityView {
    pub kind: CapabilityKind,
    pub subtype: String,
    pub facets: Vec<FacetView>,
}

impl From<&Capability> for CapabilityView {
    fn from(capability: &Capability) -> Self {
        Self {
            kind: capability.kind(),
            subtype: capability.subtype().to_string(),
            facets: capability
                .facets()
                .iter()
                .map(|facet| FacetView {
                    facet: facet.kind(),
                    value: facet.value(),
                })
                .collect(),
        }
    }
}

/// An accessory with its capabilities and cached facet values.
#[derive(Debug, Serialize)]
pub struct AccessoryView {
    pub key: IdentityKey,
    pub name: String,
    pub uuid: String,
    pub capabilities: Vec<CapabilityView>,
}

impl From<&Accessory> for AccessoryView {
    fn from(accessory: &Accessory) -> Self {
        Self {
            key: accessory.key().clone(),
            name: accessory.name().to_string(),
            uuid: accessory.uuid().to_string(),
            capabilities: accessory
                .capabilities()
                .iter()
                .map(|c| CapabilityView::from(c.as_ref()))
                .collect(),
        }
    }
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<AccessoryView>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<AccessoryView>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/accessories`
pub async fn list<H, F, A, P>(State(state): State<AppState<H, F, A, P>>) -> ListResponse
where
    H: HubClient + 'static,
    F: AccessoryFactory + 'static,
    A: AccessoryHost + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let directory = state.engine.directory.read().await;
    let accessories = directory
        .sorted()
        .into_iter()
        .map(AccessoryView::from)
        .collect();
    ListResponse::Ok(Json(accessories))
}

/// `GET /api/accessories/{key}`
pub async fn get<H, F, A, P>(
    State(state): State<AppState<H, F, A, P>>,
    Path(key): Path<String>,
) -> Result<GetResponse, ApiError>
where
    H: HubClient + 'static,
    F: AccessoryFactory + 'static,
    A: AccessoryHost + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    let key = IdentityKey::from_raw(key);
    let directory = state.engine.directory.read().await;
    let accessory = directory.get(&key).ok_or_else(|| {
        BridgeError::from(NotFoundError {
            entity: "Accessory",
            id: key.to_string(),
        })
    })?;
    Ok(GetResponse::Ok(Json(AccessoryView::from(accessory))))
}

#[cfg(test)]
mod tests {
    use crate::router;
    use crate::test_support::{body_json, test_state};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn should_list_accessories_with_cached_values() {
        let (state, _) = test_state().await;
        let response = router::build(state)
            .oneshot(
                Request::builder()
                    .uri("/api/accessories")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let accessories = body.as_array().unwrap();
        assert_eq!(accessories.len(), 1);
        assert_eq!(accessories[0]["name"], "Lamp");
        assert_eq!(accessories[0]["capabilities"][0]["kind"], "switch");
        assert_eq!(accessories[0]["capabilities"][0]["subtype"], "3----");
        assert_eq!(
            accessories[0]["capabilities"][0]["facets"][0]["facet"],
            "on"
        );
    }

    #[tokio::test]
    async fn should_get_accessory_by_key() {
        let (state, _) = test_state().await;
        let response = router::build(state)
            .oneshot(
                Request::builder()
                    .uri("/api/accessories/Lamp1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["key"], "Lamp1");
    }

    #[tokio::test]
    async fn should_return_not_found_when_key_unknown() {
        let (state, _) = test_state().await;
        let response = router::build(state)
            .oneshot(
                Request::builder()
                    .uri("/api/accessories/Garage9")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
