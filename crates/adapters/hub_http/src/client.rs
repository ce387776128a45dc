use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use url::Url;

use hcbridge_app::ports::HubClient;
use hcbridge_domain::delta::RefreshResponse;
use hcbridge_domain::device::{Device, GlobalVariable, Scene};
use hcbridge_domain::error::HubError;
use hcbridge_domain::id::{HubId, SceneId};
use hcbridge_domain::snapshot::PropertySnapshot;

use crate::config::HubConfig;
use crate::error::{HubHttpError, from_reqwest};

/// The part of a device document `get_device_properties` keeps.
#[derive(Deserialize)]
struct DeviceDocument {
    #[serde(default)]
    properties: PropertySnapshot,
}

/// HTTP client for the hub's REST API.
///
/// Cheap to clone: the underlying [`reqwest::Client`] shares its pool.
#[derive(Clone)]
pub struct HubHttpClient {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: SecretString,
}

impl std::fmt::Debug for HubHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubHttpClient")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl HubHttpClient {
    /// Build a client with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`HubHttpError`] if the URL cannot be a base or the TLS
    /// backend fails to initialize.
    pub fn new(config: &HubConfig) -> Result<Self, HubHttpError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Self::with_client(http, config)
    }

    /// Build a client around an existing [`reqwest::Client`].
    ///
    /// # Errors
    ///
    /// Returns [`HubHttpError::InvalidUrl`] if the URL cannot be a base.
    pub fn with_client(http: reqwest::Client, config: &HubConfig) -> Result<Self, HubHttpError> {
        if config.url.cannot_be_a_base() {
            return Err(HubHttpError::InvalidUrl(config.url.clone()));
        }
        Ok(Self {
            http,
            base_url: config.url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/api/{segments...}`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!(%method, %url, "hub request");
        self.http
            .request(method, url)
            .basic_auth(&self.username, Some(self.password.expose_secret()))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, HubError> {
        let response = builder.send().await.map_err(from_reqwest)?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            tracing::debug!(%status, url = %response.url(), "hub rejected request");
            Err(HubError::Status(status.as_u16()))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, HubError> {
        let url = self.endpoint(segments);
        let response = self.send(self.request(Method::GET, url)).await?;
        response.json::<T>().await.map_err(from_reqwest)
    }
}

impl HubClient for HubHttpClient {
    async fn get_scenes(&self) -> Result<Vec<Scene>, HubError> {
        self.get_json(&["scenes"]).await
    }

    async fn get_devices(&self) -> Result<Vec<Device>, HubError> {
        self.get_json(&["devices"]).await
    }

    async fn get_device_properties(&self, id: HubId) -> Result<PropertySnapshot, HubError> {
        let id = id.to_string();
        let document: DeviceDocument = self.get_json(&["devices", &id]).await?;
        Ok(document.properties)
    }

    async fn get_global_variable(&self, name: &str) -> Result<GlobalVariable, HubError> {
        self.get_json(&["globalVariables", name]).await
    }

    async fn refresh_states(&self, cursor: u64) -> Result<RefreshResponse, HubError> {
        let mut url = self.endpoint(&["refreshStates"]);
        url.query_pairs_mut()
            .append_pair("last", &cursor.to_string());
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(from_reqwest)?;
        match response.status() {
            StatusCode::BAD_REQUEST => Err(HubError::ExpiredCursor(cursor)),
            status if !status.is_success() => Err(HubError::Status(status.as_u16())),
            _ => response.json().await.map_err(from_reqwest),
        }
    }

    async fn call_action(
        &self,
        device: HubId,
        action: &str,
        args: &[serde_json::Value],
    ) -> Result<(), HubError> {
        let device = device.to_string();
        let url = self.endpoint(&["devices", &device, "action", action]);
        let body = json!({ "args": args });
        self.send(self.request(Method::POST, url).json(&body))
            .await
            .map(drop)
    }

    async fn set_global_variable(&self, name: &str, value: &str) -> Result<(), HubError> {
        let url = self.endpoint(&["globalVariables", name]);
        let body = json!({ "name": name, "value": value });
        self.send(self.request(Method::PUT, url).json(&body))
            .await
            .map(drop)
    }

    async fn start_scene(&self, id: SceneId) -> Result<(), HubError> {
        let id = id.to_string();
        let url = self.endpoint(&["scenes", &id, "action", "start"]);
        self.send(self.request(Method::POST, url)).await.map(drop)
    }
}
