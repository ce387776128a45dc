//! # hcbridge-adapter-hub-http
//!
//! [`HubClient`](hcbridge_app::ports::HubClient) implementation over the
//! hub's REST API, built on [reqwest](https://docs.rs/reqwest).
//!
//! ## Endpoints
//! | Port method | Request |
//! |-------------|---------|
//! | `get_scenes` | `GET /api/scenes` |
//! | `get_devices` | `GET /api/devices` |
//! | `get_device_properties` | `GET /api/devices/{id}` (the `properties` object) |
//! | `get_global_variable` | `GET /api/globalVariables/{name}` |
//! | `refresh_states` | `GET /api/refreshStates?last={cursor}` |
//! | `call_action` | `POST /api/devices/{id}/action/{action}` |
//! | `set_global_variable` | `PUT /api/globalVariables/{name}` |
//! | `start_scene` | `POST /api/scenes/{id}/action/start` |
//!
//! Every request carries HTTP basic credentials. A `400` from
//! `refreshStates` means the cursor is unknown to the hub and maps to
//! [`HubError::ExpiredCursor`](hcbridge_domain::error::HubError::ExpiredCursor).
//!
//! ## Dependency rule
//! Depends on `hcbridge-app` (for the port trait) and `hcbridge-domain`
//! (for the payload types). Never leaks reqwest types past the port.

mod client;
mod config;
mod error;

pub use client::HubHttpClient;
pub use config::HubConfig;
pub use error::HubHttpError;
