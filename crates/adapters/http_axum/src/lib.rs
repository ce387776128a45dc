//! # hcbridge-adapter-http-axum
//!
//! Host-facing HTTP surface built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - List accessories with their capabilities and cached facet values
//! - Route facet reads and writes to the facet service
//! - Trigger an on-demand reconciliation pass
//! - Expose the subscription registry for inspection
//! - Stream facet change events over SSE
//!
//! ## Dependency rule
//! Depends on `hcbridge-app` (for port traits and services) and
//! `hcbridge-domain` (for types used in request/response mapping). Never
//! leaks axum types into the engine.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;
