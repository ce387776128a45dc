//! # hcbridge-domain
//!
//! Pure domain model for the hcbridge synchronization engine.
//!
//! ## Responsibilities
//! - Foundational types: hub identifiers, identity keys, error taxonomy
//! - Hub-side snapshots: **Devices**, scenes, global variables, property snapshots
//! - The delta model returned by the hub's `refreshStates` endpoint
//! - Host-side model: **Accessories**, **Capabilities** (with their structured
//!   subtype), **Facets** and facet values
//! - **Subscriptions** and the bind-phase watched-property rule table
//! - Small value mappings the engine itself owns (security state, temperature units)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;

pub mod accessory;
pub mod capability;
pub mod delta;
pub mod device;
pub mod event;
pub mod facet;
pub mod security;
pub mod snapshot;
pub mod subscription;
pub mod temperature;
