//! # hcbridge-app
//!
//! Synchronization engine — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `HubClient` — scenes, devices, properties, variables, deltas, commands
//!   - `AccessoryHost` / `AccessoryCache` — host registration and the
//!     externally owned accessory cache
//!   - `AccessoryFactory` — device to capability bundle
//!   - `ReadResolver` / `WriteResolver` — per-facet value logic
//!   - `EventPublisher` — facet change notifications
//! - Hold the engine state: **Accessory Directory**, **Subscription Registry**,
//!   scene directory
//! - Route hub pushes (**Update Dispatcher**, **Poller**) and host reads and
//!   writes (**Facet Service**) through the **Dispatch Registries**
//! - Keep the directory consistent with the hub (**Reconciliation**)
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `hcbridge-domain` only (plus `tokio` for locks, timers and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod bridge;
pub mod directory;
pub mod dispatch;
pub mod dispatcher;
pub mod event_bus;
pub mod out_of_band;
pub mod poller;
pub mod ports;
pub mod services;
pub mod settings;
pub mod state;
pub mod subscriptions;

#[cfg(test)]
pub(crate) mod test_support;
