//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the synchronization engine and the
//! outside world: the hub, the host framework, the accessory cache, the
//! accessory factory and the per-kind value resolvers.

pub mod event_bus;
pub mod factory;
pub mod host;
pub mod hub;
pub mod resolver;

pub use event_bus::EventPublisher;
pub use factory::AccessoryFactory;
pub use host::{AccessoryCache, AccessoryHost};
pub use hub::HubClient;
pub use resolver::{HubCommand, ReadRequest, ReadResolver, WriteRequest, WriteResolver};
