//! # hcbridge-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `AccessoryHost` and `AccessoryCache` ports defined in
//!   `hcbridge-app::ports::host`: registration upserts the accessory record,
//!   unregistration deletes it, and startup reads every record back
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between cached accessory records and database rows
//!
//! ## Dependency rule
//! Depends on `hcbridge-app` (for port traits) and `hcbridge-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod accessory_repo;
pub mod error;
pub mod pool;
