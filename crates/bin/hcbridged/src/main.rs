//! # hcbridged — hcbridge daemon
//!
//! Composition root that wires all adapters together and runs the bridge.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars) and install logging
//! - Initialize the `SQLite` accessory cache and run migrations
//! - Build the hub client, the built-in catalog and its resolver tables
//! - Start the bridge: rehydrate, reconcile until the hub answers, poll
//! - Serve the host-facing HTTP surface
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no engine logic belongs here.

mod config;

use std::sync::Arc;

use hcbridge_adapter_catalog::{CatalogFactory, register_resolvers};
use hcbridge_adapter_http_axum::state::AppState;
use hcbridge_adapter_hub_http::HubHttpClient;
use hcbridge_adapter_storage_sqlite_sqlx::pool;
use hcbridge_app::bridge::Bridge;
use hcbridge_app::dispatch::DispatchRegistry;
use hcbridge_app::event_bus::InProcessEventBus;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Accessory cache
    let db = pool::Config {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let repo = db.accessories();

    // Hub and resolver tables
    let hub = HubHttpClient::new(&config.hub_config()?)?;
    let settings = config.bridge_settings();
    let mut dispatch = DispatchRegistry::new();
    register_resolvers(&mut dispatch, &settings);

    // Engine
    let event_bus = Arc::new(InProcessEventBus::new(256));
    let bridge = Arc::new(Bridge::new(
        hub,
        CatalogFactory::new(),
        repo.clone(),
        Arc::clone(&event_bus),
        dispatch,
        settings,
    ));
    let state = AppState::from_bridge(&bridge, event_bus);

    let startup = tokio::spawn({
        let bridge = Arc::clone(&bridge);
        async move {
            if let Some(poller) = bridge.start(&repo).await {
                if let Err(err) = poller.await {
                    tracing::error!(%err, "poller task ended abnormally");
                }
            }
        }
    });

    // HTTP
    let app = hcbridge_adapter_http_axum::router::build(state);
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, hub = %config.hub.url.trim(), "hcbridged listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    startup.abort();
    tracing::info!("hcbridged stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
