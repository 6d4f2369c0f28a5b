//! # comforthubd: comforthub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repositories, application services and the event bus
//! - Start the xComfort integration when enabled
//! - Build the axum router and serve until Ctrl-C
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! No domain logic belongs here.

mod config;

use std::sync::Arc;

use comforthub_adapter_http_axum::state::AppState;
use comforthub_adapter_storage_sqlite_sqlx::{
    Config as DatabaseConfig, SqliteDeviceRepository, SqliteEntityRepository,
};
use comforthub_adapter_xcomfort::XComfortIntegration;
use comforthub_adapter_xcomfort::bridge::PayloadBridge;
use comforthub_app::event_bus::InProcessEventBus;
use comforthub_app::ports::{Integration, IntegrationContext};
use comforthub_app::services::device_service::DeviceService;
use comforthub_app::services::entity_service::EntityService;
use comforthub_app::services::integration_context::ServiceContext;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

type XComfortTask = JoinHandle<XComfortIntegration<PayloadBridge>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.logging.directive()))
        .init();

    // Database
    let db = DatabaseConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    // Repositories
    let entity_repo = SqliteEntityRepository::new(pool.clone());
    let device_repo = SqliteDeviceRepository::new(pool);

    // Event bus
    let event_bus = Arc::new(InProcessEventBus::new(256));

    // Services
    let entity_service = Arc::new(EntityService::new(entity_repo, Arc::clone(&event_bus)));
    let device_service = Arc::new(DeviceService::new(device_repo));
    let ctx = ServiceContext::new(
        Arc::clone(&device_service),
        Arc::clone(&entity_service),
        Arc::clone(&event_bus),
    );

    // HTTP state, plus the bridge ingress when the integration runs
    let mut state = AppState::new(entity_service, device_service, Arc::clone(&event_bus));
    let xcomfort_task = if config.xcomfort.enabled {
        let (integration, feed) = XComfortIntegration::with_payload_bridge(config.xcomfort.clone());
        state = state.with_bridge_feed(Arc::new(feed));
        Some(spawn_integration(integration, ctx))
    } else {
        tracing::info!("xComfort integration disabled");
        None
    };

    let app = comforthub_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "comforthubd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(task) = xcomfort_task {
        stop_integration(task).await;
    }

    tracing::info!("comforthubd stopped");
    Ok(())
}

/// Run setup and start pushing entity updates.
///
/// Setup waits for the bridge to report its inventory through the HTTP
/// ingress, so it runs beside the server rather than before it.
fn spawn_integration<C>(mut integration: XComfortIntegration<PayloadBridge>, ctx: C) -> XComfortTask
where
    C: IntegrationContext + Clone + 'static,
{
    tokio::spawn(async move {
        match integration.setup(&ctx).await {
            Ok(()) => {
                tracing::info!(
                    entities = integration.entities().len(),
                    "xComfort integration set up"
                );
                if let Err(err) = integration.start_background(ctx).await {
                    tracing::error!(error = %err, "xComfort background start failed");
                }
            }
            Err(err) => tracing::error!(error = %err, "xComfort setup failed"),
        }
        integration
    })
}

async fn stop_integration(task: XComfortTask) {
    if !task.is_finished() {
        tracing::warn!("xComfort setup still running, aborting");
        task.abort();
        return;
    }
    match task.await {
        Ok(mut integration) => {
            if let Err(err) = integration.teardown().await {
                tracing::warn!(error = %err, "xComfort teardown failed");
            }
        }
        Err(err) => tracing::warn!(error = %err, "xComfort task failed"),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
