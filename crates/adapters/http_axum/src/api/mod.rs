//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod bridge;
#[allow(clippy::missing_errors_doc)]
pub mod devices;
#[allow(clippy::missing_errors_doc)]
pub mod entities;
pub mod sse;

use axum::Router;
use axum::routing::{get, post};

use comforthub_app::ports::{BridgeFeed, DeviceRepository, EntityRepository, EventPublisher};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<ER, DR, EP, BF>() -> Router<AppState<ER, DR, EP, BF>>
where
    ER: EntityRepository + Send + Sync + 'static,
    DR: DeviceRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
    BF: BridgeFeed + Send + Sync + 'static,
{
    Router::new()
        // Entities
        .route("/entities", get(entities::list::<ER, DR, EP, BF>))
        .route("/entities/{id}", get(entities::get::<ER, DR, EP, BF>))
        // Devices
        .route("/devices", get(devices::list::<ER, DR, EP, BF>))
        .route("/devices/{id}", get(devices::get::<ER, DR, EP, BF>))
        // Events
        .route("/events/stream", get(sse::stream::<ER, DR, EP, BF>))
        // Bridge ingress
        .route("/bridge/messages", post(bridge::push::<ER, DR, EP, BF>))
}
