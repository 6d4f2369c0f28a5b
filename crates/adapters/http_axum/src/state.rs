//! Shared application state for axum handlers.

use std::sync::Arc;

use comforthub_app::event_bus::InProcessEventBus;
use comforthub_app::services::device_service::DeviceService;
use comforthub_app::services::entity_service::EntityService;

/// Application state shared across all axum handlers.
///
/// Generic over the repository types, the event publisher and the bridge
/// feed to avoid dynamic dispatch. `Clone` is implemented manually so the
/// underlying types themselves do not need to be `Clone`.
pub struct AppState<ER, DR, EP, BF> {
    /// Entity registry service.
    pub entity_service: Arc<EntityService<ER, EP>>,
    /// Device registry service.
    pub device_service: Arc<DeviceService<DR>>,
    /// Bus the SSE endpoint subscribes to.
    pub event_bus: Arc<InProcessEventBus>,
    /// Ingress of the bridge integration, absent when it is disabled.
    pub bridge_feed: Option<Arc<BF>>,
}

impl<ER, DR, EP, BF> Clone for AppState<ER, DR, EP, BF> {
    fn clone(&self) -> Self {
        Self {
            entity_service: Arc::clone(&self.entity_service),
            device_service: Arc::clone(&self.device_service),
            event_bus: Arc::clone(&self.event_bus),
            bridge_feed: self.bridge_feed.as_ref().map(Arc::clone),
        }
    }
}

impl<ER, DR, EP, BF> AppState<ER, DR, EP, BF> {
    /// Create a new application state from pre-wrapped `Arc` services.
    ///
    /// Services are shared with the integration context, hence the `Arc`s.
    pub fn new(
        entity_service: Arc<EntityService<ER, EP>>,
        device_service: Arc<DeviceService<DR>>,
        event_bus: Arc<InProcessEventBus>,
    ) -> Self {
        Self {
            entity_service,
            device_service,
            event_bus,
            bridge_feed: None,
        }
    }

    /// Route `POST /api/bridge/messages` to `feed`.
    #[must_use]
    pub fn with_bridge_feed(mut self, feed: Arc<BF>) -> Self {
        self.bridge_feed = Some(feed);
        self
    }
}
