//! Stub ports shared by the handler tests.

use std::sync::{Arc, Mutex};

use comforthub_app::event_bus::InProcessEventBus;
use comforthub_app::ports::{BridgeFeed, DeviceRepository, EntityRepository};
use comforthub_app::services::device_service::DeviceService;
use comforthub_app::services::entity_service::EntityService;
use comforthub_domain::device::Device;
use comforthub_domain::entity::Entity;
use comforthub_domain::error::{HubError, ValidationError};
use comforthub_domain::id::{DeviceId, EntityId};

use crate::state::AppState;

#[derive(Default)]
pub struct StubEntityRepo {
    pub entities: Vec<Entity>,
}

impl EntityRepository for StubEntityRepo {
    async fn create(&self, entity: Entity) -> Result<Entity, HubError> {
        Ok(entity)
    }
    async fn get_by_id(&self, id: EntityId) -> Result<Option<Entity>, HubError> {
        Ok(self.entities.iter().find(|e| e.id == id).cloned())
    }
    async fn get_all(&self) -> Result<Vec<Entity>, HubError> {
        Ok(self.entities.clone())
    }
    async fn find_by_device_id(&self, device_id: DeviceId) -> Result<Vec<Entity>, HubError> {
        Ok(self
            .entities
            .iter()
            .filter(|e| e.device_id == device_id)
            .cloned()
            .collect())
    }
    async fn find_by_entity_id(&self, entity_id: &str) -> Result<Option<Entity>, HubError> {
        Ok(self
            .entities
            .iter()
            .find(|e| e.entity_id == entity_id)
            .cloned())
    }
    async fn update(&self, entity: Entity) -> Result<Entity, HubError> {
        Ok(entity)
    }
    async fn delete(&self, _id: EntityId) -> Result<(), HubError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct StubDeviceRepo {
    pub devices: Vec<Device>,
}

impl DeviceRepository for StubDeviceRepo {
    async fn create(&self, device: Device) -> Result<Device, HubError> {
        Ok(device)
    }
    async fn get_by_id(&self, id: DeviceId) -> Result<Option<Device>, HubError> {
        Ok(self.devices.iter().find(|d| d.id == id).cloned())
    }
    async fn get_all(&self) -> Result<Vec<Device>, HubError> {
        Ok(self.devices.clone())
    }
    async fn find_by_integration_unique_id(
        &self,
        integration: &str,
        unique_id: &str,
    ) -> Result<Option<Device>, HubError> {
        Ok(self
            .devices
            .iter()
            .find(|d| d.integration == integration && d.unique_id == unique_id)
            .cloned())
    }
    async fn update(&self, device: Device) -> Result<Device, HubError> {
        Ok(device)
    }
}

/// Feed that keeps what it accepts and rejects objects without a `type`.
#[derive(Default)]
pub struct RecordingFeed {
    pub messages: Mutex<Vec<serde_json::Value>>,
}

impl BridgeFeed for RecordingFeed {
    async fn push(&self, message: serde_json::Value) -> Result<(), HubError> {
        if message.get("type").is_none() {
            return Err(ValidationError::MalformedMessage.into());
        }
        self.messages.lock().unwrap().push(message);
        Ok(())
    }
}

pub type TestState =
    AppState<StubEntityRepo, StubDeviceRepo, Arc<InProcessEventBus>, RecordingFeed>;

pub fn state(entities: Vec<Entity>, devices: Vec<Device>) -> (TestState, Arc<InProcessEventBus>) {
    let bus = Arc::new(InProcessEventBus::new(16));
    let state = AppState::new(
        Arc::new(EntityService::new(
            StubEntityRepo { entities },
            Arc::clone(&bus),
        )),
        Arc::new(DeviceService::new(StubDeviceRepo { devices })),
        Arc::clone(&bus),
    );
    (state, bus)
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
