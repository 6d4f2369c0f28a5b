//! In-memory repositories shared by the service tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use comforthub_domain::device::Device;
use comforthub_domain::entity::Entity;
use comforthub_domain::error::HubError;
use comforthub_domain::id::{DeviceId, EntityId};

use crate::ports::{DeviceRepository, EntityRepository};

#[derive(Default)]
pub(crate) struct InMemoryEntityRepo {
    store: Mutex<HashMap<EntityId, Entity>>,
}

impl EntityRepository for InMemoryEntityRepo {
    fn create(&self, entity: Entity) -> impl Future<Output = Result<Entity, HubError>> + Send {
        let mut store = self.store.lock().unwrap();
        store.insert(entity.id, entity.clone());
        async { Ok(entity) }
    }

    fn get_by_id(
        &self,
        id: EntityId,
    ) -> impl Future<Output = Result<Option<Entity>, HubError>> + Send {
        let store = self.store.lock().unwrap();
        let result = store.get(&id).cloned();
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Entity>, HubError>> + Send {
        let store = self.store.lock().unwrap();
        let result: Vec<Entity> = store.values().cloned().collect();
        async { Ok(result) }
    }

    fn find_by_device_id(
        &self,
        device_id: DeviceId,
    ) -> impl Future<Output = Result<Vec<Entity>, HubError>> + Send {
        let store = self.store.lock().unwrap();
        let result: Vec<Entity> = store
            .values()
            .filter(|ent| ent.device_id == device_id)
            .cloned()
            .collect();
        async { Ok(result) }
    }

    fn find_by_entity_id(
        &self,
        entity_id: &str,
    ) -> impl Future<Output = Result<Option<Entity>, HubError>> + Send {
        let store = self.store.lock().unwrap();
        let result = store
            .values()
            .find(|ent| ent.entity_id == entity_id)
            .cloned();
        async { Ok(result) }
    }

    fn update(&self, entity: Entity) -> impl Future<Output = Result<Entity, HubError>> + Send {
        let mut store = self.store.lock().unwrap();
        store.insert(entity.id, entity.clone());
        async { Ok(entity) }
    }

    fn delete(&self, id: EntityId) -> impl Future<Output = Result<(), HubError>> + Send {
        let mut store = self.store.lock().unwrap();
        store.remove(&id);
        async { Ok(()) }
    }
}

#[derive(Default)]
pub(crate) struct InMemoryDeviceRepo {
    store: Mutex<HashMap<DeviceId, Device>>,
}

impl DeviceRepository for InMemoryDeviceRepo {
    fn create(&self, device: Device) -> impl Future<Output = Result<Device, HubError>> + Send {
        let mut store = self.store.lock().unwrap();
        store.insert(device.id, device.clone());
        async { Ok(device) }
    }

    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, HubError>> + Send {
        let store = self.store.lock().unwrap();
        let result = store.get(&id).cloned();
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, HubError>> + Send {
        let store = self.store.lock().unwrap();
        let result: Vec<Device> = store.values().cloned().collect();
        async { Ok(result) }
    }

    fn find_by_integration_unique_id(
        &self,
        integration: &str,
        unique_id: &str,
    ) -> impl Future<Output = Result<Option<Device>, HubError>> + Send {
        let store = self.store.lock().unwrap();
        let result = store
            .values()
            .find(|d| d.integration == integration && d.unique_id == unique_id)
            .cloned();
        async { Ok(result) }
    }

    fn update(&self, device: Device) -> impl Future<Output = Result<Device, HubError>> + Send {
        let mut store = self.store.lock().unwrap();
        store.insert(device.id, device.clone());
        async { Ok(device) }
    }
}
