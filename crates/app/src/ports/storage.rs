//! Storage port: repository traits for persistence.

use std::future::Future;

use comforthub_domain::device::Device;
use comforthub_domain::entity::Entity;
use comforthub_domain::error::HubError;
use comforthub_domain::id::{DeviceId, EntityId};

/// Repository for persisting and querying [`Entity`]s.
///
/// The last written snapshot of an entity doubles as its restore state
/// after a restart.
pub trait EntityRepository {
    /// Create a new entity in storage.
    fn create(&self, entity: Entity) -> impl Future<Output = Result<Entity, HubError>> + Send;

    /// Get an entity by its unique identifier.
    fn get_by_id(
        &self,
        id: EntityId,
    ) -> impl Future<Output = Result<Option<Entity>, HubError>> + Send;

    /// Get all entities.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Entity>, HubError>> + Send;

    /// Find all entities exposed by a device.
    fn find_by_device_id(
        &self,
        device_id: DeviceId,
    ) -> impl Future<Output = Result<Vec<Entity>, HubError>> + Send;

    /// Find an entity by its textual `entity_id` (e.g. `sensor.energy_kwh_5`).
    fn find_by_entity_id(
        &self,
        entity_id: &str,
    ) -> impl Future<Output = Result<Option<Entity>, HubError>> + Send;

    /// Update an existing entity.
    fn update(&self, entity: Entity) -> impl Future<Output = Result<Entity, HubError>> + Send;

    /// Delete an entity by its unique identifier.
    fn delete(&self, id: EntityId) -> impl Future<Output = Result<(), HubError>> + Send;
}

/// Repository for persisting and querying [`Device`]s.
pub trait DeviceRepository {
    /// Create a new device in storage.
    fn create(&self, device: Device) -> impl Future<Output = Result<Device, HubError>> + Send;

    /// Get a device by its unique identifier.
    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, HubError>> + Send;

    /// Get all devices.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Device>, HubError>> + Send;

    /// Find a device by the integration that owns it and its id within that integration.
    fn find_by_integration_unique_id(
        &self,
        integration: &str,
        unique_id: &str,
    ) -> impl Future<Output = Result<Option<Device>, HubError>> + Send;

    /// Update an existing device.
    fn update(&self, device: Device) -> impl Future<Output = Result<Device, HubError>> + Send;
}
