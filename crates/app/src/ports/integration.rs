//! Integration port: lifecycle of device integrations.
//!
//! An integration bridges an external system (here: an xComfort bridge)
//! into the hub. It discovers devices/entities on startup and pushes
//! entity updates as they arrive; entities are never polled.

use std::future::Future;

use comforthub_domain::device::Device;
use comforthub_domain::entity::Entity;
use comforthub_domain::error::HubError;
use comforthub_domain::event::Event;

/// Context provided to integrations for persisting discoveries and
/// writing entity state.
///
/// The binary crate provides a concrete implementation backed by
/// `DeviceService` and `EntityService`.
pub trait IntegrationContext: Send + Sync {
    /// Persist a discovered device (create or update by `integration`+`unique_id`).
    fn upsert_device(&self, device: Device) -> impl Future<Output = Result<Device, HubError>> + Send;

    /// Persist an entity snapshot (create or update by `entity_id` string).
    ///
    /// Also publishes `StateChanged` / `EntityCreated` events through the
    /// event bus when appropriate (delegated to `EntityService`).
    fn upsert_entity(&self, entity: Entity) -> impl Future<Output = Result<Entity, HubError>> + Send;

    /// Last persisted snapshot of an entity, used to restore state after
    /// a restart.
    fn find_entity(
        &self,
        entity_id: &str,
    ) -> impl Future<Output = Result<Option<Entity>, HubError>> + Send;

    /// Publish a domain event to the event bus.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), HubError>> + Send;

}

/// A pluggable device integration.
///
/// The binary crate calls the lifecycle methods in order:
///
/// 1. [`setup`](Self::setup): connect, discover and persist devices/entities
/// 2. [`start_background`](Self::start_background): attach entities to their
///    state streams
/// 3. (the server runs while entities push updates)
/// 4. [`teardown`](Self::teardown): clean up resources
pub trait Integration {
    /// Unique name identifying this integration (e.g. `"xcomfort"`).
    fn name(&self) -> &'static str;

    /// Connect and persist the initial discoveries via `ctx`.
    fn setup(
        &mut self,
        ctx: &impl IntegrationContext,
    ) -> impl Future<Output = Result<(), HubError>> + Send;

    /// Start long-running background work (subscriptions, timers).
    ///
    /// The default implementation is a no-op.
    fn start_background(
        &mut self,
        _ctx: impl IntegrationContext + Clone + 'static,
    ) -> impl Future<Output = Result<(), HubError>> + Send {
        async { Ok(()) }
    }

    /// Called on graceful shutdown. Clean up any background tasks or connections.
    fn teardown(&mut self) -> impl Future<Output = Result<(), HubError>> + Send;
}

