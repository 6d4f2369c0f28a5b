//! # comforthub-adapter-xcomfort
//!
//! Integration for Eaton xComfort bridges.
//!
//! ## Provided entities
//!
//! | Source | Entity ID | Behaviour |
//! |--------|-----------|-----------|
//! | Rocker switch | `binary_sensor.binary_sensor_xcomfort_bridge_{identifier}_{id}` | `on` for a moment after each press |
//! | Room with a power reading | `sensor.energy_{room}` | current draw in W |
//! | Room with a power reading | `sensor.energy_kwh_{room}` | accumulated kWh, restored across restarts |
//! | RC touch | `sensor.humidity_{name}_{id}` | relative humidity in % |
//! | RC touch | `sensor.temperature_{name}_{id}` | temperature in °C |
//!
//! ## Dependency rule
//!
//! Depends on `comforthub-app` (port traits) and `comforthub-domain` only.

pub mod bridge;
pub mod config;
pub mod devices;
pub mod entities;
pub mod error;
pub mod hub;
pub mod observable;
pub mod room;

use std::sync::Arc;

use comforthub_app::ports::{Integration, IntegrationContext};
use comforthub_domain::device::Device;
use comforthub_domain::error::HubError;
use comforthub_domain::event::{Event, EventType};
use tokio::task::JoinHandle;

use bridge::{Bridge, FeedHandle, PayloadBridge};
use config::XComfortConfig;
use devices::XComfortDevice;
use entities::{EnergySensor, MeasurementSensor, RockerBinarySensor, XComfortEntity};
use error::XComfortError;
use hub::XComfortHub;

/// Integration name, also stored on every device it registers.
pub const INTEGRATION: &str = "xcomfort";

const MANUFACTURER: &str = "Eaton";
const MODEL_BRIDGE: &str = "xComfort Bridge";
const MODEL_ROCKER: &str = "Rocker switch";
const MODEL_RC_TOUCH: &str = "RC Touch";
const MODEL_ROOM: &str = "Room";

/// xComfort integration over a [`Bridge`].
pub struct XComfortIntegration<B> {
    config: XComfortConfig,
    hub: XComfortHub<B>,
    entities: Vec<XComfortEntity>,
    tasks: Vec<JoinHandle<()>>,
}

impl XComfortIntegration<PayloadBridge> {
    /// Integration over an in-process bridge, plus the handle feeding it.
    #[must_use]
    pub fn with_payload_bridge(config: XComfortConfig) -> (Self, FeedHandle) {
        let (bridge, feed) = PayloadBridge::new(config.feed_capacity);
        (Self::new(Arc::new(bridge), config), feed)
    }
}

impl<B: Bridge> XComfortIntegration<B> {
    pub fn new(bridge: Arc<B>, config: XComfortConfig) -> Self {
        let hub = XComfortHub::new(bridge, config.ip.clone(), config.identifier.clone());
        Self {
            config,
            hub,
            entities: Vec::new(),
            tasks: Vec::new(),
        }
    }

    #[must_use]
    pub fn hub(&self) -> &XComfortHub<B> {
        &self.hub
    }

    #[must_use]
    pub fn entities(&self) -> &[XComfortEntity] {
        &self.entities
    }

    async fn persist_device(
        &self,
        ctx: &impl IntegrationContext,
        unique_id: String,
        name: &str,
        model: &str,
    ) -> Result<Device, HubError> {
        let device = Device::builder()
            .name(name)
            .manufacturer(MANUFACTURER)
            .model(model)
            .integration(INTEGRATION)
            .unique_id(unique_id)
            .via_device(self.hub.hub_id())
            .build()?;
        let stored = ctx.upsert_device(device).await?;
        ctx.publish(Event::new(
            EventType::DeviceDiscovered,
            None,
            serde_json::json!({
                "device_id": stored.id.to_string(),
                "unique_id": stored.unique_id,
                "name": stored.name,
            }),
        ))
        .await?;
        Ok(stored)
    }

    async fn register(
        &mut self,
        ctx: &impl IntegrationContext,
        entity: XComfortEntity,
    ) -> Result<(), HubError> {
        let stored = ctx.upsert_entity(entity.snapshot()).await?;
        entity.adopt_id(stored.id);
        self.entities.push(entity);
        Ok(())
    }

    async fn add_device(
        &mut self,
        ctx: &impl IntegrationContext,
        device: &XComfortDevice,
    ) -> Result<(), HubError> {
        match device {
            XComfortDevice::Rocker(switch) => {
                let component = switch
                    .comp_id
                    .and_then(|comp_id| self.hub.get_component_name(comp_id))
                    .filter(|name| !name.trim().is_empty());
                let name = RockerBinarySensor::display_name(switch, component.as_deref());
                let stored = self
                    .persist_device(ctx, format!("device_{}", switch.device_id), &name, MODEL_ROCKER)
                    .await?;
                let sensor = RockerBinarySensor::new(
                    self.hub.identifier(),
                    switch,
                    component.as_deref(),
                    stored.id,
                    self.config.momentary_reset(),
                )?;
                self.register(ctx, XComfortEntity::Rocker(sensor)).await
            }
            XComfortDevice::RcTouch(touch) => {
                tracing::info!(device = %touch.name, "Adding humidity and temperature sensors");
                let stored = self
                    .persist_device(ctx, format!("device_{}", touch.device_id), &touch.name, MODEL_RC_TOUCH)
                    .await?;
                let humidity = MeasurementSensor::humidity(touch, stored.id)?;
                self.register(ctx, XComfortEntity::Climate(humidity)).await?;
                let temperature = MeasurementSensor::temperature(touch, stored.id)?;
                self.register(ctx, XComfortEntity::Climate(temperature)).await
            }
            XComfortDevice::Other(other) => {
                tracing::debug!(device_id = other.device_id, dev_type = other.dev_type, "no entities for device type");
                Ok(())
            }
        }
    }
}

impl<B: Bridge> Integration for XComfortIntegration<B> {
    fn name(&self) -> &'static str {
        INTEGRATION
    }

    async fn setup(&mut self, ctx: &impl IntegrationContext) -> Result<(), HubError> {
        if !self.hub.test_connection().await {
            return Err(XComfortError::Closed.into());
        }
        self.hub.start();
        self.hub
            .load_devices(self.config.discovery_timeout())
            .await?;

        let devices = self.hub.devices().to_vec();
        let rooms = self.hub.rooms().to_vec();
        tracing::info!(count = devices.len(), "Found xcomfort devices");
        tracing::info!(count = rooms.len(), "Found xcomfort rooms");

        let bridge_device = Device::builder()
            .name(format!("{MODEL_BRIDGE} {}", self.hub.identifier()))
            .manufacturer(MANUFACTURER)
            .model(MODEL_BRIDGE)
            .integration(INTEGRATION)
            .unique_id(self.hub.hub_id())
            .build()?;
        ctx.upsert_device(bridge_device).await?;

        for device in &devices {
            self.add_device(ctx, device).await?;
        }

        for room in &rooms {
            if room.state().value().and_then(|state| state.power).is_none() {
                tracing::debug!(room = %room.name, "room has no power reading");
                continue;
            }
            tracing::info!(room = %room.name, "Adding energy and power sensors");
            let stored = self
                .persist_device(ctx, format!("room_{}", room.room_id), &room.name, MODEL_ROOM)
                .await?;

            let power = MeasurementSensor::power(room, stored.id)?;
            self.register(ctx, XComfortEntity::Power(power)).await?;

            let restored = ctx
                .find_entity(&EnergySensor::entity_id(room))
                .await?
                .and_then(|entity| entity.native_value());
            let energy = EnergySensor::new(room, stored.id, restored)?;
            self.register(ctx, XComfortEntity::Energy(energy)).await?;
        }

        tracing::info!(count = self.entities.len(), "Added entities");
        Ok(())
    }

    async fn start_background(
        &mut self,
        ctx: impl IntegrationContext + Clone + 'static,
    ) -> Result<(), HubError> {
        for entity in &self.entities {
            self.tasks.push(entity.attach(ctx.clone()));
        }
        tracing::debug!(count = self.tasks.len(), "entity subscriptions started");
        Ok(())
    }

    async fn teardown(&mut self) -> Result<(), HubError> {
        for task in self.tasks.drain(..) {
            task.abort();
        }
        self.hub.stop().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{BridgeMessage, ComponentPayload};
    use crate::devices::DevicePayload;
    use crate::entities::testing::RecordingContext;
    use crate::room::RoomPayload;
    use comforthub_domain::entity::{AttributeValue, Entity, EntityState};
    use comforthub_domain::id::DeviceId;
    use serde_json::json;
    use std::time::Duration;

    const ROCKER: &str = "binary_sensor.binary_sensor_xcomfort_bridge_home_12";

    fn config() -> XComfortConfig {
        XComfortConfig {
            enabled: true,
            ip: "192.168.1.50".to_string(),
            identifier: Some("home".to_string()),
            ..XComfortConfig::default()
        }
    }

    fn device(device_id: u32, name: &str, dev_type: u32, comp_id: Option<u32>) -> BridgeMessage {
        BridgeMessage::Device(DevicePayload {
            device_id,
            name: name.to_string(),
            dev_type,
            comp_id,
        })
    }

    fn bridge() -> Arc<PayloadBridge> {
        let (bridge, _feed) = PayloadBridge::new(8);
        bridge.dispatch(BridgeMessage::Component(ComponentPayload {
            comp_id: 3,
            name: "Living room".to_string(),
            comp_type: None,
        }));
        bridge.dispatch(device(12, "Rocker", 220, Some(3)));
        bridge.dispatch(device(30, "Bedroom", 450, None));
        bridge.dispatch(device(40, "Dimmer", 101, None));
        bridge.dispatch(BridgeMessage::Room(RoomPayload {
            room_id: 5,
            name: "Kitchen".to_string(),
        }));
        bridge.dispatch(BridgeMessage::Room(RoomPayload {
            room_id: 6,
            name: "Attic".to_string(),
        }));
        bridge.dispatch(BridgeMessage::RoomState {
            room_id: 5,
            payload: json!({"power": 60.0}),
        });
        bridge.dispatch(BridgeMessage::Synced);
        Arc::new(bridge)
    }

    fn stored_ids(ctx: &RecordingContext) -> Vec<String> {
        let mut ids: Vec<String> = ctx.stored.lock().unwrap().keys().cloned().collect();
        ids.sort();
        ids
    }

    #[test]
    fn should_return_xcomfort_as_name() {
        let (integration, _feed) = XComfortIntegration::with_payload_bridge(config());
        assert_eq!(integration.name(), "xcomfort");
    }

    #[tokio::test(start_paused = true)]
    async fn should_register_entities_for_discovered_devices_and_rooms() {
        let mut integration = XComfortIntegration::new(bridge(), config());
        let ctx = RecordingContext::default();

        integration.setup(&ctx).await.unwrap();

        assert_eq!(
            stored_ids(&ctx),
            vec![
                ROCKER.to_string(),
                "sensor.energy_5".to_string(),
                "sensor.energy_kwh_5".to_string(),
                "sensor.humidity_bedroom_30".to_string(),
                "sensor.temperature_bedroom_30".to_string(),
            ]
        );
        assert_eq!(integration.entities().len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn should_register_unnamed_devices_and_rooms_under_fallback_names() {
        let (bridge, _feed) = PayloadBridge::new(8);
        bridge.dispatch(device(30, "", 450, None));
        bridge.dispatch(device(12, "Rocker", 220, None));
        bridge.dispatch(BridgeMessage::Room(RoomPayload {
            room_id: 5,
            name: String::new(),
        }));
        bridge.dispatch(BridgeMessage::RoomState {
            room_id: 5,
            payload: json!({"power": 60.0}),
        });
        bridge.dispatch(BridgeMessage::Synced);
        let mut integration = XComfortIntegration::new(Arc::new(bridge), config());
        let ctx = RecordingContext::default();

        integration.setup(&ctx).await.unwrap();

        assert_eq!(
            stored_ids(&ctx),
            vec![
                ROCKER.to_string(),
                "sensor.energy_5".to_string(),
                "sensor.energy_kwh_5".to_string(),
                "sensor.humidity_device_30_30".to_string(),
                "sensor.temperature_device_30_30".to_string(),
            ]
        );
        let stored = ctx.stored.lock().unwrap();
        assert_eq!(stored["sensor.energy_5"].friendly_name, "room_5 Current consumption");
        assert_eq!(stored["sensor.humidity_device_30_30"].friendly_name, "device_30 Humidity");
        drop(stored);

        let devices = ctx.devices.lock().unwrap();
        assert!(devices.iter().any(|d| d.unique_id == "device_30" && d.name == "device_30"));
        assert!(devices.iter().any(|d| d.unique_id == "room_5" && d.name == "room_5"));
    }

    #[tokio::test(start_paused = true)]
    async fn should_register_bridge_and_child_devices() {
        let mut integration = XComfortIntegration::new(bridge(), config());
        let ctx = RecordingContext::default();

        integration.setup(&ctx).await.unwrap();

        let devices = ctx.devices.lock().unwrap();
        assert_eq!(devices.len(), 4);
        let bridge = devices.iter().find(|d| d.unique_id == "192.168.1.50").unwrap();
        assert_eq!(bridge.name, "xComfort Bridge home");
        assert_eq!(bridge.via_device, None);

        let rocker = devices.iter().find(|d| d.unique_id == "device_12").unwrap();
        assert_eq!(rocker.name, "Living room - Rocker");
        assert_eq!(rocker.manufacturer.as_deref(), Some("Eaton"));
        assert_eq!(rocker.via_device.as_deref(), Some("192.168.1.50"));

        assert!(devices.iter().any(|d| d.unique_id == "room_5"));
        assert!(!devices.iter().any(|d| d.unique_id == "room_6"));

        let events = ctx.events.lock().unwrap();
        assert!(events.iter().all(|e| e.event_type == EventType::DeviceDiscovered));
        assert_eq!(events.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn should_restore_persisted_energy_total() {
        let ctx = RecordingContext::default();
        let previous = Entity::builder()
            .device_id(DeviceId::new())
            .entity_id("sensor.energy_kwh_5")
            .friendly_name("Kitchen Energy consumption")
            .state(EntityState::On)
            .attribute("native_value", AttributeValue::Float(12.5))
            .build()
            .unwrap();
        ctx.stored
            .lock()
            .unwrap()
            .insert(previous.entity_id.clone(), previous.clone());

        let mut integration = XComfortIntegration::new(bridge(), config());
        integration.setup(&ctx).await.unwrap();

        let energy = ctx.last_write("sensor.energy_kwh_5").unwrap();
        assert_eq!(energy.id, previous.id);
        assert_eq!(energy.native_value(), Some(12.5));
    }

    #[tokio::test(start_paused = true)]
    async fn should_push_rocker_presses_after_start() {
        let bridge = bridge();
        let mut integration = XComfortIntegration::new(Arc::clone(&bridge), config());
        let ctx = RecordingContext::default();
        integration.setup(&ctx).await.unwrap();
        integration.start_background(ctx.clone()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1)).await;

        bridge.dispatch(BridgeMessage::DeviceState {
            device_id: 12,
            payload: json!({"curstate": 1}),
        });
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(ctx.last_write(ROCKER).unwrap().state, EntityState::On);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(ctx.last_write(ROCKER).unwrap().state, EntityState::Off);

        integration.teardown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn should_stop_pushing_after_teardown() {
        let bridge = bridge();
        let mut integration = XComfortIntegration::new(Arc::clone(&bridge), config());
        let ctx = RecordingContext::default();
        integration.setup(&ctx).await.unwrap();
        integration.start_background(ctx.clone()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1)).await;

        integration.teardown().await.unwrap();
        let writes = ctx.writes.lock().unwrap().len();

        bridge.dispatch(BridgeMessage::RoomState {
            room_id: 5,
            payload: json!({"power": 90.0}),
        });
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(ctx.writes.lock().unwrap().len(), writes);
    }

    #[tokio::test(start_paused = true)]
    async fn should_fail_setup_when_bridge_never_syncs() {
        let (mut integration, _feed) = XComfortIntegration::with_payload_bridge(XComfortConfig {
            discovery_timeout_secs: 1,
            ..config()
        });
        let ctx = RecordingContext::default();

        let result = integration.setup(&ctx).await;
        assert!(matches!(result, Err(HubError::Storage(_))));
    }
}
