//! Bridge port and the in-process, message-fed bridge.
//!
//! A [`Bridge`] knows the components, devices and rooms configured on the
//! xComfort gateway and pushes their state into the models' observables
//! while [`Bridge::run`] is active.
//!
//! [`PayloadBridge`] is driven by [`BridgeMessage`]s sent through a
//! [`FeedHandle`]. Messages are JSON objects tagged by `type`:
//!
//! ```json
//! {"type": "component", "compId": 3, "name": "Living room"}
//! {"type": "device", "deviceId": 12, "name": "Rocker", "devType": 220, "compId": 3}
//! {"type": "room", "roomId": 5, "name": "Kitchen"}
//! {"type": "synced"}
//! {"type": "device_state", "deviceId": 12, "payload": {"curstate": 1}}
//! {"type": "room_state", "roomId": 5, "payload": {"power": 120.5}}
//! ```

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use comforthub_app::ports::BridgeFeed;
use comforthub_domain::error::HubError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex, mpsc, watch};

use crate::devices::{DevicePayload, XComfortDevice};
use crate::error::XComfortError;
use crate::room::{Room, RoomPayload};

/// Device-communication client for one xComfort gateway.
pub trait Bridge: Send + Sync + 'static {
    /// Every device reported by the gateway, ordered by device id.
    fn get_devices(
        &self,
    ) -> impl Future<Output = Result<Vec<XComfortDevice>, XComfortError>> + Send;

    /// Every room reported by the gateway, ordered by room id.
    fn get_rooms(&self) -> impl Future<Output = Result<Vec<Arc<Room>>, XComfortError>> + Send;

    /// Display name of a component, if known.
    fn get_component_name(&self, comp_id: u32) -> Option<String>;

    /// Process gateway traffic until the bridge is closed.
    fn run(&self) -> impl Future<Output = Result<(), XComfortError>> + Send;

    /// Stop processing traffic. `run` returns shortly after.
    fn close(&self) -> impl Future<Output = Result<(), XComfortError>> + Send;
}

/// Component descriptor as announced by the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentPayload {
    pub comp_id: u32,
    pub name: String,
    #[serde(default)]
    pub comp_type: Option<u32>,
}

/// One message from the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeMessage {
    Component(ComponentPayload),
    Device(DevicePayload),
    Room(RoomPayload),
    /// Initial discovery is complete.
    Synced,
    #[serde(rename_all = "camelCase")]
    DeviceState { device_id: u32, payload: Value },
    #[serde(rename_all = "camelCase")]
    RoomState { room_id: u32, payload: Value },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Discovering,
    Synced,
    Closed,
}

#[derive(Debug, Default)]
struct Registry {
    components: HashMap<u32, String>,
    devices: BTreeMap<u32, XComfortDevice>,
    rooms: BTreeMap<u32, Arc<Room>>,
}

/// Sending half of a [`PayloadBridge`].
#[derive(Debug, Clone)]
pub struct FeedHandle {
    sender: mpsc::Sender<BridgeMessage>,
}

impl FeedHandle {
    /// Queue one message for the bridge.
    ///
    /// # Errors
    ///
    /// Returns [`XComfortError::Closed`] once the bridge has been dropped.
    pub async fn send(&self, message: BridgeMessage) -> Result<(), XComfortError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| XComfortError::Closed)
    }
}

impl BridgeFeed for FeedHandle {
    async fn push(&self, message: Value) -> Result<(), HubError> {
        let message = serde_json::from_value(message).map_err(XComfortError::MessageDecode)?;
        self.send(message).await?;
        Ok(())
    }
}

/// A bridge whose gateway traffic arrives as [`BridgeMessage`]s.
#[derive(Debug)]
pub struct PayloadBridge {
    registry: RwLock<Registry>,
    inbox: Mutex<mpsc::Receiver<BridgeMessage>>,
    phase: watch::Sender<Phase>,
}

impl PayloadBridge {
    /// Create a bridge and the handle used to feed it.
    ///
    /// `capacity` bounds the number of queued, not yet processed messages.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, FeedHandle) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let (phase, _) = watch::channel(Phase::Discovering);
        let bridge = Self {
            registry: RwLock::new(Registry::default()),
            inbox: Mutex::new(receiver),
            phase,
        };
        (bridge, FeedHandle { sender })
    }

    /// Apply one message immediately.
    pub fn dispatch(&self, message: BridgeMessage) {
        match message {
            BridgeMessage::Component(component) => {
                tracing::debug!(comp_id = component.comp_id, name = %component.name, "component registered");
                self.write().components.insert(component.comp_id, component.name);
            }
            BridgeMessage::Device(payload) => {
                let mut registry = self.write();
                if registry.devices.contains_key(&payload.device_id) {
                    tracing::debug!(device_id = payload.device_id, "device already known");
                    return;
                }
                let device = XComfortDevice::from_payload(payload);
                tracing::debug!(device_id = device.device_id(), name = %device.name(), "device registered");
                registry.devices.insert(device.device_id(), device);
            }
            BridgeMessage::Room(payload) => {
                let mut registry = self.write();
                if registry.rooms.contains_key(&payload.room_id) {
                    tracing::debug!(room_id = payload.room_id, "room already known");
                    return;
                }
                tracing::debug!(room_id = payload.room_id, name = %payload.name, "room registered");
                registry
                    .rooms
                    .insert(payload.room_id, Arc::new(Room::from_payload(payload)));
            }
            BridgeMessage::Synced => {
                let changed = self.phase.send_if_modified(|phase| {
                    if *phase == Phase::Discovering {
                        *phase = Phase::Synced;
                        true
                    } else {
                        false
                    }
                });
                if changed {
                    let registry = self.read();
                    tracing::info!(
                        devices = registry.devices.len(),
                        rooms = registry.rooms.len(),
                        "xComfort discovery complete"
                    );
                }
            }
            BridgeMessage::DeviceState { device_id, payload } => {
                let device = self.read().devices.get(&device_id).cloned();
                match device {
                    Some(device) => device.handle_state(&payload),
                    None => tracing::warn!(device_id, "state for unknown device ignored"),
                }
            }
            BridgeMessage::RoomState { room_id, payload } => {
                let room = self.read().rooms.get(&room_id).cloned();
                match room {
                    Some(room) => room.handle_state(&payload),
                    None => tracing::warn!(room_id, "state for unknown room ignored"),
                }
            }
        }
    }

    async fn wait_synced(&self) -> Result<(), XComfortError> {
        let mut phase = self.phase.subscribe();
        let reached = phase
            .wait_for(|phase| *phase != Phase::Discovering)
            .await
            .map(|phase| *phase)
            .map_err(|_| XComfortError::Closed)?;
        match reached {
            Phase::Closed => Err(XComfortError::Closed),
            _ => Ok(()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Bridge for PayloadBridge {
    async fn get_devices(&self) -> Result<Vec<XComfortDevice>, XComfortError> {
        self.wait_synced().await?;
        Ok(self.read().devices.values().cloned().collect())
    }

    async fn get_rooms(&self) -> Result<Vec<Arc<Room>>, XComfortError> {
        self.wait_synced().await?;
        Ok(self.read().rooms.values().cloned().collect())
    }

    fn get_component_name(&self, comp_id: u32) -> Option<String> {
        self.read().components.get(&comp_id).cloned()
    }

    async fn run(&self) -> Result<(), XComfortError> {
        let mut inbox = self.inbox.lock().await;
        let mut phase = self.phase.subscribe();
        loop {
            tokio::select! {
                _ = phase.wait_for(|phase| *phase == Phase::Closed) => break,
                message = inbox.recv() => match message {
                    Some(message) => self.dispatch(message),
                    None => break,
                },
            }
        }
        tracing::debug!("xComfort bridge stopped");
        Ok(())
    }

    async fn close(&self) -> Result<(), XComfortError> {
        self.phase.send_replace(Phase::Closed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::RockerState;
    use crate::room::RoomState;
    use comforthub_domain::error::ValidationError;
    use serde_json::json;
    use std::time::Duration;

    fn rocker_message(device_id: u32) -> BridgeMessage {
        serde_json::from_value(json!({
            "type": "device",
            "deviceId": device_id,
            "name": "Rocker",
            "devType": 220,
            "compId": 3,
        }))
        .unwrap()
    }

    fn discovered_bridge() -> PayloadBridge {
        let (bridge, _feed) = PayloadBridge::new(8);
        bridge.dispatch(BridgeMessage::Component(ComponentPayload {
            comp_id: 3,
            name: "Living room".to_string(),
            comp_type: None,
        }));
        bridge.dispatch(rocker_message(12));
        bridge.dispatch(BridgeMessage::Room(RoomPayload {
            room_id: 5,
            name: "Kitchen".to_string(),
        }));
        bridge.dispatch(BridgeMessage::Synced);
        bridge
    }

    #[test]
    fn should_decode_tagged_messages() {
        let message: BridgeMessage = serde_json::from_value(json!({
            "type": "device_state",
            "deviceId": 12,
            "payload": {"curstate": 1},
        }))
        .unwrap();
        assert_eq!(
            message,
            BridgeMessage::DeviceState {
                device_id: 12,
                payload: json!({"curstate": 1}),
            }
        );

        let synced: BridgeMessage = serde_json::from_value(json!({"type": "synced"})).unwrap();
        assert_eq!(synced, BridgeMessage::Synced);
    }

    #[tokio::test]
    async fn should_list_discovered_devices_and_rooms() {
        let bridge = discovered_bridge();

        let devices = bridge.get_devices().await.unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].device_id(), 12);

        let rooms = bridge.get_rooms().await.unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].name, "Kitchen");

        assert_eq!(bridge.get_component_name(3).as_deref(), Some("Living room"));
        assert_eq!(bridge.get_component_name(4), None);
    }

    #[tokio::test]
    async fn should_route_state_to_device_and_room() {
        let bridge = discovered_bridge();
        bridge.dispatch(BridgeMessage::DeviceState {
            device_id: 12,
            payload: json!({"curstate": 1}),
        });
        bridge.dispatch(BridgeMessage::RoomState {
            room_id: 5,
            payload: json!({"power": 42.0}),
        });

        let devices = bridge.get_devices().await.unwrap();
        let XComfortDevice::Rocker(rocker) = &devices[0] else {
            panic!("expected rocker");
        };
        assert_eq!(rocker.state().value(), Some(RockerState { is_top: true }));

        let rooms = bridge.get_rooms().await.unwrap();
        assert_eq!(
            rooms[0].state().value(),
            Some(RoomState {
                power: Some(42.0),
                ..RoomState::default()
            })
        );
    }

    #[tokio::test]
    async fn should_ignore_state_for_unknown_ids() {
        let bridge = discovered_bridge();
        bridge.dispatch(BridgeMessage::DeviceState {
            device_id: 99,
            payload: json!({"curstate": 1}),
        });
        bridge.dispatch(BridgeMessage::RoomState {
            room_id: 99,
            payload: json!({"power": 1.0}),
        });
        assert_eq!(bridge.get_devices().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_keep_existing_model_when_device_announced_twice() {
        let bridge = discovered_bridge();
        let before = bridge.get_devices().await.unwrap();
        bridge.dispatch(rocker_message(12));
        let after = bridge.get_devices().await.unwrap();

        let (XComfortDevice::Rocker(a), XComfortDevice::Rocker(b)) = (&before[0], &after[0]) else {
            panic!("expected rockers");
        };
        assert!(Arc::ptr_eq(a, b));
    }

    #[tokio::test(start_paused = true)]
    async fn should_wait_for_sync_before_listing_devices() {
        let (bridge, _feed) = PayloadBridge::new(8);
        bridge.dispatch(rocker_message(1));

        let pending = tokio::time::timeout(Duration::from_secs(5), bridge.get_devices()).await;
        assert!(pending.is_err());

        bridge.dispatch(BridgeMessage::Synced);
        assert_eq!(bridge.get_devices().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_fail_listing_after_close_without_sync() {
        let (bridge, _feed) = PayloadBridge::new(8);
        bridge.close().await.unwrap();
        assert!(matches!(
            bridge.get_devices().await,
            Err(XComfortError::Closed)
        ));
    }

    #[tokio::test]
    async fn should_process_fed_messages_while_running() {
        let (bridge, feed) = PayloadBridge::new(8);
        let bridge = Arc::new(bridge);
        let runner = tokio::spawn({
            let bridge = Arc::clone(&bridge);
            async move { bridge.run().await }
        });

        feed.send(rocker_message(12)).await.unwrap();
        feed.push(json!({"type": "synced"})).await.unwrap();

        let devices = bridge.get_devices().await.unwrap();
        assert_eq!(devices.len(), 1);

        bridge.close().await.unwrap();
        runner.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn should_stop_running_when_every_feed_handle_is_dropped() {
        let (bridge, feed) = PayloadBridge::new(8);
        drop(feed);
        bridge.run().await.unwrap();
    }

    #[tokio::test]
    async fn should_reject_malformed_feed_message() {
        let (_bridge, feed) = PayloadBridge::new(8);
        let result = feed.push(json!({"type": "device", "name": "no id"})).await;
        assert!(matches!(
            result,
            Err(HubError::Validation(ValidationError::MalformedMessage))
        ));
    }

    #[tokio::test]
    async fn should_report_closed_feed_once_bridge_dropped() {
        let (bridge, feed) = PayloadBridge::new(8);
        drop(bridge);
        assert!(matches!(
            feed.send(BridgeMessage::Synced).await,
            Err(XComfortError::Closed)
        ));
    }
}
