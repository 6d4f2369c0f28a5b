//! Rooms: aggregate power draw and climate readings.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::devices::{name_or_fallback, parse_reading};
use crate::observable::Observable;

/// Room descriptor as announced by the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPayload {
    pub room_id: u32,
    #[serde(default)]
    pub name: String,
}

/// Snapshot of a room.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RoomState {
    /// Current power draw in watts.
    pub power: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

/// A room configured on the bridge.
#[derive(Debug)]
pub struct Room {
    pub room_id: u32,
    pub name: String,
    state: Arc<Observable<RoomState>>,
}

impl Room {
    #[must_use]
    pub fn new(room_id: u32, name: impl Into<String>) -> Self {
        Self {
            room_id,
            name: name_or_fallback(name.into(), "room", room_id),
            state: Arc::new(Observable::new()),
        }
    }

    #[must_use]
    pub fn from_payload(payload: RoomPayload) -> Self {
        Self::new(payload.room_id, payload.name)
    }

    #[must_use]
    pub fn state(&self) -> &Arc<Observable<RoomState>> {
        &self.state
    }

    /// Apply a `room_state` payload, keeping readings it leaves out.
    pub fn handle_state(&self, payload: &Value) {
        let mut next = self.state.value().unwrap_or_default();
        let read = |key: &str| payload.get(key).and_then(parse_reading);

        if let Some(power) = read("power") {
            next.power = Some(power);
        }
        if let Some(temperature) = read("temp") {
            next.temperature = Some(temperature);
        }
        if let Some(humidity) = read("humidity") {
            next.humidity = Some(humidity);
        }

        self.state.on_next(next);
    }
}
