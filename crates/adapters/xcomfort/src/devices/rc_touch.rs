//! RC touch room controller: reports temperature and humidity.

use std::sync::Arc;

use serde_json::Value;

use super::{name_or_fallback, parse_reading};
use crate::observable::Observable;

/// `info` text code carrying the temperature reading.
const INFO_TEMPERATURE: &str = "1222";
/// `info` text code carrying the humidity reading.
const INFO_HUMIDITY: &str = "1223";

/// Snapshot of an RC touch unit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RcTouchState {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

/// An RC touch unit behind the bridge.
#[derive(Debug)]
pub struct RcTouch {
    pub device_id: u32,
    pub name: String,
    pub comp_id: Option<u32>,
    state: Arc<Observable<RcTouchState>>,
}

impl RcTouch {
    #[must_use]
    pub fn new(device_id: u32, name: impl Into<String>, comp_id: Option<u32>) -> Self {
        Self {
            device_id,
            name: name_or_fallback(name.into(), "device", device_id),
            comp_id,
            state: Arc::new(Observable::new()),
        }
    }

    #[must_use]
    pub fn state(&self) -> &Arc<Observable<RcTouchState>> {
        &self.state
    }

    /// Apply a `device_state` payload.
    ///
    /// Readings absent from the `info` list keep their previous value.
    pub fn handle_state(&self, payload: &Value) {
        let mut next = self.state.value().unwrap_or_default();
        let entries = payload
            .get("info")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for entry in entries {
            let Some(value) = entry.get("value").and_then(parse_reading) else {
                continue;
            };
            match entry.get("text").and_then(Value::as_str) {
                Some(INFO_TEMPERATURE) => next.temperature = Some(value),
                Some(INFO_HUMIDITY) => next.humidity = Some(value),
                _ => {}
            }
        }

        self.state.on_next(next);
    }
}
