//! Rocker switch: a push button reporting which side was pressed.

use std::sync::Arc;

use serde_json::Value;

use super::name_or_fallback;
use crate::observable::Observable;

/// Snapshot of a rocker switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RockerState {
    /// `true` when the top side was pressed.
    pub is_top: bool,
}

/// A rocker switch behind the bridge.
#[derive(Debug)]
pub struct RockerSwitch {
    pub device_id: u32,
    pub name: String,
    pub comp_id: Option<u32>,
    state: Arc<Observable<RockerState>>,
}

impl RockerSwitch {
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
    pub fn state(&self) -> &Arc<Observable<RockerState>> {
        &self.state
    }

    /// Apply a `device_state` payload. Any truthy `curstate` means top;
    /// a missing one counts as bottom.
    pub fn handle_state(&self, payload: &Value) {
        let is_top = match payload.get("curstate") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(top)) => *top,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::Object(fields)) => !fields.is_empty(),
        };
        self.state.on_next(RockerState { is_top });
    }
}
