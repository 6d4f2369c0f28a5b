//! Device models reported by the bridge: rocker switches, RC touch units
//! and devices without an entity mapping.
//!
//! Each model owns an [`Observable`](crate::observable::Observable) slot that
//! the bridge updates from `device_state` messages.

mod rc_touch;
mod rocker;

pub use rc_touch::{RcTouch, RcTouchState};
pub use rocker::{RockerState, RockerSwitch};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `devType` of a rocker (push button) switch.
pub const DEV_TYPE_ROCKER: u32 = 220;
/// `devType` of an RC touch room controller.
pub const DEV_TYPE_RC_TOUCH: u32 = 450;

/// Device descriptor as announced by the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicePayload {
    pub device_id: u32,
    #[serde(default)]
    pub name: String,
    pub dev_type: u32,
    #[serde(default)]
    pub comp_id: Option<u32>,
}

/// A device type this integration does not map to entities.
#[derive(Debug)]
pub struct GenericDevice {
    pub device_id: u32,
    pub name: String,
    pub dev_type: u32,
}

/// Any device known to the bridge.
#[derive(Debug, Clone)]
pub enum XComfortDevice {
    Rocker(Arc<RockerSwitch>),
    RcTouch(Arc<RcTouch>),
    Other(Arc<GenericDevice>),
}

impl XComfortDevice {
    /// Build the model matching the payload's `devType`.
    #[must_use]
    pub fn from_payload(payload: DevicePayload) -> Self {
        match payload.dev_type {
            DEV_TYPE_ROCKER => Self::Rocker(Arc::new(RockerSwitch::new(
                payload.device_id,
                payload.name,
                payload.comp_id,
            ))),
            DEV_TYPE_RC_TOUCH => Self::RcTouch(Arc::new(RcTouch::new(
                payload.device_id,
                payload.name,
                payload.comp_id,
            ))),
            dev_type => Self::Other(Arc::new(GenericDevice {
                device_id: payload.device_id,
                name: name_or_fallback(payload.name, "device", payload.device_id),
                dev_type,
            })),
        }
    }

    #[must_use]
    pub fn device_id(&self) -> u32 {
        match self {
            Self::Rocker(d) => d.device_id,
            Self::RcTouch(d) => d.device_id,
            Self::Other(d) => d.device_id,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Rocker(d) => &d.name,
            Self::RcTouch(d) => &d.name,
            Self::Other(d) => &d.name,
        }
    }

    /// Route a raw `device_state` payload to the model.
    pub fn handle_state(&self, payload: &Value) {
        match self {
            Self::Rocker(d) => d.handle_state(payload),
            Self::RcTouch(d) => d.handle_state(payload),
            Self::Other(d) => {
                tracing::trace!(device_id = d.device_id, dev_type = d.dev_type, "ignoring state of unmapped device");
            }
        }
    }
}

/// The bridge may report a blank name; fall back to `{kind}_{id}`.
pub(crate) fn name_or_fallback(name: String, kind: &str, id: u32) -> String {
    if name.trim().is_empty() {
        format!("{kind}_{id}")
    } else {
        name
    }
}

/// Read a numeric reading that the bridge may encode as number or string.
pub(crate) fn parse_reading(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
