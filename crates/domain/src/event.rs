//! Event: an immutable record of something that happened.
//!
//! Events are produced when entities are created or change state, when
//! devices are discovered, and when a rocker switch is pressed.

use serde::{Deserialize, Serialize};

use crate::id::{EntityId, EventId};
use crate::time::{Timestamp, now};

/// Kind of event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    StateChanged,
    EntityCreated,
    DeviceDiscovered,
    ButtonPressed,
}

/// A single event on the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    pub entity_id: Option<EntityId>,
    pub data: serde_json::Value,
    pub timestamp: Timestamp,
}

impl Event {
    /// Create a new event stamped with the current time.
    #[must_use]
    pub fn new(event_type: EventType, entity_id: Option<EntityId>, data: serde_json::Value) -> Self {
        Self {
            id: EventId::new(),
            event_type,
            entity_id,
            data,
            timestamp: now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_serialize_event_type_as_snake_case() {
        let event = Event::new(
            EventType::ButtonPressed,
            Some(EntityId::new()),
            serde_json::json!({"side": "top"}),
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "button_pressed");
        assert_eq!(json["data"]["side"], "top");
    }

    #[test]
    fn should_assign_distinct_ids() {
        let a = Event::new(EventType::StateChanged, None, serde_json::Value::Null);
        let b = Event::new(EventType::StateChanged, None, serde_json::Value::Null);
        assert_ne!(a.id, b.id);
    }
}
