//! Hub-internal keys for stored records, backed by UUIDs.
//!
//! Bridge-facing names such as `device_12`, `room_5` or
//! `sensor.energy_kwh_5` are plain strings on the records themselves. They
//! never parse as one of these ids, which lets lookups accept either form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(uuid::Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Access the inner UUID.
            #[must_use]
            pub fn as_uuid(self) -> uuid::Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }
    };
}

define_id!(
    /// Storage key of an [`Entity`](crate::entity::Entity). Kept stable when
    /// the entity is rewritten under the same textual id.
    EntityId
);

define_id!(
    /// Storage key of a [`Device`](crate::device::Device). Rediscovering the
    /// same bridge device reuses it.
    DeviceId
);

define_id!(
    /// Identifier of a published [`Event`](crate::event::Event).
    EventId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_give_each_discovered_entity_its_own_key() {
        let rocker = EntityId::new();
        let energy = EntityId::new();
        assert_ne!(rocker, energy);
    }

    #[test]
    fn should_parse_key_back_from_its_stored_text() {
        let room = DeviceId::new();
        let stored = room.to_string();
        assert_eq!(stored.parse::<DeviceId>().unwrap(), room);
    }

    #[test]
    fn should_serialize_as_bare_uuid_string() {
        let id = EventId::new();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::Value::String(id.to_string()));
        assert_eq!(serde_json::from_value::<EventId>(json).unwrap(), id);
    }

    #[test]
    fn should_not_mistake_bridge_names_for_keys() {
        for name in ["sensor.energy_kwh_5", "binary_sensor.binary_sensor_xcomfort_bridge_home_12", "room_5"] {
            assert!(EntityId::from_str(name).is_err(), "{name} parsed as a key");
        }
    }

    #[test]
    fn should_wrap_uuid_read_from_storage() {
        let uuid = uuid::Uuid::new_v4();
        assert_eq!(DeviceId::from_uuid(uuid).as_uuid(), uuid);
    }
}
