//! Entity: the central state-holding concept.
//!
//! An entity represents a single observable aspect of a device (a rocker
//! switch being pressed, a room's power draw, a thermostat's humidity).

mod attribute_value;
mod sensor;
mod state;

pub use attribute_value::AttributeValue;
pub use sensor::{DeviceClass, SensorDescription, StateClass};
pub use state::EntityState;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{HubError, ValidationError};
use crate::id::{DeviceId, EntityId};
use crate::time::{Timestamp, now};

/// Attribute key holding a sensor's numeric reading.
pub const NATIVE_VALUE: &str = "native_value";

/// A state holder exposed by a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub device_id: DeviceId,
    /// Stable textual id, e.g. `sensor.energy_kwh_5`.
    pub entity_id: String,
    pub friendly_name: String,
    pub state: EntityState,
    pub attributes: HashMap<String, AttributeValue>,
    pub last_changed: Timestamp,
    pub last_updated: Timestamp,
}

impl Entity {
    /// Create a builder for constructing an [`Entity`].
    #[must_use]
    pub fn builder() -> EntityBuilder {
        EntityBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] when `entity_id` or `friendly_name`
    /// is empty.
    pub fn validate(&self) -> Result<(), HubError> {
        if self.entity_id.is_empty() {
            return Err(ValidationError::EmptyEntityId.into());
        }
        if self.friendly_name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }

    /// Apply a new state. `last_changed` only moves when the state differs.
    pub fn update_state(&mut self, state: EntityState, at: Timestamp) {
        if self.state != state {
            self.state = state;
            self.last_changed = at;
        }
        self.last_updated = at;
    }

    #[must_use]
    pub fn get_attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.attributes.insert(key.into(), value);
    }

    /// The numeric reading of a sensor entity, if any.
    #[must_use]
    pub fn native_value(&self) -> Option<f64> {
        self.get_attribute(NATIVE_VALUE)
            .and_then(AttributeValue::as_f64)
    }
}

/// Step-by-step builder for [`Entity`].
#[derive(Debug, Default)]
pub struct EntityBuilder {
    id: Option<EntityId>,
    device_id: Option<DeviceId>,
    entity_id: Option<String>,
    friendly_name: Option<String>,
    state: EntityState,
    attributes: HashMap<String, AttributeValue>,
}

impl EntityBuilder {
    #[must_use]
    pub fn id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn device_id(mut self, device_id: DeviceId) -> Self {
        self.device_id = Some(device_id);
        self
    }

    #[must_use]
    pub fn entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    #[must_use]
    pub fn friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn state(mut self, state: EntityState) -> Self {
        self.state = state;
        self
    }

    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Consume the builder, validate, and return an [`Entity`].
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] if `entity_id` or `friendly_name`
    /// is missing or empty.
    pub fn build(self) -> Result<Entity, HubError> {
        let ts = now();
        let entity = Entity {
            id: self.id.unwrap_or_default(),
            device_id: self.device_id.unwrap_or_default(),
            entity_id: self.entity_id.unwrap_or_default(),
            friendly_name: self.friendly_name.unwrap_or_default(),
            state: self.state,
            attributes: self.attributes,
            last_changed: ts,
            last_updated: ts,
        };
        entity.validate()?;
        Ok(entity)
    }
}

/// Turn an arbitrary unique id into an entity-id-safe slug.
///
/// Lowercases ASCII letters and maps every other non-alphanumeric
/// character to `_`.
#[must_use]
pub fn slug(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sensor() -> Entity {
        Entity::builder()
            .entity_id("sensor.energy_kwh_5")
            .friendly_name("Kitchen Energy consumption")
            .build()
            .unwrap()
    }

    #[test]
    fn should_default_to_unknown_state() {
        assert_eq!(sensor().state, EntityState::Unknown);
    }

    #[test]
    fn should_reject_empty_entity_id() {
        let result = Entity::builder().friendly_name("x").build();
        assert!(matches!(
            result,
            Err(HubError::Validation(ValidationError::EmptyEntityId))
        ));
    }

    #[test]
    fn should_reject_empty_friendly_name() {
        let result = Entity::builder().entity_id("sensor.x").build();
        assert!(matches!(
            result,
            Err(HubError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_move_last_changed_only_when_state_differs() {
        let mut entity = sensor();
        let first = entity.last_changed + Duration::seconds(5);
        entity.update_state(EntityState::On, first);
        assert_eq!(entity.last_changed, first);
        assert_eq!(entity.last_updated, first);

        let second = first + Duration::seconds(5);
        entity.update_state(EntityState::On, second);
        assert_eq!(entity.last_changed, first);
        assert_eq!(entity.last_updated, second);
    }

    #[test]
    fn should_read_native_value_from_float_attribute() {
        let mut entity = sensor();
        assert_eq!(entity.native_value(), None);
        entity.set_attribute(NATIVE_VALUE, AttributeValue::Float(1.25));
        assert_eq!(entity.native_value(), Some(1.25));
    }

    #[test]
    fn should_read_native_value_from_int_attribute() {
        let mut entity = sensor();
        entity.set_attribute(NATIVE_VALUE, AttributeValue::Int(3));
        assert_eq!(entity.native_value(), Some(3.0));
    }

    #[test]
    fn should_slug_unique_ids() {
        assert_eq!(slug("humidity_Living Room_12"), "humidity_living_room_12");
        assert_eq!(
            slug("binary_sensor_xcomfort_bridge_192.168.1.5-7"),
            "binary_sensor_xcomfort_bridge_192_168_1_5_7"
        );
    }
}
