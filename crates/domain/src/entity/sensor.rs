//! Sensor descriptions: what a numeric sensor measures and in which unit.

use serde::{Deserialize, Serialize};

use super::{AttributeValue, Entity, EntityState, NATIVE_VALUE};

/// What physical quantity a sensor measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Power,
    Energy,
    Humidity,
    Temperature,
}

impl DeviceClass {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Energy => "energy",
            Self::Humidity => "humidity",
            Self::Temperature => "temperature",
        }
    }
}

/// How successive readings relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    /// Instantaneous reading.
    Measurement,
    /// Monotonically increasing total.
    TotalIncreasing,
}

impl StateClass {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Measurement => "measurement",
            Self::TotalIncreasing => "total_increasing",
        }
    }
}

/// Static description of a sensor kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorDescription {
    pub key: &'static str,
    pub name: &'static str,
    pub device_class: DeviceClass,
    pub unit: &'static str,
    pub state_class: StateClass,
}

impl SensorDescription {
    pub const POWER: Self = Self {
        key: "current_consumption",
        name: "Current consumption",
        device_class: DeviceClass::Power,
        unit: "W",
        state_class: StateClass::Measurement,
    };

    pub const ENERGY: Self = Self {
        key: "energy_used",
        name: "Energy consumption",
        device_class: DeviceClass::Energy,
        unit: "kWh",
        state_class: StateClass::TotalIncreasing,
    };

    pub const HUMIDITY: Self = Self {
        key: "humidity",
        name: "Humidity",
        device_class: DeviceClass::Humidity,
        unit: "%",
        state_class: StateClass::Measurement,
    };

    pub const TEMPERATURE: Self = Self {
        key: "temperature",
        name: "Temperature",
        device_class: DeviceClass::Temperature,
        unit: "\u{b0}C",
        state_class: StateClass::Measurement,
    };

    /// Write the description attributes and `value` onto `entity`.
    ///
    /// A missing value leaves the entity [`Unknown`](EntityState::Unknown)
    /// with no `native_value` attribute.
    pub fn apply(&self, entity: &mut Entity, value: Option<f64>, at: crate::time::Timestamp) {
        entity.set_attribute("device_class", self.device_class.as_str().into());
        entity.set_attribute("unit_of_measurement", self.unit.into());
        entity.set_attribute("state_class", self.state_class.as_str().into());
        match value {
            Some(value) => {
                entity.set_attribute(NATIVE_VALUE, AttributeValue::Float(value));
                entity.update_state(EntityState::On, at);
            }
            None => {
                entity.attributes.remove(NATIVE_VALUE);
                entity.update_state(EntityState::Unknown, at);
            }
        }
    }
}
