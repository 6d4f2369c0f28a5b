//! Numeric sensors: room power, room energy, RC touch humidity and
//! temperature.

use std::sync::{Arc, Mutex};

use comforthub_app::ports::IntegrationContext;
use comforthub_domain::energy::EnergyMeter;
use comforthub_domain::entity::{AttributeValue, Entity, SensorDescription};
use comforthub_domain::error::HubError;
use comforthub_domain::id::{DeviceId, EntityId};
use comforthub_domain::time::{Timestamp, now};
use tokio::task::JoinHandle;
use tokio_stream::StreamExt as _;

use super::{entity_id, lock, write_entity};
use crate::devices::{RcTouch, RcTouchState};
use crate::observable::Observable;
use crate::room::{Room, RoomState};

fn build_entity(
    description: &SensorDescription,
    unique_id: String,
    friendly_name: String,
    device_id: DeviceId,
    value: Option<f64>,
) -> Result<Entity, HubError> {
    let mut entity = Entity::builder()
        .device_id(device_id)
        .entity_id(entity_id("sensor", &unique_id))
        .friendly_name(friendly_name)
        .attribute("unique_id", AttributeValue::String(unique_id))
        .build()?;
    description.apply(&mut entity, value, now());
    Ok(entity)
}

/// A sensor mirroring one reading of its source snapshot.
pub struct MeasurementSensor<T> {
    description: SensorDescription,
    source: Arc<Observable<T>>,
    read: fn(&T) -> Option<f64>,
    entity: Arc<Mutex<Entity>>,
}

impl MeasurementSensor<RoomState> {
    /// Current power draw of `room`, unique id `energy_{room_id}`.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the room has an empty name.
    pub fn power(room: &Room, device_id: DeviceId) -> Result<Self, HubError> {
        Self::new(
            SensorDescription::POWER,
            format!("energy_{}", room.room_id),
            &room.name,
            device_id,
            Arc::clone(room.state()),
            |state| state.power,
        )
    }
}

impl MeasurementSensor<RcTouchState> {
    /// Humidity of an RC touch, unique id `humidity_{name}_{device_id}`.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the device has an empty name.
    pub fn humidity(device: &RcTouch, device_id: DeviceId) -> Result<Self, HubError> {
        Self::new(
            SensorDescription::HUMIDITY,
            format!("humidity_{}_{}", device.name, device.device_id),
            &device.name,
            device_id,
            Arc::clone(device.state()),
            |state| state.humidity,
        )
    }

    /// Temperature of an RC touch, unique id `temperature_{name}_{device_id}`.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the device has an empty name.
    pub fn temperature(device: &RcTouch, device_id: DeviceId) -> Result<Self, HubError> {
        Self::new(
            SensorDescription::TEMPERATURE,
            format!("temperature_{}_{}", device.name, device.device_id),
            &device.name,
            device_id,
            Arc::clone(device.state()),
            |state| state.temperature,
        )
    }
}

impl<T: Clone + Send + Sync + 'static> MeasurementSensor<T> {
    fn new(
        description: SensorDescription,
        unique_id: String,
        source_name: &str,
        device_id: DeviceId,
        source: Arc<Observable<T>>,
        read: fn(&T) -> Option<f64>,
    ) -> Result<Self, HubError> {
        let value = source.value().as_ref().and_then(read);
        let entity = build_entity(
            &description,
            unique_id,
            format!("{source_name} {}", description.name),
            device_id,
            value,
        )?;
        Ok(Self {
            description,
            source,
            read,
            entity: Arc::new(Mutex::new(entity)),
        })
    }

    #[must_use]
    pub fn native_value(&self) -> Option<f64> {
        lock(&self.entity).native_value()
    }

    #[must_use]
    pub fn snapshot(&self) -> Entity {
        lock(&self.entity).clone()
    }

    pub(crate) fn adopt_id(&self, id: EntityId) {
        lock(&self.entity).id = id;
    }

    /// Follow the source. The first item only primes the cached value;
    /// every later item is written.
    pub fn attach<C>(&self, ctx: C) -> JoinHandle<()>
    where
        C: IntegrationContext + Clone + 'static,
    {
        let mut stream = self.source.subscribe();
        let description = self.description;
        let read = self.read;
        let cell = Arc::clone(&self.entity);

        tokio::spawn(async move {
            let mut primed = false;
            while let Some(item) = stream.next().await {
                let value = item.as_ref().and_then(read);
                let snapshot = {
                    let mut entity = lock(&cell);
                    description.apply(&mut entity, value, now());
                    entity.clone()
                };
                if !primed {
                    primed = true;
                    continue;
                }
                write_entity(&ctx, snapshot).await;
            }
        })
    }
}

struct Metered {
    entity: Entity,
    meter: EnergyMeter,
}

/// Running kWh total of a room, integrated from its power readings.
pub struct EnergySensor {
    source: Arc<Observable<RoomState>>,
    inner: Arc<Mutex<Metered>>,
    clock: fn() -> Timestamp,
}

impl EnergySensor {
    /// `energy_kwh_{room_id}`.
    #[must_use]
    pub fn unique_id(room: &Room) -> String {
        format!("energy_kwh_{}", room.room_id)
    }

    /// Entity id under which the total of `room` is persisted.
    #[must_use]
    pub fn entity_id(room: &Room) -> String {
        entity_id("sensor", &Self::unique_id(room))
    }

    /// Create the sensor, continuing from `restored_kwh` when a previous
    /// total was persisted.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the room has an empty name.
    pub fn new(room: &Room, device_id: DeviceId, restored_kwh: Option<f64>) -> Result<Self, HubError> {
        Self::with_clock(room, device_id, restored_kwh, now)
    }

    /// Like [`new`](Self::new), reading sample times from `clock`.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the room has an empty name.
    pub fn with_clock(
        room: &Room,
        device_id: DeviceId,
        restored_kwh: Option<f64>,
        clock: fn() -> Timestamp,
    ) -> Result<Self, HubError> {
        let description = SensorDescription::ENERGY;
        let meter = EnergyMeter::restored(restored_kwh.unwrap_or(0.0), clock());
        let entity = build_entity(
            &description,
            Self::unique_id(room),
            format!("{} {}", room.name, description.name),
            device_id,
            Some(meter.consumption_kwh()),
        )?;
        Ok(Self {
            source: Arc::clone(room.state()),
            inner: Arc::new(Mutex::new(Metered { entity, meter })),
            clock,
        })
    }

    #[must_use]
    pub fn consumption_kwh(&self) -> f64 {
        lock(&self.inner).meter.consumption_kwh()
    }

    #[must_use]
    pub fn snapshot(&self) -> Entity {
        lock(&self.inner).entity.clone()
    }

    pub(crate) fn adopt_id(&self, id: EntityId) {
        lock(&self.inner).entity.id = id;
    }

    /// Follow the room's power readings.
    ///
    /// Every valid power sample is integrated into the meter; samples after
    /// the first are written. Snapshots without a usable power reading
    /// leave the total untouched and write nothing.
    pub fn attach<C>(&self, ctx: C) -> JoinHandle<()>
    where
        C: IntegrationContext + Clone + 'static,
    {
        let mut stream = self.source.subscribe();
        let inner = Arc::clone(&self.inner);
        let clock = self.clock;

        tokio::spawn(async move {
            let mut primed = false;
            while let Some(item) = stream.next().await {
                let first = !primed;
                primed = true;

                let snapshot = {
                    let mut inner = lock(&inner);
                    let at = clock();
                    let total = item
                        .and_then(|state| state.power)
                        .and_then(|power| inner.meter.record(power, at));
                    total.map(|total| {
                        SensorDescription::ENERGY.apply(&mut inner.entity, Some(total), at);
                        inner.entity.clone()
                    })
                };

                match snapshot {
                    Some(snapshot) if !first => write_entity(&ctx, snapshot).await,
                    Some(_) => {}
                    None => tracing::trace!("power reading missing, energy total unchanged"),
                }
            }
        })
    }
}
