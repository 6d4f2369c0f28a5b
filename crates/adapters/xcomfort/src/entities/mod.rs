//! Hub entities backed by bridge models.
//!
//! | Entity | Source | Platform |
//! |--------|--------|----------|
//! | [`RockerBinarySensor`] | rocker switch | `binary_sensor` |
//! | [`MeasurementSensor`] (power) | room | `sensor` |
//! | [`EnergySensor`] | room | `sensor` |
//! | [`MeasurementSensor`] (humidity, temperature) | RC touch | `sensor` |
//!
//! Entities never poll. [`XComfortEntity::attach`] spawns a task that
//! follows the source observable and writes through the
//! [`IntegrationContext`].

mod binary_sensor;
mod sensor;

pub use binary_sensor::{LAST_BUTTON_PRESSED, RockerBinarySensor};
pub use sensor::{EnergySensor, MeasurementSensor};

use std::sync::{Mutex, MutexGuard, PoisonError};

use comforthub_app::ports::IntegrationContext;
use comforthub_domain::entity::{Entity, slug};
use comforthub_domain::id::EntityId;
use tokio::task::JoinHandle;

use crate::devices::RcTouchState;
use crate::room::RoomState;

/// Prefix of rocker binary sensor unique ids.
pub const DOMAIN: &str = "xcomfort_bridge";

/// Any entity exposed by the integration.
pub enum XComfortEntity {
    Rocker(RockerBinarySensor),
    Power(MeasurementSensor<RoomState>),
    Energy(EnergySensor),
    Climate(MeasurementSensor<RcTouchState>),
}

impl XComfortEntity {
    /// Current entity snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Entity {
        match self {
            Self::Rocker(e) => e.snapshot(),
            Self::Power(e) => e.snapshot(),
            Self::Energy(e) => e.snapshot(),
            Self::Climate(e) => e.snapshot(),
        }
    }

    /// Take over the id under which the entity is stored.
    pub fn adopt_id(&self, id: EntityId) {
        match self {
            Self::Rocker(e) => e.adopt_id(id),
            Self::Power(e) => e.adopt_id(id),
            Self::Energy(e) => e.adopt_id(id),
            Self::Climate(e) => e.adopt_id(id),
        }
    }

    /// Start following the source observable.
    pub fn attach<C>(&self, ctx: C) -> JoinHandle<()>
    where
        C: IntegrationContext + Clone + 'static,
    {
        match self {
            Self::Rocker(e) => e.attach(ctx),
            Self::Power(e) => e.attach(ctx),
            Self::Energy(e) => e.attach(ctx),
            Self::Climate(e) => e.attach(ctx),
        }
    }
}

/// `{platform}.{slug(unique_id)}`.
pub(crate) fn entity_id(platform: &str, unique_id: &str) -> String {
    format!("{platform}.{}", slug(unique_id))
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Persist a snapshot, logging failures instead of stopping the caller.
pub(crate) async fn write_entity<C: IntegrationContext>(ctx: &C, entity: Entity) {
    let entity_id = entity.entity_id.clone();
    if let Err(err) = ctx.upsert_entity(entity).await {
        tracing::warn!(entity_id = %entity_id, error = %err, "failed to write entity state");
    }
}
