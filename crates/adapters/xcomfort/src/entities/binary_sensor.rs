//! Rocker binary sensor: momentarily `on` after each press.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use comforthub_app::ports::IntegrationContext;
use comforthub_domain::entity::{AttributeValue, Entity, EntityState};
use comforthub_domain::error::HubError;
use comforthub_domain::event::{Event, EventType};
use comforthub_domain::id::{DeviceId, EntityId};
use comforthub_domain::momentary::{ButtonSide, MomentaryState};
use comforthub_domain::time::now;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt as _;

use super::{DOMAIN, entity_id, lock, write_entity};
use crate::devices::{RockerState, RockerSwitch};
use crate::observable::Observable;

/// Attribute naming the side pressed last: `none`, `top` or `bottom`.
pub const LAST_BUTTON_PRESSED: &str = "last_button_pressed";

struct Momentary {
    entity: Entity,
    state: MomentaryState,
}

impl Momentary {
    fn sync(&mut self) {
        self.entity
            .update_state(EntityState::from_bool(self.state.is_on()), now());
        self.entity.set_attribute(
            LAST_BUTTON_PRESSED,
            self.state.last_button_pressed().as_str().into(),
        );
    }
}

/// Binary sensor following one rocker switch.
pub struct RockerBinarySensor {
    device_id: u32,
    source: Arc<Observable<RockerState>>,
    inner: Arc<Mutex<Momentary>>,
    reset_after: Duration,
}

impl RockerBinarySensor {
    /// `binary_sensor_xcomfort_bridge_{identifier}-{device_id}`.
    #[must_use]
    pub fn unique_id(identifier: &str, device_id: u32) -> String {
        format!("binary_sensor_{DOMAIN}_{identifier}-{device_id}")
    }

    /// `"{component} - {device}"`, or the device name alone when the
    /// component is unknown.
    #[must_use]
    pub fn display_name(switch: &RockerSwitch, component: Option<&str>) -> String {
        match component {
            Some(component) => format!("{component} - {}", switch.name),
            None => switch.name.clone(),
        }
    }

    /// Create the sensor for `switch`, owned by the hub device `device_id`.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the switch has an empty name.
    pub fn new(
        identifier: &str,
        switch: &RockerSwitch,
        component: Option<&str>,
        device_id: DeviceId,
        reset_after: Duration,
    ) -> Result<Self, HubError> {
        let unique_id = Self::unique_id(identifier, switch.device_id);
        let entity = Entity::builder()
            .device_id(device_id)
            .entity_id(entity_id("binary_sensor", &unique_id))
            .friendly_name(Self::display_name(switch, component))
            .state(EntityState::Off)
            .attribute("unique_id", AttributeValue::String(unique_id))
            .attribute(LAST_BUTTON_PRESSED, ButtonSide::None.as_str().into())
            .build()?;

        Ok(Self {
            device_id: switch.device_id,
            source: Arc::clone(switch.state()),
            inner: Arc::new(Mutex::new(Momentary {
                entity,
                state: MomentaryState::new(),
            })),
            reset_after,
        })
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        lock(&self.inner).state.is_on()
    }

    #[must_use]
    pub fn last_button_pressed(&self) -> ButtonSide {
        lock(&self.inner).state.last_button_pressed()
    }

    #[must_use]
    pub fn snapshot(&self) -> Entity {
        lock(&self.inner).entity.clone()
    }

    pub(crate) fn adopt_id(&self, id: EntityId) {
        lock(&self.inner).entity.id = id;
    }

    /// Follow the rocker: each press turns the sensor on, publishes a
    /// `button_pressed` event and schedules the reset.
    ///
    /// Resets are not cancelled by later presses.
    pub fn attach<C>(&self, ctx: C) -> JoinHandle<()>
    where
        C: IntegrationContext + Clone + 'static,
    {
        let mut stream = self.source.subscribe();
        let inner = Arc::clone(&self.inner);
        let reset_after = self.reset_after;
        let device_id = self.device_id;

        tokio::spawn(async move {
            while let Some(item) = stream.next().await {
                let is_top = item.is_some_and(|state| state.is_top);
                let Some(pressed) = press(&inner, is_top) else {
                    tracing::debug!(device_id, "ignoring initial rocker state");
                    continue;
                };

                let side = ButtonSide::from_is_top(is_top);
                tracing::debug!(device_id, %side, "rocker pressed");
                let event = Event::new(
                    EventType::ButtonPressed,
                    Some(pressed.id),
                    serde_json::json!({
                        "entity_id": pressed.entity_id,
                        "device_id": device_id,
                        "side": side.as_str(),
                    }),
                );
                if let Err(err) = ctx.publish(event).await {
                    tracing::warn!(device_id, error = %err, "failed to publish button press");
                }
                write_entity(&ctx, pressed).await;

                tokio::spawn(reset_later(Arc::clone(&inner), ctx.clone(), reset_after));
            }
        })
    }
}

fn press(inner: &Mutex<Momentary>, is_top: bool) -> Option<Entity> {
    let mut inner = lock(inner);
    if !inner.state.observe(is_top) {
        return None;
    }
    inner.sync();
    Some(inner.entity.clone())
}

async fn reset_later<C: IntegrationContext>(inner: Arc<Mutex<Momentary>>, ctx: C, delay: Duration) {
    tokio::time::sleep(delay).await;
    let snapshot = {
        let mut inner = lock(&inner);
        inner.state.reset();
        inner.sync();
        inner.entity.clone()
    };
    write_entity(&ctx, snapshot).await;
}
