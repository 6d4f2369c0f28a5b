//! Entity service: use-cases for registering entities and writing their state.

use comforthub_domain::entity::Entity;
use comforthub_domain::error::{HubError, NotFoundError};
use comforthub_domain::event::{Event, EventType};
use comforthub_domain::id::EntityId;

use crate::ports::{EntityRepository, EventPublisher};

/// Application service for entity registration and state writes.
pub struct EntityService<R, P> {
    repo: R,
    publisher: P,
}

impl<R: EntityRepository, P: EventPublisher> EntityService<R, P> {
    /// Create a new service backed by the given repository and publisher.
    pub fn new(repo: R, publisher: P) -> Self {
        Self { repo, publisher }
    }

    /// Create or update an entity by its textual `entity_id`.
    ///
    /// An existing entity keeps its stored [`EntityId`] and, when the state
    /// did not change, its `last_changed`. Publishes
    /// [`EventType::EntityCreated`] on creation and
    /// [`EventType::StateChanged`] when the state differs from the stored one.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, entity), fields(entity_id = %entity.entity_id))]
    pub async fn upsert_entity(&self, mut entity: Entity) -> Result<Entity, HubError> {
        entity.validate()?;

        let Some(existing) = self.repo.find_by_entity_id(&entity.entity_id).await? else {
            let created = self.repo.create(entity).await?;
            tracing::debug!(state = %created.state, "entity created");
            self.publisher
                .publish(Event::new(
                    EventType::EntityCreated,
                    Some(created.id),
                    serde_json::json!({
                        "entity_id": created.entity_id,
                        "state": created.state,
                    }),
                ))
                .await?;
            return Ok(created);
        };

        entity.id = existing.id;
        let changed = existing.state != entity.state;
        if !changed {
            entity.last_changed = existing.last_changed;
        }
        let updated = self.repo.update(entity).await?;

        if changed {
            tracing::debug!(from = %existing.state, to = %updated.state, "entity state changed");
            self.publisher
                .publish(Event::new(
                    EventType::StateChanged,
                    Some(updated.id),
                    serde_json::json!({
                        "entity_id": updated.entity_id,
                        "from": existing.state,
                        "to": updated.state,
                    }),
                ))
                .await?;
        }
        Ok(updated)
    }

    /// Look up an entity by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::NotFound`] when no entity with `id` exists,
    /// or a storage error from the repository.
    pub async fn get_entity(&self, id: EntityId) -> Result<Entity, HubError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Entity",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// Find an entity by its textual id.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn find_by_entity_id(&self, entity_id: &str) -> Result<Option<Entity>, HubError> {
        self.repo.find_by_entity_id(entity_id).await
    }

    /// List all entities.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_entities(&self) -> Result<Vec<Entity>, HubError> {
        self.repo.get_all().await
    }
}
