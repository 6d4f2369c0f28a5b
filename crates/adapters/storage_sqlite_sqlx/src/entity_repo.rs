//! `SQLite` implementation of [`EntityRepository`].

use std::collections::HashMap;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use comforthub_app::ports::EntityRepository;
use comforthub_domain::entity::{AttributeValue, Entity, EntityState};
use comforthub_domain::error::HubError;
use comforthub_domain::id::{DeviceId, EntityId};

use crate::error::StorageError;

/// Wrapper for converting database rows into domain types without polluting
/// domain structs with database concerns.
struct Wrapper(Entity);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Entity> {
        value.map(|w| w.0)
    }
}

fn decode<E>(err: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(err))
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let device_id: String = row.try_get("device_id")?;
        let entity_id: String = row.try_get("entity_id")?;
        let friendly_name: String = row.try_get("friendly_name")?;
        let state_str: String = row.try_get("state")?;
        let attributes_json: String = row.try_get("attributes")?;
        let last_changed_str: String = row.try_get("last_changed")?;
        let last_updated_str: String = row.try_get("last_updated")?;

        let id = EntityId::from_str(&id).map_err(decode)?;
        let device_id = DeviceId::from_str(&device_id).map_err(decode)?;
        let state: EntityState =
            serde_json::from_str(&format!("\"{state_str}\"")).map_err(decode)?;
        let attributes: HashMap<String, AttributeValue> =
            serde_json::from_str(&attributes_json).map_err(decode)?;
        let last_changed = chrono::DateTime::parse_from_rfc3339(&last_changed_str)
            .map_err(decode)?
            .to_utc();
        let last_updated = chrono::DateTime::parse_from_rfc3339(&last_updated_str)
            .map_err(decode)?
            .to_utc();

        Ok(Self(Entity {
            id,
            device_id,
            entity_id,
            friendly_name,
            state,
            attributes,
            last_changed,
            last_updated,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO entities (id, device_id, entity_id, friendly_name, state, attributes, last_changed, last_updated)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
";

const SELECT_BY_ID: &str = "SELECT * FROM entities WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM entities ORDER BY entity_id";
const SELECT_BY_DEVICE: &str = "SELECT * FROM entities WHERE device_id = ? ORDER BY entity_id";
const SELECT_BY_ENTITY_ID: &str = "SELECT * FROM entities WHERE entity_id = ?";

const UPDATE: &str = r"
    UPDATE entities
    SET device_id = ?, entity_id = ?, friendly_name = ?, state = ?, attributes = ?,
        last_changed = ?, last_updated = ?
    WHERE id = ?
";

const DELETE_BY_ID: &str = "DELETE FROM entities WHERE id = ?";

/// `SQLite`-backed entity repository.
pub struct SqliteEntityRepository {
    pool: SqlitePool,
}

impl SqliteEntityRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl EntityRepository for SqliteEntityRepository {
    async fn create(&self, entity: Entity) -> Result<Entity, HubError> {
        let attributes_json =
            serde_json::to_string(&entity.attributes).map_err(StorageError::from)?;

        sqlx::query(INSERT)
            .bind(entity.id.to_string())
            .bind(entity.device_id.to_string())
            .bind(&entity.entity_id)
            .bind(&entity.friendly_name)
            .bind(entity.state.to_string())
            .bind(&attributes_json)
            .bind(entity.last_changed.to_rfc3339())
            .bind(entity.last_updated.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(entity)
    }

    async fn get_by_id(&self, id: EntityId) -> Result<Option<Entity>, HubError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(Wrapper::maybe(row))
    }

    async fn get_all(&self) -> Result<Vec<Entity>, HubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn find_by_device_id(&self, device_id: DeviceId) -> Result<Vec<Entity>, HubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_DEVICE)
            .bind(device_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn find_by_entity_id(&self, entity_id: &str) -> Result<Option<Entity>, HubError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ENTITY_ID)
            .bind(entity_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(Wrapper::maybe(row))
    }

    async fn update(&self, entity: Entity) -> Result<Entity, HubError> {
        let attributes_json =
            serde_json::to_string(&entity.attributes).map_err(StorageError::from)?;

        sqlx::query(UPDATE)
            .bind(entity.device_id.to_string())
            .bind(&entity.entity_id)
            .bind(&entity.friendly_name)
            .bind(entity.state.to_string())
            .bind(&attributes_json)
            .bind(entity.last_changed.to_rfc3339())
            .bind(entity.last_updated.to_rfc3339())
            .bind(entity.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(entity)
    }

    async fn delete(&self, id: EntityId) -> Result<(), HubError> {
        sqlx::query(DELETE_BY_ID)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(())
    }
}
