//! JSON REST handlers for entities.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};

use comforthub_app::ports::{BridgeFeed, DeviceRepository, EntityRepository, EventPublisher};
use comforthub_domain::entity::Entity;
use comforthub_domain::error::NotFoundError;
use comforthub_domain::id::EntityId;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Entity>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<Entity>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/entities`
pub async fn list<ER, DR, EP, BF>(
    State(state): State<AppState<ER, DR, EP, BF>>,
) -> Result<ListResponse, ApiError>
where
    ER: EntityRepository + Send + Sync + 'static,
    DR: DeviceRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
    BF: BridgeFeed + Send + Sync + 'static,
{
    let entities = state.entity_service.list_entities().await?;
    Ok(ListResponse::Ok(Json(entities)))
}

/// `GET /api/entities/{id}`
///
/// `id` is either the entity's UUID or its textual id
/// (`sensor.energy_kwh_5`).
pub async fn get<ER, DR, EP, BF>(
    State(state): State<AppState<ER, DR, EP, BF>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    ER: EntityRepository + Send + Sync + 'static,
    DR: DeviceRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
    BF: BridgeFeed + Send + Sync + 'static,
{
    let entity = match EntityId::from_str(&id) {
        Ok(entity_id) => state.entity_service.get_entity(entity_id).await?,
        Err(_) => state
            .entity_service
            .find_by_entity_id(&id)
            .await?
            .ok_or(NotFoundError {
                entity: "Entity",
                id,
            })?,
    };
    Ok(GetResponse::Ok(Json(entity)))
}
