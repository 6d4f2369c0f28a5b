//! Bridge ingress: an external transport posts bridge messages here.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use comforthub_app::ports::{BridgeFeed, DeviceRepository, EntityRepository, EventPublisher};
use comforthub_domain::error::NotFoundError;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the push endpoint.
pub enum PushResponse {
    Accepted,
}

impl IntoResponse for PushResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Accepted => StatusCode::ACCEPTED.into_response(),
        }
    }
}

/// `POST /api/bridge/messages`
pub async fn push<ER, DR, EP, BF>(
    State(state): State<AppState<ER, DR, EP, BF>>,
    Json(message): Json<serde_json::Value>,
) -> Result<PushResponse, ApiError>
where
    ER: EntityRepository + Send + Sync + 'static,
    DR: DeviceRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
    BF: BridgeFeed + Send + Sync + 'static,
{
    let feed = state.bridge_feed.as_ref().ok_or_else(|| NotFoundError {
        entity: "Bridge",
        id: "feed".to_string(),
    })?;
    feed.push(message).await?;
    Ok(PushResponse::Accepted)
}
