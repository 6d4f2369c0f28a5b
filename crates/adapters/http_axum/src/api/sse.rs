//! Server-Sent Events (SSE) stream for real-time updates.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use comforthub_app::ports::{BridgeFeed, DeviceRepository, EntityRepository, EventPublisher};

use crate::state::AppState;

/// `GET /api/events/stream`
///
/// Sends every bus event as a JSON `data:` frame until the client
/// disconnects. Events published while a slow client lags are skipped.
pub async fn stream<ER, DR, EP, BF>(
    State(state): State<AppState<ER, DR, EP, BF>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>
where
    ER: EntityRepository + Send + Sync + 'static,
    DR: DeviceRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
    BF: BridgeFeed + Send + Sync + 'static,
{
    let event_rx = state.event_bus.subscribe();

    let event_stream = BroadcastStream::new(event_rx).filter_map(|result| match result {
        Ok(event) => match serde_json::to_string(&event) {
            Ok(json) => Some(Ok(Event::default().data(json))),
            Err(err) => {
                tracing::warn!(%err, "failed to serialize event for SSE stream");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(n)) => {
            tracing::warn!(skipped = n, "SSE subscriber lagged");
            None
        }
    });

    Sse::new(event_stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use comforthub_domain::event::{Event as DomainEvent, EventType};
    use tower::ServiceExt;

    use crate::testing::state;

    #[tokio::test]
    async fn should_subscribe_to_event_bus_when_stream_opened() {
        let (state, bus) = state(vec![], vec![]);

        let response = crate::router::build(state)
            .oneshot(
                Request::builder()
                    .uri("/api/events/stream")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/event-stream"
        );
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn should_stream_published_event_as_json_frame() {
        use comforthub_app::ports::EventPublisher;
        use tokio_stream::StreamExt;

        let (state, bus) = state(vec![], vec![]);
        let response = crate::router::build(state)
            .oneshot(
                Request::builder()
                    .uri("/api/events/stream")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        bus.publish(DomainEvent::new(
            EventType::ButtonPressed,
            None,
            serde_json::json!({ "side": "top" }),
        ))
        .await
        .unwrap();

        let mut frames = response.into_body().into_data_stream();
        let data = frames.next().await.unwrap().unwrap();
        let text = String::from_utf8(data.to_vec()).unwrap();
        assert!(text.starts_with("data: "));
        assert!(text.contains("\"button_pressed\""));
    }
}
