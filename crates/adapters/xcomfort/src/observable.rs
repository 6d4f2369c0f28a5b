//! Observable state slot: the latest snapshot plus a stream of new ones.
//!
//! Subscribers first receive the current slot (which may be empty), then
//! every snapshot pushed after they subscribed.

use std::fmt;
use std::pin::Pin;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::{Stream, StreamExt as _};

const DEFAULT_CAPACITY: usize = 64;

/// Stream returned by [`Observable::subscribe`].
pub type StateStream<T> = Pin<Box<dyn Stream<Item = Option<T>> + Send>>;

/// A push-based holder of immutable state snapshots.
pub struct Observable<T> {
    current: Mutex<Option<T>>,
    sender: broadcast::Sender<T>,
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Observable")
            .field("current", &*current)
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}

impl<T: Clone + Send + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl<T: Clone + Send + 'static> Observable<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an observable whose subscribers may lag by at most `capacity` snapshots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            current: Mutex::new(None),
            sender,
        }
    }

    /// The latest snapshot, if any was pushed.
    #[must_use]
    pub fn value(&self) -> Option<T> {
        self.lock().clone()
    }

    /// Store `value` as the latest snapshot and deliver it to subscribers.
    pub fn on_next(&self, value: T) {
        let mut current = self.lock();
        *current = Some(value.clone());
        // no subscribers is fine
        let _ = self.sender.send(value);
    }

    /// Subscribe to this observable.
    ///
    /// The first item is the current slot; later items are always `Some`.
    #[must_use]
    pub fn subscribe(&self) -> StateStream<T> {
        let (snapshot, receiver) = {
            let current = self.lock();
            (current.clone(), self.sender.subscribe())
        };

        let updates = BroadcastStream::new(receiver).filter_map(|result| match result {
            Ok(value) => Some(Some(value)),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "state subscriber lagged, snapshots dropped");
                None
            }
        });

        Box::pin(tokio_stream::once(snapshot).chain(updates))
    }

    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_replay_empty_slot_first() {
        let observable: Observable<u32> = Observable::new();
        let mut stream = observable.subscribe();
        assert_eq!(stream.next().await, Some(None));
    }

    #[tokio::test]
    async fn should_replay_current_value_then_updates() {
        let observable = Observable::new();
        observable.on_next(1);

        let mut stream = observable.subscribe();
        observable.on_next(2);
        observable.on_next(3);

        assert_eq!(stream.next().await, Some(Some(1)));
        assert_eq!(stream.next().await, Some(Some(2)));
        assert_eq!(stream.next().await, Some(Some(3)));
    }

    #[tokio::test]
    async fn should_fan_out_to_every_subscriber() {
        let observable = Observable::new();
        let mut first = observable.subscribe();
        let mut second = observable.subscribe();
        observable.on_next("top");

        assert_eq!(first.next().await, Some(None));
        assert_eq!(first.next().await, Some(Some("top")));
        assert_eq!(second.next().await, Some(None));
        assert_eq!(second.next().await, Some(Some("top")));
    }

    #[tokio::test]
    async fn should_skip_lagged_snapshots_and_continue() {
        let observable = Observable::with_capacity(2);
        let mut stream = observable.subscribe();
        for value in 0..5 {
            observable.on_next(value);
        }

        assert_eq!(stream.next().await, Some(None));
        assert_eq!(stream.next().await, Some(Some(3)));
        assert_eq!(stream.next().await, Some(Some(4)));
    }

    #[test]
    fn should_expose_latest_value() {
        let observable = Observable::new();
        assert_eq!(observable.value(), None);
        observable.on_next(21.5);
        assert_eq!(observable.value(), Some(21.5));
    }
}
