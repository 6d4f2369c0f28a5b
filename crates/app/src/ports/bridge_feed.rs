//! Bridge feed port: ingress for raw messages coming from a bridge transport.
//!
//! The HTTP adapter (or any other transport) hands JSON payloads to the
//! feed; the bridge integration decodes and dispatches them.

use std::future::Future;

use comforthub_domain::error::HubError;

/// Accepts raw bridge messages.
pub trait BridgeFeed {
    /// Push one message.
    ///
    /// Implementations return [`HubError::Validation`] for payloads they
    /// cannot decode.
    fn push(&self, message: serde_json::Value) -> impl Future<Output = Result<(), HubError>> + Send;
}

impl<T: BridgeFeed + Send + Sync> BridgeFeed for std::sync::Arc<T> {
    fn push(&self, message: serde_json::Value) -> impl Future<Output = Result<(), HubError>> + Send {
        (**self).push(message)
    }
}
