//! xComfort adapter error types.

use comforthub_domain::error::{HubError, ValidationError};

/// Errors specific to the xComfort adapter.
#[derive(Debug, thiserror::Error)]
pub enum XComfortError {
    /// The bridge has been closed, or its message queue is gone.
    #[error("xComfort bridge closed")]
    Closed,

    /// The bridge did not finish reporting devices and rooms in time.
    #[error("timed out waiting for xComfort discovery")]
    DiscoveryTimeout,

    /// An inbound bridge message could not be decoded.
    #[error("failed to decode bridge message")]
    MessageDecode(#[source] serde_json::Error),

    /// A domain-level error (validation, not-found, etc.).
    #[error("domain error")]
    Domain(#[source] HubError),
}

impl XComfortError {
    /// Convert into a [`HubError`] for propagation across port boundaries.
    #[must_use]
    pub fn into_domain(self) -> HubError {
        match self {
            Self::Domain(err) => err,
            Self::MessageDecode(_) => HubError::Validation(ValidationError::MalformedMessage),
            other => HubError::Storage(Box::new(other)),
        }
    }
}

impl From<XComfortError> for HubError {
    fn from(err: XComfortError) -> Self {
        err.into_domain()
    }
}

impl From<HubError> for XComfortError {
    fn from(err: HubError) -> Self {
        Self::Domain(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_closed_error() {
        assert_eq!(XComfortError::Closed.to_string(), "xComfort bridge closed");
    }

    #[test]
    fn should_convert_closed_to_storage_error() {
        let err: HubError = XComfortError::Closed.into();
        assert!(matches!(err, HubError::Storage(_)));
    }

    #[test]
    fn should_convert_decode_error_to_validation_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{{bad").unwrap_err();
        let err: HubError = XComfortError::MessageDecode(json_err).into();
        assert!(matches!(
            err,
            HubError::Validation(ValidationError::MalformedMessage)
        ));
    }

    #[test]
    fn should_convert_domain_error_back_to_domain() {
        let err = XComfortError::Domain(HubError::Validation(ValidationError::EmptyName));
        let back: HubError = err.into();
        assert!(matches!(back, HubError::Validation(ValidationError::EmptyName)));
    }
}
