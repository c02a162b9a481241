//! Error types

use crate::listener::ListenerError;
use thiserror::Error;

/// Errors surfaced to callers of the [`Dispatcher`](crate::Dispatcher).
///
/// Guard and observer failures never appear here; they are absorbed by the
/// dispatcher and only show up in the debug sink.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Event not registered: {0}")]
    NotRegistered(String),

    #[error("Event already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Payload type mismatch for event {event}: registered with {expected}")]
    PayloadTypeMismatch {
        event: String,
        expected: &'static str,
    },

    /// The primary handler failed. Holds the handler's own error.
    #[error(transparent)]
    Handler(ListenerError),
}

impl DispatchError {
    /// Whether this is a lookup failure for an unknown event name.
    pub fn is_not_registered(&self) -> bool {
        matches!(self, DispatchError::NotRegistered(_))
    }

    /// Take the primary handler's error out, if that is what failed.
    pub fn into_handler_error(self) -> Option<ListenerError> {
        match self {
            DispatchError::Handler(err) => Some(err),
            _ => None,
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[derive(Debug, Error)]
    #[error("reserve failed")]
    struct ReserveError(#[source] io::Error);

    #[test]
    fn test_handler_error_keeps_message() {
        let err = DispatchError::Handler("boom".into());
        assert_eq!(err.to_string(), "boom");
        assert!(!err.is_not_registered());

        let inner = err.into_handler_error().unwrap();
        assert_eq!(inner.to_string(), "boom");
    }

    #[test]
    fn test_handler_error_keeps_source_chain() {
        let err = DispatchError::Handler(Box::new(ReserveError(io::Error::other("disk"))));

        assert_eq!(err.to_string(), "reserve failed");
        let source = err.source().map(|e| e.to_string());
        assert_eq!(source.as_deref(), Some("disk"));
    }

    #[test]
    fn test_not_registered_message() {
        let err = DispatchError::NotRegistered("dne".to_string());
        assert_eq!(err.to_string(), "Event not registered: dne");
        assert!(err.is_not_registered());
        assert!(err.into_handler_error().is_none());
    }
}
