//! Event payloads

use std::fmt;
use std::sync::Arc;

/// The value passed through the guard → handler → observer chain.
///
/// A payload pairs the name of the event being invoked with its data.
/// Cloning is cheap: the data lives behind an [`Arc`] and every consumer
/// only ever gets shared, read-only access to it.
///
/// # Examples
///
/// ```
/// use circuit_events::EventPayload;
///
/// let payload = EventPayload::new("order:created", 42_u64);
/// assert_eq!(payload.event_name(), "order:created");
/// assert_eq!(*payload.data(), 42);
/// ```
pub struct EventPayload<T> {
    event_name: Arc<str>,
    data: Arc<T>,
}

impl<T> EventPayload<T> {
    /// Create a payload for `event_name` carrying `data`.
    pub fn new(event_name: impl Into<String>, data: T) -> Self {
        Self {
            event_name: Arc::from(event_name.into()),
            data: Arc::new(data),
        }
    }

    /// Name of the event this payload selects.
    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    /// Read-only access to the payload data.
    pub fn data(&self) -> &T {
        &self.data
    }
}

impl<T> Clone for EventPayload<T> {
    fn clone(&self) -> Self {
        Self {
            event_name: Arc::clone(&self.event_name),
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for EventPayload<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventPayload")
            .field("event_name", &self.event_name)
            .field("data", &self.data)
            .finish()
    }
}
