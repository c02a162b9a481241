// Spy listeners for testing

use async_trait::async_trait;
use circuit_events::{EventPayload, Listener, ListenerResult};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Behavior {
    Succeed,
    Fail(String),
    Panic(String),
}

/// Listener that records every call and behaves as configured.
///
/// Clones share the same call log, so keep one clone for assertions and
/// hand the other to the dispatcher.
#[derive(Clone)]
pub struct SpyListener {
    calls: Arc<Mutex<Vec<String>>>,
    behavior: Behavior,
    delay: Option<Duration>,
}

impl SpyListener {
    /// Create a spy that always succeeds
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            behavior: Behavior::Succeed,
            delay: None,
        }
    }

    /// Create a spy that fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behavior: Behavior::Fail(message.into()),
            ..Self::new()
        }
    }

    /// Create a spy that panics with `message`
    pub fn panicking(message: impl Into<String>) -> Self {
        Self {
            behavior: Behavior::Panic(message.into()),
            ..Self::new()
        }
    }

    /// Sleep for `delay` before settling
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get the number of calls
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Check if the spy was called at all
    pub fn was_called(&self) -> bool {
        !self.calls.lock().is_empty()
    }

    /// Event names of every recorded call, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Clear all recorded calls
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

impl Default for SpyListener {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Send + Sync + 'static> Listener<T> for SpyListener {
    async fn handle(&self, payload: EventPayload<T>) -> ListenerResult {
        self.calls.lock().push(payload.event_name().to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Fail(message) => Err(message.clone().into()),
            Behavior::Panic(message) => panic!("{}", message),
        }
    }
}
