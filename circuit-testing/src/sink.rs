// Recording debug sink

use circuit_events::DebugSink;
use parking_lot::Mutex;
use std::sync::Arc;

/// Debug sink that keeps every message for later inspection.
#[derive(Clone, Default)]
pub struct RecordingSink {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages received so far
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    /// Number of messages received
    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    /// Whether no message was received
    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }

    /// Whether any message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.lock().iter().any(|m| m.contains(needle))
    }
}

impl DebugSink for RecordingSink {
    fn debug(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}
