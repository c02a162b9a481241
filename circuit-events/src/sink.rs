//! Debug sink for listener failures

use tracing::debug;

/// Receives one message per failed before-guard or after-observer.
///
/// Only called when the dispatcher was built with `verbose` enabled.
pub trait DebugSink: Send + Sync {
    fn debug(&self, message: &str);
}

/// Default sink, forwards to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DebugSink for TracingSink {
    fn debug(&self, message: &str) {
        debug!(target: "circuit::dispatch", "{}", message);
    }
}

impl<S: DebugSink + ?Sized> DebugSink for std::sync::Arc<S> {
    fn debug(&self, message: &str) {
        (**self).debug(message)
    }
}
