// Circuit - in-process event orchestration for Rust
//
// Named events with a single primary handler, concurrent before-guards that
// can veto an invocation, and concurrent after-observers whose failures are
// isolated.

// Re-export the dispatch engine
pub use circuit_events::*;

// Re-export optional crates
#[cfg(feature = "testing")]
pub use circuit_testing as testing;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        DebugSink, DispatchError, Dispatcher, DispatcherBuilder, DispatcherConfig, EventPayload,
        Listener, ListenerError, ListenerResult,
    };
    pub use async_trait::async_trait;
}
