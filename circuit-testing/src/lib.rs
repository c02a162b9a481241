//! Testing utilities for Circuit event dispatch.
//!
//! ## Spy Listeners
//!
//! ```
//! use circuit_events::{Dispatcher, EventPayload};
//! use circuit_testing::SpyListener;
//!
//! # tokio_test::block_on(async {
//! let dispatcher = Dispatcher::new();
//! let handler = SpyListener::new();
//! let observer = SpyListener::failing("observer broke");
//!
//! dispatcher.register_event::<(), _>("user:created", handler.clone());
//! dispatcher.register_after_listener::<(), _>("user:created", observer.clone()).unwrap();
//!
//! dispatcher.invoke_event(EventPayload::new("user:created", ())).await.unwrap();
//!
//! assert_eq!(handler.call_count(), 1);
//! assert_eq!(observer.call_count(), 1);
//! # });
//! ```
//!
//! ## Capturing Diagnostics
//!
//! ```
//! use circuit_events::Dispatcher;
//! use circuit_testing::RecordingSink;
//!
//! let sink = RecordingSink::new();
//! let dispatcher = Dispatcher::builder().verbose(true).sink(sink.clone()).build();
//! assert!(sink.is_empty());
//! ```

pub mod sink;
pub mod spy;

pub use sink::RecordingSink;
pub use spy::SpyListener;

use once_cell::sync::Lazy;
use tracing_subscriber::EnvFilter;

static TRACING: Lazy<()> = Lazy::new(|| {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("circuit=debug,circuit_events=debug"));

    // Another subscriber may already be installed by the test binary.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
});

/// Install a `tracing` subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call has an effect.
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    Lazy::force(&TRACING);
}
