//! In-process event dispatch for Circuit
//!
//! Register a named event with a single async handler, attach before-guards
//! and after-observers to it, then invoke it by name with a typed payload.
//!
//! ## Lifecycle
//!
//! ```text
//! invoke_event(payload)
//!     │
//!     ├── lookup ───────────────► NotRegistered error
//!     ├── before-guards (all concurrently, wait for every one)
//!     │       any failed ───────► Ok(()), nothing else runs
//!     ├── primary handler
//!     │       failed ───────────► Handler error, observers skipped
//!     └── after-observers (all concurrently, failures absorbed)
//!             ──────────────────► Ok(())
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use circuit_events::*;
//!
//! #[derive(Debug)]
//! struct OrderCreated {
//!     order_id: u64,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), DispatchError> {
//!     let dispatcher = Dispatcher::new();
//!
//!     dispatcher.register_event("order:created", |payload: EventPayload<OrderCreated>| async move {
//!         println!("storing order {}", payload.data().order_id);
//!         Ok::<(), ListenerError>(())
//!     });
//!
//!     // Veto orders with id 0
//!     dispatcher.register_before_listener("order:created", |payload: EventPayload<OrderCreated>| async move {
//!         if payload.data().order_id == 0 {
//!             return Err::<(), ListenerError>("invalid order".into());
//!         }
//!         Ok(())
//!     })?;
//!
//!     dispatcher.register_after_listener("order:created", |payload: EventPayload<OrderCreated>| async move {
//!         println!("order {} stored", payload.data().order_id);
//!         Ok::<(), ListenerError>(())
//!     })?;
//!
//!     dispatcher
//!         .invoke_event(EventPayload::new("order:created", OrderCreated { order_id: 7 }))
//!         .await
//! }
//! ```
//!
//! ## Configuration
//!
//! ```rust,ignore
//! let dispatcher = DispatcherBuilder::new()
//!     .verbose(true)              // Report guard/observer failures to the sink
//!     .enable_logging(true)       // Lifecycle tracing events
//!     .sink(MySink::default())
//!     .build();
//!
//! // Or from CIRCUIT_VERBOSE / CIRCUIT_LOG_EVENTS
//! let dispatcher = Dispatcher::with_config(DispatcherConfig::from_env()?);
//! ```
//!
//! ## Error Handling
//!
//! Only lookup failures and primary handler failures reach the invoker.
//!
//! ```rust,ignore
//! match dispatcher.invoke_event(payload).await {
//!     Ok(()) => {} // handler ran, or a guard vetoed
//!     Err(DispatchError::NotRegistered(name)) => eprintln!("unknown event {}", name),
//!     Err(DispatchError::Handler(err)) => eprintln!("handler failed: {}", err),
//!     Err(e) => eprintln!("dispatch error: {}", e),
//! }
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod listener;
pub mod payload;
pub mod sink;

pub use config::DispatcherConfig;
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use error::{ConfigError, DispatchError};
pub use listener::{Listener, ListenerError, ListenerResult};
pub use payload::EventPayload;
pub use sink::{DebugSink, TracingSink};
