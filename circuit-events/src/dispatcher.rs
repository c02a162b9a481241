//! Dispatch engine

use crate::config::DispatcherConfig;
use crate::error::DispatchError;
use crate::listener::{Listener, ListenerResult};
use crate::payload::EventPayload;
use crate::sink::{DebugSink, TracingSink};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::join_all;
use parking_lot::RwLock;
use std::any::{Any, type_name};
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{debug, warn};

type SharedListener<T> = Arc<dyn Listener<T>>;

/// Registry record for one event name.
struct RegisteredEvent<T> {
    handler: SharedListener<T>,
    before: RwLock<Vec<SharedListener<T>>>,
    after: RwLock<Vec<SharedListener<T>>>,
}

impl<T> RegisteredEvent<T> {
    fn new(handler: SharedListener<T>) -> Self {
        Self {
            handler,
            before: RwLock::new(Vec::new()),
            after: RwLock::new(Vec::new()),
        }
    }
}

/// Payload-type-erased view of a [`RegisteredEvent`].
trait ErasedEvent: Send + Sync {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    fn payload_type(&self) -> &'static str;

    fn before_count(&self) -> usize;

    fn after_count(&self) -> usize;
}

impl<T: Send + Sync + 'static> ErasedEvent for RegisteredEvent<T> {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn payload_type(&self) -> &'static str {
        type_name::<T>()
    }

    fn before_count(&self) -> usize {
        self.before.read().len()
    }

    fn after_count(&self) -> usize {
        self.after.read().len()
    }
}

/// In-process event dispatcher.
///
/// Each event name maps to one primary handler plus ordered before-guards
/// and after-observers. Invoking an event runs all guards concurrently,
/// runs the handler only if every guard succeeded, then runs all observers
/// concurrently.
///
/// Cloning a dispatcher shares its registry. Separately constructed
/// dispatchers are fully independent.
///
/// Listener fan-out uses `tokio::spawn`, so invocation must happen inside a
/// Tokio runtime.
#[derive(Clone)]
pub struct Dispatcher {
    /// Registered events by name
    events: Arc<DashMap<String, Arc<dyn ErasedEvent>>>,

    /// Configuration
    config: Arc<DispatcherConfig>,

    /// Receives guard/observer failures when `config.verbose` is set
    sink: Arc<dyn DebugSink>,
}

impl Dispatcher {
    /// Create a dispatcher with the default config and sink
    pub fn new() -> Self {
        Self::with_config(DispatcherConfig::default())
    }

    /// Create a dispatcher with custom config
    pub fn with_config(config: DispatcherConfig) -> Self {
        Self::with_config_and_sink(config, Arc::new(TracingSink))
    }

    fn with_config_and_sink(config: DispatcherConfig, sink: Arc<dyn DebugSink>) -> Self {
        Self {
            events: Arc::new(DashMap::new()),
            config: Arc::new(config),
            sink,
        }
    }

    /// Start building a dispatcher
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Current configuration
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Register the primary handler for `event_name`.
    ///
    /// Replaces any existing registration for the name. Guards and observers
    /// attached to the replaced registration are dropped with it.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let dispatcher = Dispatcher::new();
    /// dispatcher.register_event("order:created", |payload: EventPayload<Order>| async move {
    ///     store_order(payload.data()).await?;
    ///     Ok::<(), ListenerError>(())
    /// });
    /// ```
    pub fn register_event<T, L>(&self, event_name: impl Into<String>, handler: L)
    where
        T: Send + Sync + 'static,
        L: Listener<T> + 'static,
    {
        let event_name = event_name.into();
        let record: Arc<dyn ErasedEvent> = Arc::new(RegisteredEvent::<T>::new(Arc::new(handler)));

        let previous = self.events.insert(event_name.clone(), record);

        if !self.config.enable_logging {
            return;
        }

        match previous {
            Some(previous) if previous.before_count() + previous.after_count() > 0 => {
                warn!(
                    event = %event_name,
                    before = previous.before_count(),
                    after = previous.after_count(),
                    "Re-registered event, discarding attached listeners"
                );
            }
            Some(_) => debug!(event = %event_name, "Re-registered event"),
            None => debug!(event = %event_name, "Registered event"),
        }
    }

    /// Register the primary handler for `event_name`, refusing to replace an
    /// existing registration.
    pub fn try_register_event<T, L>(
        &self,
        event_name: impl Into<String>,
        handler: L,
    ) -> Result<(), DispatchError>
    where
        T: Send + Sync + 'static,
        L: Listener<T> + 'static,
    {
        match self.events.entry(event_name.into()) {
            Entry::Occupied(entry) => Err(DispatchError::AlreadyRegistered(entry.key().clone())),
            Entry::Vacant(entry) => {
                if self.config.enable_logging {
                    debug!(event = %entry.key(), "Registered event");
                }
                entry.insert(Arc::new(RegisteredEvent::<T>::new(Arc::new(handler))));
                Ok(())
            }
        }
    }

    /// Attach a before-guard to a registered event.
    ///
    /// A guard that fails vetoes the invocation: the handler and the
    /// observers are skipped and the invoker sees `Ok(())`.
    pub fn register_before_listener<T, L>(
        &self,
        event_name: &str,
        listener: L,
    ) -> Result<(), DispatchError>
    where
        T: Send + Sync + 'static,
        L: Listener<T> + 'static,
    {
        let event = self.lookup::<T>(event_name)?;
        event.before.write().push(Arc::new(listener));

        if self.config.enable_logging {
            debug!(event = %event_name, "Registered before listener");
        }
        Ok(())
    }

    /// Attach an after-observer to a registered event.
    ///
    /// Observers only run after the handler succeeded; their failures are
    /// isolated from each other and from the invoker.
    pub fn register_after_listener<T, L>(
        &self,
        event_name: &str,
        listener: L,
    ) -> Result<(), DispatchError>
    where
        T: Send + Sync + 'static,
        L: Listener<T> + 'static,
    {
        let event = self.lookup::<T>(event_name)?;
        event.after.write().push(Arc::new(listener));

        if self.config.enable_logging {
            debug!(event = %event_name, "Registered after listener");
        }
        Ok(())
    }

    /// Invoke the event selected by `payload.event_name()`.
    ///
    /// Returns `Ok(())` when the handler ran successfully or when a guard
    /// vetoed the invocation. Fails with [`DispatchError::NotRegistered`]
    /// for an unknown name and with [`DispatchError::Handler`] carrying the
    /// handler's own error when the handler fails.
    pub async fn invoke_event<T>(&self, payload: EventPayload<T>) -> Result<(), DispatchError>
    where
        T: Send + Sync + 'static,
    {
        let event = self.lookup::<T>(payload.event_name())?;

        if !self.run_before_listeners(&event, &payload).await {
            if self.config.enable_logging {
                debug!(event = %payload.event_name(), "Invocation aborted by before listener");
            }
            return Ok(());
        }

        if let Err(err) = event.handler.handle(payload.clone()).await {
            if self.config.enable_logging {
                debug!(event = %payload.event_name(), error = %err, "Event handler failed");
            }
            return Err(DispatchError::Handler(err));
        }

        self.run_after_listeners(&event, &payload).await;

        Ok(())
    }

    /// Whether a handler is registered for `event_name`
    pub fn is_registered(&self, event_name: &str) -> bool {
        self.events.contains_key(event_name)
    }

    /// Number of before-guards attached to `event_name`
    pub fn before_listener_count(&self, event_name: &str) -> usize {
        self.events
            .get(event_name)
            .map(|event| event.before_count())
            .unwrap_or(0)
    }

    /// Number of after-observers attached to `event_name`
    pub fn after_listener_count(&self, event_name: &str) -> usize {
        self.events
            .get(event_name)
            .map(|event| event.after_count())
            .unwrap_or(0)
    }

    /// Registered event names, sorted
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.events.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Remove the registration for `event_name`, with its listeners
    pub fn unregister_event(&self, event_name: &str) -> bool {
        let removed = self.events.remove(event_name).is_some();

        if removed && self.config.enable_logging {
            debug!(event = %event_name, "Unregistered event");
        }
        removed
    }

    /// Remove every registration
    pub fn clear(&self) {
        self.events.clear();
        if self.config.enable_logging {
            debug!("Cleared all registered events");
        }
    }

    fn lookup<T>(&self, event_name: &str) -> Result<Arc<RegisteredEvent<T>>, DispatchError>
    where
        T: Send + Sync + 'static,
    {
        let event = self
            .events
            .get(event_name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| DispatchError::NotRegistered(event_name.to_string()))?;

        let expected = event.payload_type();
        event
            .into_any()
            .downcast::<RegisteredEvent<T>>()
            .map_err(|_| DispatchError::PayloadTypeMismatch {
                event: event_name.to_string(),
                expected,
            })
    }

    /// Run every guard concurrently and report whether all of them passed.
    async fn run_before_listeners<T>(
        &self,
        event: &RegisteredEvent<T>,
        payload: &EventPayload<T>,
    ) -> bool
    where
        T: Send + Sync + 'static,
    {
        let guards = event.before.read().clone();
        let outcomes = fan_out(guards, payload).await;

        let mut passed = true;
        for outcome in outcomes {
            passed &= self.gate(payload.event_name(), outcome);
        }
        passed
    }

    /// Run every observer concurrently, absorbing failures.
    async fn run_after_listeners<T>(&self, event: &RegisteredEvent<T>, payload: &EventPayload<T>)
    where
        T: Send + Sync + 'static,
    {
        let observers = event.after.read().clone();
        let outcomes = fan_out(observers, payload).await;

        for outcome in outcomes {
            self.discard(payload.event_name(), outcome);
        }
    }

    /// Convert one guard outcome into its gate vote.
    fn gate(&self, event_name: &str, outcome: Result<ListenerResult, JoinError>) -> bool {
        match failure_message(outcome) {
            None => true,
            Some(message) => {
                self.report(|| {
                    format!(
                        "Before listener for event {} threw error.  Error: {}",
                        event_name, message
                    )
                });
                false
            }
        }
    }

    /// Log an observer failure, if any, and drop it.
    fn discard(&self, event_name: &str, outcome: Result<ListenerResult, JoinError>) {
        if let Some(message) = failure_message(outcome) {
            self.report(|| {
                format!(
                    "After listener failed for event {}.  Error: {}",
                    event_name, message
                )
            });
        }
    }

    fn report(&self, message: impl FnOnce() -> String) {
        if self.config.verbose {
            self.sink.debug(&message());
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("events", &self.event_names())
            .field("config", &self.config)
            .finish()
    }
}

/// Spawn one task per listener and wait for every one of them to settle.
async fn fan_out<T>(
    listeners: Vec<SharedListener<T>>,
    payload: &EventPayload<T>,
) -> Vec<Result<ListenerResult, JoinError>>
where
    T: Send + Sync + 'static,
{
    let tasks = listeners.into_iter().map(|listener| {
        let payload = payload.clone();
        tokio::spawn(async move { listener.handle(payload).await })
    });

    join_all(tasks).await
}

/// `None` on success, otherwise a printable reason for the failure.
fn failure_message(outcome: Result<ListenerResult, JoinError>) -> Option<String> {
    match outcome {
        Ok(Ok(())) => None,
        Ok(Err(err)) => Some(err.to_string()),
        Err(join_err) if join_err.is_panic() => {
            let panic = join_err.into_panic();
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "listener panicked".to_string());
            Some(format!("panicked: {}", reason))
        }
        Err(join_err) => Some(join_err.to_string()),
    }
}

/// Dispatcher builder
pub struct DispatcherBuilder {
    config: DispatcherConfig,
    sink: Arc<dyn DebugSink>,
}

impl DispatcherBuilder {
    /// Create new dispatcher builder
    pub fn new() -> Self {
        Self {
            config: DispatcherConfig::default(),
            sink: Arc::new(TracingSink),
        }
    }

    /// Replace the whole config
    pub fn config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Enable/disable reporting guard and observer failures to the sink
    pub fn verbose(mut self, enabled: bool) -> Self {
        self.config.verbose = enabled;
        self
    }

    /// Enable/disable lifecycle logging
    pub fn enable_logging(mut self, enabled: bool) -> Self {
        self.config.enable_logging = enabled;
        self
    }

    /// Use a custom debug sink
    pub fn sink(mut self, sink: impl DebugSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    /// Build the dispatcher
    pub fn build(self) -> Dispatcher {
        Dispatcher::with_config_and_sink(self.config, self.sink)
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
