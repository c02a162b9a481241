//! Listener contracts

use crate::payload::EventPayload;
use async_trait::async_trait;
use std::future::Future;

/// Error produced by a listener.
///
/// Kept as a boxed trait object so a failing primary handler's error can be
/// handed back to the invoker untouched and downcast to its concrete type.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result of running a listener.
pub type ListenerResult = Result<(), ListenerError>;

/// Async function attached to an event.
///
/// The same contract serves primary handlers, before-guards and
/// after-observers; what a failure means depends on where the listener is
/// registered.
///
/// Any `Fn(EventPayload<T>) -> impl Future<Output = ListenerResult>` closure
/// is a listener:
///
/// ```rust,ignore
/// dispatcher.register_event("user:created", |payload: EventPayload<User>| async move {
///     send_welcome_mail(payload.data()).await?;
///     Ok::<(), ListenerError>(())
/// });
/// ```
#[async_trait]
pub trait Listener<T>: Send + Sync {
    /// Handle one invocation of the event.
    async fn handle(&self, payload: EventPayload<T>) -> ListenerResult;
}

#[async_trait]
impl<T, F, Fut> Listener<T> for F
where
    T: Send + Sync + 'static,
    F: Fn(EventPayload<T>) -> Fut + Send + Sync,
    Fut: Future<Output = ListenerResult> + Send + 'static,
{
    async fn handle(&self, payload: EventPayload<T>) -> ListenerResult {
        (self)(payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Counter {
        hits: Arc<AtomicU32>,
    }

    #[async_trait]
    impl Listener<u32> for Counter {
        async fn handle(&self, payload: EventPayload<u32>) -> ListenerResult {
            self.hits.fetch_add(*payload.data(), Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_struct_listener() {
        let hits = Arc::new(AtomicU32::new(0));
        let listener = Counter { hits: hits.clone() };

        listener.handle(EventPayload::new("tick", 3)).await.unwrap();
        listener.handle(EventPayload::new("tick", 4)).await.unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 7);
    }

    #[tokio::test]
    async fn test_closure_listener() {
        let listener = |payload: EventPayload<String>| async move {
            if payload.data().is_empty() {
                return Err::<(), ListenerError>("empty".into());
            }
            Ok(())
        };

        let payload = EventPayload::new("e", "x".to_string());
        assert!(listener.handle(payload).await.is_ok());

        let err = listener
            .handle(EventPayload::new("e", String::new()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "empty");
    }
}
