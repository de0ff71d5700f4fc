use async_trait::async_trait;
use courier_shared::events::NotificationEvent;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("notification transport closed")]
    TransportClosed,
}

/// Outbound notification seam.
///
/// Dispatch is fire-and-forget: callers invoke it only after their owning
/// transaction has committed, log failures, and never retry synchronously.
/// A failed dispatch must never roll back a financial state change.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, event: NotificationEvent) -> Result<(), DispatchError>;
}

/// Dispatcher that drops events after logging them. Used in tests and as a
/// stand-in when no transport is wired up.
pub struct NullDispatcher;

#[async_trait]
impl NotificationDispatcher for NullDispatcher {
    async fn dispatch(&self, event: NotificationEvent) -> Result<(), DispatchError> {
        tracing::debug!(topic = event.topic(), "notification dropped (null dispatcher)");
        Ok(())
    }
}
