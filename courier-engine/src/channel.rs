use async_trait::async_trait;
use tokio::sync::mpsc;

use courier_core::notify::{DispatchError, NotificationDispatcher};
use courier_shared::events::NotificationEvent;

/// Dispatcher backed by an in-process channel. The api crate drains the
/// receiving end in a background worker, so dispatch never blocks the
/// committing caller.
pub struct ChannelDispatcher {
    tx: mpsc::UnboundedSender<NotificationEvent>,
}

impl ChannelDispatcher {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<NotificationEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl NotificationDispatcher for ChannelDispatcher {
    async fn dispatch(&self, event: NotificationEvent) -> Result<(), DispatchError> {
        self.tx
            .send(event)
            .map_err(|_| DispatchError::TransportClosed)
    }
}
