use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use courier_shared::events::NotificationEvent;

/// Drain the notification channel and emit each event on its topic.
///
/// This stands where a broker producer would sit; consumers subscribe to the
/// structured log stream. The worker exits when every sender is dropped.
pub fn spawn_notification_worker(
    mut rx: UnboundedReceiver<NotificationEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(payload) => {
                    tracing::info!(topic = event.topic(), payload, "notification dispatched");
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to serialize notification");
                }
            }
        }
        tracing::debug!("notification channel closed, worker exiting");
    })
}
