use std::sync::Arc;

use tokio::sync::mpsc;

use super::{NotificationEnvelope, NotificationHandle, Notifier};

/// Background task that drains the notification channel into a sink.
pub struct NotificationWriter {
    rx: mpsc::Receiver<NotificationEnvelope>,
    sink: Arc<dyn Notifier>,
}

impl NotificationWriter {
    pub fn new(rx: mpsc::Receiver<NotificationEnvelope>, sink: Arc<dyn Notifier>) -> Self {
        Self { rx, sink }
    }

    /// Deliver notifications until every handle has been dropped.
    ///
    /// Spawn this with `tokio::spawn(writer.run())`.
    pub async fn run(mut self) {
        tracing::info!("Notification writer started");

        while let Some(envelope) = self.rx.recv().await {
            tracing::debug!(emitted_at = %envelope.timestamp, "Delivering notification");
            self.sink.notify(envelope.notification);
        }

        tracing::info!("Notification writer shutting down");
    }
}

/// Create a handle for emitting notifications and the writer that delivers
/// them to `sink`.
pub fn create_notification_system(
    sink: Arc<dyn Notifier>,
    buffer_size: usize,
) -> (NotificationHandle, NotificationWriter) {
    let (handle, rx) = NotificationHandle::channel(buffer_size);
    (handle, NotificationWriter::new(rx, sink))
}
