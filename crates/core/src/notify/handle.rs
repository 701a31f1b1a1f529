use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use super::{Notification, Notifier};

/// Envelope wrapping a notification with the time it was emitted
#[derive(Debug, Clone)]
pub struct NotificationEnvelope {
    pub timestamp: DateTime<Utc>,
    pub notification: Notification,
}

/// Channel-backed notifier.
///
/// Cheaply cloneable. Sending never blocks: if the channel is full or
/// closed the notification is dropped and the failure is logged.
#[derive(Clone)]
pub struct NotificationHandle {
    tx: mpsc::Sender<NotificationEnvelope>,
}

impl NotificationHandle {
    pub fn new(tx: mpsc::Sender<NotificationEnvelope>) -> Self {
        Self { tx }
    }

    /// Create a handle together with the receiving end of a bounded channel.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<NotificationEnvelope>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    /// Returns true if the notification was queued.
    pub fn try_emit(&self, notification: Notification) -> bool {
        let envelope = NotificationEnvelope {
            timestamp: Utc::now(),
            notification,
        };
        match self.tx.try_send(envelope) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to emit notification: {}", e);
                false
            }
        }
    }
}

impl Notifier for NotificationHandle {
    fn notify(&self, notification: Notification) {
        self.try_emit(notification);
    }
}
