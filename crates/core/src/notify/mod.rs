//! User-facing notifications (success/error feedback).
//!
//! Notifications are fire-and-forget: emitting one never fails the caller.

mod handle;
mod writer;

pub use handle::*;
pub use writer::*;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// How a notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity,
        }
    }

    pub fn success(description: impl Into<String>) -> Self {
        Self::new("Sucesso", description, Severity::Success)
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self::new("Erro", description, Severity::Error)
    }
}

/// Sink for notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Notifier that writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Error => warn!(
                title = %notification.title,
                "{}", notification.description
            ),
            Severity::Info | Severity::Success => info!(
                title = %notification.title,
                "{}", notification.description
            ),
        }
    }
}
