use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::api::ws_types::WsMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A dismissible toast shown on every connected dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: Option<String>,
    pub at: DateTime<Utc>,
}

/// Broadcasts notifications and page-refresh hints to dashboard sockets.
/// Sending never fails the caller; with no listener the message is dropped.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<WsMessage>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WsMessage> {
        self.tx.subscribe()
    }

    pub fn publish(&self, message: WsMessage) {
        if self.tx.send(message).is_err() {
            tracing::trace!("No dashboard listeners for broadcast");
        }
    }

    fn notify(&self, level: NotificationLevel, title: &str, description: Option<&str>) {
        self.publish(WsMessage::Notification(Notification {
            level,
            title: title.to_string(),
            description: description.map(str::to_string),
            at: Utc::now(),
        }));
    }

    pub fn info(&self, title: &str, description: &str) {
        self.notify(NotificationLevel::Info, title, Some(description));
    }

    pub fn success(&self, title: &str) {
        self.notify(NotificationLevel::Success, title, None);
    }

    pub fn error(&self, title: &str) {
        self.notify(NotificationLevel::Error, title, None);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(256)
    }
}
