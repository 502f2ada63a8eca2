//! User-visible notifications.

use crate::error::Error;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

/// A message for the user, such as "Transaction Deleted".
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Notification {
    level: Level,
    message: String,
}

impl Notification {
    pub fn level(&self) -> Level {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Collects notifications until the view drains them. Clones share the same queue. Each
/// notification is also logged when it is raised.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    queue: Arc<Mutex<Vec<Notification>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn success(&self, message: impl Into<String>) {
        let message = message.into();
        info!("{message}");
        self.push(Level::Success, message).await;
    }

    /// Raises `message` for a failed operation, followed by the cause.
    pub async fn error(&self, message: &str, cause: &Error) {
        let message = format!("{message}: {cause}");
        warn!("{message}");
        self.push(Level::Error, message).await;
    }

    /// Removes and returns every notification raised so far, oldest first.
    pub async fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.queue.lock().await)
    }

    async fn push(&self, level: Level, message: String) {
        self.queue.lock().await.push(Notification { level, message });
    }
}
