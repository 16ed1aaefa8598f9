// SPDX-License-Identifier: AGPL-3.0
// Quick Send Client - Frontend services
//
// The file picker, notifications and clipboard belong to whichever
// frontend embeds the client; these traits are all it needs from them.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Result of a file picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSelection {
    Selected(Vec<PathBuf>),
    Cancelled,
}

impl FileSelection {
    /// Selected paths; cancelling selects nothing
    pub fn into_paths(self) -> Vec<PathBuf> {
        match self {
            Self::Selected(paths) => paths,
            Self::Cancelled => Vec::new(),
        }
    }
}

#[async_trait]
pub trait FileDialog: Send + Sync {
    /// Let the user pick any number of files
    async fn pick_files(&self, title: &str) -> FileSelection;
}

pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Loading,
    Success,
    Error,
}

/// A transient, non-blocking message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    /// None keeps it up until it is replaced
    pub dismiss_after: Option<Duration>,
}

impl Notification {
    pub fn loading(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Loading,
            message: message.into(),
            dismiss_after: None,
        }
    }

    pub fn success(message: impl Into<String>, dismiss_after: Duration) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
            dismiss_after: Some(dismiss_after),
        }
    }

    pub fn error(message: impl Into<String>, dismiss_after: Duration) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
            dismiss_after: Some(dismiss_after),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationId(pub u64);

pub trait Notifier: Send + Sync {
    fn show(&self, notification: Notification) -> NotificationId;

    /// Replace a notification that is still showing
    fn update(&self, id: NotificationId, notification: Notification);
}

/// Notifier for headless use: every notification becomes a log line
#[derive(Debug, Default)]
pub struct TracingNotifier {
    next_id: AtomicU64,
}

impl TracingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(id: NotificationId, notification: &Notification) {
        match notification.level {
            NotificationLevel::Loading | NotificationLevel::Success => {
                tracing::info!("[{}] {}", id.0, notification.message)
            }
            NotificationLevel::Error => {
                tracing::warn!("[{}] {}", id.0, notification.message)
            }
        }
    }
}

impl Notifier for TracingNotifier {
    fn show(&self, notification: Notification) -> NotificationId {
        let id = NotificationId(self.next_id.fetch_add(1, Ordering::Relaxed));
        Self::log(id, &notification);
        id
    }

    fn update(&self, id: NotificationId, notification: Notification) {
        Self::log(id, &notification);
    }
}
