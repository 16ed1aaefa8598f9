// SPDX-License-Identifier: AGPL-3.0
// Quick Send Core - Type definitions

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Application settings (GUI-agnostic)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Log filter used when RUST_LOG is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Bound of the command channel towards the engine
    #[serde(default = "default_command_capacity")]
    pub command_capacity: usize,
    /// Bound of the push-event channel from the engine
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
    /// How long result notifications stay visible, in milliseconds
    #[serde(default = "default_notification_timeout_ms")]
    pub notification_timeout_ms: u64,
    /// How long the "copied" notice stays visible, in milliseconds
    #[serde(default = "default_copy_notice_ms")]
    pub copy_notice_ms: u64,
}

fn default_log_filter() -> String {
    "warn,quick_send=trace".to_string()
}

fn default_command_capacity() -> usize {
    32
}

fn default_event_capacity() -> usize {
    64
}

fn default_notification_timeout_ms() -> u64 {
    5000
}

fn default_copy_notice_ms() -> u64 {
    2000
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            command_capacity: default_command_capacity(),
            event_capacity: default_event_capacity(),
            notification_timeout_ms: default_notification_timeout_ms(),
            copy_notice_ms: default_copy_notice_ms(),
        }
    }
}

impl AppSettings {
    /// Reject settings the client cannot run with
    pub fn validate(&self) -> Result<(), AppError> {
        if self.command_capacity == 0 {
            return Err(AppError::InvalidConfig(
                "commandCapacity must be at least 1".to_string(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(AppError::InvalidConfig(
                "eventCapacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn notification_timeout(&self) -> Duration {
        Duration::from_millis(self.notification_timeout_ms)
    }

    pub fn copy_notice(&self) -> Duration {
        Duration::from_millis(self.copy_notice_ms)
    }
}

/// Error types for the application
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    #[error("File I/O error: {0}")]
    FileIo(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Engine(String),

    #[error("Transfer engine is not running")]
    Disconnected,

    #[error("Transfer {0} is still in progress")]
    TransferInProgress(String),

    #[error("No queue item with handle {0}")]
    UnknownItem(String),

    #[error("A download is already running")]
    ReceiveInProgress,

    #[error("Engine events already have a subscriber")]
    AlreadySubscribed,

    #[error("Clipboard error: {0}")]
    Clipboard(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::FileIo(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}
