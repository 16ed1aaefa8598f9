// SPDX-License-Identifier: AGPL-3.0
// Quick Send Client - Async layer for Quick Send frontends
//
// This crate provides:
// - TransferEngine, the request side of the external transfer engine
// - CommandGateway and EngineBridge for request/reply over channels
// - QueueSync, the task that owns the EventRouter and publishes snapshots
// - QuickSendApp, the controller behind the send and receive screens
// - Logging initialisation

pub mod app;
pub mod bridge;
pub mod engine;
pub mod gateway;
pub mod logging;
pub mod services;
pub mod subscription;
pub mod sync;

pub use app::QuickSendApp;
pub use bridge::EngineBridge;
pub use engine::{ShareCode, TransferEngine};
pub use gateway::{CommandGateway, EngineCommand};
pub use services::{
    Clipboard, FileDialog, FileSelection, Notification, NotificationId, NotificationLevel,
    Notifier, TracingNotifier,
};
pub use subscription::EventSubscription;
pub use sync::QueueSync;

// Re-export core types for convenience
pub use quick_send_core::{
    AppError, AppSettings, EngineEvent, EngineId, LocalHandle, QueueSnapshot, RawEvent,
    SettingsStore, TransferItem, TransferKind,
};
