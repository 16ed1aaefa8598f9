// SPDX-License-Identifier: AGPL-3.0
// Quick Send Core - Transfer queue synchronization
//
// This crate provides:
// - LocalHandle and HandleAllocator for UI-stable item identity
// - TransferItem and the TransferQueue store used for uploads and downloads
// - EngineEvent, the closed set of push events from the transfer engine
// - EventRouter, the single writer that applies events to both queues
// - AppSettings, AppError and SettingsStore
//
// Async plumbing and the application controller live in quick-send-client.

pub mod event;
pub mod handle;
pub mod item;
pub mod queue;
pub mod router;
pub mod settings;
pub mod snapshot;
pub mod types;

// Re-export commonly used items
pub use event::{EngineEvent, EventDecodeError, RawEvent};
pub use handle::{HandleAllocator, LocalHandle};
pub use item::{EngineId, TransferItem, TransferKind};
pub use queue::TransferQueue;
pub use router::{EventRouter, RouteOutcome};
pub use settings::SettingsStore;
pub use snapshot::QueueSnapshot;
pub use types::{AppError, AppSettings};
