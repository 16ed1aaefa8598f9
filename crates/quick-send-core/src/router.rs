// SPDX-License-Identifier: AGPL-3.0
// Quick Send Core - Event router
//
// Owns both queues and is their only writer. Engine events are applied in
// arrival order with no buffering: progress or completion for an id that
// has no queued item is dropped.

use crate::event::{EngineEvent, EventDecodeError, RawEvent};
use crate::handle::{HandleAllocator, LocalHandle};
use crate::item::{EngineId, TransferItem, TransferKind};
use crate::queue::TransferQueue;
use crate::snapshot::QueueSnapshot;

/// What routing a single event did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// A new item was queued under this handle
    Appended(LocalHandle),
    /// The id is already queued; nothing changed
    Duplicate,
    Progressed,
    Completed,
    /// No queued item carries this id
    Unroutable,
    /// The offset is below what the item already reports
    Regressed,
    /// The item already reports this offset, or is already complete
    Unchanged,
    /// The raw event could not be decoded
    Rejected(EventDecodeError),
}

impl RouteOutcome {
    /// Whether the queues changed
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::Appended(_) | Self::Progressed | Self::Completed)
    }
}

pub struct EventRouter {
    uploads: TransferQueue,
    downloads: TransferQueue,
    allocator: HandleAllocator,
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRouter {
    pub fn new() -> Self {
        Self::with_allocator(HandleAllocator::new())
    }

    pub fn with_allocator(allocator: HandleAllocator) -> Self {
        Self {
            uploads: TransferQueue::new(TransferKind::Upload),
            downloads: TransferQueue::new(TransferKind::Download),
            allocator,
        }
    }

    /// Decode and apply an event from the push channel
    pub fn route(&mut self, raw: &RawEvent) -> RouteOutcome {
        match EngineEvent::decode(raw) {
            Ok(event) => self.apply(event),
            Err(e) => {
                tracing::warn!("Dropping engine event: {}", e);
                RouteOutcome::Rejected(e)
            }
        }
    }

    pub fn apply(&mut self, event: EngineEvent) -> RouteOutcome {
        tracing::trace!("Routing {:?}", event);
        let outcome = match event {
            EngineEvent::UploadAppend { id, title, size } => {
                if self.uploads.contains(&id) {
                    RouteOutcome::Duplicate
                } else {
                    let item = TransferItem::new(
                        self.allocator.allocate(),
                        TransferKind::Upload,
                        id,
                        title,
                        size,
                    );
                    Self::append(&mut self.uploads, item)
                }
            }
            EngineEvent::UploadProgress { id, offset } => {
                Self::progress(&mut self.uploads, &id, offset)
            }
            EngineEvent::UploadAllDone { id } => Self::complete(&mut self.uploads, &id),
            EngineEvent::DownloadAppend { id, name, size } => {
                let item = TransferItem::new(
                    self.allocator.allocate(),
                    TransferKind::Download,
                    id,
                    name,
                    size,
                );
                Self::append(&mut self.downloads, item)
            }
            EngineEvent::DownloadProgress { id, offset } => {
                Self::progress(&mut self.downloads, &id, offset)
            }
            EngineEvent::DownloadDone { id } => Self::complete(&mut self.downloads, &id),
        };

        if !outcome.is_mutation() {
            tracing::debug!("Event left queues unchanged: {:?}", outcome);
        }
        outcome
    }

    fn append(queue: &mut TransferQueue, item: TransferItem) -> RouteOutcome {
        let handle = item.handle();
        if queue.append(item) {
            RouteOutcome::Appended(handle)
        } else {
            RouteOutcome::Duplicate
        }
    }

    fn progress(queue: &mut TransferQueue, id: &EngineId, offset: u64) -> RouteOutcome {
        let (current, total) = match queue.get(id) {
            Some(item) => (item.transferred_bytes(), item.total_size()),
            None => return RouteOutcome::Unroutable,
        };
        if offset < current {
            return RouteOutcome::Regressed;
        }
        if offset.min(total) == current {
            return RouteOutcome::Unchanged;
        }
        queue.set_progress(id, offset);
        RouteOutcome::Progressed
    }

    fn complete(queue: &mut TransferQueue, id: &EngineId) -> RouteOutcome {
        let done = match queue.get(id) {
            Some(item) => item.is_complete(),
            None => return RouteOutcome::Unroutable,
        };
        if done {
            return RouteOutcome::Unchanged;
        }
        queue.complete(id);
        RouteOutcome::Completed
    }

    /// Drop an upload the user dismissed
    pub fn remove_upload(&mut self, handle: LocalHandle) -> Option<TransferItem> {
        let removed = self.uploads.remove(handle);
        if let Some(item) = &removed {
            tracing::debug!("Removed upload {} ({})", handle, item.engine_id());
        }
        removed
    }

    /// Empty the download queue before a new receive session
    pub fn clear_downloads(&mut self) {
        tracing::debug!("Clearing {} downloads", self.downloads.len());
        self.downloads.clear();
    }

    pub fn uploads(&self) -> &TransferQueue {
        &self.uploads
    }

    pub fn downloads(&self) -> &TransferQueue {
        &self.downloads
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            uploads: self.uploads.to_vec(),
            downloads: self.downloads.to_vec(),
        }
    }
}
