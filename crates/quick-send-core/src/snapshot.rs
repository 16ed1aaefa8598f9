// SPDX-License-Identifier: AGPL-3.0
// Quick Send Core - Read-only queue snapshots

use crate::handle::LocalHandle;
use crate::item::TransferItem;
use serde::Serialize;

/// Owned copy of both queues for rendering
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSnapshot {
    pub uploads: Vec<TransferItem>,
    pub downloads: Vec<TransferItem>,
}

impl QueueSnapshot {
    /// True when there is at least one upload and every upload is done.
    /// This is when a share code is worth showing.
    pub fn uploads_complete(&self) -> bool {
        !self.uploads.is_empty() && self.uploads.iter().all(TransferItem::is_complete)
    }

    pub fn downloads_complete(&self) -> bool {
        !self.downloads.is_empty() && self.downloads.iter().all(TransferItem::is_complete)
    }

    pub fn upload(&self, handle: LocalHandle) -> Option<&TransferItem> {
        self.uploads.iter().find(|item| item.handle() == handle)
    }

    pub fn download(&self, handle: LocalHandle) -> Option<&TransferItem> {
        self.downloads.iter().find(|item| item.handle() == handle)
    }
}
