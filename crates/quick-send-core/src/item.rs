// SPDX-License-Identifier: AGPL-3.0
// Quick Send Core - Queue items

use crate::handle::LocalHandle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which queue an item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransferKind {
    Upload,
    Download,
}

impl fmt::Display for TransferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upload => f.write_str("upload"),
            Self::Download => f.write_str("download"),
        }
    }
}

/// Identifier the transfer engine assigns to a transfer; the join key for events
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngineId(String);

impl EngineId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EngineId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EngineId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One entry of the upload or download queue.
///
/// Fields are read through accessors; only the owning queue changes
/// `transferred_bytes`, and never past `total_size`. Items are serialized
/// for frontends but never deserialized, so that bound cannot be bypassed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferItem {
    handle: LocalHandle,
    engine_id: EngineId,
    kind: TransferKind,
    label: String,
    total_size: u64,
    transferred_bytes: u64,
    added_at: DateTime<Utc>,
}

impl TransferItem {
    pub fn new(
        handle: LocalHandle,
        kind: TransferKind,
        engine_id: EngineId,
        label: impl Into<String>,
        total_size: u64,
    ) -> Self {
        Self {
            handle,
            engine_id,
            kind,
            label: label.into(),
            total_size,
            transferred_bytes: 0,
            added_at: Utc::now(),
        }
    }

    pub fn handle(&self) -> LocalHandle {
        self.handle
    }

    pub fn engine_id(&self) -> &EngineId {
        &self.engine_id
    }

    pub fn kind(&self) -> TransferKind {
        self.kind
    }

    /// File path or name for uploads, file title for downloads
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes
    }

    pub fn added_at(&self) -> DateTime<Utc> {
        self.added_at
    }

    /// Average rate since the item was queued, in bytes per second
    pub fn speed_bps(&self, now: DateTime<Utc>) -> u64 {
        let elapsed_ms = (now - self.added_at).num_milliseconds();
        if elapsed_ms <= 0 {
            return 0;
        }
        self.transferred_bytes.saturating_mul(1000) / elapsed_ms as u64
    }

    pub fn is_complete(&self) -> bool {
        self.transferred_bytes == self.total_size
    }

    /// Progress in `0.0..=1.0`; an empty file counts as done
    pub fn fraction(&self) -> f64 {
        if self.total_size == 0 {
            return 1.0;
        }
        self.transferred_bytes as f64 / self.total_size as f64
    }

    /// Rounded percentage for progress labels
    pub fn percent(&self) -> u8 {
        (self.fraction() * 100.0).round() as u8
    }

    pub(crate) fn set_transferred(&mut self, bytes: u64) {
        self.transferred_bytes = bytes.min(self.total_size);
    }

    pub(crate) fn finish(&mut self) {
        self.transferred_bytes = self.total_size;
    }
}
