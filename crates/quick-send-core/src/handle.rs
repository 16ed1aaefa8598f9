// SPDX-License-Identifier: AGPL-3.0
// Quick Send Core - Local handles
//
// Handles are the UI-stable identity of a queue item. They come from a
// process-wide counter and are never reused, so a handle allocated later
// always compares greater than one allocated earlier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of a queue item, unique for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalHandle(u64);

impl LocalHandle {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LocalHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item-{}", self.0)
    }
}

/// Issues local handles
#[derive(Debug, Default, Clone, Copy)]
pub struct HandleAllocator;

impl HandleAllocator {
    pub fn new() -> Self {
        Self
    }

    pub fn allocate(&self) -> LocalHandle {
        LocalHandle(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }
}
