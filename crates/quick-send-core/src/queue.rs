// SPDX-License-Identifier: AGPL-3.0
// Quick Send Core - Transfer queue store
//
// An ordered collection of transfer items with two secondary indexes:
// engine id (join key for events) and local handle (key for UI actions).
// Items are kept in insertion order through a private slot counter.

use crate::handle::LocalHandle;
use crate::item::{EngineId, TransferItem, TransferKind};
use std::collections::{BTreeMap, HashMap};

/// Upload or download queue
#[derive(Debug, Clone)]
pub struct TransferQueue {
    kind: TransferKind,
    items: BTreeMap<u64, TransferItem>,
    by_engine_id: HashMap<EngineId, u64>,
    by_handle: HashMap<LocalHandle, u64>,
    next_slot: u64,
}

impl TransferQueue {
    pub fn new(kind: TransferKind) -> Self {
        Self {
            kind,
            items: BTreeMap::new(),
            by_engine_id: HashMap::new(),
            by_handle: HashMap::new(),
            next_slot: 0,
        }
    }

    pub fn kind(&self) -> TransferKind {
        self.kind
    }

    /// Append an item at the end.
    ///
    /// Returns false without changing anything when an item with the same
    /// engine id is already queued, or when the item belongs to the other queue.
    pub fn append(&mut self, item: TransferItem) -> bool {
        if item.kind() != self.kind {
            tracing::warn!(
                "Refusing to put {} item {} into the {} queue",
                item.kind(),
                item.engine_id(),
                self.kind
            );
            return false;
        }
        if self.by_engine_id.contains_key(item.engine_id())
            || self.by_handle.contains_key(&item.handle())
        {
            return false;
        }

        let slot = self.next_slot;
        self.next_slot += 1;
        self.by_engine_id.insert(item.engine_id().clone(), slot);
        self.by_handle.insert(item.handle(), slot);
        self.items.insert(slot, item);
        true
    }

    /// Set the transferred byte count of the item with this engine id.
    ///
    /// Unknown ids are ignored. Values past the item's size are clamped.
    pub fn set_progress(&mut self, engine_id: &EngineId, bytes: u64) -> bool {
        match self.get_mut(engine_id) {
            Some(item) => {
                item.set_transferred(bytes);
                true
            }
            None => false,
        }
    }

    /// Mark the item with this engine id as fully transferred
    pub fn complete(&mut self, engine_id: &EngineId) -> bool {
        match self.get_mut(engine_id) {
            Some(item) => {
                item.finish();
                true
            }
            None => false,
        }
    }

    /// Remove the item with this handle, returning it
    pub fn remove(&mut self, handle: LocalHandle) -> Option<TransferItem> {
        let slot = self.by_handle.remove(&handle)?;
        let item = self.items.remove(&slot)?;
        self.by_engine_id.remove(item.engine_id());
        Some(item)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.by_engine_id.clear();
        self.by_handle.clear();
    }

    pub fn get(&self, engine_id: &EngineId) -> Option<&TransferItem> {
        let slot = self.by_engine_id.get(engine_id)?;
        self.items.get(slot)
    }

    pub fn get_by_handle(&self, handle: LocalHandle) -> Option<&TransferItem> {
        let slot = self.by_handle.get(&handle)?;
        self.items.get(slot)
    }

    pub fn contains(&self, engine_id: &EngineId) -> bool {
        self.by_engine_id.contains_key(engine_id)
    }

    /// Items in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &TransferItem> {
        self.items.values()
    }

    pub fn to_vec(&self) -> Vec<TransferItem> {
        self.items.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn get_mut(&mut self, engine_id: &EngineId) -> Option<&mut TransferItem> {
        let slot = self.by_engine_id.get(engine_id)?;
        self.items.get_mut(slot)
    }
}
