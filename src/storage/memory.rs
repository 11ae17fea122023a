//! In-memory entry store.
//!
//! This is the reference implementation of `EntryStore`: a `Vec` in scan
//! order plus an id → slot map, both behind one `RwLock`.
//!
//! ## Limitations
//!
//! - **No persistence**: everything is gone when the store is dropped.
//! - **Removal is O(n)**: slots after the removed entry shift down.
//!
//! Use this store for:
//! - Testing the query engine end to end
//! - Embedding the cortex where entries already live in memory

use std::sync::Arc;
use async_trait::async_trait;
use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::model::Entry;
use crate::Result;
use super::EntryStore;

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory entry storage. Cloning shares the same underlying entries.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryInner>>,
}

#[derive(Default)]
struct MemoryInner {
    /// Entries in insertion (scan) order.
    entries: Vec<Entry>,
    /// id → index into `entries`
    slots: HashMap<String, usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from entries. A later entry with a repeated id replaces
    /// the earlier one in place.
    pub fn from_entries(entries: impl IntoIterator<Item = Entry>) -> Self {
        let store = Self::new();
        for entry in entries {
            store.insert(entry);
        }
        store
    }

    /// Insert `entry`, replacing any entry with the same id without moving
    /// it in scan order. Returns the replaced entry.
    pub fn insert(&self, entry: Entry) -> Option<Entry> {
        let mut inner = self.inner.write();
        match inner.slots.get(&entry.id).copied() {
            Some(slot) => Some(std::mem::replace(&mut inner.entries[slot], entry)),
            None => {
                let slot = inner.entries.len();
                inner.slots.insert(entry.id.clone(), slot);
                inner.entries.push(entry);
                None
            }
        }
    }

    /// Remove the entry with `id`, if present.
    pub fn remove(&self, id: &str) -> Option<Entry> {
        let mut inner = self.inner.write();
        let slot = inner.slots.remove(id)?;
        let removed = inner.entries.remove(slot);
        for s in inner.slots.values_mut() {
            if *s > slot {
                *s -= 1;
            }
        }
        Some(removed)
    }

    pub fn get(&self, id: &str) -> Option<Entry> {
        let inner = self.inner.read();
        inner.slots.get(id).map(|&slot| inner.entries[slot].clone())
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.entries.clear();
        inner.slots.clear();
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").field("entries", &self.len()).finish()
    }
}

// ============================================================================
// EntryStore implementation
// ============================================================================

#[async_trait]
impl EntryStore for MemoryStore {
    async fn scan_entries(&self) -> Result<Vec<Entry>> {
        Ok(self.inner.read().entries.clone())
    }

    async fn read_entry(&self, id: &str) -> Result<Option<Entry>> {
        Ok(self.get(id))
    }

    async fn entry_count(&self) -> Result<usize> {
        Ok(self.len())
    }
}
