//! # Entry Store Trait
//!
//! The contract between the cortex and whatever holds entry records: a
//! directory of text files, a database export, a test fixture. Stores hand
//! over fully-parsed `Entry` values; parsing the on-disk representation is
//! the store's job, not the engine's.
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryStore` | `memory` | In-memory for testing/embedding |

pub mod memory;

use async_trait::async_trait;
use crate::model::Entry;
use crate::Result;

pub use memory::MemoryStore;

// ============================================================================
// EntryStore Trait
// ============================================================================

/// Source of entry records.
///
/// The engine calls `scan_entries` once per invocation and builds everything
/// else (graph, evaluation) from that snapshot.
#[async_trait]
pub trait EntryStore: Send + Sync + 'static {
    /// Bulk load every entry, in the store's stable scan order.
    async fn scan_entries(&self) -> Result<Vec<Entry>>;

    /// Point lookup. `Ok(None)` if no entry has this id.
    ///
    /// Default implementation scans; stores with an id index should override.
    async fn read_entry(&self, id: &str) -> Result<Option<Entry>> {
        Ok(self.scan_entries().await?.into_iter().find(|e| e.id == id))
    }

    /// Number of entries currently held.
    async fn entry_count(&self) -> Result<usize> {
        Ok(self.scan_entries().await?.len())
    }
}
