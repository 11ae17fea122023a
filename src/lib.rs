//! # engram-cortex — Graph Index and Query Engine for a Knowledge Cortex
//!
//! Typed entries (requirements, tests, issues, notes, ...) joined by typed,
//! weighted, directed connections, queried with a small structured language.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `EntryStore` is the contract between engine and storage
//! 2. **Clean DTOs**: `Entry`, `Connection`, `Value` cross all boundaries
//! 3. **Parser owns nothing**: query string → AST is a pure function
//! 4. **Rebuild, don't patch**: every invocation scans the store and builds
//!    the graph from scratch
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use engram_cortex::{Cortex, Entry, EntryType, ConnectionType};
//!
//! # async fn example() -> engram_cortex::Result<()> {
//! let cortex = Cortex::open_memory();
//! cortex.store().insert(
//!     Entry::new("test.001", EntryType::TestCase, "Range test")
//!         .with_connection(ConnectionType::Validates, "req.001", 90),
//! );
//!
//! let hits = cortex.query("type:test_case AND link(validates, req.001)").await?;
//! for entry in &hits {
//!     println!("{} {}", entry.id, entry.title);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Query Language
//!
//! | Form | Example |
//! |------|---------|
//! | field condition | `type:issue`, `context.priority:lte:2` |
//! | link condition | `link(validates, req.001)`, `link(, req.001)` |
//! | logic | `AND`, `OR`, `NOT`, `( ... )` |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod graph;
pub mod query;
pub mod execution;
pub mod storage;
pub mod export;
pub mod config;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Entry, EntryType, Connection, ConnectionType, Direction,
    EntryPath, Value, ContextMap,
};

// ============================================================================
// Re-exports: Graph, Query, Storage, Execution
// ============================================================================

pub use graph::{Graph, BfsLevels, Neighbor};
pub use query::{Query, QueryNode, is_structured_query};
pub use storage::{EntryStore, MemoryStore};
pub use execution::{QueryResult, ExecutionStats, TraceResult, run_query};
pub use config::{EngineConfig, GraphPolicy};

// ============================================================================
// Top-level Cortex handle
// ============================================================================

/// The primary entry point. A `Cortex` wraps an entry store and answers
/// queries, traces and path searches over it.
pub struct Cortex<S: EntryStore> {
    store: S,
    config: EngineConfig,
}

impl<S: EntryStore> Cortex<S> {
    /// Create a Cortex over the given store with default configuration.
    pub fn with_store(store: S) -> Self {
        Self { store, config: EngineConfig::default() }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run a structured query; matches come back in scan order.
    pub async fn query(&self, query: &str) -> Result<Vec<Entry>> {
        Ok(self.query_with_stats(query).await?.entries)
    }

    /// Run a structured query and keep the execution statistics.
    pub async fn query_with_stats(&self, query: &str) -> Result<QueryResult> {
        // Phase 1: Parse (before touching the store)
        let query = Query::parse(query)?;

        // Phase 2: Scan
        let entries = self.store.scan_entries().await?;

        // Phase 3: Graph + evaluate
        execution::execute(&entries, &query, &self.config)
    }

    /// Look up one entry by id.
    pub async fn show(&self, id: &str) -> Result<Entry> {
        self.store
            .read_entry(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("entry '{id}'")))
    }

    /// Entries reachable from `id`, grouped by hop count.
    ///
    /// `depth` defaults to the configured trace depth and is clamped to
    /// `max_trace_depth`.
    pub async fn trace(&self, id: &str, depth: Option<usize>, direction: Direction) -> Result<TraceResult> {
        let entries = self.store.scan_entries().await?;
        execution::trace(&entries, id, depth, direction, &self.config)
    }

    /// Shortest connection path from `from` to `to`.
    pub async fn path(&self, from: &str, to: &str) -> Result<Option<EntryPath>> {
        let entries = self.store.scan_entries().await?;
        execution::find_path(&entries, from, to)
    }

    /// Entry and graph counts.
    pub async fn status(&self) -> Result<CortexStatus> {
        let entries = self.store.scan_entries().await?;
        execution::check_unique_ids(&entries)?;
        let graph = Graph::from_entries(&entries)?;

        let mut by_type = std::collections::BTreeMap::new();
        for entry in &entries {
            *by_type.entry(entry.entry_type).or_insert(0) += 1;
        }
        Ok(CortexStatus {
            entries: entries.len(),
            by_type,
            graph_nodes: graph.node_count(),
            graph_edges: graph.edge_count(),
        })
    }
}

/// In-memory cortex for testing and embedding.
impl Cortex<MemoryStore> {
    pub fn open_memory() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

/// Snapshot of corpus size, as reported by `Cortex::status`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CortexStatus {
    pub entries: usize,
    pub by_type: std::collections::BTreeMap<EntryType, usize>,
    pub graph_nodes: usize,
    pub graph_edges: usize,
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Query syntax error at position {position}: {message}")]
    SyntaxError { position: usize, message: String },

    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    #[error("Duplicate entry id: {0}")]
    DuplicateEntry(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
