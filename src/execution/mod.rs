//! Query execution engine.
//!
//! Runs parsed queries over a resident entry set. One invocation:
//! check ids, build a `Graph` if the policy asks for one, evaluate every
//! entry, return matches in scan order. No ranking, no sorting, no caching
//! between invocations.

use std::time::Instant;

use hashbrown::HashSet;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::graph::Graph;
use crate::model::{Direction, Entry, EntryPath};
use crate::query::{Evaluator, Query};
use crate::{Error, Result};

/// Query execution result.
#[derive(Debug, Clone)]
pub struct QueryResult {
    /// Matching entries, in scan order.
    pub entries: Vec<Entry>,
    pub stats: ExecutionStats,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.id.as_str()).collect()
    }
}

/// Execution statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionStats {
    pub entries_scanned: u64,
    pub entries_matched: u64,
    pub graph_built: bool,
    pub graph_nodes: u64,
    pub graph_edges: u64,
    pub execution_time_ms: u64,
}

/// Parse `query` once and return every matching entry, in scan order.
///
/// A graph is built only if the query contains a link condition.
pub fn run_query<'e>(entries: &'e [Entry], query: &str) -> Result<Vec<&'e Entry>> {
    let query = Query::parse(query)?;
    let (hits, _) = evaluate_all(entries, &query, &EngineConfig::default())?;
    Ok(hits.into_iter().map(|i| &entries[i]).collect())
}

/// Execute a parsed query and collect statistics.
pub fn execute(entries: &[Entry], query: &Query, config: &EngineConfig) -> Result<QueryResult> {
    let (hits, stats) = evaluate_all(entries, query, config)?;
    Ok(QueryResult {
        entries: hits.into_iter().map(|i| entries[i].clone()).collect(),
        stats,
    })
}

/// Indices of matching entries plus stats.
fn evaluate_all(
    entries: &[Entry],
    query: &Query,
    config: &EngineConfig,
) -> Result<(Vec<usize>, ExecutionStats)> {
    let start = Instant::now();
    check_unique_ids(entries)?;

    let graph = if config.wants_graph(query.has_link_condition()) {
        Some(Graph::from_entries(entries)?)
    } else {
        None
    };

    let mut evaluator = Evaluator::new().numeric_ordering(config.numeric_ordering);
    if let Some(graph) = &graph {
        evaluator = evaluator.with_graph(graph);
    }

    let hits: Vec<usize> = entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| evaluator.matches(query.root(), entry))
        .map(|(i, _)| i)
        .collect();

    let stats = ExecutionStats {
        entries_scanned: entries.len() as u64,
        entries_matched: hits.len() as u64,
        graph_built: graph.is_some(),
        graph_nodes: graph.as_ref().map_or(0, |g| g.node_count() as u64),
        graph_edges: graph.as_ref().map_or(0, |g| g.edge_count() as u64),
        execution_time_ms: start.elapsed().as_millis() as u64,
    };
    tracing::debug!(
        query = query.source(),
        scanned = stats.entries_scanned,
        matched = stats.entries_matched,
        graph = stats.graph_built,
        elapsed_ms = stats.execution_time_ms,
        "query executed"
    );
    Ok((hits, stats))
}

/// Reject entry sets in which two entries share an id.
pub fn check_unique_ids(entries: &[Entry]) -> Result<()> {
    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        if !seen.insert(entry.id.as_str()) {
            return Err(Error::DuplicateEntry(entry.id.clone()));
        }
    }
    Ok(())
}

// ============================================================================
// Trace & path
// ============================================================================

/// Entries reachable from a root, grouped by hop count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceResult {
    pub root: String,
    pub direction: Direction,
    /// Depth bound actually applied, after clamping.
    pub depth: usize,
    /// `levels[0] == [root]`. Ids may name dangling targets with no entry.
    pub levels: Vec<Vec<String>>,
}

impl TraceResult {
    /// Reached ids excluding the root.
    pub fn reached(&self) -> usize {
        self.levels.iter().skip(1).map(Vec::len).sum()
    }

    pub fn level_of(&self, id: &str) -> Option<usize> {
        self.levels.iter().position(|level| level.iter().any(|n| n == id))
    }
}

/// Impact analysis: BFS from `id` up to `depth` hops.
pub fn trace(
    entries: &[Entry],
    id: &str,
    depth: Option<usize>,
    direction: Direction,
    config: &EngineConfig,
) -> Result<TraceResult> {
    check_unique_ids(entries)?;
    require_entry(entries, id)?;

    let depth = config.trace_depth(depth);
    let graph = Graph::from_entries(entries)?;
    let levels = graph.bfs_bounded(id, direction, Some(depth)).into_owned();

    let result = TraceResult { root: id.to_string(), direction, depth, levels };
    tracing::debug!(root = id, ?direction, depth, reached = result.reached(), "trace finished");
    Ok(result)
}

/// Shortest path between two entries along outgoing connections.
///
/// `Ok(None)` means both exist but `to` is unreachable from `from`.
pub fn find_path(entries: &[Entry], from: &str, to: &str) -> Result<Option<EntryPath>> {
    check_unique_ids(entries)?;
    require_entry(entries, from)?;
    require_entry(entries, to)?;

    let graph = Graph::from_entries(entries)?;
    let path = graph.shortest_path(from, to);
    tracing::debug!(from, to, hops = path.as_ref().map(EntryPath::len), "path search finished");
    Ok(path)
}

fn require_entry(entries: &[Entry], id: &str) -> Result<()> {
    if entries.iter().any(|e| e.id == id) {
        Ok(())
    } else {
        Err(Error::NotFound(format!("entry '{id}'")))
    }
}
