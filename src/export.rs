//! JSON export: render query results and traces for other tools.
//!
//! Output is a compact summary per entry, not the full record:
//!
//! ```text
//! [{"id": "req.001", "title": "...", "type": "requirement",
//!   "tags": ["p1"], "context": {...}, "connections": 3, "updated": "..."}]
//! ```

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::execution::TraceResult;
use crate::model::{ContextMap, Entry, EntryType};
use crate::storage::EntryStore;
use crate::Result;

/// Summary of one entry as written by `export_json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntrySummary<'e> {
    pub id: &'e str,
    pub title: &'e str,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub tags: Vec<&'e str>,
    #[serde(skip_serializing_if = "ContextMap::is_empty")]
    pub context: &'e ContextMap,
    /// Total number of outgoing connections.
    pub connections: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

impl<'e> From<&'e Entry> for EntrySummary<'e> {
    fn from(entry: &'e Entry) -> Self {
        Self {
            id: &entry.id,
            title: &entry.title,
            entry_type: entry.entry_type,
            tags: entry.tags.iter().map(String::as_str).collect(),
            context: &entry.context,
            connections: entry.connection_count(),
            updated: entry.updated,
        }
    }
}

/// Write `entries` as a pretty-printed JSON array of summaries.
pub fn export_json<'e>(
    entries: impl IntoIterator<Item = &'e Entry>,
    writer: &mut dyn Write,
) -> Result<()> {
    let summaries: Vec<EntrySummary<'e>> = entries.into_iter().map(EntrySummary::from).collect();
    serde_json::to_writer_pretty(&mut *writer, &summaries)?;
    writeln!(writer)?;
    Ok(())
}

/// Write a trace as JSON: root, direction, depth and levels of ids.
pub fn export_trace_json(trace: &TraceResult, writer: &mut dyn Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, trace)?;
    writeln!(writer)?;
    Ok(())
}

/// Export every entry in a store.
pub async fn export_store_json<S: EntryStore>(store: &S, writer: &mut dyn Write) -> Result<()> {
    let entries = store.scan_entries().await?;
    tracing::debug!(entries = entries.len(), "exporting store");
    export_json(&entries, writer)
}
