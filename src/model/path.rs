//! EntryPath: an ordered sequence of entry ids joined by connections.

use serde::{Deserialize, Serialize};

/// A path in the cortex graph: id -> id -> id ...
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPath {
    /// Entry ids along the path, start first. Never empty.
    pub ids: Vec<String>,
}

impl EntryPath {
    pub fn single(id: impl Into<String>) -> Self {
        Self { ids: vec![id.into()] }
    }

    /// Number of hops (edges), one less than the number of ids.
    pub fn len(&self) -> usize {
        self.ids.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn start(&self) -> &str {
        self.ids.first().map(String::as_str).unwrap_or_default()
    }

    pub fn end(&self) -> &str {
        self.ids.last().map(String::as_str).unwrap_or_default()
    }
}

impl From<Vec<String>> for EntryPath {
    fn from(ids: Vec<String>) -> Self {
        Self { ids }
    }
}
