//! Entry in the knowledge cortex.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Connection, ConnectionType, ContextMap, Value};
use crate::{Error, Result};

/// Entry type. Closed set; the canonical name is the snake_case form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    #[default]
    Concept,
    Reference,
    Artifact,
    StateMachine,
    Lesson,
    Requirement,
    TestCase,
    Issue,
    Feature,
}

impl EntryType {
    /// Canonical name, as matched by `type:` query conditions.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Concept => "concept",
            EntryType::Reference => "reference",
            EntryType::Artifact => "artifact",
            EntryType::StateMachine => "state_machine",
            EntryType::Lesson => "lesson",
            EntryType::Requirement => "requirement",
            EntryType::TestCase => "test_case",
            EntryType::Issue => "issue",
            EntryType::Feature => "feature",
        }
    }

    pub fn all() -> &'static [EntryType] {
        &[
            EntryType::Concept,
            EntryType::Reference,
            EntryType::Artifact,
            EntryType::StateMachine,
            EntryType::Lesson,
            EntryType::Requirement,
            EntryType::TestCase,
            EntryType::Issue,
            EntryType::Feature,
        ]
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        EntryType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::InvalidEntry(format!("unknown entry type '{s}'")))
    }
}

/// An entry: one atomic knowledge or work item.
///
/// Entries are immutable for the duration of a query pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    #[serde(rename = "type", default)]
    pub entry_type: EntryType,
    pub title: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// connection type → ordered edges
    #[serde(default)]
    pub connections: BTreeMap<ConnectionType, Vec<Connection>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    /// Two-letter language code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "ContextMap::is_empty")]
    pub context: ContextMap,
}

impl Entry {
    pub fn new(id: impl Into<String>, entry_type: EntryType, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entry_type,
            title: title.into(),
            tags: BTreeSet::new(),
            connections: BTreeMap::new(),
            updated: None,
            language: None,
            context: ContextMap::new(),
        }
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_connection(mut self, kind: ConnectionType, target: impl Into<String>, weight: u8) -> Self {
        self.connect(kind, Connection::new(target, weight));
        self
    }

    /// Add a connection from a `"<type>:<target>[:<weight>]"` spec.
    pub fn with_connection_spec(mut self, spec: &str) -> Result<Self> {
        let (kind, conn) = Connection::parse_spec(spec)?;
        self.connect(kind, conn);
        Ok(self)
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn with_updated(mut self, updated: DateTime<Utc>) -> Self {
        self.updated = Some(updated);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn connect(&mut self, kind: ConnectionType, conn: Connection) {
        self.connections.entry(kind).or_default().push(conn);
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// All outgoing connections, flattened, in connection-type order.
    pub fn all_connections(&self) -> impl Iterator<Item = (ConnectionType, &Connection)> {
        self.connections
            .iter()
            .flat_map(|(kind, conns)| conns.iter().map(move |c| (*kind, c)))
    }

    pub fn connection_count(&self) -> usize {
        self.connections.values().map(Vec::len).sum()
    }

    pub fn context_value(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }
}
