//! Connection (typed, weighted, directed edge) between entries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use crate::{Error, Result};

/// Upper bound of the connection weight scale.
pub const MAX_WEIGHT: u8 = 100;

/// Weight assumed when a connection spec omits it.
pub const DEFAULT_WEIGHT: u8 = 80;

/// Connection type. Closed set; the canonical label is the snake_case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    Parent,
    Child,
    RelatesTo,
    Related,
    Blocks,
    BlockedBy,
    Validates,
    ValidatedBy,
    Implements,
    ImplementedBy,
    Tests,
    TestedBy,
}

impl ConnectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionType::Parent => "parent",
            ConnectionType::Child => "child",
            ConnectionType::RelatesTo => "relates_to",
            ConnectionType::Related => "related",
            ConnectionType::Blocks => "blocks",
            ConnectionType::BlockedBy => "blocked_by",
            ConnectionType::Validates => "validates",
            ConnectionType::ValidatedBy => "validated_by",
            ConnectionType::Implements => "implements",
            ConnectionType::ImplementedBy => "implemented_by",
            ConnectionType::Tests => "tests",
            ConnectionType::TestedBy => "tested_by",
        }
    }

    /// All connection types for iteration
    pub fn all() -> &'static [ConnectionType] {
        &[
            ConnectionType::Parent,
            ConnectionType::Child,
            ConnectionType::RelatesTo,
            ConnectionType::Related,
            ConnectionType::Blocks,
            ConnectionType::BlockedBy,
            ConnectionType::Validates,
            ConnectionType::ValidatedBy,
            ConnectionType::Implements,
            ConnectionType::ImplementedBy,
            ConnectionType::Tests,
            ConnectionType::TestedBy,
        ]
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ConnectionType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::InvalidEntry(format!("unknown connection type '{s}'")))
    }
}

/// Traversal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Outgoing,
    Incoming,
    Both,
}

/// A directed edge from the owning entry to `target_id`.
///
/// Multiplicity is allowed: the same target may appear more than once under
/// the same connection type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub target_id: String,
    pub weight: u8,
}

impl Connection {
    /// New connection; weights above `MAX_WEIGHT` are clamped.
    pub fn new(target_id: impl Into<String>, weight: u8) -> Self {
        Self {
            target_id: target_id.into(),
            weight: weight.min(MAX_WEIGHT),
        }
    }

    /// Parse a `"<type>:<target_id>[:<weight>]"` connection spec.
    ///
    /// The trailing segment is read as a weight only when it is all digits,
    /// so `"parent:wi:abc"` keeps `wi:abc` as the target.
    pub fn parse_spec(spec: &str) -> Result<(ConnectionType, Connection)> {
        let (kind, rest) = spec
            .split_once(':')
            .ok_or_else(|| Error::InvalidEntry(format!("connection spec '{spec}' has no target")))?;
        let kind: ConnectionType = kind.trim().parse()?;

        let (target, weight) = match rest.rsplit_once(':') {
            Some((target, w)) if !w.is_empty() && w.bytes().all(|b| b.is_ascii_digit()) => {
                let weight = w.parse::<u16>().ok().filter(|w| *w <= MAX_WEIGHT as u16).ok_or_else(|| {
                    Error::InvalidEntry(format!("connection weight {w} outside 0..={MAX_WEIGHT}"))
                })?;
                (target, weight as u8)
            }
            _ => (rest, DEFAULT_WEIGHT),
        };

        let target = target.trim();
        if target.is_empty() {
            return Err(Error::InvalidEntry(format!("connection spec '{spec}' has an empty target")));
        }
        Ok((kind, Connection::new(target, weight)))
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.target_id, self.weight)
    }
}
