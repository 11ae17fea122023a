//! # Graph Index
//!
//! Bidirectional adjacency over entry connections. Every edge is stored
//! twice: once in the forward list of its source, once in the reverse list
//! of its target. Both records are written as one step, so neither map is
//! ever observable without its mirror.
//!
//! Node ids are interned to dense `NodeIx` slots; adjacency lists live in
//! two independent `Vec`s indexed by slot. Lookup by id is one hash probe
//! plus one index, O(1) on average.
//!
//! The graph is rebuilt wholesale from the entry set on every invocation.
//! There is no removal or delta-update path.

pub mod traversal;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::model::Entry;
use crate::{Error, Result};

pub use traversal::BfsLevels;

/// Dense node slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIx(u32);

impl NodeIx {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// One adjacency record: the node at the other end plus the edge weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EdgeRecord {
    node: NodeIx,
    weight: u8,
}

/// Largest number of node slots a `NodeIx` can address.
const MAX_NODES: usize = u32::MAX as usize;

/// Most entries carry a handful of connections.
type EdgeList = SmallVec<[EdgeRecord; 4]>;

/// An edge endpoint resolved before any write happens.
enum Endpoint {
    Existing(NodeIx),
    /// Not yet a node: owned id for the slot table plus a second copy as the index key.
    Fresh { id: Box<str>, key: Box<str> },
}

/// Neighbor as seen from a node: forward lists yield targets, reverse lists
/// yield sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor<'g> {
    pub id: &'g str,
    pub weight: u8,
}

/// In-memory adjacency index.
#[derive(Debug, Default)]
pub struct Graph {
    /// NodeIx → id
    ids: Vec<Box<str>>,
    /// id → NodeIx
    index: HashMap<Box<str>, NodeIx>,
    /// NodeIx → outgoing edges
    forward: Vec<EdgeList>,
    /// NodeIx → incoming edges
    reverse: Vec<EdgeList>,
    edge_count: usize,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from every connection of every entry.
    ///
    /// Entries without connections do not become nodes. Targets that are not
    /// themselves entries still become nodes.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Result<Self> {
        let mut graph = Self::new();
        for entry in entries {
            for (_, conn) in entry.all_connections() {
                graph.add_edge(&entry.id, &conn.target_id, conn.weight)?;
            }
        }
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "graph built"
        );
        Ok(graph)
    }

    /// Insert `from -> to` with `weight`, mirrored into the reverse map.
    ///
    /// All allocation happens before the first write. On failure the graph
    /// is left exactly as it was. Self-loops and duplicate edges are kept.
    pub fn add_edge(&mut self, from: &str, to: &str, weight: u8) -> Result<()> {
        self.add_edge_within(from, to, weight, MAX_NODES)
    }

    fn add_edge_within(&mut self, from: &str, to: &str, weight: u8, max_nodes: usize) -> Result<()> {
        let from_ep = self.prepare(from)?;
        let to_ep = if from == to { None } else { Some(self.prepare(to)?) };
        self.reserve(&from_ep, to_ep.as_ref(), max_nodes)?;

        // Commit phase: nothing below allocates.
        let from_ix = self.resolve(from_ep);
        let to_ix = match to_ep {
            Some(ep) => self.resolve(ep),
            None => from_ix,
        };
        self.forward[from_ix.index()].push(EdgeRecord { node: to_ix, weight });
        self.reverse[to_ix.index()].push(EdgeRecord { node: from_ix, weight });
        self.edge_count += 1;
        Ok(())
    }

    /// Reserve phase: make room for every write the commit will do.
    ///
    /// `to` is `None` for a self-loop. Only capacity changes here.
    fn reserve(&mut self, from_ep: &Endpoint, to_ep: Option<&Endpoint>, max_nodes: usize) -> Result<()> {
        let fresh = [Some(from_ep), to_ep]
            .into_iter()
            .flatten()
            .filter(|ep| matches!(ep, Endpoint::Fresh { .. }))
            .count();
        if fresh > 0 {
            if self.ids.len() + fresh > max_nodes {
                return Err(Error::ResourceExhausted("graph node slots exhausted".into()));
            }
            self.ids.try_reserve(fresh).map_err(alloc_error)?;
            self.forward.try_reserve(fresh).map_err(alloc_error)?;
            self.reverse.try_reserve(fresh).map_err(alloc_error)?;
            self.index.try_reserve(fresh).map_err(alloc_error)?;
        }
        // Fresh lists hold their first records inline; existing ones may need to grow.
        if let Endpoint::Existing(ix) = from_ep {
            self.forward[ix.index()].try_reserve(1).map_err(alloc_error)?;
        }
        match (to_ep, from_ep) {
            (Some(Endpoint::Existing(ix)), _) | (None, Endpoint::Existing(ix)) => {
                self.reverse[ix.index()].try_reserve(1).map_err(alloc_error)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn prepare(&self, id: &str) -> Result<Endpoint> {
        match self.node(id) {
            Some(ix) => Ok(Endpoint::Existing(ix)),
            None => Ok(Endpoint::Fresh {
                id: try_box_str(id)?,
                key: try_box_str(id)?,
            }),
        }
    }

    /// Must only be called after the reserve phase.
    fn resolve(&mut self, endpoint: Endpoint) -> NodeIx {
        match endpoint {
            Endpoint::Existing(ix) => ix,
            Endpoint::Fresh { id, key } => {
                let ix = NodeIx(self.ids.len() as u32);
                self.ids.push(id);
                self.index.insert(key, ix);
                self.forward.push(EdgeList::new());
                self.reverse.push(EdgeList::new());
                ix
            }
        }
    }

    /// Slot for `id`, if it is a node of this graph.
    pub fn node(&self, id: &str) -> Option<NodeIx> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Id stored at `ix`.
    pub fn id(&self, ix: NodeIx) -> &str {
        &self.ids[ix.index()]
    }

    /// Outgoing edges of `id`. Unknown nodes yield an empty list.
    pub fn adjacent(&self, id: &str) -> Vec<Neighbor<'_>> {
        self.node(id)
            .map(|ix| self.neighbors(&self.forward[ix.index()]))
            .unwrap_or_default()
    }

    /// Incoming edges of `id`. Unknown nodes yield an empty list.
    pub fn incoming(&self, id: &str) -> Vec<Neighbor<'_>> {
        self.node(id)
            .map(|ix| self.neighbors(&self.reverse[ix.index()]))
            .unwrap_or_default()
    }

    pub fn degree(&self, id: &str) -> usize {
        self.node(id).map_or(0, |ix| self.forward[ix.index()].len())
    }

    pub fn in_degree(&self, id: &str) -> usize {
        self.node(id).map_or(0, |ix| self.reverse[ix.index()].len())
    }

    /// True if at least one `from -> to` edge exists.
    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        match (self.node(from), self.node(to)) {
            (Some(f), Some(t)) => self.forward[f.index()].iter().any(|e| e.node == t),
            _ => false,
        }
    }

    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(|id| &**id)
    }

    fn neighbors(&self, list: &EdgeList) -> Vec<Neighbor<'_>> {
        list.iter()
            .map(|e| Neighbor { id: self.id(e.node), weight: e.weight })
            .collect()
    }

    /// Raw slot lists for traversal.
    pub(crate) fn out_slots(&self, ix: NodeIx) -> impl Iterator<Item = NodeIx> + '_ {
        self.forward[ix.index()].iter().map(|e| e.node)
    }

    pub(crate) fn in_slots(&self, ix: NodeIx) -> impl Iterator<Item = NodeIx> + '_ {
        self.reverse[ix.index()].iter().map(|e| e.node)
    }
}

fn try_box_str(s: &str) -> Result<Box<str>> {
    let mut owned = String::new();
    owned.try_reserve_exact(s.len()).map_err(alloc_error)?;
    owned.push_str(s);
    Ok(owned.into_boxed_str())
}

fn alloc_error(e: impl std::fmt::Debug) -> Error {
    Error::ResourceExhausted(format!("graph allocation failed: {e:?}"))
}

// ============================================================================
// Tests
// ============================================================================
