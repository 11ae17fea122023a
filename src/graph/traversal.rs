//! Breadth-first traversal over the adjacency index.
//!
//! Level-synchronous BFS: each frontier is expanded completely before the
//! next one starts, so a node's level is its minimum hop count from the
//! start. A dense `visited` bitmap indexed by `NodeIx` keeps each node to a
//! single visit. Edge weights are ignored here; traversal is O(V + E).

use std::collections::VecDeque;

use super::{Graph, NodeIx};
use crate::model::{Direction, EntryPath};

/// Nodes reachable from a start node, grouped by hop count.
///
/// `levels[0]` is always `[start]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BfsLevels<'g> {
    pub levels: Vec<Vec<&'g str>>,
}

impl<'g> BfsLevels<'g> {
    /// Hop count of `id`, or `None` if it was not reached.
    pub fn level_of(&self, id: &str) -> Option<usize> {
        self.levels.iter().position(|level| level.iter().any(|n| *n == id))
    }

    /// Total number of reached nodes, start included.
    pub fn node_count(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    pub fn into_owned(self) -> Vec<Vec<String>> {
        self.levels
            .into_iter()
            .map(|level| level.into_iter().map(str::to_owned).collect())
            .collect()
    }
}

impl Graph {
    /// Unbounded BFS along outgoing edges.
    pub fn bfs<'g>(&'g self, start: &'g str) -> BfsLevels<'g> {
        self.bfs_bounded(start, Direction::Outgoing, None)
    }

    /// BFS following `direction`, stopping after `max_depth` hops when set.
    ///
    /// A start node that is not in the graph has no edges; the result is the
    /// single level `[start]`.
    pub fn bfs_bounded<'g>(
        &'g self,
        start: &'g str,
        direction: Direction,
        max_depth: Option<usize>,
    ) -> BfsLevels<'g> {
        let Some(start_ix) = self.node(start) else {
            return BfsLevels { levels: vec![vec![start]] };
        };

        let mut visited = vec![false; self.node_count()];
        visited[start_ix.index()] = true;

        let mut levels = vec![vec![self.id(start_ix)]];
        let mut frontier = vec![start_ix];

        while !frontier.is_empty() {
            if max_depth.is_some_and(|max| levels.len() > max) {
                break;
            }
            let mut next = Vec::new();
            for &node in &frontier {
                for neighbor in self.step(node, direction) {
                    if !visited[neighbor.index()] {
                        visited[neighbor.index()] = true;
                        next.push(neighbor);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            levels.push(next.iter().map(|&ix| self.id(ix)).collect());
            frontier = next;
        }

        tracing::trace!(start, depth = levels.len(), "bfs finished");
        BfsLevels { levels }
    }

    /// Unweighted shortest path along outgoing edges.
    ///
    /// `start == end` yields `[start]`. `None` means unreachable, which
    /// includes either endpoint being absent from the graph.
    pub fn shortest_path(&self, start: &str, end: &str) -> Option<EntryPath> {
        if start == end {
            return Some(EntryPath::single(start));
        }
        let start_ix = self.node(start)?;
        let end_ix = self.node(end)?;

        let mut parent: Vec<Option<NodeIx>> = vec![None; self.node_count()];
        let mut visited = vec![false; self.node_count()];
        visited[start_ix.index()] = true;

        let mut queue = VecDeque::from([start_ix]);
        while let Some(node) = queue.pop_front() {
            for next in self.out_slots(node) {
                if visited[next.index()] {
                    continue;
                }
                visited[next.index()] = true;
                parent[next.index()] = Some(node);
                if next == end_ix {
                    return Some(self.unwind(&parent, end_ix));
                }
                queue.push_back(next);
            }
        }
        None
    }

    fn unwind(&self, parent: &[Option<NodeIx>], end: NodeIx) -> EntryPath {
        let mut ids = vec![self.id(end).to_owned()];
        let mut cursor = end;
        while let Some(prev) = parent[cursor.index()] {
            ids.push(self.id(prev).to_owned());
            cursor = prev;
        }
        ids.reverse();
        EntryPath::from(ids)
    }

    fn step(&self, node: NodeIx, direction: Direction) -> Box<dyn Iterator<Item = NodeIx> + '_> {
        match direction {
            Direction::Outgoing => Box::new(self.out_slots(node)),
            Direction::Incoming => Box::new(self.in_slots(node)),
            Direction::Both => Box::new(self.out_slots(node).chain(self.in_slots(node))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chain() -> Graph {
        let mut g = Graph::new();
        g.add_edge("a", "b", 10).unwrap();
        g.add_edge("b", "c", 20).unwrap();
        g
    }

    #[test]
    fn test_bfs_levels() {
        let g = chain();
        let bfs = g.bfs("a");
        assert_eq!(bfs.levels, vec![vec!["a"], vec!["b"], vec!["c"]]);
        assert_eq!(bfs.level_of("c"), Some(2));
    }

    #[test]
    fn test_bfs_minimum_hop_count() {
        let mut g = chain();
        // shortcut a -> c makes c level 1, not 2
        g.add_edge("a", "c", 1).unwrap();
        let bfs = g.bfs("a");
        assert_eq!(bfs.level_of("c"), Some(1));
        assert_eq!(bfs.node_count(), 3);
    }

    #[test]
    fn test_bfs_skips_unreachable() {
        let mut g = chain();
        g.add_edge("x", "a", 1).unwrap();
        let bfs = g.bfs("a");
        assert_eq!(bfs.level_of("x"), None);
    }

    #[test]
    fn test_bfs_cycle_visits_once() {
        let mut g = chain();
        g.add_edge("c", "a", 1).unwrap();
        g.add_edge("b", "b", 1).unwrap();
        let bfs = g.bfs("a");
        assert_eq!(bfs.node_count(), 3);
    }

    #[test]
    fn test_bfs_unknown_start() {
        let g = chain();
        assert_eq!(g.bfs("zzz").levels, vec![vec!["zzz"]]);
    }

    #[test]
    fn test_bfs_bounded_depth() {
        let g = chain();
        let bfs = g.bfs_bounded("a", Direction::Outgoing, Some(1));
        assert_eq!(bfs.levels, vec![vec!["a"], vec!["b"]]);

        let zero = g.bfs_bounded("a", Direction::Outgoing, Some(0));
        assert_eq!(zero.levels, vec![vec!["a"]]);
    }

    #[test]
    fn test_bfs_incoming_and_both() {
        let g = chain();
        let up = g.bfs_bounded("c", Direction::Incoming, None);
        assert_eq!(up.levels, vec![vec!["c"], vec!["b"], vec!["a"]]);

        let both = g.bfs_bounded("b", Direction::Both, None);
        assert_eq!(both.levels, vec![vec!["b"], vec!["c", "a"]]);
    }

    #[test]
    fn test_shortest_path() {
        let g = chain();
        let path = g.shortest_path("a", "c").unwrap();
        assert_eq!(path.ids, vec!["a", "b", "c"]);
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_shortest_path_to_self() {
        let g = chain();
        assert_eq!(g.shortest_path("a", "a").unwrap().ids, vec!["a"]);
        assert_eq!(g.shortest_path("ghost", "ghost").unwrap().ids, vec!["ghost"]);
    }

    #[test]
    fn test_shortest_path_unreachable() {
        let g = chain();
        assert!(g.shortest_path("c", "a").is_none());
        assert!(g.shortest_path("a", "ghost").is_none());
    }

    #[test]
    fn test_shortest_path_ignores_weight() {
        let mut g = Graph::new();
        // heavy direct edge vs. two light hops: fewest hops wins
        g.add_edge("a", "d", 100).unwrap();
        g.add_edge("a", "b", 1).unwrap();
        g.add_edge("b", "d", 1).unwrap();
        assert_eq!(g.shortest_path("a", "d").unwrap().ids, vec!["a", "d"]);
    }
}
