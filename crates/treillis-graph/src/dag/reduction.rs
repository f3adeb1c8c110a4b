//! Goralcikova–Koubek transitive closure and reduction.
//!
//! # Algorithm
//!
//! Nodes are handled in reverse topological order, so when node `x` is
//! processed every node after it already knows its reduced successors.
//!
//! For `x`, a frontier ordered by topological position starts with `x`'s
//! direct successors. The smallest position `y` is pulled repeatedly:
//!
//! 1. `y` is reachable from `x`, so `x → y` belongs to the closure.
//! 2. If `y` is not marked, no node pulled before it reaches `y`, hence no
//!    path of length ≥ 2 leads from `x` to `y`: `x → y` is a reduction edge.
//! 3. `y`'s reduced successors are marked and pushed to the frontier.
//!
//! Pulling in topological order guarantees that every intermediate node of
//! a path `x → … → y` is pulled (and has marked its successors) before `y`.
//! Marks are cleared after each `x` by replaying the list of touched
//! positions.
//!
//! # Complexity
//!
//! Each `x` expands only reduced successors, giving
//! O(n + n·m_c + n·m_r) with an extra log factor from the ordered frontier.
//! The closure is emitted as an edge list, never as an n × n matrix.

use std::collections::BTreeSet;

use fixedbitset::FixedBitSet;
use petgraph::{
    stable_graph::NodeIndex,
    visit::{EdgeRef, IntoEdgeReferences},
    Direction,
};
use tracing::{debug, instrument};

use super::AcyclicGraph;
use crate::digraph::Content;
use crate::error::GraphError;

/// Edge sets produced by one Goralcikova–Koubek pass.
#[derive(Debug, Default)]
struct Pass {
    reduction: BTreeSet<(NodeIndex, NodeIndex)>,
    closure: Vec<(NodeIndex, NodeIndex)>,
}

impl<N: Content, E> AcyclicGraph<N, E> {
    /// Remove every edge implied by transitivity.
    ///
    /// Returns the number of edges removed.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidPrecondition`] if the graph has a cycle.
    #[instrument(skip(self), fields(nodes = self.node_count(), edges = self.edge_count()))]
    pub fn transitive_reduction(&mut self) -> Result<usize, GraphError> {
        let pass = self.goralcikova_koubek("transitive_reduction", false)?;
        let redundant: Vec<(NodeIndex, NodeIndex)> = self
            .as_petgraph()
            .edge_references()
            .map(|e| (e.source(), e.target()))
            .filter(|pair| !pass.reduction.contains(pair))
            .collect();
        for &(a, b) in &redundant {
            self.disconnect(a, b);
        }
        debug!(removed = redundant.len(), "transitive reduction");
        Ok(redundant.len())
    }

    /// Add an edge for every pair connected by a path.
    ///
    /// Returns the number of edges added.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidPrecondition`] if the graph has a cycle.
    #[instrument(skip(self), fields(nodes = self.node_count(), edges = self.edge_count()))]
    pub fn transitive_closure(&mut self) -> Result<usize, GraphError>
    where
        E: Default,
    {
        let pass = self.goralcikova_koubek("transitive_closure", true)?;
        let mut added = 0;
        for (x, y) in pass.closure {
            if !self.has_edge_between(x, y) {
                self.connect(x, y, E::default());
                added += 1;
            }
        }
        debug!(added, "transitive closure");
        Ok(added)
    }

    fn goralcikova_koubek(
        &self,
        operation: &'static str,
        collect_closure: bool,
    ) -> Result<Pass, GraphError> {
        let topo = self
            .topological_indices()
            .map_err(|_| GraphError::cyclic(operation))?;

        let mut position = vec![usize::MAX; self.index_bound()];
        for (p, v) in topo.iter().enumerate() {
            position[v.index()] = p;
        }

        let mut reduced: Vec<Vec<usize>> = vec![Vec::new(); topo.len()];
        let mut marks = FixedBitSet::with_capacity(topo.len());
        let mut touched: Vec<usize> = Vec::new();
        let mut pass = Pass::default();

        for (px, &x) in topo.iter().enumerate().rev() {
            let mut frontier: BTreeSet<usize> = self
                .as_petgraph()
                .neighbors_directed(x, Direction::Outgoing)
                .map(|y| position[y.index()])
                .collect();
            let mut covers = Vec::new();

            while let Some(py) = frontier.pop_first() {
                let y = topo[py];
                if !marks.contains(py) {
                    covers.push(py);
                    pass.reduction.insert((x, y));
                }
                if collect_closure {
                    pass.closure.push((x, y));
                }
                for &pz in &reduced[py] {
                    if !marks.put(pz) {
                        touched.push(pz);
                        frontier.insert(pz);
                    }
                }
            }

            for p in touched.drain(..) {
                marks.set(p, false);
            }
            reduced[px] = covers;
        }
        Ok(pass)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn dag(edges: &[(u32, u32)]) -> AcyclicGraph<u32> {
        AcyclicGraph::from_edges(edges.iter().copied())
    }

    #[test]
    fn reduction_removes_redundant_edge() {
        // 1 → 2 → 3 and 1 → 3 (redundant)
        let mut g = dag(&[(1, 2), (2, 3), (1, 3)]);
        assert_eq!(g.transitive_reduction().expect("acyclic"), 1);
        assert!(!g.contains_edge(&1, &3), "redundant edge removed");
        assert!(g.contains_edge(&1, &2));
        assert!(g.contains_edge(&2, &3));
    }

    #[test]
    fn reduction_preserves_minimal_graph() {
        let mut g = dag(&[(1, 2), (1, 3), (2, 4), (3, 4)]);
        assert_eq!(g.transitive_reduction().expect("acyclic"), 0);
        assert_eq!(g.edge_count(), 4);
    }

    #[test]
    fn reduction_of_long_shortcut() {
        // chain 1 → 2 → 3 → 4 → 5 plus shortcuts 1 → 4, 2 → 5, 1 → 5
        let mut g = dag(&[(1, 2), (2, 3), (3, 4), (4, 5), (1, 4), (2, 5), (1, 5)]);
        assert_eq!(g.transitive_reduction().expect("acyclic"), 3);
        assert_eq!(g.edge_count(), 4);
    }

    #[test]
    fn closure_of_chain_is_complete() {
        let mut g = dag(&[(1, 2), (2, 3), (3, 4)]);
        assert_eq!(g.transitive_closure().expect("acyclic"), 3);
        assert_eq!(g.edge_count(), 6);
        assert_eq!(g.transitive_closure().expect("acyclic"), 0);
    }

    #[test]
    fn closure_then_reduction_restores_covers() {
        let edges = [(1, 2), (1, 3), (2, 4), (3, 4), (4, 5)];
        let mut g = dag(&edges);
        g.transitive_closure().expect("acyclic");
        g.transitive_reduction().expect("acyclic");
        assert_eq!(g, dag(&edges));
    }

    #[test]
    fn closure_agrees_with_general_graph_closure() {
        let mut fast = AcyclicGraph::divisors(30);
        let mut slow = fast.clone().into_inner();
        let added_fast = fast.transitive_closure().expect("acyclic");
        let added_slow = slow.transitive_closure();
        assert_eq!(added_fast, added_slow);
        assert_eq!(fast.into_inner(), slow);
    }

    #[test]
    fn cyclic_input_is_rejected() {
        let mut g = dag(&[(1, 2), (2, 1)]);
        assert!(matches!(
            g.transitive_reduction(),
            Err(GraphError::InvalidPrecondition {
                operation: "transitive_reduction",
                ..
            })
        ));
        assert_eq!(g.edge_count(), 2, "graph untouched on failure");
    }
}
