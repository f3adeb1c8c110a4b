//! Acyclic graphs and the order-theoretic operations they support.
//!
//! # Overview
//!
//! [`AcyclicGraph`] wraps a [`DirectedGraph`] and reads as one through
//! `Deref`. Acyclicity is a convention checked on demand with
//! [`DirectedGraph::is_acyclic`]: nothing prevents a caller from adding a
//! back edge through `DerefMut`, and operations that rely on the invariant
//! ([`AcyclicGraph::transitive_reduction`], [`AcyclicGraph::transitive_closure`],
//! [`AcyclicGraph::order_subgraph`]) refuse cyclic input instead of
//! silently repairing it.
//!
//! ## Order vocabulary
//!
//! Reading an edge `a → b` as `a < b`:
//!
//! - [`AcyclicGraph::min`] / [`AcyclicGraph::max`]: sources / sinks.
//! - [`AcyclicGraph::majorants`] / [`AcyclicGraph::minorants`]: nodes strictly
//!   above / below a node.
//! - [`AcyclicGraph::filter`] / [`AcyclicGraph::ideal`]: the node together with
//!   its majorants / minorants, as an induced subgraph.
//!
//! ## Submodules
//!
//! - [`reduction`]: Goralcikova–Koubek transitive closure and reduction.
//! - [`generate`]: divisor and random DAG generators.

#![allow(clippy::module_name_repetitions)]

pub mod generate;
pub mod reduction;

use std::collections::BTreeSet;
use std::ops::{Deref, DerefMut};

use fixedbitset::FixedBitSet;
use petgraph::Direction;
use tracing::warn;

use crate::digraph::{Content, DirectedGraph};
use crate::error::GraphError;

// ---------------------------------------------------------------------------
// AcyclicGraph
// ---------------------------------------------------------------------------

/// A directed graph intended to have no directed cycle.
#[derive(Debug, Clone)]
pub struct AcyclicGraph<N, E = ()> {
    graph: DirectedGraph<N, E>,
}

impl<N: Content, E> Default for AcyclicGraph<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Content, E: PartialEq> PartialEq for AcyclicGraph<N, E> {
    fn eq(&self, other: &Self) -> bool {
        self.graph == other.graph
    }
}

impl<N: Content, E: Eq> Eq for AcyclicGraph<N, E> {}

impl<N, E> Deref for AcyclicGraph<N, E> {
    type Target = DirectedGraph<N, E>;

    fn deref(&self) -> &Self::Target {
        &self.graph
    }
}

impl<N, E> DerefMut for AcyclicGraph<N, E> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.graph
    }
}

impl<N: Content, E> AcyclicGraph<N, E> {
    /// Create an empty acyclic graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: DirectedGraph::new(),
        }
    }

    /// Build from an edge list without checking for cycles.
    #[must_use]
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (N, N)>,
        E: Default,
    {
        Self {
            graph: DirectedGraph::from_edges(edges),
        }
    }

    /// Convert a directed graph, dropping its loops.
    ///
    /// If a cycle remains after removing loops, the result is an edgeless
    /// copy of the node set: edges are never dropped selectively.
    #[must_use]
    pub fn from_graph(mut graph: DirectedGraph<N, E>) -> Self {
        graph.reflexive_reduction();
        if graph.is_acyclic() {
            return Self { graph };
        }
        warn!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "graph has a cycle; keeping nodes only"
        );
        Self {
            graph: DirectedGraph::with_nodes(graph.nodes().cloned()),
        }
    }

    pub(crate) const fn wrap(graph: DirectedGraph<N, E>) -> Self {
        Self { graph }
    }

    /// Give back the underlying directed graph.
    #[must_use]
    pub fn into_inner(self) -> DirectedGraph<N, E> {
        self.graph
    }

    // -- order queries ------------------------------------------------------

    /// Minimal elements (nodes without predecessors).
    #[must_use]
    pub fn min(&self) -> BTreeSet<&N> {
        self.sources()
    }

    /// Maximal elements (nodes without successors).
    #[must_use]
    pub fn max(&self) -> BTreeSet<&N> {
        self.sinks()
    }

    /// Nodes reachable from `node` by a non-empty path.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] if `node` is absent.
    pub fn majorants(&self, node: &N) -> Result<BTreeSet<&N>, GraphError> {
        self.reachable(node, Direction::Outgoing)
    }

    /// Nodes from which `node` is reachable by a non-empty path.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] if `node` is absent.
    pub fn minorants(&self, node: &N) -> Result<BTreeSet<&N>, GraphError> {
        self.reachable(node, Direction::Incoming)
    }

    /// Subgraph induced by `node` and its majorants.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] if `node` is absent.
    pub fn filter(&self, node: &N) -> Result<Self, GraphError>
    where
        E: Clone,
    {
        let mut keep = self.majorants(node)?;
        keep.insert(node);
        Ok(Self::wrap(self.subgraph(keep)))
    }

    /// Subgraph induced by `node` and its minorants.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] if `node` is absent.
    pub fn ideal(&self, node: &N) -> Result<Self, GraphError>
    where
        E: Clone,
    {
        let mut keep = self.minorants(node)?;
        keep.insert(node);
        Ok(Self::wrap(self.subgraph(keep)))
    }

    /// The order restricted to `keep`, as a covering graph: a copy is
    /// transitively closed, restricted to `keep`, then reduced.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidPrecondition`] if the graph has a cycle.
    pub fn order_subgraph<'a, I>(&self, keep: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = &'a N>,
        N: 'a,
        E: Clone + Default,
    {
        let mut closed = self.clone();
        closed.transitive_closure()?;
        let mut sub = Self::wrap(closed.subgraph(keep));
        sub.transitive_reduction()?;
        Ok(sub)
    }

    fn reachable(&self, node: &N, dir: Direction) -> Result<BTreeSet<&N>, GraphError> {
        let start = self.require(node)?;
        let mut seen = FixedBitSet::with_capacity(self.index_bound());
        let mut out = BTreeSet::new();
        let mut stack: Vec<_> = self
            .as_petgraph()
            .neighbors_directed(start, dir)
            .collect();
        while let Some(v) = stack.pop() {
            if seen.put(v.index()) {
                continue;
            }
            out.insert(self.content(v));
            stack.extend(self.as_petgraph().neighbors_directed(v, dir));
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn dag(edges: &[(&'static str, &'static str)]) -> AcyclicGraph<&'static str> {
        AcyclicGraph::from_edges(edges.iter().copied())
    }

    #[test]
    fn from_graph_keeps_acyclic_input() {
        let g = DirectedGraph::<&str>::from_edges([("a", "b"), ("b", "b")]);
        let d = AcyclicGraph::from_graph(g);
        assert_eq!(d.edge_count(), 1, "loop removed, edge kept");
    }

    #[test]
    fn from_graph_falls_back_to_edgeless_copy_on_cycle() {
        let g = DirectedGraph::<&str>::from_edges([("a", "b"), ("b", "c"), ("c", "a"), ("c", "d")]);
        let d = AcyclicGraph::from_graph(g);
        assert_eq!(d.node_count(), 4);
        assert_eq!(d.edge_count(), 0);
    }

    #[test]
    fn min_max_on_diamond() {
        let d = dag(&[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")]);
        assert_eq!(d.min(), BTreeSet::from([&"a"]));
        assert_eq!(d.max(), BTreeSet::from([&"d"]));
        let empty: AcyclicGraph<u8> = AcyclicGraph::new();
        assert!(empty.min().is_empty());
        assert!(empty.max().is_empty());
    }

    #[test]
    fn majorants_and_minorants_are_strict() {
        let d = dag(&[("a", "b"), ("b", "c"), ("a", "d")]);
        assert_eq!(
            d.majorants(&"a").expect("present"),
            BTreeSet::from([&"b", &"c", &"d"])
        );
        assert_eq!(d.minorants(&"c").expect("present"), BTreeSet::from([&"a", &"b"]));
        assert!(d.majorants(&"c").expect("present").is_empty());
        assert!(matches!(
            d.majorants(&"zz"),
            Err(GraphError::NodeNotFound { .. })
        ));
    }

    #[test]
    fn filter_and_ideal_include_the_node() {
        let d = dag(&[("a", "b"), ("b", "c"), ("a", "d")]);
        let f = d.filter(&"b").expect("present");
        assert_eq!(f.nodes().copied().collect::<Vec<_>>(), vec!["b", "c"]);
        let i = d.ideal(&"c").expect("present");
        assert_eq!(i.nodes().copied().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(i.edge_count(), 2);
    }

    #[test]
    fn order_subgraph_connects_through_removed_nodes() {
        // a → b → c, keep {a, c}: the order a < c survives as a cover.
        let d = dag(&[("a", "b"), ("b", "c")]);
        let sub = d.order_subgraph([&"a", &"c"]).expect("acyclic");
        assert_eq!(sub.node_count(), 2);
        assert!(sub.contains_edge(&"a", &"c"));
    }
}
