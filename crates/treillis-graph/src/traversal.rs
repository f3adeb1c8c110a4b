//! Depth-first traversal and the algorithms built on it.
//!
//! # Overview
//!
//! Every traversal here is iterative (explicit stack) and explores roots and
//! successors in content order, so the produced orders are deterministic for
//! a given graph. Visit marks live in a [`FixedBitSet`] sized to the graph's
//! index bound and scoped to a single call.
//!
//! - [`DirectedGraph::depth_first_search`]: first-visited and finish orders.
//! - [`DirectedGraph::strongly_connected_components`]: Kosaraju's two passes
//!   (finish order on the graph, then DFS on the transpose in decreasing
//!   finish order).
//! - [`DirectedGraph::topological_sort`]: reverse finish order, refused on a
//!   cyclic graph.

use std::collections::BTreeSet;

use fixedbitset::FixedBitSet;
use petgraph::{
    stable_graph::NodeIndex,
    visit::{EdgeRef, IntoEdgeReferences},
    Direction,
};
use tracing::{debug, instrument};

use crate::dag::AcyclicGraph;
use crate::digraph::{Content, DirectedGraph};
use crate::error::GraphError;

/// The two orders produced by a depth-first search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthFirstOrder<'g, N> {
    /// Nodes in the order they were first reached.
    pub visited: Vec<&'g N>,
    /// Nodes in the order their exploration completed.
    pub finished: Vec<&'g N>,
}

struct Frame {
    node: NodeIndex,
    next: Vec<NodeIndex>,
    pos: usize,
}

impl<N: Content, E> DirectedGraph<N, E> {
    /// Depth-first search over the whole graph.
    ///
    /// Roots are taken in content order; each node's successors are explored
    /// in content order. Every node appears exactly once in each order.
    #[must_use]
    pub fn depth_first_search(&self) -> DepthFirstOrder<'_, N> {
        let roots: Vec<NodeIndex> = self.indices().collect();
        let (visited, finished) = self.dfs_indices(&roots, Direction::Outgoing);
        DepthFirstOrder {
            visited: visited.into_iter().map(|i| self.content(i)).collect(),
            finished: finished.into_iter().map(|i| self.content(i)).collect(),
        }
    }

    /// Group nodes into maximal mutually reachable sets.
    ///
    /// The result has one node per component (the set of its members) and an
    /// edge between two components whenever some original edge connects
    /// them. It is acyclic by construction.
    #[instrument(skip(self), fields(nodes = self.node_count()))]
    pub fn strongly_connected_components(&self) -> AcyclicGraph<BTreeSet<N>> {
        let roots: Vec<NodeIndex> = self.indices().collect();
        let (_, mut order) = self.dfs_indices(&roots, Direction::Outgoing);
        order.reverse();

        let bound = self.index_bound();
        let mut component_of = vec![usize::MAX; bound];
        let mut components: Vec<BTreeSet<N>> = Vec::new();
        let mut marks = FixedBitSet::with_capacity(bound);

        for root in order {
            if marks.put(root.index()) {
                continue;
            }
            let id = components.len();
            let mut members = BTreeSet::new();
            let mut stack = vec![root];
            while let Some(v) = stack.pop() {
                component_of[v.index()] = id;
                members.insert(self.content(v).clone());
                for w in self.as_petgraph().neighbors_directed(v, Direction::Incoming) {
                    if !marks.put(w.index()) {
                        stack.push(w);
                    }
                }
            }
            components.push(members);
        }

        let mut condensed: DirectedGraph<BTreeSet<N>> = DirectedGraph::new();
        let slots: Vec<NodeIndex> = components
            .into_iter()
            .map(|c| condensed.ensure_node(c))
            .collect();
        for edge in self.as_petgraph().edge_references() {
            let a = component_of[edge.source().index()];
            let b = component_of[edge.target().index()];
            if a != b {
                condensed.connect(slots[a], slots[b], ());
            }
        }
        debug!(components = condensed.node_count(), "strongly connected components");
        AcyclicGraph::wrap(condensed)
    }

    /// Return `true` when the graph has no directed cycle (loops count as
    /// cycles).
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        !petgraph::algo::is_cyclic_directed(self.as_petgraph())
    }

    /// Order the nodes so that every edge goes from an earlier node to a
    /// later one.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidPrecondition`] if the graph has a cycle.
    pub fn topological_sort(&self) -> Result<Vec<&N>, GraphError> {
        Ok(self
            .topological_indices()?
            .into_iter()
            .map(|i| self.content(i))
            .collect())
    }

    pub(crate) fn topological_indices(&self) -> Result<Vec<NodeIndex>, GraphError> {
        if !self.is_acyclic() {
            return Err(GraphError::cyclic("topological_sort"));
        }
        let roots: Vec<NodeIndex> = self.indices().collect();
        let (_, mut finished) = self.dfs_indices(&roots, Direction::Outgoing);
        finished.reverse();
        Ok(finished)
    }

    /// Iterative DFS from `roots` following `dir`; returns the
    /// (first-visited, finish) orders.
    pub(crate) fn dfs_indices(
        &self,
        roots: &[NodeIndex],
        dir: Direction,
    ) -> (Vec<NodeIndex>, Vec<NodeIndex>) {
        let mut marks = FixedBitSet::with_capacity(self.index_bound());
        let mut visited = Vec::with_capacity(self.node_count());
        let mut finished = Vec::with_capacity(self.node_count());

        for &root in roots {
            if marks.put(root.index()) {
                continue;
            }
            visited.push(root);
            let mut stack = vec![Frame {
                node: root,
                next: self.sorted_neighbors(root, dir),
                pos: 0,
            }];
            while let Some(frame) = stack.last_mut() {
                if let Some(&child) = frame.next.get(frame.pos) {
                    frame.pos += 1;
                    if !marks.put(child.index()) {
                        visited.push(child);
                        stack.push(Frame {
                            node: child,
                            next: self.sorted_neighbors(child, dir),
                            pos: 0,
                        });
                    }
                } else {
                    finished.push(frame.node);
                    stack.pop();
                }
            }
        }
        (visited, finished)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
