//! Content-keyed directed graph over petgraph's stable storage.
//!
//! # Overview
//!
//! [`DirectedGraph`] owns its nodes and edges in a
//! [`StableDiGraph`](petgraph::stable_graph::StableDiGraph). Node identity is
//! the arena index petgraph assigns; node *content* is the user-visible key,
//! kept in a sorted side index so that:
//!
//! - every iteration (nodes, edges, successors) follows content order, which
//!   makes traversal orders deterministic;
//! - a graph holds at most one node per content value;
//! - derived graphs (subgraphs, transposes, relabellings) copy content by
//!   value and never alias the source graph.
//!
//! At most one edge exists per ordered pair of nodes. Inserting an edge that
//! already exists replaces its content.

#![allow(clippy::module_name_repetitions)]

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;

use petgraph::{
    stable_graph::{NodeIndex, StableDiGraph},
    visit::{EdgeRef, IntoEdgeReferences},
    Direction,
};
use tracing::{debug, instrument};

use crate::error::GraphError;

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// Values that can be stored as node content: totally ordered, cloneable,
/// and printable for diagnostics.
pub trait Content: Ord + Clone + Debug {}

impl<T: Ord + Clone + Debug> Content for T {}

// ---------------------------------------------------------------------------
// Edge
// ---------------------------------------------------------------------------

/// A borrowed view of one edge.
///
/// Edges compare and sort by `(from, to)`; the content does not take part in
/// the ordering since a graph never holds two edges between the same pair.
#[derive(Debug)]
pub struct Edge<'g, N, E> {
    /// Source node content.
    pub from: &'g N,
    /// Target node content.
    pub to: &'g N,
    /// Edge label.
    pub content: &'g E,
}

impl<N, E> Clone for Edge<'_, N, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N, E> Copy for Edge<'_, N, E> {}

impl<N: Ord, E> PartialEq for Edge<'_, N, E> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<N: Ord, E> Eq for Edge<'_, N, E> {}

impl<N: Ord, E> PartialOrd for Edge<'_, N, E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<N: Ord, E> Ord for Edge<'_, N, E> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.from, self.to).cmp(&(other.from, other.to))
    }
}

// ---------------------------------------------------------------------------
// DirectedGraph
// ---------------------------------------------------------------------------

/// A directed graph whose nodes are keyed by their content.
#[derive(Debug, Clone)]
pub struct DirectedGraph<N, E = ()> {
    graph: StableDiGraph<N, E>,
    index: BTreeMap<N, NodeIndex>,
}

impl<N: Content, E> Default for DirectedGraph<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Content, E: PartialEq> PartialEq for DirectedGraph<N, E> {
    fn eq(&self, other: &Self) -> bool {
        self.index.len() == other.index.len()
            && self.index.keys().eq(other.index.keys())
            && self.edge_count() == other.edge_count()
            && self
                .edges()
                .iter()
                .zip(other.edges().iter())
                .all(|(a, b)| a == b && a.content == b.content)
    }
}

impl<N: Content, E: Eq> Eq for DirectedGraph<N, E> {}

impl<N: Content, E> DirectedGraph<N, E> {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::new(),
            index: BTreeMap::new(),
        }
    }

    /// Create an edgeless graph over the given nodes.
    #[must_use]
    pub fn with_nodes<I: IntoIterator<Item = N>>(nodes: I) -> Self {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node);
        }
        graph
    }

    /// Build a graph from an edge list, creating endpoints as needed.
    #[must_use]
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (N, N)>,
        E: Default,
    {
        let mut graph = Self::new();
        for (from, to) in edges {
            let a = graph.ensure_node(from);
            let b = graph.ensure_node(to);
            graph.connect(a, b, E::default());
        }
        graph
    }

    // -- size ---------------------------------------------------------------

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// `true` when the graph has no node.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    // -- read accessors -----------------------------------------------------

    /// Return `true` if a node with this content exists.
    #[must_use]
    pub fn contains_node(&self, node: &N) -> bool {
        self.index.contains_key(node)
    }

    /// Return `true` if the edge `from → to` exists.
    #[must_use]
    pub fn contains_edge(&self, from: &N, to: &N) -> bool {
        self.find_edge(from, to).is_some()
    }

    /// Content of the edge `from → to`, if present.
    #[must_use]
    pub fn edge(&self, from: &N, to: &N) -> Option<&E> {
        self.find_edge(from, to).and_then(|e| self.graph.edge_weight(e))
    }

    /// Nodes in content order.
    pub fn nodes(&self) -> impl Iterator<Item = &N> + '_ {
        self.index.keys()
    }

    /// All edges, sorted by `(from, to)`.
    #[must_use]
    pub fn edges(&self) -> Vec<Edge<'_, N, E>> {
        let mut edges: Vec<Edge<'_, N, E>> = self
            .graph
            .edge_references()
            .map(|e| Edge {
                from: &self.graph[e.source()],
                to: &self.graph[e.target()],
                content: e.weight(),
            })
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Direct successors of `node` (empty when the node is absent).
    #[must_use]
    pub fn successors(&self, node: &N) -> BTreeSet<&N> {
        self.neighbors(node, Direction::Outgoing)
    }

    /// Direct predecessors of `node` (empty when the node is absent).
    #[must_use]
    pub fn predecessors(&self, node: &N) -> BTreeSet<&N> {
        self.neighbors(node, Direction::Incoming)
    }

    /// Nodes without predecessors.
    #[must_use]
    pub fn sources(&self) -> BTreeSet<&N> {
        self.externals(Direction::Incoming)
    }

    /// Nodes without successors.
    #[must_use]
    pub fn sinks(&self) -> BTreeSet<&N> {
        self.externals(Direction::Outgoing)
    }

    /// Read-only access to the underlying petgraph storage, for use with
    /// petgraph's algorithms.
    #[must_use]
    pub const fn as_petgraph(&self) -> &StableDiGraph<N, E> {
        &self.graph
    }

    // -- mutation -----------------------------------------------------------

    /// Insert a node. Returns `false` if a node with equal content exists.
    pub fn add_node(&mut self, node: N) -> bool {
        if self.index.contains_key(&node) {
            return false;
        }
        let idx = self.graph.add_node(node.clone());
        self.index.insert(node, idx);
        true
    }

    /// Remove a node and every edge touching it. Returns `false` if absent.
    pub fn remove_node(&mut self, node: &N) -> bool {
        match self.index.remove(node) {
            Some(idx) => {
                self.graph.remove_node(idx);
                true
            }
            None => false,
        }
    }

    /// Insert the edge `from → to`, replacing the content of an existing edge.
    ///
    /// Returns `true` when a new edge was created.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] if either endpoint is absent.
    pub fn add_edge(&mut self, from: &N, to: &N, content: E) -> Result<bool, GraphError> {
        let a = self.require(from)?;
        let b = self.require(to)?;
        Ok(self.connect(a, b, content))
    }

    /// Remove the edge `from → to`, returning its content.
    pub fn remove_edge(&mut self, from: &N, to: &N) -> Option<E> {
        let e = self.find_edge(from, to)?;
        self.graph.remove_edge(e)
    }

    // -- derived graphs -----------------------------------------------------

    /// Subgraph induced by `keep`: an edge survives iff both endpoints do.
    /// Contents absent from the graph are ignored.
    #[must_use]
    pub fn subgraph<'a, I>(&self, keep: I) -> Self
    where
        I: IntoIterator<Item = &'a N>,
        N: 'a,
        E: Clone,
    {
        let kept: BTreeSet<&N> = keep
            .into_iter()
            .filter(|n| self.index.contains_key(*n))
            .collect();
        let mut sub = Self::with_nodes(kept.iter().map(|n| (*n).clone()));
        for edge in self.edges() {
            if kept.contains(edge.from) && kept.contains(edge.to) {
                let a = sub.index[edge.from];
                let b = sub.index[edge.to];
                sub.connect(a, b, edge.content.clone());
            }
        }
        sub
    }

    /// Complementary graph: edge `a → b` iff `a ≠ b` and the edge is absent
    /// from this graph.
    #[must_use]
    pub fn complementary(&self) -> Self
    where
        E: Default,
    {
        let mut comp = Self::with_nodes(self.index.keys().cloned());
        for (a, &ia) in &self.index {
            for (b, &ib) in &self.index {
                if a != b && self.graph.find_edge(ia, ib).is_none() {
                    let ca = comp.index[a];
                    let cb = comp.index[b];
                    comp.connect(ca, cb, E::default());
                }
            }
        }
        comp
    }

    /// Graph with every edge reversed.
    #[must_use]
    pub fn transpose(&self) -> Self
    where
        E: Clone,
    {
        let mut rev = Self::with_nodes(self.index.keys().cloned());
        for edge in self.edges() {
            let a = rev.index[edge.to];
            let b = rev.index[edge.from];
            rev.connect(a, b, edge.content.clone());
        }
        rev
    }

    /// Copy of the graph with every node content passed through `f`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateNode`] if `f` maps two nodes onto equal
    /// content.
    pub fn map_nodes<M, F>(&self, mut f: F) -> Result<DirectedGraph<M, E>, GraphError>
    where
        M: Content,
        F: FnMut(&N) -> M,
        E: Clone,
    {
        let mut mapped = DirectedGraph::new();
        let mut images: BTreeMap<&N, NodeIndex> = BTreeMap::new();
        for node in self.index.keys() {
            let image = f(node);
            if mapped.contains_node(&image) {
                return Err(GraphError::DuplicateNode {
                    node: format!("{image:?}"),
                });
            }
            images.insert(node, mapped.ensure_node(image));
        }
        for edge in self.edges() {
            mapped.connect(images[edge.from], images[edge.to], edge.content.clone());
        }
        Ok(mapped)
    }

    // -- closure ------------------------------------------------------------

    /// Add an edge `a → b` for every non-empty path from `a` to `b`.
    ///
    /// Cycles are allowed; a node on a cycle gains a loop. Returns the number
    /// of edges added.
    #[instrument(skip(self), fields(nodes = self.node_count()))]
    pub fn transitive_closure(&mut self) -> usize
    where
        E: Default,
    {
        let bound = self.index_bound();
        let mut missing: Vec<(NodeIndex, NodeIndex)> = Vec::new();
        for &start in self.index.values() {
            let mut seen = fixedbitset::FixedBitSet::with_capacity(bound);
            let mut stack: Vec<NodeIndex> = self
                .graph
                .neighbors_directed(start, Direction::Outgoing)
                .collect();
            while let Some(v) = stack.pop() {
                if seen.put(v.index()) {
                    continue;
                }
                if self.graph.find_edge(start, v).is_none() {
                    missing.push((start, v));
                }
                stack.extend(self.graph.neighbors_directed(v, Direction::Outgoing));
            }
        }
        let added = missing.len();
        for (a, b) in missing {
            self.graph.add_edge(a, b, E::default());
        }
        debug!(added, "transitive closure");
        added
    }

    /// Add a loop on every node lacking one. Returns the number added.
    pub fn reflexive_closure(&mut self) -> usize
    where
        E: Default,
    {
        let missing: Vec<NodeIndex> = self
            .index
            .values()
            .copied()
            .filter(|&i| self.graph.find_edge(i, i).is_none())
            .collect();
        for &i in &missing {
            self.graph.add_edge(i, i, E::default());
        }
        missing.len()
    }

    /// Remove every loop. Returns the number removed.
    pub fn reflexive_reduction(&mut self) -> usize {
        let loops: Vec<_> = self
            .index
            .values()
            .filter_map(|&i| self.graph.find_edge(i, i))
            .collect();
        for &e in &loops {
            self.graph.remove_edge(e);
        }
        loops.len()
    }

    // -- crate-internal index helpers ---------------------------------------

    pub(crate) fn index_of(&self, node: &N) -> Option<NodeIndex> {
        self.index.get(node).copied()
    }

    pub(crate) fn require(&self, node: &N) -> Result<NodeIndex, GraphError> {
        self.index_of(node).ok_or_else(|| GraphError::node_not_found(node))
    }

    pub(crate) fn content(&self, idx: NodeIndex) -> &N {
        &self.graph[idx]
    }

    /// Node indices in content order.
    pub(crate) fn indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.index.values().copied()
    }

    /// Neighbor indices of `idx` in content order.
    pub(crate) fn sorted_neighbors(&self, idx: NodeIndex, dir: Direction) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self.graph.neighbors_directed(idx, dir).collect();
        out.sort_unstable_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
        out.dedup();
        out
    }

    /// One past the largest node index in use; sizes mark arrays.
    pub(crate) fn index_bound(&self) -> usize {
        self.index
            .values()
            .map(|i| i.index() + 1)
            .max()
            .unwrap_or(0)
    }

    pub(crate) fn ensure_node(&mut self, node: N) -> NodeIndex {
        if let Some(&idx) = self.index.get(&node) {
            return idx;
        }
        let idx = self.graph.add_node(node.clone());
        self.index.insert(node, idx);
        idx
    }

    /// Insert or replace the edge `a → b`; `true` if it is new.
    pub(crate) fn connect(&mut self, a: NodeIndex, b: NodeIndex, content: E) -> bool {
        if let Some(e) = self.graph.find_edge(a, b) {
            if let Some(w) = self.graph.edge_weight_mut(e) {
                *w = content;
            }
            false
        } else {
            self.graph.add_edge(a, b, content);
            true
        }
    }

    pub(crate) fn disconnect(&mut self, a: NodeIndex, b: NodeIndex) -> bool {
        self.graph
            .find_edge(a, b)
            .and_then(|e| self.graph.remove_edge(e))
            .is_some()
    }

    pub(crate) fn has_edge_between(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.graph.find_edge(a, b).is_some()
    }

    fn find_edge(&self, from: &N, to: &N) -> Option<petgraph::stable_graph::EdgeIndex> {
        let a = self.index_of(from)?;
        let b = self.index_of(to)?;
        self.graph.find_edge(a, b)
    }

    fn neighbors(&self, node: &N, dir: Direction) -> BTreeSet<&N> {
        self.index_of(node)
            .map(|idx| {
                self.graph
                    .neighbors_directed(idx, dir)
                    .map(|n| &self.graph[n])
                    .collect()
            })
            .unwrap_or_default()
    }

    fn externals(&self, dir: Direction) -> BTreeSet<&N> {
        self.index
            .iter()
            .filter(|&(_, &idx)| {
                self.graph
                    .neighbors_directed(idx, dir)
                    .next()
                    .is_none()
            })
            .map(|(n, _)| n)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
