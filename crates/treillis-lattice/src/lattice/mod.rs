//! Lattices: acyclic graphs whose order has unique joins and meets.
//!
//! # Overview
//!
//! [`Lattice`] wraps an [`AcyclicGraph`] whose edges point upward
//! (`a → b` means `a < b`; edges need not be covers). Building the wrapper
//! checks acyclicity and indexes the covers of the transitive reduction.
//! Lattice-ness itself is only checked by [`Lattice::is_lattice`], and
//! [`Lattice::join`] / [`Lattice::meet`] fail loudly on a pair without a
//! unique bound.
//!
//! Submodules:
//!
//! - [`arrows`]: arrow relations and the reduced tables.
//! - [`family`]: the join-irreducible representation and the bases read
//!   from it.
//! - [`doubling`]: Day's doubling of convex sets and the `is_cn` test.

pub mod arrows;
pub mod doubling;
pub mod family;
pub(crate) mod order;

use std::collections::BTreeSet;
use std::ops::Deref;

use tracing::instrument;
use treillis_graph::{AcyclicGraph, Content};

use crate::error::LatticeError;
use order::OrderIndex;

/// An acyclic graph read as an ordered set with (possibly) unique bounds.
#[derive(Debug, Clone)]
pub struct Lattice<N> {
    dag: AcyclicGraph<N>,
    pub(crate) order: OrderIndex<N>,
}

impl<N: Content> PartialEq for Lattice<N> {
    fn eq(&self, other: &Self) -> bool {
        self.dag == other.dag
    }
}

impl<N: Content> Eq for Lattice<N> {}

impl<N> Deref for Lattice<N> {
    type Target = AcyclicGraph<N>;

    fn deref(&self) -> &Self::Target {
        &self.dag
    }
}

impl<N: Content> Lattice<N> {
    /// Wrap an acyclic graph.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::Graph`] if the graph has a cycle.
    pub fn from_dag(dag: AcyclicGraph<N>) -> Result<Self, LatticeError> {
        let order = OrderIndex::build(&dag)?;
        Ok(Self { dag, order })
    }

    /// # Errors
    ///
    /// Returns [`LatticeError::Graph`] if the edges form a cycle.
    pub fn from_edges<I>(edges: I) -> Result<Self, LatticeError>
    where
        I: IntoIterator<Item = (N, N)>,
    {
        Self::from_dag(AcyclicGraph::from_edges(edges))
    }

    #[must_use]
    pub fn into_inner(self) -> AcyclicGraph<N> {
        self.dag
    }

    /// Relabel every node. The order is carried over unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::Graph`] if `f` maps two nodes to the same
    /// content.
    pub fn map_nodes<M, F>(&self, f: F) -> Result<Lattice<M>, LatticeError>
    where
        M: Content,
        F: FnMut(&N) -> M,
    {
        let mapped = self.dag.map_nodes(f)?;
        Lattice::from_dag(AcyclicGraph::from_graph(mapped))
    }

    // -----------------------------------------------------------------------
    // Order
    // -----------------------------------------------------------------------

    /// `a ≤ b` in the reflexive-transitive order.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::Graph`] for an unknown node.
    pub fn leq(&self, a: &N, b: &N) -> Result<bool, LatticeError> {
        Ok(self.order.leq(self.order.position(a)?, self.order.position(b)?))
    }

    /// The greatest element, when unique.
    #[must_use]
    pub fn top(&self) -> Option<&N> {
        let max = self.dag.max();
        if max.len() == 1 {
            max.into_iter().next()
        } else {
            None
        }
    }

    /// The least element, when unique.
    #[must_use]
    pub fn bottom(&self) -> Option<&N> {
        let min = self.dag.min();
        if min.len() == 1 {
            min.into_iter().next()
        } else {
            None
        }
    }

    /// Nodes covering `node`.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::Graph`] for an unknown node.
    pub fn upper_covers(&self, node: &N) -> Result<BTreeSet<&N>, LatticeError> {
        let i = self.order.position(node)?;
        Ok(self.order.upper_covers[i].iter().map(|&j| &self.order.nodes[j]).collect())
    }

    /// Nodes covered by `node`.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::Graph`] for an unknown node.
    pub fn lower_covers(&self, node: &N) -> Result<BTreeSet<&N>, LatticeError> {
        let i = self.order.position(node)?;
        Ok(self.order.lower_covers[i].iter().map(|&j| &self.order.nodes[j]).collect())
    }

    /// The least upper bound of `a` and `b`.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::NotALattice`] if the upper bounds have no
    /// unique minimum, [`LatticeError::Graph`] for an unknown node.
    pub fn join(&self, a: &N, b: &N) -> Result<&N, LatticeError> {
        let (i, j) = (self.order.position(a)?, self.order.position(b)?);
        self.order
            .join(i, j)
            .map(|k| &self.order.nodes[k])
            .ok_or_else(|| LatticeError::not_a_lattice("join", a, b))
    }

    /// The greatest lower bound of `a` and `b`.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::NotALattice`] if the lower bounds have no
    /// unique maximum, [`LatticeError::Graph`] for an unknown node.
    pub fn meet(&self, a: &N, b: &N) -> Result<&N, LatticeError> {
        let (i, j) = (self.order.position(a)?, self.order.position(b)?);
        self.order
            .meet(i, j)
            .map(|k| &self.order.nodes[k])
            .ok_or_else(|| LatticeError::not_a_lattice("meet", a, b))
    }

    /// Every pair has a unique join and a unique meet. An empty graph is not
    /// a lattice.
    #[must_use]
    #[instrument(skip(self), fields(nodes = self.order.len()))]
    pub fn is_lattice(&self) -> bool {
        let n = self.order.len();
        if n == 0 {
            return false;
        }
        let reach = self.order.reachability();
        (0..n).all(|i| {
            (i + 1..n).all(|j| reach.join(i, j).is_some() && reach.meet(i, j).is_some())
        })
    }

    // -----------------------------------------------------------------------
    // Irreducibles
    // -----------------------------------------------------------------------

    /// Elements with exactly one lower cover.
    #[must_use]
    pub fn join_irreducibles(&self) -> BTreeSet<&N> {
        (0..self.order.len())
            .filter(|&i| self.order.is_join_irreducible(i))
            .map(|i| &self.order.nodes[i])
            .collect()
    }

    /// Elements with exactly one upper cover.
    #[must_use]
    pub fn meet_irreducibles(&self) -> BTreeSet<&N> {
        (0..self.order.len())
            .filter(|&i| self.order.is_meet_irreducible(i))
            .map(|i| &self.order.nodes[i])
            .collect()
    }

    /// Join-irreducibles below or equal to `node`; their join is `node`.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::Graph`] for an unknown node.
    pub fn join_irreducibles_of(&self, node: &N) -> Result<BTreeSet<&N>, LatticeError> {
        let i = self.order.position(node)?;
        Ok(self
            .order
            .down_set(i)
            .ones()
            .filter(|&j| self.order.is_join_irreducible(j))
            .map(|j| &self.order.nodes[j])
            .collect())
    }

    /// Meet-irreducibles above or equal to `node`; their meet is `node`.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::Graph`] for an unknown node.
    pub fn meet_irreducibles_of(&self, node: &N) -> Result<BTreeSet<&N>, LatticeError> {
        let i = self.order.position(node)?;
        Ok(self
            .order
            .up_set(i)
            .ones()
            .filter(|&j| self.order.is_meet_irreducible(j))
            .map(|j| &self.order.nodes[j])
            .collect())
    }

    /// The order restricted to the join-irreducibles, as covers.
    ///
    /// # Errors
    ///
    /// Propagates graph errors from the restriction.
    pub fn join_irreducibles_subgraph(&self) -> Result<AcyclicGraph<N>, LatticeError> {
        Ok(self.dag.order_subgraph(self.join_irreducibles())?)
    }

    /// The order restricted to the meet-irreducibles, as covers.
    ///
    /// # Errors
    ///
    /// Propagates graph errors from the restriction.
    pub fn meet_irreducibles_subgraph(&self) -> Result<AcyclicGraph<N>, LatticeError> {
        Ok(self.dag.order_subgraph(self.meet_irreducibles())?)
    }

    /// The order restricted to elements that are join- or meet-irreducible.
    ///
    /// # Errors
    ///
    /// Propagates graph errors from the restriction.
    pub fn irreducibles_subgraph(&self) -> Result<AcyclicGraph<N>, LatticeError> {
        let mut keep = self.join_irreducibles();
        keep.extend(self.meet_irreducibles());
        Ok(self.dag.order_subgraph(keep)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn lattice(edges: &[(&'static str, &'static str)]) -> Lattice<&'static str> {
        Lattice::from_edges(edges.iter().copied()).expect("acyclic")
    }

    pub(crate) fn diamond() -> Lattice<&'static str> {
        lattice(&[("a", "b"), ("b", "c"), ("a", "d"), ("d", "c")])
    }

    #[test]
    fn diamond_join_and_meet() {
        let l = diamond();
        assert_eq!(l.join(&"b", &"d"), Ok(&"c"));
        assert_eq!(l.meet(&"b", &"d"), Ok(&"a"));
        assert_eq!(l.join(&"a", &"b"), Ok(&"b"));
        assert_eq!(l.top(), Some(&"c"));
        assert_eq!(l.bottom(), Some(&"a"));
        assert!(l.is_lattice());
    }

    #[test]
    fn diamond_irreducibles() {
        let l = diamond();
        let expected: BTreeSet<&&str> = [&"b", &"d"].into_iter().collect();
        assert_eq!(l.join_irreducibles(), expected);
        assert_eq!(l.meet_irreducibles(), expected);
        assert_eq!(l.join_irreducibles_of(&"c").expect("present"), expected);
        assert!(l.join_irreducibles_of(&"a").expect("present").is_empty());
        assert_eq!(l.meet_irreducibles_of(&"a").expect("present"), expected);
    }

    #[test]
    fn second_bottom_breaks_lattice() {
        let l = lattice(&[("a", "b"), ("b", "c"), ("a", "d"), ("d", "c"), ("e", "b"), ("e", "d")]);
        assert!(!l.is_lattice());
        assert!(matches!(
            l.meet(&"b", &"d"),
            Err(LatticeError::NotALattice { operation: "meet", .. })
        ));
        assert_eq!(l.bottom(), None);
    }

    #[test]
    fn unknown_node_is_reported() {
        let l = diamond();
        assert!(matches!(l.join(&"a", &"z"), Err(LatticeError::Graph(_))));
    }

    #[test]
    fn chain_bounds() {
        let l = lattice(&[("a", "b")]);
        assert_eq!(l.top(), Some(&"b"));
        assert_eq!(l.bottom(), Some(&"a"));
    }

    #[test]
    fn irreducible_subgraphs() {
        let l = diamond();
        let sub = l.irreducibles_subgraph().expect("acyclic");
        assert_eq!(sub.node_count(), 2);
        assert!(sub.contains_node(&"b"));
        assert!(sub.contains_node(&"d"));
        assert_eq!(sub.edge_count(), 0);
    }

    #[test]
    fn covers_from_closed_order() {
        let l = lattice(&[("a", "b"), ("b", "c"), ("a", "c")]);
        let up: Vec<&&str> = l.upper_covers(&"a").expect("present").into_iter().collect();
        assert_eq!(up, vec![&"b"]);
        assert!(l.leq(&"a", &"c").expect("present"));
    }

    #[test]
    fn long_chain_wraps_without_a_dense_order() {
        let l: Lattice<u32> = Lattice::from_edges((0..3000).map(|i| (i, i + 1))).expect("acyclic");
        assert_eq!(l.top(), Some(&3000));
        assert_eq!(l.bottom(), Some(&0));
        assert_eq!(l.join(&17, &2500), Ok(&2500));
        assert_eq!(l.meet(&17, &2500), Ok(&17));
        assert_eq!(l.leq(&2999, &3000), Ok(true));
        assert_eq!(l.join_irreducibles().len(), 3000);
        assert_eq!(l.join_irreducibles_of(&9).expect("present").len(), 9);
    }

    #[test]
    fn empty_graph_is_not_a_lattice() {
        let l: Lattice<u8> = Lattice::from_dag(AcyclicGraph::new()).expect("acyclic");
        assert!(!l.is_lattice());
        assert_eq!(l.top(), None);
    }
}
