//! Cover index over the nodes of an acyclic graph.
//!
//! Positions follow node content order, so `nodes[i]` is the `i`-th node and
//! lookups are binary searches. Only the covers and a topological rank are
//! kept; comparisons walk the covers. Operations that ask about many pairs
//! at once take a [`Reachability`] snapshot for their own duration.

use std::collections::VecDeque;

use fixedbitset::FixedBitSet;
use treillis_graph::{AcyclicGraph, Content};

use crate::error::LatticeError;

#[derive(Debug, Clone)]
pub(crate) struct OrderIndex<N> {
    pub(crate) nodes: Vec<N>,
    /// Node positions, least first.
    topo: Vec<usize>,
    rank: Vec<usize>,
    pub(crate) lower_covers: Vec<Vec<usize>>,
    pub(crate) upper_covers: Vec<Vec<usize>>,
}

impl<N: Content> OrderIndex<N> {
    /// Index the covers of `dag`, read off its transitive reduction.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::Graph`] when the graph has a cycle.
    pub(crate) fn build(dag: &AcyclicGraph<N>) -> Result<Self, LatticeError> {
        let mut hasse = dag.clone();
        hasse.transitive_reduction()?;
        let nodes: Vec<N> = hasse.nodes().cloned().collect();
        let n = nodes.len();
        let position = |x: &N| nodes.binary_search(x).ok();

        let topo: Vec<usize> = hasse
            .topological_sort()?
            .into_iter()
            .filter_map(position)
            .collect();
        let mut rank = vec![0; n];
        for (r, &i) in topo.iter().enumerate() {
            rank[i] = r;
        }

        let mut upper_covers = vec![Vec::new(); n];
        let mut lower_covers = vec![Vec::new(); n];
        for (i, node) in nodes.iter().enumerate() {
            upper_covers[i] = hasse.successors(node).into_iter().filter_map(position).collect();
            lower_covers[i] = hasse.predecessors(node).into_iter().filter_map(position).collect();
        }

        Ok(Self {
            nodes,
            topo,
            rank,
            lower_covers,
            upper_covers,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn position(&self, node: &N) -> Result<usize, LatticeError> {
        self.nodes
            .binary_search(node)
            .map_err(|_| LatticeError::node_not_found(node))
    }

    /// `a ≤ b` in the reflexive-transitive order. Nodes ranked above `b` are
    /// never visited.
    pub(crate) fn leq(&self, a: usize, b: usize) -> bool {
        if a == b {
            return true;
        }
        let mut seen = FixedBitSet::with_capacity(self.len());
        let mut stack = vec![a];
        seen.insert(a);
        while let Some(x) = stack.pop() {
            for &y in &self.upper_covers[x] {
                if y == b {
                    return true;
                }
                if self.rank[y] < self.rank[b] && !seen.put(y) {
                    stack.push(y);
                }
            }
        }
        false
    }

    /// Reflexive set of nodes reachable from `start` along `covers`.
    fn reach(covers: &[Vec<usize>], start: usize) -> FixedBitSet {
        let mut seen = FixedBitSet::with_capacity(covers.len());
        let mut queue = VecDeque::from([start]);
        seen.insert(start);
        while let Some(x) = queue.pop_front() {
            for &y in &covers[x] {
                if !seen.put(y) {
                    queue.push_back(y);
                }
            }
        }
        seen
    }

    /// Every node `≥ i`, including `i`.
    pub(crate) fn up_set(&self, i: usize) -> FixedBitSet {
        Self::reach(&self.upper_covers, i)
    }

    /// Every node `≤ i`, including `i`.
    pub(crate) fn down_set(&self, i: usize) -> FixedBitSet {
        Self::reach(&self.lower_covers, i)
    }

    /// Unique minimal element of an up-closed `candidates`: the members with
    /// no lower cover inside the set.
    fn least(&self, candidates: &FixedBitSet) -> Option<usize> {
        let mut minimal = candidates
            .ones()
            .filter(|&c| !self.lower_covers[c].iter().any(|&l| candidates.contains(l)));
        let first = minimal.next()?;
        minimal.next().is_none().then_some(first)
    }

    /// Unique maximal element of a down-closed `candidates`.
    fn greatest(&self, candidates: &FixedBitSet) -> Option<usize> {
        let mut maximal = candidates
            .ones()
            .filter(|&c| !self.upper_covers[c].iter().any(|&u| candidates.contains(u)));
        let first = maximal.next()?;
        maximal.next().is_none().then_some(first)
    }

    pub(crate) fn join(&self, a: usize, b: usize) -> Option<usize> {
        let mut common = self.up_set(a);
        common.intersect_with(&self.up_set(b));
        self.least(&common)
    }

    pub(crate) fn meet(&self, a: usize, b: usize) -> Option<usize> {
        let mut common = self.down_set(a);
        common.intersect_with(&self.down_set(b));
        self.greatest(&common)
    }

    pub(crate) fn is_join_irreducible(&self, i: usize) -> bool {
        self.lower_covers[i].len() == 1
    }

    pub(crate) fn is_meet_irreducible(&self, i: usize) -> bool {
        self.upper_covers[i].len() == 1
    }

    /// Up- and down-sets of every node, folded along the covers in
    /// topological order.
    pub(crate) fn reachability(&self) -> Reachability<'_, N> {
        let n = self.len();
        let mut up = vec![FixedBitSet::with_capacity(n); n];
        for &i in self.topo.iter().rev() {
            let mut reach = FixedBitSet::with_capacity(n);
            reach.insert(i);
            for &j in &self.upper_covers[i] {
                reach.union_with(&up[j]);
            }
            up[i] = reach;
        }
        let mut down = vec![FixedBitSet::with_capacity(n); n];
        for &i in &self.topo {
            let mut reach = FixedBitSet::with_capacity(n);
            reach.insert(i);
            for &j in &self.lower_covers[i] {
                reach.union_with(&down[j]);
            }
            down[i] = reach;
        }
        Reachability {
            index: self,
            up,
            down,
        }
    }
}

/// Full up- and down-sets, held while one operation compares many pairs.
pub(crate) struct Reachability<'a, N> {
    index: &'a OrderIndex<N>,
    pub(crate) up: Vec<FixedBitSet>,
    pub(crate) down: Vec<FixedBitSet>,
}

impl<N: Content> Reachability<'_, N> {
    pub(crate) fn leq(&self, a: usize, b: usize) -> bool {
        self.up[a].contains(b)
    }

    pub(crate) fn join(&self, a: usize, b: usize) -> Option<usize> {
        let mut common = self.up[a].clone();
        common.intersect_with(&self.up[b]);
        self.index.least(&common)
    }

    pub(crate) fn meet(&self, a: usize, b: usize) -> Option<usize> {
        let mut common = self.down[a].clone();
        common.intersect_with(&self.down[b]);
        self.index.greatest(&common)
    }
}
