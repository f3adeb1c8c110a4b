//! Closed-set families read off a lattice, and the bases derived from them.
//!
//! # Overview
//!
//! A lattice is represented by the closed sets `J(x)` (join-irreducibles
//! below `x`) over the ground set of join-irreducibles; a concept lattice by
//! its intents. Either way the family, together with the lower covers of
//! every set, is a [`ClosureSystem`] and supports:
//!
//! - minimal generators: for a closed set `C` with lower covers `Cᵢ`, the
//!   minimal transversals of `{C \ Cᵢ}` (Berge's algorithm);
//! - the canonical direct basis: `g → C \ g` for every minimal generator
//!   `g` of `C`, made unary, minimal per conclusion, merged by premise;
//! - the canonical basis, by Ganter's algorithm over the family.

use std::collections::BTreeSet;

use tracing::{debug, instrument};
use treillis_graph::{Content, DirectedGraph};

use super::Lattice;
use crate::closure::ClosureSystem;
use crate::concept::Concept;
use crate::concept_lattice::ConceptLattice;
use crate::error::LatticeError;
use crate::implication::basis::canonical_basis;
use crate::implication::{ImplicationSystem, Rule};

/// Closed sets with their lower covers, as a closure system.
#[derive(Debug, Clone)]
pub struct ClosedSetFamily<T> {
    ground: BTreeSet<T>,
    sets: Vec<BTreeSet<T>>,
    lower_covers: Vec<Vec<usize>>,
}

impl<T: Content> ClosedSetFamily<T> {
    pub(crate) const fn new(
        ground: BTreeSet<T>,
        sets: Vec<BTreeSet<T>>,
        lower_covers: Vec<Vec<usize>>,
    ) -> Self {
        Self {
            ground,
            sets,
            lower_covers,
        }
    }

    #[must_use]
    pub fn sets(&self) -> &[BTreeSet<T>] {
        &self.sets
    }

    /// Every minimal generator of every closed set. The least closed set
    /// contributes `∅`.
    #[must_use]
    #[instrument(skip(self), fields(sets = self.sets.len()))]
    pub fn minimal_generators(&self) -> BTreeSet<BTreeSet<T>> {
        let mut all = BTreeSet::new();
        for (i, closed) in self.sets.iter().enumerate() {
            let differences: Vec<BTreeSet<T>> = self.lower_covers[i]
                .iter()
                .map(|&j| closed.difference(&self.sets[j]).cloned().collect())
                .collect();
            all.extend(minimal_transversals(&differences));
        }
        debug!(generators = all.len(), "minimal generators");
        all
    }

    /// The canonical direct basis of the family.
    #[must_use]
    #[instrument(skip(self), fields(sets = self.sets.len()))]
    pub fn canonical_direct_basis(&self) -> ImplicationSystem<T> {
        let mut rules = BTreeSet::new();
        for (i, closed) in self.sets.iter().enumerate() {
            let differences: Vec<BTreeSet<T>> = self.lower_covers[i]
                .iter()
                .map(|&j| closed.difference(&self.sets[j]).cloned().collect())
                .collect();
            for generator in minimal_transversals(&differences) {
                for c in closed.difference(&generator) {
                    rules.insert(Rule::from_parts(generator.clone(), BTreeSet::from([c.clone()])));
                }
            }
        }
        let mut system = ImplicationSystem::from_parts(self.ground.clone(), rules);
        system.retain_minimal_premises();
        system.merge_equal_premises();
        system
    }

    /// The canonical basis of the family.
    #[must_use]
    pub fn implication_system(&self) -> ImplicationSystem<T> {
        canonical_basis(self)
    }
}

impl<T: Content> ClosureSystem for ClosedSetFamily<T> {
    type Element = T;

    fn ground_set(&self) -> &BTreeSet<T> {
        &self.ground
    }

    /// The intersection of the members containing `set`.
    fn closure(&self, set: &BTreeSet<T>) -> BTreeSet<T> {
        let mut containing = self.sets.iter().filter(|c| set.is_subset(c));
        let Some(first) = containing.next() else {
            return set.union(&self.ground).cloned().collect();
        };
        let mut closed = first.clone();
        for c in containing {
            closed.retain(|x| c.contains(x));
        }
        closed
    }

    fn precedence_graph(&self) -> DirectedGraph<T> {
        let mut graph = DirectedGraph::with_nodes(self.ground.iter().cloned());
        for a in &self.ground {
            for b in self.closure(&BTreeSet::from([a.clone()])) {
                if b != *a {
                    let _ = graph.add_edge(a, &b, ());
                }
            }
        }
        graph
    }
}

/// Minimal sets meeting every member of `family` (Berge). An empty family has
/// the single transversal `∅`.
pub(crate) fn minimal_transversals<T: Content>(family: &[BTreeSet<T>]) -> BTreeSet<BTreeSet<T>> {
    let mut transversals: BTreeSet<BTreeSet<T>> = BTreeSet::from([BTreeSet::new()]);
    for edge in family {
        let mut next = BTreeSet::new();
        for t in &transversals {
            if t.is_disjoint(edge) {
                for x in edge {
                    let mut grown = t.clone();
                    grown.insert(x.clone());
                    next.insert(grown);
                }
            } else {
                next.insert(t.clone());
            }
        }
        transversals = next
            .iter()
            .filter(|t| !next.iter().any(|s| s.len() < t.len() && s.is_subset(t)))
            .cloned()
            .collect();
    }
    transversals
}

// ---------------------------------------------------------------------------
// Lattice views
// ---------------------------------------------------------------------------

impl<N: Content> Lattice<N> {
    /// `J(x)` for every node, in node order.
    fn join_representation(&self) -> Vec<BTreeSet<N>> {
        let reach = self.order.reachability();
        (0..self.order.len())
            .map(|i| {
                reach.down[i]
                    .ones()
                    .filter(|&j| self.order.is_join_irreducible(j))
                    .map(|j| self.order.nodes[j].clone())
                    .collect()
            })
            .collect()
    }

    /// `M(x)` for every node, in node order.
    fn meet_representation(&self) -> Vec<BTreeSet<N>> {
        let reach = self.order.reachability();
        (0..self.order.len())
            .map(|i| {
                reach.up[i]
                    .ones()
                    .filter(|&j| self.order.is_meet_irreducible(j))
                    .map(|j| self.order.nodes[j].clone())
                    .collect()
            })
            .collect()
    }

    /// The family `{J(x)}` over the join-irreducibles.
    #[must_use]
    pub fn irreducible_family(&self) -> ClosedSetFamily<N> {
        let ground = self.join_irreducibles().into_iter().cloned().collect();
        ClosedSetFamily::new(ground, self.join_representation(), self.order.lower_covers.clone())
    }

    /// Minimal generators over the join-irreducibles.
    #[must_use]
    pub fn minimal_generators(&self) -> BTreeSet<BTreeSet<N>> {
        self.irreducible_family().minimal_generators()
    }

    /// Canonical direct basis over the join-irreducibles.
    #[must_use]
    pub fn canonical_direct_basis(&self) -> ImplicationSystem<N> {
        self.irreducible_family().canonical_direct_basis()
    }

    /// Canonical basis over the join-irreducibles.
    #[must_use]
    pub fn implication_system(&self) -> ImplicationSystem<N> {
        self.irreducible_family().implication_system()
    }

    /// Concept lattice isomorphic to this one, `x` labelled `(J(x), M(x))`.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::Graph`] if two nodes share both labels, which
    /// only happens outside lattices.
    pub fn irreducible_closure(&self) -> Result<ConceptLattice<N, N>, LatticeError> {
        let joins = self.join_representation();
        let meets = self.meet_representation();
        self.relabel(|i| Concept::new(joins[i].clone(), meets[i].clone()))
    }

    /// Concept lattice isomorphic to this one, `x` labelled by the intent
    /// `J(x)`.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::Graph`] if two nodes have the same label.
    pub fn join_closure(&self) -> Result<ConceptLattice<N, N>, LatticeError> {
        let joins = self.join_representation();
        self.relabel(|i| Concept::from_intent(joins[i].clone()))
    }

    /// Concept lattice isomorphic to this one, `x` labelled by the extent
    /// `M(x)`.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::Graph`] if two nodes have the same label.
    pub fn meet_closure(&self) -> Result<ConceptLattice<N, N>, LatticeError> {
        let meets = self.meet_representation();
        self.relabel(|i| Concept::from_extent(meets[i].clone()))
    }

    fn relabel<F>(&self, label: F) -> Result<ConceptLattice<N, N>, LatticeError>
    where
        F: Fn(usize) -> Concept<N, N>,
    {
        let lattice = self.map_nodes(|x| {
            // Every node has a position in the order index.
            self.order
                .nodes
                .binary_search(x)
                .map_or_else(|_| Concept::from_intent(BTreeSet::new()), &label)
        })?;
        Ok(ConceptLattice::new(lattice))
    }
}
