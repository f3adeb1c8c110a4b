//! Every structure derived from one closure system, computed together.
//!
//! # Overview
//!
//! [`BijectiveComponents::initialize`] runs Bordat's construction once and
//! reads off the equivalent descriptions of the same closure system:
//!
//! - the closed-set lattice and its dependency graph,
//! - the reduced table and the double-arrow (minimal) table,
//! - the canonical basis and the canonical direct basis,
//! - the minimal generators.
//!
//! Each one determines the others up to isomorphism. [`BijectiveComponents::verify`]
//! re-derives the closed sets from the canonical basis and checks that the
//! two bases agree.

use std::collections::BTreeSet;

use tracing::{debug, instrument};
use treillis_graph::Content;

use crate::closure::ClosureSystem;
use crate::concept::Concept;
use crate::concept_lattice::{build, ConceptLattice, DependencyGraph};
use crate::context::RelationalContext;
use crate::error::LatticeError;
use crate::implication::basis::canonical_basis;
use crate::implication::ImplicationSystem;

/// The lattice of a closure system with the tables and bases it determines.
#[derive(Debug, Clone)]
pub struct BijectiveComponents<T: Content> {
    lattice: ConceptLattice<T>,
    table: RelationalContext<Concept<T>, Concept<T>>,
    minimal_table: RelationalContext<Concept<T>, Concept<T>>,
    canonical_basis: ImplicationSystem<T>,
    canonical_direct_basis: ImplicationSystem<T>,
    minimal_generators: BTreeSet<BTreeSet<T>>,
}

impl<T: Content> BijectiveComponents<T> {
    /// Compute every component of `cs`.
    ///
    /// # Errors
    ///
    /// Propagates construction errors; with a closure system satisfying its
    /// axioms none are expected.
    #[instrument(skip(cs), fields(ground = cs.ground_set().len()))]
    pub fn initialize<C>(cs: &C) -> Result<Self, LatticeError>
    where
        C: ClosureSystem<Element = T>,
    {
        let lattice = build::bordat(cs, None)?;
        let table = lattice.table();
        let minimal_table = lattice.double_arrow_table();
        let canonical_basis = canonical_basis(cs);
        let canonical_direct_basis = lattice.canonical_direct_basis()?;
        let minimal_generators = lattice.minimal_generators()?;
        debug!(
            concepts = lattice.node_count(),
            cb = canonical_basis.rule_count(),
            cdb = canonical_direct_basis.rule_count(),
            "components ready"
        );
        Ok(Self {
            lattice,
            table,
            minimal_table,
            canonical_basis,
            canonical_direct_basis,
            minimal_generators,
        })
    }

    /// The closed-set lattice, as a Hasse diagram.
    #[must_use]
    pub const fn lattice(&self) -> &ConceptLattice<T> {
        &self.lattice
    }

    /// Join-irreducibles against meet-irreducibles, incidence `j ≤ m`.
    #[must_use]
    pub const fn table(&self) -> &RelationalContext<Concept<T>, Concept<T>> {
        &self.table
    }

    /// The double-arrow relation of the lattice.
    #[must_use]
    pub const fn minimal_table(&self) -> &RelationalContext<Concept<T>, Concept<T>> {
        &self.minimal_table
    }

    #[must_use]
    pub const fn canonical_basis(&self) -> &ImplicationSystem<T> {
        &self.canonical_basis
    }

    #[must_use]
    pub const fn canonical_direct_basis(&self) -> &ImplicationSystem<T> {
        &self.canonical_direct_basis
    }

    #[must_use]
    pub const fn minimal_generators(&self) -> &BTreeSet<BTreeSet<T>> {
        &self.minimal_generators
    }

    #[must_use]
    pub const fn dependency_graph(&self) -> Option<&DependencyGraph<T>> {
        self.lattice.dependency_graph()
    }

    /// Check that the canonical basis closes exactly the lattice's closed
    /// sets and is equivalent to the canonical direct basis.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::InvalidPrecondition`] describing the first
    /// mismatch.
    #[instrument(skip(self), fields(concepts = self.lattice.node_count()))]
    pub fn verify(&self) -> Result<(), LatticeError> {
        let expected: BTreeSet<BTreeSet<T>> = self
            .lattice
            .nodes()
            .filter_map(|concept| concept.intent().cloned())
            .collect();
        let generated: BTreeSet<BTreeSet<T>> =
            self.canonical_basis.all_closures().into_iter().collect();
        if generated != expected {
            return Err(LatticeError::InvalidPrecondition {
                operation: "verify",
                reason: format!(
                    "the canonical basis to close {} sets, found {}",
                    expected.len(),
                    generated.len()
                ),
            });
        }
        if !self.canonical_basis.is_equivalent_to(&self.canonical_direct_basis) {
            return Err(LatticeError::InvalidPrecondition {
                operation: "verify",
                reason: "equivalent canonical and canonical direct bases".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::implication::tests::{rule, set, system};

    #[test]
    fn components_of_a_rule_system() {
        let sys = system("abcd", &[("a", "b"), ("b", "c"), ("cd", "a")]);
        let components = BijectiveComponents::initialize(&sys).expect("components");
        assert_eq!(components.lattice().node_count(), sys.all_closures().len());
        assert!(components.lattice().is_lattice());
        assert!(components.canonical_basis().is_equivalent_to(&sys));
        assert!(components.canonical_direct_basis().contains_rule(&rule("a", "bc")));
        assert!(components.minimal_generators().contains(&set("cd")));
        assert!(components.dependency_graph().is_some());
        components.verify().expect("consistent components");
    }

    #[test]
    fn tables_index_the_irreducibles() {
        let sys = system("ab", &[]);
        let components = BijectiveComponents::initialize(&sys).expect("components");
        // boolean square: two join- and two meet-irreducibles
        assert_eq!(components.lattice().node_count(), 4);
        assert_eq!(components.table().objects().len(), 2);
        assert_eq!(components.table().attributes().len(), 2);
        assert_eq!(components.table().incidence_count(), 2);
        assert_eq!(components.minimal_table().incidence_count(), 2);
    }

    #[test]
    fn verify_rejects_inconsistent_bases() {
        let sys = system("ab", &[("a", "b")]);
        let mut components = BijectiveComponents::initialize(&sys).expect("components");
        components.canonical_basis = system("ab", &[]);
        assert!(matches!(
            components.verify(),
            Err(LatticeError::InvalidPrecondition { operation: "verify", .. })
        ));
    }
}
