//! Lattices of concepts, as built from closure systems and contexts.
//!
//! # Overview
//!
//! A [`ConceptLattice`] is a [`Lattice`] whose nodes are [`Concept`]s, plus
//! the dependency graph recorded by Bordat's construction when that is how
//! it was built. It dereferences to the underlying [`Lattice`], so every
//! order, irreducible and arrow operation is available directly.
//!
//! Intent-based operations ([`ConceptLattice::minimal_generators`],
//! [`ConceptLattice::canonical_direct_basis`],
//! [`ConceptLattice::implication_system`]) read the family of intents and
//! fail with [`LatticeError::MissingIntent`] on extent-only concepts.

pub mod build;

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Deref;

use tracing::instrument;
use treillis_graph::{AcyclicGraph, Content, DirectedGraph};

use crate::closure::ClosureSystem;
use crate::concept::Concept;
use crate::error::LatticeError;
use crate::implication::ImplicationSystem;
use crate::lattice::Lattice;
use crate::lattice::family::ClosedSetFamily;

/// Edge `x → y` labelled with the minimal closed sets `F` for which adding
/// `x` to `F` also brings in `y`.
pub type DependencyGraph<A> = DirectedGraph<A, BTreeSet<BTreeSet<A>>>;

/// What a concept introduces in the reduced labelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReducedLabel<A, O> {
    /// Intent members absent from every lower cover.
    pub attributes: BTreeSet<A>,
    /// Extent members absent from every upper cover.
    pub objects: BTreeSet<O>,
}

/// A lattice of concepts with an optional dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptLattice<A: Content, O: Content = A> {
    lattice: Lattice<Concept<A, O>>,
    dependency_graph: Option<DependencyGraph<A>>,
}

impl<A: Content, O: Content> Deref for ConceptLattice<A, O> {
    type Target = Lattice<Concept<A, O>>;

    fn deref(&self) -> &Self::Target {
        &self.lattice
    }
}

impl<A: Content, O: Content> ConceptLattice<A, O> {
    #[must_use]
    pub const fn new(lattice: Lattice<Concept<A, O>>) -> Self {
        Self {
            lattice,
            dependency_graph: None,
        }
    }

    #[must_use]
    pub fn into_lattice(self) -> Lattice<Concept<A, O>> {
        self.lattice
    }

    #[must_use]
    pub const fn dependency_graph(&self) -> Option<&DependencyGraph<A>> {
        self.dependency_graph.as_ref()
    }

    pub fn set_dependency_graph(&mut self, graph: DependencyGraph<A>) {
        self.dependency_graph = Some(graph);
    }

    #[must_use]
    pub const fn has_dependency_graph(&self) -> bool {
        self.dependency_graph.is_some()
    }

    /// Replace every extent by `extent(intent)`. Concepts without an intent
    /// get an empty extent.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::Graph`] if two concepts end up equal.
    pub fn with_extents<P, F>(self, extent: F) -> Result<ConceptLattice<A, P>, LatticeError>
    where
        P: Content,
        F: Fn(&BTreeSet<A>) -> BTreeSet<P>,
    {
        let lattice = self.lattice.map_nodes(|concept| {
            let objects = concept.intent().map_or_else(BTreeSet::new, &extent);
            concept.clone().with_extent(objects)
        })?;
        Ok(ConceptLattice {
            lattice,
            dependency_graph: self.dependency_graph,
        })
    }

    /// The intents with their lower covers, over the union of all intents.
    fn intent_family(&self) -> Result<ClosedSetFamily<A>, LatticeError> {
        let order = &self.lattice.order;
        let sets: Vec<BTreeSet<A>> = order
            .nodes
            .iter()
            .map(|concept| {
                concept.intent().cloned().ok_or_else(|| LatticeError::MissingIntent {
                    concept: format!("{concept:?}"),
                })
            })
            .collect::<Result<_, _>>()?;
        let ground = sets.iter().flatten().cloned().collect();
        Ok(ClosedSetFamily::new(ground, sets, order.lower_covers.clone()))
    }

    /// Minimal generators of every intent. The least intent contributes its
    /// own generator `∅`.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::MissingIntent`] for extent-only concepts.
    pub fn minimal_generators(&self) -> Result<BTreeSet<BTreeSet<A>>, LatticeError> {
        Ok(self.intent_family()?.minimal_generators())
    }

    /// # Errors
    ///
    /// Returns [`LatticeError::MissingIntent`] for extent-only concepts.
    pub fn canonical_direct_basis(&self) -> Result<ImplicationSystem<A>, LatticeError> {
        Ok(self.intent_family()?.canonical_direct_basis())
    }

    /// The canonical basis of the intents.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::MissingIntent`] for extent-only concepts.
    pub fn implication_system(&self) -> Result<ImplicationSystem<A>, LatticeError> {
        Ok(self.intent_family()?.implication_system())
    }

    /// For every concept, the attributes and objects it introduces.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::Graph`] only if the order index is out of sync
    /// with the graph.
    pub fn reduced_labelling(
        &self,
    ) -> Result<BTreeMap<&Concept<A, O>, ReducedLabel<A, O>>, LatticeError> {
        let mut labels = BTreeMap::new();
        for concept in self.lattice.nodes() {
            let mut attributes = concept.intent().cloned().unwrap_or_default();
            for lower in self.lattice.lower_covers(concept)? {
                if let Some(intent) = lower.intent() {
                    attributes.retain(|a| !intent.contains(a));
                }
            }
            let mut objects = concept.extent().cloned().unwrap_or_default();
            for upper in self.lattice.upper_covers(concept)? {
                if let Some(extent) = upper.extent() {
                    objects.retain(|o| !extent.contains(o));
                }
            }
            labels.insert(concept, ReducedLabel { attributes, objects });
        }
        Ok(labels)
    }
}

// ---------------------------------------------------------------------------
// Ideal lattice
// ---------------------------------------------------------------------------

/// Down-sets of a poset, as a closure system.
struct DownSets<N> {
    ground: BTreeSet<N>,
    below: BTreeMap<N, BTreeSet<N>>,
}

impl<N: Content> ClosureSystem for DownSets<N> {
    type Element = N;

    fn ground_set(&self) -> &BTreeSet<N> {
        &self.ground
    }

    fn closure(&self, set: &BTreeSet<N>) -> BTreeSet<N> {
        let mut closed = set.clone();
        for x in set {
            if let Some(below) = self.below.get(x) {
                closed.extend(below.iter().cloned());
            }
        }
        closed
    }

    fn precedence_graph(&self) -> DirectedGraph<N> {
        let mut graph = DirectedGraph::with_nodes(self.ground.iter().cloned());
        for (x, below) in &self.below {
            for y in below {
                let _ = graph.add_edge(x, y, ());
            }
        }
        graph
    }
}

impl<N: Content> ConceptLattice<N> {
    /// The lattice of down-sets of `poset`, ordered by inclusion. Its
    /// join-irreducibles are the principal ideals, one per poset element.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::Graph`] if `poset` has a cycle.
    #[instrument(skip(poset), fields(nodes = poset.node_count()))]
    pub fn ideal_lattice<E>(poset: &AcyclicGraph<N, E>) -> Result<Self, LatticeError> {
        poset.topological_sort()?;
        let mut below = BTreeMap::new();
        for x in poset.nodes() {
            let minorants: BTreeSet<N> = poset.minorants(x)?.into_iter().cloned().collect();
            below.insert(x.clone(), minorants);
        }
        let cs = DownSets {
            ground: poset.nodes().cloned().collect(),
            below,
        };
        build::bordat(&cs, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RelationalContext;
    use crate::implication::Rule;

    fn set(items: &str) -> BTreeSet<char> {
        items.chars().collect()
    }

    fn planets() -> RelationalContext<&'static str, &'static str> {
        RelationalContext::from_incidences([
            ("mercury", "small"),
            ("mercury", "near"),
            ("venus", "small"),
            ("venus", "near"),
            ("earth", "small"),
            ("earth", "near"),
            ("earth", "moon"),
            ("mars", "small"),
            ("mars", "near"),
            ("mars", "moon"),
            ("jupiter", "large"),
            ("jupiter", "far"),
            ("jupiter", "moon"),
            ("saturn", "large"),
            ("saturn", "far"),
            ("saturn", "moon"),
            ("uranus", "medium"),
            ("uranus", "far"),
            ("uranus", "moon"),
            ("neptune", "medium"),
            ("neptune", "far"),
            ("neptune", "moon"),
            ("pluto", "small"),
            ("pluto", "far"),
            ("pluto", "moon"),
        ])
    }

    #[test]
    fn extents_follow_intents() {
        let lattice = planets().concept_lattice(true).expect("lattice");
        for concept in lattice.nodes() {
            assert!(concept.has_extent());
        }
        let giants = lattice
            .nodes()
            .find(|c| c.intent() == Some(&BTreeSet::from(["far", "large", "moon"])))
            .expect("concept of the gas giants");
        assert_eq!(giants.extent(), Some(&BTreeSet::from(["jupiter", "saturn"])));
        assert!(lattice.has_dependency_graph());
    }

    #[test]
    fn reduced_labelling_introduces_each_name_once() {
        let lattice = planets().concept_lattice(true).expect("lattice");
        let labels = lattice.reduced_labelling().expect("labels");
        let far_moon = labels
            .iter()
            .find(|(c, _)| c.intent() == Some(&BTreeSet::from(["far", "moon"])))
            .map(|(_, label)| label)
            .expect("far + moon concept");
        assert_eq!(far_moon.attributes, BTreeSet::from(["far"]));
        assert!(far_moon.objects.is_empty());

        let attributes: usize = labels.values().map(|l| l.attributes.len()).sum();
        let objects: usize = labels.values().map(|l| l.objects.len()).sum();
        assert_eq!(attributes, 6);
        assert_eq!(objects, 9);
    }

    #[test]
    fn intent_bases_of_a_chain() {
        let ctx: RelationalContext<u8, char> =
            RelationalContext::from_incidences([(1, 'a'), (1, 'b'), (2, 'a')]);
        let lattice = ctx.concept_lattice(true).expect("lattice");
        let cdb = lattice.canonical_direct_basis().expect("intents");
        let axiom = Rule::new(BTreeSet::new(), set("a")).expect("non-empty conclusion");
        assert!(cdb.contains_rule(&axiom));
        let cb = lattice.implication_system().expect("intents");
        assert!(cb.is_equivalent_to(&cdb));
        let gens = lattice.minimal_generators().expect("intents");
        assert!(gens.contains(&BTreeSet::new()));
        assert!(gens.contains(&set("b")));
    }

    #[test]
    fn extent_only_concepts_have_no_intent_bases() {
        let l = crate::lattice::tests::diamond();
        let meets = l.meet_closure().expect("injective");
        assert!(matches!(
            meets.implication_system(),
            Err(LatticeError::MissingIntent { .. })
        ));
    }

    #[test]
    fn ideals_of_an_antichain_form_a_square() {
        let poset: AcyclicGraph<char> =
            AcyclicGraph::from_graph(DirectedGraph::with_nodes(['x', 'y']));
        let ideals = ConceptLattice::ideal_lattice(&poset).expect("poset");
        assert_eq!(ideals.node_count(), 4);
        assert!(ideals.is_lattice());
    }

    #[test]
    fn ideal_lattice_irreducibles_mirror_the_poset() {
        let poset: AcyclicGraph<char> = AcyclicGraph::from_edges([('a', 'b'), ('a', 'c')]);
        let ideals = ConceptLattice::ideal_lattice(&poset).expect("poset");
        assert_eq!(ideals.node_count(), 5);
        let irreducibles = ideals.join_irreducibles_subgraph().expect("lattice");
        assert_eq!(irreducibles.node_count(), 3);
        assert_eq!(irreducibles.edge_count(), 2);
        assert!(irreducibles.contains_edge(
            &Concept::from_intent(set("a")),
            &Concept::from_intent(set("ab"))
        ));
    }
}
