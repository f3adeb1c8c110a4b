//! The closure-system capability and the algorithms every closure system
//! gets for free.
//!
//! # Overview
//!
//! A [`ClosureSystem`] exposes a finite ground set and a closure operator on
//! its subsets. The operator must be
//!
//! - extensive: `S ⊆ φ(S)`,
//! - monotone: `S ⊆ T ⇒ φ(S) ⊆ φ(T)`,
//! - idempotent: `φ(φ(S)) = φ(S)`.
//!
//! These are not checked on every call; [`ClosureSystem::check_axioms`] runs a
//! conformance probe on demand.
//!
//! # Provided algorithms
//!
//! - [`ClosureSystem::next_closure`] / [`ClosureSystem::all_closures`]:
//!   Ganter's Next-Closure, emitting every closed set exactly once in lectic
//!   order.
//! - [`ClosureSystem::immediate_successors`]: the covers of a closed set,
//!   read from the sink components of the candidate graph.
//! - [`ClosureSystem::closed_set_lattice`]: Next-Closure or Bordat
//!   construction of the whole lattice.

use std::collections::BTreeSet;

use treillis_graph::{Content, DirectedGraph};

use crate::concept_lattice::{build, ConceptLattice};
use crate::error::LatticeError;

/// A finite ground set with a closure operator on its subsets.
pub trait ClosureSystem {
    /// Ground set element type.
    type Element: Content;

    /// The ground set, in element order.
    fn ground_set(&self) -> &BTreeSet<Self::Element>;

    /// The closed superset of `set`.
    fn closure(&self, set: &BTreeSet<Self::Element>) -> BTreeSet<Self::Element>;

    /// Graph over the ground set recording which elements have to be settled
    /// before others can be derived.
    fn precedence_graph(&self) -> DirectedGraph<Self::Element>;

    /// `true` when `set` is its own closure.
    fn is_closed(&self, set: &BTreeSet<Self::Element>) -> bool {
        self.closure(set) == *set
    }

    /// Lectically next closed set after the closed set `set`, or `None` when
    /// `set` is the last one.
    ///
    /// Elements are tried from the largest to the smallest; the first
    /// candidate whose closure adds no element smaller than the candidate is
    /// accepted.
    fn next_closure(&self, set: &BTreeSet<Self::Element>) -> Option<BTreeSet<Self::Element>> {
        let mut prefix = set.clone();
        for m in self.ground_set().iter().rev() {
            if prefix.remove(m) {
                continue;
            }
            let mut candidate = prefix.clone();
            candidate.insert(m.clone());
            let closed = self.closure(&candidate);
            if closed.difference(&prefix).all(|x| x >= m) {
                return Some(closed);
            }
        }
        None
    }

    /// Every closed set, in lectic order starting from `φ(∅)`.
    fn all_closures(&self) -> Vec<BTreeSet<Self::Element>> {
        let mut current = self.closure(&BTreeSet::new());
        let mut all = vec![current.clone()];
        while let Some(next) = self.next_closure(&current) {
            all.push(next.clone());
            current = next;
        }
        all
    }

    /// The closed sets covering the closed set `set`.
    ///
    /// Candidates are the elements outside `set`; `x → y` whenever
    /// `y ∈ φ(set ∪ {x})`. Each sink strongly connected component `C` of this
    /// graph yields the cover `set ∪ C`.
    fn immediate_successors(&self, set: &BTreeSet<Self::Element>) -> Vec<BTreeSet<Self::Element>> {
        let candidates: Vec<&Self::Element> = self.ground_set().difference(set).collect();
        if candidates.is_empty() {
            return Vec::new();
        }
        let mut graph: DirectedGraph<Self::Element> =
            DirectedGraph::with_nodes(candidates.iter().map(|x| (*x).clone()));
        for &x in &candidates {
            let mut extended = set.clone();
            extended.insert(x.clone());
            for y in self.closure(&extended).difference(set) {
                if y != x && graph.contains_node(y) {
                    let _ = graph.add_edge(x, y, ());
                }
            }
        }
        let components = graph.strongly_connected_components();
        components
            .max()
            .into_iter()
            .map(|component| set.union(component).cloned().collect())
            .collect()
    }

    /// The lattice of closed sets: Bordat's construction with covering edges
    /// when `diagram` is set, Next-Closure with the full inclusion order
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Construction itself cannot fail without a concept budget; the result
    /// type is shared with the budgeted builders in
    /// [`concept_lattice::build`](crate::concept_lattice::build).
    fn closed_set_lattice(
        &self,
        diagram: bool,
    ) -> Result<ConceptLattice<Self::Element>, LatticeError>
    where
        Self: Sized,
    {
        if diagram {
            build::bordat(self, None)
        } else {
            build::next_closure(self, None)
        }
    }

    /// Probe extensivity, idempotence and monotonicity on `∅`, every
    /// singleton, every pair and the ground set.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::StructuralViolation`] naming the first failing
    /// property and probe set.
    fn check_axioms(&self) -> Result<(), LatticeError> {
        let ground = self.ground_set();
        let empty = BTreeSet::new();
        let bottom = probe(self, &empty)?;

        let mut singles = Vec::with_capacity(ground.len());
        for x in ground {
            let single = BTreeSet::from([x.clone()]);
            let closed = probe(self, &single)?;
            monotone(&bottom, &closed, &single)?;
            singles.push(closed);
        }

        let elements: Vec<&Self::Element> = ground.iter().collect();
        for (i, x) in elements.iter().enumerate() {
            for (j, y) in elements.iter().enumerate().skip(i + 1) {
                let pair = BTreeSet::from([(*x).clone(), (*y).clone()]);
                let closed = probe(self, &pair)?;
                monotone(&singles[i], &closed, &pair)?;
                monotone(&singles[j], &closed, &pair)?;
            }
        }

        let top = probe(self, ground)?;
        for closed in &singles {
            monotone(closed, &top, ground)?;
        }
        Ok(())
    }
}

fn probe<C: ClosureSystem + ?Sized>(
    cs: &C,
    set: &BTreeSet<C::Element>,
) -> Result<BTreeSet<C::Element>, LatticeError> {
    let closed = cs.closure(set);
    if !set.is_subset(&closed) {
        return Err(violation("extensive", set));
    }
    if cs.closure(&closed) != closed {
        return Err(violation("idempotent", set));
    }
    Ok(closed)
}

fn monotone<T: Content>(
    smaller: &BTreeSet<T>,
    larger: &BTreeSet<T>,
    set: &BTreeSet<T>,
) -> Result<(), LatticeError> {
    if smaller.is_subset(larger) {
        Ok(())
    } else {
        Err(violation("monotone", set))
    }
}

fn violation<T: Content>(property: &'static str, set: &BTreeSet<T>) -> LatticeError {
    LatticeError::StructuralViolation {
        property,
        set: format!("{set:?}"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
