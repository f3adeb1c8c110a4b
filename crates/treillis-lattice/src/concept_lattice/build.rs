//! Whole-lattice construction from a closure system.
//!
//! - [`next_closure`]: every closed set in lectic order, one edge per strict
//!   inclusion. The result is transitively closed; reduce it for a diagram.
//! - [`bordat`]: breadth-first from `φ(∅)`, one edge per cover, so the
//!   result is already the Hasse diagram. Also records the dependency graph.
//!
//! Both take an optional budget on the number of closed sets and stop with
//! [`LatticeError::ConceptBudgetExceeded`] as soon as it is passed.

use std::collections::{BTreeSet, VecDeque};

use tracing::{debug, instrument, warn};
use treillis_graph::{AcyclicGraph, DirectedGraph};

use super::{ConceptLattice, DependencyGraph};
use crate::closure::ClosureSystem;
use crate::concept::Concept;
use crate::error::LatticeError;
use crate::lattice::Lattice;

fn check_budget(count: usize, limit: Option<usize>) -> Result<(), LatticeError> {
    match limit {
        Some(limit) if count > limit => {
            warn!(limit, "concept budget exhausted");
            Err(LatticeError::ConceptBudgetExceeded { limit })
        }
        _ => Ok(()),
    }
}

/// Next-Closure construction: all closed sets, all strict inclusions.
///
/// # Errors
///
/// Returns [`LatticeError::ConceptBudgetExceeded`] when more than `limit`
/// closed sets exist.
#[instrument(skip(cs), fields(ground = cs.ground_set().len()))]
pub fn next_closure<C: ClosureSystem>(
    cs: &C,
    limit: Option<usize>,
) -> Result<ConceptLattice<C::Element>, LatticeError> {
    let mut current = cs.closure(&BTreeSet::new());
    let mut sets = vec![current.clone()];
    while let Some(next) = cs.next_closure(&current) {
        check_budget(sets.len() + 1, limit)?;
        sets.push(next.clone());
        current = next;
    }

    let concepts: Vec<Concept<C::Element>> = sets.into_iter().map(Concept::from_intent).collect();
    let mut dag = AcyclicGraph::new();
    for concept in &concepts {
        dag.add_node(concept.clone());
    }
    for a in &concepts {
        for b in &concepts {
            if a.is_below(b) && a != b {
                dag.add_edge(a, b, ())?;
            }
        }
    }
    debug!(concepts = dag.node_count(), edges = dag.edge_count(), "next-closure done");
    Ok(ConceptLattice::new(Lattice::from_dag(dag)?))
}

/// Bordat construction: covers only, plus the dependency graph.
///
/// # Errors
///
/// Returns [`LatticeError::ConceptBudgetExceeded`] when more than `limit`
/// closed sets exist.
#[instrument(skip(cs), fields(ground = cs.ground_set().len()))]
pub fn bordat<C: ClosureSystem>(
    cs: &C,
    limit: Option<usize>,
) -> Result<ConceptLattice<C::Element>, LatticeError> {
    let bottom = cs.closure(&BTreeSet::new());
    let mut dag = AcyclicGraph::new();
    let mut dependencies: DependencyGraph<C::Element> =
        DirectedGraph::with_nodes(cs.ground_set().iter().cloned());
    let mut seen = BTreeSet::from([bottom.clone()]);
    dag.add_node(Concept::from_intent(bottom.clone()));
    let mut queue = VecDeque::from([bottom]);

    while let Some(set) = queue.pop_front() {
        let from = Concept::from_intent(set.clone());
        for cover in cs.immediate_successors(&set) {
            record_dependencies(&mut dependencies, &set, &cover)?;
            let to = Concept::from_intent(cover.clone());
            if seen.insert(cover.clone()) {
                check_budget(seen.len(), limit)?;
                dag.add_node(to.clone());
                queue.push_back(cover);
            }
            dag.add_edge(&from, &to, ())?;
        }
    }
    debug!(concepts = dag.node_count(), covers = dag.edge_count(), "bordat done");

    let mut lattice = ConceptLattice::new(Lattice::from_dag(dag)?);
    lattice.set_dependency_graph(dependencies);
    Ok(lattice)
}

/// For the cover `cover` of `set`, every `x ≠ y` in `cover \ set` gets an
/// edge `x → y` whose label keeps the minimal sets `F` seen so far.
fn record_dependencies<T: treillis_graph::Content>(
    graph: &mut DependencyGraph<T>,
    set: &BTreeSet<T>,
    cover: &BTreeSet<T>,
) -> Result<(), LatticeError> {
    let new: Vec<&T> = cover.difference(set).collect();
    for &x in &new {
        graph.add_node(x.clone());
    }
    for &x in &new {
        for &y in &new {
            if x == y {
                continue;
            }
            let mut label = graph.edge(x, y).cloned().unwrap_or_default();
            if label.iter().any(|f| f.is_subset(set)) {
                continue;
            }
            label.retain(|f| !set.is_subset(f));
            label.insert(set.clone());
            graph.add_edge(x, y, label)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RelationalContext;

    fn set(items: &str) -> BTreeSet<char> {
        items.chars().collect()
    }

    /// a ≤ b ≤ c as attributes of objects 1 (abc), 2 (ab), 3 (a).
    fn chain_context() -> RelationalContext<u8, char> {
        RelationalContext::from_incidences([
            (1, 'a'),
            (1, 'b'),
            (1, 'c'),
            (2, 'a'),
            (2, 'b'),
            (3, 'a'),
        ])
    }

    fn square_context() -> RelationalContext<u8, char> {
        RelationalContext::from_incidences([(1, 'a'), (2, 'b'), (3, 'a'), (3, 'b')])
    }

    #[test]
    fn next_closure_keeps_every_inclusion() {
        let lattice = next_closure(&chain_context(), None).expect("lattice");
        assert_eq!(lattice.node_count(), 3);
        assert_eq!(lattice.edge_count(), 3);
        assert!(lattice.contains_edge(
            &Concept::from_intent(set("a")),
            &Concept::from_intent(set("abc"))
        ));
        assert!(!lattice.has_dependency_graph());
    }

    #[test]
    fn bordat_keeps_covers_only() {
        let lattice = bordat(&chain_context(), None).expect("lattice");
        assert_eq!(lattice.node_count(), 3);
        assert_eq!(lattice.edge_count(), 2);
        assert!(lattice.is_lattice());
        assert!(lattice.has_dependency_graph());
    }

    #[test]
    fn both_constructions_agree() {
        let ctx = square_context();
        let mut closed = next_closure(&ctx, None).expect("lattice").into_lattice().into_inner();
        closed.transitive_reduction().expect("acyclic");
        let covers = bordat(&ctx, None).expect("lattice").into_lattice().into_inner();
        assert_eq!(closed, covers);
    }

    #[test]
    fn dependency_graph_labels_minimal_sets() {
        // ∅ is closed; {a,b} is only reached as a cover of {a} and of {b}
        let ctx = RelationalContext::from_incidences([(1, 'a'), (1, 'b'), (2, 'c')]);
        let lattice = bordat(&ctx, None).expect("lattice");
        let deps = lattice.dependency_graph().expect("attached");
        assert_eq!(deps.edge(&'a', &'b'), Some(&BTreeSet::from([BTreeSet::new()])));
        assert_eq!(deps.edge(&'b', &'a'), Some(&BTreeSet::from([BTreeSet::new()])));
        assert!(!deps.contains_edge(&'a', &'c'));
    }

    #[test]
    fn budget_stops_construction() {
        let ctx = square_context();
        let err = bordat(&ctx, Some(2)).expect_err("four concepts");
        assert_eq!(err, LatticeError::ConceptBudgetExceeded { limit: 2 });
        let err = next_closure(&ctx, Some(3)).expect_err("four concepts");
        assert_eq!(err, LatticeError::ConceptBudgetExceeded { limit: 3 });
        assert!(bordat(&ctx, Some(4)).is_ok());
    }
}
