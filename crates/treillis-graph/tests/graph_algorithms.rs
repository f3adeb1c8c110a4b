//! Known-topology regression tests for the graph substrate.
//!
//! Each test uses a hand-built graph whose closure, reduction and components
//! are known in advance.

use std::collections::BTreeSet;

use treillis_graph::{AcyclicGraph, DirectedGraph, GraphError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn build_dag(edges: &[(&'static str, &'static str)]) -> AcyclicGraph<&'static str> {
    AcyclicGraph::from_edges(edges.iter().copied())
}

fn names(set: &BTreeSet<&&'static str>) -> Vec<&'static str> {
    set.iter().map(|s| **s).collect()
}

// ===========================================================================
// Divisor lattice 2..=30
// ===========================================================================

#[test]
fn divisors_reduce_to_prime_steps() {
    let mut d = AcyclicGraph::divisors(30);
    d.transitive_reduction().expect("acyclic");
    // A cover i → j of the divisibility order has j / i prime.
    for e in d.edges() {
        let q = e.to / e.from;
        assert_eq!(e.to % e.from, 0);
        assert!((2..q).all(|p| q % p != 0), "{} → {} is not a cover", e.from, e.to);
    }
    assert!(d.contains_edge(&2, &6));
    assert!(d.contains_edge(&3, &6));
    assert!(!d.contains_edge(&2, &12));
}

#[test]
fn divisors_majorants_are_multiples() {
    let d = AcyclicGraph::divisors(30);
    let above: Vec<u32> = d.majorants(&5).expect("present").into_iter().copied().collect();
    assert_eq!(above, vec![10, 15, 20, 25, 30]);
    let below: Vec<u32> = d.minorants(&12).expect("present").into_iter().copied().collect();
    assert_eq!(below, vec![2, 3, 4, 6]);
}

// ===========================================================================
// Diamond with shortcut: a → b → d, a → c → d, a → d
// ===========================================================================

#[test]
fn diamond_shortcut_is_reduced() {
    let mut g = build_dag(&[("a", "b"), ("b", "d"), ("a", "c"), ("c", "d"), ("a", "d")]);
    assert_eq!(g.transitive_reduction().expect("acyclic"), 1);
    assert_eq!(g.edge_count(), 4);
    assert!(!g.contains_edge(&"a", &"d"));
}

#[test]
fn diamond_filter_and_ideal() {
    let g = build_dag(&[("a", "b"), ("b", "d"), ("a", "c"), ("c", "d")]);
    let filter = g.filter(&"b").expect("present");
    assert_eq!(filter.nodes().copied().collect::<Vec<_>>(), vec!["b", "d"]);
    let ideal = g.ideal(&"d").expect("present");
    assert_eq!(ideal.node_count(), 4);
    assert_eq!(names(&g.min()), vec!["a"]);
    assert_eq!(names(&g.max()), vec!["d"]);
}

// ===========================================================================
// Two cycles joined by a bridge
// ===========================================================================

#[test]
fn two_cycles_condense_to_chain() {
    let g: DirectedGraph<&str> = DirectedGraph::from_edges([
        ("a", "b"),
        ("b", "c"),
        ("c", "a"),
        ("c", "x"),
        ("x", "y"),
        ("y", "x"),
    ]);
    let scc = g.strongly_connected_components();
    assert_eq!(scc.node_count(), 2);
    assert_eq!(scc.edge_count(), 1);
    let abc: BTreeSet<&str> = ["a", "b", "c"].into_iter().collect();
    let xy: BTreeSet<&str> = ["x", "y"].into_iter().collect();
    assert!(scc.contains_edge(&abc, &xy));
    assert_eq!(
        scc.topological_sort().expect("condensation is acyclic"),
        vec![&abc, &xy]
    );
}

#[test]
fn cyclic_graph_refuses_order_operations() {
    let g: DirectedGraph<&str> = DirectedGraph::from_edges([("a", "b"), ("b", "a")]);
    assert!(matches!(
        g.topological_sort(),
        Err(GraphError::InvalidPrecondition { .. })
    ));

    let mut forced: AcyclicGraph<&str> = AcyclicGraph::from_edges([("a", "b"), ("b", "a")]);
    assert!(!forced.is_acyclic());
    assert!(forced.transitive_closure().is_err());
    assert!(forced.order_subgraph([&"a"]).is_err());

    let safe = AcyclicGraph::from_graph(g);
    assert_eq!(safe.edge_count(), 0, "cyclic input degrades to its node set");
}

#[test]
fn derived_graphs_do_not_alias_source() {
    let g = build_dag(&[("a", "b"), ("b", "c")]);
    let mut sub = g.subgraph([&"a", &"b"]);
    sub.remove_node(&"a");
    assert!(g.contains_node(&"a"));
    assert_eq!(g.edge_count(), 2);
}
