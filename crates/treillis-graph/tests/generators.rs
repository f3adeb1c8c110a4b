use proptest::prelude::*;
use treillis_graph::{AcyclicGraph, DirectedGraph};

/// Random DAG over `0..n` with edges only from higher to lower nodes.
pub fn arb_dag(max_nodes: usize) -> impl Strategy<Value = AcyclicGraph<u32>> {
    (1..=max_nodes).prop_flat_map(|n| {
        prop::collection::vec(any::<bool>(), n * (n - 1) / 2).prop_map(move |bits| {
            let mut dag = AcyclicGraph::new();
            for i in 0..n {
                dag.add_node(u32::try_from(i).expect("small"));
            }
            let mut k = 0;
            for i in 0..n {
                for j in 0..i {
                    if bits[k] {
                        let from = u32::try_from(i).expect("small");
                        let to = u32::try_from(j).expect("small");
                        dag.add_edge(&from, &to, ()).expect("nodes exist");
                    }
                    k += 1;
                }
            }
            dag
        })
    })
}

/// Random directed graph (cycles and loops allowed) over `0..n`.
pub fn arb_digraph(max_nodes: u32) -> impl Strategy<Value = DirectedGraph<u32>> {
    (1..=max_nodes).prop_flat_map(|n| {
        prop::collection::vec((0..n, 0..n), 0..(n as usize * 3)).prop_map(move |edges| {
            let mut g = DirectedGraph::with_nodes(0..n);
            for (a, b) in edges {
                g.add_edge(&a, &b, ()).expect("nodes exist");
            }
            g
        })
    })
}
