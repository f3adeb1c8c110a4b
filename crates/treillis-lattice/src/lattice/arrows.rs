//! Arrow relations between join- and meet-irreducibles.
//!
//! For a join-irreducible `j` with lower cover `j_*` and a meet-irreducible
//! `m` with upper cover `m^*`:
//!
//! | relation | condition                              |
//! |----------|----------------------------------------|
//! | `Cross`  | `j ≤ m`                                |
//! | `Down`   | `j ≰ m` and `j_* ≤ m`                  |
//! | `Up`     | `j ≰ m` and `j ≤ m^*`                  |
//! | `UpDown` | both of the above                      |
//! | `Circ`   | neither                                |

use tracing::instrument;
use treillis_graph::{Content, DirectedGraph};

use super::Lattice;
use super::order::Reachability;
use crate::context::RelationalContext;

/// Classification of a (join-irreducible, meet-irreducible) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Arrow {
    Up,
    Down,
    UpDown,
    Cross,
    Circ,
}

impl<N: Content> Lattice<N> {
    fn classify(&self, reach: &Reachability<'_, N>, j: usize, m: usize) -> Arrow {
        if reach.leq(j, m) {
            return Arrow::Cross;
        }
        let down = self.order.lower_covers[j].iter().any(|&lower| reach.leq(lower, m));
        let up = self.order.upper_covers[m].iter().any(|&upper| reach.leq(j, upper));
        match (up, down) {
            (true, true) => Arrow::UpDown,
            (true, false) => Arrow::Up,
            (false, true) => Arrow::Down,
            (false, false) => Arrow::Circ,
        }
    }

    fn irreducible_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.order.len();
        let meets: Vec<usize> = (0..n).filter(|&m| self.order.is_meet_irreducible(m)).collect();
        (0..n)
            .filter(move |&j| self.order.is_join_irreducible(j))
            .flat_map(move |j| meets.clone().into_iter().map(move |m| (j, m)))
    }

    /// Edge `m → j` labelled with the arrow between join-irreducible `j` and
    /// meet-irreducible `m`, for every such pair.
    #[must_use]
    #[instrument(skip(self), fields(nodes = self.order.len()))]
    pub fn arrow_relation(&self) -> DirectedGraph<N, Arrow> {
        let reach = self.order.reachability();
        let mut graph = DirectedGraph::new();
        for (j, m) in self.irreducible_pairs() {
            let (jn, mn) = (&self.order.nodes[j], &self.order.nodes[m]);
            graph.add_node(jn.clone());
            graph.add_node(mn.clone());
            let _ = graph.add_edge(mn, jn, self.classify(&reach, j, m));
        }
        graph
    }

    /// The reduced context: join-irreducibles as objects, meet-irreducibles
    /// as attributes, incidence `j ≤ m`. Its concept lattice is isomorphic
    /// to this lattice.
    #[must_use]
    pub fn table(&self) -> RelationalContext<N, N> {
        self.context_where(|reach, j, m| reach.leq(j, m))
    }

    /// Like [`Lattice::table`], with incidence only on `UpDown` pairs.
    #[must_use]
    pub fn double_arrow_table(&self) -> RelationalContext<N, N> {
        self.context_where(|reach, j, m| self.classify(reach, j, m) == Arrow::UpDown)
    }

    fn context_where<F>(&self, related: F) -> RelationalContext<N, N>
    where
        F: Fn(&Reachability<'_, N>, usize, usize) -> bool,
    {
        let reach = self.order.reachability();
        let mut ctx = RelationalContext::new();
        for i in 0..self.order.len() {
            let node = &self.order.nodes[i];
            if self.order.is_join_irreducible(i) {
                ctx.add_object(node.clone());
            }
            if self.order.is_meet_irreducible(i) {
                ctx.add_attribute(node.clone());
            }
        }
        for (j, m) in self.irreducible_pairs() {
            if related(&reach, j, m) {
                let _ = ctx.add_incidence(&self.order.nodes[j], &self.order.nodes[m]);
            }
        }
        ctx
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::closure::ClosureSystem;
    use crate::lattice::tests::{diamond, lattice};

    fn arrows_lattice() -> Lattice<&'static str> {
        lattice(&[
            ("a", "b"),
            ("b", "c"),
            ("b", "d"),
            ("c", "e"),
            ("d", "f"),
            ("e", "g"),
            ("f", "g"),
            ("g", "h"),
        ])
    }

    #[test]
    fn arrow_classification() {
        let arrows = arrows_lattice().arrow_relation();
        assert_eq!(arrows.edge(&"g", &"b"), Some(&Arrow::Cross));
        assert_eq!(arrows.edge(&"f", &"c"), Some(&Arrow::UpDown));
        assert_eq!(arrows.edge(&"f", &"e"), Some(&Arrow::Up));
        assert_eq!(arrows.edge(&"d", &"c"), Some(&Arrow::Down));
        assert_eq!(arrows.edge(&"a", &"h"), Some(&Arrow::Circ));
    }

    #[test]
    fn arrows_only_between_irreducibles() {
        let l = arrows_lattice();
        let arrows = l.arrow_relation();
        // g has two lower covers, so it is never a target
        assert!(arrows.predecessors(&"g").is_empty());
        // b has two upper covers, so it is never a source
        assert!(arrows.successors(&"b").is_empty());
        let pairs = l.join_irreducibles().len() * l.meet_irreducibles().len();
        assert_eq!(arrows.edge_count(), pairs);
    }

    #[test]
    fn double_arrow_table() {
        let l = lattice(&[
            ("b", "c"),
            ("b", "d"),
            ("b", "e"),
            ("c", "f"),
            ("d", "f"),
            ("d", "g"),
            ("e", "g"),
            ("f", "t"),
            ("g", "t"),
        ]);
        let table = l.double_arrow_table();
        assert!(table.extent(&BTreeSet::from(["c"])).contains(&"d"));
        assert!(table.extent(&BTreeSet::from(["e"])).contains(&"d"));
        assert!(table.extent(&BTreeSet::from(["f"])).contains(&"e"));
        assert!(table.extent(&BTreeSet::from(["g"])).contains(&"c"));
    }

    #[test]
    fn table_rebuilds_lattice() {
        let l = diamond();
        let table = l.table();
        assert!(table.contains_object(&"b"));
        assert!(table.contains_object(&"d"));
        assert!(table.contains_attribute(&"b"));
        assert!(table.contains_incidence(&"b", &"b"));
        assert!(!table.contains_incidence(&"b", &"d"));
        assert_eq!(table.all_closures().len(), l.node_count());
    }
}
