//! Day's doubling of convex sets, and the congruence-normal (CN) test.
//!
//! # Doubling
//!
//! For a convex subset `C` of a lattice `L`, `L[C]` is the subposet of
//! `L × {Lower < Upper}` made of
//!
//! - `(x, Lower)` for `x ∈ ↓C`,
//! - `(x, Upper)` for `x ∉ ↓C` or `x ∈ C`,
//!
//! so every element of `C` is split in two stacked copies and the rest of
//! the order is kept.
//!
//! # CN
//!
//! A lattice is CN when it reduces to a single element by repeatedly taking
//! the quotient by a congruence generated by one covering pair whose blocks
//! have at most two elements. Each such step undoes one doubling.
//! Partitions already known to fail are memoized.

use std::collections::BTreeSet;

use fixedbitset::FixedBitSet;
use tracing::{debug, instrument};
use treillis_graph::{AcyclicGraph, Content};

use super::Lattice;
use crate::error::LatticeError;

/// Which copy of a doubled element a node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Half {
    Lower,
    Upper,
}

/// The lattice `L[C]` obtained by doubling the convex subset `subset`.
///
/// # Errors
///
/// Returns [`LatticeError::Graph`] if `subset` mentions an unknown node and
/// [`LatticeError::NotConvex`] if a node outside `subset` lies between two
/// of its members.
#[instrument(skip(lattice, subset), fields(nodes = lattice.node_count(), subset = subset.len()))]
pub fn doubling_convex<N: Content>(
    lattice: &Lattice<N>,
    subset: &BTreeSet<N>,
) -> Result<Lattice<(N, Half)>, LatticeError> {
    let order = &lattice.order;
    let members: Vec<usize> = subset
        .iter()
        .map(|x| order.position(x))
        .collect::<Result<_, _>>()?;

    let n = order.len();
    let mut below = FixedBitSet::with_capacity(n);
    let mut above = FixedBitSet::with_capacity(n);
    for &c in &members {
        below.union_with(&order.down_set(c));
        above.union_with(&order.up_set(c));
    }
    let in_subset = |i: usize| members.contains(&i);
    if let Some(z) = (0..n).find(|&z| !in_subset(z) && below.contains(z) && above.contains(z)) {
        return Err(LatticeError::NotConvex {
            node: format!("{:?}", order.nodes[z]),
        });
    }

    // lower copies for `↓C`, upper copies for `C` and everything outside `↓C`
    let halves = |i: usize| {
        let lower = below.contains(i).then_some(Half::Lower);
        let upper = (in_subset(i) || !below.contains(i)).then_some(Half::Upper);
        lower.into_iter().chain(upper)
    };
    let label = |i: usize, h: Half| (order.nodes[i].clone(), h);
    let mut dag = AcyclicGraph::new();
    for i in 0..n {
        for h in halves(i) {
            dag.add_node(label(i, h));
        }
        if below.contains(i) && in_subset(i) {
            dag.add_edge(&label(i, Half::Lower), &label(i, Half::Upper), ())?;
        }
    }
    for (i, covers) in order.upper_covers.iter().enumerate() {
        for &k in covers {
            for hi in halves(i) {
                for hk in halves(k).filter(|&hk| hi <= hk) {
                    dag.add_edge(&label(i, hi), &label(k, hk), ())?;
                }
            }
        }
    }
    dag.transitive_reduction()?;
    debug!(nodes = dag.node_count(), edges = dag.edge_count(), "doubled");
    Lattice::from_dag(dag)
}

impl<N: Content> Lattice<N> {
    /// `true` when the lattice is congruence normal; `false` for anything
    /// that is not a lattice.
    #[must_use]
    #[instrument(skip(self), fields(nodes = self.order.len()))]
    pub fn is_cn(&self) -> bool {
        let Some(table) = Table::from_lattice(self) else {
            return false;
        };
        let members: Vec<BTreeSet<usize>> = (0..table.len()).map(|i| BTreeSet::from([i])).collect();
        let mut failed = BTreeSet::new();
        reduces_to_point(&table, &members, &mut failed)
    }
}

/// Dense join and meet tables of a finite lattice.
struct Table {
    join: Vec<Vec<usize>>,
    meet: Vec<Vec<usize>>,
}

impl Table {
    fn from_lattice<N: Content>(lattice: &Lattice<N>) -> Option<Self> {
        let order = &lattice.order;
        let n = order.len();
        if n == 0 {
            return None;
        }
        let mut join = vec![vec![0; n]; n];
        let mut meet = vec![vec![0; n]; n];
        let reach = order.reachability();
        for i in 0..n {
            for j in 0..n {
                join[i][j] = reach.join(i, j)?;
                meet[i][j] = reach.meet(i, j)?;
            }
        }
        Some(Self { join, meet })
    }

    fn len(&self) -> usize {
        self.join.len()
    }

    fn covers(&self) -> Vec<(usize, usize)> {
        let n = self.len();
        let lt = |a: usize, b: usize| a != b && self.join[a][b] == b;
        let mut covers = Vec::new();
        for a in 0..n {
            for b in 0..n {
                if lt(a, b) && !(0..n).any(|c| lt(a, c) && lt(c, b)) {
                    covers.push((a, b));
                }
            }
        }
        covers
    }

    /// Block index per element of the congruence generated by `a ≡ b`, or
    /// `None` as soon as a block exceeds two elements.
    fn congruence(&self, a: usize, b: usize) -> Option<Vec<usize>> {
        let n = self.len();
        let mut parent: Vec<usize> = (0..n).collect();
        let mut size = vec![1usize; n];
        let mut pending = vec![(a, b)];
        while let Some((x, y)) = pending.pop() {
            let (rx, ry) = (find(&mut parent, x), find(&mut parent, y));
            if rx == ry {
                continue;
            }
            if size[rx] + size[ry] > 2 {
                return None;
            }
            parent[ry] = rx;
            size[rx] += size[ry];
            for z in 0..n {
                pending.push((self.join[x][z], self.join[y][z]));
                pending.push((self.meet[x][z], self.meet[y][z]));
            }
        }

        let mut block = vec![usize::MAX; n];
        let mut next = 0;
        let mut blocks = vec![0; n];
        for (x, slot) in blocks.iter_mut().enumerate() {
            let root = find(&mut parent, x);
            if block[root] == usize::MAX {
                block[root] = next;
                next += 1;
            }
            *slot = block[root];
        }
        Some(blocks)
    }

    fn quotient(&self, blocks: &[usize]) -> Self {
        let count = blocks.iter().max().map_or(0, |m| m + 1);
        let mut representative = vec![0; count];
        for (x, &b) in blocks.iter().enumerate().rev() {
            representative[b] = x;
        }
        let project = |table: &Vec<Vec<usize>>| -> Vec<Vec<usize>> {
            representative
                .iter()
                .map(|&x| representative.iter().map(|&y| blocks[table[x][y]]).collect())
                .collect()
        };
        Self {
            join: project(&self.join),
            meet: project(&self.meet),
        }
    }
}

fn find(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}

/// `members[i]` lists the original elements collapsed into element `i`.
fn reduces_to_point(
    table: &Table,
    members: &[BTreeSet<usize>],
    failed: &mut BTreeSet<BTreeSet<BTreeSet<usize>>>,
) -> bool {
    if table.len() == 1 {
        return true;
    }
    let key: BTreeSet<BTreeSet<usize>> = members.iter().cloned().collect();
    if failed.contains(&key) {
        return false;
    }
    for (a, b) in table.covers() {
        let Some(blocks) = table.congruence(a, b) else {
            continue;
        };
        let count = blocks.iter().max().map_or(0, |m| m + 1);
        let mut merged = vec![BTreeSet::new(); count];
        for (x, &block) in blocks.iter().enumerate() {
            merged[block].extend(members[x].iter().copied());
        }
        if reduces_to_point(&table.quotient(&blocks), &merged, failed) {
            return true;
        }
    }
    failed.insert(key);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::tests::{diamond, lattice};

    fn numeric(edges: &[(u32, u32)]) -> Lattice<u32> {
        Lattice::from_edges(edges.iter().copied()).expect("acyclic")
    }

    fn cn_lattice() -> Lattice<u32> {
        numeric(&[
            (1, 2),
            (1, 4),
            (1, 8),
            (2, 3),
            (3, 19),
            (4, 9),
            (4, 14),
            (8, 3),
            (8, 9),
            (8, 12),
            (9, 10),
            (10, 5),
            (12, 10),
            (12, 19),
            (14, 10),
            (19, 5),
        ])
    }

    #[test]
    fn small_lattices_are_cn() {
        assert!(lattice(&[("a", "b")]).is_cn());
        assert!(diamond().is_cn());
    }

    #[test]
    fn cn_lattice_is_cn() {
        let l = cn_lattice();
        assert!(l.is_lattice());
        assert!(l.is_cn());
    }

    #[test]
    fn doubling_preserves_cn() {
        let l = cn_lattice();
        let c: BTreeSet<u32> = [2, 3, 8, 12].into_iter().collect();
        let doubled = doubling_convex(&l, &c).expect("convex");
        assert_eq!(doubled.node_count(), 15);
        assert!(doubled.is_lattice());
        assert!(doubled.is_cn());
    }

    #[test]
    fn non_cn_lattice_is_detected() {
        let l = numeric(&[
            (1, 2),
            (1, 3),
            (2, 8),
            (2, 9),
            (3, 10),
            (8, 12),
            (9, 12),
            (10, 12),
        ]);
        assert!(l.is_lattice());
        assert!(!l.is_cn());
    }

    #[test]
    fn doubling_a_point_adds_a_cover() {
        let l = lattice(&[("a", "b")]);
        let doubled = doubling_convex(&l, &BTreeSet::from(["a"])).expect("convex");
        assert_eq!(doubled.node_count(), 3);
        assert!(doubled.contains_edge(&("a", Half::Lower), &("a", Half::Upper)));
        assert!(doubled.contains_edge(&("a", Half::Upper), &("b", Half::Upper)));
        assert!(!doubled.contains_edge(&("a", Half::Lower), &("b", Half::Upper)));
    }

    #[test]
    fn doubling_the_middle_of_a_chain() {
        let l = lattice(&[("a", "b"), ("b", "c")]);
        let doubled = doubling_convex(&l, &BTreeSet::from(["b"])).expect("convex");
        assert_eq!(doubled.node_count(), 4);
        assert_eq!(doubled.edge_count(), 3);
        assert!(doubled.contains_edge(&("a", Half::Lower), &("b", Half::Lower)));
        assert!(doubled.contains_edge(&("b", Half::Upper), &("c", Half::Upper)));
        assert_eq!(doubled.leq(&("a", Half::Lower), &("c", Half::Upper)), Ok(true));
    }

    #[test]
    fn non_convex_subset_is_rejected() {
        let l = lattice(&[("a", "b"), ("b", "c")]);
        let err = doubling_convex(&l, &BTreeSet::from(["a", "c"])).expect_err("b is between");
        assert_eq!(err, LatticeError::NotConvex { node: "\"b\"".to_string() });
    }

    #[test]
    fn unknown_member_is_rejected() {
        let l = diamond();
        assert!(matches!(
            doubling_convex(&l, &BTreeSet::from(["z"])),
            Err(LatticeError::Graph(_))
        ));
    }
}
