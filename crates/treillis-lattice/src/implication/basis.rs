//! Canonical (Duquenne–Guigues) basis and canonical direct basis.
//!
//! # Canonical basis
//!
//! Ganter's algorithm enumerates, in lectic order, the sets closed under
//! `L*`: the rules found so far, each firing only when its premise is
//! *strictly* included. Every such set `P` with `φ(P) ≠ P` is pseudo-closed
//! and contributes `P → φ(P) \ P`.
//!
//! # Direct basis
//!
//! Proper unary rules are saturated with the overlap rule
//!
//! ```text
//! A → b,  C → d,  b ∈ C,  d ∉ A ∪ C   ⟹   A ∪ (C \ {b}) → d
//! ```
//!
//! discarding any rule whose premise contains another premise with the same
//! conclusion. The saturated system computes every closure in one pass.

use std::collections::BTreeSet;

use tracing::{debug, instrument};
use treillis_graph::{Content, DirectedGraph};

use super::{ImplicationSystem, Rule};
use crate::closure::ClosureSystem;

/// The sets closed under the pseudo-closed rules found so far.
struct Saturation<'a, T> {
    ground: &'a BTreeSet<T>,
    rules: &'a [Rule<T>],
}

impl<T: Content> ClosureSystem for Saturation<'_, T> {
    type Element = T;

    fn ground_set(&self) -> &BTreeSet<T> {
        self.ground
    }

    fn closure(&self, set: &BTreeSet<T>) -> BTreeSet<T> {
        let mut closed = set.clone();
        loop {
            let before = closed.len();
            for rule in self.rules {
                if rule.premise.len() < closed.len() && rule.premise.is_subset(&closed) {
                    closed.extend(rule.conclusion.iter().cloned());
                }
            }
            if closed.len() == before {
                return closed;
            }
        }
    }

    fn precedence_graph(&self) -> DirectedGraph<T> {
        DirectedGraph::with_nodes(self.ground.iter().cloned())
    }
}

/// The canonical basis of any closure system.
#[instrument(skip(cs), fields(ground = cs.ground_set().len()))]
pub fn canonical_basis<C: ClosureSystem>(cs: &C) -> ImplicationSystem<C::Element> {
    let ground = cs.ground_set();
    let mut basis: Vec<Rule<C::Element>> = Vec::new();
    let mut current = BTreeSet::new();
    loop {
        let closed = cs.closure(&current);
        if closed != current {
            let conclusion = closed.difference(&current).cloned().collect();
            basis.push(Rule::from_parts(current.clone(), conclusion));
        }
        let saturation = Saturation {
            ground,
            rules: &basis,
        };
        match saturation.next_closure(&current) {
            Some(next) => current = next,
            None => break,
        }
    }
    debug!(rules = basis.len(), "canonical basis");
    ImplicationSystem::from_parts(ground.clone(), basis.into_iter().collect())
}

impl<T: Content> ImplicationSystem<T> {
    /// Replace the rules by the canonical basis of this system.
    pub fn make_canonical_basis(&mut self) -> usize {
        let basis = canonical_basis(&*self);
        self.replace_rules(basis.rules)
    }

    /// Replace the rules by an equivalent direct system of unary rules.
    #[instrument(skip(self), fields(rules = self.rule_count()))]
    pub fn make_direct(&mut self) -> usize {
        self.make_unary();
        self.retain_minimal_premises();
        let mut rules = self.take_rules();
        loop {
            let mut added = Vec::new();
            for first in &rules {
                let Some(b) = first.conclusion.first() else {
                    continue;
                };
                for second in &rules {
                    if !second.premise.contains(b) {
                        continue;
                    }
                    let mut premise = first.premise.clone();
                    premise.extend(second.premise.iter().filter(|x| *x != b).cloned());
                    let derived = Rule::from_parts(premise, second.conclusion.clone());
                    if !derived.premise.is_disjoint(&derived.conclusion)
                        || is_subsumed(&rules, &derived)
                        || is_subsumed(&added, &derived)
                    {
                        continue;
                    }
                    added.push(derived);
                }
            }
            if added.is_empty() {
                break;
            }
            for rule in added {
                if !is_subsumed(&rules, &rule) {
                    rules.retain(|r| {
                        r.conclusion != rule.conclusion || !rule.premise.is_subset(&r.premise)
                    });
                    rules.insert(rule);
                }
            }
        }
        self.replace_rules(rules)
    }

    /// Replace the rules by the canonical direct basis: the direct basis with
    /// ⊆-minimal premises per conclusion, rules with equal premises merged.
    #[instrument(skip(self), fields(rules = self.rule_count()))]
    pub fn make_canonical_direct_basis(&mut self) -> usize {
        self.make_canonical_basis();
        self.make_direct();
        self.retain_minimal_premises();
        self.merge_equal_premises()
    }
}

/// `true` if some rule with the same conclusion has a premise included in
/// `rule`'s premise.
fn is_subsumed<'a, T, I>(rules: I, rule: &Rule<T>) -> bool
where
    T: Content + 'a,
    I: IntoIterator<Item = &'a Rule<T>>,
{
    rules
        .into_iter()
        .any(|r| r.conclusion == rule.conclusion && r.premise.is_subset(&rule.premise))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::implication::tests::{rule, set, system};

    #[test]
    fn canonical_basis_of_chain() {
        // closed sets of a → b → c over {a, b, c}: ∅, c, bc, abc
        let sys = system("abc", &[("a", "b"), ("b", "c")]);
        let basis = canonical_basis(&sys);
        assert_eq!(basis.rule_count(), 2);
        assert!(basis.contains_rule(&rule("a", "bc")));
        assert!(basis.contains_rule(&rule("b", "c")));
        assert!(basis.is_equivalent_to(&sys));
    }

    #[test]
    fn canonical_basis_with_empty_premise() {
        let sys = system("ab", &[("", "a")]);
        let basis = canonical_basis(&sys);
        assert!(basis.contains_rule(&rule("", "a")));
        assert_eq!(basis.rule_count(), 1);
    }

    #[test]
    fn canonical_basis_is_minimal() {
        // redundant and split rules collapse
        let mut sys = system(
            "abcd",
            &[("a", "b"), ("a", "c"), ("ab", "c"), ("b", "d"), ("a", "d")],
        );
        let before = sys.clone();
        sys.make_canonical_basis();
        assert!(sys.is_equivalent_to(&before));
        assert!(sys.is_canonical_basis());
        assert!(sys.contains_rule(&rule("a", "bcd")));
        assert!(sys.contains_rule(&rule("b", "d")));
        assert_eq!(sys.rule_count(), 2);
    }

    #[test]
    fn direct_saturates_overlaps() {
        let mut sys = system("abc", &[("a", "b"), ("b", "c")]);
        sys.make_direct();
        assert!(sys.contains_rule(&rule("a", "c")));
        assert!(sys.is_direct());
        assert!(sys.is_unary());
    }

    #[test]
    fn direct_combines_premises() {
        // ab → c and c d → e yield abd → e
        let mut sys = system("abcde", &[("ab", "c"), ("cd", "e")]);
        let before = sys.clone();
        sys.make_direct();
        assert!(sys.contains_rule(&rule("abd", "e")));
        assert!(sys.is_direct());
        assert!(sys.is_equivalent_to(&before));
        for s in [set("abd"), set("ab"), set("cd"), set("a")] {
            assert_eq!(sys.one_pass(&s), before.closure(&s));
        }
    }

    #[test]
    fn canonical_direct_basis_merges_premises() {
        let mut sys = system("abc", &[("a", "b"), ("b", "c")]);
        sys.make_canonical_direct_basis();
        assert!(sys.contains_rule(&rule("a", "bc")));
        assert!(sys.contains_rule(&rule("b", "c")));
        assert_eq!(sys.rule_count(), 2);
        assert!(sys.is_canonical_direct_basis());
    }
}
