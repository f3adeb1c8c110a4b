//! Closure-preserving rewrites of an implication system, and the matching
//! predicates.
//!
//! Every `make_*` method keeps the closure operator intact and returns the
//! resulting number of rules.

use std::collections::{BTreeMap, BTreeSet};

use tracing::instrument;
use treillis_graph::Content;

use super::{ImplicationSystem, Rule};
use crate::closure::ClosureSystem;

impl<T: Content> ImplicationSystem<T> {
    // -----------------------------------------------------------------------
    // Rewrites
    // -----------------------------------------------------------------------

    /// Remove premise elements from conclusions; drop rules left empty.
    pub fn make_proper(&mut self) -> usize {
        let rules = self
            .take_rules()
            .into_iter()
            .filter_map(|r| {
                let conclusion: BTreeSet<T> =
                    r.conclusion.difference(&r.premise).cloned().collect();
                (!conclusion.is_empty()).then(|| Rule::from_parts(r.premise, conclusion))
            })
            .collect();
        self.replace_rules(rules)
    }

    /// Split every rule into proper rules with a single conclusion element.
    pub fn make_unary(&mut self) -> usize {
        self.make_proper();
        let rules = self
            .take_rules()
            .into_iter()
            .flat_map(|r| {
                let premise = r.premise;
                r.conclusion
                    .into_iter()
                    .map(move |c| Rule::from_parts(premise.clone(), BTreeSet::from([c])))
            })
            .collect();
        self.replace_rules(rules)
    }

    /// Unary rules whose premises cannot lose an element without losing the
    /// conclusion under the whole system.
    #[instrument(skip(self), fields(rules = self.rule_count()))]
    pub fn make_left_minimal(&mut self) -> usize {
        self.make_unary();
        let reference = self.clone();
        let rules = self
            .take_rules()
            .into_iter()
            .map(|r| {
                let mut premise = r.premise;
                let elements: Vec<T> = premise.iter().cloned().collect();
                for p in elements {
                    premise.remove(&p);
                    if !r.conclusion.is_subset(&reference.closure(&premise)) {
                        premise.insert(p);
                    }
                }
                Rule::from_parts(premise, r.conclusion)
            })
            .collect();
        self.replace_rules(rules)
    }

    /// One rule per premise, concluding everything the premise derives.
    pub fn make_right_maximal(&mut self) -> usize {
        self.merge_equal_premises();
        let reference = self.clone();
        let rules = self
            .take_rules()
            .into_iter()
            .filter_map(|r| {
                let conclusion: BTreeSet<T> = reference
                    .closure(&r.premise)
                    .difference(&r.premise)
                    .cloned()
                    .collect();
                (!conclusion.is_empty()).then(|| Rule::from_parts(r.premise, conclusion))
            })
            .collect();
        self.replace_rules(rules)
    }

    /// Merge rules with equal premises, then drop every rule implied by the
    /// remaining ones.
    #[instrument(skip(self), fields(rules = self.rule_count()))]
    pub fn make_compact(&mut self) -> usize {
        self.merge_equal_premises();
        let candidates: Vec<Rule<T>> = self.rules.iter().cloned().collect();
        for rule in candidates {
            self.rules.remove(&rule);
            if !rule.conclusion.is_subset(&self.fixpoint_closure(&rule.premise)) {
                self.rules.insert(rule);
            }
        }
        let rules = std::mem::take(&mut self.rules);
        self.replace_rules(rules)
    }

    /// Union the conclusions of rules sharing a premise.
    pub(crate) fn merge_equal_premises(&mut self) -> usize {
        let mut merged: BTreeMap<BTreeSet<T>, BTreeSet<T>> = BTreeMap::new();
        for r in self.take_rules() {
            merged.entry(r.premise).or_default().extend(r.conclusion);
        }
        let rules = merged
            .into_iter()
            .map(|(premise, conclusion)| Rule::from_parts(premise, conclusion))
            .collect();
        self.replace_rules(rules)
    }

    /// For unary rules: keep, per conclusion, only the ⊆-minimal premises.
    pub(crate) fn retain_minimal_premises(&mut self) -> usize {
        let rules = self.take_rules();
        let kept = rules
            .iter()
            .filter(|r| {
                !rules.iter().any(|s| {
                    s.conclusion == r.conclusion
                        && s.premise.len() < r.premise.len()
                        && s.premise.is_subset(&r.premise)
                })
            })
            .cloned()
            .collect();
        self.replace_rules(kept)
    }

    // -----------------------------------------------------------------------
    // Predicates
    // -----------------------------------------------------------------------

    /// No rule concludes an element of its own premise.
    #[must_use]
    pub fn is_proper(&self) -> bool {
        self.rules.iter().all(|r| r.premise.is_disjoint(&r.conclusion))
    }

    /// Every conclusion is a single element.
    #[must_use]
    pub fn is_unary(&self) -> bool {
        self.rules.iter().all(|r| r.conclusion.len() == 1)
    }

    #[must_use]
    pub fn is_left_minimal(&self) -> bool {
        self.is_unary()
            && self.is_proper()
            && self.rules.iter().all(|r| {
                r.premise.iter().all(|p| {
                    let mut smaller = r.premise.clone();
                    smaller.remove(p);
                    !r.conclusion.is_subset(&self.closure(&smaller))
                })
            })
    }

    #[must_use]
    pub fn is_right_maximal(&self) -> bool {
        self.rules.iter().all(|r| {
            let mut both = r.premise.clone();
            both.extend(r.conclusion.iter().cloned());
            both == self.closure(&r.premise)
        })
    }

    /// Distinct premises, and no rule implied by the others.
    #[must_use]
    pub fn is_compact(&self) -> bool {
        let premises: BTreeSet<&BTreeSet<T>> = self.rules.iter().map(|r| &r.premise).collect();
        if premises.len() != self.rules.len() {
            return false;
        }
        self.rules.iter().all(|r| {
            let mut others = self.clone();
            others.remove_rule(r);
            !r.conclusion.is_subset(&others.fixpoint_closure(&r.premise))
        })
    }

    /// One pass of the rules computes every closure.
    ///
    /// Checked on overlaps: for rules `A → B` and `C → D` with `B ∩ C ≠ ∅`,
    /// `D` must already be produced by one pass over `A ∪ (C \ B)`.
    #[must_use]
    pub fn is_direct(&self) -> bool {
        self.rules.iter().all(|first| {
            self.rules
                .iter()
                .filter(|second| !first.conclusion.is_disjoint(&second.premise))
                .all(|second| {
                    let mut start = first.premise.clone();
                    start.extend(second.premise.difference(&first.conclusion).cloned());
                    second.conclusion.is_subset(&self.one_pass(&start))
                })
        })
    }

    /// Same closure operator as `other`.
    #[must_use]
    pub fn is_equivalent_to(&self, other: &Self) -> bool {
        let holds_in = |rules: &Self, system: &Self| {
            rules
                .rules
                .iter()
                .all(|r| r.conclusion.is_subset(&system.closure(&r.premise)))
        };
        holds_in(self, other) && holds_in(other, self)
    }

    #[must_use]
    pub fn is_canonical_basis(&self) -> bool {
        let mut canonical = self.clone();
        canonical.make_canonical_basis();
        canonical.rules == self.rules
    }

    #[must_use]
    pub fn is_canonical_direct_basis(&self) -> bool {
        let mut canonical = self.clone();
        canonical.make_canonical_direct_basis();
        canonical.rules == self.rules
    }
}
