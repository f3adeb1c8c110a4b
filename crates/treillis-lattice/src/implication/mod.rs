//! Implication systems: a ground set plus rules `premise → conclusion`.
//!
//! # Overview
//!
//! The closure of a set `S` is the smallest superset of `S` closed under
//! every rule: whenever a premise is included, the conclusion is added.
//!
//! Two evaluation strategies give the same result:
//!
//! - **Fixpoint**: scan all rules until a full scan adds nothing.
//! - **Single pass**: when the precedence graph is acyclic, rules sorted by
//!   the latest topological position of their premise fire in one scan. The
//!   order is computed lazily and dropped on every mutation.
//!
//! Normal forms live in [`normalize`] and the canonical bases in [`basis`].

pub mod basis;
pub mod normalize;

use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::debug;
use treillis_graph::{Content, DirectedGraph};

use crate::closure::ClosureSystem;
use crate::error::LatticeError;

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// An implication `premise → conclusion`.
///
/// The conclusion is never empty. The premise may be empty, and may overlap
/// the conclusion until the rule is made proper.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rule<T> {
    premise: BTreeSet<T>,
    conclusion: BTreeSet<T>,
}

impl<T: Content> Rule<T> {
    /// # Errors
    ///
    /// Returns [`LatticeError::InvalidRule`] if the conclusion is empty.
    pub fn new<P, C>(premise: P, conclusion: C) -> Result<Self, LatticeError>
    where
        P: IntoIterator<Item = T>,
        C: IntoIterator<Item = T>,
    {
        let rule = Self {
            premise: premise.into_iter().collect(),
            conclusion: conclusion.into_iter().collect(),
        };
        if rule.conclusion.is_empty() {
            return Err(LatticeError::InvalidRule {
                rule: rule.to_string(),
                reason: "empty conclusion",
            });
        }
        Ok(rule)
    }

    /// Build from sets already known to be valid.
    pub(crate) const fn from_parts(premise: BTreeSet<T>, conclusion: BTreeSet<T>) -> Self {
        Self {
            premise,
            conclusion,
        }
    }

    #[must_use]
    pub const fn premise(&self) -> &BTreeSet<T> {
        &self.premise
    }

    #[must_use]
    pub const fn conclusion(&self) -> &BTreeSet<T> {
        &self.conclusion
    }

    /// `true` if the rule fires on `set`.
    #[must_use]
    pub fn applies_to(&self, set: &BTreeSet<T>) -> bool {
        self.premise.is_subset(set)
    }

    /// Elements mentioned on either side.
    pub fn elements(&self) -> impl Iterator<Item = &T> + '_ {
        self.premise.iter().chain(&self.conclusion)
    }
}

impl<T: fmt::Debug> fmt::Display for Rule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} -> {:?}", self.premise, self.conclusion)
    }
}

// ---------------------------------------------------------------------------
// ImplicationSystem
// ---------------------------------------------------------------------------

/// A ground set and a deduplicated, ordered set of rules over it.
#[derive(Debug, Clone)]
pub struct ImplicationSystem<T> {
    elements: BTreeSet<T>,
    rules: BTreeSet<Rule<T>>,
    /// `Some(order)` when a single pass suffices, `None` when cyclic.
    pass_order: OnceCell<Option<Vec<Rule<T>>>>,
}

impl<T: Content> Default for ImplicationSystem<T> {
    fn default() -> Self {
        Self::new(BTreeSet::new())
    }
}

impl<T: Content> PartialEq for ImplicationSystem<T> {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements && self.rules == other.rules
    }
}

impl<T: Content> Eq for ImplicationSystem<T> {}

impl<T: Content> ImplicationSystem<T> {
    /// A rule-less system over `elements`.
    #[must_use]
    pub const fn new(elements: BTreeSet<T>) -> Self {
        Self {
            elements,
            rules: BTreeSet::new(),
            pass_order: OnceCell::new(),
        }
    }

    /// A system over `elements` with `rules`.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::UnknownElement`] for the first rule element
    /// outside `elements`.
    pub fn with_rules<I>(elements: BTreeSet<T>, rules: I) -> Result<Self, LatticeError>
    where
        I: IntoIterator<Item = Rule<T>>,
    {
        let mut system = Self::new(elements);
        for rule in rules {
            system.add_rule(rule)?;
        }
        Ok(system)
    }

    /// Build from rules known to stay inside `elements`.
    pub(crate) fn from_parts(elements: BTreeSet<T>, rules: BTreeSet<Rule<T>>) -> Self {
        Self {
            elements,
            rules,
            pass_order: OnceCell::new(),
        }
    }

    #[must_use]
    pub const fn elements(&self) -> &BTreeSet<T> {
        &self.elements
    }

    /// Rules in `(premise, conclusion)` order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule<T>> + '_ {
        self.rules.iter()
    }

    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn contains_rule(&self, rule: &Rule<T>) -> bool {
        self.rules.contains(rule)
    }

    /// Returns `true` if the element was new.
    pub fn add_element(&mut self, element: T) -> bool {
        self.invalidate();
        self.elements.insert(element)
    }

    /// Returns `true` if the rule was new.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::UnknownElement`] if the rule mentions an
    /// element outside the ground set. The system is left unchanged.
    pub fn add_rule(&mut self, rule: Rule<T>) -> Result<bool, LatticeError> {
        if let Some(unknown) = rule.elements().find(|x| !self.elements.contains(*x)) {
            return Err(LatticeError::unknown(unknown));
        }
        self.invalidate();
        Ok(self.rules.insert(rule))
    }

    /// Returns `true` if the rule was present.
    pub fn remove_rule(&mut self, rule: &Rule<T>) -> bool {
        self.invalidate();
        self.rules.remove(rule)
    }

    /// Swap in a new rule set and drop the cached evaluation order.
    pub(crate) fn replace_rules(&mut self, rules: BTreeSet<Rule<T>>) -> usize {
        self.invalidate();
        self.rules = rules;
        self.rules.len()
    }

    pub(crate) fn take_rules(&mut self) -> BTreeSet<Rule<T>> {
        self.invalidate();
        std::mem::take(&mut self.rules)
    }

    fn invalidate(&mut self) {
        self.pass_order = OnceCell::new();
    }

    /// Closure by repeated full scans.
    #[must_use]
    pub fn fixpoint_closure(&self, set: &BTreeSet<T>) -> BTreeSet<T> {
        let mut closed = set.clone();
        loop {
            let before = closed.len();
            for rule in &self.rules {
                if rule.applies_to(&closed) {
                    closed.extend(rule.conclusion.iter().cloned());
                }
            }
            if closed.len() == before {
                return closed;
            }
        }
    }

    /// `set` plus the conclusions of every rule whose premise is included in
    /// `set`, without re-firing.
    #[must_use]
    pub fn one_pass(&self, set: &BTreeSet<T>) -> BTreeSet<T> {
        let mut result = set.clone();
        for rule in &self.rules {
            if rule.applies_to(set) {
                result.extend(rule.conclusion.iter().cloned());
            }
        }
        result
    }

    fn single_pass_order(&self) -> Option<&[Rule<T>]> {
        self.pass_order
            .get_or_init(|| {
                let graph = self.precedence_graph();
                let Ok(order) = graph.topological_sort() else {
                    debug!(rules = self.rules.len(), "cyclic precedence, fixpoint closure");
                    return None;
                };
                let position: BTreeMap<&T, usize> =
                    order.into_iter().enumerate().map(|(i, x)| (x, i)).collect();
                let mut rules: Vec<Rule<T>> = self.rules.iter().cloned().collect();
                rules.sort_by_key(|r| {
                    r.premise
                        .iter()
                        .filter_map(|x| position.get(x))
                        .max()
                        .copied()
                });
                debug!(rules = rules.len(), "acyclic precedence, single-pass closure");
                Some(rules)
            })
            .as_deref()
    }
}

impl<T: Content> ClosureSystem for ImplicationSystem<T> {
    type Element = T;

    fn ground_set(&self) -> &BTreeSet<T> {
        &self.elements
    }

    fn closure(&self, set: &BTreeSet<T>) -> BTreeSet<T> {
        let Some(order) = self.single_pass_order() else {
            return self.fixpoint_closure(set);
        };
        let mut closed = set.clone();
        for rule in order {
            if rule.applies_to(&closed) {
                closed.extend(rule.conclusion.iter().cloned());
            }
        }
        closed
    }

    /// `a → b` whenever some rule has `a` in its premise and `b` in its
    /// conclusion but not its premise.
    fn precedence_graph(&self) -> DirectedGraph<T> {
        let mut graph = DirectedGraph::with_nodes(self.elements.iter().cloned());
        for rule in &self.rules {
            for a in &rule.premise {
                for b in rule.conclusion.difference(&rule.premise) {
                    let _ = graph.add_edge(a, b, ());
                }
            }
        }
        graph
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
