//! Relational contexts: objects, attributes and a binary incidence relation.
//!
//! # Overview
//!
//! The two derivation operators are
//!
//! - `intent(X)`: attributes shared by every object of `X`,
//! - `extent(Y)`: objects having every attribute of `Y`,
//!
//! and the closure on attributes is `intent(extent(Y))`. Concept lattices
//! built from a context carry both sides on every node.
//!
//! Covers are computed with Lindig's limited-object-access test
//! ([`RelationalContext::immediate_successors_loa`]), which only intersects
//! the current extent with one attribute column per candidate.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, instrument};
use treillis_graph::{Content, DirectedGraph};

use crate::closure::ClosureSystem;
use crate::concept_lattice::ConceptLattice;
use crate::error::LatticeError;

/// A formal context with objects `O` and attributes `A`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationalContext<O, A = O> {
    objects: BTreeSet<O>,
    attributes: BTreeSet<A>,
    /// object → its attributes
    rows: BTreeMap<O, BTreeSet<A>>,
    /// attribute → its objects
    columns: BTreeMap<A, BTreeSet<O>>,
}

impl<O: Content, A: Content> Default for RelationalContext<O, A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Elements removed by [`RelationalContext::reduction`], each mapped to the
/// kept elements whose derivations intersect to its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduction<O, A> {
    pub objects: BTreeMap<O, BTreeSet<O>>,
    pub attributes: BTreeMap<A, BTreeSet<A>>,
}

impl<O: Content, A: Content> RelationalContext<O, A> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            objects: BTreeSet::new(),
            attributes: BTreeSet::new(),
            rows: BTreeMap::new(),
            columns: BTreeMap::new(),
        }
    }

    /// A context from object/attribute pairs; endpoints are added as needed.
    pub fn from_incidences<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (O, A)>,
    {
        let mut ctx = Self::new();
        for (o, a) in pairs {
            ctx.add_object(o.clone());
            ctx.add_attribute(a.clone());
            ctx.rows.entry(o.clone()).or_default().insert(a.clone());
            ctx.columns.entry(a).or_default().insert(o);
        }
        ctx
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Returns `true` if the object was new.
    pub fn add_object(&mut self, object: O) -> bool {
        self.rows.entry(object.clone()).or_default();
        self.objects.insert(object)
    }

    /// Returns `true` if the attribute was new.
    pub fn add_attribute(&mut self, attribute: A) -> bool {
        self.columns.entry(attribute.clone()).or_default();
        self.attributes.insert(attribute)
    }

    /// Returns `true` if the pair was new.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::UnknownElement`] if either side is missing.
    pub fn add_incidence(&mut self, object: &O, attribute: &A) -> Result<bool, LatticeError> {
        let row = self.rows.get_mut(object).ok_or_else(|| LatticeError::unknown(object))?;
        let column = self
            .columns
            .get_mut(attribute)
            .ok_or_else(|| LatticeError::unknown(attribute))?;
        column.insert(object.clone());
        Ok(row.insert(attribute.clone()))
    }

    /// Returns `true` if the pair was present.
    pub fn remove_incidence(&mut self, object: &O, attribute: &A) -> bool {
        if let Some(column) = self.columns.get_mut(attribute) {
            column.remove(object);
        }
        self.rows.get_mut(object).is_some_and(|row| row.remove(attribute))
    }

    /// Remove an object with its incidences. Returns `true` if present.
    pub fn remove_object(&mut self, object: &O) -> bool {
        let Some(row) = self.rows.remove(object) else {
            return false;
        };
        for a in &row {
            if let Some(column) = self.columns.get_mut(a) {
                column.remove(object);
            }
        }
        self.objects.remove(object)
    }

    /// Remove an attribute with its incidences. Returns `true` if present.
    pub fn remove_attribute(&mut self, attribute: &A) -> bool {
        let Some(column) = self.columns.remove(attribute) else {
            return false;
        };
        for o in &column {
            if let Some(row) = self.rows.get_mut(o) {
                row.remove(attribute);
            }
        }
        self.attributes.remove(attribute)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[must_use]
    pub const fn objects(&self) -> &BTreeSet<O> {
        &self.objects
    }

    #[must_use]
    pub const fn attributes(&self) -> &BTreeSet<A> {
        &self.attributes
    }

    #[must_use]
    pub fn contains_object(&self, object: &O) -> bool {
        self.objects.contains(object)
    }

    #[must_use]
    pub fn contains_attribute(&self, attribute: &A) -> bool {
        self.attributes.contains(attribute)
    }

    #[must_use]
    pub fn contains_incidence(&self, object: &O, attribute: &A) -> bool {
        self.rows.get(object).is_some_and(|row| row.contains(attribute))
    }

    /// Number of incidence pairs.
    #[must_use]
    pub fn incidence_count(&self) -> usize {
        self.rows.values().map(BTreeSet::len).sum()
    }

    // -----------------------------------------------------------------------
    // Derivations
    // -----------------------------------------------------------------------

    /// Attributes shared by all `objects`; every attribute for `∅`.
    #[must_use]
    pub fn intent(&self, objects: &BTreeSet<O>) -> BTreeSet<A> {
        intersect(objects.iter().map(|o| self.rows.get(o)), &self.attributes)
    }

    /// Objects having all `attributes`; every object for `∅`.
    #[must_use]
    pub fn extent(&self, attributes: &BTreeSet<A>) -> BTreeSet<O> {
        intersect(attributes.iter().map(|a| self.columns.get(a)), &self.objects)
    }

    /// `extent(intent(objects))`.
    #[must_use]
    pub fn object_closure(&self, objects: &BTreeSet<O>) -> BTreeSet<O> {
        self.extent(&self.intent(objects))
    }

    /// Covers of the closed attribute set `intent`, by Lindig's test.
    ///
    /// For each candidate `m ∉ intent`, the extension is derived from
    /// `extent(intent) ∩ m'` alone. A candidate yields a cover unless its
    /// extension contains another candidate still considered minimal; in
    /// that case `m` itself stops being minimal.
    #[must_use]
    pub fn immediate_successors_loa(&self, intent: &BTreeSet<A>) -> Vec<BTreeSet<A>> {
        let extent = self.extent(intent);
        let mut minimal: BTreeSet<&A> = self.attributes.difference(intent).collect();
        let mut covers = BTreeSet::new();
        for m in self.attributes.difference(intent) {
            let narrowed: BTreeSet<O> = match self.columns.get(m) {
                Some(column) => extent.intersection(column).cloned().collect(),
                None => BTreeSet::new(),
            };
            let extended = self.intent(&narrowed);
            let blocked = extended
                .difference(intent)
                .any(|x| x != m && minimal.contains(x));
            if blocked {
                minimal.remove(m);
            } else {
                covers.insert(extended);
            }
        }
        covers.into_iter().collect()
    }

    /// The concept lattice, with intents and extents on every node.
    ///
    /// # Errors
    ///
    /// Propagates construction errors from [`ClosureSystem::closed_set_lattice`].
    #[instrument(
        skip(self),
        fields(objects = self.objects.len(), attributes = self.attributes.len())
    )]
    pub fn concept_lattice(&self, diagram: bool) -> Result<ConceptLattice<A, O>, LatticeError> {
        self.closed_set_lattice(diagram)?
            .with_extents(|intent| self.extent(intent))
    }

    // -----------------------------------------------------------------------
    // Derived contexts
    // -----------------------------------------------------------------------

    /// The transposed context: attributes become objects.
    #[must_use]
    pub fn reverse(&self) -> RelationalContext<A, O> {
        RelationalContext {
            objects: self.attributes.clone(),
            attributes: self.objects.clone(),
            rows: self.columns.clone(),
            columns: self.rows.clone(),
        }
    }

    /// Clarify and reduce in place: drop attributes (then objects) whose
    /// derivation equals another one's, or the intersection of strictly
    /// larger ones. The concept lattice is unchanged up to isomorphism.
    #[instrument(
        skip(self),
        fields(objects = self.objects.len(), attributes = self.attributes.len())
    )]
    pub fn reduction(&mut self) -> Reduction<O, A> {
        let attributes = reduction_plan(&self.columns, &self.objects);
        for a in attributes.keys() {
            self.remove_attribute(a);
        }
        let objects = reduction_plan(&self.rows, &self.attributes);
        for o in objects.keys() {
            self.remove_object(o);
        }
        debug!(
            objects = objects.len(),
            attributes = attributes.len(),
            "context reduced"
        );
        Reduction {
            objects,
            attributes,
        }
    }
}

impl<O: Content, A: Content> ClosureSystem for RelationalContext<O, A> {
    type Element = A;

    fn ground_set(&self) -> &BTreeSet<A> {
        &self.attributes
    }

    fn closure(&self, set: &BTreeSet<A>) -> BTreeSet<A> {
        self.intent(&self.extent(set))
    }

    /// `a → b` when every object having `a` also has `b`.
    fn precedence_graph(&self) -> DirectedGraph<A> {
        let mut graph = DirectedGraph::with_nodes(self.attributes.iter().cloned());
        for a in &self.attributes {
            for b in self.closure(&BTreeSet::from([a.clone()])) {
                if b != *a {
                    let _ = graph.add_edge(a, &b, ());
                }
            }
        }
        graph
    }

    fn immediate_successors(&self, set: &BTreeSet<A>) -> Vec<BTreeSet<A>> {
        self.immediate_successors_loa(set)
    }
}

/// Intersection of the given rows; `universe` for an empty family. Missing
/// rows count as empty.
fn intersect<'a, T, I>(rows: I, universe: &BTreeSet<T>) -> BTreeSet<T>
where
    T: Content + 'a,
    I: IntoIterator<Item = Option<&'a BTreeSet<T>>>,
{
    let mut rows = rows.into_iter();
    let Some(first) = rows.next() else {
        return universe.clone();
    };
    let mut acc = first.cloned().unwrap_or_default();
    for row in rows {
        match row {
            Some(row) => acc.retain(|x| row.contains(x)),
            None => acc.clear(),
        }
        if acc.is_empty() {
            break;
        }
    }
    acc
}

/// Which keys of `derivations` can go, and what replaces each.
///
/// Keys with equal derivations keep the smallest as representative. A
/// representative is reducible when its derivation is the intersection of
/// the strictly larger ones; removed keys then map to the irreducible
/// representatives above them.
fn reduction_plan<K: Content, V: Content>(
    derivations: &BTreeMap<K, BTreeSet<V>>,
    universe: &BTreeSet<V>,
) -> BTreeMap<K, BTreeSet<K>> {
    let mut classes: BTreeMap<&BTreeSet<V>, Vec<&K>> = BTreeMap::new();
    for (k, d) in derivations {
        classes.entry(d).or_default().push(k);
    }

    let reps: Vec<(&BTreeSet<V>, &Vec<&K>)> = classes.iter().map(|(d, keys)| (*d, keys)).collect();
    let above: Vec<Vec<usize>> = reps
        .iter()
        .map(|(d, _)| {
            reps.iter()
                .enumerate()
                .filter(|(_, (other, _))| other.len() > d.len() && d.is_subset(other))
                .map(|(j, _)| j)
                .collect()
        })
        .collect();
    let reducible: Vec<bool> = reps
        .iter()
        .zip(&above)
        .map(|((d, _), up)| intersect(up.iter().map(|&j| Some(reps[j].0)), universe) == **d)
        .collect();

    let mut plan = BTreeMap::new();
    for (i, (_, keys)) in reps.iter().enumerate() {
        let replacement: BTreeSet<K> = if reducible[i] {
            above[i]
                .iter()
                .filter(|&&j| !reducible[j])
                .map(|&j| reps[j].1[0].clone())
                .collect()
        } else {
            BTreeSet::from([keys[0].clone()])
        };
        for (pos, k) in keys.iter().enumerate() {
            if pos > 0 || reducible[i] {
                plan.insert((*k).clone(), replacement.clone());
            }
        }
    }
    plan
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
