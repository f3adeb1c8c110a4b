//! Lattice nodes carrying an optional intent and an optional extent.

use std::collections::BTreeSet;

use treillis_graph::Content;

/// A node of a concept lattice.
///
/// Either side may be absent: closed-set lattices only carry intents, and
/// [`meet_closure`](crate::Lattice::meet_closure) only carries extents.
/// Concepts compare by intent first, then extent.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Concept<A, O = A> {
    intent: Option<BTreeSet<A>>,
    extent: Option<BTreeSet<O>>,
}

impl<A: Content, O: Content> Concept<A, O> {
    /// A complete concept.
    #[must_use]
    pub const fn new(intent: BTreeSet<A>, extent: BTreeSet<O>) -> Self {
        Self {
            intent: Some(intent),
            extent: Some(extent),
        }
    }

    /// A concept known only by its intent.
    #[must_use]
    pub const fn from_intent(intent: BTreeSet<A>) -> Self {
        Self {
            intent: Some(intent),
            extent: None,
        }
    }

    /// A concept known only by its extent.
    #[must_use]
    pub const fn from_extent(extent: BTreeSet<O>) -> Self {
        Self {
            intent: None,
            extent: Some(extent),
        }
    }

    #[must_use]
    pub const fn intent(&self) -> Option<&BTreeSet<A>> {
        self.intent.as_ref()
    }

    #[must_use]
    pub const fn extent(&self) -> Option<&BTreeSet<O>> {
        self.extent.as_ref()
    }

    #[must_use]
    pub const fn has_intent(&self) -> bool {
        self.intent.is_some()
    }

    #[must_use]
    pub const fn has_extent(&self) -> bool {
        self.extent.is_some()
    }

    /// `true` when `self` lies below `other`: intent inclusion if both have
    /// intents, reverse extent inclusion if both have extents.
    #[must_use]
    pub fn is_below(&self, other: &Self) -> bool {
        match (&self.intent, &other.intent, &self.extent, &other.extent) {
            (Some(a), Some(b), _, _) => a.is_subset(b),
            (_, _, Some(a), Some(b)) => b.is_subset(a),
            _ => false,
        }
    }

    /// Replace the extent, keeping the intent.
    #[must_use]
    pub fn with_extent<P: Content>(self, extent: BTreeSet<P>) -> Concept<A, P> {
        Concept {
            intent: self.intent,
            extent: Some(extent),
        }
    }
}
