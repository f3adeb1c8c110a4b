//! Errors raised by closure systems, rule bases and lattice analysis.

use std::fmt::Debug;

use treillis_graph::GraphError;

/// Errors from lattice construction and analysis.
///
/// Offending nodes, elements and rules are rendered with `Debug` so the
/// error type does not depend on the content types involved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LatticeError {
    /// A graph-level operation failed.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A join or meet was requested for a pair without a unique bound.
    #[error("{operation}({left}, {right}) is undefined: not a lattice")]
    NotALattice {
        /// `"join"` or `"meet"`.
        operation: &'static str,
        /// Debug rendering of the first node.
        left: String,
        /// Debug rendering of the second node.
        right: String,
    },

    /// The structure does not satisfy what the operation requires.
    #[error("{operation} requires {reason}")]
    InvalidPrecondition {
        /// Name of the rejected operation.
        operation: &'static str,
        /// What was expected.
        reason: String,
    },

    /// A closure operator violated one of its axioms.
    #[error("closure operator is not {property} on {set}")]
    StructuralViolation {
        /// `"extensive"`, `"idempotent"` or `"monotone"`.
        property: &'static str,
        /// Debug rendering of the probe set that exposed the violation.
        set: String,
    },

    /// An element is not part of the ground set (or object set).
    #[error("unknown element: {element}")]
    UnknownElement {
        /// Debug rendering of the element.
        element: String,
    },

    /// A rule cannot be represented.
    #[error("invalid rule {rule}: {reason}")]
    InvalidRule {
        /// Debug rendering of the rule.
        rule: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// An intent-based computation met a concept without an intent.
    #[error("concept has no intent: {concept}")]
    MissingIntent {
        /// Debug rendering of the concept.
        concept: String,
    },

    /// A doubling was requested on a subset that is not convex.
    #[error("subset is not convex: {node} lies between two of its members")]
    NotConvex {
        /// Debug rendering of a node between members but outside the subset.
        node: String,
    },

    /// Construction stopped because it produced more concepts than allowed.
    #[error("construction stopped after {limit} concepts")]
    ConceptBudgetExceeded {
        /// The configured budget.
        limit: usize,
    },
}

impl LatticeError {
    pub(crate) fn not_a_lattice<N: Debug>(operation: &'static str, left: &N, right: &N) -> Self {
        Self::NotALattice {
            operation,
            left: format!("{left:?}"),
            right: format!("{right:?}"),
        }
    }

    pub(crate) fn unknown<T: Debug>(element: &T) -> Self {
        Self::UnknownElement {
            element: format!("{element:?}"),
        }
    }

    pub(crate) fn node_not_found<N: Debug>(node: &N) -> Self {
        Self::Graph(GraphError::NodeNotFound {
            node: format!("{node:?}"),
        })
    }
}
