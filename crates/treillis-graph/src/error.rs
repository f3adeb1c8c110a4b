//! Error type shared by every graph operation.

/// Errors raised by [`DirectedGraph`](crate::DirectedGraph) and
/// [`AcyclicGraph`](crate::AcyclicGraph) operations.
///
/// Node contents are rendered with their `Debug` representation so the error
/// stays independent of the graph's content type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// An operation referenced a node that is not in the graph.
    #[error("node not found in graph: {node}")]
    NodeNotFound {
        /// Debug rendering of the missing node.
        node: String,
    },

    /// A relabelling mapped two distinct nodes onto the same content.
    #[error("duplicate node content: {node}")]
    DuplicateNode {
        /// Debug rendering of the colliding content.
        node: String,
    },

    /// The graph does not satisfy what the operation requires (e.g. a
    /// topological sort requested on a cyclic graph).
    #[error("{operation} requires {reason}")]
    InvalidPrecondition {
        /// Name of the rejected operation.
        operation: &'static str,
        /// What the graph was expected to satisfy.
        reason: String,
    },

    /// A generator was called with an out-of-range parameter.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl GraphError {
    pub(crate) fn node_not_found<N: std::fmt::Debug>(node: &N) -> Self {
        Self::NodeNotFound {
            node: format!("{node:?}"),
        }
    }

    pub(crate) fn cyclic(operation: &'static str) -> Self {
        Self::InvalidPrecondition {
            operation,
            reason: "an acyclic graph".to_string(),
        }
    }
}
